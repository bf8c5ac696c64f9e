//! Snowflake backend clients for Wellspring.
//!
//! Two REST surfaces cover everything the application needs:
//!
//! - **Cortex Search** (`search.rs`) — the managed retrieval service's
//!   `:query` endpoint, implementing [`wellspring_core::SearchClient`].
//! - **SQL statements API** (`sql.rs`) — parameterized statements for
//!   `snowflake.cortex.complete`, presigned URLs, and the document/category
//!   catalog, implementing [`wellspring_core::CompletionClient`] and
//!   [`wellspring_core::DocumentStore`].
//!
//! Both clients authenticate with a programmatic access token and parse
//! responses into typed structures; a payload that does not match the
//! expected shape surfaces as [`wellspring_core::ServiceError::MalformedResponse`]
//! rather than a panic or a silently defaulted field.

pub mod search;
pub mod sql;

pub use search::CortexSearchClient;
pub use sql::SqlApiClient;

pub(crate) const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
pub(crate) const TOKEN_TYPE_PAT: &str = "PROGRAMMATIC_ACCESS_TOKEN";
