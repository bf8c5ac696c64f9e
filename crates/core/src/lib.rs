//! # Wellspring Core
//!
//! Domain types, client traits, and error definitions for Wellspring — a
//! retrieval-augmented chat application over a managed search-and-completion
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (search service, completion service, document
//! storage) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping backends via configuration
//! - Testing the conversational pipeline with scripted mock clients
//! - Clean dependency graph (all crates depend inward on core)

pub mod chunk;
pub mod client;
pub mod error;
pub mod model;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use chunk::{ALL_CATEGORIES, RetrievedChunk, reference_paths};
pub use client::{CompletionClient, DocumentStore, SearchClient};
pub use error::ServiceError;
pub use model::ModelId;
pub use turn::{Role, SessionContext, SessionId, Turn};
