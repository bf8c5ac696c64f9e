//! Cortex Search client — the managed retrieval service.
//!
//! One endpoint:
//! `POST {base}/api/v2/databases/{db}/schemas/{schema}/cortex-search-services/{name}:query`
//!
//! The request names the columns it wants back; the response is a ranked
//! list of rows carrying exactly those columns. Ranking happens entirely
//! server-side and is not reproduced here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wellspring_core::error::ServiceError;
use wellspring_core::{ALL_CATEGORIES, RetrievedChunk, SearchClient};

/// The columns every search request asks for.
const COLUMNS: [&str; 3] = ["chunk", "relative_path", "category"];

/// A client for one Cortex Search service.
pub struct CortexSearchClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl CortexSearchClient {
    /// Create a client for the named search service.
    pub fn new(
        base_url: impl Into<String>,
        database: &str,
        schema: &str,
        service: &str,
        token: impl Into<String>,
    ) -> Self {
        let base = base_url.into();
        let endpoint = format!(
            "{}/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            base.trim_end_matches('/'),
            database,
            schema,
            service
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            token: token.into(),
        }
    }

    /// Build a client from application configuration.
    pub fn from_config(config: &wellspring_config::AppConfig) -> Self {
        let sf = &config.snowflake;
        Self::new(
            sf.base_url(),
            &sf.database,
            &sf.schema,
            &sf.search_service,
            &sf.password,
        )
    }

    fn build_request(query: &str, category: &str, limit: usize) -> SearchApiRequest {
        let filter = (category != ALL_CATEGORIES).then(|| Filter {
            eq: CategoryEq {
                category: category.to_string(),
            },
        });
        SearchApiRequest {
            query: query.to_string(),
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            filter,
            limit,
        }
    }
}

#[async_trait]
impl SearchClient for CortexSearchClient {
    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>, ServiceError> {
        let body = Self::build_request(query, category, limit);

        debug!(category, limit, "Searching document chunks");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header(crate::TOKEN_TYPE_HEADER, crate::TOKEN_TYPE_PAT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(ServiceError::AuthenticationFailed(
                "Invalid token or insufficient privileges on the search service".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Search service returned error");
            return Err(ServiceError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: SearchApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        Ok(api_response
            .results
            .into_iter()
            .map(|row| RetrievedChunk {
                text: row.chunk,
                relative_path: row.relative_path,
                category: row.category,
            })
            .collect())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct SearchApiRequest {
    query: String,
    columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    limit: usize,
}

/// Server-side equality filter: `{"@eq": {"category": "..."}}`.
#[derive(Debug, Serialize)]
struct Filter {
    #[serde(rename = "@eq")]
    eq: CategoryEq,
}

#[derive(Debug, Serialize)]
struct CategoryEq {
    category: String,
}

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    results: Vec<SearchResultRow>,
}

/// One ranked match. Every requested column is required; a row missing one
/// fails the whole response as malformed.
#[derive(Debug, Deserialize)]
struct SearchResultRow {
    chunk: String,
    relative_path: String,
    category: String,
}
