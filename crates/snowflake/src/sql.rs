//! SQL statements API client.
//!
//! Everything that is not chunk search goes through parameterized statements
//! against `POST {base}/api/v2/statements`: Cortex completions, presigned
//! document URLs, and the document/category catalog. Statement results come
//! back row-major as strings, which keeps the response parsing uniform
//! across all four statement shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use wellspring_core::error::ServiceError;
use wellspring_core::{CompletionClient, DocumentStore, ModelId};

const COMPLETE_STATEMENT: &str = "select snowflake.cortex.complete(?, ?) as response";

/// A client for the account's SQL statements endpoint.
pub struct SqlApiClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    database: String,
    schema: String,
    warehouse: String,
    role: String,
    document_stage: String,
    docs_table: String,
}

impl SqlApiClient {
    /// Build a client from application configuration.
    pub fn from_config(config: &wellspring_config::AppConfig) -> Self {
        let sf = &config.snowflake;
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/v2/statements", sf.base_url().trim_end_matches('/')),
            token: sf.password.clone(),
            database: sf.database.clone(),
            schema: sf.schema.clone(),
            warehouse: sf.warehouse.clone(),
            role: sf.role.clone(),
            document_stage: sf.document_stage.clone(),
            docs_table: sf.docs_table.clone(),
        }
    }

    /// Execute one statement and return its result rows.
    async fn execute(
        &self,
        statement: String,
        bindings: Vec<Binding>,
    ) -> Result<Vec<Vec<Option<String>>>, ServiceError> {
        let body = StatementRequest {
            statement,
            bindings: number_bindings(bindings),
            database: self.database.clone(),
            schema: self.schema.clone(),
            warehouse: self.warehouse.clone(),
            role: self.role.clone(),
        };

        debug!(statement = %body.statement, "Executing SQL statement");

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
                "Invalid token or insufficient privileges for statement execution".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Statement execution failed");
            return Err(ServiceError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: StatementResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        Ok(api_response.data)
    }

    /// Execute a statement expected to yield exactly one non-null scalar.
    async fn scalar(
        &self,
        statement: String,
        bindings: Vec<Binding>,
    ) -> Result<String, ServiceError> {
        let rows = self.execute(statement, bindings).await?;
        first_scalar(rows)
    }
}

/// Pull the first column of the first row out of a result set.
fn first_scalar(rows: Vec<Vec<Option<String>>>) -> Result<String, ServiceError> {
    rows.into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .flatten()
        .ok_or_else(|| ServiceError::MalformedResponse("statement returned no rows".into()))
}

#[async_trait]
impl CompletionClient for SqlApiClient {
    async fn complete(&self, model: ModelId, prompt: &str) -> Result<String, ServiceError> {
        debug!(model = %model, prompt_len = prompt.len(), "Requesting completion");
        self.scalar(
            COMPLETE_STATEMENT.into(),
            vec![Binding::text(model.as_str()), Binding::text(prompt)],
        )
        .await
    }
}

#[async_trait]
impl DocumentStore for SqlApiClient {
    async fn presigned_url(&self, path: &str, validity_secs: u32) -> Result<String, ServiceError> {
        // Stage identifiers cannot be bound; they come from deployment
        // config, never from user input.
        let statement = format!(
            "select get_presigned_url({stage}, ?, ?) as url_link from directory({stage})",
            stage = self.document_stage
        );
        self.scalar(
            statement,
            vec![Binding::text(path), Binding::fixed(validity_secs)],
        )
        .await
    }

    async fn list_documents(&self) -> Result<Vec<String>, ServiceError> {
        let statement = format!("ls {}", self.document_stage);
        let rows = self.execute(statement, Vec::new()).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        let statement = format!(
            "select category from {} group by category",
            self.docs_table
        );
        let rows = self.execute(statement, Vec::new()).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct StatementRequest {
    statement: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    bindings: HashMap<String, Binding>,
    database: String,
    schema: String,
    warehouse: String,
    role: String,
}

/// One positional statement binding.
#[derive(Debug, Clone, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

impl Binding {
    fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "TEXT".into(),
            value: value.into(),
        }
    }

    fn fixed(value: u32) -> Self {
        Self {
            kind: "FIXED".into(),
            value: value.to_string(),
        }
    }
}

/// Positional bindings keyed "1", "2", … as the statements API expects.
fn number_bindings(bindings: Vec<Binding>) -> HashMap<String, Binding> {
    bindings
        .into_iter()
        .enumerate()
        .map(|(i, b)| ((i + 1).to_string(), b))
        .collect()
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}
