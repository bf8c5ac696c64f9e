//! Configuration loading and validation for Wellspring.
//!
//! Loads configuration from `wellspring.toml` with environment variable
//! overrides for the backend credentials. Validation happens once at process
//! start: a missing required credential is fatal, and the error lists every
//! missing name at once so a fresh deployment can be fixed in one pass.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `wellspring.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Persona prose prepended to every answer prompt. The structural
    /// grounding rules are fixed in code; only this prose is a deployment
    /// choice.
    #[serde(default = "default_persona")]
    pub persona: String,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend connection and credentials.
    #[serde(default)]
    pub snowflake: SnowflakeConfig,

    /// Retrieval and prompt tunables.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

fn default_persona() -> String {
    "You are an expert health and performance coach who extracts information \
     from the scientific literature provided to you. You offer science-based \
     protocols and mechanistic insights, and you are direct about what the \
     peer-reviewed evidence does and does not support."
        .into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8311
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Connection parameters for the Snowflake backend.
///
/// The seven credential fields are required; [`AppConfig::validate`] reports
/// every empty one by name. The remaining fields identify the search service,
/// document stage, and chunk table inside the configured schema.
#[derive(Clone, Serialize, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub account: String,

    #[serde(default)]
    pub user: String,

    /// Programmatic access token (or password-derived token) sent as the
    /// bearer credential on every REST call.
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub schema: String,

    #[serde(default)]
    pub warehouse: String,

    #[serde(default = "default_search_service")]
    pub search_service: String,

    #[serde(default = "default_document_stage")]
    pub document_stage: String,

    #[serde(default = "default_docs_table")]
    pub docs_table: String,
}

fn default_search_service() -> String {
    "CC_SEARCH_SERVICE_CS".into()
}
fn default_document_stage() -> String {
    "@docs".into()
}
fn default_docs_table() -> String {
    "docs_chunks_table".into()
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            user: String::new(),
            password: String::new(),
            role: String::new(),
            database: String::new(),
            schema: String::new(),
            warehouse: String::new(),
            search_service: default_search_service(),
            document_stage: default_document_stage(),
            docs_table: default_docs_table(),
        }
    }
}

impl SnowflakeConfig {
    /// Base URL of the account's REST endpoints.
    pub fn base_url(&self) -> String {
        format!("https://{}.snowflakecomputing.com", self.account)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many chunks a retrieval call asks for.
    #[serde(default = "default_num_chunks")]
    pub num_chunks: usize,

    /// How many prior turns feed the history window.
    #[serde(default = "default_slide_window")]
    pub slide_window: usize,

    /// Validity of presigned document links, in seconds.
    #[serde(default = "default_url_validity_secs")]
    pub url_validity_secs: u32,
}

fn default_num_chunks() -> usize {
    3
}
fn default_slide_window() -> usize {
    7
}
fn default_url_validity_secs() -> u32 {
    360
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            num_chunks: default_num_chunks(),
            slide_window: default_slide_window(),
            url_validity_secs: default_url_validity_secs(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("persona", &format!("{:.40}…", self.persona))
            .field("server", &self.server)
            .field("snowflake", &self.snowflake)
            .field("retrieval", &self.retrieval)
            .finish()
    }
}

impl std::fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("role", &self.role)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("search_service", &self.search_service)
            .field("document_stage", &self.document_stage)
            .field("docs_table", &self.docs_table)
            .finish()
    }
}

fn redact(s: &str) -> &'static str {
    if s.is_empty() { "<unset>" } else { "[REDACTED]" }
}

impl AppConfig {
    /// Load configuration from the default path (`./wellspring.toml`),
    /// apply environment overrides, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("wellspring.toml"))
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error by itself — every credential can come
    /// from the environment — but validation still runs and fails loudly if
    /// required parameters are absent from both sources.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!(path = %path.display(), "No config file found, using environment only");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over the file for credentials.
    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 7] = [
            ("SNOWFLAKE_ACCOUNT", &mut self.snowflake.account),
            ("SNOWFLAKE_USER", &mut self.snowflake.user),
            ("SNOWFLAKE_USER_PASSWORD", &mut self.snowflake.password),
            ("SNOWFLAKE_ROLE", &mut self.snowflake.role),
            ("SNOWFLAKE_DATABASE", &mut self.snowflake.database),
            ("SNOWFLAKE_SCHEMA", &mut self.snowflake.schema),
            ("SNOWFLAKE_WAREHOUSE", &mut self.snowflake.warehouse),
        ];
        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var)
                && !value.is_empty()
            {
                *slot = value;
            }
        }
    }

    /// Validate the configuration. Collects every missing credential before
    /// failing so the operator sees the full list at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&str, &str); 7] = [
            ("account", &self.snowflake.account),
            ("user", &self.snowflake.user),
            ("password", &self.snowflake.password),
            ("role", &self.snowflake.role),
            ("database", &self.snowflake.database),
            ("schema", &self.snowflake.schema),
            ("warehouse", &self.snowflake.warehouse),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingParameters { names: missing });
        }

        if self.retrieval.num_chunks == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.num_chunks must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            server: ServerConfig::default(),
            snowflake: SnowflakeConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

/// Configuration errors. All fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Missing required Snowflake credentials: {}", .names.join(", "))]
    MissingParameters { names: Vec<String> },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn full_toml() -> &'static str {
        r#"
[server]
port = 9000

[snowflake]
account = "xy12345"
user = "svc_wellspring"
password = "tok-abc"
role = "WELLSPRING_ROLE"
database = "CC_QUICKSTART"
schema = "DATA"
warehouse = "COMPUTE_WH"

[retrieval]
num_chunks = 4
"#
    }

    #[test]
    fn full_config_parses_and_validates() {
        let config: AppConfig = toml::from_str(full_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.retrieval.num_chunks, 4);
        // Defaults fill the unspecified tables.
        assert_eq!(config.retrieval.slide_window, 7);
        assert_eq!(config.snowflake.search_service, "CC_SEARCH_SERVICE_CS");
        assert_eq!(config.snowflake.document_stage, "@docs");
    }

    #[test]
    fn missing_credentials_all_listed() {
        let config: AppConfig = toml::from_str(
            r#"
[snowflake]
account = "xy12345"
user = "svc_wellspring"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        match err {
            ConfigError::MissingParameters { names } => {
                assert_eq!(
                    names,
                    vec!["password", "role", "database", "schema", "warehouse"]
                );
            }
            other => panic!("expected MissingParameters, got {other:?}"),
        }
    }

    #[test]
    fn missing_parameters_display_joins_names() {
        let err = ConfigError::MissingParameters {
            names: vec!["account".into(), "warehouse".into()],
        };
        assert!(err.to_string().contains("account, warehouse"));
    }

    #[test]
    fn base_url_from_account() {
        let config: AppConfig = toml::from_str(full_toml()).unwrap();
        assert_eq!(
            config.snowflake.base_url(),
            "https://xy12345.snowflakecomputing.com"
        );
    }

    #[test]
    fn zero_chunks_rejected() {
        let mut config: AppConfig = toml::from_str(full_toml()).unwrap();
        config.retrieval.num_chunks = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(full_toml().as_bytes()).unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.snowflake.account, "xy12345");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[snowflake\naccount=").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn password_redacted_in_debug() {
        let config: AppConfig = toml::from_str(full_toml()).unwrap();
        let debug = format!("{:?}", config.snowflake);
        assert!(!debug.contains("tok-abc"));
        assert!(debug.contains("[REDACTED]"));
    }
}
