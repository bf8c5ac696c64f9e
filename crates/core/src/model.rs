//! The closed set of hosted completion models.
//!
//! The backend exposes a fixed menu of model variants; the UI renders them as
//! a selector and every completion call names one explicitly. Keeping this an
//! enum (rather than a free-form string) rejects unknown models at the API
//! boundary instead of deep inside a failed backend call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A hosted model variant accepted by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "mixtral-8x7b")]
    Mixtral8x7b,
    #[serde(rename = "snowflake-arctic")]
    SnowflakeArctic,
    #[serde(rename = "mistral-large")]
    MistralLarge,
    #[serde(rename = "llama3-8b")]
    Llama3_8b,
    #[serde(rename = "llama3-70b")]
    Llama3_70b,
    #[serde(rename = "reka-flash")]
    RekaFlash,
    #[serde(rename = "mistral-7b")]
    Mistral7b,
    #[serde(rename = "llama2-70b-chat")]
    Llama2_70bChat,
    #[serde(rename = "gemma-7b")]
    Gemma7b,
}

/// Returned when a model string does not name one of the hosted variants.
#[derive(Debug, Clone, Error)]
#[error("Unknown model: {0}")]
pub struct UnknownModel(pub String);

impl ModelId {
    /// Every variant, in menu order.
    pub const ALL: [ModelId; 9] = [
        ModelId::Mixtral8x7b,
        ModelId::SnowflakeArctic,
        ModelId::MistralLarge,
        ModelId::Llama3_8b,
        ModelId::Llama3_70b,
        ModelId::RekaFlash,
        ModelId::Mistral7b,
        ModelId::Llama2_70bChat,
        ModelId::Gemma7b,
    ];

    /// The wire name the completion service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Mixtral8x7b => "mixtral-8x7b",
            ModelId::SnowflakeArctic => "snowflake-arctic",
            ModelId::MistralLarge => "mistral-large",
            ModelId::Llama3_8b => "llama3-8b",
            ModelId::Llama3_70b => "llama3-70b",
            ModelId::RekaFlash => "reka-flash",
            ModelId::Mistral7b => "mistral-7b",
            ModelId::Llama2_70bChat => "llama2-70b-chat",
            ModelId::Gemma7b => "gemma-7b",
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Mixtral8x7b
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModelId::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
