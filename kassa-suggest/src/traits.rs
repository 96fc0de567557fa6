use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One suggestion as delivered by the service. Consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Display form shown in the dropdown.
    pub value: String,
    #[serde(default)]
    pub unrestricted_value: Option<String>,
    #[serde(default)]
    pub data: SuggestionData,
}

/// Structured location fields; any of them may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionData {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}

/// Granularity scope for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestBound {
    /// Results between city and settlement level, nothing finer.
    CityToSettlement,
}

/// Per-query knobs passed by the binder.
#[derive(Debug, Clone)]
pub struct SuggestOptions {
    /// Maximum suggestions to return.
    pub count: u8,
    /// Optional granularity scope; `None` means unscoped.
    pub bound: Option<SuggestBound>,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            count: 5,
            bound: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SuggestError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The external suggestion widget, seen from the form layer.
#[async_trait]
pub trait AddressSuggestions: Send + Sync {
    /// Fetch suggestions for a typed query fragment.
    async fn suggest(
        &self,
        query: &str,
        opts: &SuggestOptions,
    ) -> Result<Vec<Suggestion>, SuggestError>;
}
