//! Lexicon Sources
//!
//! Abstractions and implementations for the upstream lexicon service.

mod http;
mod mock;

pub use http::HttpDocumentSource;
pub use mock::MockDocumentSource;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Which lexicon to load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub model: String,
    pub country: String,

    /// Effective date, or "latest"
    #[serde(default = "latest")]
    pub date: String,
}

fn latest() -> String {
    "latest".into()
}

impl FetchRequest {
    pub fn new(model: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            country: country.into(),
            date: latest(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        if !date.trim().is_empty() {
            self.date = date;
        }
        self
    }
}

/// Lexicon source trait (Strategy pattern)
///
/// The returned document is opaque JSON; any structure is accepted.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value>;

    /// Source name, for logs
    fn name(&self) -> &str;
}

/// Upstream endpoints for the lexicon and change-order services
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    /// Base URL of the lexicon service; `None` selects the mock source
    pub lexicon_url: Option<String>,

    /// Change-order endpoint; `None` selects the mock generator
    pub change_order_url: Option<String>,

    pub timeout: Duration,
}

impl SourceConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let timeout_secs = std::env::var("LEXICON_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(30);

        Self {
            lexicon_url: non_empty("LEXICON_SOURCE_URL"),
            change_order_url: non_empty("CHANGE_ORDER_URL"),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
