//! HTTP Lexicon Source

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentSource, FetchRequest};
use crate::error::{LexiconError, Result};

/// Fetches lexicons from `{base}/lexicon/{model}/{country}/{date}`
pub struct HttpDocumentSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/lexicon/{}/{}/{}",
            self.base_url, request.model, request.country, request.date
        )
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value> {
        let url = self.url(request);
        tracing::debug!(%url, "Fetching lexicon");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LexiconError::Fetch(format!(
                "{} {} {} returned {status}",
                request.model, request.country, request.date
            )));
        }

        Ok(response.json::<Value>().await?)
    }

    fn name(&self) -> &str {
        "HttpLexiconService"
    }
}
