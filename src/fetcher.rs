use crate::error::ImportError;
use log::debug;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; MealieImport/1.0)";

/// Downloads a page so it can be analyzed locally
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ImportError> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImportError::FetchError(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::FetchError(format!("{url}: HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ImportError::FetchError(format!("{url}: {e}")))?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
