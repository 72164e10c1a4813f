//! HTTP page fetching.

use std::time::{Duration, Instant};

use folio_core::SourceError;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// A fetched page plus the request metadata the debug log reports.
#[derive(Clone, Debug)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

impl FetchedPage {
    /// One-line summary for debug entries.
    pub fn summary(&self) -> String {
        format!(
            "{} → {} ({} bytes, {} ms)",
            self.url,
            self.status,
            self.body.len(),
            self.elapsed.as_millis()
        )
    }
}

/// Shared reqwest client with per-source User-Agent override.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| SourceError::Fetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text. Non-2xx statuses are
    /// [`SourceError::Status`].
    pub async fn get(
        &self,
        url: &str,
        user_agent: Option<&str>,
    ) -> Result<FetchedPage, SourceError> {
        let started = Instant::now();
        let mut req = self.client.get(url);
        if let Some(ua) = user_agent {
            req = req.header(reqwest::header::USER_AGENT, ua);
        }
        let resp = req.send().await.map_err(|e| SourceError::Fetch {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let final_url = resp.url().to_string();
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| SourceError::Fetch {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
            elapsed: started.elapsed(),
        })
    }
}
