use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{PmcError, Result};

// ─── RateLimitedClient ────────────────────────────────────────────────────────

/// Sequential GET client: keeps a minimum interval between requests and
/// retries failed requests a fixed number of times with a fixed delay.
pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RateLimitedClient {
    pub fn new(
        min_interval: Duration,
        max_attempts: u32,
        retry_delay: Duration,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
            max_attempts: max_attempts.max(1),
            retry_delay,
        })
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GET `url` with query parameters and return the body text.
    ///
    /// Transport errors, unreadable bodies and non-success statuses are all
    /// retried; the last error is returned once attempts run out.
    pub async fn get_with_query(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let mut attempt = 1u32;
        loop {
            self.wait_for_rate_limit().await;
            match self.try_get(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_attempts => {
                    warn!(attempt, max_attempts = self.max_attempts, error = %e, "request failed, retrying");
                    sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PmcError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}
