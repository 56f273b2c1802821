use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;

pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn attempt(&self, url: &str) -> Result<String, Attempt> {
        let response = self.client.get(url).send().await.map_err(|err| {
            let transient = err.is_connect() || err.is_timeout();
            Attempt::failed(ScrapeError::fetch(url, err), transient)
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Attempt::failed(
                ScrapeError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                },
                is_transient_status(status),
            ));
        }
        response
            .text()
            .await
            .map_err(|err| Attempt::failed(ScrapeError::fetch(url, err), false))
    }
}

struct Attempt {
    error: ScrapeError,
    transient: bool,
}

impl Attempt {
    fn failed(error: ScrapeError, transient: bool) -> Self {
        Self { error, transient }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let mut attempt = 0u32;
        loop {
            debug!("GET {url}");
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(failure) if failure.transient && attempt < self.max_retries => {
                    attempt += 1;
                    let wait = self.retry_backoff * attempt;
                    warn!(
                        "retrying {url} in {}ms (attempt {attempt}/{}): {}",
                        wait.as_millis(),
                        self.max_retries,
                        failure.error
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }
}
