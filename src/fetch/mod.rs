pub mod cache;
pub mod http;

use async_trait::async_trait;

use crate::error::ScrapeError;

pub use cache::{CachedFetcher, PageCache};
pub use http::HttpFetcher;

/// Source of raw page bodies, addressed by absolute URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError>;
}
