use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::fetch::PageFetcher;

/// Raw page bodies on disk, one file per URL.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.html", sha256_hex(url)))
    }

    pub async fn get(&self, url: &str) -> Option<String> {
        tokio::fs::read_to_string(self.path_for(url)).await.ok()
    }

    pub async fn put(&self, url: &str, body: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(url), body).await
    }
}

pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Serves pages from a [`PageCache`] and falls back to the wrapped fetcher.
///
/// With `refresh` set every page is fetched again and the cached copy
/// overwritten.
pub struct CachedFetcher<F> {
    inner: F,
    cache: PageCache,
    refresh: bool,
}

impl<F> CachedFetcher<F> {
    pub fn new(inner: F, cache: PageCache, refresh: bool) -> Self {
        Self {
            inner,
            cache,
            refresh,
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for CachedFetcher<F> {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        if !self.refresh {
            if let Some(body) = self.cache.get(url).await {
                debug!("cache hit for {url}");
                return Ok(body);
            }
        }
        let body = self.inner.fetch_text(url).await?;
        if let Err(err) = self.cache.put(url, &body).await {
            warn!("failed caching {url} in {}: {err}", self.cache.dir().display());
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use crate::fetch::cache::{sha256_hex, CachedFetcher, PageCache};
    use crate::fetch::testing::MemoryFetcher;
    use crate::fetch::PageFetcher;

    const URL: &str = "http://cal-access.sos.ca.gov/Campaign/Candidates/list.aspx?electNav=64";

    #[test]
    fn cache_paths_are_stable_per_url() {
        let cache = PageCache::new("/tmp/pages");
        assert_eq!(cache.path_for(URL), cache.path_for(URL));
        assert_ne!(cache.path_for(URL), cache.path_for("http://example.com/"));
        assert_eq!(sha256_hex("abc").len(), 64);
    }

    #[tokio::test]
    async fn serves_second_request_from_disk() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let inner = MemoryFetcher::default().with_page(URL, "<html>page</html>");
        let fetcher = CachedFetcher::new(inner, PageCache::new(dir.path()), false);

        let first = fetcher.fetch_text(URL).await.expect("failed fetch");
        let second = fetcher.fetch_text(URL).await.expect("failed fetch");
        assert_eq!(first, second);
        assert_eq!(fetcher.inner.requested().len(), 1);
    }

    #[tokio::test]
    async fn refresh_bypasses_cached_copy() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let cache = PageCache::new(dir.path());
        cache.put(URL, "stale").await.expect("failed to seed cache");

        let inner = MemoryFetcher::default().with_page(URL, "fresh");
        let fetcher = CachedFetcher::new(inner, cache.clone(), true);
        assert_eq!(fetcher.fetch_text(URL).await.expect("failed fetch"), "fresh");
        assert_eq!(cache.get(URL).await.as_deref(), Some("fresh"));
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let cache = PageCache::new(dir.path());
        let fetcher = CachedFetcher::new(MemoryFetcher::default(), cache.clone(), false);
        let result = tokio_test::block_on(fetcher.fetch_text(URL));
        assert!(result.is_err());
        assert!(!cache.path_for(URL).exists());
    }
}
