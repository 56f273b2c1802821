use thiserror::Error;

/// Failures that abort a scrape run.
///
/// Sections or office blocks that lack their header marker are not errors;
/// the parsers skip them without reporting anything here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unexpected markup in {context}: {detail}")]
    Parse { context: String, detail: String },
    #[error("failed fetching {url}: {detail}")]
    Fetch { url: String, detail: String },
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },
}

impl ScrapeError {
    pub fn parse(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
