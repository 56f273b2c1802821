use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::document::parse_html;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::scrape::{
    parse_election_page, parse_listing, ElectionLink, ElectionPage, ElectionResult,
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause before each election page after the first.
    pub pace: Duration,
    /// Log and continue past pages that fail to fetch or parse.
    pub skip_failed: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pace: Duration::from_millis(500),
            skip_failed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedPage {
    pub page_reference: String,
    pub election_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeRun {
    pub results: Vec<ElectionResult>,
    pub failed: Vec<FailedPage>,
}

/// Fetches the listing and then every election page it links to, one at a
/// time.
pub async fn build_results<F: PageFetcher + ?Sized>(
    fetcher: &F,
    listing_url: &Url,
    base_url: &Url,
    options: &RunOptions,
) -> Result<ScrapeRun> {
    info!("scraping election candidates from {listing_url}");
    let listing_body = fetcher
        .fetch_text(listing_url.as_str())
        .await
        .with_context(|| format!("while fetching listing {listing_url}"))?;
    let links = links_from_listing(&listing_body, base_url)
        .with_context(|| format!("while parsing listing {listing_url}"))?;
    info!("found {} election pages", links.len());

    let mut run = ScrapeRun::default();
    for (i, link) in links.iter().enumerate() {
        if i > 0 && !options.pace.is_zero() {
            tokio::time::sleep(options.pace).await;
        }
        match scrape_page(fetcher, link).await {
            Ok(page) => {
                let result = ElectionResult::from_parts(link, page);
                debug!(
                    "{}: {} offices, {} candidates",
                    result.election_name,
                    result.races.len(),
                    result.candidate_count()
                );
                run.results.push(result);
            }
            Err(err) if options.skip_failed => {
                warn!(
                    "skipping {} ({}): {err}",
                    link.election_name, link.page_reference
                );
                run.failed.push(FailedPage {
                    page_reference: link.page_reference.clone(),
                    election_name: link.election_name.clone(),
                    error: err.to_string(),
                });
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!(
                    "while scraping {} ({})",
                    link.election_name, link.page_reference
                )));
            }
        }
    }
    Ok(run)
}

async fn scrape_page<F: PageFetcher + ?Sized>(
    fetcher: &F,
    link: &ElectionLink,
) -> Result<ElectionPage, ScrapeError> {
    info!("scraping {}", link.election_name);
    let body = fetcher.fetch_text(&link.page_reference).await?;
    page_from_body(&body, &link.page_reference)
}

pub fn links_from_listing(body: &str, base_url: &Url) -> Result<Vec<ElectionLink>, ScrapeError> {
    let document = parse_html(body);
    parse_listing(&document.root_element(), base_url)
}

pub fn page_from_body(body: &str, page_reference: &str) -> Result<ElectionPage, ScrapeError> {
    let document = parse_html(body);
    parse_election_page(&document.root_element(), page_reference)
}
