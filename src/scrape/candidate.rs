use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Node;
use crate::error::ScrapeError;
use crate::scrape::CandidateFragment;

/// Marker class on candidates that link to a campaign detail page.
pub const LINKED_SELECTOR: &str = "a.sublink2";
/// Marker class on candidates rendered as plain text.
pub const UNLINKED_SELECTOR: &str = "span.txt7";

static CANDIDATE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+id=(\d+)").expect("invalid candidate id regex"));

pub fn extract_linked<N: Node>(node: &N) -> Result<CandidateFragment, ScrapeError> {
    let name = node.text().trim().to_string();
    let href = node.attribute("href").ok_or_else(|| {
        ScrapeError::parse(
            format!("candidate link {name:?}"),
            "missing href attribute",
        )
    })?;
    let scraped_id = CANDIDATE_ID
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ScrapeError::parse(
                format!("candidate link {name:?}"),
                format!("no numeric id parameter in href {href:?}"),
            )
        })?;
    Ok(CandidateFragment { name, scraped_id })
}

pub fn extract_unlinked<N: Node>(node: &N) -> CandidateFragment {
    CandidateFragment {
        name: node.text().trim().to_string(),
        scraped_id: String::new(),
    }
}

/// Collects an office block's candidates: linked ones first, then unlinked,
/// each group in document order.
pub fn collect_candidates<N: Node>(office: &N) -> Result<Vec<CandidateFragment>, ScrapeError> {
    let mut candidates = Vec::new();
    for node in office.find_all(LINKED_SELECTOR) {
        candidates.push(extract_linked(&node)?);
    }
    candidates.extend(
        office
            .find_all(UNLINKED_SELECTOR)
            .iter()
            .map(extract_unlinked),
    );
    Ok(candidates)
}
