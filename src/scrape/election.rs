use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::document::Node;
use crate::error::ScrapeError;
use crate::scrape::candidate::collect_candidates;
use crate::scrape::{CandidateFragment, ElectionPage};

/// Office name to candidates, in order of first appearance on the page.
///
/// A repeated office name replaces the earlier candidate list in place;
/// lists are never merged.
pub type Races = IndexMap<String, Vec<CandidateFragment>>;

const SECTION_SELECTOR: &str = "a[name]";
const SECTION_HEADER_SELECTOR: &str = "span.hdr14";
const OFFICE_SELECTOR: &str = "td";
const OFFICE_TITLE_SELECTOR: &str = "span.hdr13";

static ELECTION_NAV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+electNav=(\d+)").expect("invalid electNav regex"));
static SECTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+").expect("invalid section name regex"));

pub fn election_id_from_reference(page_reference: &str) -> Result<i64, ScrapeError> {
    ELECTION_NAV
        .captures(page_reference)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .ok_or_else(|| {
            ScrapeError::parse(page_reference, "no numeric electNav parameter in page reference")
        })
}

pub fn parse_election_page<N: Node>(
    root: &N,
    page_reference: &str,
) -> Result<ElectionPage, ScrapeError> {
    let election_id = election_id_from_reference(page_reference)?;

    let mut races = Races::new();
    for section in root.find_all(SECTION_SELECTOR) {
        let is_named = section
            .attribute("name")
            .is_some_and(|name| SECTION_NAME.is_match(name));
        if !is_named {
            continue;
        }
        if section.find(SECTION_HEADER_SELECTOR).is_none() {
            trace!("skipping section without header in {page_reference}");
            continue;
        }

        for office in section.find_all(OFFICE_SELECTOR) {
            let Some(title) = office.find(OFFICE_TITLE_SELECTOR) else {
                continue;
            };
            let office_name = title.text();
            trace!("scraping office {office_name}");

            let candidates = collect_candidates(&office)?;
            races.insert(office_name, candidates);
        }
    }

    Ok(ElectionPage { election_id, races })
}
