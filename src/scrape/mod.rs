pub mod candidate;
pub mod election;
pub mod listing;

use serde::{Deserialize, Serialize};

pub use candidate::{extract_linked, extract_unlinked};
pub use election::{election_id_from_reference, parse_election_page, Races};
pub use listing::parse_listing;

/// One qualifying entry of the election listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionLink {
    pub page_reference: String,
    pub election_name: String,
    pub election_year: i32,
    pub sort_index: u32,
}

/// A candidate as it appears under one office on an election page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFragment {
    pub name: String,
    /// Numeric campaign id, or empty for candidates without a detail page.
    pub scraped_id: String,
}

impl CandidateFragment {
    pub fn is_linked(&self) -> bool {
        !self.scraped_id.is_empty()
    }
}

/// Parsed content of a single election page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionPage {
    pub election_id: i64,
    pub races: Races,
}

/// An election page joined with its listing metadata, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResult {
    pub election_name: String,
    pub election_year: i32,
    pub sort_index: u32,
    pub election_id: i64,
    pub races: Races,
}

impl ElectionResult {
    pub fn from_parts(link: &ElectionLink, page: ElectionPage) -> Self {
        Self {
            election_name: link.election_name.clone(),
            election_year: link.election_year,
            sort_index: link.sort_index,
            election_id: page.election_id,
            races: page.races,
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.races.values().map(Vec::len).sum()
    }
}
