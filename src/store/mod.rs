pub mod migrations;
pub mod sqlite;

use anyhow::Result;
use serde::Serialize;

use crate::models::{ScrapedCandidate, ScrapedElection};

pub use sqlite::SqliteStore;

/// Fields that decide whether a record already exists.
pub trait Identity {
    type Record;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElectionIdentity {
    pub name: String,
    pub year: i32,
    pub election_id: i64,
    pub sort_index: u32,
}

impl Identity for ElectionIdentity {
    type Record = ScrapedElection;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateIdentity {
    pub name: String,
    pub scraped_id: String,
    pub office_name: String,
}

impl Identity for CandidateIdentity {
    type Record = ScrapedCandidate;
}

#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

/// Create-if-absent keyed by the full identity. Existing records are
/// returned untouched.
pub trait Upsert<I: Identity> {
    fn upsert(&self, identity: &I) -> Result<Upserted<I::Record>>;
}

#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub office_name: Option<String>,
    /// External `electNav` id of the linked election.
    pub election_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub elections: u64,
    pub candidates: u64,
    pub unlinked_candidates: u64,
}

pub trait RecordStore: Upsert<ElectionIdentity> + Upsert<CandidateIdentity> {
    /// Sets the election back-reference of a candidate row.
    fn link_candidate_election(&self, candidate: i64, election: i64) -> Result<()>;
    fn find_candidate(&self, identity: &CandidateIdentity) -> Result<Option<ScrapedCandidate>>;
    fn list_elections(&self) -> Result<Vec<ScrapedElection>>;
    fn list_candidates(&self, filter: &CandidateFilter) -> Result<Vec<ScrapedCandidate>>;
    fn counts(&self) -> Result<StoreCounts>;
}
