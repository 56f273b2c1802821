use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedElection {
    pub id: i64,
    pub name: String,
    pub year: i32,
    /// Numeric `electNav` identifier used by the source site.
    pub election_id: i64,
    pub sort_index: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedCandidate {
    pub id: i64,
    pub name: String,
    pub scraped_id: String,
    pub office_name: String,
    /// Row id of the election the candidate was first seen in.
    pub election: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for ScrapedElection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (electNav={})", self.name, self.election_id)
    }
}

impl std::fmt::Display for ScrapedCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scraped_id.is_empty() {
            write!(f, "{} for {}", self.name, self.office_name)
        } else {
            write!(f, "{} [{}] for {}", self.name, self.scraped_id, self.office_name)
        }
    }
}
