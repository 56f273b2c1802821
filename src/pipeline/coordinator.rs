use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::scrape::ElectionResult;
use crate::store::{CandidateIdentity, ElectionIdentity, RecordStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub elections: usize,
    pub elections_created: usize,
    pub candidates: usize,
    pub candidates_created: usize,
    pub candidates_linked: usize,
}

/// Persists scraped elections and their candidates.
///
/// Every upsert commits on its own. A newly created candidate is linked to
/// the election being processed; an existing one keeps whatever election it
/// was first linked to.
pub fn process_results<S: RecordStore + ?Sized>(
    store: &S,
    results: &[ElectionResult],
) -> Result<ProcessSummary> {
    info!("processing {} elections", results.len());
    let mut summary = ProcessSummary::default();

    for data in results {
        info!("processing {}", data.election_name);
        let election = store
            .upsert(&ElectionIdentity {
                name: data.election_name.clone(),
                year: data.election_year,
                election_id: data.election_id,
                sort_index: data.sort_index,
            })
            .with_context(|| format!("failed storing election {}", data.election_name))?;
        summary.elections += 1;
        if election.created {
            summary.elections_created += 1;
            debug!("created {}", election.record);
        }

        for (office_name, candidates) in &data.races {
            for candidate in candidates {
                let identity = CandidateIdentity {
                    name: candidate.name.clone(),
                    scraped_id: candidate.scraped_id.clone(),
                    office_name: office_name.clone(),
                };
                let stored = store
                    .upsert(&identity)
                    .with_context(|| format!("failed storing candidate {}", candidate.name))?;
                summary.candidates += 1;
                if stored.created {
                    summary.candidates_created += 1;
                    store
                        .link_candidate_election(stored.record.id, election.record.id)
                        .with_context(|| format!("failed linking candidate {}", candidate.name))?;
                    summary.candidates_linked += 1;
                    debug!("created {}", stored.record);
                }
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};

    use crate::models::{ScrapedCandidate, ScrapedElection};
    use crate::pipeline::coordinator::process_results;
    use crate::scrape::{CandidateFragment, ElectionResult, Races};
    use crate::store::{
        CandidateFilter, CandidateIdentity, ElectionIdentity, RecordStore, SqliteStore,
        StoreCounts, Upsert, Upserted,
    };

    fn fragment(name: &str, scraped_id: &str) -> CandidateFragment {
        CandidateFragment {
            name: name.to_string(),
            scraped_id: scraped_id.to_string(),
        }
    }

    fn result(name: &str, election_id: i64, sort_index: u32, races: Races) -> ElectionResult {
        ElectionResult {
            election_name: name.to_string(),
            election_year: name[..4].parse().expect("bad year"),
            sort_index,
            election_id,
            races,
        }
    }

    fn senate_race() -> Races {
        let mut races = Races::new();
        races.insert(
            "State Senate".to_string(),
            vec![fragment("Jane Doe", "1234"), fragment("John Roe", "")],
        );
        races
    }

    #[test]
    fn second_run_creates_nothing() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let results = vec![result("2014 General", 64, 1, senate_race())];

        let first = process_results(&store, &results).expect("failed first run");
        assert_eq!(first.elections_created, 1);
        assert_eq!(first.candidates_created, 2);
        assert_eq!(first.candidates_linked, 2);
        let jane = store
            .find_candidate(&CandidateIdentity {
                name: "Jane Doe".to_string(),
                scraped_id: "1234".to_string(),
                office_name: "State Senate".to_string(),
            })
            .expect("failed lookup")
            .expect("missing candidate");

        let second = process_results(&store, &results).expect("failed second run");
        assert_eq!(second.elections_created, 0);
        assert_eq!(second.candidates_created, 0);
        assert_eq!(second.candidates_linked, 0);
        assert_eq!(second.candidates, 2);

        let again = store
            .find_candidate(&CandidateIdentity {
                name: "Jane Doe".to_string(),
                scraped_id: "1234".to_string(),
                office_name: "State Senate".to_string(),
            })
            .expect("failed lookup")
            .expect("missing candidate");
        assert_eq!(again, jane);
        let counts = store.counts().expect("failed counts");
        assert_eq!((counts.elections, counts.candidates), (1, 2));
    }

    #[test]
    fn candidate_keeps_first_seen_election() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let results = vec![
            result("2016 Primary", 65, 2, senate_race()),
            result("2014 General", 64, 1, senate_race()),
        ];
        process_results(&store, &results).expect("failed run");

        let elections = store.list_elections().expect("failed list");
        let primary = elections
            .iter()
            .find(|e| e.election_id == 65)
            .expect("missing primary");
        let candidates = store
            .list_candidates(&Default::default())
            .expect("failed list");
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.election == Some(primary.id)));
    }

    #[test]
    fn office_name_is_part_of_candidate_identity() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let mut races = senate_race();
        races.insert("Assembly 07".to_string(), vec![fragment("Jane Doe", "1234")]);
        let summary = process_results(&store, &[result("2014 General", 64, 1, races)])
            .expect("failed run");
        assert_eq!(summary.candidates_created, 3);
    }

    /// Wraps a real store but refuses to link candidates.
    struct NoLinkStore(SqliteStore);

    impl Upsert<ElectionIdentity> for NoLinkStore {
        fn upsert(&self, identity: &ElectionIdentity) -> Result<Upserted<ScrapedElection>> {
            self.0.upsert(identity)
        }
    }

    impl Upsert<CandidateIdentity> for NoLinkStore {
        fn upsert(&self, identity: &CandidateIdentity) -> Result<Upserted<ScrapedCandidate>> {
            self.0.upsert(identity)
        }
    }

    impl RecordStore for NoLinkStore {
        fn link_candidate_election(&self, _candidate: i64, _election: i64) -> Result<()> {
            Err(anyhow!("database is locked"))
        }

        fn find_candidate(&self, identity: &CandidateIdentity) -> Result<Option<ScrapedCandidate>> {
            self.0.find_candidate(identity)
        }

        fn list_elections(&self) -> Result<Vec<ScrapedElection>> {
            self.0.list_elections()
        }

        fn list_candidates(&self, filter: &CandidateFilter) -> Result<Vec<ScrapedCandidate>> {
            self.0.list_candidates(filter)
        }

        fn counts(&self) -> Result<StoreCounts> {
            self.0.counts()
        }
    }

    #[test]
    fn failed_link_names_the_candidate() {
        let store = NoLinkStore(SqliteStore::open_in_memory().expect("failed to open store"));
        let err = process_results(&store, &[result("2014 General", 64, 1, senate_race())])
            .expect_err("expected link failure");
        let message = format!("{err:#}");
        assert!(message.contains("failed linking candidate Jane Doe"));
        assert!(message.contains("database is locked"));
    }
}
