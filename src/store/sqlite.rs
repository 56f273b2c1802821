use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{ScrapedCandidate, ScrapedElection};
use crate::store::migrations::BASE_MIGRATION;
use crate::store::{
    CandidateFilter, CandidateIdentity, ElectionIdentity, RecordStore, StoreCounts, Upsert,
    Upserted,
};

const ELECTION_COLUMNS: &str = "id, name, year, election_id, sort_index, created_at";
const CANDIDATE_COLUMNS: &str = "id, name, scraped_id, office_name, election, created_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    fn election_by_identity(&self, identity: &ElectionIdentity) -> Result<Option<ScrapedElection>> {
        let sql = format!(
            "SELECT {ELECTION_COLUMNS} FROM scraped_election
             WHERE name = ?1 AND year = ?2 AND election_id = ?3 AND sort_index = ?4"
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![
                    identity.name,
                    identity.year,
                    identity.election_id,
                    identity.sort_index
                ],
                row_to_election,
            )
            .optional()?;
        Ok(row)
    }
}

impl Upsert<ElectionIdentity> for SqliteStore {
    fn upsert(&self, identity: &ElectionIdentity) -> Result<Upserted<ScrapedElection>> {
        let inserted = self.conn.execute(
            r#"
INSERT INTO scraped_election(name, year, election_id, sort_index, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(name, year, election_id, sort_index) DO NOTHING
"#,
            params![
                identity.name,
                identity.year,
                identity.election_id,
                identity.sort_index,
                Utc::now().to_rfc3339()
            ],
        )?;
        let record = self
            .election_by_identity(identity)?
            .ok_or_else(|| anyhow!("election {} vanished after upsert", identity.name))?;
        Ok(Upserted {
            record,
            created: inserted == 1,
        })
    }
}

impl Upsert<CandidateIdentity> for SqliteStore {
    fn upsert(&self, identity: &CandidateIdentity) -> Result<Upserted<ScrapedCandidate>> {
        let inserted = self.conn.execute(
            r#"
INSERT INTO scraped_candidate(name, scraped_id, office_name, created_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(name, scraped_id, office_name) DO NOTHING
"#,
            params![
                identity.name,
                identity.scraped_id,
                identity.office_name,
                Utc::now().to_rfc3339()
            ],
        )?;
        let record = self
            .find_candidate(identity)?
            .ok_or_else(|| anyhow!("candidate {} vanished after upsert", identity.name))?;
        Ok(Upserted {
            record,
            created: inserted == 1,
        })
    }
}

impl RecordStore for SqliteStore {
    fn link_candidate_election(&self, candidate: i64, election: i64) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE scraped_candidate SET election = ?1 WHERE id = ?2",
            params![election, candidate],
        )?;
        if updated == 0 {
            return Err(anyhow!("no candidate row with id {candidate}"));
        }
        Ok(())
    }

    fn find_candidate(&self, identity: &CandidateIdentity) -> Result<Option<ScrapedCandidate>> {
        let sql = format!(
            "SELECT {CANDIDATE_COLUMNS} FROM scraped_candidate
             WHERE name = ?1 AND scraped_id = ?2 AND office_name = ?3"
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![identity.name, identity.scraped_id, identity.office_name],
                row_to_candidate,
            )
            .optional()?;
        Ok(row)
    }

    fn list_elections(&self) -> Result<Vec<ScrapedElection>> {
        let sql = format!(
            "SELECT {ELECTION_COLUMNS} FROM scraped_election ORDER BY sort_index DESC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_election)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_candidates(&self, filter: &CandidateFilter) -> Result<Vec<ScrapedCandidate>> {
        let sql = r#"
SELECT c.id, c.name, c.scraped_id, c.office_name, c.election, c.created_at
FROM scraped_candidate c
LEFT JOIN scraped_election e ON e.id = c.election
WHERE (?1 IS NULL OR c.office_name = ?1)
  AND (?2 IS NULL OR e.election_id = ?2)
ORDER BY c.id ASC
"#;
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(
                params![filter.office_name, filter.election_id],
                row_to_candidate,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn counts(&self) -> Result<StoreCounts> {
        let elections: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM scraped_election", [], |row| row.get(0))?;
        let (candidates, unlinked): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(scraped_id = ''), 0) FROM scraped_candidate",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(StoreCounts {
            elections: elections as u64,
            candidates: candidates as u64,
            unlinked_candidates: unlinked as u64,
        })
    }
}

/// `created_at` is always column 5 in the row mappers below.
fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err)))
}

fn row_to_election(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScrapedElection> {
    let created_at: String = row.get(5)?;
    Ok(ScrapedElection {
        id: row.get(0)?,
        name: row.get(1)?,
        year: row.get(2)?,
        election_id: row.get(3)?,
        sort_index: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_candidate(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScrapedCandidate> {
    let created_at: String = row.get(5)?;
    Ok(ScrapedCandidate {
        id: row.get(0)?,
        name: row.get(1)?,
        scraped_id: row.get(2)?,
        office_name: row.get(3)?,
        election: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::types::Type;

    use crate::store::{
        CandidateFilter, CandidateIdentity, ElectionIdentity, RecordStore, SqliteStore, Upsert,
    };

    fn election(name: &str, election_id: i64, sort_index: u32) -> ElectionIdentity {
        ElectionIdentity {
            name: name.to_string(),
            year: 2014,
            election_id,
            sort_index,
        }
    }

    fn candidate(name: &str, scraped_id: &str, office: &str) -> CandidateIdentity {
        CandidateIdentity {
            name: name.to_string(),
            scraped_id: scraped_id.to_string(),
            office_name: office.to_string(),
        }
    }

    #[test]
    fn election_upsert_is_idempotent() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let first = store
            .upsert(&election("2014 General", 64, 1))
            .expect("failed upsert");
        let second = store
            .upsert(&election("2014 General", 64, 1))
            .expect("failed upsert");
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.record, second.record);

        let shifted = store
            .upsert(&election("2014 General", 64, 2))
            .expect("failed upsert");
        assert!(shifted.created);
        assert_eq!(store.list_elections().expect("failed list").len(), 2);
    }

    #[test]
    fn candidate_identity_includes_office() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let senate = store
            .upsert(&candidate("Jane Doe", "1234", "State Senate"))
            .expect("failed upsert");
        let assembly = store
            .upsert(&candidate("Jane Doe", "1234", "Assembly 07"))
            .expect("failed upsert");
        let again = store
            .upsert(&candidate("Jane Doe", "1234", "State Senate"))
            .expect("failed upsert");
        assert!(senate.created && assembly.created);
        assert!(!again.created);
        assert_eq!(again.record.id, senate.record.id);
        assert_eq!(again.record.election, None);
    }

    #[test]
    fn links_and_filters_candidates() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        let general = store
            .upsert(&election("2014 General", 64, 1))
            .expect("failed upsert")
            .record;
        let jane = store
            .upsert(&candidate("Jane Doe", "1234", "State Senate"))
            .expect("failed upsert")
            .record;
        store
            .upsert(&candidate("John Roe", "", "Governor"))
            .expect("failed upsert");
        store
            .link_candidate_election(jane.id, general.id)
            .expect("failed link");

        let found = store
            .find_candidate(&candidate("Jane Doe", "1234", "State Senate"))
            .expect("failed find")
            .expect("missing candidate");
        assert_eq!(found.election, Some(general.id));

        let by_election = store
            .list_candidates(&CandidateFilter {
                election_id: Some(64),
                ..CandidateFilter::default()
            })
            .expect("failed list");
        assert_eq!(by_election.len(), 1);

        let by_office = store
            .list_candidates(&CandidateFilter {
                office_name: Some("Governor".to_string()),
                ..CandidateFilter::default()
            })
            .expect("failed list");
        assert_eq!(by_office[0].name, "John Roe");

        let counts = store.counts().expect("failed counts");
        assert_eq!(counts.elections, 1);
        assert_eq!(counts.candidates, 2);
        assert_eq!(counts.unlinked_candidates, 1);

        assert!(store.link_candidate_election(999, general.id).is_err());
    }

    #[test]
    fn corrupt_timestamp_is_an_error() {
        let store = SqliteStore::open_in_memory().expect("failed to open store");
        store
            .upsert(&election("2014 General", 64, 1))
            .expect("failed upsert");
        store
            .conn
            .execute("UPDATE scraped_election SET created_at = 'garbage'", [])
            .expect("failed update");
        let err = store.list_elections().expect_err("expected conversion failure");
        assert!(matches!(
            err.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::FromSqlConversionFailure(5, Type::Text, _))
        ));
    }
}
