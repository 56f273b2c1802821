pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS scraped_election (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    year INTEGER NOT NULL,
    election_id INTEGER NOT NULL,
    sort_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(name, year, election_id, sort_index)
);
CREATE INDEX IF NOT EXISTS idx_election_sort_index
    ON scraped_election(sort_index DESC);

CREATE TABLE IF NOT EXISTS scraped_candidate (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    scraped_id TEXT NOT NULL,
    office_name TEXT NOT NULL,
    election INTEGER REFERENCES scraped_election(id),
    created_at TEXT NOT NULL,
    UNIQUE(name, scraped_id, office_name)
);
CREATE INDEX IF NOT EXISTS idx_candidate_office
    ON scraped_candidate(office_name);
CREATE INDEX IF NOT EXISTS idx_candidate_election
    ON scraped_candidate(election);
"#;
