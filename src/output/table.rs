use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::models::{ScrapedCandidate, ScrapedElection};
use crate::pipeline::{FailedPage, ProcessSummary};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_elections_table(elections: &[ScrapedElection]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Sort", "Election", "Year", "electNav", "Stored"]);
    for e in elections {
        table.add_row(vec![
            e.sort_index.to_string(),
            e.name.clone(),
            e.year.to_string(),
            e.election_id.to_string(),
            e.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_candidates_table(candidates: &[ScrapedCandidate]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Office", "Candidate", "Scraped ID", "Election Row"]);
    for c in candidates {
        let id_cell = if c.scraped_id.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(&c.scraped_id)
        };
        table.add_row(Row::from(vec![
            Cell::new(&c.office_name),
            Cell::new(&c.name),
            id_cell,
            Cell::new(
                c.election
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }
    table.to_string()
}

pub fn render_summary_table(summary: &ProcessSummary, failed: &[FailedPage]) -> String {
    let mut table = new_table();
    table.set_header(vec!["", "Seen", "Created", "Linked"]);
    table.add_row(vec![
        "Elections".to_string(),
        summary.elections.to_string(),
        summary.elections_created.to_string(),
        String::new(),
    ]);
    table.add_row(vec![
        "Candidates".to_string(),
        summary.candidates.to_string(),
        summary.candidates_created.to_string(),
        summary.candidates_linked.to_string(),
    ]);
    if !failed.is_empty() {
        table.add_row(Row::from(vec![
            Cell::new("Skipped pages").fg(Color::Red),
            Cell::new(failed.len().to_string()),
            Cell::new(""),
            Cell::new(""),
        ]));
    }
    table.to_string()
}
