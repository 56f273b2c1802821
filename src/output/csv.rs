use anyhow::Result;

use crate::models::{ScrapedCandidate, ScrapedElection};
use crate::pipeline::{FailedPage, ProcessSummary};

pub fn elections_to_csv(elections: &[ScrapedElection]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["id", "name", "year", "election_id", "sort_index", "created_at"])?;
    for e in elections {
        writer.write_record([
            e.id.to_string(),
            e.name.clone(),
            e.year.to_string(),
            e.election_id.to_string(),
            e.sort_index.to_string(),
            e.created_at.to_rfc3339(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn candidates_to_csv(candidates: &[ScrapedCandidate]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["id", "name", "scraped_id", "office_name", "election", "created_at"])?;
    for c in candidates {
        writer.write_record([
            c.id.to_string(),
            c.name.clone(),
            c.scraped_id.clone(),
            c.office_name.clone(),
            c.election.map(|id| id.to_string()).unwrap_or_default(),
            c.created_at.to_rfc3339(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// One-row summary of a scrape run.
pub fn summary_to_csv(summary: &ProcessSummary, failed: &[FailedPage]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "elections",
        "elections_created",
        "candidates",
        "candidates_created",
        "candidates_linked",
        "skipped_pages",
    ])?;
    writer.write_record([
        summary.elections.to_string(),
        summary.elections_created.to_string(),
        summary.candidates.to_string(),
        summary.candidates_created.to_string(),
        summary.candidates_linked.to_string(),
        failed.len().to_string(),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
