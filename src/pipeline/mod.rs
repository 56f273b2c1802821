pub mod coordinator;
pub mod runner;

pub use coordinator::{process_results, ProcessSummary};
pub use runner::{build_results, FailedPage, RunOptions, ScrapeRun};
