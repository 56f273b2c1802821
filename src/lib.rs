//! Scrapes the CAL-ACCESS certified candidate listings into a normalized
//! election / office / candidate store.

pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scrape;
pub mod store;
