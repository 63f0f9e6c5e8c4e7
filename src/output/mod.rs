//! Output module for exporting product links and reporting runs
//!
//! This module handles:
//! - Writing each domain's product links to a CSV file
//! - Printing the run summary to the console
//! - Generating an optional markdown summary

mod csv_export;
mod markdown;
pub mod stats;
mod traits;

pub use csv_export::{CsvExporter, LINK_COLUMN};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_summary;
pub use traits::{
    DomainOutcome, DomainSummary, Exporter, OutputError, OutputResult, RunSummary,
};
