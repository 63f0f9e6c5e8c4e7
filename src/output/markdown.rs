//! Markdown summary generation
//!
//! This module renders the run summary as a markdown report: run metadata, totals
//! and one table row per domain.

use crate::output::traits::{DomainOutcome, OutputResult, RunSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a run
///
/// # Arguments
///
/// * `summary` - The run summary
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sitemap Harvest Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: `{}`\n", hash));
    }
    md.push('\n');

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Domains**: {}\n", summary.domains.len()));
    md.push_str(&format!(
        "- **Completed**: {} ({} empty)\n",
        summary.completed(),
        summary.empty()
    ));
    md.push_str(&format!("- **Unreachable**: {}\n", summary.unreachable()));
    md.push_str(&format!("- **Aborted**: {}\n", summary.aborted()));
    md.push_str(&format!("- **Product Links**: {}\n\n", summary.total_links()));

    if summary.domains.is_empty() {
        return md;
    }

    md.push_str("## Domains\n\n");
    md.push_str("| Site | Outcome | Links | Sitemaps | Skipped | Fetching | Detail |\n");
    md.push_str("|------|---------|-------|----------|---------|----------|--------|\n");
    for domain in &summary.domains {
        let detail = match &domain.outcome {
            DomainOutcome::Completed { export, .. } => format!("`{}`", export.display()),
            DomainOutcome::Unreachable { reason } | DomainOutcome::Aborted { reason } => {
                reason.replace('|', "\\|")
            }
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            domain.site,
            domain.outcome.label(),
            domain.outcome.link_count(),
            domain.sitemaps_visited,
            domain.sitemaps_skipped,
            domain.strategy,
            detail
        ));
    }

    md
}
