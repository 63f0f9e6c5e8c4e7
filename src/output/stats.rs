//! Console report of a finished run

use crate::output::traits::{DomainOutcome, RunSummary};

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Domains attempted: {}", summary.domains.len());
    println!(
        "  Completed: {} ({} with no product links)",
        summary.completed(),
        summary.empty()
    );
    println!("  Unreachable: {}", summary.unreachable());
    println!("  Aborted: {}", summary.aborted());
    println!("  Product links: {}", summary.total_links());
    if let Some(duration) = summary.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!();

    if summary.domains.is_empty() {
        return;
    }

    println!("Domains:");
    for domain in &summary.domains {
        match &domain.outcome {
            DomainOutcome::Completed { links, export } => println!(
                "  {}: {} link(s) from {} sitemap(s) [{}] -> {}",
                domain.site,
                links,
                domain.sitemaps_visited,
                domain.strategy,
                export.display()
            ),
            DomainOutcome::Unreachable { reason } => {
                println!("  {}: unreachable ({})", domain.site, reason)
            }
            DomainOutcome::Aborted { reason } => {
                println!("  {}: aborted ({})", domain.site, reason)
            }
        }
    }
    println!();
}
