//! CSV export of product links
//!
//! One file per domain, `<site>_products.csv`, with a single `Product Link` column.

use crate::crawler::ProductLinks;
use crate::output::traits::{Exporter, OutputError, OutputResult};
use crate::url::Domain;
use std::fs;
use std::path::{Path, PathBuf};

/// Column header of every export
pub const LINK_COLUMN: &str = "Product Link";

/// Writes each domain's links to a CSV file in a directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    directory: PathBuf,
}

impl CsvExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path the export for `domain` is written to
    pub fn path_for(&self, domain: &Domain) -> PathBuf {
        self.directory
            .join(format!("{}_products.csv", domain.export_stem()))
    }
}

impl Exporter for CsvExporter {
    fn export(&self, domain: &Domain, links: &ProductLinks) -> OutputResult<PathBuf> {
        if self.directory.exists() && !self.directory.is_dir() {
            return Err(OutputError::Write(format!(
                "{} is not a directory",
                self.directory.display()
            )));
        }
        fs::create_dir_all(&self.directory)?;

        let path = self.path_for(domain);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([LINK_COLUMN])?;
        for link in links.iter() {
            writer.write_record([link])?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} link(s) to {}", links.len(), path.display());
        Ok(path)
    }
}
