use super::Report;
use crate::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub struct ReportWriter;

impl ReportWriter {
    /// Write a report to a file as pretty JSON
    pub fn to_file(report: &Report, path: &Path) -> Result<()> {
        tracing::debug!("Writing report to: {}", path.display());

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        tracing::info!(
            "Wrote report '{}' with {} tables and {} charts to {}",
            report.title,
            report.tables.len(),
            report.charts.len(),
            path.display()
        );

        Ok(())
    }

    /// Convert a report to a pretty JSON string
    pub fn to_string(report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Convert a report to a compact JSON string
    pub fn to_string_compact(report: &Report) -> Result<String> {
        Ok(serde_json::to_string(report)?)
    }
}
