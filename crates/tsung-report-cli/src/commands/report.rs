use crate::OutputFormat;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tsung_report_core::analysis::{Chart, Table};
use tsung_report_core::log::LogReader;
use tsung_report_core::report::{self, Report, ReportConfig, ReportWriter};

/// Options of the `report` command, as parsed from flags and environment
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub tables: Vec<String>,
    pub charts: Vec<String>,
    pub exclude: Vec<String>,
    pub no_default_excludes: bool,
    pub title: Option<String>,
}

impl ReportOptions {
    /// Resolve into a core config; empty selections fall back to the full catalog
    pub fn to_config(&self, path: &Path) -> ReportConfig {
        let mut config = ReportConfig::default();

        if !self.tables.is_empty() {
            config.tables = self.tables.clone();
        }
        if !self.charts.is_empty() {
            config.charts = self.charts.clone();
        }
        if self.no_default_excludes {
            config.excluded_transactions.clear();
        }
        config
            .excluded_transactions
            .extend(self.exclude.iter().cloned());
        config.title = self.title.clone().or_else(|| report::run_title(path));

        config
    }
}

/// Parse a log and build the report data for it
pub fn build_report(path: &Path, options: &ReportOptions) -> Result<Report> {
    tracing::debug!("Reading stats log: {}", path.display());

    let log = LogReader::from_file(path)
        .with_context(|| format!("Failed to read stats log at {}", path.display()))?;
    let report = Report::build(&log, &options.to_config(path))?;

    Ok(report)
}

pub fn execute(
    path: &Path,
    options: &ReportOptions,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Building report for: {}", path.display());

    let report = build_report(path, options)?;

    if let Some(output_path) = output {
        ReportWriter::to_file(&report, &output_path)?;
        println!("Wrote report to {}", output_path.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", ReportWriter::to_string(&report)?),
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &Report) {
    use console::style;

    println!("\n{}", style(format!("Tsung Report: {}", report.title)).bold().cyan());
    println!(
        "  Started:  {}",
        report.started_at.as_deref().unwrap_or("unknown")
    );
    println!("  Duration: {} sec", style(report.duration_secs).yellow());

    for table in &report.tables {
        println!("\n{}", style(&table.title).bold());
        if table.rows.is_empty() {
            println!("  {}", style("No data").dim());
            continue;
        }
        for line in render_table(table) {
            println!("  {}", line);
        }
    }

    if !report.charts.is_empty() {
        println!("\n{}", style("Charts").bold());
        for chart in &report.charts {
            println!("  {}", chart_line(chart));
        }
    }

    let parse = &report.parse_report;
    if !parse.is_clean() {
        println!(
            "\n{}",
            style(format!(
                "Skipped {} of {} lines",
                parse.dropped_lines, parse.total_lines
            ))
            .yellow()
        );
        for dropped in &parse.samples {
            println!(
                "  line {}: {} ({})",
                dropped.line_number,
                style(&dropped.text).dim(),
                dropped.reason
            );
        }
    }

    println!(); // trailing newline
}

fn output_table(report: &Report) {
    for table in &report.tables {
        println!("{},{}", table.id, table.header.join(","));
        for row in &table.rows {
            let cells: Vec<String> = row.cells.iter().map(|c| c.to_string()).collect();
            println!("{},{},{}", table.id, row.name, cells.join(","));
        }
    }
}

/// Column-aligned lines: header, separator, rows
fn render_table(table: &Table) -> Vec<String> {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.name.clone())
                .chain(row.cells.iter().map(|c| c.to_string()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let pad = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![pad(table.header.as_slice())];
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(|row| pad(row.as_slice())));
    lines
}

fn chart_line(chart: &Chart) -> String {
    let points: usize = chart.series.iter().map(|s| s.data.len()).sum();
    format!(
        "{:<40} {} series, {} points ({} / {})",
        chart.title,
        chart.series.len(),
        points,
        chart.xheader,
        chart.yheader
    )
}
