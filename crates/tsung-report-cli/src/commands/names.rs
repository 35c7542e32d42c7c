use crate::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;
use tsung_report_core::classify::{Category, Classification, Classifier};
use tsung_report_core::log::LogReader;

use super::report::ReportOptions;

/// Classify every metric name found in a log, with the same transaction
/// exclusions `report` would apply for these options
pub fn classify_names(path: &Path, options: &ReportOptions) -> Result<Classification> {
    let log = LogReader::from_file(path)
        .with_context(|| format!("Failed to read stats log at {}", path.display()))?;
    let excluded = options.to_config(path).excluded_transactions;
    Ok(Classifier::new(excluded).classify_log(&log))
}

pub fn execute(path: &Path, options: &ReportOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Classifying metric names in: {}", path.display());

    let classification = classify_names(path, options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&classification)?),
        OutputFormat::Table => {
            println!("Category,Name");
            for category in Category::ALL {
                for name in classification.names(category) {
                    println!("{},{}", category, name);
                }
            }
            for name in classification.unclassified() {
                println!("unclassified,{}", name);
            }
        }
        OutputFormat::Pretty => output_pretty(&classification),
    }

    Ok(())
}

fn output_pretty(classification: &Classification) {
    use console::style;

    for category in Category::ALL {
        let names = classification.names(category);
        if names.is_empty() {
            continue;
        }
        println!("\n{} ({})", style(category).bold(), names.len());
        let reported = classification.reported_names(category);
        for name in names {
            if reported.contains(&name) {
                println!("  {}", name);
            } else {
                println!("  {} {}", style(name).dim(), style("(excluded)").dim());
            }
        }
    }

    let unclassified: Vec<&str> = classification.unclassified().collect();
    if !unclassified.is_empty() {
        println!(
            "\n{} ({})",
            style("unclassified").bold().yellow(),
            unclassified.len()
        );
        for name in unclassified {
            println!("  {}", style(name).dim());
        }
    }

    println!();
}
