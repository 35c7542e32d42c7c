mod writer;

pub use writer::ReportWriter;

use crate::analysis::{Chart, ChartBuilder, ChartKind, Table, TableBuilder, TableKind};
use crate::classify::{Classifier, DEFAULT_EXCLUDED_TRANSACTIONS};
use crate::log::{LOG_FILE_NAME, ParseReport, TsungLog};
use crate::series::TimeSeriesStore;
use crate::Result;
use chrono::DateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Prefix of the per-run directory the harness creates
const RUN_DIR_PREFIX: &str = "tsung_";

/// What to put into a report
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub title: Option<String>,
    pub tables: Vec<String>,
    pub charts: Vec<String>,
    pub excluded_transactions: BTreeSet<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: None,
            tables: TableKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            charts: ChartKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            excluded_transactions: DEFAULT_EXCLUDED_TRANSACTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Everything a template needs to render one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub duration_secs: i64,
    pub started_at: Option<String>,
    pub tables: Vec<Table>,
    pub charts: Vec<Chart>,
    pub unclassified: Vec<String>,
    pub parse_report: ParseReport,
}

impl Report {
    pub fn build(log: &TsungLog, config: &ReportConfig) -> Result<Self> {
        tracing::debug!(
            "Building report: {} tables, {} charts",
            config.tables.len(),
            config.charts.len()
        );

        let table_kinds = config
            .tables
            .iter()
            .map(|id| id.parse::<TableKind>())
            .collect::<Result<Vec<_>>>()?;
        let chart_kinds = config
            .charts
            .iter()
            .map(|id| id.parse::<ChartKind>())
            .collect::<Result<Vec<_>>>()?;

        let classification =
            Classifier::new(config.excluded_transactions.iter().cloned()).classify_log(log);
        let store = TimeSeriesStore::build(log, &classification)?;

        let table_builder = TableBuilder::new(&store, &classification);
        let tables = table_kinds
            .into_iter()
            .map(|kind| table_builder.table(kind))
            .collect();
        let chart_builder = ChartBuilder::new(&store, &classification);
        let charts = chart_kinds
            .into_iter()
            .map(|kind| chart_builder.chart(kind))
            .collect::<Result<Vec<_>>>()?;

        let started = DateTime::from_timestamp(store.start_timestamp(), 0);
        let title = config
            .title
            .clone()
            .or_else(|| started.map(|dt| dt.format("%Y%m%d-%H%M").to_string()))
            .unwrap_or_else(|| store.start_timestamp().to_string());

        tracing::info!(
            "Report '{}' covers {} seconds across {} metrics",
            title,
            store.duration_secs(),
            store.len()
        );

        Ok(Self {
            title,
            start_timestamp: store.start_timestamp(),
            end_timestamp: store.end_timestamp(),
            duration_secs: store.duration_secs(),
            started_at: started.map(|dt| dt.to_rfc3339()),
            tables,
            charts,
            unclassified: classification.unclassified().map(String::from).collect(),
            parse_report: log.parse_report.clone(),
        })
    }
}

/// Run name taken from a `tsung_<date>` directory, given the directory or the log inside it
pub fn run_title(path: &Path) -> Option<String> {
    let dir = if path.file_name().is_some_and(|name| name == LOG_FILE_NAME) {
        path.parent()?
    } else {
        path
    };
    dir.file_name()?
        .to_str()?
        .strip_prefix(RUN_DIR_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::log::LogReader;

    const LOG: &str = "\
# stats: dump at 1746441567
# stats: dump at 1746441577
stats: tr_login 2 100.0 0 100 100 0 0
stats: tr_set_var 1 0.4 0 0.4 0.4 0 0
stats: session 1 1.0 0 1 1 0 0
";

    #[test]
    fn test_default_report() {
        let log = LogReader::from_str(LOG).unwrap();
        let report = Report::build(&log, &ReportConfig::default()).unwrap();

        assert_eq!(report.title, "20250505-1039");
        assert_eq!(report.duration_secs, 10);
        assert_eq!(report.started_at.as_deref(), Some("2025-05-05T10:39:27+00:00"));
        assert_eq!(report.tables.len(), TableKind::ALL.len());
        assert_eq!(report.charts.len(), ChartKind::ALL.len());
        assert_eq!(report.tables[0].rows.len(), 1);
        assert_eq!(report.parse_report.dropped_lines, 1);
    }

    #[test]
    fn test_custom_selection_and_exclusions() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = ReportConfig {
            title: Some("nightly".to_string()),
            tables: vec!["transaction".to_string()],
            charts: vec![],
            excluded_transactions: BTreeSet::new(),
        };
        let report = Report::build(&log, &config).unwrap();

        assert_eq!(report.title, "nightly");
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].rows.len(), 2);
        assert!(report.charts.is_empty());
    }

    #[test]
    fn test_unknown_ids_fail_the_report() {
        let log = LogReader::from_str(LOG).unwrap();
        let config = ReportConfig {
            charts: vec!["pie".to_string()],
            ..Default::default()
        };

        assert!(matches!(
            Report::build(&log, &config),
            Err(Error::UnknownChart(_))
        ));
    }

    #[test]
    fn test_ids_resolved_before_building() {
        let config = ReportConfig {
            tables: vec!["transaction".to_string()],
            charts: vec!["pie".to_string()],
            ..Default::default()
        };

        // Nothing to build from, yet the bad chart id is what gets reported
        let empty = LogReader::from_str("").unwrap();
        assert!(matches!(
            Report::build(&empty, &config),
            Err(Error::UnknownChart(ref id)) if id == "pie"
        ));
        assert!(matches!(
            Report::build(&empty, &ReportConfig::default()),
            Err(Error::EmptyLog)
        ));
    }

    #[test]
    fn test_run_title() {
        assert_eq!(
            run_title(Path::new("logs/tsung_20250505-1039")).as_deref(),
            Some("20250505-1039")
        );
        assert_eq!(
            run_title(Path::new("logs/tsung_20250505-1039/tsung.log")).as_deref(),
            Some("20250505-1039")
        );
        assert_eq!(run_title(Path::new("logs/other/tsung.log")), None);
        assert_eq!(run_title(Path::new("tsung_")), None);
    }
}
