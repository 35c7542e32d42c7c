use std::path::PathBuf;
use tempfile::TempDir;
use tsung_report_cli::commands::report::{ReportOptions, build_report};
use tsung_report_core::analysis::{Cell, Table, TableKind};

/// Helper to get path to the fixture run directory
fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("tsung_20250505-1039")
}

fn table(tables: &[Table], kind: TableKind) -> &Table {
    tables
        .iter()
        .find(|t| t.id == kind)
        .expect("table should be present")
}

fn row_text(table: &Table, name: &str) -> Vec<String> {
    table
        .rows
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("row {} missing", name))
        .cells
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Test that a run directory resolves to its tsung.log and yields the full report
#[test]
fn test_build_report_from_run_directory() {
    // Act
    let report = build_report(&fixture_dir(), &ReportOptions::default()).unwrap();

    // Assert
    assert_eq!(report.title, "20250505-1039");
    assert_eq!(report.start_timestamp, 1746441567);
    assert_eq!(report.duration_secs, 30);
    assert_eq!(report.tables.len(), TableKind::ALL.len());
    assert_eq!(report.parse_report.dropped_lines, 1);
    assert_eq!(report.parse_report.samples[0].reason, "unrecognized metric 'session'");
}

/// Test transaction arithmetic, exclusions and zero-count buckets on real-looking data
#[test]
fn test_transaction_table_from_fixture() {
    let report = build_report(&fixture_dir(), &ReportOptions::default()).unwrap();
    let transactions = table(&report.tables, TableKind::Transaction);

    let names: Vec<&str> = transactions.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["tr_cb_login", "tr_registration"]);

    assert_eq!(
        row_text(transactions, "tr_cb_login"),
        vec!["0.30 sec", "0.10 sec", "0.40/sec", "0.20/sec", "0.20 sec", "6"]
    );
}

/// Test counter tables use each metric's own first appearance
#[test]
fn test_http_and_error_tables_from_fixture() {
    let report = build_report(&fixture_dir(), &ReportOptions::default()).unwrap();

    let http = table(&report.tables, TableKind::Http);
    let codes: Vec<&str> = http.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(codes, vec!["200", "302", "404"]);
    assert_eq!(row_text(http, "200"), vec!["2.00/sec", "1.55/sec", "31"]);
    assert_eq!(row_text(http, "302"), vec!["0.40/sec", "n/a", "4"]);

    let errors = table(&report.tables, TableKind::Errors);
    assert_eq!(
        row_text(errors, "error_connect_timeout"),
        vec!["0.30/sec", "0.40/sec", "4"]
    );
}

/// Test network, users and server tables
#[test]
fn test_unit_tables_from_fixture() {
    let report = build_report(&fixture_dir(), &ReportOptions::default()).unwrap();

    let network = table(&report.tables, TableKind::Network);
    assert_eq!(row_text(network, "size_rcv"), vec!["5.73 Mbits/sec", "7.17 MB"]);

    let users = table(&report.tables, TableKind::Users);
    assert_eq!(
        users.rows.iter().find(|r| r.name == "users").unwrap().cells,
        vec![Cell::Integer(5)]
    );

    let server = table(&report.tables, TableKind::Server);
    assert_eq!(row_text(server, "cpu@loadgen1"), vec!["47.75%", "12.50%"]);
    assert_eq!(row_text(server, "freemem@loadgen1"), vec!["2048.50 MB", "1900.00 MB"]);
}

/// Test the chart subset and x anchoring
#[test]
fn test_selected_charts_from_fixture() {
    let options = ReportOptions {
        tables: vec!["http".to_string()],
        charts: vec!["transactions_rate".to_string()],
        ..Default::default()
    };
    let report = build_report(&fixture_dir(), &options).unwrap();

    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.charts.len(), 1);

    let login = report.charts[0]
        .series
        .iter()
        .find(|s| s.label == "tr_cb_login")
        .unwrap();
    let xs: Vec<i64> = login.data.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![10, 20, 30]);
}

/// Test that unknown ids are rejected rather than ignored
#[test]
fn test_unknown_table_is_rejected() {
    let options = ReportOptions {
        tables: vec!["latency".to_string()],
        ..Default::default()
    };

    let result = build_report(&fixture_dir(), &options);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown table: latency"));
}

/// Test that a missing log is an error
#[test]
fn test_missing_log_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let result = build_report(temp_dir.path(), &ReportOptions::default());

    assert!(result.is_err());
}

/// Test that --output writes the JSON report
#[test]
fn test_execute_writes_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("report.json");

    let result = tsung_report_cli::commands::report::execute(
        &fixture_dir(),
        &ReportOptions::default(),
        Some(output.clone()),
        tsung_report_cli::OutputFormat::Pretty,
    );

    assert!(result.is_ok(), "Should successfully write the report");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["title"], "20250505-1039");
    assert_eq!(value["charts"][0]["id"], "transactions_mean");
}
