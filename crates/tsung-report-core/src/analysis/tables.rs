use super::format;
use super::stats::{self, ContinuousStats};
use crate::classify::{Category, Classification};
use crate::series::{TimeSeries, TimeSeriesStore};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const CONTINUOUS_HEADER: &[&str] = &[
    "Name",
    "Highest 10sec mean",
    "Lowest 10sec mean",
    "Highest Rate",
    "Mean Rate",
    "Mean",
    "Count",
];

/// Server monitoring sub-groups and the unit appended to their values
const SERVER_GROUPS: &[(Category, &str)] = &[
    (Category::Cpu, "%"),
    (Category::Load, ""),
    (Category::Freemem, " MB"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Transaction,
    Main,
    Network,
    Match,
    Users,
    Errors,
    Server,
    Http,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Transaction,
        TableKind::Main,
        TableKind::Network,
        TableKind::Match,
        TableKind::Users,
        TableKind::Errors,
        TableKind::Server,
        TableKind::Http,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Transaction => "transaction",
            TableKind::Main => "main",
            TableKind::Network => "network",
            TableKind::Match => "match",
            TableKind::Users => "users",
            TableKind::Errors => "errors",
            TableKind::Server => "server",
            TableKind::Http => "http",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TableKind::Transaction => "Transactions Statistics",
            TableKind::Main => "Main Statistics",
            TableKind::Network => "Network Throughput",
            TableKind::Match => "Match Statistics",
            TableKind::Users => "Counters Statistics",
            TableKind::Errors => "Errors",
            TableKind::Server => "Server monitoring",
            TableKind::Http => "HTTP return code",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            TableKind::Transaction | TableKind::Main => CONTINUOUS_HEADER,
            TableKind::Network => &["Name", "Highest Rate", "Total"],
            TableKind::Match | TableKind::Errors => {
                &["Name", "Highest Rate", "Mean Rate", "Total number"]
            }
            TableKind::Users => &["Name", "Max"],
            TableKind::Server => &["Name", "Highest 10sec mean", "Lowest 10sec mean"],
            TableKind::Http => &["Code", "Highest Rate", "Mean Rate", "Total number"],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownTable(s.to_string()))
    }
}

/// One table cell; `NoData` serializes as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    NoData,
}

impl Cell {
    fn text_or_none<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> Self {
        value.map(|v| Cell::Text(render(v))).unwrap_or(Cell::NoData)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::NoData => f.write_str("n/a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub id: TableKind,
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

/// Builds summary tables from a finished series store
pub struct TableBuilder<'a> {
    store: &'a TimeSeriesStore,
    classification: &'a Classification,
}

impl<'a> TableBuilder<'a> {
    pub fn new(store: &'a TimeSeriesStore, classification: &'a Classification) -> Self {
        Self {
            store,
            classification,
        }
    }

    /// Build the requested tables in request order
    ///
    /// Every id is resolved before any table is computed, so one unknown id
    /// fails the whole request.
    pub fn build<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Table>> {
        let kinds = ids
            .iter()
            .map(|id| id.as_ref().parse::<TableKind>())
            .collect::<Result<Vec<_>>>()?;

        Ok(kinds.into_iter().map(|kind| self.table(kind)).collect())
    }

    pub fn table(&self, kind: TableKind) -> Table {
        let rows = match kind {
            TableKind::Transaction => self.continuous_rows(Category::Transaction),
            TableKind::Main => self.continuous_rows(Category::Main),
            TableKind::Http => self.counter_rows(Category::Http),
            TableKind::Match => self.counter_rows(Category::Match),
            TableKind::Errors => self.counter_rows(Category::Error),
            TableKind::Network => self.network_rows(),
            TableKind::Users => self.users_rows(),
            TableKind::Server => self.server_rows(),
        };

        tracing::debug!("Built table '{}' with {} rows", kind, rows.len());

        Table {
            id: kind,
            title: kind.title().to_string(),
            header: kind.header().iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    /// Names of a category that have a series, sorted
    fn series_names(&self, category: Category) -> impl Iterator<Item = (&'a str, &'a TimeSeries)> {
        let store = self.store;
        self.classification
            .reported_names(category)
            .into_iter()
            .filter_map(move |name| store.get(name).map(|series| (name, series)))
    }

    fn continuous_rows(&self, category: Category) -> Vec<Row> {
        self.series_names(category)
            .map(|(name, series)| {
                let stats = stats::continuous_stats(series);
                if stats.mean.is_none() {
                    tracing::warn!("No non-empty bucket for '{}', mean columns left empty", name);
                }
                continuous_row(name, &stats)
            })
            .collect()
    }

    fn counter_rows(&self, category: Category) -> Vec<Row> {
        let end = self.store.end_timestamp();
        self.series_names(category)
            .map(|(name, series)| {
                let stats = stats::counter_stats(series, end);
                Row {
                    name: name.to_string(),
                    cells: vec![
                        Cell::text_or_none(stats.highest_rate, format::rate),
                        Cell::text_or_none(stats.mean_rate, format::rate),
                        Cell::Integer(stats.total),
                    ],
                }
            })
            .collect()
    }

    fn network_rows(&self) -> Vec<Row> {
        self.series_names(Category::Network)
            .map(|(name, series)| {
                let stats = stats::network_stats(series);
                Row {
                    name: name.to_string(),
                    cells: vec![
                        Cell::text_or_none(stats.highest_rate, format::bit_rate),
                        Cell::Text(format::byte_size(stats.total_bytes as f64)),
                    ],
                }
            })
            .collect()
    }

    fn users_rows(&self) -> Vec<Row> {
        self.series_names(Category::Users)
            .map(|(name, series)| Row {
                name: name.to_string(),
                cells: vec![
                    stats::max_count(series)
                        .map(Cell::Integer)
                        .unwrap_or(Cell::NoData),
                ],
            })
            .collect()
    }

    fn server_rows(&self) -> Vec<Row> {
        SERVER_GROUPS
            .iter()
            .flat_map(|&(category, unit)| {
                self.series_names(category).map(move |(name, series)| {
                    let (highest, lowest) = stats::mean_range(series);
                    let render = |v| format::number(v, 2, unit);
                    Row {
                        name: name.to_string(),
                        cells: vec![
                            Cell::text_or_none(highest, render),
                            Cell::text_or_none(lowest, render),
                        ],
                    }
                })
            })
            .collect()
    }
}

fn continuous_row(name: &str, stats: &ContinuousStats) -> Row {
    Row {
        name: name.to_string(),
        cells: vec![
            Cell::text_or_none(stats.highest_mean, format::seconds),
            Cell::text_or_none(stats.lowest_mean, format::seconds),
            Cell::text_or_none(stats.highest_rate, format::rate),
            Cell::text_or_none(stats.mean_rate, format::rate),
            Cell::text_or_none(stats.mean, format::seconds),
            Cell::Integer(stats.total),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::log::LogReader;

    const LOG: &str = "\
# stats: dump at 1000
stats: users 1 1
# stats: dump at 1010
stats: tr_login 0 50.0 0 50 50 0 0
stats: tr_set_var 3 0.5 0 1 0 0 0
stats: 200 10 10
stats: size_rcv 1245 1245
stats: size_sent 124 124
stats: users 3 3
# stats: dump at 1020
stats: tr_login 2 100.0 0 100 100 50.0 0
stats: tr_idle 0 10.0 0 10 10 0 0
stats: 200 20 30
stats: 404 2 2
stats: error_abort 4 4
stats: match 6 6
stats: size_rcv 7510050 7511295
stats: users 2 3
stats: {cpu,\"gen1\"} 1 35.5 0 35.5 35.5 0 0
stats: {freemem,\"gen1\"} 1 512.0 0 512 512 0 0
# stats: dump at 1030
stats: tr_login 4 300.0 0 300 300 75.0 2
stats: 200 0 30
stats: {cpu,\"gen1\"} 1 80.25 0 80.25 80.25 0 0
stats: {load,\"gen1\"} 1 1.5 0 1.5 1.5 0 0
stats: {freemem,\"gen1\"} 1 256.0 0 256 256 0 0
";

    fn tables(ids: &[&str]) -> Result<Vec<Table>> {
        let log = LogReader::from_str(LOG).unwrap();
        let classification = Classifier::default().classify_log(&log);
        let store = TimeSeriesStore::build(&log, &classification).unwrap();
        TableBuilder::new(&store, &classification).build(ids)
    }

    fn texts(row: &Row) -> Vec<String> {
        row.cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_transaction_table() {
        let table = &tables(&["transaction"]).unwrap()[0];

        assert_eq!(table.title, "Transactions Statistics");
        assert_eq!(table.header.len(), 7);
        // excluded helper transaction is hidden, rows are sorted
        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["tr_idle", "tr_login"]);

        assert_eq!(
            texts(&table.rows[1]),
            vec!["0.30 sec", "0.10 sec", "0.40/sec", "0.20/sec", "0.20 sec", "6"]
        );
    }

    #[test]
    fn test_transaction_without_samples_is_no_data_row() {
        let table = &tables(&["transaction"]).unwrap()[0];
        let idle = &table.rows[0];

        assert_eq!(idle.cells[0], Cell::NoData);
        assert_eq!(idle.cells[1], Cell::NoData);
        assert_eq!(idle.cells[4], Cell::NoData);
        assert_eq!(idle.cells[5], Cell::Integer(0));
        assert_eq!(texts(idle)[2], "0.00/sec");
    }

    #[test]
    fn test_http_table_rates() {
        let table = &tables(&["http"]).unwrap()[0];

        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["200", "404"]);
        // 30 responses over the 20 seconds since first seen
        assert_eq!(texts(&table.rows[0]), vec!["2.00/sec", "1.50/sec", "30"]);
        assert_eq!(texts(&table.rows[1]), vec!["0.20/sec", "0.20/sec", "2"]);
    }

    #[test]
    fn test_errors_and_match_use_elapsed_time() {
        let result = tables(&["errors", "match"]).unwrap();

        assert_eq!(result[0].title, "Errors");
        assert_eq!(texts(&result[0].rows[0]), vec!["0.40/sec", "0.40/sec", "4"]);
        assert_eq!(result[1].rows[0].name, "match");
        assert_eq!(texts(&result[1].rows[0]), vec!["0.60/sec", "0.60/sec", "6"]);
    }

    #[test]
    fn test_network_table_units() {
        let table = &tables(&["network"]).unwrap()[0];

        assert_eq!(table.rows[0].name, "size_rcv");
        assert_eq!(texts(&table.rows[0]), vec!["5.73 Mbits/sec", "7.16 MB"]);
        assert_eq!(table.rows[1].name, "size_sent");
        assert_eq!(texts(&table.rows[1]), vec!["99.20 bits/sec", "124.00 B"]);
    }

    #[test]
    fn test_users_table_max() {
        let table = &tables(&["users"]).unwrap()[0];
        assert_eq!(table.rows[0].cells, vec![Cell::Integer(3)]);
    }

    #[test]
    fn test_server_table_groups() {
        let table = &tables(&["server"]).unwrap()[0];

        let rows: Vec<(String, Vec<String>)> = table
            .rows
            .iter()
            .map(|r| (r.name.clone(), texts(r)))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("cpu@gen1".to_string(), vec!["80.25%".to_string(), "35.50%".to_string()]),
                ("load@gen1".to_string(), vec!["1.50".to_string(), "1.50".to_string()]),
                (
                    "freemem@gen1".to_string(),
                    vec!["512.00 MB".to_string(), "256.00 MB".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_main_table_empty_when_absent() {
        let table = &tables(&["main"]).unwrap()[0];
        assert_eq!(table.title, "Main Statistics");
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_unknown_table_rejected() {
        let result = tables(&["transaction", "latency"]);
        assert!(matches!(result, Err(Error::UnknownTable(ref id)) if id == "latency"));
    }

    #[test]
    fn test_table_kind_round_trips_ids() {
        for kind in TableKind::ALL {
            assert_eq!(kind.as_str().parse::<TableKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_no_data_serializes_as_null() {
        let json = serde_json::to_string(&vec![Cell::NoData, Cell::Integer(2)]).unwrap();
        assert_eq!(json, "[null,2]");
    }
}
