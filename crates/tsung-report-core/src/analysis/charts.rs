use crate::classify::{Category, Classification};
use crate::series::{BUCKET_SECS, TimeSeries, TimeSeriesStore};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const X_HEADER: &str = "time (sec of running test)";

/// Which metrics feed a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Category(Category),
    Names(&'static [&'static str]),
}

/// How a bucket becomes a y value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Bucket mean as recorded
    Mean,
    /// Raw bucket count
    Count,
    /// Count per second
    Rate,
    /// Bytes per bucket to Kbits per second
    NetworkRate,
}

impl Transform {
    fn apply(&self, series: &TimeSeries) -> Option<Vec<f64>> {
        let bucket = BUCKET_SECS as f64;
        match self {
            Transform::Mean => series.means.clone(),
            Transform::Count => Some(series.counts.iter().map(|&c| c as f64).collect()),
            Transform::Rate => Some(series.counts.iter().map(|&c| c as f64 / bucket).collect()),
            Transform::NetworkRate => Some(
                series
                    .counts
                    .iter()
                    .map(|&c| c as f64 * 8.0 / bucket / 1024.0)
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    TransactionsMean,
    TransactionsRate,
    HttpRate,
    ConnectRequestMean,
    MainRate,
    NetworkThroughput,
    Users,
    ErrorsRate,
    MatchRate,
    Cpu,
    Load,
    Freemem,
}

/// Static description of a chart
#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub title: &'static str,
    pub yheader: &'static str,
    pub source: Source,
    pub transform: Transform,
}

impl ChartKind {
    pub const ALL: [ChartKind; 12] = [
        ChartKind::TransactionsMean,
        ChartKind::TransactionsRate,
        ChartKind::HttpRate,
        ChartKind::ConnectRequestMean,
        ChartKind::MainRate,
        ChartKind::NetworkThroughput,
        ChartKind::Users,
        ChartKind::ErrorsRate,
        ChartKind::MatchRate,
        ChartKind::Cpu,
        ChartKind::Load,
        ChartKind::Freemem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::TransactionsMean => "transactions_mean",
            ChartKind::TransactionsRate => "transactions_rate",
            ChartKind::HttpRate => "http_rate",
            ChartKind::ConnectRequestMean => "connect_request_mean",
            ChartKind::MainRate => "main_rate",
            ChartKind::NetworkThroughput => "network_throughput",
            ChartKind::Users => "users",
            ChartKind::ErrorsRate => "errors_rate",
            ChartKind::MatchRate => "match_rate",
            ChartKind::Cpu => "cpu",
            ChartKind::Load => "load",
            ChartKind::Freemem => "freemem",
        }
    }

    pub fn spec(&self) -> ChartSpec {
        let (title, yheader, source, transform) = match self {
            ChartKind::TransactionsMean => (
                "Mean transaction duration",
                "transaction duration (msec)",
                Source::Category(Category::Transaction),
                Transform::Mean,
            ),
            ChartKind::TransactionsRate => (
                "Transactions rate",
                "transactions/sec",
                Source::Category(Category::Transaction),
                Transform::Rate,
            ),
            ChartKind::HttpRate => (
                "HTTP code response rate",
                "number/sec",
                Source::Category(Category::Http),
                Transform::Rate,
            ),
            ChartKind::ConnectRequestMean => (
                "Mean connection and request duration",
                "duration (msec)",
                Source::Names(&["connect", "request"]),
                Transform::Mean,
            ),
            ChartKind::MainRate => (
                "Connection, page and request rate",
                "number/sec",
                Source::Names(&["connect", "page", "request"]),
                Transform::Rate,
            ),
            ChartKind::NetworkThroughput => (
                "Network throughput",
                "Kbits/sec",
                Source::Category(Category::Network),
                Transform::NetworkRate,
            ),
            ChartKind::Users => (
                "Simultaneous users",
                "value",
                Source::Category(Category::Users),
                Transform::Count,
            ),
            ChartKind::ErrorsRate => (
                "Errors rate",
                "errors/sec",
                Source::Category(Category::Error),
                Transform::Rate,
            ),
            ChartKind::MatchRate => (
                "Match rate",
                "number/sec",
                Source::Category(Category::Match),
                Transform::Rate,
            ),
            ChartKind::Cpu => (
                "CPU usage",
                "%",
                Source::Category(Category::Cpu),
                Transform::Mean,
            ),
            ChartKind::Load => (
                "Load average",
                "load",
                Source::Category(Category::Load),
                Transform::Mean,
            ),
            ChartKind::Freemem => (
                "Free memory",
                "MB",
                Source::Category(Category::Freemem),
                Transform::Mean,
            ),
        };
        ChartSpec {
            title,
            yheader,
            source,
            transform,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownChart(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: f64,
}

/// One line of a chart, shaped for Chart.js datasets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub fill: bool,
    pub tension: u8,
    pub data: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub id: ChartKind,
    pub title: String,
    pub xheader: String,
    pub yheader: String,
    pub series: Vec<ChartSeries>,
    /// `series` pre-serialized for templates
    pub json: String,
}

pub struct ChartBuilder<'a> {
    store: &'a TimeSeriesStore,
    classification: &'a Classification,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(store: &'a TimeSeriesStore, classification: &'a Classification) -> Self {
        Self {
            store,
            classification,
        }
    }

    /// Build the requested charts in request order, rejecting unknown ids up front
    pub fn build<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Chart>> {
        let kinds = ids
            .iter()
            .map(|id| id.as_ref().parse::<ChartKind>())
            .collect::<Result<Vec<_>>>()?;

        kinds.into_iter().map(|kind| self.chart(kind)).collect()
    }

    pub fn chart(&self, kind: ChartKind) -> Result<Chart> {
        let spec = kind.spec();
        let mut names: Vec<&str> = match spec.source {
            Source::Category(category) => self.classification.reported_names(category),
            Source::Names(names) => names.to_vec(),
        };
        names.sort_unstable();

        let series: Vec<ChartSeries> = names
            .into_iter()
            .filter_map(|name| self.series(name, spec.transform))
            .collect();

        tracing::debug!("Built chart '{}' with {} series", kind, series.len());

        Ok(Chart {
            id: kind,
            title: spec.title.to_string(),
            xheader: X_HEADER.to_string(),
            yheader: spec.yheader.to_string(),
            json: serde_json::to_string(&series)?,
            series,
        })
    }

    /// Points of one metric, x anchored at the metric's own first dump
    fn series(&self, name: &str, transform: Transform) -> Option<ChartSeries> {
        let Some(series) = self.store.get(name) else {
            tracing::debug!("No series for '{}', skipped", name);
            return None;
        };
        let values = transform.apply(series)?;
        let x0 = series
            .first_timestamp
            .saturating_sub(self.store.start_timestamp());

        Some(ChartSeries {
            label: name.to_string(),
            fill: false,
            tension: 0,
            data: values
                .into_iter()
                .enumerate()
                .map(|(i, y)| Point {
                    x: x0.saturating_add((i as i64).saturating_mul(BUCKET_SECS)),
                    y,
                })
                .collect(),
        })
    }
}
