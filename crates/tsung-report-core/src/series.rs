use crate::classify::Classification;
use crate::log::{Sample, TsungLog};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Width of one sampling bucket in seconds
pub const BUCKET_SECS: i64 = 10;

/// Sparse per-metric series
///
/// Only intervals where the metric was present contribute an entry, so
/// `counts[i]` and `means[i]` always describe the same dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub first_timestamp: i64,
    pub counts: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub means: Option<Vec<f64>>,
}

impl TimeSeries {
    fn new(first_timestamp: i64) -> Self {
        Self {
            first_timestamp,
            counts: Vec::new(),
            means: None,
        }
    }

    fn push(&mut self, sample: &Sample) {
        self.counts.push(sample.count_10sec().as_i64());
        if let Some(mean) = sample.mean_10sec() {
            self.means.get_or_insert_with(Vec::new).push(mean.as_f64());
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesStore {
    start_timestamp: i64,
    end_timestamp: i64,
    series: BTreeMap<String, TimeSeries>,
}

impl TimeSeriesStore {
    /// Build the series of every classified name in one pass over the log
    pub fn build(log: &TsungLog, classification: &Classification) -> Result<Self> {
        let (Some(start_timestamp), Some(end_timestamp)) =
            (log.start_timestamp(), log.end_timestamp())
        else {
            return Err(Error::EmptyLog);
        };

        let mut series: BTreeMap<String, TimeSeries> = BTreeMap::new();
        for record in &log.intervals {
            for (name, sample) in &record.samples {
                if classification.category_of(name).is_none() {
                    continue;
                }
                series
                    .entry(name.clone())
                    .or_insert_with(|| TimeSeries::new(record.timestamp))
                    .push(sample);
            }
        }

        tracing::debug!(
            "Built {} series over {} intervals",
            series.len(),
            log.intervals.len()
        );

        Ok(Self {
            start_timestamp,
            end_timestamp,
            series,
        })
    }

    pub fn get(&self, name: &str) -> Option<&TimeSeries> {
        self.series.get(name)
    }

    /// Timestamp of the first dump in the run
    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    /// Timestamp of the last dump in the run
    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    pub fn duration_secs(&self) -> i64 {
        self.end_timestamp.saturating_sub(self.start_timestamp)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
