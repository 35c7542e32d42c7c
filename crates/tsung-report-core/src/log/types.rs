use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Numeric token from a stats line
///
/// Tokens without a decimal point are integers, everything else is floating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Integer value, truncating floats toward zero
    pub fn as_i64(&self) -> i64 {
        match *self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid numeric token '{0}'")]
pub struct ParseNumberError(pub String);

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('.') {
            s.parse::<f64>()
                .map(Number::Float)
                .map_err(|_| ParseNumberError(s.to_string()))
        } else {
            s.parse::<i64>()
                .map(Number::Int)
                .map_err(|_| ParseNumberError(s.to_string()))
        }
    }
}

/// Metric carrying a 10 second distribution summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousSample {
    pub name: String,
    pub count_10sec: Number,
    pub mean_10sec: Number,
    pub stddev_10sec: Number,
    pub max: Number,
    pub min: Number,
    pub cumulative_mean: Number,
    pub cumulative_count: Number,
}

/// Metric carrying only a bucket count and a running total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSample {
    pub name: String,
    pub count_10sec: Number,
    pub total: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sample {
    Continuous(ContinuousSample),
    Counter(CounterSample),
}

impl Sample {
    pub fn name(&self) -> &str {
        match self {
            Sample::Continuous(s) => &s.name,
            Sample::Counter(s) => &s.name,
        }
    }

    pub fn count_10sec(&self) -> Number {
        match self {
            Sample::Continuous(s) => s.count_10sec,
            Sample::Counter(s) => s.count_10sec,
        }
    }

    /// Bucket mean, only present on continuous samples
    pub fn mean_10sec(&self) -> Option<Number> {
        match self {
            Sample::Continuous(s) => Some(s.mean_10sec),
            Sample::Counter(_) => None,
        }
    }
}

/// One `# stats: dump at <ts>` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub timestamp: i64,
    pub samples: BTreeMap<String, Sample>,
}

impl IntervalRecord {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            samples: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Sample> {
        self.samples.get(name)
    }
}

/// A line that matched none of the record grammars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: String,
}

/// Bookkeeping about skipped input, kept alongside the parsed records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub total_lines: usize,
    pub dropped_lines: usize,
    pub samples: Vec<DroppedLine>,
}

impl ParseReport {
    pub const MAX_SAMPLES: usize = 10;

    pub fn record_drop(&mut self, line_number: usize, text: &str, reason: impl Into<String>) {
        self.dropped_lines += 1;
        if self.samples.len() < Self::MAX_SAMPLES {
            self.samples.push(DroppedLine {
                line_number,
                text: text.to_string(),
                reason: reason.into(),
            });
        }
    }

    pub fn is_clean(&self) -> bool {
        self.dropped_lines == 0
    }
}

/// Parsed log: interval records in file order plus the drop report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TsungLog {
    pub intervals: Vec<IntervalRecord>,
    pub parse_report: ParseReport,
}

impl TsungLog {
    pub fn start_timestamp(&self) -> Option<i64> {
        self.intervals.first().map(|r| r.timestamp)
    }

    pub fn end_timestamp(&self) -> Option<i64> {
        self.intervals.last().map(|r| r.timestamp)
    }

    /// Seconds between the first and last dump
    pub fn duration_secs(&self) -> Option<i64> {
        Some(self.end_timestamp()?.saturating_sub(self.start_timestamp()?))
    }
}
