use super::types::{
    ContinuousSample, CounterSample, IntervalRecord, Number, ParseNumberError, Sample, TsungLog,
};
use super::{LOG_FILE_NAME, MAIN_NAMES, NETWORK_NAMES, TRANSACTION_PREFIX, USER_NAMES};
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER_PREFIX: &str = "# stats: dump at";
const DATA_PREFIX: &str = "stats: ";

lazy_static! {
    /// `{sensor,"host"}` composite key used by the OS monitoring plugin
    static ref COMPOSITE_KEY: Regex = Regex::new(r#"^\{([^,{}"]+),"?([^,{}"]*)"?\}$"#).unwrap();
}

/// Why a single line was not turned into a sample
#[derive(Error, Debug, PartialEq)]
enum LineError {
    #[error("not a stats line")]
    NotStats,

    #[error("invalid dump timestamp '{0}'")]
    BadTimestamp(String),

    #[error("invalid UTF-8")]
    InvalidUtf8,

    #[error("data line outside a dump block")]
    Orphan,

    #[error("empty stats line")]
    Empty,

    #[error("unrecognized metric '{0}'")]
    UnknownName(String),

    #[error("malformed composite key '{0}'")]
    BadKey(String),

    #[error("metric '{name}' expects {expected} values, found {found}")]
    TokenCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    BadNumber(#[from] ParseNumberError),
}

pub struct LogReader;

impl LogReader {
    /// Accept either a log file or a run directory holding `tsung.log`
    pub fn resolve_path(path: &Path) -> PathBuf {
        if path.is_dir() {
            path.join(LOG_FILE_NAME)
        } else {
            path.to_path_buf()
        }
    }

    /// Read and parse a stats log from the given path
    pub fn from_file(path: &Path) -> Result<TsungLog> {
        let path = Self::resolve_path(path);
        tracing::debug!("Reading stats log from: {}", path.display());

        let file = File::open(&path)?;
        let log = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            "Successfully parsed {} with {} intervals",
            path.display(),
            log.intervals.len()
        );

        Ok(log)
    }

    /// Parse a stats log held in memory
    pub fn from_str(content: &str) -> Result<TsungLog> {
        Self::from_reader(content.as_bytes())
    }

    /// Parse a stats log line by line
    ///
    /// Only I/O failures are errors. Lines matching no record grammar are
    /// skipped and tallied in the returned [`ParseReport`](super::ParseReport).
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<TsungLog> {
        let mut log = TsungLog::default();
        let mut current: Option<IntervalRecord> = None;
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;
            log.parse_report.total_lines += 1;

            let raw = match std::str::from_utf8(&buf) {
                Ok(raw) => raw,
                Err(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    drop_line(&mut log, line_number, text.trim(), LineError::InvalidUtf8);
                    continue;
                }
            };

            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(HEADER_PREFIX) {
                match rest.trim().parse::<i64>() {
                    Ok(timestamp) => {
                        if let Some(done) = current.replace(IntervalRecord::new(timestamp)) {
                            log.intervals.push(done);
                        }
                    }
                    Err(_) => {
                        // Data up to the next valid header belongs to no dump
                        if let Some(done) = current.take() {
                            log.intervals.push(done);
                        }
                        let err = LineError::BadTimestamp(rest.trim().to_string());
                        drop_line(&mut log, line_number, line, err);
                    }
                }
                continue;
            }

            let parsed = match current.as_mut() {
                Some(_) if !line.starts_with(DATA_PREFIX) => Err(LineError::NotStats),
                Some(record) => parse_sample(&line[DATA_PREFIX.len()..]).map(|s| (record, s)),
                None => Err(LineError::Orphan),
            };

            match parsed {
                Ok((record, sample)) => {
                    let name = sample.name().to_string();
                    if record.samples.insert(name.clone(), sample).is_some() {
                        tracing::warn!(
                            "Line {}: '{}' repeated in dump {}, keeping the last value",
                            line_number,
                            name,
                            record.timestamp
                        );
                    }
                }
                Err(err) => drop_line(&mut log, line_number, line, err),
            }
        }

        if let Some(done) = current {
            log.intervals.push(done);
        }

        if !log.parse_report.is_clean() {
            tracing::warn!(
                "Skipped {} unrecognized lines out of {}",
                log.parse_report.dropped_lines,
                log.parse_report.total_lines
            );
        }

        Ok(log)
    }
}

fn drop_line(log: &mut TsungLog, line_number: usize, line: &str, err: LineError) {
    tracing::debug!("Line {}: skipped ({})", line_number, err);
    log.parse_report
        .record_drop(line_number, line, err.to_string());
}

/// Parse the part of a data line following `stats: `
fn parse_sample(body: &str) -> std::result::Result<Sample, LineError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    let (&name, values) = tokens.split_first().ok_or(LineError::Empty)?;

    if name.starts_with(TRANSACTION_PREFIX) {
        return continuous(name, values);
    }
    if is_all_digits(name) || name.contains("match") || name.contains("error") {
        return counter(name, values);
    }
    if USER_NAMES.contains(&name) || NETWORK_NAMES.contains(&name) {
        return counter(name, values);
    }
    if MAIN_NAMES.contains(&name) {
        return continuous(name, values);
    }
    if name.starts_with('{') {
        let caps = COMPOSITE_KEY
            .captures(name)
            .ok_or_else(|| LineError::BadKey(name.to_string()))?;
        let key = format!("{}@{}", &caps[1], &caps[2]);
        return continuous(&key, values);
    }

    Err(LineError::UnknownName(name.to_string()))
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn numbers<const N: usize>(
    name: &str,
    values: &[&str],
) -> std::result::Result<[Number; N], LineError> {
    if values.len() != N {
        return Err(LineError::TokenCount {
            name: name.to_string(),
            expected: N,
            found: values.len(),
        });
    }
    let mut out = [Number::Int(0); N];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = token.parse()?;
    }
    Ok(out)
}

fn continuous(name: &str, values: &[&str]) -> std::result::Result<Sample, LineError> {
    let [count_10sec, mean_10sec, stddev_10sec, max, min, cumulative_mean, cumulative_count] =
        numbers::<7>(name, values)?;
    Ok(Sample::Continuous(ContinuousSample {
        name: name.to_string(),
        count_10sec,
        mean_10sec,
        stddev_10sec,
        max,
        min,
        cumulative_mean,
        cumulative_count,
    }))
}

fn counter(name: &str, values: &[&str]) -> std::result::Result<Sample, LineError> {
    let [count_10sec, total] = numbers::<2>(name, values)?;
    Ok(Sample::Counter(CounterSample {
        name: name.to_string(),
        count_10sec,
        total,
    }))
}
