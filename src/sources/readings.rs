//! Raw reading ingestion
//!
//! Parses time-stamped readings exported from a health data store and buckets
//! them into one sample per day, the way a daily statistics query would:
//! cumulative kinds are summed, heart rate is averaged, and asleep intervals
//! are totalled in hours per start day.

use crate::error::ComputeError;
use crate::types::{start_of_day, DailyMode, MetricKind, Sample, Window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{FetchBatch, MetricSource};

/// Number of trailing days a fetch covers
pub const FETCH_HORIZON_DAYS: usize = 30;

const FETCH_HORIZON: Window = Window::MONTH;

/// Sleep analysis category of a sleep reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepCategory {
    InBed,
    #[default]
    Asleep,
    Awake,
}

/// One raw reading as exported by the health data store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub kind: MetricKind,
    /// Reading start (or instant for point readings)
    pub start: DateTime<Utc>,
    /// Interval end; required for sleep readings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Magnitude in the kind's canonical unit; required except for sleep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub category: SleepCategory,
}

impl RawReading {
    /// Check that the reading carries what its kind needs
    pub fn validate(&self) -> Result<(), ComputeError> {
        match self.kind.daily_mode() {
            DailyMode::SleepHours => match self.end {
                Some(end) if end >= self.start => Ok(()),
                Some(_) => Err(ComputeError::InvalidReading(format!(
                    "sleep reading at {} ends before it starts",
                    self.start
                ))),
                None => Err(ComputeError::InvalidReading(format!(
                    "sleep reading at {} has no end time",
                    self.start
                ))),
            },
            DailyMode::Sum | DailyMode::Average => match self.value {
                Some(value) if value.is_finite() => Ok(()),
                Some(_) => Err(ComputeError::InvalidReading(format!(
                    "{} reading at {} is not a finite number",
                    self.kind, self.start
                ))),
                None => Err(ComputeError::InvalidReading(format!(
                    "{} reading at {} has no value",
                    self.kind, self.start
                ))),
            },
        }
    }

    fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    fn asleep_hours(&self) -> f64 {
        match (self.category, self.end) {
            (SleepCategory::Asleep, Some(end)) => (end - self.start).num_seconds() as f64 / 3600.0,
            _ => 0.0,
        }
    }
}

/// Source backed by a list of raw readings
#[derive(Debug, Clone, Default)]
pub struct ReadingsSource {
    readings: Vec<RawReading>,
}

impl ReadingsSource {
    pub fn new(readings: Vec<RawReading>) -> Self {
        Self { readings }
    }

    /// Parse a JSON array of readings
    pub fn parse_array(json: &str) -> Result<Self, ComputeError> {
        let readings: Vec<RawReading> = serde_json::from_str(json)?;
        Ok(Self::new(readings))
    }

    /// Parse NDJSON (one reading per line)
    pub fn parse_ndjson(ndjson: &str) -> Result<Self, ComputeError> {
        let mut readings = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let reading = serde_json::from_str::<RawReading>(trimmed).map_err(|e| {
                ComputeError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            readings.push(reading);
        }
        Ok(Self::new(readings))
    }

    /// Parse either layout, picking the array form when the input starts with `[`
    pub fn parse(input: &str) -> Result<Self, ComputeError> {
        if input.trim_start().starts_with('[') {
            Self::parse_array(input)
        } else {
            Self::parse_ndjson(input)
        }
    }

    /// Read and parse a readings file
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        let input = fs::read_to_string(path)?;
        Self::parse(&input)
    }

    /// Bucket readings into one sample per day over the fetch horizon
    fn bucket(&self, kind: MetricKind, today: NaiveDate) -> Vec<Sample> {
        let start = FETCH_HORIZON.start(today);
        let mut by_day: BTreeMap<NaiveDate, Vec<&RawReading>> = BTreeMap::new();
        let mut outside = 0usize;

        for reading in self.readings.iter().filter(|r| r.kind == kind) {
            let day = reading.day();
            if day < start || day > today {
                outside += 1;
                continue;
            }
            by_day.entry(day).or_default().push(reading);
        }

        if outside > 0 {
            debug!(kind = %kind, outside, "ignoring readings outside fetch horizon");
        }

        match kind.daily_mode() {
            DailyMode::Sum => FETCH_HORIZON
                .days_ending(today)
                .map(|day| {
                    let total = by_day
                        .get(&day)
                        .map(|readings| readings.iter().filter_map(|r| r.value).sum::<f64>())
                        .unwrap_or(0.0);
                    Sample::new(kind, total, start_of_day(day))
                })
                .collect(),
            DailyMode::Average => FETCH_HORIZON
                .days_ending(today)
                .map(|day| {
                    let mean = by_day
                        .get(&day)
                        .map(|readings| {
                            let values: Vec<f64> = readings.iter().filter_map(|r| r.value).collect();
                            if values.is_empty() {
                                0.0
                            } else {
                                values.iter().sum::<f64>() / values.len() as f64
                            }
                        })
                        .unwrap_or(0.0);
                    Sample::new(kind, mean, start_of_day(day))
                })
                .collect(),
            // Only days that actually have sleep readings are reported
            DailyMode::SleepHours => by_day
                .into_iter()
                .map(|(day, readings)| {
                    let hours: f64 = readings.iter().map(|r| r.asleep_hours()).sum();
                    Sample::new(kind, hours, start_of_day(day))
                })
                .collect(),
        }
    }
}

impl MetricSource for ReadingsSource {
    fn name(&self) -> &str {
        "readings"
    }

    fn fetch(&self, today: NaiveDate) -> Result<FetchBatch, ComputeError> {
        for reading in &self.readings {
            reading.validate()?;
        }

        let mut batch = FetchBatch::new();
        for kind in MetricKind::ALL {
            batch.insert(kind, self.bucket(kind, today));
        }
        Ok(batch)
    }
}
