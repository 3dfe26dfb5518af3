//! Core types for HealthAI
//!
//! This module defines the data that flows between sources, the metric store,
//! the daily aggregator, and the summary formatter.

use crate::error::ComputeError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracked health measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Steps,
    #[serde(alias = "heartRate")]
    HeartRate,
    #[serde(alias = "energyBurned")]
    EnergyBurned,
    #[serde(alias = "exerciseTime")]
    ExerciseTime,
    #[serde(alias = "sleepDuration")]
    SleepDuration,
}

/// How raw readings collapse into one value per day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMode {
    /// Cumulative sum of all readings in the day
    Sum,
    /// Arithmetic mean of all readings in the day
    Average,
    /// Total asleep duration in hours, bucketed by session start day
    SleepHours,
}

impl MetricKind {
    /// All kinds, in status line order
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Steps,
        MetricKind::HeartRate,
        MetricKind::EnergyBurned,
        MetricKind::ExerciseTime,
        MetricKind::SleepDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Steps => "steps",
            MetricKind::HeartRate => "heart_rate",
            MetricKind::EnergyBurned => "energy_burned",
            MetricKind::ExerciseTime => "exercise_time",
            MetricKind::SleepDuration => "sleep_duration",
        }
    }

    /// Canonical unit label for this kind
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Steps => "count",
            MetricKind::HeartRate => "count/min",
            MetricKind::EnergyBurned => "kcal",
            MetricKind::ExerciseTime => "min",
            MetricKind::SleepDuration => "hr",
        }
    }

    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Steps => "Steps",
            MetricKind::HeartRate => "Heartrate",
            MetricKind::EnergyBurned => "Energy",
            MetricKind::ExerciseTime => "Exercise",
            MetricKind::SleepDuration => "Sleep",
        }
    }

    pub fn daily_mode(&self) -> DailyMode {
        match self {
            MetricKind::HeartRate => DailyMode::Average,
            MetricKind::SleepDuration => DailyMode::SleepHours,
            _ => DailyMode::Sum,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "steps" => Ok(MetricKind::Steps),
            "heart_rate" | "heartrate" => Ok(MetricKind::HeartRate),
            "energy_burned" | "energyburned" | "energy" => Ok(MetricKind::EnergyBurned),
            "exercise_time" | "exercisetime" | "exercise" => Ok(MetricKind::ExerciseTime),
            "sleep_duration" | "sleepduration" | "sleep" => Ok(MetricKind::SleepDuration),
            _ => Err(ComputeError::UnknownMetric(s.to_string())),
        }
    }
}

/// One observation of a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub kind: MetricKind,
    pub value: f64,
    /// Observation timestamp; only its calendar day is meaningful
    pub date: DateTime<Utc>,
    pub unit: String,
}

impl Sample {
    pub fn new(kind: MetricKind, value: f64, date: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            date,
            unit: kind.unit().to_string(),
        }
    }

    /// Zero-valued placeholder for a day without data
    pub fn zero(kind: MetricKind, day: NaiveDate) -> Self {
        Self::new(kind, 0.0, start_of_day(day))
    }

    /// Calendar day (UTC) this sample belongs to
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Midnight UTC of the given day
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Trailing span of whole days ending at a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Window {
    days: usize,
}

impl Window {
    /// One week
    pub const WEEK: Window = Window { days: 7 };
    /// One month, as charted
    pub const MONTH: Window = Window { days: 30 };

    /// Longest window accepted, one hundred years of days
    pub const MAX_DAYS: usize = 36_525;

    /// Create a window of `days` trailing days; zero and anything above
    /// [`Window::MAX_DAYS`] are rejected
    pub fn new(days: usize) -> Result<Self, ComputeError> {
        if days == 0 || days > Self::MAX_DAYS {
            return Err(ComputeError::InvalidWindow(days));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> usize {
        self.days
    }

    /// First day covered when the window ends at `today`
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        today - chrono::Duration::days(self.days as i64 - 1)
    }

    /// Every day covered, ascending
    pub fn days_ending(&self, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let start = self.start(today);
        (0..self.days as i64).map(move |offset| start + chrono::Duration::days(offset))
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::WEEK
    }
}

impl TryFrom<usize> for Window {
    type Error = ComputeError;

    fn try_from(days: usize) -> Result<Self, Self::Error> {
        Window::new(days)
    }
}

impl From<Window> for usize {
    fn from(window: Window) -> Self {
        window.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(Window::new(0), Err(ComputeError::InvalidWindow(0))));
        assert_eq!(Window::new(7).unwrap(), Window::WEEK);
    }

    #[test]
    fn test_oversized_window_rejected() {
        assert!(matches!(
            Window::new(200_000_000),
            Err(ComputeError::InvalidWindow(200_000_000))
        ));
        assert!(Window::new(usize::MAX).is_err());
        assert!(Window::new(Window::MAX_DAYS + 1).is_err());
    }

    #[test]
    fn test_largest_window_stays_in_calendar_range() {
        let today = day(2024, 1, 15);
        let window = Window::new(Window::MAX_DAYS).unwrap();
        let start = window.start(today);
        assert!(start < today);
        assert_eq!(window.days_ending(today).count(), Window::MAX_DAYS);
        assert_eq!(window.days_ending(today).last(), Some(today));
    }

    #[test]
    fn test_window_days_cross_month_boundary() {
        let window = Window::new(4).unwrap();
        let days: Vec<_> = window.days_ending(day(2024, 3, 2)).collect();
        assert_eq!(
            days,
            vec![day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1), day(2024, 3, 2)]
        );
    }

    #[test]
    fn test_single_day_window_starts_today() {
        let today = day(2024, 1, 15);
        assert_eq!(Window::new(1).unwrap().start(today), today);
    }

    #[test]
    fn test_metric_kind_parsing() {
        assert_eq!("heartRate".parse::<MetricKind>().unwrap(), MetricKind::HeartRate);
        assert_eq!("sleep".parse::<MetricKind>().unwrap(), MetricKind::SleepDuration);
        assert_eq!("energy-burned".parse::<MetricKind>().unwrap(), MetricKind::EnergyBurned);
        assert!(matches!(
            "weight".parse::<MetricKind>(),
            Err(ComputeError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_metric_kind_serde_accepts_camel_case() {
        let kind: MetricKind = serde_json::from_str("\"exerciseTime\"").unwrap();
        assert_eq!(kind, MetricKind::ExerciseTime);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"exercise_time\"");
    }

    #[test]
    fn test_zero_sample_uses_canonical_unit() {
        let sample = Sample::zero(MetricKind::HeartRate, day(2024, 1, 15));
        assert_eq!(sample.unit, "count/min");
        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.day(), day(2024, 1, 15));
    }

    #[test]
    fn test_window_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Window>("0").is_err());
        assert!(serde_json::from_str::<Window>("200000000").is_err());
        assert_eq!(serde_json::from_str::<Window>("30").unwrap(), Window::MONTH);
    }
}
