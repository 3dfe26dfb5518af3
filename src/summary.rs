//! Summary formatting
//!
//! Reduces daily series to totals and averages for display, and renders the
//! one-line status used to seed the assistant conversation.

use crate::aggregator::chart_data;
use crate::store::MetricStore;
use crate::types::{MetricKind, Window};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Totals for one kind over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub kind: MetricKind,
    pub days: usize,
    pub total: f64,
    pub average: f64,
    pub unit: String,
}

impl WindowSummary {
    /// Aggregate `kind` over `window` and reduce it
    pub fn compute(store: &MetricStore, kind: MetricKind, window: Window, today: NaiveDate) -> Self {
        let series = chart_data(store, kind, window, today);
        let total: f64 = series.iter().map(|s| s.value).sum();
        let average = if series.is_empty() {
            0.0
        } else {
            total / series.len() as f64
        };
        let unit = series
            .first()
            .map(|s| s.unit.clone())
            .unwrap_or_default();

        Self {
            kind,
            days: series.len(),
            total,
            average,
            unit,
        }
    }

    /// `Total: {total} {unit}, Avg/Day: {avg} {unit}`, both truncated toward zero
    pub fn render(&self) -> String {
        format!(
            "Total: {} {unit}, Avg/Day: {} {unit}",
            self.total as i64,
            self.average as i64,
            unit = self.unit
        )
    }
}

/// Human-readable total and daily average for `kind` over `window`
pub fn summary(store: &MetricStore, kind: MetricKind, window: Window, today: NaiveDate) -> String {
    WindowSummary::compute(store, kind, window, today).render()
}

/// Latest value of every kind in one sentence, suitable as chat context
pub fn latest_status_line(store: &MetricStore) -> String {
    let latest = |kind: MetricKind| -> i64 {
        store
            .latest(kind)
            .map(|sample| sample.value as i64)
            .unwrap_or(0)
    };

    format!(
        "Hey! Here's where you're at: {} steps, heart rate: {} bpm, {} kcals burned, {} mins exercised, {} hours slept.",
        latest(MetricKind::Steps),
        latest(MetricKind::HeartRate),
        latest(MetricKind::EnergyBurned),
        latest(MetricKind::ExerciseTime),
        latest(MetricKind::SleepDuration),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use crate::store::fetch_all_data;
    use crate::types::{start_of_day, Sample};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn store_with(kind: MetricKind, values: &[(i64, f64)]) -> MetricStore {
        let samples = values
            .iter()
            .map(|(days_ago, value)| {
                Sample::new(kind, *value, start_of_day(today() - Duration::days(*days_ago)))
            })
            .collect();
        let mut store = MetricStore::new();
        store.replace(kind, samples);
        store
    }

    #[test]
    fn test_single_sample_week_summary() {
        let store = store_with(MetricKind::Steps, &[(3, 9263.0)]);
        assert_eq!(
            summary(&store, MetricKind::Steps, Window::WEEK, today()),
            "Total: 9263 count, Avg/Day: 1323 count"
        );
    }

    #[test]
    fn test_summary_matches_chart_data() {
        let mut store = MetricStore::new();
        fetch_all_data(&mut store, &MockSource, today()).unwrap();

        for kind in MetricKind::ALL {
            let series = chart_data(&store, kind, Window::MONTH, today());
            let expected: f64 = series.iter().map(|s| s.value).sum();
            let computed = WindowSummary::compute(&store, kind, Window::MONTH, today());

            assert_eq!(computed.total, expected);
            assert_eq!(computed.average, expected / 30.0);
            assert_eq!(computed.days, 30);
            assert_eq!(computed.unit, kind.unit());
        }
    }

    #[test]
    fn test_mock_week_steps_summary() {
        let mut store = MetricStore::new();
        fetch_all_data(&mut store, &MockSource, today()).unwrap();

        // 9263 + 10485 + 8900 + 9383 + 4065 + 9555 + 8226 = 59877
        assert_eq!(
            summary(&store, MetricKind::Steps, Window::WEEK, today()),
            "Total: 59877 count, Avg/Day: 8553 count"
        );
    }

    #[test]
    fn test_fractional_values_truncate() {
        let store = store_with(MetricKind::SleepDuration, &[(0, 7.5), (1, 6.75)]);
        let window = Window::new(2).unwrap();
        assert_eq!(
            summary(&store, MetricKind::SleepDuration, window, today()),
            "Total: 14 hr, Avg/Day: 7 hr"
        );
    }

    #[test]
    fn test_empty_store_summary() {
        let store = MetricStore::new();
        assert_eq!(
            summary(&store, MetricKind::HeartRate, Window::WEEK, today()),
            "Total: 0 count/min, Avg/Day: 0 count/min"
        );
    }

    #[test]
    fn test_status_line_uses_latest_values() {
        let mut store = MetricStore::new();
        let cases = [
            (MetricKind::Steps, [900.0, 1200.0]),
            (MetricKind::HeartRate, [66.0, 70.0]),
            (MetricKind::EnergyBurned, [250.0, 300.0]),
            (MetricKind::ExerciseTime, [45.0, 20.0]),
            (MetricKind::SleepDuration, [6.2, 7.9]),
        ];
        for (kind, values) in cases {
            let samples = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Sample::new(kind, *v, start_of_day(today() - Duration::days(1 - i as i64)))
                })
                .collect();
            store.replace(kind, samples);
        }

        assert_eq!(
            latest_status_line(&store),
            "Hey! Here's where you're at: 1200 steps, heart rate: 70 bpm, 300 kcals burned, 20 mins exercised, 7 hours slept."
        );
    }

    #[test]
    fn test_status_line_defaults_to_zero() {
        let store = store_with(MetricKind::Steps, &[(0, 4321.9)]);
        assert_eq!(
            latest_status_line(&store),
            "Hey! Here's where you're at: 4321 steps, heart rate: 0 bpm, 0 kcals burned, 0 mins exercised, 0 hours slept."
        );
    }
}
