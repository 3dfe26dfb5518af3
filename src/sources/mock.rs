//! Synthetic demo data
//!
//! Thirty fixed daily values per kind, newest first, for demoing without a
//! real health data store.

use crate::error::ComputeError;
use crate::types::{start_of_day, MetricKind, Sample};
use chrono::{Duration, NaiveDate};

use super::{FetchBatch, MetricSource};

const STEPS: [f64; 30] = [
    9263.0, 10485.0, 8900.0, 9383.0, 4065.0, 9555.0, 8226.0, 11744.0, 3926.0, 3278.0, 9078.0,
    3575.0, 6568.0, 11571.0, 5581.0, 4616.0, 9122.0, 3629.0, 6265.0, 4633.0, 11326.0, 10217.0,
    5432.0, 7302.0, 8258.0, 11468.0, 5070.0, 9743.0, 3303.0, 9451.0,
];

const HEART_RATE: [f64; 30] = [
    66.0, 72.0, 72.0, 73.0, 84.0, 83.0, 72.0, 81.0, 70.0, 77.0, 67.0, 66.0, 66.0, 67.0, 78.0,
    88.0, 77.0, 76.0, 78.0, 79.0, 72.0, 87.0, 85.0, 84.0, 77.0, 73.0, 63.0, 63.0, 82.0, 77.0,
];

const ENERGY_BURNED: [f64; 30] = [
    191.0, 389.0, 250.0, 363.0, 387.0, 334.0, 175.0, 307.0, 293.0, 287.0, 314.0, 370.0, 352.0,
    230.0, 186.0, 180.0, 324.0, 306.0, 212.0, 204.0, 172.0, 250.0, 331.0, 252.0, 315.0, 213.0,
    250.0, 397.0, 155.0, 309.0,
];

const EXERCISE_TIME: [f64; 30] = [
    41.0, 16.0, 34.0, 38.0, 11.0, 24.0, 49.0, 35.0, 59.0, 32.0, 35.0, 49.0, 48.0, 53.0, 29.0,
    16.0, 15.0, 54.0, 26.0, 17.0, 19.0, 57.0, 12.0, 31.0, 57.0, 43.0, 50.0, 29.0, 57.0, 41.0,
];

const SLEEP_DURATION: [f64; 30] = [
    7.2, 7.2, 6.2, 6.0, 8.4, 8.0, 6.4, 7.5, 8.4, 5.8, 7.1, 5.7, 5.5, 7.7, 6.7, 8.0, 5.6, 8.0,
    5.7, 8.4, 6.3, 8.1, 8.1, 7.0, 8.1, 5.5, 5.5, 6.8, 7.9, 5.8,
];

/// Source that serves the fixed demo series
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl MockSource {
    fn values(kind: MetricKind) -> &'static [f64; 30] {
        match kind {
            MetricKind::Steps => &STEPS,
            MetricKind::HeartRate => &HEART_RATE,
            MetricKind::EnergyBurned => &ENERGY_BURNED,
            MetricKind::ExerciseTime => &EXERCISE_TIME,
            MetricKind::SleepDuration => &SLEEP_DURATION,
        }
    }

    /// Value `i` is dated `i` days before today; the list comes back oldest first
    fn generate(kind: MetricKind, today: NaiveDate) -> Vec<Sample> {
        let noon = start_of_day(today) + Duration::hours(12);
        let mut samples: Vec<Sample> = Self::values(kind)
            .iter()
            .enumerate()
            .map(|(index, value)| Sample::new(kind, *value, noon - Duration::days(index as i64)))
            .collect();
        samples.reverse();
        samples
    }
}

impl MetricSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, today: NaiveDate) -> Result<FetchBatch, ComputeError> {
        let mut batch = FetchBatch::new();
        for kind in MetricKind::ALL {
            batch.insert(kind, Self::generate(kind, today));
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_every_kind_has_thirty_days() {
        let batch = MockSource.fetch(today()).unwrap();
        for kind in MetricKind::ALL {
            assert_eq!(batch.get(kind).unwrap().len(), 30);
        }
    }

    #[test]
    fn test_newest_value_is_today_and_last() {
        let batch = MockSource.fetch(today()).unwrap();
        let steps = batch.get(MetricKind::Steps).unwrap();

        let last = steps.last().unwrap();
        assert_eq!(last.value, 9263.0);
        assert_eq!(last.day(), today());

        let first = steps.first().unwrap();
        assert_eq!(first.value, 9451.0);
        assert_eq!(first.day(), NaiveDate::from_ymd_opt(2023, 12, 17).unwrap());
    }

    #[test]
    fn test_units_are_canonical() {
        let batch = MockSource.fetch(today()).unwrap();
        for kind in MetricKind::ALL {
            assert!(batch.get(kind).unwrap().iter().all(|s| s.unit == kind.unit()));
        }
    }

    #[test]
    fn test_dates_ascend() {
        let batch = MockSource.fetch(today()).unwrap();
        let sleep = batch.get(MetricKind::SleepDuration).unwrap();
        assert!(sleep.windows(2).all(|pair| pair[0].date < pair[1].date));
    }
}
