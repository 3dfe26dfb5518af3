//! Metric store
//!
//! Holds the per-kind sample lists for one session. Lists are only ever
//! replaced whole, so a reader sees either the old list or the new one.

use crate::error::ComputeError;
use crate::sources::{FetchBatch, FetchReport, MetricSource};
use crate::types::{MetricKind, Sample};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// In-memory mapping from metric kind to its samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricStore {
    metrics: BTreeMap<MetricKind, Vec<Sample>>,
}

impl MetricStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples currently held for `kind` (empty if never fetched)
    pub fn samples(&self, kind: MetricKind) -> &[Sample] {
        self.metrics.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the whole list for `kind`
    pub fn replace(&mut self, kind: MetricKind, samples: Vec<Sample>) {
        debug!(kind = %kind, count = samples.len(), "replacing samples");
        self.metrics.insert(kind, samples);
    }

    /// Replace every kind present in `batch`; kinds absent from it are kept
    pub fn apply(&mut self, batch: FetchBatch) {
        for (kind, samples) in batch.into_lists() {
            self.replace(kind, samples);
        }
    }

    /// Most recent sample for `kind`; ties on date go to the later entry.
    /// This intentionally departs from last-element order: an unsorted list
    /// still reports its newest sample.
    pub fn latest(&self, kind: MetricKind) -> Option<&Sample> {
        self.samples(kind).iter().max_by_key(|sample| sample.date)
    }
}

/// Fetch one batch from `source` and replace the affected lists in `store`.
///
/// A failed fetch leaves `store` untouched.
pub fn fetch_all_data(
    store: &mut MetricStore,
    source: &dyn MetricSource,
    today: NaiveDate,
) -> Result<FetchReport, ComputeError> {
    let batch = source.fetch(today)?;
    let report = batch.report(source.name());
    store.apply(batch);
    info!(
        source = %report.source,
        kinds = report.samples_per_kind.len(),
        "fetch complete"
    );
    Ok(report)
}

/// Metric store shared between one writer and many readers
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<MetricStore>>,
}

impl SharedStore {
    pub fn new(store: MetricStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Fetch from `source` and apply the batch under a single write guard
    pub fn refresh(
        &self,
        source: &dyn MetricSource,
        today: NaiveDate,
    ) -> Result<FetchReport, ComputeError> {
        // Only the apply step holds the write guard
        let batch = source.fetch(today)?;
        let report = batch.report(source.name());
        let mut guard = self.inner.write().map_err(|_| ComputeError::StorePoisoned)?;
        guard.apply(batch);
        info!(source = %report.source, "shared store refreshed");
        Ok(report)
    }

    /// Run `refresh` on a worker thread; the handle yields its single completion
    pub fn refresh_in_background<S>(
        &self,
        source: S,
        today: NaiveDate,
    ) -> JoinHandle<Result<FetchReport, ComputeError>>
    where
        S: MetricSource + Send + 'static,
    {
        let shared = self.clone();
        thread::spawn(move || shared.refresh(&source, today))
    }

    /// Run `f` against the current store contents
    pub fn read<T>(&self, f: impl FnOnce(&MetricStore) -> T) -> Result<T, ComputeError> {
        let guard = self.inner.read().map_err(|_| ComputeError::StorePoisoned)?;
        Ok(f(&guard))
    }

    /// Owned copy of the current store contents
    pub fn snapshot(&self) -> Result<MetricStore, ComputeError> {
        self.read(MetricStore::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use crate::types::start_of_day;
    use pretty_assertions::assert_eq;

    struct FailingSource;

    impl MetricSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _today: NaiveDate) -> Result<FetchBatch, ComputeError> {
            Err(ComputeError::SourceError("unavailable".to_string()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn sample(kind: MetricKind, value: f64, day: u32) -> Sample {
        Sample::new(
            kind,
            value,
            start_of_day(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
        )
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = MetricStore::new();
        store.replace(
            MetricKind::Steps,
            vec![sample(MetricKind::Steps, 100.0, 1), sample(MetricKind::Steps, 200.0, 2)],
        );
        store.replace(MetricKind::Steps, vec![sample(MetricKind::Steps, 300.0, 3)]);

        assert_eq!(store.samples(MetricKind::Steps).len(), 1);
        assert_eq!(store.samples(MetricKind::Steps)[0].value, 300.0);
    }

    #[test]
    fn test_missing_kind_is_empty() {
        let store = MetricStore::new();
        assert!(store.samples(MetricKind::HeartRate).is_empty());
        assert!(store.latest(MetricKind::HeartRate).is_none());
        assert_eq!(store, MetricStore::default());
    }

    #[test]
    fn test_latest_prefers_greatest_date() {
        let mut store = MetricStore::new();
        store.replace(
            MetricKind::HeartRate,
            vec![
                sample(MetricKind::HeartRate, 70.0, 5),
                sample(MetricKind::HeartRate, 65.0, 2),
            ],
        );
        assert_eq!(store.latest(MetricKind::HeartRate).unwrap().value, 70.0);
    }

    #[test]
    fn test_latest_tie_goes_to_last_entry() {
        let mut store = MetricStore::new();
        store.replace(
            MetricKind::Steps,
            vec![sample(MetricKind::Steps, 1.0, 4), sample(MetricKind::Steps, 2.0, 4)],
        );
        assert_eq!(store.latest(MetricKind::Steps).unwrap().value, 2.0);
    }

    #[test]
    fn test_fetch_twice_is_idempotent() {
        let mut first = MetricStore::new();
        fetch_all_data(&mut first, &MockSource, today()).unwrap();
        let snapshot = first.clone();
        fetch_all_data(&mut first, &MockSource, today()).unwrap();

        assert_eq!(first, snapshot);
        for kind in MetricKind::ALL {
            assert_eq!(first.samples(kind).len(), 30);
        }
    }

    #[test]
    fn test_failed_fetch_leaves_store_untouched() {
        let mut store = MetricStore::new();
        fetch_all_data(&mut store, &MockSource, today()).unwrap();
        let before = store.clone();

        let result = fetch_all_data(&mut store, &FailingSource, today());
        assert!(matches!(result, Err(ComputeError::SourceError(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn test_background_refresh_delivers_single_completion() {
        let shared = SharedStore::default();
        let handle = shared.refresh_in_background(MockSource, today());
        let report = handle.join().unwrap().unwrap();

        assert_eq!(report.source, "mock");
        let steps = shared.read(|store| store.samples(MetricKind::Steps).len()).unwrap();
        assert_eq!(steps, 30);
    }
}
