//! Metric sources
//!
//! A source produces one fetch batch per call: complete sample lists for the
//! kinds it covers. The store replaces each covered kind with the new list.

mod mock;
mod readings;

pub use mock::MockSource;
pub use readings::{RawReading, ReadingsSource, SleepCategory, FETCH_HORIZON_DAYS};

use crate::error::ComputeError;
use crate::types::{MetricKind, Sample};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait for anything that can populate the metric store
pub trait MetricSource {
    /// Short identifier used in logs and fetch reports
    fn name(&self) -> &str;

    /// Produce fresh sample lists for the days ending at `today`
    fn fetch(&self, today: NaiveDate) -> Result<FetchBatch, ComputeError>;
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, today: NaiveDate) -> Result<FetchBatch, ComputeError> {
        (**self).fetch(today)
    }
}

/// Complete sample lists produced by a single fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchBatch {
    lists: BTreeMap<MetricKind, Vec<Sample>>,
}

impl FetchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the list for `kind`, replacing any list already in the batch
    pub fn insert(&mut self, kind: MetricKind, samples: Vec<Sample>) {
        self.lists.insert(kind, samples);
    }

    pub fn get(&self, kind: MetricKind) -> Option<&[Sample]> {
        self.lists.get(&kind).map(Vec::as_slice)
    }

    pub fn into_lists(self) -> BTreeMap<MetricKind, Vec<Sample>> {
        self.lists
    }

    /// Summarize this batch for logging and CLI output
    pub fn report(&self, source: &str) -> FetchReport {
        FetchReport {
            source: source.to_string(),
            samples_per_kind: self
                .lists
                .iter()
                .map(|(kind, samples)| (*kind, samples.len()))
                .collect(),
        }
    }
}

/// Outcome of a completed fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub source: String,
    pub samples_per_kind: BTreeMap<MetricKind, usize>,
}
