//! Daily aggregation
//!
//! Turns the store's sample list for one kind into a gap-filled series with
//! exactly one point per day of the window, oldest first.

use crate::store::MetricStore;
use crate::types::{MetricKind, Sample, Window};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Build the daily series for `kind` over `window` ending at `today`.
///
/// Days without a sample get a zero sample in the kind's canonical unit. When
/// several samples share a day the first one in store order is used.
pub fn chart_data(
    store: &MetricStore,
    kind: MetricKind,
    window: Window,
    today: NaiveDate,
) -> Vec<Sample> {
    let mut by_day: HashMap<NaiveDate, &Sample> = HashMap::new();
    for sample in store.samples(kind) {
        by_day.entry(sample.day()).or_insert(sample);
    }

    let mut filled = 0usize;
    let series: Vec<Sample> = window
        .days_ending(today)
        .map(|day| match by_day.get(&day) {
            Some(sample) => (*sample).clone(),
            None => {
                filled += 1;
                Sample::zero(kind, day)
            }
        })
        .collect();

    debug!(kind = %kind, days = window.days(), filled, "aggregated daily series");

    series
}
