//! Entries → occurrences → daily series → buckets, recomputed in full on every call.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DailyReservePoint, DateWindow, FinancialEntry, Interval};
use crate::interval::{BucketedSeries, bucketize};
use crate::recurrence::expand;
use crate::reserve::build_daily_series;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub window: DateWindow,
    pub reference: NaiveDate,
    pub daily: Vec<DailyReservePoint>,
    pub series: BucketedSeries,
}

impl Projection {
    pub fn occurrence_count(&self) -> usize {
        self.daily.iter().map(|p| p.occurrences.len()).sum()
    }
}

/// Runs the whole pipeline over a snapshot of the entry list.
pub fn project(
    entries: &[FinancialEntry],
    window: DateWindow,
    interval: Interval,
    reference: NaiveDate,
) -> Projection {
    let occurrences = expand(entries, window.start, window.end);
    let daily = build_daily_series(&occurrences, window.start, window.end);
    let series = bucketize(&daily, interval, reference);

    debug!(
        start = %window.start,
        end = %window.end,
        %interval,
        days = daily.len(),
        "projected reserve"
    );

    Projection {
        window,
        reference,
        daily,
        series,
    }
}
