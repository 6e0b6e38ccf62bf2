//! Downsamples a daily reserve series into reporting buckets.
//!
//! Two views come out of one call:
//! - per-bucket points over the whole series, each holding the reserve of the last day
//!   inside its bucket ("reserve as of period end");
//! - for the month-like intervals, one point per day of the bucket containing the
//!   reference date, carrying the last known reserve across days without data.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::dates::{
    add_days, add_months, each_day, end_of_month, start_of_half_year, start_of_month,
    start_of_quarter, start_of_week, start_of_year,
};
use crate::domain::{DailyReservePoint, DateWindow, Interval, ReportingBucketPoint};

impl Interval {
    /// First day of the bucket containing `date`. Weeks start on Monday.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Interval::Weekly => start_of_week(date),
            Interval::Monthly | Interval::ThreeMonth => start_of_month(date),
            Interval::Quarterly => start_of_quarter(date),
            Interval::SemiAnnual => start_of_half_year(date),
            Interval::Annual => start_of_year(date),
        }
    }

    /// Last day of the bucket containing `date`.
    pub fn bucket_end(self, date: NaiveDate) -> NaiveDate {
        let start = self.bucket_start(date);
        let months = match self {
            Interval::Weekly => return add_days(start, 6),
            Interval::Monthly | Interval::ThreeMonth => 1,
            Interval::Quarterly => 3,
            Interval::SemiAnnual => 6,
            Interval::Annual => 12,
        };
        add_days(add_months(start, months), -1)
    }

    /// Whether charts show individual days of the selected bucket for this interval.
    pub fn is_day_level(self) -> bool {
        matches!(
            self,
            Interval::Monthly | Interval::ThreeMonth | Interval::Quarterly | Interval::SemiAnnual
        )
    }

    /// Days covered by the day-level view around `reference`.
    ///
    /// `ThreeMonth` spans three full calendar months starting at the reference month,
    /// inclusive of the last day of the third month.
    pub fn view_range(self, reference: NaiveDate) -> DateWindow {
        match self {
            Interval::ThreeMonth => {
                let start = start_of_month(reference);
                DateWindow::new(start, end_of_month(add_months(start, 2)))
            }
            _ => DateWindow::new(self.bucket_start(reference), self.bucket_end(reference)),
        }
    }

    /// Forecast window used when the caller does not supply one.
    pub fn default_window(self, reference: NaiveDate) -> DateWindow {
        match self {
            Interval::Weekly => {
                DateWindow::new(start_of_month(reference), end_of_month(reference))
            }
            _ => self.view_range(reference),
        }
    }

    /// Axis label for a chart point.
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Interval::Annual => date.format("%Y").to_string(),
            _ => date.format("%b %-d").to_string(),
        }
    }

    /// Label for a whole bucket starting at `date`, as written to exports.
    pub fn bucket_label(self, date: NaiveDate) -> String {
        match self {
            Interval::Weekly => date.format("%b %-d").to_string(),
            Interval::Monthly | Interval::ThreeMonth | Interval::SemiAnnual => {
                date.format("%b %Y").to_string()
            }
            Interval::Quarterly => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
            Interval::Annual => date.format("%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketedSeries {
    pub interval: Interval,
    /// One point per non-empty bucket, dated at the bucket start.
    pub buckets: Vec<ReportingBucketPoint>,
    /// One point per day of the selected bucket; empty unless the interval is day-level.
    pub selected_days: Vec<ReportingBucketPoint>,
}

impl BucketedSeries {
    /// The points a chart for this interval plots.
    pub fn chart_points(&self) -> &[ReportingBucketPoint] {
        if self.interval.is_day_level() {
            &self.selected_days
        } else {
            &self.buckets
        }
    }
}

pub fn bucketize(
    daily: &[DailyReservePoint],
    interval: Interval,
    reference: NaiveDate,
) -> BucketedSeries {
    let buckets = aggregate_buckets(daily, interval);
    let selected_days = if interval.is_day_level() {
        day_view(daily, interval, reference)
    } else {
        Vec::new()
    };

    debug!(
        %interval,
        %reference,
        buckets = buckets.len(),
        selected_days = selected_days.len(),
        "bucketized reserve series"
    );

    BucketedSeries {
        interval,
        buckets,
        selected_days,
    }
}

/// Representative value per bucket: the reserve of the latest-dated point inside it.
/// Buckets without any daily point are left out, never interpolated.
pub fn aggregate_buckets(
    daily: &[DailyReservePoint],
    interval: Interval,
) -> Vec<ReportingBucketPoint> {
    let mut latest: BTreeMap<NaiveDate, &DailyReservePoint> = BTreeMap::new();
    for point in daily {
        latest
            .entry(interval.bucket_start(point.date))
            .and_modify(|current| {
                if point.date >= current.date {
                    *current = point;
                }
            })
            .or_insert(point);
    }

    latest
        .into_iter()
        .map(|(start, point)| ReportingBucketPoint {
            date: start,
            reserve: point.reserve,
        })
        .collect()
}

/// One point per day of `interval.view_range(reference)`.
///
/// The running value starts at the reserve of the latest point dated before the range
/// (zero if there is none) and is replaced whenever a day has its own point.
pub fn day_view(
    daily: &[DailyReservePoint],
    interval: Interval,
    reference: NaiveDate,
) -> Vec<ReportingBucketPoint> {
    let range = interval.view_range(reference);

    let mut carried = daily
        .iter()
        .filter(|p| p.date < range.start)
        .max_by_key(|p| p.date)
        .map_or(Decimal::ZERO, |p| p.reserve);

    let in_range: BTreeMap<NaiveDate, Decimal> = daily
        .iter()
        .filter(|p| range.contains(p.date))
        .map(|p| (p.date, p.reserve))
        .collect();

    each_day(range.start, range.end)
        .map(|day| {
            if let Some(reserve) = in_range.get(&day) {
                carried = *reserve;
            }
            ReportingBucketPoint {
                date: day,
                reserve: carried,
            }
        })
        .collect()
}
