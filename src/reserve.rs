//! Folds occurrences into a contiguous day-by-day reserve series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::dates::each_day;
use crate::domain::{DailyReservePoint, EntryKind, Occurrence};

/// One point per calendar day of `[start, end]`, ascending, starting from a zero reserve.
///
/// Occurrences dated outside the window are ignored. Each point keeps the occurrences
/// dated exactly that day, in input order.
pub fn build_daily_series(
    occurrences: &[Occurrence],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyReservePoint> {
    if end < start {
        return Vec::new();
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        by_day
            .entry(occurrence.date)
            .or_default()
            .push(occurrence.clone());
    }

    let mut running = Decimal::ZERO;
    let series: Vec<DailyReservePoint> = each_day(start, end)
        .map(|day| {
            let on_day = by_day.remove(&day).unwrap_or_default();
            running += on_day.iter().map(Occurrence::signed_amount).sum::<Decimal>();
            DailyReservePoint {
                date: day,
                reserve: running,
                occurrences: on_day,
            }
        })
        .collect();

    debug!(
        days = series.len(),
        closing_reserve = %running,
        "built daily reserve series"
    );
    series
}

/// How one day's reserve was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub previous_reserve: Decimal,
    pub acquisitions: Decimal,
    pub expenditures: Decimal,
    pub reserve: Decimal,
    pub occurrences: Vec<Occurrence>,
}

impl DayBreakdown {
    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(move |o| o.kind == kind)
    }
}

/// `None` when `date` is not part of the series.
pub fn breakdown(daily: &[DailyReservePoint], date: NaiveDate) -> Option<DayBreakdown> {
    let idx = daily.iter().position(|p| p.date == date)?;
    let point = &daily[idx];

    let total = |kind: EntryKind| -> Decimal {
        point
            .occurrences
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.amount)
            .sum()
    };
    let acquisitions = total(EntryKind::Acquisition);
    let expenditures = total(EntryKind::Expenditure);

    let previous_reserve = match idx.checked_sub(1) {
        Some(prev) => daily[prev].reserve,
        None => point.reserve - acquisitions + expenditures,
    };

    Some(DayBreakdown {
        date,
        previous_reserve,
        acquisitions,
        expenditures,
        reserve: point.reserve,
        occurrences: point.occurrences.clone(),
    })
}
