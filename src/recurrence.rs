//! Expands scheduled entries into the concrete occurrences that land in a window.

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::debug;

use crate::domain::{FinancialEntry, Occurrence, Period};

/// Every occurrence of every entry dated within `[start, end]`.
///
/// Schedules stay anchored at each entry's `anchor_date`; instances before `start` are
/// stepped over, never emitted. Output order follows the input entry order, then date.
pub fn expand(entries: &[FinancialEntry], start: NaiveDate, end: NaiveDate) -> Vec<Occurrence> {
    let mut out = Vec::new();
    if end < start {
        return out;
    }

    for entry in entries {
        expand_entry(entry, start, end, &mut out);
    }

    debug!(
        entries = entries.len(),
        occurrences = out.len(),
        %start,
        %end,
        "expanded entries"
    );
    out
}

fn expand_entry(
    entry: &FinancialEntry,
    start: NaiveDate,
    end: NaiveDate,
    out: &mut Vec<Occurrence>,
) {
    let anchor = entry.anchor_date;
    match entry.recurrence.period() {
        Some(period) => expand_schedule(entry, period, start, end, out),
        None => {
            if start <= anchor && anchor <= end {
                out.push(Occurrence::of(entry, anchor));
            }
        }
    }
}

/// Panics when the period does not move the schedule forward.
fn expand_schedule(
    entry: &FinancialEntry,
    period: Period,
    start: NaiveDate,
    end: NaiveDate,
    out: &mut Vec<Occurrence>,
) {
    let anchor = entry.anchor_date;
    let mut index = period.first_candidate(anchor, start);
    let mut previous: Option<NaiveDate> = None;
    while let Some(date) = period.nth(anchor, index) {
        if date > end {
            break;
        }
        if let Some(prev) = previous {
            assert!(
                date > prev,
                "schedule of entry {} does not advance past {prev}",
                entry.id
            );
        }
        if date >= start {
            out.push(Occurrence::of(entry, date));
        }
        previous = Some(date);
        index += 1;
    }
}

impl Period {
    /// The `n`th scheduled date counted from `anchor` (the anchor itself is `n = 0`).
    ///
    /// Months are always added to the anchor, never to the previous clamped date, so a
    /// schedule anchored on the 31st returns to the 31st after a short month.
    /// `None` once the date leaves the representable calendar.
    pub fn nth(self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Period::Days(days) => {
                anchor.checked_add_days(Days::new(u64::from(days) * u64::from(n)))
            }
            Period::Months(months) => {
                anchor.checked_add_months(Months::new(months.checked_mul(n)?))
            }
        }
    }

    /// Lowest index that can still land on or after `start`; earlier ones cannot.
    fn first_candidate(self, anchor: NaiveDate, start: NaiveDate) -> u32 {
        if start <= anchor {
            return 0;
        }
        match self {
            Period::Days(0) | Period::Months(0) => 0,
            Period::Days(days) => {
                let gap = (start - anchor).num_days();
                u32::try_from(gap / i64::from(days)).unwrap_or(u32::MAX)
            }
            Period::Months(months) => {
                let gap = (start.year() - anchor.year()) * 12 + start.month() as i32
                    - anchor.month() as i32;
                u32::try_from(gap / months as i32).unwrap_or(0)
            }
        }
    }
}
