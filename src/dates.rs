//! Local-calendar date primitives.
//!
//! Everything here works on `NaiveDate`: a calendar day with no time-of-day and no offset.
//! A string like `2024-03-01` always means March 1st, whatever the host timezone is.

use chrono::{Datelike, Days, Local, Months, NaiveDate};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// Calendar-day distance between two dates, in either order.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u64 {
    (b - a).num_days().unsigned_abs()
}

/// Saturates at the ends of the representable calendar.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let shifted = if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn add_weeks(date: NaiveDate, n: i64) -> NaiveDate {
    add_days(date, n.saturating_mul(7))
}

/// Adds calendar months, clamping the day to the end of the target month
/// (Jan 31 + 1 month is Feb 29 in a leap year, Feb 28 otherwise).
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let months = Months::new(n.unsigned_abs());
    let shifted = if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parses `YYYY-MM-DD` into local calendar components. No UTC interpretation happens.
pub fn parse_iso_date(raw: &str) -> chrono::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE)
}

/// Today in the user's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.day0()))
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    add_days(add_months(start_of_month(date), 1), -1)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    end_of_month(date).day()
}

pub fn start_of_quarter(date: NaiveDate) -> NaiveDate {
    start_of_month_block(date, 3)
}

/// January 1st or July 1st.
pub fn start_of_half_year(date: NaiveDate) -> NaiveDate {
    start_of_month_block(date, 6)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    start_of_month_block(date, 12)
}

fn start_of_month_block(date: NaiveDate, block: u32) -> NaiveDate {
    let offset = date.month0() % block;
    add_months(start_of_month(date), -(offset as i32))
}

/// Every day from `start` to `end` inclusive; empty when `end < start`.
pub fn each_day(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(raw: &str) -> NaiveDate {
        parse_iso_date(raw).expect("valid date")
    }

    #[test]
    fn month_addition_clamps_to_month_end() {
        assert_eq!(add_months(d("2024-01-31"), 1), d("2024-02-29"));
        assert_eq!(add_months(d("2023-01-31"), 1), d("2023-02-28"));
        assert_eq!(add_months(d("2024-01-31"), 3), d("2024-04-30"));
        assert_eq!(add_months(d("2024-03-31"), -1), d("2024-02-29"));
    }

    #[test]
    fn days_between_is_symmetric_and_calendar_based() {
        assert_eq!(days_between(d("2024-03-01"), d("2024-03-31")), 30);
        assert_eq!(days_between(d("2024-03-31"), d("2024-03-01")), 30);
        // Spans the usual DST switch without drifting.
        assert_eq!(days_between(d("2024-03-09"), d("2024-03-11")), 2);
    }

    #[test]
    fn iso_round_trip_keeps_the_calendar_day() {
        let date = parse_iso_date("2024-03-01").expect("parse");
        assert_eq!(format_iso_date(date), "2024-03-01");
        assert!(parse_iso_date("2024-13-01").is_err());
        assert!(parse_iso_date("03/01/2024").is_err());
    }

    #[test]
    fn bucket_starts() {
        // 2024-03-14 is a Thursday.
        assert_eq!(start_of_week(d("2024-03-14")), d("2024-03-11"));
        assert_eq!(start_of_week(d("2024-03-11")), d("2024-03-11"));
        assert_eq!(start_of_month(d("2024-03-14")), d("2024-03-01"));
        assert_eq!(end_of_month(d("2024-02-10")), d("2024-02-29"));
        assert_eq!(start_of_quarter(d("2024-05-20")), d("2024-04-01"));
        assert_eq!(start_of_half_year(d("2024-06-30")), d("2024-01-01"));
        assert_eq!(start_of_half_year(d("2024-07-01")), d("2024-07-01"));
        assert_eq!(start_of_year(d("2024-12-31")), d("2024-01-01"));
        assert_eq!(days_in_month(d("2023-02-01")), 28);
    }

    #[test]
    fn each_day_is_inclusive_and_empty_when_reversed() {
        assert_eq!(each_day(d("2024-01-30"), d("2024-02-02")).count(), 4);
        assert_eq!(each_day(d("2024-02-02"), d("2024-01-30")).count(), 0);
    }
}
