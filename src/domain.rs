use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::dates::{self, format_iso_date};
use crate::error::{EntryError, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "bill")]
    Expenditure,
    #[serde(rename = "paycheck")]
    Acquisition,
}

impl EntryKind {
    /// Applies the sign implied by the kind to a stored magnitude.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            EntryKind::Expenditure => -amount,
            EntryKind::Acquisition => amount,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Expenditure => "bill",
            EntryKind::Acquisition => "paycheck",
        }
    }

    pub fn sign_char(self) -> char {
        match self {
            EntryKind::Expenditure => '-',
            EntryKind::Acquisition => '+',
        }
    }
}

impl FromStr for EntryKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bill" | "expenditure" => Ok(EntryKind::Expenditure),
            "paycheck" | "acquisition" => Ok(EntryKind::Acquisition),
            _ => Err(ParseEnumError {
                what: "entry type",
                value: s.to_string(),
                expected: "bill, paycheck",
            }),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Recurrence {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[default]
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "one-time")]
    OneTime,
}

/// Distance between two consecutive occurrences of a recurring entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
}

impl Recurrence {
    /// `None` for one-time entries.
    pub fn period(self) -> Option<Period> {
        match self {
            Recurrence::Weekly => Some(Period::Days(7)),
            Recurrence::BiWeekly => Some(Period::Days(14)),
            Recurrence::Monthly => Some(Period::Months(1)),
            Recurrence::OneTime => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recurrence::Weekly => "weekly",
            Recurrence::BiWeekly => "bi-weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::OneTime => "one-time",
        }
    }
}

impl FromStr for Recurrence {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Recurrence::Weekly),
            "bi-weekly" | "biweekly" => Ok(Recurrence::BiWeekly),
            "monthly" => Ok(Recurrence::Monthly),
            "one-time" | "onetime" | "once" => Ok(Recurrence::OneTime),
            _ => Err(ParseEnumError {
                what: "frequency",
                value: s.to_string(),
                expected: "weekly, bi-weekly, monthly, one-time",
            }),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-declared bill or paycheck with its schedule.
///
/// `amount` is always a magnitude; the sign comes from `kind` at aggregation time.
/// Serialized as `{id, type, name, amount, date, frequency}`; decoding goes through
/// validation so a stored list can never smuggle in a negative amount or blank name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEntry", into = "WireEntry")]
pub struct FinancialEntry {
    pub id: String,
    pub kind: EntryKind,
    pub name: String,
    pub amount: Decimal,
    pub anchor_date: NaiveDate,
    pub recurrence: Recurrence,
}

impl FinancialEntry {
    /// Builds a validated entry with a fresh UUID v4 id.
    pub fn new(
        kind: EntryKind,
        name: &str,
        amount: Decimal,
        anchor_date: NaiveDate,
        recurrence: Recurrence,
    ) -> Result<Self, EntryError> {
        Self::with_id(
            Uuid::new_v4().to_string(),
            kind,
            name,
            amount,
            anchor_date,
            recurrence,
        )
    }

    pub fn with_id(
        id: String,
        kind: EntryKind,
        name: &str,
        amount: Decimal,
        anchor_date: NaiveDate,
        recurrence: Recurrence,
    ) -> Result<Self, EntryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EntryError::BlankName);
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(EntryError::NegativeAmount(amount));
        }
        Ok(Self {
            id,
            kind,
            name: name.to_string(),
            amount,
            anchor_date,
            recurrence,
        })
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEntry {
    id: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    name: String,
    #[serde(with = "wire_amount")]
    amount: Decimal,
    #[serde(with = "wire_date")]
    date: NaiveDate,
    frequency: Recurrence,
}

impl TryFrom<WireEntry> for FinancialEntry {
    type Error = EntryError;

    fn try_from(wire: WireEntry) -> Result<Self, Self::Error> {
        FinancialEntry::with_id(
            wire.id,
            wire.kind,
            &wire.name,
            wire.amount,
            wire.date,
            wire.frequency,
        )
    }
}

impl From<FinancialEntry> for WireEntry {
    fn from(entry: FinancialEntry) -> Self {
        WireEntry {
            id: entry.id,
            kind: entry.kind,
            name: entry.name,
            amount: entry.amount,
            date: entry.anchor_date,
            frequency: entry.recurrence,
        }
    }
}

/// Written as a JSON number; read from either a number or a decimal string.
mod wire_amount {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Decimal, s: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(amount, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        <Decimal as Deserialize>::deserialize(d)
    }
}

/// `YYYY-MM-DD` on the wire. Older lists stored full RFC 3339 timestamps; those are
/// rehydrated into the local calendar day they denote.
mod wire_date {
    use chrono::{DateTime, Local, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::dates::{format_iso_date, parse_iso_date};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(date) = parse_iso_date(&raw) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| ts.with_timezone(&Local).date_naive())
            .map_err(|_| de::Error::custom(format!("invalid date '{raw}'")))
    }
}

/// One concrete dated materialization of an entry inside a query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// `<entry id>-<YYYY-MM-DD>`
    pub id: String,
    pub entry_id: String,
    pub kind: EntryKind,
    pub name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl Occurrence {
    pub fn of(entry: &FinancialEntry, date: NaiveDate) -> Self {
        Self {
            id: format!("{}-{}", entry.id, format_iso_date(date)),
            entry_id: entry.id.clone(),
            kind: entry.kind,
            name: entry.name.clone(),
            amount: entry.amount,
            date,
        }
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReservePoint {
    pub date: NaiveDate,
    /// Running signed total at the end of `date`, starting from zero at the window start.
    pub reserve: Decimal,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingBucketPoint {
    /// Start of the bucket, or the day itself in day-level views.
    pub date: NaiveDate,
    pub reserve: Decimal,
}

impl ReportingBucketPoint {
    pub fn tone(&self) -> ReserveTone {
        ReserveTone::of(self.reserve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveTone {
    Surplus,
    Deficit,
}

impl ReserveTone {
    pub fn of(reserve: Decimal) -> Self {
        if reserve.is_sign_negative() && !reserve.is_zero() {
            ReserveTone::Deficit
        } else {
            ReserveTone::Surplus
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "weekly")]
    Weekly,
    #[default]
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "3month")]
    ThreeMonth,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "semiannually")]
    SemiAnnual,
    #[serde(rename = "annually")]
    Annual,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::ThreeMonth => "3month",
            Interval::Quarterly => "quarterly",
            Interval::SemiAnnual => "semiannually",
            Interval::Annual => "annually",
        }
    }
}

impl FromStr for Interval {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Interval::Weekly),
            "monthly" | "month" => Ok(Interval::Monthly),
            "3month" | "three-month" | "3-month" => Ok(Interval::ThreeMonth),
            "quarterly" | "quarter" => Ok(Interval::Quarterly),
            "semiannually" | "semiannual" | "semi-annual" => Ok(Interval::SemiAnnual),
            "annually" | "annual" | "yearly" => Ok(Interval::Annual),
            _ => Err(ParseEnumError {
                what: "interval",
                value: s.to_string(),
                expected: "weekly, monthly, 3month, quarterly, semiannually, annually",
            }),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[start, end]` calendar range. A window with `end < start` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, zero when empty.
    pub fn len_days(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            dates::days_between(self.start, self.end) + 1
        }
    }
}
