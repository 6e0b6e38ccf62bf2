//! Cash-flow forecasting: recurring bills and paychecks expanded into dated occurrences,
//! folded into a day-by-day reserve, and bucketed for charting.
//!
//! The engine (`recurrence`, `reserve`, `interval`, `forecast`) is pure and synchronous;
//! storage and CSV live at the edges and only ever hand it validated entries.

pub mod config;
pub mod csv_io;
pub mod dates;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod interval;
pub mod recurrence;
pub mod reserve;
pub mod store;

pub use domain::{
    DailyReservePoint, DateWindow, EntryKind, FinancialEntry, Interval, Occurrence, Recurrence,
    ReportingBucketPoint,
};
pub use forecast::{Projection, project};
