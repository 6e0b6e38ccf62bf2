//! CSV adapters around the entry list and the bucketed reserve.
//!
//! Import header: `id,type,name,amount,date,frequency` (`id` may be blank).
//! Export header: `Month,Reserve`.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dates::parse_iso_date;
use crate::domain::{EntryKind, FinancialEntry, Interval, Recurrence, ReportingBucketPoint};
use crate::error::{ExportError, ImportError};

#[derive(Deserialize)]
struct CsvEntryRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    amount: String,
    date: String,
    frequency: String,
}

#[derive(Serialize)]
struct CsvReserveRow {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Reserve")]
    reserve: String,
}

/// Parses and validates every row; the first bad row aborts the import.
pub fn read_entries<R: Read>(r: R) -> Result<Vec<FinancialEntry>, ImportError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(r);
    let mut entries = Vec::new();

    for (idx, rec) in rdr.deserialize::<CsvEntryRow>().enumerate() {
        let row_no = idx + 1;
        let row = rec?;
        let bad = |message: String| {
            warn!(row = row_no, error = %message, "rejected CSV row");
            ImportError::Row {
                row: row_no,
                message,
            }
        };

        let kind: EntryKind = row.kind.parse().map_err(|e| bad(format!("{e}")))?;
        let recurrence: Recurrence = row.frequency.parse().map_err(|e| bad(format!("{e}")))?;
        let amount: Decimal = row
            .amount
            .parse()
            .map_err(|e| bad(format!("amount '{}': {e}", row.amount)))?;
        let date = parse_iso_date(&row.date)
            .map_err(|e| bad(format!("date '{}': {e}", row.date)))?;

        let id = match row.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let entry = FinancialEntry::with_id(id, kind, &row.name, amount, date, recurrence)
            .map_err(|source| {
                warn!(row = row_no, error = %source, "rejected CSV row");
                ImportError::Entry {
                    row: row_no,
                    source,
                }
            })?;
        entries.push(entry);
    }

    info!(entries = entries.len(), "imported entries from CSV");
    Ok(entries)
}

/// Writes one `Month,Reserve` row per bucket, labelled for `interval`.
pub fn write_buckets<W: Write>(
    w: W,
    points: &[ReportingBucketPoint],
    interval: Interval,
) -> Result<(), ExportError> {
    let mut wrt = WriterBuilder::new().from_writer(w);

    for p in points {
        wrt.serialize(CsvReserveRow {
            month: interval.bucket_label(p.date),
            reserve: format!("{:.2}", p.reserve),
        })?;
    }
    if points.is_empty() {
        wrt.write_record(["Month", "Reserve"])?;
    }
    wrt.flush()?;
    Ok(())
}
