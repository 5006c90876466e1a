//! CSV reading and writing.
//!
//! Exports carry no index column and render dates as `DD-MM-YYYY`, so an
//! exported file reads back and normalizes to the same records.

use log::info;
use paybill_core::records::{AMOUNT, MEMBER};
use paybill_core::{AggregateRow, RawTransactionRow, RecordSet, Result, StatementError, TransactionRecord};
use std::io::Write;
use std::path::Path;

use crate::records_from_rows;

fn csv_error(err: csv::Error) -> StatementError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => StatementError::Io(io),
            other => StatementError::Sheet(format!("{other:?}")),
        }
    } else {
        StatementError::Sheet(err.to_string())
    }
}

/// Write records under their set's column list; nulls become empty cells.
pub fn write_transactions_csv<W: Write>(set: &RecordSet<TransactionRecord>, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(set.columns()).map_err(csv_error)?;

    for record in set {
        let cells = set
            .columns()
            .iter()
            .map(|column| record.field(column).unwrap_or_default());
        wtr.write_record(cells).map_err(csv_error)?;
    }
    wtr.flush()?;
    info!("wrote {} transaction rows", set.len());
    Ok(())
}

pub fn write_aggregates_csv<W: Write>(set: &RecordSet<AggregateRow>, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([MEMBER, AMOUNT]).map_err(csv_error)?;
    for row in set {
        wtr.write_record([row.member.clone(), row.amount.to_string()])
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    info!("wrote {} member totals", set.len());
    Ok(())
}

/// Read a CSV whose first row is the header. Rows may be ragged.
pub fn read_records_csv(path: impl AsRef<Path>) -> Result<RecordSet<RawTransactionRow>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(records_from_rows(rows))
}
