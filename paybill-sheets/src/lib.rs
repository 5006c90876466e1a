//! paybill-sheets: CSV export of filtered statements and member totals, and
//! CSV/workbook import of previously exported or hand-edited statements.

pub mod delimited;
pub mod workbook;

use log::debug;
use paybill_core::{RawTransactionRow, RecordSet, Result, StatementError};
use std::path::Path;

pub use delimited::{read_records_csv, write_aggregates_csv, write_transactions_csv};
pub use workbook::read_records_xlsx;

/// Read a statement table, choosing the reader from the file extension.
pub fn read_records(path: impl AsRef<Path>) -> Result<RecordSet<RawTransactionRow>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => read_records_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_records_xlsx(path),
        _ => Err(StatementError::Sheet(format!(
            "unsupported file type: {}",
            path.display()
        ))),
    }
}

/// First row names the columns; later rows are zipped against it and padded.
pub(crate) fn records_from_rows<I>(rows: I) -> RecordSet<RawTransactionRow>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return RecordSet::default();
    };

    let mut set = RecordSet::new(header.iter().cloned());
    for cells in rows {
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        let padded = cells.into_iter().chain(std::iter::repeat_with(String::new));
        set.push(header.iter().cloned().zip(padded).collect());
    }
    debug!("read {} rows across {} columns", set.len(), set.columns().len());
    set
}
