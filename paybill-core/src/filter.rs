//! Posting-date range selection.

use chrono::NaiveDate;

use crate::records::{RecordSet, TransactionRecord};

/// Keep rows with `start <= posting_date <= end`.
///
/// Rows without a posting date never match, and an inverted range yields an
/// empty set.
pub fn filter_by_date(
    rows: RecordSet<TransactionRecord>,
    start: NaiveDate,
    end: NaiveDate,
) -> RecordSet<TransactionRecord> {
    let (columns, records) = rows.into_parts();
    let kept = records
        .into_iter()
        .filter(|r| r.posting_date.is_some_and(|d| start <= d && d <= end))
        .collect();
    RecordSet::with_rows(columns, kept)
}
