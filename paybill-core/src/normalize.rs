//! Type coercion of raw statement rows.

use chrono::NaiveDate;
use log::debug;

use crate::error::{Result, StatementError};
use crate::records::{
    CREDIT_AMOUNT, DATE_COLUMNS, DATE_FORMAT, DEBIT_AMOUNT, NARRATION, NUMERIC_COLUMNS,
    POSTING_DATE, RUNNING_BALANCE, RawTransactionRow, RecordSet, TransactionRecord, VALUE_DATE,
};

/// Parse an amount cell. Thousands separators are dropped and a blank cell is
/// `None`; anything else that is not a number is an error.
pub fn parse_amount(value: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned.parse::<f64>().map(Some)
}

/// Parse a `DD-MM-YYYY` cell, `None` when it does not match.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Coerce numeric and date columns, passing every other column through.
///
/// Fails before touching any row when a numeric or date column is absent.
pub fn normalize(rows: RecordSet<RawTransactionRow>) -> Result<RecordSet<TransactionRecord>> {
    let required: Vec<&str> = NUMERIC_COLUMNS.iter().chain(DATE_COLUMNS.iter()).copied().collect();
    let missing = rows.missing_columns(&required);
    if !missing.is_empty() {
        return Err(StatementError::schema(missing));
    }

    let (columns, raw_rows) = rows.into_parts();
    let mut out = Vec::with_capacity(raw_rows.len());

    for (idx, mut raw) in raw_rows.into_iter().enumerate() {
        let mut amount = |column: &str| -> Result<Option<f64>> {
            let value = raw.take(column).unwrap_or_default();
            parse_amount(&value).map_err(|_| StatementError::InvalidAmount {
                column: column.to_string(),
                row: idx + 1,
                value,
            })
        };

        let debit_amount = amount(DEBIT_AMOUNT)?;
        let credit_amount = amount(CREDIT_AMOUNT)?;
        let running_balance = amount(RUNNING_BALANCE)?;

        let posting_date = raw.take(POSTING_DATE).as_deref().and_then(parse_date);
        let value_date = raw.take(VALUE_DATE).as_deref().and_then(parse_date);
        let narration = raw.take(NARRATION).unwrap_or_default();

        out.push(TransactionRecord {
            narration,
            posting_date,
            value_date,
            debit_amount,
            credit_amount,
            running_balance,
            extra: raw.into_fields(),
        });
    }

    let unparsed_dates = out.iter().filter(|r| r.posting_date.is_none()).count();
    if unparsed_dates > 0 {
        debug!("{} of {} rows have no usable posting date", unparsed_dates, out.len());
    }

    Ok(RecordSet::with_rows(columns, out))
}
