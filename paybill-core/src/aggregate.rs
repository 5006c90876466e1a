//! Per-counterparty credit totals.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{Result, StatementError};
use crate::records::{AMOUNT, AggregateRow, CREDIT_AMOUNT, MEMBER, NARRATION, RecordSet, TransactionRecord};

/// Sum `credit_amount` per exact narration, nulls counting as zero.
///
/// Output rows are sorted by member name.
pub fn aggregate(rows: &RecordSet<TransactionRecord>) -> Result<RecordSet<AggregateRow>> {
    let missing = rows.missing_columns(&[NARRATION, CREDIT_AMOUNT]);
    if !missing.is_empty() {
        return Err(StatementError::schema(missing));
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *totals.entry(r.narration.as_str()).or_insert(0.0) += r.credit_amount.unwrap_or(0.0);
    }

    debug!("aggregated {} rows into {} members", rows.len(), totals.len());

    let out = totals
        .into_iter()
        .map(|(member, amount)| AggregateRow {
            member: member.to_string(),
            amount,
        })
        .collect();
    Ok(RecordSet::with_rows([MEMBER, AMOUNT], out))
}
