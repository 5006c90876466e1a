//! paybill-core: statement record types, narration parsing, normalization,
//! date filtering and per-member aggregation.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod narration;
pub mod normalize;
pub mod records;

pub use aggregate::aggregate;
pub use error::{Result, StatementError};
pub use filter::filter_by_date;
pub use narration::{NarrationParser, PAYBILL_CODE, parse_name};
pub use normalize::normalize;
pub use records::{AggregateRow, RawTransactionRow, RecordSet, TransactionRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::STATEMENT_COLUMNS;
    use chrono::NaiveDate;

    fn raw(narration: &str, credit: &str, posted: &str) -> RawTransactionRow {
        STATEMENT_COLUMNS
            .iter()
            .copied()
            .zip([narration, "", credit, "1,000.00", posted, posted])
            .collect()
    }

    #[test]
    fn test_normalize_filter_aggregate() {
        let rows = RecordSet::with_rows(
            STATEMENT_COLUMNS,
            vec![
                raw("JohnDoe", "100", "02-01-2024"),
                raw("JohnDoe", "50", "03-01-2024"),
                raw("AcmeLtd", "1,500.00", "20-02-2024"),
                raw("AcmeLtd", "7", "bad"),
            ],
        );

        let clean = normalize(rows).unwrap();
        assert_eq!(clean.len(), 4);

        let january = filter_by_date(
            clean.clone(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(january.len(), 2);

        // Aggregation runs on the unfiltered set.
        let summary = aggregate(&clean).unwrap();
        assert_eq!(
            summary.rows(),
            &[
                AggregateRow { member: "AcmeLtd".into(), amount: 1507.0 },
                AggregateRow { member: "JohnDoe".into(), amount: 150.0 },
            ]
        );
    }

    #[test]
    fn test_records_serialize_for_preview() {
        let rec = TransactionRecord {
            narration: "JohnDoe".into(),
            posting_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            credit_amount: Some(100.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["narration"], "JohnDoe");
        assert_eq!(json["posting_date"], "2024-01-05");
        assert!(json["debit_amount"].is_null());
        assert!(json.get("extra").is_none());
    }
}
