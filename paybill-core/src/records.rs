//! Record types that flow between the pipeline stages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NARRATION: &str = "Narration";
pub const DEBIT_AMOUNT: &str = "Debit Amount";
pub const CREDIT_AMOUNT: &str = "Credit Amount";
pub const RUNNING_BALANCE: &str = "Running Balance";
pub const POSTING_DATE: &str = "Posting Date";
pub const VALUE_DATE: &str = "Value Date";

pub const NUMERIC_COLUMNS: [&str; 3] = [DEBIT_AMOUNT, CREDIT_AMOUNT, RUNNING_BALANCE];
pub const DATE_COLUMNS: [&str; 2] = [POSTING_DATE, VALUE_DATE];

/// Statement schema in export order.
pub const STATEMENT_COLUMNS: [&str; 6] = [
    NARRATION,
    DEBIT_AMOUNT,
    CREDIT_AMOUNT,
    RUNNING_BALANCE,
    POSTING_DATE,
    VALUE_DATE,
];

pub const MEMBER: &str = "Member";
pub const AMOUNT: &str = "Amount";

/// Day-month-year, e.g. `05-01-2024`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// An ordered set of rows sharing one column list.
///
/// Columns keep the order in which they were first seen. Stages take a set
/// by value and hand back a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet<R> {
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R> Default for RecordSet<R> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<R> RecordSet<R> {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for c in columns {
            set.add_column(c);
        }
        set
    }

    pub fn with_rows<I, S>(columns: I, rows: Vec<R>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(columns);
        set.rows = rows;
        set
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Names from `required` that this set does not carry, in the given order.
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    /// Append a column name unless it is already present.
    pub fn add_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_column(&name) {
            self.columns.push(name);
        }
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<R>) {
        (self.columns, self.rows)
    }
}

impl<R> IntoIterator for RecordSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a RecordSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// One table row as extracted, every cell still text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransactionRow {
    fields: BTreeMap<String, String>,
}

impl RawTransactionRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn take(&mut self, column: &str) -> Option<String> {
        self.fields.remove(column)
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for RawTransactionRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A normalized statement line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Counterparty after narration parsing
    pub narration: String,
    pub posting_date: Option<NaiveDate>,
    pub value_date: Option<NaiveDate>,
    pub debit_amount: Option<f64>,
    pub credit_amount: Option<f64>,
    pub running_balance: Option<f64>,
    /// Columns outside the statement schema, carried as text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl TransactionRecord {
    /// Render a column back to text; `None` for nulls and unknown columns.
    pub fn field(&self, column: &str) -> Option<String> {
        let amount = |v: Option<f64>| v.map(|v| v.to_string());
        let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());

        match column {
            NARRATION => Some(self.narration.clone()),
            DEBIT_AMOUNT => amount(self.debit_amount),
            CREDIT_AMOUNT => amount(self.credit_amount),
            RUNNING_BALANCE => amount(self.running_balance),
            POSTING_DATE => date(self.posting_date),
            VALUE_DATE => date(self.value_date),
            other => self.extra.get(other).cloned(),
        }
    }
}

impl RecordSet<TransactionRecord> {
    /// Earliest and latest non-null posting dates.
    pub fn posting_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.iter().filter_map(|r| r.posting_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    pub fn total_credit(&self) -> f64 {
        self.iter().map(|r| r.credit_amount.unwrap_or(0.0)).sum()
    }
}

/// Summed credits for one counterparty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub member: String,
    pub amount: f64,
}

impl RecordSet<AggregateRow> {
    pub fn total_amount(&self) -> f64 {
        self.iter().map(|r| r.amount).sum()
    }
}
