//! Typed failures shared by every pipeline stage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    /// The PDF is encrypted and the password was missing or wrong.
    #[error("could not open PDF: {0}")]
    Authentication(String),

    /// Extraction finished but no usable transaction rows were found.
    #[error("no transaction rows found in the document")]
    EmptyResult,

    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidAmount {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unreadable PDF: {0}")]
    Pdf(String),

    #[error("spreadsheet error: {0}")]
    Sheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatementError {
    pub fn schema<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StatementError::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty extraction is reported to the user but is not a hard failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, StatementError::EmptyResult)
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_lists_columns() {
        let err = StatementError::schema(["Credit Amount", "Value Date"]);
        assert_eq!(
            err.to_string(),
            "missing required column(s): Credit Amount, Value Date"
        );
        assert!(!err.is_warning());
    }

    #[test]
    fn test_empty_result_is_warning() {
        assert!(StatementError::EmptyResult.is_warning());
        assert!(!StatementError::Authentication("bad password".into()).is_warning());
    }
}
