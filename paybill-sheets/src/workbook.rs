//! Spreadsheet import through calamine (xlsx, xls, ods).

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use paybill_core::records::DATE_FORMAT;
use paybill_core::{RawTransactionRow, RecordSet, Result, StatementError};
use std::path::Path;

use crate::records_from_rows;

/// Day zero of the 1900 date system, accounting for the 1900 leap-year bug.
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Calendar date of an Excel serial number (time of day dropped).
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    excel_epoch()?.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn iso_to_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok().map(|dt| dt.date()))
}

/// Cell text as the normalizer expects it: plain numbers and `DD-MM-YYYY` dates.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(dt) => match serial_to_date(dt.as_f64()) {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => match iso_to_date(s) {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => s.clone(),
        },
        other => other.to_string().trim().to_string(),
    }
}

/// Read the first worksheet; its first row is the header.
pub fn read_records_xlsx(path: impl AsRef<Path>) -> Result<RecordSet<RawTransactionRow>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| StatementError::Sheet(format!("opening {}: {e}", path.display())))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| StatementError::Sheet(format!("{} has no worksheets", path.display())))?;
    debug!("reading worksheet '{}' of {}", first_sheet, path.display());

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| StatementError::Sheet(format!("reading '{first_sheet}': {e}")))?;

    let rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    Ok(records_from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_date(45296.0), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(serial_to_date(45296.75), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_cells_render_for_normalize() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  JohnDoe ".into())), "JohnDoe");
        assert_eq!(cell_text(&Data::Float(1500.0)), "1500");
        assert_eq!(cell_text(&Data::Float(12.75)), "12.75");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::DateTimeIso("2024-01-05".into())), "05-01-2024");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2024-01-05T10:30:00".into())),
            "05-01-2024"
        );
    }

    #[test]
    fn test_missing_workbook_is_sheet_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records_xlsx(dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, StatementError::Sheet(_)));
    }
}
