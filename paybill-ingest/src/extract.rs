//! Statement table extraction: PDF bytes in, raw transaction rows out.

use log::{debug, info};
use paybill_core::records::NARRATION;
use paybill_core::{NarrationParser, PAYBILL_CODE, RawTransactionRow, RecordSet, Result, StatementError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::detectors::{LayoutOptions, LayoutTableDetector, TableDetector};
use crate::layout::page_layouts;
use crate::pdf::open_document;
use crate::types::Table;

/// Narrations containing any of these (any case) are bank charges, not payments.
pub const DEFAULT_EXCLUDED_KEYWORDS: [&str; 3] = ["mobile wallet", "maint fee", "excise charges"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub excluded_keywords: Vec<String>,
    pub paybill_code: String,
    pub layout: LayoutOptions,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            excluded_keywords: DEFAULT_EXCLUDED_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            paybill_code: PAYBILL_CODE.to_string(),
            layout: LayoutOptions::default(),
        }
    }
}

/// Drops charge rows and rewrites the remaining narrations to counterparty names.
#[derive(Debug, Clone)]
pub struct NarrationFilter {
    excluded: Option<Regex>,
    parser: NarrationParser,
}

impl NarrationFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S], parser: NarrationParser) -> std::result::Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        let excluded = if alternatives.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&alternatives.join("|"))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { excluded, parser })
    }

    pub fn is_excluded(&self, narration: &str) -> bool {
        self.excluded.as_ref().is_some_and(|re| re.is_match(narration))
    }

    pub fn clean(&self, narration: &str) -> String {
        self.parser.parse(narration)
    }
}

impl Default for NarrationFilter {
    fn default() -> Self {
        Self::new(&DEFAULT_EXCLUDED_KEYWORDS[..], NarrationParser::default())
            .expect("escaped keywords form a valid pattern")
    }
}

/// Turn detected tables into one raw record set.
///
/// Each table's first row names the columns for its remaining rows; short
/// rows are padded with empty cells. Tables are concatenated in order and the
/// column list is the union of all headers.
pub fn assemble<I>(tables: I, filter: &NarrationFilter) -> Result<RecordSet<RawTransactionRow>>
where
    I: IntoIterator<Item = Table>,
{
    let mut set: RecordSet<RawTransactionRow> = RecordSet::default();
    let mut dropped = 0usize;

    for table in tables {
        let page = table.page;
        let mut rows = table.rows.into_iter();
        let Some(header) = rows.next() else {
            continue;
        };
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        for name in &header {
            set.add_column(name.clone());
        }
        let has_narration = header.iter().any(|h| h == NARRATION);

        let before = set.len();
        for cells in rows {
            let padded = cells.into_iter().chain(std::iter::repeat_with(String::new));
            let mut row: RawTransactionRow = header.iter().cloned().zip(padded).collect();

            if has_narration {
                let narration = row.get(NARRATION).unwrap_or_default();
                if filter.is_excluded(narration) {
                    dropped += 1;
                    continue;
                }
                let name = filter.clean(narration);
                row.set(NARRATION, name);
            }
            set.push(row);
        }
        debug!("page {}: kept {} rows", page, set.len() - before);
    }

    if set.is_empty() {
        return Err(StatementError::EmptyResult);
    }
    info!("extracted {} rows ({} charge rows dropped)", set.len(), dropped);
    Ok(set)
}

pub struct TableExtractor<D = LayoutTableDetector> {
    detector: D,
    filter: NarrationFilter,
}

impl Default for TableExtractor<LayoutTableDetector> {
    fn default() -> Self {
        Self::new(LayoutTableDetector::default(), NarrationFilter::default())
    }
}

impl TableExtractor<LayoutTableDetector> {
    pub fn from_config(config: &ExtractConfig) -> std::result::Result<Self, regex::Error> {
        let filter = NarrationFilter::new(
            config.excluded_keywords.as_slice(),
            NarrationParser::new(config.paybill_code.clone()),
        )?;
        Ok(Self::new(LayoutTableDetector::new(config.layout.clone()), filter))
    }
}

impl<D: TableDetector> TableExtractor<D> {
    pub fn new(detector: D, filter: NarrationFilter) -> Self {
        Self { detector, filter }
    }

    /// Read every page's table from `pdf`, decrypting with `password` if needed.
    pub fn extract(&self, pdf: &[u8], password: Option<&str>) -> Result<RecordSet<RawTransactionRow>> {
        let mut doc = open_document(pdf, password)?;
        let pages = page_layouts(&mut doc)?;
        info!("reading {} pages", pages.len());

        let tables = pages.iter().filter_map(|page| {
            let table = self.detector.detect(page);
            if table.is_none() {
                debug!("page {}: no table detected", page.number);
            }
            table
        });
        assemble(tables, &self.filter)
    }
}

/// Extract with the default detector and charge filter.
pub fn extract(pdf: &[u8], password: Option<&str>) -> Result<RecordSet<RawTransactionRow>> {
    TableExtractor::default().extract(pdf, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageLayout;
    use paybill_core::records::{CREDIT_AMOUNT, DEBIT_AMOUNT, STATEMENT_COLUMNS};
    use paybill_core::{aggregate, normalize};

    fn table(page: u32, rows: &[&[&str]]) -> Table {
        Table::new(
            page,
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn statement_header() -> Vec<&'static str> {
        STATEMENT_COLUMNS.to_vec()
    }

    #[test]
    fn test_john_doe_rows_aggregate_to_one_member() {
        let header = statement_header();
        let t = table(
            1,
            &[
                header.as_slice(),
                &["A~JOHN DOE", "", "100", "100", "02-01-2024", "02-01-2024"],
                &["A~JOHN DOE", "", "50", "150", "03-01-2024", "03-01-2024"],
            ],
        );

        let raw = assemble([t], &NarrationFilter::default()).unwrap();
        assert!(raw.iter().all(|r| r.get(NARRATION) == Some("JohnDoe")));

        let summary = aggregate(&normalize(raw).unwrap()).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.rows()[0].member, "JohnDoe");
        assert_eq!(summary.rows()[0].amount, 150.0);
    }

    #[test]
    fn test_charge_rows_are_dropped_any_case() {
        let header = statement_header();
        let t = table(
            1,
            &[
                header.as_slice(),
                &["Mobile Wallet TRF~X", "10", "", "90", "02-01-2024", "02-01-2024"],
                &["ACC MAINT FEE", "5", "", "85", "02-01-2024", "02-01-2024"],
                &["EXCISE Charges", "1", "", "84", "02-01-2024", "02-01-2024"],
                &["B~mary jane", "", "40", "124", "03-01-2024", "03-01-2024"],
            ],
        );

        let raw = assemble([t], &NarrationFilter::default()).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.rows()[0].get(NARRATION), Some("MaryJane"));
    }

    #[test]
    fn test_pages_concatenate_in_order_with_column_union() {
        let p1 = table(
            1,
            &[&["Narration", "Credit Amount"], &["A~ONE", "1"], &["A~TWO", "2"]],
        );
        let p2 = table(
            2,
            &[&["Narration", "Credit Amount", "Reference"], &["A~THREE", "3", "FT9"]],
        );

        let raw = assemble([p1, p2], &NarrationFilter::default()).unwrap();
        assert_eq!(raw.columns(), &["Narration", "Credit Amount", "Reference"]);
        let names: Vec<_> = raw.iter().map(|r| r.get(NARRATION).unwrap()).collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert_eq!(raw.rows()[0].get("Reference"), None);
        assert_eq!(raw.rows()[2].get("Reference"), Some("FT9"));
    }

    #[test]
    fn test_table_without_narration_is_kept_verbatim() {
        let t = table(1, &[&["Debit Amount", "Credit Amount"], &["", "mobile wallet"]]);
        let raw = assemble([t], &NarrationFilter::default()).unwrap();
        assert_eq!(raw.rows()[0].get(CREDIT_AMOUNT), Some("mobile wallet"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = table(1, &[&["Narration", "Debit Amount", "Credit Amount"], &["A~X"]]);
        let raw = assemble([t], &NarrationFilter::default()).unwrap();
        assert_eq!(raw.rows()[0].get(DEBIT_AMOUNT), Some(""));
        assert_eq!(raw.rows()[0].get(CREDIT_AMOUNT), Some(""));
    }

    #[test]
    fn test_nothing_left_is_empty_result() {
        let header = statement_header();
        let only_fees = table(1, &[header.as_slice(), &["MAINT FEE", "5", "", "1", "", ""]]);
        let err = assemble([only_fees], &NarrationFilter::default()).unwrap_err();
        assert!(matches!(err, StatementError::EmptyResult));
        assert!(err.is_warning());

        let none = assemble(Vec::<Table>::new(), &NarrationFilter::default()).unwrap_err();
        assert!(matches!(none, StatementError::EmptyResult));
    }

    #[test]
    fn test_configured_keywords_and_paybill_code() {
        let config = ExtractConfig {
            excluded_keywords: vec!["reversal".into(), "  ".into()],
            paybill_code: "11111".into(),
            ..Default::default()
        };
        let filter = NarrationFilter::new(
            config.excluded_keywords.as_slice(),
            NarrationParser::new(config.paybill_code.clone()),
        )
        .unwrap();
        assert!(filter.is_excluded("CHQ REVERSAL"));
        assert!(!filter.is_excluded("mobile wallet"));
        assert_eq!(filter.clean("PB 11111~x y"), "PB 11111~x y");

        let keep_all = NarrationFilter::new::<&str>(&[][..], NarrationParser::default()).unwrap();
        assert!(!keep_all.is_excluded("MAINT FEE"));
    }

    struct FixedDetector(Vec<Vec<String>>);

    impl TableDetector for FixedDetector {
        fn detect(&self, page: &PageLayout) -> Option<Table> {
            Some(Table::new(page.number, self.0.clone()))
        }
    }

    #[test]
    fn test_custom_detector_plugs_in() {
        let extractor = TableExtractor::new(
            FixedDetector(vec![vec!["Narration".into()], vec!["A~ZED".into()]]),
            NarrationFilter::default(),
        );
        // detectors only ever see parsed pages, so bad bytes still fail first
        assert!(matches!(
            extractor.extract(b"%PDF-broken", None),
            Err(StatementError::Pdf(_))
        ));

        let page = PageLayout::default();
        let raw = assemble(extractor.detector.detect(&page), &extractor.filter).unwrap();
        assert_eq!(raw.rows()[0].get(NARRATION), Some("Zed"));
    }
}
