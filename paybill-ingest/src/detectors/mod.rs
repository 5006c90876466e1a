//! Page-to-table detection.
//!
//! Statement layouts differ between banks; a detector turns one page's
//! positioned text into at most one table without touching normalization.

pub mod layout_table;

pub use layout_table::{LayoutOptions, LayoutTableDetector};

use crate::types::{PageLayout, Table};

pub trait TableDetector {
    /// The table on `page`, if any. Its first row is the header.
    fn detect(&self, page: &PageLayout) -> Option<Table>;
}

impl<T: TableDetector + ?Sized> TableDetector for &T {
    fn detect(&self, page: &PageLayout) -> Option<Table> {
        (**self).detect(page)
    }
}

impl<T: TableDetector + ?Sized> TableDetector for Box<T> {
    fn detect(&self, page: &PageLayout) -> Option<Table> {
        (**self).detect(page)
    }
}
