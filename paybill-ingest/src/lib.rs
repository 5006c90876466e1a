//! paybill-ingest: statement PDF reading, page layout walking, pluggable table
//! detection and raw row assembly.

pub mod detectors;
pub mod extract;
pub mod layout;
pub mod pdf;
pub mod types;

pub use detectors::{LayoutOptions, LayoutTableDetector, TableDetector};
pub use extract::{DEFAULT_EXCLUDED_KEYWORDS, ExtractConfig, NarrationFilter, TableExtractor, assemble, extract};
pub use types::{PageLayout, Table, TextFragment};
