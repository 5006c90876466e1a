use serde::{Deserialize, Serialize};

/// One run of text shown on a page, positioned in user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    /// Advance of the run from `x`, from the font's glyph widths.
    pub width: f32,
    pub text: String,
}

impl TextFragment {
    pub fn new(x: f32, y: f32, font_size: f32, width: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            font_size,
            width,
            text: text.into(),
        }
    }

    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// Positioned text of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number
    pub number: u32,
    pub fragments: Vec<TextFragment>,
}

/// A grid of cell text detected on one page. The first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(page: u32, rows: Vec<Vec<String>>) -> Self {
        Self { page, rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}
