//! Positioned text runs for every page.
//!
//! Glyph decoding, font metrics and the text matrices are handled by
//! `pdf_extract`; this module only collects its positioned glyphs into
//! horizontal runs the table detectors can work with.

use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use lopdf::Document;
use paybill_core::{Result, StatementError};
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use crate::types::{PageLayout, TextFragment};

/// A gap wider than this fraction of the font size starts a new run.
const RUN_GAP: f32 = 0.15;
/// Baselines closer than this fraction of the font size belong to one run.
const BASELINE_SLACK: f32 = 0.2;

#[derive(Debug)]
struct Run {
    x: f32,
    y: f32,
    size: f32,
    text: String,
    /// Pen position after the last glyph, whitespace included.
    end: f32,
    /// Right edge of the last visible glyph.
    ink_end: f32,
}

impl Run {
    fn continues_with(&self, x: f32, y: f32, size: f32) -> bool {
        let slack = self.size.max(size);
        (y - self.y).abs() <= slack * BASELINE_SLACK
            && x >= self.end - slack * RUN_GAP
            && x - self.end <= slack * RUN_GAP
    }

    fn into_fragment(self) -> TextFragment {
        TextFragment::new(self.x, self.y, self.size, self.ink_end - self.x, self.text.trim_end())
    }
}

/// Collects the glyphs `pdf_extract` reports into `PageLayout`s.
#[derive(Debug, Default)]
pub struct FragmentCollector {
    pages: Vec<PageLayout>,
    run: Option<Run>,
}

impl FragmentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one glyph whose origin is (`x`, `y`) and which advances the pen by
    /// `advance`, all in page space.
    pub fn push_glyph(&mut self, x: f32, y: f32, size: f32, advance: f32, text: &str) {
        let blank = text.trim().is_empty();
        match self.run.as_mut() {
            Some(run) if run.continues_with(x, y, size) => {
                // unmapped glyphs decode to nothing but still advance the pen
                if !text.is_empty() {
                    run.text.push_str(if blank { " " } else { text });
                }
                run.end = x + advance;
                if !blank {
                    run.ink_end = x + advance;
                }
                return;
            }
            _ => {}
        }

        self.flush_run();
        if !blank {
            self.run = Some(Run {
                x,
                y,
                size,
                text: text.to_string(),
                end: x + advance,
                ink_end: x + advance,
            });
        }
    }

    fn flush_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        if self.pages.is_empty() {
            self.pages.push(PageLayout::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.fragments.push(run.into_fragment());
        }
    }

    pub fn finish(mut self) -> Vec<PageLayout> {
        self.flush_run();
        self.pages
    }
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.flush_run();
        self.pages.push(PageLayout {
            number: page_num,
            fragments: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_run();
        if let Some(page) = self.pages.last() {
            debug!("page {}: {} text fragments", page.number, page.fragments.len());
        }
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let x_scale = trm.m11.hypot(trm.m12);
        let y_scale = trm.m21.hypot(trm.m22);
        self.push_glyph(
            trm.m31 as f32,
            trm.m32 as f32,
            (font_size * y_scale) as f32,
            (width * font_size * x_scale) as f32,
            char,
        );
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Positioned text for every page, in document order.
///
/// `pdf_extract` links its own lopdf release, so the (already decrypted)
/// document is handed over as bytes.
pub fn page_layouts(doc: &mut Document) -> Result<Vec<PageLayout>> {
    let mut plain = Vec::new();
    doc.save_to(&mut plain)
        .map_err(|e| StatementError::Pdf(format!("could not re-serialize document: {e}")))?;
    let text_doc = pdf_extract::Document::load_mem(&plain)
        .map_err(|e| StatementError::Pdf(e.to_string()))?;

    let mut collector = FragmentCollector::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc(&text_doc, &mut collector)
    }));
    match outcome {
        Ok(Ok(())) => Ok(collector.finish()),
        Ok(Err(e)) => Err(StatementError::Pdf(e.to_string())),
        Err(_) => {
            warn!("text extraction aborted on an unsupported page construct");
            Err(StatementError::Pdf("unsupported page content".into()))
        }
    }
}
