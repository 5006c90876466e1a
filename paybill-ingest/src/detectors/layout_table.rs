//! Table detection from text positions alone (no ruling lines).
//!
//! Fragments sharing a baseline form a line and close neighbours on a line
//! form a cell. The first line with enough cells is the header; its cells
//! anchor the columns for every following line until a large vertical gap,
//! or until a lone cell turns up under a column that never wraps.

use log::debug;
use paybill_core::records::NARRATION;
use serde::{Deserialize, Serialize};

use super::TableDetector;
use crate::types::{PageLayout, Table, TextFragment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Baselines closer than this belong to the same line
    pub line_tolerance: f32,
    pub min_header_columns: usize,
    /// Fragments closer than this on one line form a single cell
    pub cell_gap: f32,
    /// A larger vertical distance between lines ends the table
    pub max_row_gap: f32,
    /// Fold single-cell lines into the row above (wrapped narrations)
    pub merge_wrapped_lines: bool,
    /// Header names whose text may wrap onto a line of its own
    pub wrap_columns: Vec<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            min_header_columns: 3,
            cell_gap: 6.0,
            max_row_gap: 60.0,
            merge_wrapped_lines: true,
            wrap_columns: vec![NARRATION.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    start: f32,
    end: f32,
    text: String,
}

#[derive(Debug, Clone)]
struct Line {
    y: f32,
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutTableDetector {
    pub options: LayoutOptions,
}

impl LayoutTableDetector {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    fn wraps(&self, header: &str) -> bool {
        let header = header.trim();
        self.options.wrap_columns.iter().any(|c| c.trim().eq_ignore_ascii_case(header))
    }

    fn lines(&self, fragments: &[TextFragment]) -> Vec<Line> {
        let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut grouped: Vec<(f32, Vec<&TextFragment>)> = Vec::new();
        for frag in sorted {
            let tolerance = self.options.line_tolerance;
            let same_line = grouped.last().is_some_and(|(y, _)| (y - frag.y).abs() <= tolerance);
            match grouped.last_mut() {
                Some((_, members)) if same_line => members.push(frag),
                _ => grouped.push((frag.y, vec![frag])),
            }
        }

        grouped
            .into_iter()
            .map(|(y, mut members)| {
                members.sort_by(|a, b| a.x.total_cmp(&b.x));
                Line {
                    y,
                    cells: self.cells(&members),
                }
            })
            .collect()
    }

    fn cells(&self, members: &[&TextFragment]) -> Vec<Cell> {
        let mut cells: Vec<Cell> = Vec::new();
        for frag in members {
            let gap = cells.last().map(|c| frag.x - c.end);
            match cells.last_mut() {
                Some(cell) if gap.is_some_and(|g| g <= self.options.cell_gap) => {
                    // glyph-by-glyph output sits flush; real word gaps do not
                    if gap.is_some_and(|g| g > frag.font_size * 0.15) {
                        cell.text.push(' ');
                    }
                    cell.text.push_str(&frag.text);
                    cell.end = cell.end.max(frag.end_x());
                }
                _ => cells.push(Cell {
                    start: frag.x,
                    end: frag.end_x(),
                    text: frag.text.clone(),
                }),
            }
        }
        cells
    }
}

/// Header column with the widest horizontal overlap, else the nearest centre.
fn column_for(cell: &Cell, header: &[Cell]) -> usize {
    let mut best: Option<(usize, f32)> = None;
    for (i, h) in header.iter().enumerate() {
        let overlap = cell.end.min(h.end) - cell.start.max(h.start);
        if overlap > 0.0 && best.is_none_or(|(_, o)| overlap > o) {
            best = Some((i, overlap));
        }
    }
    if let Some((i, _)) = best {
        return i;
    }

    let centre = |c: &Cell| (c.start + c.end) / 2.0;
    header
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (centre(a) - centre(cell))
                .abs()
                .total_cmp(&(centre(b) - centre(cell)).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn append(dst: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !dst.is_empty() {
        dst.push(' ');
    }
    dst.push_str(text);
}

impl TableDetector for LayoutTableDetector {
    fn detect(&self, page: &PageLayout) -> Option<Table> {
        let lines = self.lines(&page.fragments);
        let min_columns = self.options.min_header_columns.max(1);
        let header_idx = lines.iter().position(|l| l.cells.len() >= min_columns)?;
        let header = &lines[header_idx];

        let mut rows: Vec<Vec<String>> = vec![header.cells.iter().map(|c| c.text.clone()).collect()];
        let mut prev_y = header.y;

        for line in &lines[header_idx + 1..] {
            if prev_y - line.y > self.options.max_row_gap {
                break;
            }
            prev_y = line.y;

            let mut row = vec![String::new(); header.cells.len()];
            for cell in &line.cells {
                append(&mut row[column_for(cell, &header.cells)], &cell.text);
            }

            if let [lone] = line.cells.as_slice() {
                let column = column_for(lone, &header.cells);
                if !self.wraps(&header.cells[column].text) {
                    debug!("page {}: '{}' ends the table", page.number, lone.text);
                    break;
                }
                if self.options.merge_wrapped_lines && rows.len() > 1 {
                    if let Some(last) = rows.last_mut() {
                        append(&mut last[column], &lone.text);
                    }
                    continue;
                }
            }
            rows.push(row);
        }

        Some(Table::new(page.number, rows))
    }
}
