//! Terminal previews and CSV output for the extract and aggregate commands.

use anyhow::{Context, Result};
use paybill_core::records::{AMOUNT, MEMBER};
use paybill_core::{AggregateRow, RecordSet, TransactionRecord};
use paybill_sheets::{write_aggregates_csv, write_transactions_csv};
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

/// Left-aligned text table with a dashed rule under the header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{:<w$}", cells.get(i).map(String::as_str).unwrap_or(""), w = *w))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    for row in rows {
        out.push('\n');
        out.push_str(&line(row));
    }
    out
}

fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows).context("serialize preview")?);
    Ok(())
}

pub fn preview_transactions(set: &RecordSet<TransactionRecord>, limit: usize, json: bool) -> Result<()> {
    let shown = &set.rows()[..limit.min(set.len())];
    if json {
        return print_json(shown);
    }

    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|r| set.columns().iter().map(|c| r.field(c).unwrap_or_default()).collect())
        .collect();
    println!("{}", render_table(set.columns(), &rows));
    if set.len() > shown.len() {
        println!("... {} more rows", set.len() - shown.len());
    }
    Ok(())
}

pub fn preview_aggregates(set: &RecordSet<AggregateRow>, limit: usize, json: bool) -> Result<()> {
    let shown = &set.rows()[..limit.min(set.len())];
    if json {
        return print_json(shown);
    }

    let headers = [MEMBER.to_string(), AMOUNT.to_string()];
    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|r| vec![r.member.clone(), format!("{:.2}", r.amount)])
        .collect();
    println!("{}", render_table(&headers, &rows));
    if set.len() > shown.len() {
        println!("... {} more members", set.len() - shown.len());
    }
    println!("\nTotal: {:.2}", set.total_amount());
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("create {}", path.display()))
}

pub fn save_transactions(set: &RecordSet<TransactionRecord>, path: &Path) -> Result<()> {
    write_transactions_csv(set, create(path)?).with_context(|| format!("write {}", path.display()))
}

pub fn save_aggregates(set: &RecordSet<AggregateRow>, path: &Path) -> Result<()> {
    write_aggregates_csv(set, create(path)?).with_context(|| format!("write {}", path.display()))
}
