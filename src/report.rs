//! Tabular reports built from a finished resolution.
//!
//! A report has a `success` table and a `fail` table. URL reports list up to
//! three alternatives plus the suggested match per submitted URL; keyword
//! reports list one row per ranked match. Both render as JSON or TSV.

use carbon_resolve::{Mode, ResolutionSet};
use serde::Serialize;

use crate::error::{CarbonError, Result};

/// Output format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `{"success": table, "fail": table}`.
    Json,
    /// Tab-separated tables split by a blank line.
    Tsv,
}

impl Format {
    /// Parse the `format` request parameter.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// MIME type of the rendered body.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Tsv => "text/tab-separated-values; charset=utf-8",
        }
    }
}

/// One titled table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column names.
    pub headers: Vec<String>,
    /// Cells per row, aligned with `headers`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn with_headers(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Success and fail tables for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Resolved submissions.
    pub success: Table,
    /// Submissions with the reason they failed.
    pub fail: Table,
}

const URL_ALTERNATIVES: usize = 3;

impl Report {
    /// Build the report for `set`, keeping submission order.
    pub fn from_set(set: &ResolutionSet) -> Self {
        match set.mode() {
            Mode::Url => Self::for_urls(set),
            Mode::Keyword => Self::for_keywords(set),
        }
    }

    fn for_urls(set: &ResolutionSet) -> Self {
        let mut success = Table::with_headers(&[
            "URL",
            "Alternative 1",
            "Alternative 2",
            "Alternative 3",
            "Suggested",
        ]);
        for (_, record) in set.successes() {
            let mut row = Vec::with_capacity(URL_ALTERNATIVES + 2);
            row.push(record.original.clone());
            let mut urls = record.urls();
            for _ in 0..URL_ALTERNATIVES {
                row.push(urls.next().unwrap_or_default().to_string());
            }
            row.push(record.suggested_match.clone().unwrap_or_default());
            success.rows.push(row);
        }

        Self {
            success,
            fail: fail_table(set, "URL"),
        }
    }

    fn for_keywords(set: &ResolutionSet) -> Self {
        let mut success =
            Table::with_headers(&["Keyword", "Position", "Title", "URL", "Description"]);
        for (_, record) in set.successes() {
            for (i, m) in record.matches.iter().enumerate() {
                success.rows.push(vec![
                    record.original.clone(),
                    format!("#{}", i + 1),
                    m.title.clone(),
                    m.url.clone(),
                    m.description.clone(),
                ]);
            }
        }

        Self {
            success,
            fail: fail_table(set, "Keyword"),
        }
    }

    /// Render in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`CarbonError::Report`] if JSON serialization fails.
    pub fn render(&self, format: Format) -> Result<String> {
        match format {
            Format::Json => {
                serde_json::to_string(self).map_err(|e| CarbonError::Report(e.to_string()))
            }
            Format::Tsv => Ok(self.to_tsv()),
        }
    }

    /// Both tables as TSV, separated by a blank line.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        write_tsv(&mut out, &self.success);
        out.push('\n');
        write_tsv(&mut out, &self.fail);
        out
    }
}

fn fail_table(set: &ResolutionSet, label: &str) -> Table {
    let mut fail = Table::with_headers(&[label, "Reason"]);
    for (_, record) in set.fails() {
        fail.rows
            .push(vec![record.original.clone(), record.reason.clone()]);
    }
    fail
}

fn write_tsv(out: &mut String, table: &Table) {
    write_tsv_row(out, table.headers.iter().map(String::as_str));
    for row in &table.rows {
        write_tsv_row(out, row.iter().map(String::as_str));
    }
}

fn write_tsv_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells.map(tsv_cell).collect();
    out.push_str(&line.join("\t"));
    out.push('\n');
}

// Tabs and line breaks would split the cell.
fn tsv_cell(cell: &str) -> String {
    cell.replace(['\t', '\r', '\n'], " ")
}
