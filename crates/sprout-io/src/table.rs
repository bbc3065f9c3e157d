//! Delimited text tables
//!
//! Writes a header row followed by data rows. A field is quoted when it
//! contains the delimiter, a double quote, or a line break; embedded quotes
//! are doubled.

use crate::IoResult;
use std::fs;
use std::path::Path;

/// In-memory delimited table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedTable {
    delimiter: char,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Create a comma-separated table with the given column names.
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            delimiter: ',',
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Use a different delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Append a row. Short rows are padded with empty fields.
    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() < self.header.len() {
            row.resize(self.header.len(), String::new());
        }
        self.rows.push(row);
    }

    fn quote(&self, field: &str) -> String {
        let needs_quotes = field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r');
        if needs_quotes {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn render_row(&self, row: &[String], out: &mut String) {
        let sep = self.delimiter.to_string();
        let fields: Vec<String> = row.iter().map(|f| self.quote(f)).collect();
        out.push_str(&fields.join(&sep));
        out.push('\n');
    }

    /// Render the table as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.render_row(&self.header, &mut out);
        for row in &self.rows {
            self.render_row(row, &mut out);
        }
        out
    }

    /// Write the table to a file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> IoResult<()> {
        fs::write(path.as_ref(), self.to_text())?;
        log::debug!(
            "wrote table {} ({} rows)",
            path.as_ref().display(),
            self.rows.len()
        );
        Ok(())
    }
}
