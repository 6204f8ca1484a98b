//! In-memory CSV table: load, read one text column, set result columns, save.
//!
//! All columns are kept as strings. Columns the run does not touch are
//! written back exactly as read.

use std::path::Path;

use anyhow::anyhow;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, padding or cutting every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Reads a headed CSV file. Short rows are padded with empty cells; a row
    /// with more cells than the header is an error.
    pub fn read_csv(path: &Path) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(AppError::RaggedRow {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    cells: record.len(),
                    columns: headers.len(),
                });
            }
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of `name` in row order. Empty cells come back as `""`.
    pub fn text_column(&self, name: &str) -> Result<Vec<String>, AppError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AppError::MissingColumn {
                column: name.to_string(),
                available: self.headers.clone(),
            })?;

        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Replaces an existing column in place, or appends a new one.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), AppError> {
        if values.len() != self.rows.len() {
            return Err(AppError::Internal(anyhow!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                debug!("Overwriting existing column '{}'", name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }

        Ok(())
    }

    /// Writes the table to `path` through a temporary file in the same
    /// directory, renamed into place once fully written.
    pub fn write_csv(&self, path: &Path) -> Result<(), AppError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(tmp.as_file());
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Checks the output path's directory exists, so a bad output location fails
/// before the model is called.
pub fn ensure_output_dir(path: &Path) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(AppError::Config(format!(
            "output directory '{}' does not exist",
            dir.display()
        )));
    }
    Ok(())
}
