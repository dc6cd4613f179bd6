//! Raw tabular input and cleanup steps
//!
//! The schedule sheet is a grid with title rows above the real header and
//! merged cells that export as blanks. [`RawTable`] holds that grid as-is;
//! [`RawTable::promote_header`] turns it into a [`LabeledTable`] on which the
//! repair steps (forward fill, incomplete-column drop, truncation) run.

use crate::{Error, Result};

/// Rectangular grid of optional text cells
///
/// Empty and whitespace-only cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build from rows of cell text, padding short rows with missing cells
    pub fn new<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<C>>,
        C: Into<Option<String>>,
    {
        let mut rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| normalize_cell(c.into())).collect())
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, None);
        }

        Self { rows }
    }

    /// Build from string rows, treating empty strings as missing
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|s| Some(s.into())).collect::<Vec<_>>()),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Use row `header_row` (0-based) as column names
    ///
    /// The header row and every row above it are discarded. Missing header
    /// cells are named `Unnamed: <index>`; names are trimmed.
    pub fn promote_header(self, header_row: usize) -> Result<LabeledTable> {
        if header_row >= self.rows.len() {
            return Err(Error::ScheduleFormat(format!(
                "Header row {} is beyond the table ({} rows)",
                header_row,
                self.rows.len()
            )));
        }

        let mut rows = self.rows;
        let body = rows.split_off(header_row + 1);
        let header = rows.pop().unwrap_or_default();

        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Some(name) => name.trim().to_string(),
                None => format!("Unnamed: {}", i),
            })
            .collect();

        Ok(LabeledTable {
            columns,
            rows: body,
        })
    }
}

fn normalize_cell(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

/// Table with named columns, produced by header promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl LabeledTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column named `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Propagate the last present value down each column
    ///
    /// Repairs merged cells, which export as a value followed by blanks.
    /// Leading blanks stay missing.
    pub fn forward_fill(&mut self) {
        let mut last: Vec<Option<String>> = vec![None; self.columns.len()];

        for row in &mut self.rows {
            for (cell, carried) in row.iter_mut().zip(last.iter_mut()) {
                if cell.is_some() {
                    *carried = cell.clone();
                } else {
                    *cell = carried.clone();
                }
            }
        }
    }

    /// Remove every column that still has a missing cell
    ///
    /// Returns the names of the dropped columns.
    pub fn drop_incomplete_columns(&mut self) -> Vec<String> {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|i| self.rows.iter().all(|row| row[i].is_some()))
            .collect();

        let dropped = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(name, _)| name.clone())
            .collect();

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| retain_by_mask(row, &keep))
            .collect();

        dropped
    }

    /// Keep at most `max_rows` rows, returning how many were discarded
    pub fn truncate(&mut self, max_rows: usize) -> usize {
        let discarded = self.rows.len().saturating_sub(max_rows);
        self.rows.truncate(max_rows);
        discarded
    }

    /// Split into column names and rows whose cells are all present
    ///
    /// Missing cells (only possible when no column drop ran) become empty
    /// strings.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect();
        (self.columns, rows)
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, k)| (*k).then_some(item))
        .collect()
}
