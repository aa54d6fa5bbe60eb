//! Tabular input: an ordered sequence of named columns with optional cells.
//!
//! This is the boundary type between raw uploads and graph construction.
//! Blank or whitespace-only cells count as missing.

use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// A raw edge-list table: ordered named columns, row-major cells.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Read a table from CSV bytes. The first record is the header row.
    /// Ragged rows are tolerated; short rows read as missing cells.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<Option<String>> = record
                .iter()
                .map(|cell| {
                    let trimmed = cell.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv(file)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column), None when missing or out of range.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)?
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_basic() {
        let data = "Source,Target\nA,B\nB,C\n";
        let table = Table::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["Source".to_string(), "Target".to_string()]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some("A"));
        assert_eq!(table.cell(1, 1), Some("C"));
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let data = "Source,Target\nA,\n ,B\n";
        let table = Table::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 0), None);
        assert_eq!(table.cell(1, 1), Some("B"));
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let data = "Source,Target,Weight\nA,B\nC,D,3\n";
        let table = Table::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 2), Some("3"));
    }

    #[test]
    fn test_out_of_range_cell() {
        let table = Table::new(vec!["a".to_string()], vec![vec![Some("x".to_string())]]);
        assert_eq!(table.cell(5, 0), None);
        assert_eq!(table.cell(0, 5), None);
    }

    #[test]
    fn test_headers_trimmed() {
        let data = " Source , Target \nA,B\n";
        let table = Table::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.columns()[0], "Source");
        assert_eq!(table.columns()[1], "Target");
    }
}
