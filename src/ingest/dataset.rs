//! Tabular dataset reader
//!
//! Any workbook `calamine` can open (xlsx, xlsm, xls, ods). The first
//! worksheet is used and its first row must carry the column headers.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};

use crate::errors::{ClassifierError, Result};
use crate::types::ProblemCodes;

pub const DESCRIPTION_COLUMN: &str = "Short Description";
pub const L1_COLUMN: &str = "Reported Problem Code L1";
pub const L2_COLUMN: &str = "Reported Problem Code L2";
pub const L3_COLUMN: &str = "Reported Problem Code L3";

/// Columns every dataset must provide
pub const REQUIRED_COLUMNS: [&str; 4] = [DESCRIPTION_COLUMN, L1_COLUMN, L2_COLUMN, L3_COLUMN];

/// One dataset row before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintRow {
    pub description: String,
    pub codes: ProblemCodes,
}

/// Where ingestion reads its rows from
pub trait ComplaintSource: Send + Sync {
    /// All rows in file order
    fn read_rows(&self) -> Result<Vec<ComplaintRow>>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Spreadsheet on disk
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    path: PathBuf,
}

impl SpreadsheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ComplaintSource for SpreadsheetSource {
    fn read_rows(&self) -> Result<Vec<ComplaintRow>> {
        read_complaints(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read every complaint row from the first worksheet of `path`
pub fn read_complaints(path: &Path) -> Result<Vec<ComplaintRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        ClassifierError::DatasetError(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ClassifierError::DatasetError(format!("{} has no worksheets", path.display())))?
        .map_err(|e| ClassifierError::DatasetError(format!("Failed to read worksheet: {}", e)))?;

    rows_from_range(&range)
}

/// Extract complaint rows from a worksheet whose first row is the header
pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<ComplaintRow>> {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => {
            return Err(ClassifierError::DatasetError(
                "worksheet is empty; expected a header row".to_string(),
            ))
        }
    };

    let mut positions = [0usize; 4];
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|cell| cell_text(cell).trim() == column)
            .ok_or_else(|| ClassifierError::DatasetError(format!("missing column '{}'", column)))?;
    }
    let [description, l1, l2, l3] = positions;

    let text_at = |row: &[Data], idx: usize| row.get(idx).map(cell_text).unwrap_or_default();

    Ok(rows
        .map(|row| ComplaintRow {
            description: text_at(row, description),
            codes: ProblemCodes::new(text_at(row, l1), text_at(row, l2), text_at(row, l3)),
        })
        .collect())
}

/// Coerce any cell to text
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[&[&str]]) -> Range<Data> {
        let rows = cells.len() as u32;
        let cols = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (rows - 1, cols - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), Data::String(value.to_string()));
            }
        }
        range
    }

    #[test]
    fn test_rows_follow_header_positions() {
        let range = sheet(&[
            &["Reported Problem Code L3", "Id", "Short Description", "Reported Problem Code L1", "Reported Problem Code L2"],
            &["Flicker", "A-1", "Screen flickers", "Hardware", "Display"],
        ]);
        let rows = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Screen flickers");
        assert_eq!(rows[0].codes, ProblemCodes::new("Hardware", "Display", "Flicker"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let range = sheet(&[&["Short Description", "Reported Problem Code L1"], &["x", "y"]]);
        let err = rows_from_range(&range).unwrap_err();
        assert!(err.to_string().contains("Reported Problem Code L2"));
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let range = sheet(&[&REQUIRED_COLUMNS]);
        assert!(rows_from_range(&range).unwrap().is_empty());
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_missing_file() {
        let source = SpreadsheetSource::new("/definitely/not/here.xlsx");
        assert!(matches!(source.read_rows(), Err(ClassifierError::DatasetError(_))));
    }
}
