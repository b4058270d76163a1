//! Header-driven spreadsheet tables and the sales rows read from them

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::error::{RobotError, RobotResult};

pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const SALES_TARGET: &str = "Sales Target";
pub const SALES: &str = "Sales";

/// Read one worksheet as a table
pub trait SpreadsheetReader: Send + Sync {
    fn read_table(&self, path: &Path, sheet: &str) -> RobotResult<Table>;
}

/// One worksheet: the first row as column names, the rest as records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Split raw rows into headers and records.
    pub fn from_rows(source: impl Into<PathBuf>, mut rows: Vec<Vec<String>>) -> Self {
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect()
        };
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> RobotResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RobotError::Spreadsheet {
                path: self.source.clone(),
                reason: format!("missing column '{}'", name),
            })
    }

    /// Consume the table as a one-pass sequence of sales rows in file order.
    ///
    /// Missing columns surface as the first item; blank rows are skipped.
    pub fn into_sales_rows(self) -> impl Iterator<Item = RobotResult<SalesRow>> {
        let columns = [FIRST_NAME, LAST_NAME, SALES_TARGET, SALES]
            .iter()
            .map(|name| self.column(name))
            .collect::<RobotResult<Vec<usize>>>();

        let (header_error, columns) = match columns {
            Ok(columns) => (None, columns),
            Err(e) => (Some(Err(e)), Vec::new()),
        };
        let rows = if header_error.is_some() { Vec::new() } else { self.rows };

        header_error.into_iter().chain(
            rows.into_iter()
                .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
                .map(move |row| {
                    let cell = |i: usize| row.get(columns[i]).cloned().unwrap_or_default();
                    Ok(SalesRow {
                        first_name: cell(0),
                        last_name: cell(1),
                        sales_target: cell(2),
                        sales: cell(3),
                    })
                }),
        )
    }
}

/// One sales representative's result, as typed into the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRow {
    pub first_name: String,
    pub last_name: String,
    pub sales_target: String,
    pub sales: String,
}

impl SalesRow {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        sales_target: impl Into<String>,
        sales: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            sales_target: sales_target.into(),
            sales: sales.into(),
        }
    }
}

/// Text for a cell as it should appear in a form field. Whole floats drop
/// their fractional part so `200.0` selects the `200` option.
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

/// calamine-backed `.xlsx` reader
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

impl SpreadsheetReader for XlsxReader {
    fn read_table(&self, path: &Path, sheet: &str) -> RobotResult<Table> {
        let spreadsheet_error = |reason: String| RobotError::Spreadsheet {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(RobotError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }

        // The workbook is dropped, and its file closed, when this block ends.
        let range = {
            let mut workbook: Xlsx<_> =
                open_workbook(path).map_err(|e| spreadsheet_error(format!("{}", e)))?;
            workbook
                .worksheet_range(sheet)
                .map_err(|e| spreadsheet_error(format!("sheet '{}': {}", sheet, e)))?
        };

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Ok(Table::from_rows(path, rows))
    }
}
