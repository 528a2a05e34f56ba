//! Workbook container loading

use crate::types::{DashboardError, Result, Workbook};
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;

/// Read a workbook from uploaded bytes, preserving sheet order and raw cell
/// types (numbers stay numeric, blanks stay `Data::Empty`). The container
/// format (xlsx/xls/ods) is autodetected.
///
/// An unreadable container is the only failure mode here; row-level
/// anomalies are handled downstream by the extractors.
pub fn load_workbook(bytes: &[u8]) -> Result<Workbook> {
    let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DashboardError::Workbook(e.to_string()))?;

    let names = reader.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = reader
            .worksheet_range(&name)
            .map_err(|e| DashboardError::Workbook(format!("sheet '{}': {}", name, e)))?;
        let grid = range.rows().map(|r| r.to_vec()).collect();
        sheets.push((name, grid));
    }

    Ok(Workbook::new(sheets))
}
