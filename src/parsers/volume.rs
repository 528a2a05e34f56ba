//! "Volume per SVC" heuristic extraction
//!
//! The volume sheet mixes a service-type pivot section with a country
//! matrix section and has no boundary marker between them. Rows are
//! classified one at a time by membership of the first cell in the two
//! constant code sets; everything unrecognized is skipped, never an error.

use super::{cell_number, cell_text, parse_number};
use crate::types::{Sheet, VolumeMap};
use calamine::Data;

/// Service-type codes of the TMS export.
pub const SERVICE_TYPES: [&str; 8] = ["CTX", "CX", "EF", "EGD", "FF", "RGD", "ROU", "SF"];

/// Country codes of the TMS export. Disjoint from `SERVICE_TYPES`; the
/// classifier relies on a key never matching both sets.
pub const COUNTRIES: [&str; 14] = [
    "AT", "AU", "BE", "DE", "DK", "ES", "FR", "GB", "IT", "N1", "NL", "NZ", "SE", "US",
];

/// Classification of one row of the volume sheet
#[derive(Debug, Clone, PartialEq)]
pub enum RowClass {
    /// Service pivot row: code and the piece count from the second cell
    Service(String, f64),
    /// Country matrix row: code and the sum of its positive numeric cells
    Country(String, f64),
    /// Blank, subtotal, or otherwise unrecognized row
    Skip,
}

/// Classify one row by its trimmed first cell.
///
/// Service rows take the second cell as the piece count and accept
/// numeric-looking text. Country rows sum only genuinely numeric, strictly
/// positive cells across the rest of the row and are skipped when that sum
/// is zero. Rows whose first two cells aren't both populated are skipped
/// outright.
pub fn classify_volume_row(row: &[Data]) -> RowClass {
    if row.len() < 2 {
        return RowClass::Skip;
    }
    let key = match cell_text(&row[0]) {
        Some(k) => k,
        None => return RowClass::Skip,
    };
    if matches!(row[1], Data::Empty | Data::Error(_)) {
        return RowClass::Skip;
    }

    if SERVICE_TYPES.contains(&key.as_str()) {
        match parse_number(&row[1]) {
            Some(value) => RowClass::Service(key, value),
            None => RowClass::Skip,
        }
    } else if COUNTRIES.contains(&key.as_str()) {
        let total: f64 = row[1..]
            .iter()
            .filter_map(cell_number)
            .filter(|v| *v > 0.0)
            .sum();
        if total > 0.0 {
            RowClass::Country(key, total)
        } else {
            RowClass::Skip
        }
    } else {
        RowClass::Skip
    }
}

/// Fold the per-row classifications into the two volume maps. The first
/// sheet row is the export's header; a duplicate code later in the sheet
/// overwrites the earlier value.
pub fn extract_volumes(sheet: &Sheet) -> (VolumeMap, VolumeMap) {
    let mut services = VolumeMap::new();
    let mut countries = VolumeMap::new();

    for row in sheet.iter().skip(1) {
        match classify_volume_row(row) {
            RowClass::Service(code, value) => {
                services.insert(code, value);
            }
            RowClass::Country(code, value) => {
                countries.insert(code, value);
            }
            RowClass::Skip => {}
        }
    }

    (services, countries)
}
