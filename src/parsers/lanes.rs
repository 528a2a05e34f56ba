//! "Lane usage " matrix parsing

use super::{cell_number, cell_text};
use crate::types::{LaneMatrix, Sheet};

/// Parse the origin-destination matrix.
///
/// The first row carries the destination codes (its first cell is the axis
/// label); body rows carry an origin code followed by per-destination
/// counts. Missing or non-numeric cells mean no traffic on that lane.
/// Columns without a header label can't be addressed downstream and are
/// dropped together with their cells.
pub fn parse_lanes(sheet: &Sheet) -> LaneMatrix {
    let header = match sheet.first() {
        Some(h) => h,
        None => return LaneMatrix::default(),
    };

    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, c)| cell_text(c).map(|label| (i, label)))
        .collect();
    if columns.is_empty() {
        return LaneMatrix::default();
    }

    let destinations: Vec<String> = columns.iter().map(|(_, l)| l.clone()).collect();
    let mut origins = Vec::new();
    let mut counts = Vec::new();

    for row in sheet.iter().skip(1) {
        let origin = match row.first().and_then(cell_text) {
            Some(o) => o,
            None => continue,
        };
        let lane_counts: Vec<f64> = columns
            .iter()
            .map(|(i, _)| row.get(*i).and_then(cell_number).unwrap_or(0.0))
            .collect();
        origins.push(origin);
        counts.push(lane_counts);
    }

    LaneMatrix {
        origins,
        destinations,
        counts,
    }
}
