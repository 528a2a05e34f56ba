//! Sheet extractors for the recognized TMS export sheets

mod cost_sales;
mod lanes;
mod otp;
mod volume;
mod workbook;

pub use cost_sales::{applied_cost_columns, parse_cost_sales, COST_SALES_COLUMNS};
pub use lanes::parse_lanes;
pub use otp::{parse_otp, select_otp_schema, OTP_SCHEMAS};
pub use volume::{classify_volume_row, extract_volumes, RowClass, COUNTRIES, SERVICE_TYPES};
pub use workbook::load_workbook;

use crate::types::{DashboardData, Sheet, Workbook};
use calamine::Data;

/// Trait for extracting one normalized dataset from its sheet
pub trait SheetExtractor: Send + Sync {
    /// Exact sheet name this extractor consumes (no trimming; "Lane usage "
    /// keeps its trailing space)
    fn sheet_name(&self) -> &str;

    /// Populate the dataset from the raw sheet. Best-effort: rows that fail
    /// coercion are skipped, never surfaced.
    fn extract(&self, sheet: &Sheet, data: &mut DashboardData);
}

struct RawDataExtractor;

impl SheetExtractor for RawDataExtractor {
    fn sheet_name(&self) -> &str {
        "AMS RAW DATA"
    }

    fn extract(&self, sheet: &Sheet, data: &mut DashboardData) {
        data.raw_data = Some(sheet.clone());
    }
}

struct OtpExtractor;

impl SheetExtractor for OtpExtractor {
    fn sheet_name(&self) -> &str {
        "OTP POD"
    }

    fn extract(&self, sheet: &Sheet, data: &mut DashboardData) {
        data.otp = Some(parse_otp(sheet));
    }
}

struct VolumeExtractor;

impl SheetExtractor for VolumeExtractor {
    fn sheet_name(&self) -> &str {
        "Volume per SVC"
    }

    fn extract(&self, sheet: &Sheet, data: &mut DashboardData) {
        let (services, countries) = extract_volumes(sheet);
        data.service_volumes = Some(services);
        data.country_volumes = Some(countries);
    }
}

struct LaneExtractor;

impl SheetExtractor for LaneExtractor {
    fn sheet_name(&self) -> &str {
        "Lane usage "
    }

    fn extract(&self, sheet: &Sheet, data: &mut DashboardData) {
        data.lanes = Some(parse_lanes(sheet));
    }
}

struct CostSalesExtractor;

impl SheetExtractor for CostSalesExtractor {
    fn sheet_name(&self) -> &str {
        "cost sales"
    }

    fn extract(&self, sheet: &Sheet, data: &mut DashboardData) {
        data.cost_sales = Some(parse_cost_sales(sheet));
    }
}

/// Registry of the recognized sheet extractors
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn SheetExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(RawDataExtractor),
                Box::new(OtpExtractor),
                Box::new(VolumeExtractor),
                Box::new(LaneExtractor),
                Box::new(CostSalesExtractor),
            ],
        }
    }

    pub fn extractors(&self) -> &[Box<dyn SheetExtractor>] {
        &self.extractors
    }

    /// Find an extractor by its sheet name
    pub fn get(&self, sheet_name: &str) -> Option<&dyn SheetExtractor> {
        self.extractors
            .iter()
            .find(|e| e.sheet_name() == sheet_name)
            .map(|e| e.as_ref())
    }

    /// Run every extractor whose sheet is present in the workbook.
    /// Absent sheets leave their dataset `None`; that is omission, not error.
    pub fn apply(&self, workbook: &Workbook, data: &mut DashboardData) {
        for extractor in &self.extractors {
            if let Some(sheet) = workbook.sheet(extractor.sheet_name()) {
                extractor.extract(sheet, data);
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed text content of a cell. Whole-number floats render without the
/// trailing ".0" so numeric order ids and account codes keep their usual form.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        _ => None,
    }
}

/// Numeric value of a genuinely numeric cell.
pub(crate) fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

/// Numeric value, also accepting numeric-looking text.
pub(crate) fn parse_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => cell_number(cell),
    }
}

/// True when every cell in the row is blank.
pub(crate) fn row_is_blank(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty))
}
