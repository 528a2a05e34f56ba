//! Data model for the TMS dashboard datasets

use calamine::Data;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// A raw sheet: 2-D grid of cells with original types preserved
/// (numbers stay numeric, blanks stay `Data::Empty`).
pub type Sheet = Vec<Vec<Data>>;

/// Volume totals keyed by service-type or country code.
pub type VolumeMap = BTreeMap<String, f64>;

/// An ordered mapping from sheet name to raw contents, read once per upload.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Sheet)>,
}

impl Workbook {
    pub fn new(sheets: Vec<(String, Sheet)>) -> Self {
        Self { sheets }
    }

    /// Look up a sheet by exact name. "Lane usage " carries a trailing
    /// space in the source export, so no trimming happens here.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// One row of the "OTP POD" sheet: a single shipment with its quoted and
/// actual delivery times. Rows without an order id are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpRecord {
    pub order_id: String,
    /// Quoted delivery time (QDT)
    pub qdt: Option<NaiveDateTime>,
    /// Proof of delivery timestamp (POD)
    pub pod: Option<NaiveDateTime>,
    /// Signed difference between POD and QDT, in days
    pub time_diff_days: Option<f64>,
    /// "ON TIME", "LATE", or free text
    pub status: Option<String>,
    /// Delay root cause, only present in exports that carry the QC column
    pub qc_reason: Option<String>,
}

/// One row of the "cost sales" sheet: a single financial transaction.
/// Column identity is positional; fields past the sheet's actual column
/// count stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CostRecord {
    pub order_date: Option<NaiveDateTime>,
    pub account: Option<String>,
    pub account_name: Option<String>,
    pub office: Option<String>,
    pub order_number: Option<String>,
    pub pickup_cost: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub manual_cost: Option<f64>,
    pub delivery_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub net_revenue: Option<f64>,
    pub currency: Option<String>,
    pub diff: Option<f64>,
    pub gross_percent: Option<f64>,
    pub invoice_number: Option<String>,
    pub total_amount: Option<f64>,
    pub status: Option<String>,
    pub pickup_country: Option<String>,
}

/// Origin-destination shipment counts. `counts[i][j]` is the traffic from
/// `origins[i]` to `destinations[j]`; zero means no traffic on that lane.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct LaneMatrix {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub counts: Vec<Vec<f64>>,
}

impl LaneMatrix {
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty() || self.destinations.is_empty()
    }
}

/// The normalized dataset mapping produced from one workbook. Each field is
/// `None` when its sheet is absent from the upload; absence is never an error.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    /// "AMS RAW DATA" passed through untouched
    pub raw_data: Option<Sheet>,
    /// "OTP POD"
    pub otp: Option<Vec<OtpRecord>>,
    /// Service-type piece counts from "Volume per SVC"
    pub service_volumes: Option<VolumeMap>,
    /// Country shipment counts from "Volume per SVC"
    pub country_volumes: Option<VolumeMap>,
    /// "Lane usage " (trailing space in the source export)
    pub lanes: Option<LaneMatrix>,
    /// "cost sales"
    pub cost_sales: Option<Vec<CostRecord>>,
}

impl DashboardData {
    /// True when no recognized sheet produced any dataset.
    pub fn is_empty(&self) -> bool {
        self.raw_data.is_none()
            && self.otp.is_none()
            && self.service_volumes.is_none()
            && self.country_volumes.is_none()
            && self.lanes.is_none()
            && self.cost_sales.is_none()
    }
}

/// On-time performance rollup over the OTP dataset
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct OtpSummary {
    /// Orders with a non-null status
    pub total_orders: u64,
    pub on_time: u64,
    pub late: u64,
    /// Percentage, 0.0 when there are no orders
    pub otp_rate: f64,
}

/// Mean/median/spread of the signed delivery time difference, in days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryTimeStats {
    pub count: u64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` with fewer than two observations
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// One group row of a financial aggregation (by country or by account)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFinancials {
    pub key: String,
    /// Display name where the key is an id (account grouping)
    pub label: Option<String>,
    pub orders: u64,
    pub revenue: f64,
    pub cost: f64,
    /// revenue - cost, derived after the reductions
    pub profit: f64,
    /// Mean of the per-row gross percent, nulls excluded
    pub mean_gross_percent: Option<f64>,
    /// profit / revenue; undefined when revenue is not positive
    pub margin: Option<f64>,
}

/// Sums of the four cost components
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CostBreakdown {
    pub pickup: f64,
    pub shipping: f64,
    pub manual: f64,
    pub delivery: f64,
}

impl CostBreakdown {
    /// Non-zero components in display order.
    pub fn components(&self) -> Vec<(&'static str, f64)> {
        [
            ("Pickup", self.pickup),
            ("Shipping", self.shipping),
            ("Manual", self.manual),
            ("Delivery", self.delivery),
        ]
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .collect()
    }
}

/// Count of transactions per gross-percent band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginBand {
    pub band: &'static str,
    pub count: u64,
}

/// Row/column rollups of the lane matrix
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct LaneTotals {
    /// Outbound traffic per origin, descending
    pub origin_totals: Vec<(String, f64)>,
    /// Inbound traffic per destination, descending
    pub destination_totals: Vec<(String, f64)>,
    pub total_shipments: f64,
    /// Lanes with non-zero traffic
    pub active_lanes: u64,
}

/// Headline KPIs across whichever datasets the workbook carried
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct OverviewSummary {
    pub total_pieces: f64,
    pub service_types: usize,
    pub countries: usize,
    pub total_orders: u64,
    pub otp_rate: Option<f64>,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub margin_percent: Option<f64>,
    pub transactions: u64,
}
