//! Aggregations over the normalized TMS datasets
//!
//! All reductions exclude null values; derived columns (profit, margin) are
//! computed after the reductions, never per row.

use crate::types::{
    CostBreakdown, CostRecord, DashboardData, DeliveryTimeStats, GroupFinancials, LaneMatrix,
    LaneTotals, MarginBand, OtpRecord, OtpSummary, OverviewSummary,
};
use std::collections::HashMap;

/// Status text marking an on-time delivery in the export
const ON_TIME_STATUS: &str = "ON TIME";

/// Gross-percent bands, right-closed: exactly 0.0 is still a loss,
/// exactly 0.1 still lands in 0-10%.
const MARGIN_BANDS: [&str; 5] = ["Loss", "0-10%", "10-20%", "20-30%", "30%+"];
const MARGIN_EDGES: [f64; 4] = [0.0, 0.1, 0.2, 0.3];

/// Signed delivery-time-difference bands in days, right-closed: a diff of
/// exactly 0.5 still counts as on time.
const TIME_DIFF_BANDS: [&str; 6] = [
    "Early >1d",
    "Early 0.5-1d",
    "Early <0.5d",
    "On Time",
    "Late 0.5-1d",
    "Late >1d",
];
const TIME_DIFF_EDGES: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

struct FinancialAcc {
    label: Option<String>,
    orders: u64,
    revenue: f64,
    cost: f64,
    gross_sum: f64,
    gross_n: u64,
}

/// Aggregator for computing dashboard statistics
pub struct Aggregator;

impl Aggregator {
    /// Group cost/sales rows by pickup country (revenue descending).
    pub fn financials_by_country(records: &[CostRecord]) -> Vec<GroupFinancials> {
        Self::group_financials(records, |r| r.pickup_country.clone(), |_| None)
    }

    /// Group cost/sales rows by account id, carrying the first seen account
    /// name as the display label (revenue descending).
    pub fn financials_by_account(records: &[CostRecord]) -> Vec<GroupFinancials> {
        Self::group_financials(records, |r| r.account.clone(), |r| r.account_name.clone())
    }

    /// Shared groupby: sum revenue and cost, mean gross percent, then derive
    /// profit and margin from the group sums. Rows with a null key are
    /// excluded from the grouping.
    fn group_financials(
        records: &[CostRecord],
        key_fn: impl Fn(&CostRecord) -> Option<String>,
        label_fn: impl Fn(&CostRecord) -> Option<String>,
    ) -> Vec<GroupFinancials> {
        let mut groups: HashMap<String, FinancialAcc> = HashMap::new();

        for rec in records {
            let key = match key_fn(rec) {
                Some(k) => k,
                None => continue,
            };
            let acc = groups.entry(key).or_insert_with(|| FinancialAcc {
                label: None,
                orders: 0,
                revenue: 0.0,
                cost: 0.0,
                gross_sum: 0.0,
                gross_n: 0,
            });
            acc.orders += 1;
            if let Some(v) = rec.net_revenue {
                acc.revenue += v;
            }
            if let Some(v) = rec.total_cost {
                acc.cost += v;
            }
            if let Some(v) = rec.gross_percent {
                acc.gross_sum += v;
                acc.gross_n += 1;
            }
            if acc.label.is_none() {
                acc.label = label_fn(rec);
            }
        }

        let mut result: Vec<GroupFinancials> = groups
            .into_iter()
            .map(|(key, acc)| {
                let profit = acc.revenue - acc.cost;
                GroupFinancials {
                    key,
                    label: acc.label,
                    orders: acc.orders,
                    revenue: acc.revenue,
                    cost: acc.cost,
                    profit,
                    mean_gross_percent: (acc.gross_n > 0)
                        .then(|| acc.gross_sum / acc.gross_n as f64),
                    margin: (acc.revenue > 0.0).then(|| profit / acc.revenue),
                }
            })
            .collect();
        result.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then(a.key.cmp(&b.key)));
        result
    }

    /// Sums of the four cost components, nulls excluded.
    pub fn cost_breakdown(records: &[CostRecord]) -> CostBreakdown {
        CostBreakdown {
            pickup: records.iter().filter_map(|r| r.pickup_cost).sum(),
            shipping: records.iter().filter_map(|r| r.shipping_cost).sum(),
            manual: records.iter().filter_map(|r| r.manual_cost).sum(),
            delivery: records.iter().filter_map(|r| r.delivery_cost).sum(),
        }
    }

    /// Transactions per gross-percent band. All five bands are always
    /// present, zero counts included; nulls are excluded.
    pub fn margin_distribution(records: &[CostRecord]) -> Vec<MarginBand> {
        let counts = Self::band_counts(
            records.iter().filter_map(|r| r.gross_percent),
            &MARGIN_EDGES,
        );
        MARGIN_BANDS
            .iter()
            .copied()
            .zip(counts)
            .map(|(band, count)| MarginBand { band, count })
            .collect()
    }

    /// Shipments per delivery-time band, early through late. All six bands
    /// are always present; rows without a numeric diff are excluded.
    pub fn delivery_time_distribution(records: &[OtpRecord]) -> Vec<(&'static str, u64)> {
        let counts = Self::band_counts(
            records.iter().filter_map(|r| r.time_diff_days),
            &TIME_DIFF_EDGES,
        );
        TIME_DIFF_BANDS.iter().copied().zip(counts).collect()
    }

    /// Right-closed binning: a value lands in the first band whose upper
    /// edge it does not exceed; values above every edge land in the last.
    fn band_counts(values: impl Iterator<Item = f64>, edges: &[f64]) -> Vec<u64> {
        let mut counts = vec![0u64; edges.len() + 1];
        for value in values {
            let idx = edges
                .iter()
                .position(|edge| value <= *edge)
                .unwrap_or(edges.len());
            counts[idx] += 1;
        }
        counts
    }

    /// On-time performance over shipments with a non-null status.
    pub fn otp_summary(records: &[OtpRecord]) -> OtpSummary {
        let total_orders = records.iter().filter(|r| r.status.is_some()).count() as u64;
        let on_time = records
            .iter()
            .filter(|r| r.status.as_deref() == Some(ON_TIME_STATUS))
            .count() as u64;
        let otp_rate = if total_orders > 0 {
            on_time as f64 / total_orders as f64 * 100.0
        } else {
            0.0
        };

        OtpSummary {
            total_orders,
            on_time,
            late: total_orders - on_time,
            otp_rate,
        }
    }

    /// Shipment count per status value, descending.
    pub fn status_breakdown(records: &[OtpRecord]) -> Vec<(String, u64)> {
        Self::count_values(records.iter().filter_map(|r| r.status.as_deref()))
    }

    /// Shipment count per QC delay reason, descending, capped at `limit`.
    pub fn qc_breakdown(records: &[OtpRecord], limit: usize) -> Vec<(String, u64)> {
        let mut counts = Self::count_values(records.iter().filter_map(|r| r.qc_reason.as_deref()));
        counts.truncate(limit);
        counts
    }

    /// Mean/median/spread of the signed delivery time difference; `None`
    /// when no row carries one.
    pub fn delivery_time_stats(records: &[OtpRecord]) -> Option<DeliveryTimeStats> {
        let mut values: Vec<f64> = records.iter().filter_map(|r| r.time_diff_days).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };
        // Sample standard deviation, matching the source tool's statistics
        let std_dev = (n > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        });

        Some(DeliveryTimeStats {
            count: n as u64,
            mean,
            median,
            std_dev,
            min: values[0],
            max: values[n - 1],
        })
    }

    /// Row and column rollups of the lane matrix, both descending.
    pub fn lane_totals(matrix: &LaneMatrix) -> LaneTotals {
        let mut origin_totals: Vec<(String, f64)> = matrix
            .origins
            .iter()
            .zip(&matrix.counts)
            .map(|(origin, row)| (origin.clone(), row.iter().sum()))
            .collect();

        let mut destination_totals: Vec<(String, f64)> = matrix
            .destinations
            .iter()
            .enumerate()
            .map(|(j, dest)| {
                let total = matrix
                    .counts
                    .iter()
                    .map(|row| row.get(j).copied().unwrap_or(0.0))
                    .sum();
                (dest.clone(), total)
            })
            .collect();

        let total_shipments = matrix.counts.iter().flatten().sum();
        let active_lanes = matrix
            .counts
            .iter()
            .flatten()
            .filter(|v| **v > 0.0)
            .count() as u64;

        origin_totals.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        destination_totals.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        LaneTotals {
            origin_totals,
            destination_totals,
            total_shipments,
            active_lanes,
        }
    }

    /// Headline KPIs across whichever datasets the workbook carried.
    /// Absent datasets contribute zeros.
    pub fn overview(data: &DashboardData) -> OverviewSummary {
        let total_pieces = data
            .service_volumes
            .as_ref()
            .map(|m| m.values().sum())
            .unwrap_or(0.0);
        let service_types = data.service_volumes.as_ref().map_or(0, |m| m.len());
        let countries = data.country_volumes.as_ref().map_or(0, |m| m.len());

        let otp = data.otp.as_deref().map(Self::otp_summary);
        let total_orders = otp.as_ref().map_or(0, |s| s.total_orders);
        let otp_rate = otp
            .filter(|s| s.total_orders > 0)
            .map(|s| s.otp_rate);

        let (total_revenue, total_cost, transactions) = match data.cost_sales.as_deref() {
            Some(records) => (
                records.iter().filter_map(|r| r.net_revenue).sum(),
                records.iter().filter_map(|r| r.total_cost).sum(),
                records.len() as u64,
            ),
            None => (0.0, 0.0, 0),
        };
        let profit = total_revenue - total_cost;
        let margin_percent = (total_revenue > 0.0).then(|| profit / total_revenue * 100.0);

        OverviewSummary {
            total_pieces,
            service_types,
            countries,
            total_orders,
            otp_rate,
            total_revenue,
            total_cost,
            profit,
            margin_percent,
            transactions,
        }
    }

    /// Count occurrences, descending by count with ties broken by value.
    fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for value in values {
            *counts.entry(value).or_default() += 1;
        }
        let mut result: Vec<(String, u64)> = counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        result.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        result
    }
}
