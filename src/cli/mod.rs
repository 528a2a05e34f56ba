use crate::services::{Aggregator, DashboardLoader};
use crate::types::DashboardData;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// QC reasons shown before the long tail is cut off
const QC_REASON_LIMIT: usize = 15;

/// Origins/destinations shown in the lane report
const LANE_TOP_LIMIT: usize = 10;

/// Accounts shown in the financial report
const ACCOUNT_TOP_LIMIT: usize = 10;

/// TMS workbook KPI reports
#[derive(Parser)]
#[command(name = "tmsdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline KPIs across all datasets
    Overview {
        /// TMS export workbook (xlsx/xls/ods)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Volume by service type and country
    Volume {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// On-time performance analysis
    Otp {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Revenue, cost and margin analysis
    Financial {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Origin-destination lane network
    Lanes {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Overview { file, json } => report_overview(&load(&file)?, json),
            Commands::Volume { file, json } => report_volume(&load(&file)?, json),
            Commands::Otp { file, json } => report_otp(&load(&file)?, json),
            Commands::Financial { file, json } => report_financial(&load(&file)?, json),
            Commands::Lanes { file, json } => report_lanes(&load(&file)?, json),
        }
    }
}

/// Whole-file load failure is the only user-visible error; everything finer
/// shows up as an absent section in the report.
fn load(path: &Path) -> anyhow::Result<Arc<DashboardData>> {
    let mut loader = DashboardLoader::new();
    loader
        .load_path(path)
        .with_context(|| format!("failed to load workbook {}", path.display()))
}

fn report_overview(data: &DashboardData, json: bool) -> anyhow::Result<()> {
    let summary = Aggregator::overview(data);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Overview");
    println!(
        "  Volume       {:>12.0} pieces ({} services, {} countries)",
        summary.total_pieces, summary.service_types, summary.countries
    );
    match summary.otp_rate {
        Some(rate) => println!(
            "  OTP rate     {:>11.1}% over {} orders",
            rate, summary.total_orders
        ),
        None => println!("  OTP rate     no OTP data in workbook"),
    }
    println!("  Revenue      {:>12.2}", summary.total_revenue);
    println!("  Cost         {:>12.2}", summary.total_cost);
    println!("  Profit       {:>12.2}", summary.profit);
    match summary.margin_percent {
        Some(margin) => println!("  Margin       {:>11.1}%", margin),
        None => println!("  Margin       undefined (no revenue)"),
    }
    println!("  Transactions {:>12}", summary.transactions);
    Ok(())
}

fn report_volume(data: &DashboardData, json: bool) -> anyhow::Result<()> {
    if json {
        let out = json!({
            "service_volumes": data.service_volumes,
            "country_volumes": data.country_volumes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match data.service_volumes.as_ref().filter(|m| !m.is_empty()) {
        Some(volumes) => {
            let total: f64 = volumes.values().sum();
            println!("Volume by service type");
            for (code, count) in volumes {
                println!(
                    "  {:<4} {:>10.0}  {:>5.1}%",
                    code,
                    count,
                    count / total * 100.0
                );
            }
        }
        None => println!("no service volume data in workbook"),
    }

    match data.country_volumes.as_ref().filter(|m| !m.is_empty()) {
        Some(volumes) => {
            let total: f64 = volumes.values().sum();
            println!("Volume by country");
            for (code, count) in volumes {
                println!(
                    "  {:<4} {:>10.0}  {:>5.1}%",
                    code,
                    count,
                    count / total * 100.0
                );
            }
        }
        None => println!("no country volume data in workbook"),
    }
    Ok(())
}

fn report_otp(data: &DashboardData, json: bool) -> anyhow::Result<()> {
    let records = match data.otp.as_deref() {
        Some(r) => r,
        None => {
            if json {
                println!("{}", json!({ "otp": null }));
            } else {
                println!("no OTP data in workbook");
            }
            return Ok(());
        }
    };

    let summary = Aggregator::otp_summary(records);
    let statuses = Aggregator::status_breakdown(records);
    let qc = Aggregator::qc_breakdown(records, QC_REASON_LIMIT);
    let time_dist = Aggregator::delivery_time_distribution(records);
    let time_stats = Aggregator::delivery_time_stats(records);

    if json {
        let out = json!({
            "summary": summary,
            "status_breakdown": statuses,
            "qc_breakdown": qc,
            "delivery_time_distribution": time_dist,
            "delivery_time_stats": time_stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("On-time performance");
    println!("  Orders       {:>8}", summary.total_orders);
    println!("  On time      {:>8}", summary.on_time);
    println!("  Late         {:>8}", summary.late);
    println!("  OTP rate     {:>7.1}%", summary.otp_rate);

    if !statuses.is_empty() {
        println!("Status breakdown");
        for (status, count) in &statuses {
            println!("  {:<24} {:>8}", status, count);
        }
    }

    if !qc.is_empty() {
        println!("QC reasons");
        for (reason, count) in &qc {
            println!("  {:<24} {:>8}", reason, count);
        }
    }

    if let Some(stats) = time_stats {
        println!("Delivery time distribution");
        for (band, count) in &time_dist {
            println!("  {:<14} {:>8}", band, count);
        }
        println!("Delivery time difference (days)");
        println!("  Mean    {:>8.2}", stats.mean);
        println!("  Median  {:>8.2}", stats.median);
        match stats.std_dev {
            Some(std) => println!("  Std dev {:>8.2}", std),
            None => println!("  Std dev      n/a"),
        }
        println!("  Min     {:>8.2}", stats.min);
        println!("  Max     {:>8.2}", stats.max);
    }
    Ok(())
}

fn report_financial(data: &DashboardData, json: bool) -> anyhow::Result<()> {
    let records = match data.cost_sales.as_deref() {
        Some(r) => r,
        None => {
            if json {
                println!("{}", json!({ "cost_sales": null }));
            } else {
                println!("no cost/sales data in workbook");
            }
            return Ok(());
        }
    };

    let by_country = Aggregator::financials_by_country(records);
    let by_account = Aggregator::financials_by_account(records);
    let breakdown = Aggregator::cost_breakdown(records);
    let margins = Aggregator::margin_distribution(records);

    if json {
        let out = json!({
            "by_country": by_country,
            "by_account": by_account,
            "cost_breakdown": breakdown,
            "margin_distribution": margins,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Financial performance by country");
    println!(
        "  {:<8} {:>6} {:>12} {:>12} {:>12} {:>8}",
        "Country", "Orders", "Revenue", "Cost", "Profit", "Margin"
    );
    for group in &by_country {
        let margin = group
            .margin
            .map(|m| format!("{:>7.1}%", m * 100.0))
            .unwrap_or_else(|| "     n/a".to_string());
        println!(
            "  {:<8} {:>6} {:>12.2} {:>12.2} {:>12.2} {}",
            group.key, group.orders, group.revenue, group.cost, group.profit, margin
        );
    }

    println!("Top accounts by revenue");
    for group in by_account.iter().take(ACCOUNT_TOP_LIMIT) {
        let name = group.label.as_deref().unwrap_or(group.key.as_str());
        println!(
            "  {:<28} {:>6} {:>12.2} {:>12.2}",
            name, group.orders, group.revenue, group.profit
        );
    }

    let components = breakdown.components();
    if !components.is_empty() {
        println!("Cost components");
        for (name, total) in components {
            println!("  {:<10} {:>12.2}", name, total);
        }
    }

    println!("Margin distribution");
    for band in &margins {
        println!("  {:<8} {:>8}", band.band, band.count);
    }
    Ok(())
}

fn report_lanes(data: &DashboardData, json: bool) -> anyhow::Result<()> {
    let matrix = match data.lanes.as_ref() {
        Some(m) => m,
        None => {
            if json {
                println!("{}", json!({ "lanes": null }));
            } else {
                println!("no lane data in workbook");
            }
            return Ok(());
        }
    };

    let totals = Aggregator::lane_totals(matrix);

    if json {
        let out = json!({
            "matrix": matrix,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Lane network");
    println!("  Total shipments {:>10.0}", totals.total_shipments);
    println!("  Active lanes    {:>10}", totals.active_lanes);
    println!("  Origins         {:>10}", matrix.origins.len());
    println!("  Destinations    {:>10}", matrix.destinations.len());
    if totals.active_lanes > 0 {
        println!(
            "  Avg per lane    {:>10.1}",
            totals.total_shipments / totals.active_lanes as f64
        );
    }

    println!("Top origins");
    for (origin, total) in totals
        .origin_totals
        .iter()
        .filter(|(_, t)| *t > 0.0)
        .take(LANE_TOP_LIMIT)
    {
        println!("  {:<4} {:>10.0}", origin, total);
    }

    println!("Top destinations");
    for (dest, total) in totals
        .destination_totals
        .iter()
        .filter(|(_, t)| *t > 0.0)
        .take(LANE_TOP_LIMIT)
    {
        println!("  {:<4} {:>10.0}", dest, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_overview() {
        let cli = Cli::try_parse_from(["tmsdash", "overview", "report.xlsx"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Overview { json: false, .. }
        ));
    }

    #[test]
    fn test_cli_parse_json_flag() {
        let cli = Cli::try_parse_from(["tmsdash", "otp", "report.xlsx", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Otp { json: true, .. }));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["tmsdash"]).is_err());
    }

    #[test]
    fn test_cli_requires_file_argument() {
        assert!(Cli::try_parse_from(["tmsdash", "financial"]).is_err());
    }

    #[test]
    fn test_missing_file_surfaces_single_error() {
        let cli = Cli::try_parse_from(["tmsdash", "overview", "/nonexistent/report.xlsx"]).unwrap();
        let err = cli.run().unwrap_err();
        assert!(err.to_string().contains("failed to load workbook"));
    }
}
