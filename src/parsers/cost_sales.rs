//! "cost sales" sheet normalization

use super::{cell_text, parse_number, row_is_blank};
use crate::services::normalizer::normalize_date_cell;
use crate::types::{CostRecord, Sheet};

/// Positional reference list for the cost/sales sheet. The Nth raw column
/// always means the Nth name here; shorter export revisions simply stop
/// earlier in the list.
pub const COST_SALES_COLUMNS: [&str; 18] = [
    "order_date",
    "account",
    "account_name",
    "office",
    "order_num",
    "pu_cost",
    "ship_cost",
    "man_cost",
    "del_cost",
    "total_cost",
    "net_revenue",
    "currency",
    "diff",
    "gross_percent",
    "invoice_num",
    "total_amount",
    "status",
    "pu_country",
];

/// The names actually assigned for a sheet of the given width: the
/// reference list truncated, never extended.
pub fn applied_cost_columns(column_count: usize) -> &'static [&'static str] {
    &COST_SALES_COLUMNS[..column_count.min(COST_SALES_COLUMNS.len())]
}

/// Normalize the cost/sales sheet into transaction records.
///
/// The first row is the export's header and is skipped. Fields whose column
/// falls past the sheet's width stay `None`; the order-date column goes
/// through date normalization.
pub fn parse_cost_sales(sheet: &Sheet) -> Vec<CostRecord> {
    let column_count = sheet.first().map(|r| r.len()).unwrap_or(0);
    let width = applied_cost_columns(column_count).len();

    let mut records = Vec::new();
    for row in sheet.iter().skip(1) {
        if row_is_blank(row) {
            continue;
        }

        let text = |i: usize| {
            if i < width {
                row.get(i).and_then(cell_text)
            } else {
                None
            }
        };
        let num = |i: usize| {
            if i < width {
                row.get(i).and_then(parse_number)
            } else {
                None
            }
        };

        records.push(CostRecord {
            order_date: if width > 0 {
                row.first().and_then(normalize_date_cell)
            } else {
                None
            },
            account: text(1),
            account_name: text(2),
            office: text(3),
            order_number: text(4),
            pickup_cost: num(5),
            shipping_cost: num(6),
            manual_cost: num(7),
            delivery_cost: num(8),
            total_cost: num(9),
            net_revenue: num(10),
            currency: text(11),
            diff: num(12),
            gross_percent: num(13),
            invoice_number: text(14),
            total_amount: num(15),
            status: text(16),
            pickup_country: text(17),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;
    use chrono::NaiveDate;

    fn header(width: usize) -> Vec<Data> {
        (0..width)
            .map(|i| Data::String(format!("col{}", i)))
            .collect()
    }

    fn full_row(country: &str, revenue: f64, cost: f64, gross: f64) -> Vec<Data> {
        let mut row = vec![Data::Empty; 18];
        row[0] = Data::Float(45292.0);
        row[1] = Data::Float(100234.0);
        row[2] = Data::String("ACME Logistics".into());
        row[3] = Data::String("AMS".into());
        row[4] = Data::String("ORD-1".into());
        row[5] = Data::Float(10.0);
        row[6] = Data::Float(20.0);
        row[7] = Data::Float(0.0);
        row[8] = Data::Float(5.0);
        row[9] = Data::Float(cost);
        row[10] = Data::Float(revenue);
        row[11] = Data::String("EUR".into());
        row[13] = Data::Float(gross);
        row[16] = Data::String("INVOICED".into());
        row[17] = Data::String(country.into());
        row
    }

    // ========== column truncation ==========

    #[test]
    fn test_applied_columns_truncate_never_extend() {
        assert_eq!(applied_cost_columns(30).len(), 18);
        assert_eq!(applied_cost_columns(18).len(), 18);
        assert_eq!(applied_cost_columns(5).len(), 5);
        assert_eq!(applied_cost_columns(0).len(), 0);
    }

    #[test]
    fn test_applied_columns_are_a_prefix() {
        assert_eq!(
            applied_cost_columns(3),
            &["order_date", "account", "account_name"]
        );
    }

    #[test]
    fn test_short_sheet_leaves_tail_fields_null() {
        // Five columns: everything from pu_cost onward stays None
        let sheet = vec![
            header(5),
            vec![
                Data::Float(45292.0),
                Data::Float(7.0),
                Data::String("ACME".into()),
                Data::String("AMS".into()),
                Data::String("ORD-9".into()),
            ],
        ];
        let records = parse_cost_sales(&sheet);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account.as_deref(), Some("7"));
        assert_eq!(records[0].order_number.as_deref(), Some("ORD-9"));
        assert_eq!(records[0].pickup_cost, None);
        assert_eq!(records[0].net_revenue, None);
        assert_eq!(records[0].pickup_country, None);
    }

    // ========== record parsing ==========

    #[test]
    fn test_full_width_record() {
        let sheet = vec![header(18), full_row("NL", 500.0, 380.0, 0.24)];
        let records = parse_cost_sales(&sheet);
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(
            rec.order_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(rec.account.as_deref(), Some("100234"));
        assert_eq!(rec.account_name.as_deref(), Some("ACME Logistics"));
        assert_eq!(rec.net_revenue, Some(500.0));
        assert_eq!(rec.total_cost, Some(380.0));
        assert_eq!(rec.gross_percent, Some(0.24));
        assert_eq!(rec.pickup_country.as_deref(), Some("NL"));
        // Blank cells stay null
        assert_eq!(rec.diff, None);
        assert_eq!(rec.total_amount, None);
    }

    #[test]
    fn test_extra_trailing_columns_ignored() {
        let mut row = full_row("DE", 100.0, 80.0, 0.2);
        row.push(Data::String("noise".into()));
        row.push(Data::Float(42.0));
        let sheet = vec![header(20), row];
        let records = parse_cost_sales(&sheet);
        assert_eq!(records[0].pickup_country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let sheet = vec![
            header(18),
            vec![Data::Empty; 18],
            full_row("FR", 50.0, 30.0, 0.4),
        ];
        assert_eq!(parse_cost_sales(&sheet).len(), 1);
    }

    #[test]
    fn test_string_date_also_normalizes() {
        let mut row = full_row("BE", 10.0, 5.0, 0.5);
        row[0] = Data::String("2024-03-15".into());
        let sheet = vec![header(18), row];
        assert_eq!(
            parse_cost_sales(&sheet)[0].order_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn test_empty_sheet() {
        assert!(parse_cost_sales(&Vec::new()).is_empty());
    }
}
