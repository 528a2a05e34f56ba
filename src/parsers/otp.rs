//! "OTP POD" sheet normalization

use super::{cell_text, parse_number, row_is_blank};
use crate::services::normalizer::normalize_date_cell;
use crate::types::{OtpRecord, Sheet};

/// Positional schema versions for the OTP sheet, oldest first. Later export
/// revisions append a QC reason column after the status; column meaning is
/// prefix-compatible across versions.
pub const OTP_SCHEMAS: [&[&str]; 2] = [
    &["tms_order", "qdt", "pod_datetime", "time_diff", "status"],
    &["tms_order", "qdt", "pod_datetime", "time_diff", "status", "qc_name"],
];

/// Pick the longest schema that fits the sheet's column count. Sheets
/// narrower than every schema fall back to the shortest one; sheets wider
/// than the longest just have their trailing columns ignored.
pub fn select_otp_schema(column_count: usize) -> &'static [&'static str] {
    OTP_SCHEMAS
        .iter()
        .filter(|s| s.len() <= column_count)
        .max_by_key(|s| s.len())
        .copied()
        .unwrap_or(OTP_SCHEMAS[0])
}

/// Normalize the OTP sheet into shipment records.
///
/// The first row is the export's header and is skipped. Rows without an
/// order id are dropped; every other field degrades to `None` on coercion
/// failure.
pub fn parse_otp(sheet: &Sheet) -> Vec<OtpRecord> {
    let column_count = sheet.first().map(|r| r.len()).unwrap_or(0);
    let schema = select_otp_schema(column_count);
    let has_qc = schema.len() > 5;

    let mut records = Vec::new();
    for row in sheet.iter().skip(1) {
        if row_is_blank(row) {
            continue;
        }
        let order_id = match row.first().and_then(cell_text) {
            Some(id) => id,
            None => continue,
        };

        records.push(OtpRecord {
            order_id,
            qdt: row.get(1).and_then(normalize_date_cell),
            pod: row.get(2).and_then(normalize_date_cell),
            time_diff_days: row.get(3).and_then(parse_number),
            status: row.get(4).and_then(cell_text),
            qc_reason: if has_qc {
                row.get(5).and_then(cell_text)
            } else {
                None
            },
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

    fn otp_row(order: &str, qdt: &str, pod: &str, diff: f64, status: &str) -> Vec<Data> {
        vec![
            Data::String(order.into()),
            Data::String(qdt.into()),
            Data::String(pod.into()),
            Data::Float(diff),
            Data::String(status.into()),
        ]
    }

    // ========== schema selection ==========

    #[test]
    fn test_schema_five_columns() {
        assert_eq!(select_otp_schema(5).len(), 5);
    }

    #[test]
    fn test_schema_six_columns_adds_qc() {
        let schema = select_otp_schema(6);
        assert_eq!(schema.len(), 6);
        assert_eq!(schema[5], "qc_name");
    }

    #[test]
    fn test_schema_wide_revision_caps_at_six() {
        // The 11-column revision still maps to the 6-name schema
        assert_eq!(select_otp_schema(11).len(), 6);
    }

    #[test]
    fn test_schema_narrow_sheet_falls_back() {
        assert_eq!(select_otp_schema(3).len(), 5);
        assert_eq!(select_otp_schema(0).len(), 5);
    }

    // ========== parsing ==========

    #[test]
    fn test_parse_skips_header_and_reads_rows() {
        let sheet = vec![
            header(5),
            otp_row("A1", "2024-01-01", "2024-01-02", 1.0, "LATE"),
            otp_row("A2", "2024-01-01", "2024-01-01", 0.0, "ON TIME"),
        ];
        let records = parse_otp(&sheet);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].order_id, "A1");
        assert_eq!(
            records[0].qdt.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(records[0].time_diff_days, Some(1.0));
        assert_eq!(records[1].status.as_deref(), Some("ON TIME"));
    }

    #[test]
    fn test_parse_drops_rows_without_order_id() {
        let mut no_id = otp_row("", "2024-01-01", "2024-01-02", 1.0, "LATE");
        no_id[0] = Data::Empty;
        let sheet = vec![
            header(5),
            no_id,
            otp_row("A9", "2024-01-01", "2024-01-01", 0.0, "ON TIME"),
        ];
        let records = parse_otp(&sheet);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].order_id, "A9");
    }

    #[test]
    fn test_parse_numeric_order_id() {
        let mut row = otp_row("", "2024-01-01", "2024-01-01", 0.0, "ON TIME");
        row[0] = Data::Float(40012345.0);
        let sheet = vec![header(5), row];
        assert_eq!(parse_otp(&sheet)[0].order_id, "40012345");
    }

    #[test]
    fn test_parse_qc_reason_only_with_six_columns() {
        let mut with_qc = otp_row("A1", "2024-01-01", "2024-01-03", 2.0, "LATE");
        with_qc.push(Data::String("Customs delay".into()));
        let sheet = vec![header(6), with_qc];
        let records = parse_otp(&sheet);
        assert_eq!(records[0].qc_reason.as_deref(), Some("Customs delay"));

        // Five-column revision: no QC column even if a stray cell shows up
        let mut stray = otp_row("A2", "2024-01-01", "2024-01-03", 2.0, "LATE");
        stray.push(Data::String("noise".into()));
        let sheet = vec![header(5), stray];
        assert_eq!(parse_otp(&sheet)[0].qc_reason, None);
    }

    #[test]
    fn test_parse_unconvertible_fields_become_null() {
        let sheet = vec![
            header(5),
            vec![
                Data::String("A1".into()),
                Data::String("someday".into()),
                Data::Empty,
                Data::String("n/a".into()),
                Data::Empty,
            ],
        ];
        let records = parse_otp(&sheet);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].qdt, None);
        assert_eq!(records[0].pod, None);
        assert_eq!(records[0].time_diff_days, None);
        assert_eq!(records[0].status, None);
    }

    #[test]
    fn test_parse_serial_dates() {
        let sheet = vec![
            header(5),
            vec![
                Data::String("A1".into()),
                Data::Float(45292.0),
                Data::Float(45293.5),
                Data::Float(1.5),
                Data::String("LATE".into()),
            ],
        ];
        let rec = &parse_otp(&sheet)[0];
        assert_eq!(
            rec.qdt.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            rec.pod.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn test_parse_empty_sheet() {
        assert!(parse_otp(&Vec::new()).is_empty());
        assert!(parse_otp(&vec![header(5)]).is_empty());
    }
}
