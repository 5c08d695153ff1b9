// ── Printable documents ──
//
// The history report and per-session receipt, each renderable as plain
// text (terminal, file) or a standalone HTML page (browser print). Every
// field falls back to `N/A`; HTML output escapes all session content.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::billing::format_currency;
use crate::model::{ParkingSession, Timestamp};

const NOT_AVAILABLE: &str = "N/A";
const SYSTEM_NAME: &str = "Parking Management System";
const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RECEIPT_WIDTH: usize = 40;

fn or_na(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        s.to_owned()
    }
}

fn time_or_na(t: Option<&Timestamp>) -> String {
    t.map_or_else(|| NOT_AVAILABLE.to_owned(), ToString::to_string)
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── History report ──────────────────────────────────────────────────

/// One line of the history report, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub vehicle: String,
    pub owner: String,
    pub vehicle_type: String,
    pub plate: String,
    pub slot: String,
    pub entry: String,
    pub exit: String,
    pub duration: String,
    pub revenue: u64,
}

impl From<&ParkingSession> for ReportRow {
    fn from(s: &ParkingSession) -> Self {
        Self {
            vehicle: or_na(&s.vehicle_name),
            owner: or_na(&s.owner_name),
            vehicle_type: s
                .vehicle_type
                .map_or_else(|| NOT_AVAILABLE.to_owned(), |v| v.to_string()),
            plate: or_na(&s.plate_number),
            slot: s.slot_label(),
            entry: time_or_na(s.entry_time.as_ref()),
            exit: time_or_na(s.exit_time.as_ref()),
            duration: s.duration().to_string(),
            revenue: s.revenue(),
        }
    }
}

impl ReportRow {
    fn cells(&self) -> [String; 9] {
        [
            self.vehicle.clone(),
            self.owner.clone(),
            self.vehicle_type.clone(),
            self.plate.clone(),
            self.slot.clone(),
            self.entry.clone(),
            self.exit.clone(),
            self.duration.clone(),
            format_currency(self.revenue),
        ]
    }
}

const REPORT_HEADERS: [&str; 9] = [
    "Vehicle",
    "Owner",
    "Type",
    "Plate",
    "Slot",
    "Entry Time",
    "Exit Time",
    "Duration",
    "Revenue",
];

fn pad_columns<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .zip(widths)
        .map(|(v, w)| format!("{v:<w$}", w = *w))
        .collect();
    padded.join("  ").trim_end().to_owned()
}

/// Export of the history ledger as currently filtered and sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryReport {
    pub generated_at: NaiveDateTime,
    pub total_sessions: usize,
    pub total_revenue: u64,
    pub rows: Vec<ReportRow>,
}

impl HistoryReport {
    pub fn render_text(&self) -> String {
        let cells: Vec<[String; 9]> = self.rows.iter().map(ReportRow::cells).collect();
        let mut widths = REPORT_HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "Parking Transaction History");
        let _ = writeln!(
            out,
            "Generated on {}",
            self.generated_at.format(GENERATED_FORMAT)
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Sessions: {}", self.total_sessions);
        let _ = writeln!(out, "Total Revenue: {}", format_currency(self.total_revenue));
        let _ = writeln!(out, "Generated By: {SYSTEM_NAME}");
        let _ = writeln!(out);

        let header = pad_columns(REPORT_HEADERS.iter().copied(), &widths);
        let _ = writeln!(out, "{header}");
        let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
        for row in &cells {
            let _ = writeln!(out, "{}", pad_columns(row.iter().map(String::as_str), &widths));
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "This document was automatically generated by {SYSTEM_NAME}"
        );
        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<title>Parking Transaction History</title>\n<style>\n");
        out.push_str(
            "body { font-family: Arial, sans-serif; margin: 20px; }\n\
             .header { text-align: center; margin-bottom: 30px; }\n\
             .title { font-size: 24px; font-weight: bold; }\n\
             .summary { display: flex; justify-content: space-between; padding: 15px; }\n\
             table { width: 100%; border-collapse: collapse; }\n\
             th { background: #374151; color: white; padding: 12px; text-align: left; }\n\
             td { padding: 10px; border-bottom: 1px solid #ddd; }\n\
             .footer { margin-top: 30px; text-align: center; color: #666; }\n",
        );
        out.push_str("</style>\n</head>\n<body>\n");

        let _ = writeln!(
            out,
            "<div class=\"header\">\n<div class=\"title\">Parking Transaction History</div>\n\
             <div class=\"subtitle\">Generated on {}</div>\n</div>",
            self.generated_at.format(GENERATED_FORMAT)
        );
        let _ = writeln!(
            out,
            "<div class=\"summary\">\n<div>Total Sessions: {}</div>\n\
             <div>Total Revenue: {}</div>\n<div>Generated By: {SYSTEM_NAME}</div>\n</div>",
            self.total_sessions,
            format_currency(self.total_revenue)
        );

        out.push_str("<table>\n<thead>\n<tr>");
        for h in REPORT_HEADERS {
            let _ = write!(out, "<th>{h}</th>");
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row.cells() {
                let _ = write!(out, "<td>{}</td>", escape_html(&cell));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");

        let _ = writeln!(
            out,
            "<div class=\"footer\">This document was automatically generated by {SYSTEM_NAME}</div>"
        );
        out.push_str("</body>\n</html>\n");
        out
    }
}

// ── Receipt ─────────────────────────────────────────────────────────

/// Receipt for a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub id: Option<String>,
    pub plate: String,
    /// Upper-cased wire name, e.g. `E-BIKE`.
    pub vehicle_type: String,
    pub slot: String,
    pub vehicle: String,
    pub owner: String,
    pub entry: String,
    pub exit: String,
    pub duration: String,
    pub total: u64,
    pub generated_at: NaiveDateTime,
}

impl Receipt {
    pub fn new(s: &ParkingSession, now: NaiveDateTime) -> Self {
        Self {
            id: s.id.as_ref().map(ToString::to_string),
            plate: or_na(&s.plate_number),
            vehicle_type: s
                .vehicle_type
                .map_or_else(|| NOT_AVAILABLE.to_owned(), |v| v.to_string().to_uppercase()),
            slot: s.slot_label(),
            vehicle: or_na(&s.vehicle_name),
            owner: or_na(&s.owner_name),
            entry: time_or_na(s.entry_time.as_ref()),
            exit: time_or_na(s.exit_time.as_ref()),
            duration: s.duration().to_string(),
            total: s.revenue(),
            generated_at: now,
        }
    }

    fn details(&self) -> [(&'static str, &str); 5] {
        [
            ("Plate Number", self.plate.as_str()),
            ("Vehicle Type", self.vehicle_type.as_str()),
            ("Parking Slot", self.slot.as_str()),
            ("Vehicle", self.vehicle.as_str()),
            ("Owner", self.owner.as_str()),
        ]
    }

    fn times(&self) -> [(&'static str, &str); 3] {
        [
            ("Entry Time", self.entry.as_str()),
            ("Exit Time", self.exit.as_str()),
            ("Duration", self.duration.as_str()),
        ]
    }

    fn barcode(&self) -> String {
        format!("*** {} ***", self.id.as_deref().unwrap_or("TRANSACTION"))
    }

    pub fn render_text(&self) -> String {
        let width = RECEIPT_WIDTH;
        let center = |s: &str| format!("{s:^width$}").trim_end().to_owned();
        let pair = |label: &str, value: &str| {
            let label = format!("{label}:");
            let pad = width.saturating_sub(label.chars().count() + value.chars().count());
            format!("{label}{}{value}", " ".repeat(pad.max(1)))
        };
        let dashed = "-".repeat(width);
        let double = "=".repeat(width);

        let mut lines = vec![
            center("PARKING MANAGEMENT"),
            center("OFFICIAL RECEIPT"),
            center(&format!(
                "Receipt No: {}",
                self.id.as_deref().unwrap_or(NOT_AVAILABLE)
            )),
            center(&self.generated_at.format("%Y-%m-%d").to_string()),
            dashed.clone(),
        ];
        lines.extend(self.details().iter().map(|&(l, v)| pair(l, v)));
        lines.push(dashed.clone());
        lines.extend(self.times().iter().map(|&(l, v)| pair(l, v)));
        lines.push(double);
        lines.push(pair("TOTAL AMOUNT", &format_currency(self.total)));
        lines.push(center(&self.barcode()));
        lines.push(dashed);
        lines.push(center("Thank you for parking with us!"));
        lines.push(center("For inquiries: contact@parkingmgmt.com"));
        lines.push(center(&format!(
            "Generated: {}",
            self.generated_at.format(GENERATED_FORMAT)
        )));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Parking Receipt - {}</title>",
            escape_html(&self.plate)
        );
        out.push_str(
            "<style>\n\
             body { font-family: 'Courier New', monospace; font-size: 12px; }\n\
             .receipt { max-width: 300px; margin: 0 auto; border: 2px solid #000; padding: 15px; }\n\
             .header, .barcode, .footer { text-align: center; }\n\
             .row { display: flex; justify-content: space-between; }\n\
             .total { font-size: 18px; font-weight: bold; text-align: center; }\n\
             </style>\n</head>\n<body>\n<div class=\"receipt\">\n",
        );
        let _ = writeln!(
            out,
            "<div class=\"header\">\n<div><b>PARKING MANAGEMENT</b></div>\n\
             <div><b>OFFICIAL RECEIPT</b></div>\n<div>Receipt No: {}</div>\n<div>{}</div>\n</div>\n<hr>",
            escape_html(self.id.as_deref().unwrap_or(NOT_AVAILABLE)),
            self.generated_at.format("%Y-%m-%d")
        );
        for (label, value) in self.details().iter().chain(self.times().iter()) {
            let _ = writeln!(
                out,
                "<div class=\"row\"><span>{label}:</span><span>{}</span></div>",
                escape_html(value)
            );
        }
        let _ = writeln!(
            out,
            "<hr>\n<div class=\"total\">TOTAL AMOUNT<br>{}</div>\n<div class=\"barcode\">{}</div>",
            format_currency(self.total),
            escape_html(&self.barcode())
        );
        let _ = writeln!(
            out,
            "<div class=\"footer\">\n<div>Thank you for parking with us!</div>\n\
             <div>For inquiries: contact@parkingmgmt.com</div>\n<div>Generated: {}</div>\n</div>",
            self.generated_at.format(GENERATED_FORMAT)
        );
        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use parkpro_api::{RecordId, SessionRecord};

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn jane() -> ParkingSession {
        ParkingSession::from(SessionRecord {
            id: Some(RecordId::Number(7)),
            owner_name: Some("Jane <Doe>".into()),
            vehicle_name: Some("Civic".into()),
            vehicle_type: Some("e-bike".into()),
            plate_number: Some("ABC123".into()),
            parking_slot: Some("A1".into()),
            entry_time: Some("2024-01-01T08:00".into()),
            exit_time: Some("2024-01-01T10:30".into()),
        })
    }

    #[test]
    fn receipt_text_has_all_sections() {
        let text = Receipt::new(&jane(), now()).render_text();
        for needle in [
            "PARKING MANAGEMENT",
            "OFFICIAL RECEIPT",
            "Receipt No: 7",
            "E-BIKE",
            "2h 30m",
            "₱60",
            "*** 7 ***",
            "Thank you for parking with us!",
            "Generated: 2024-01-02 09:00:00",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in\n{text}");
        }
    }

    #[test]
    fn receipt_without_data_degrades_to_na() {
        let receipt = Receipt::new(&ParkingSession::from(SessionRecord::default()), now());
        assert_eq!(receipt.plate, "N/A");
        assert_eq!(receipt.vehicle_type, "N/A");
        assert_eq!(receipt.duration, "N/A");
        assert!(receipt.render_text().contains("*** TRANSACTION ***"));
        assert!(receipt.render_text().contains("Receipt No: N/A"));
    }

    #[test]
    fn html_escapes_session_content() {
        let html = Receipt::new(&jane(), now()).render_html();
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(!html.contains("Jane <Doe>"));

        let report = HistoryReport {
            generated_at: now(),
            total_sessions: 1,
            total_revenue: 60,
            rows: vec![ReportRow::from(&jane())],
        };
        let html = report.render_html();
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(html.contains("Total Revenue: ₱60"));
    }

    #[test]
    fn report_text_lists_rows_and_totals() {
        let report = HistoryReport {
            generated_at: now(),
            total_sessions: 1,
            total_revenue: 60,
            rows: vec![ReportRow::from(&jane())],
        };
        let text = report.render_text();
        assert!(text.starts_with("Parking Transaction History\n"));
        assert!(text.contains("Total Sessions: 1"));
        assert!(text.contains("Generated By: Parking Management System"));
        assert!(text.contains("Entry Time"));
        assert!(text.contains("2024-01-01 08:00"));
        assert!(text.contains("This document was automatically generated by Parking Management System"));
    }
}
