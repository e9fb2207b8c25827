//! Export and share formatting for the calculation history.
//!
//! CSV for spreadsheets, a plain-text summary for sharing, and the text
//! block copied for a single weight group. Groups are always ordered by
//! their most recent record, matching the on-screen order.

use super::models::{best_record, group_key, CalculationRecord, HistoryError};
use super::projection::group_order;
use chrono::{DateTime, Local, Utc};
use csv::{QuoteStyle, Terminator};

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 7] = [
    "Date",
    "Time",
    "Weight",
    "Weight Unit",
    "Velocity",
    "Velocity Unit",
    "Joule",
];

/// Text returned by [`share_text`] for an empty history.
pub const EMPTY_SHARE_TEXT: &str = "No calculations in history to share.";

/// Footer appended to copied group text.
pub const COPY_FOOTER: &str = "Copied from Joule-Calc";

/// Exports records as CSV, oldest first.
///
/// Data fields are always quoted; the header row is not. Returns `Ok(None)`
/// for an empty history.
///
/// # Errors
///
/// Returns `HistoryError::Export` if a row cannot be written.
pub fn to_csv(records: &[CalculationRecord]) -> Result<Option<String>, HistoryError> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut sorted: Vec<&CalculationRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp());

    let mut buffer = Vec::new();
    {
        let mut header = csv_writer(&mut buffer, QuoteStyle::Necessary);
        header.write_record(CSV_HEADER)?;
        header.flush().map_err(csv::Error::from)?;
    }
    {
        let mut rows = csv_writer(&mut buffer, QuoteStyle::Always);
        for record in sorted {
            let local = local_time(&record.timestamp());
            let label = record.unit_label();
            rows.write_record([
                local.format("%Y-%m-%d").to_string(),
                local.format("%H:%M:%S").to_string(),
                group_key(record.weight()),
                label.weight_unit().to_string(),
                format!("{:.2}", record.velocity()),
                label.velocity_unit().to_string(),
                format!("{:.3}", record.joule()),
            ])?;
        }
        rows.flush().map_err(csv::Error::from)?;
    }

    let csv = String::from_utf8_lossy(&buffer);
    Ok(Some(csv.trim_end_matches('\n').to_string()))
}

fn csv_writer<W: std::io::Write>(out: W, quote_style: QuoteStyle) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Suggested file name for a CSV export created at `now`.
pub fn csv_file_name(now: &DateTime<Utc>) -> String {
    format!("joule_history_{}.csv", now.format("%Y%m%d"))
}

/// Builds the shareable text summary of the whole history.
pub fn share_text(records: &[CalculationRecord]) -> String {
    if records.is_empty() {
        return EMPTY_SHARE_TEXT.to_string();
    }

    let mut text = String::from("My results:\n\n");

    for key in group_order(records) {
        let group: Vec<&CalculationRecord> =
            records.iter().filter(|r| group_key(r.weight()) == key).collect();
        text.push_str(&format_group_block(&key, &group));
        text.push('\n');
    }

    if let Some(best) = best_record(records) {
        let label = best.unit_label();
        text.push_str("--- Best Result ---\n");
        text.push_str(&format!(
            "The highest recorded value is {:.2} J with a {:.2} {} BB at {:.2} {}.\n",
            best.joule(),
            best.weight(),
            label.weight_unit(),
            best.velocity(),
            label.velocity_unit()
        ));
    }

    text
}

/// Builds the copy text for one weight group.
///
/// Returns `None` if no record belongs to `key`.
pub fn group_text(records: &[CalculationRecord], key: &str) -> Option<String> {
    let group: Vec<&CalculationRecord> =
        records.iter().filter(|r| group_key(r.weight()) == key).collect();
    if group.is_empty() {
        return None;
    }

    let mut text = format_group_block(key, &group);
    text.push('\n');
    text.push_str(COPY_FOOTER);
    Some(text)
}

/// Header line plus one line per record, newest first.
fn format_group_block(key: &str, group: &[&CalculationRecord]) -> String {
    let label = group[0].unit_label();
    let average = group.iter().map(|r| r.joule()).sum::<f64>() / group.len() as f64;

    let mut block = format!(
        "--- Weight: {} {} (Average: {:.2} J) ---\n",
        key,
        label.weight_unit(),
        average
    );

    let mut sorted = group.to_vec();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    for record in sorted {
        let local = local_time(&record.timestamp());
        block.push_str(&format!(
            "- {} {} | {:.2} J ({:.2} {})\n",
            local.format("%Y-%m-%d"),
            local.format("%H:%M"),
            record.joule(),
            record.velocity(),
            label.velocity_unit()
        ));
    }

    block
}

fn local_time(timestamp: &DateTime<Utc>) -> DateTime<Local> {
    timestamp.with_timezone(&Local)
}
