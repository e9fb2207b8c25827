//! Text rendering of history projections.
//!
//! This module turns a [`Projection`] and individual records into
//! human-readable strings for a terminal front end.

use super::models::CalculationRecord;
use super::projection::{GroupView, Projection};
use chrono::{DateTime, Local, Utc};

/// Message shown when the history is empty.
pub const EMPTY_HISTORY_MESSAGE: &str = "Your calculation history will appear here.";

/// Renders a whole projection.
///
/// Each group gets a header with its average, followed by its visible
/// records (unless collapsed). A paginated projection with hidden records
/// ends with a "load more" hint.
///
/// # Example
///
/// ```ignore
/// let projection = session.projection(ViewMode::Paginated);
/// println!("{}", format_projection(&projection));
/// ```
pub fn format_projection(projection: &Projection) -> String {
    let Projection::Groups {
        groups,
        total,
        visible,
        load_more,
    } = projection
    else {
        return format!("{}\n", EMPTY_HISTORY_MESSAGE);
    };

    let mut output = String::new();

    for group in groups {
        output.push_str(&format_group_header(group));
        output.push('\n');
        output.push_str(&"─".repeat(60));
        output.push('\n');

        if group.collapsed {
            output.push_str(&format!(
                "  ({} record{} hidden)\n",
                group.records.len(),
                if group.records.len() == 1 { "" } else { "s" }
            ));
        } else {
            for record in &group.records {
                output.push_str(&format!("  {}\n", format_record(record)));
            }
        }
        output.push('\n');
    }

    match load_more {
        Some(more) => output.push_str(&format!(
            "Showing {} of {}. Show {} more ({} remaining)\n",
            visible, total, more.next_batch, more.remaining
        )),
        None => output.push_str(&format!("{} record{}\n", total, if *total == 1 { "" } else { "s" })),
    }

    output
}

/// Formats a group header.
///
/// Format: "Average Joule (0.20 g): 1.01 J [3 records, sorted by mostRecent]"
pub fn format_group_header(group: &GroupView) -> String {
    let mut header = format!(
        "Average Joule ({} {}): {:.2} J [{} record{}",
        group.key,
        group.weight_unit,
        group.average_joule,
        group.total_count,
        if group.total_count == 1 { "" } else { "s" }
    );
    if group.sortable {
        header.push_str(&format!(", sorted by {}", group.sort_mode));
    }
    header.push(']');
    header
}

/// Formats a single record for list display.
///
/// Format: "1.01 J | 100.00 m/s | 2025-06-01 10:00:00 | <id>"
pub fn format_record(record: &CalculationRecord) -> String {
    format!(
        "{:.2} J | {:.2} {} | {} | {}",
        record.joule(),
        record.velocity(),
        record.unit_label().velocity_unit(),
        format_timestamp(&record.timestamp()),
        record.id()
    )
}

/// Formats the best-result summary.
///
/// Returns `None` when there is no record.
pub fn format_best_result(best: Option<&CalculationRecord>) -> Option<String> {
    let record = best?;
    let label = record.unit_label();
    Some(format!(
        "The highest result is {:.2} J, obtained with a {:.2} {} BB at {:.2} {}.\nRecorded on: {}",
        record.joule(),
        record.weight(),
        label.weight_unit(),
        record.velocity(),
        label.velocity_unit(),
        format_timestamp(&record.timestamp())
    ))
}

/// Formats a timestamp in local time for display.
///
/// Format: "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let local_time: DateTime<Local> = timestamp.with_timezone(&Local);
    local_time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::projection::{project, SortMode, ViewMode, ViewState};
    use crate::units::UnitSystem;
    use chrono::Duration;

    fn record(weight: f64, velocity: f64, minutes_ago: i64) -> CalculationRecord {
        CalculationRecord::at(
            weight,
            velocity,
            UnitSystem::Metric,
            Utc::now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    #[test]
    fn test_format_empty_projection() {
        let formatted = format_projection(&Projection::Empty);
        assert!(formatted.contains(EMPTY_HISTORY_MESSAGE));
    }

    #[test]
    fn test_format_projection_groups() {
        let records = vec![record(0.25, 90.0, 0), record(0.20, 100.0, 1), record(0.20, 110.0, 2)];
        let projection = project(&records, &ViewState::default(), ViewMode::Paginated);

        let formatted = format_projection(&projection);

        let first = formatted.find("(0.25 g)").unwrap();
        let second = formatted.find("(0.20 g)").unwrap();
        assert!(first < second);
        assert!(formatted.contains("1.01 J"));
        assert!(formatted.contains("sorted by mostRecent"));
        assert!(formatted.contains("3 records"));
    }

    #[test]
    fn test_format_projection_load_more_hint() {
        let records: Vec<CalculationRecord> =
            (0..12).map(|i| record(0.20, 80.0 + i as f64, i)).collect();
        let projection = project(&records, &ViewState::new(5), ViewMode::Paginated);

        let formatted = format_projection(&projection);
        assert!(formatted.contains("Showing 5 of 12. Show 5 more (7 remaining)"));
    }

    #[test]
    fn test_format_collapsed_group() {
        let records = vec![record(0.20, 100.0, 0)];
        let mut view = ViewState::default();
        view.toggle_collapsed("0.20");

        let formatted = format_projection(&project(&records, &view, ViewMode::Full));
        assert!(formatted.contains("1 record hidden"));
        assert!(!formatted.contains(records[0].id()));
    }

    #[test]
    fn test_group_header_without_sorting() {
        let records = vec![record(0.20, 100.0, 0)];
        let mut view = ViewState::default();
        view.set_sort_mode("0.20", SortMode::EnergyAsc);

        let projection = project(&records, &view, ViewMode::Full);
        let header = format_group_header(&projection.groups()[0]);
        assert_eq!(header, "Average Joule (0.20 g): 1.00 J [1 record]");
    }

    #[test]
    fn test_format_record() {
        let r = record(0.20, 100.0, 0);
        let formatted = format_record(&r);
        assert!(formatted.starts_with("1.00 J | 100.00 m/s | "));
        assert!(formatted.ends_with(r.id()));
    }

    #[test]
    fn test_format_best_result() {
        assert!(format_best_result(None).is_none());

        let r = record(0.25, 90.0, 0);
        let formatted = format_best_result(Some(&r)).unwrap();
        assert!(formatted.contains("1.01 J"));
        assert!(formatted.contains("0.25 g"));
        assert!(formatted.contains("90.00 m/s"));
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp(&Utc::now());
        assert!(formatted.contains('-'));
        assert!(formatted.contains(':'));
    }
}
