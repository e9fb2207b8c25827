//! Grouping and pagination engine.
//!
//! Derives a display-ready [`Projection`] from a snapshot of history records:
//! records are grouped by weight, groups are ordered by their most recent
//! record, each group is sorted by its own [`SortMode`], and the flattened
//! result is windowed for paginated views.
//!
//! The engine never mutates records. Per-session view settings live in
//! [`ViewState`], which is not persisted.

use super::models::{group_key, CalculationRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Default number of records per page.
pub const HISTORY_ITEMS_PER_PAGE: usize = 10;

/// Ordering of records inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Newest first.
    #[default]
    MostRecent,
    /// Oldest first.
    Oldest,
    /// Highest energy first.
    EnergyDesc,
    /// Lowest energy first.
    EnergyAsc,
}

impl SortMode {
    /// All modes, in menu order.
    pub const ALL: [SortMode; 4] = [
        SortMode::MostRecent,
        SortMode::Oldest,
        SortMode::EnergyDesc,
        SortMode::EnergyAsc,
    ];

    /// Stable-sorts `records` in place.
    pub fn sort(self, records: &mut [CalculationRecord]) {
        match self {
            SortMode::MostRecent => records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
            SortMode::Oldest => records.sort_by(|a, b| a.timestamp().cmp(&b.timestamp())),
            SortMode::EnergyDesc => records.sort_by(|a, b| b.joule().total_cmp(&a.joule())),
            SortMode::EnergyAsc => records.sort_by(|a, b| a.joule().total_cmp(&b.joule())),
        }
    }

    /// Identifier used in settings and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::MostRecent => "mostRecent",
            SortMode::Oldest => "oldest",
            SortMode::EnergyDesc => "energyDesc",
            SortMode::EnergyAsc => "energyAsc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown sort mode '{}' (expected one of: mostRecent, oldest, energyDesc, energyAsc)",
                    s
                )
            })
    }
}

/// Whether a projection is windowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Show the first `visible_count` records and offer to load more.
    Paginated,
    /// Show every record.
    Full,
}

/// Per-session view settings.
///
/// Reset to defaults whenever the application starts; only the history
/// itself is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    sort_orders: HashMap<String, SortMode>,
    collapsed: HashSet<String>,
    visible_count: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(HISTORY_ITEMS_PER_PAGE)
    }
}

impl ViewState {
    /// Creates a view state showing one page of `page_size` records.
    ///
    /// A `page_size` of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            sort_orders: HashMap::new(),
            collapsed: HashSet::new(),
            visible_count: page_size,
            page_size,
        }
    }

    /// Records per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Size of the pagination window.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Sort mode of a group (`MostRecent` unless changed).
    pub fn sort_mode(&self, key: &str) -> SortMode {
        self.sort_orders.get(key).copied().unwrap_or_default()
    }

    /// Changes a group's sort mode and restarts pagination at the first page.
    pub fn set_sort_mode(&mut self, key: impl Into<String>, mode: SortMode) {
        self.sort_orders.insert(key.into(), mode);
        self.reset_pagination();
    }

    /// Widens the window by one page.
    pub fn load_more(&mut self) {
        self.visible_count += self.page_size;
    }

    /// Shrinks the window back to the first page.
    pub fn reset_pagination(&mut self) {
        self.visible_count = self.page_size;
    }

    /// Returns `true` if the group is collapsed.
    pub fn is_collapsed(&self, key: &str) -> bool {
        self.collapsed.contains(key)
    }

    /// Flips a group's collapsed flag and returns the new value.
    pub fn toggle_collapsed(&mut self, key: &str) -> bool {
        if self.collapsed.remove(key) {
            false
        } else {
            self.collapsed.insert(key.to_string());
            true
        }
    }

    /// Adjusts the view after a record was added: back to the first page.
    pub fn on_record_added(&mut self) {
        self.reset_pagination();
    }

    /// Adjusts the view after a single record was removed.
    pub fn on_record_removed(&mut self) {
        self.visible_count = self.visible_count.saturating_sub(1).max(self.page_size);
    }

    /// Adjusts the view after a whole group was removed.
    pub fn on_group_removed(&mut self, key: &str) {
        self.sort_orders.remove(key);
        self.collapsed.remove(key);
        self.on_record_removed();
    }

    /// Adjusts the view after the history was cleared.
    pub fn on_cleared(&mut self) {
        self.sort_orders.clear();
        self.reset_pagination();
    }
}

/// Affordance for revealing more records in a paginated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadMore {
    /// Records not yet shown.
    pub remaining: usize,
    /// Records the next page would reveal.
    pub next_batch: usize,
}

/// One group as it should be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    /// Two-decimal weight key.
    pub key: String,
    /// Weight unit of the group's first record, e.g. `g`.
    pub weight_unit: &'static str,
    /// Mean energy over every record of the group, visible or not.
    pub average_joule: f64,
    /// Records in the whole group.
    pub total_count: usize,
    /// The group's sort mode.
    pub sort_mode: SortMode,
    /// Sorting is only offered for groups with more than one record.
    pub sortable: bool,
    /// Whether the group is collapsed.
    pub collapsed: bool,
    /// Records inside the current window, in display order.
    pub records: Vec<CalculationRecord>,
}

/// Grouped, sorted and windowed history ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Projection {
    /// The history is empty.
    Empty,
    /// At least one record exists.
    Groups {
        /// Groups in display order. Only groups with visible records appear.
        groups: Vec<GroupView>,
        /// Total number of records.
        total: usize,
        /// Number of records inside the window.
        visible: usize,
        /// Present when more records can be revealed.
        load_more: Option<LoadMore>,
    },
}

impl Projection {
    /// Returns `true` for the empty state.
    pub fn is_empty(&self) -> bool {
        matches!(self, Projection::Empty)
    }

    /// Projected groups; empty for the empty state.
    pub fn groups(&self) -> &[GroupView] {
        match self {
            Projection::Empty => &[],
            Projection::Groups { groups, .. } => groups,
        }
    }

    /// The load-more affordance, if any.
    pub fn load_more(&self) -> Option<LoadMore> {
        match self {
            Projection::Empty => None,
            Projection::Groups { load_more, .. } => *load_more,
        }
    }
}

/// Records of one weight group, in first-appearance order.
struct Group {
    key: String,
    records: Vec<CalculationRecord>,
    latest: DateTime<Utc>,
}

/// Partitions records by group key and orders the groups by their most
/// recent record, newest first. Groups with equal latest timestamps keep the
/// order in which they first appear in `records`.
fn ordered_groups(records: &[CalculationRecord]) -> Vec<Group> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        let key = group_key(record.weight());
        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                group.latest = group.latest.max(record.timestamp());
                group.records.push(record.clone());
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    records: vec![record.clone()],
                    latest: record.timestamp(),
                });
            }
        }
    }

    groups.sort_by(|a, b| b.latest.cmp(&a.latest));
    groups
}

/// Group keys in display order.
pub fn group_order(records: &[CalculationRecord]) -> Vec<String> {
    ordered_groups(records).into_iter().map(|g| g.key).collect()
}

/// Builds the canonical flat ordering: groups by most recent record, each
/// group sorted by its mode from `view`.
///
/// This is the sequence pagination windows are cut from.
pub fn flatten_sorted(records: &[CalculationRecord], view: &ViewState) -> Vec<CalculationRecord> {
    ordered_groups(records)
        .into_iter()
        .flat_map(|mut group| {
            view.sort_mode(&group.key).sort(&mut group.records);
            group.records
        })
        .collect()
}

/// Projects `records` for display.
///
/// # Example
///
/// ```
/// use joule_calc::history::{project, CalculationRecord, ViewMode, ViewState};
/// use joule_calc::units::UnitSystem;
///
/// let records = vec![
///     CalculationRecord::from_measurement(0.25, 90.0, UnitSystem::Metric).unwrap(),
///     CalculationRecord::from_measurement(0.20, 100.0, UnitSystem::Metric).unwrap(),
/// ];
/// let projection = project(&records, &ViewState::default(), ViewMode::Paginated);
/// assert_eq!(projection.groups().len(), 2);
/// assert!(projection.load_more().is_none());
/// ```
pub fn project(records: &[CalculationRecord], view: &ViewState, mode: ViewMode) -> Projection {
    if records.is_empty() {
        return Projection::Empty;
    }

    let total = records.len();
    let window = match mode {
        ViewMode::Paginated => view.visible_count.min(total),
        ViewMode::Full => total,
    };

    let mut groups = Vec::new();
    let mut taken = 0;

    for mut group in ordered_groups(records) {
        let sort_mode = view.sort_mode(&group.key);
        let total_count = group.records.len();
        let average_joule =
            group.records.iter().map(|r| r.joule()).sum::<f64>() / total_count as f64;
        let weight_unit = group.records[0].unit_label().weight_unit();

        sort_mode.sort(&mut group.records);

        let visible_here = (window - taken).min(total_count);
        if visible_here == 0 {
            break;
        }
        group.records.truncate(visible_here);
        taken += visible_here;

        groups.push(GroupView {
            collapsed: view.is_collapsed(&group.key),
            key: group.key,
            weight_unit,
            average_joule,
            total_count,
            sort_mode,
            sortable: total_count > 1,
            records: group.records,
        });
    }

    let load_more = match mode {
        ViewMode::Paginated if window < total => {
            let remaining = total - window;
            Some(LoadMore {
                remaining,
                next_batch: remaining.min(view.page_size),
            })
        }
        _ => None,
    };

    Projection::Groups {
        groups,
        total,
        visible: window,
        load_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitSystem;
    use chrono::{Duration, TimeZone};

    fn at(weight: f64, velocity: f64, minutes: i64) -> CalculationRecord {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        CalculationRecord::at(weight, velocity, UnitSystem::Metric, base + Duration::minutes(minutes))
            .unwrap()
    }

    /// Newest-first store order, as the history store keeps it.
    fn newest_first(mut records: Vec<CalculationRecord>) -> Vec<CalculationRecord> {
        records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        records
    }

    fn velocities(records: &[CalculationRecord]) -> Vec<f64> {
        records.iter().map(|r| r.velocity()).collect()
    }

    #[test]
    fn test_empty_projection() {
        let projection = project(&[], &ViewState::default(), ViewMode::Paginated);
        assert_eq!(projection, Projection::Empty);
        assert!(projection.is_empty());
        assert!(projection.groups().is_empty());
    }

    #[test]
    fn test_groups_ordered_by_most_recent() {
        let records = newest_first(vec![at(0.20, 100.0, 0), at(0.25, 90.0, 1)]);

        assert_eq!(group_order(&records), vec!["0.25", "0.20"]);

        let projection = project(&records, &ViewState::default(), ViewMode::Full);
        let keys: Vec<&str> = projection.groups().iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["0.25", "0.20"]);
    }

    #[test]
    fn test_group_order_uses_latest_record_of_each_group() {
        // 0.20 has the oldest and the newest record overall
        let records = newest_first(vec![
            at(0.20, 100.0, 0),
            at(0.25, 90.0, 1),
            at(0.30, 80.0, 2),
            at(0.20, 101.0, 3),
        ]);

        assert_eq!(group_order(&records), vec!["0.20", "0.30", "0.25"]);
    }

    #[test]
    fn test_group_order_ties_keep_first_appearance() {
        let records = vec![at(0.30, 80.0, 5), at(0.25, 90.0, 5), at(0.20, 100.0, 5)];
        assert_eq!(group_order(&records), vec!["0.30", "0.25", "0.20"]);
    }

    #[test]
    fn test_near_boundary_weights_group_together() {
        let records = newest_first(vec![at(0.196, 100.0, 0), at(0.204, 100.0, 1), at(0.194, 100.0, 2)]);
        let projection = project(&records, &ViewState::default(), ViewMode::Full);

        let groups = projection.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "0.19");
        assert_eq!(groups[1].key, "0.20");
        assert_eq!(groups[1].total_count, 2);
    }

    #[test]
    fn test_sort_modes_within_group() {
        let records = newest_first(vec![at(0.20, 100.0, 0), at(0.20, 120.0, 1), at(0.20, 90.0, 2)]);
        let mut view = ViewState::default();

        let flat = flatten_sorted(&records, &view);
        assert_eq!(velocities(&flat), vec![90.0, 120.0, 100.0]);

        view.set_sort_mode("0.20", SortMode::Oldest);
        assert_eq!(velocities(&flatten_sorted(&records, &view)), vec![100.0, 120.0, 90.0]);

        view.set_sort_mode("0.20", SortMode::EnergyDesc);
        assert_eq!(velocities(&flatten_sorted(&records, &view)), vec![120.0, 100.0, 90.0]);

        view.set_sort_mode("0.20", SortMode::EnergyAsc);
        assert_eq!(velocities(&flatten_sorted(&records, &view)), vec![90.0, 100.0, 120.0]);
    }

    #[test]
    fn test_sort_change_leaves_other_groups_alone() {
        let records = newest_first(vec![
            at(0.20, 80.0, 0),
            at(0.20, 100.0, 1),
            at(0.25, 95.0, 2),
            at(0.25, 85.0, 3),
        ]);
        let mut view = ViewState::default();
        let before = flatten_sorted(&records, &view);
        assert_eq!(velocities(&before[2..]), vec![100.0, 80.0]);

        view.set_sort_mode("0.20", SortMode::EnergyAsc);
        let after = flatten_sorted(&records, &view);

        // 0.25 is still first and unchanged
        assert_eq!(velocities(&before[..2]), velocities(&after[..2]));
        assert_eq!(velocities(&after[2..]), vec![80.0, 100.0]);
    }

    #[test]
    fn test_pagination_window() {
        let records: Vec<CalculationRecord> =
            newest_first((0..25).map(|i| at(0.20 + 0.05 * (i % 3) as f64, 80.0 + i as f64, i)).collect());
        let view = ViewState::new(10);

        let projection = project(&records, &view, ViewMode::Paginated);
        match &projection {
            Projection::Groups {
                groups,
                total,
                visible,
                load_more,
            } => {
                assert_eq!(*total, 25);
                assert_eq!(*visible, 10);
                assert_eq!(groups.iter().map(|g| g.records.len()).sum::<usize>(), 10);
                assert_eq!(
                    *load_more,
                    Some(LoadMore {
                        remaining: 15,
                        next_batch: 10
                    })
                );
            }
            Projection::Empty => panic!("expected groups"),
        }

        // The window is a prefix of the canonical flat order
        let flat = flatten_sorted(&records, &view);
        let shown: Vec<CalculationRecord> = projection
            .groups()
            .iter()
            .flat_map(|g| g.records.clone())
            .collect();
        assert_eq!(shown, flat[..10].to_vec());
    }

    #[test]
    fn test_load_more_until_exhausted() {
        let records: Vec<CalculationRecord> = newest_first((0..25).map(|i| at(0.20, 80.0 + i as f64, i)).collect());
        let mut view = ViewState::new(10);

        view.load_more();
        let projection = project(&records, &view, ViewMode::Paginated);
        assert_eq!(
            projection.load_more(),
            Some(LoadMore {
                remaining: 5,
                next_batch: 5
            })
        );

        view.load_more();
        let projection = project(&records, &view, ViewMode::Paginated);
        assert_eq!(projection.load_more(), None);
        assert_eq!(projection.groups()[0].records.len(), 25);
    }

    #[test]
    fn test_full_view_ignores_window() {
        let records: Vec<CalculationRecord> = newest_first((0..15).map(|i| at(0.20, 80.0 + i as f64, i)).collect());
        let projection = project(&records, &ViewState::new(5), ViewMode::Full);

        assert_eq!(projection.groups()[0].records.len(), 15);
        assert!(projection.load_more().is_none());
    }

    #[test]
    fn test_average_covers_whole_group() {
        let records = newest_first(vec![at(0.20, 100.0, 0), at(0.20, 200.0, 1), at(0.25, 90.0, 2)]);
        let view = ViewState::new(2);

        let projection = project(&records, &view, ViewMode::Paginated);
        let groups = projection.groups();

        // Window of 2: the 0.25 record plus one of the two 0.20 records
        assert_eq!(groups.len(), 2);
        let group = &groups[1];
        assert_eq!(group.key, "0.20");
        assert_eq!(group.records.len(), 1);
        assert_eq!(group.total_count, 2);
        assert!((group.average_joule - (1.0 + 4.0) / 2.0).abs() < 1e-9);
        assert!(group.sortable);
        assert!(!groups[0].sortable);
    }

    #[test]
    fn test_sort_change_resets_pagination() {
        let mut view = ViewState::new(10);
        view.load_more();
        view.load_more();
        assert_eq!(view.visible_count(), 30);

        view.set_sort_mode("0.20", SortMode::EnergyAsc);
        assert_eq!(view.visible_count(), 10);
        assert_eq!(view.sort_mode("0.20"), SortMode::EnergyAsc);
        assert_eq!(view.sort_mode("0.25"), SortMode::MostRecent);
    }

    #[test]
    fn test_view_state_transitions() {
        let mut view = ViewState::new(10);
        view.load_more();
        view.on_record_removed();
        assert_eq!(view.visible_count(), 19);

        view.on_record_removed();
        view.on_record_added();
        assert_eq!(view.visible_count(), 10);

        view.on_record_removed();
        assert_eq!(view.visible_count(), 10);

        view.set_sort_mode("0.20", SortMode::Oldest);
        view.toggle_collapsed("0.20");
        view.on_group_removed("0.20");
        assert_eq!(view.sort_mode("0.20"), SortMode::MostRecent);
        assert!(!view.is_collapsed("0.20"));

        view.set_sort_mode("0.25", SortMode::EnergyDesc);
        view.on_cleared();
        assert_eq!(view.sort_mode("0.25"), SortMode::MostRecent);
    }

    #[test]
    fn test_collapsed_flag_is_projected() {
        let records = vec![at(0.20, 100.0, 0)];
        let mut view = ViewState::default();

        assert!(view.toggle_collapsed("0.20"));
        assert!(project(&records, &view, ViewMode::Full).groups()[0].collapsed);

        assert!(!view.toggle_collapsed("0.20"));
        assert!(!project(&records, &view, ViewMode::Full).groups()[0].collapsed);
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("energyAsc".parse::<SortMode>(), Ok(SortMode::EnergyAsc));
        assert_eq!("MOSTRECENT".parse::<SortMode>(), Ok(SortMode::MostRecent));
        assert!("newest".parse::<SortMode>().is_err());
        assert_eq!(SortMode::EnergyDesc.to_string(), "energyDesc");
    }

    #[test]
    fn test_energy_sort_is_stable() {
        // Equal energies keep store order
        let a = at(0.20, 100.0, 0);
        let b = at(0.20, 100.0, 1);
        let records = vec![b.clone(), a.clone()];
        let mut view = ViewState::default();
        view.set_sort_mode("0.20", SortMode::EnergyDesc);

        let flat = flatten_sorted(&records, &view);
        assert_eq!(flat[0].id(), b.id());
        assert_eq!(flat[1].id(), a.id());
    }
}
