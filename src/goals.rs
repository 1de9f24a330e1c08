//! Per-area goal tables: daily set goals and monthly sales bands.
//!
//! Both tables are keyed by area and filtered to the operating allow-list
//! at construction, so a lookup miss means "excluded", never an error.
//! Band values are period targets; they are carried per day through the
//! grid but reported once, not summed across days.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::areas;

/// A raw `area_goals` row from the warehouse mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaGoalRow {
    pub area: String,
    pub sets_goal: u32,
    pub min_goal: u32,
    pub max_goal: u32,
}

/// A monthly sales target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBand {
    pub min_goal: u32,
    pub max_goal: u32,
}

/// Daily set goals keyed by area, allow-listed areas only.
#[derive(Debug, Clone, Default)]
pub struct GoalTable {
    goals: BTreeMap<String, u32>,
}

impl GoalTable {
    pub fn from_rows(rows: &[AreaGoalRow]) -> Self {
        let goals = rows
            .iter()
            .filter(|row| areas::is_operating_area(&row.area))
            .map(|row| (row.area.clone(), row.sets_goal))
            .collect();
        Self { goals }
    }

    pub fn from_static<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u32)>) -> Self {
        let goals = pairs
            .into_iter()
            .map(|(area, goal)| (area.into(), goal))
            .collect();
        Self { goals }
    }

    pub fn lookup(&self, area: &str) -> Option<u32> {
        self.goals.get(area).copied()
    }

    /// Area names in ascending order.
    pub fn areas(&self) -> impl Iterator<Item = &str> {
        self.goals.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }
}

/// Monthly min/max sales bands keyed by area, allow-listed areas only.
#[derive(Debug, Clone, Default)]
pub struct BandTable {
    bands: BTreeMap<String, GoalBand>,
}

impl BandTable {
    pub fn from_rows(rows: &[AreaGoalRow]) -> Self {
        let mut bands = BTreeMap::new();
        for row in rows {
            if !areas::is_operating_area(&row.area) {
                continue;
            }
            if row.max_goal < row.min_goal {
                log::warn!(
                    "area {} has max_goal {} below min_goal {}",
                    row.area,
                    row.max_goal,
                    row.min_goal
                );
            }
            bands.insert(
                row.area.clone(),
                GoalBand {
                    min_goal: row.min_goal,
                    max_goal: row.max_goal,
                },
            );
        }
        Self { bands }
    }

    pub fn from_static<S: Into<String>>(
        entries: impl IntoIterator<Item = (S, u32, u32)>,
    ) -> Self {
        let bands = entries
            .into_iter()
            .map(|(area, min_goal, max_goal)| (area.into(), GoalBand { min_goal, max_goal }))
            .collect();
        Self { bands }
    }

    pub fn lookup(&self, area: &str) -> Option<GoalBand> {
        self.bands.get(area).copied()
    }

    /// (area, band) pairs in ascending area order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GoalBand)> {
        self.bands.iter().map(|(area, band)| (area.as_str(), *band))
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(area: &str, sets: u32, min: u32, max: u32) -> AreaGoalRow {
        AreaGoalRow {
            area: area.to_string(),
            sets_goal: sets,
            min_goal: min,
            max_goal: max,
        }
    }

    #[test]
    fn goal_table_filters_to_allow_list() {
        let table = GoalTable::from_rows(&[row("Bend", 5, 0, 0), row("Boise", 9, 0, 0)]);
        assert_eq!(table.lookup("Bend"), Some(5));
        assert_eq!(table.lookup("Boise"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn goal_table_areas_are_sorted() {
        let table = GoalTable::from_static([("Salem", 25), ("Bend", 5), ("Helena", 5)]);
        let order: Vec<_> = table.areas().collect();
        assert_eq!(order, vec!["Bend", "Helena", "Salem"]);
    }

    #[test]
    fn band_table_keeps_min_and_max() {
        let table = BandTable::from_rows(&[row("Bend", 0, 12, 15)]);
        let band = table.lookup("Bend").unwrap();
        assert_eq!(band.min_goal, 12);
        assert_eq!(band.max_goal, 15);
        assert!(table.lookup("Boise").is_none());
    }

    #[test]
    fn band_table_iterates_in_area_order() {
        let table = BandTable::from_static([("Salem", 20, 25), ("Bend", 12, 15)]);
        let order: Vec<_> = table.iter().map(|(area, _)| area).collect();
        assert_eq!(order, vec!["Bend", "Salem"]);
    }
}
