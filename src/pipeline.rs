//! Goal aggregation and pacing.
//!
//! Pure functions over already-fetched warehouse rows: the caller supplies
//! a date range, fact rows, and a goal table, and gets back one aggregate
//! row per area, ascending by area name. Nothing here performs I/O or
//! fails; zero goals and empty inputs degrade to zeros and empty output.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::areas;
use crate::goals::{BandTable, GoalTable};
use crate::types::{DateRange, FactRow, GoalPolicy};

/// Progress of one area against its summed daily goals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaProgress {
    pub area: String,
    pub actual: u32,
    pub goal: u32,
    pub percent_of_total: f64,
    pub profile_picture: String,
}

/// Progress of one area against its monthly sales band, with a pace
/// projection for the rest of the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPacing {
    pub area: String,
    pub actual: u32,
    pub min_goal: u32,
    pub max_goal: u32,
    pub percent_of_min_total: f64,
    pub percent_of_max_total: f64,
    pub pace: i64,
    pub profile_picture: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// actual / goal rounded to two decimals; 0 when the goal is 0.
pub(crate) fn percent_of(actual: u32, goal: u32) -> f64 {
    if goal == 0 {
        0.0
    } else {
        round2(actual as f64 / goal as f64)
    }
}

/// Count distinct record ids per area per day, restricted to the range and
/// to areas the goal table knows. Days without facts are simply absent
/// here; the date grid supplies their zero rows downstream.
fn daily_counts<'a, F>(
    range: &DateRange,
    facts: &'a [FactRow],
    known_area: F,
) -> BTreeMap<&'a str, BTreeMap<NaiveDate, u32>>
where
    F: Fn(&str) -> bool,
{
    let mut ids: BTreeMap<&str, BTreeMap<NaiveDate, BTreeSet<&str>>> = BTreeMap::new();
    for row in facts {
        if !range.contains(row.occurred_on) {
            continue;
        }
        if !known_area(&row.area) {
            continue;
        }
        ids.entry(row.area.as_str())
            .or_default()
            .entry(row.occurred_on)
            .or_default()
            .insert(row.record_id.as_str());
    }
    ids.into_iter()
        .map(|(area, days)| {
            let days = days
                .into_iter()
                .map(|(day, set)| (day, set.len() as u32))
                .collect();
            (area, days)
        })
        .collect()
}

/// Aggregate appointment facts against per-area daily goals.
///
/// Every area in the goal table yields exactly one row, with the goal
/// summed per day across the range under the given policy. An empty fact
/// set yields an empty result; the caller shows the empty-state notice.
pub fn aggregate(
    range: &DateRange,
    facts: &[FactRow],
    goals: &GoalTable,
    policy: GoalPolicy,
) -> Vec<AreaProgress> {
    if facts.is_empty() {
        return Vec::new();
    }

    let grid: Vec<NaiveDate> = range.days().collect();
    let counts = daily_counts(range, facts, |area| goals.lookup(area).is_some());

    goals
        .areas()
        .map(|area| {
            let daily_goal = goals.lookup(area).unwrap_or(0);
            let area_days = counts.get(area);
            let mut actual = 0u32;
            let mut goal = 0u32;
            for day in &grid {
                actual += area_days
                    .and_then(|days| days.get(day))
                    .copied()
                    .unwrap_or(0);
                goal += policy.goal_for(daily_goal, *day);
            }
            AreaProgress {
                area: area.to_string(),
                actual,
                goal,
                percent_of_total: percent_of(actual, goal),
                profile_picture: areas::profile_picture_url(area).to_string(),
            }
        })
        .collect()
}

/// Aggregate sales facts against per-area monthly bands and project a pace.
///
/// `facts` is the full lookback window (typically six months); the range
/// restricts what counts as `actual`, while the pace projection reads the
/// raw window directly. Band targets are period values and are not summed
/// across days.
pub fn aggregate_with_pacing(
    range: &DateRange,
    facts: &[FactRow],
    bands: &BandTable,
    as_of: NaiveDate,
) -> Vec<AreaPacing> {
    if facts.is_empty() {
        return Vec::new();
    }

    let counts = daily_counts(range, facts, |area| bands.lookup(area).is_some());
    let paces = month_pace(facts, as_of);

    bands
        .iter()
        .map(|(area, band)| {
            let actual: u32 = counts
                .get(area)
                .map(|days| days.values().sum())
                .unwrap_or(0);
            AreaPacing {
                area: area.to_string(),
                actual,
                min_goal: band.min_goal,
                max_goal: band.max_goal,
                percent_of_min_total: percent_of(actual, band.min_goal),
                percent_of_max_total: percent_of(actual, band.max_goal),
                pace: paces.get(area).copied().unwrap_or(0),
                profile_picture: areas::profile_picture_url(area).to_string(),
            }
        })
        .collect()
}

/// Linear projection of each area's full-month total.
///
/// The trailing 30-day count stands in for the run rate over the remainder
/// of the month: `floor(trailing_30 * (1 - round2(dom / dim)) + month_to_date)`.
/// Areas without recent facts are absent from the map; callers treat that
/// as a pace of 0.
pub fn month_pace(facts: &[FactRow], as_of: NaiveDate) -> BTreeMap<String, i64> {
    let window_start = as_of - Duration::days(30);
    let dom = as_of.day() as f64;
    let dim = days_in_month(as_of) as f64;
    let percent_of_month_left = 1.0 - round2(dom / dim);

    let mut trailing: BTreeMap<&str, i64> = BTreeMap::new();
    let mut month_to_date: BTreeMap<&str, i64> = BTreeMap::new();
    for row in facts {
        if row.occurred_on >= window_start {
            *trailing.entry(row.area.as_str()).or_default() += 1;
        }
        if row.occurred_on.year() == as_of.year() && row.occurred_on.month() == as_of.month() {
            *month_to_date.entry(row.area.as_str()).or_default() += 1;
        }
    }

    let mut paces = BTreeMap::new();
    for area in trailing.keys().chain(month_to_date.keys()) {
        let recent = trailing.get(area).copied().unwrap_or(0) as f64;
        let mtd = month_to_date.get(area).copied().unwrap_or(0) as f64;
        let projected = (recent * percent_of_month_left + mtd).floor() as i64;
        paces.insert(area.to_string(), projected);
    }
    paces
}

fn days_in_month(date: NaiveDate) -> u32 {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
