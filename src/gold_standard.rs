//! Monthly "gold standard" standings: every rep against the same bar.
//!
//! The warehouse keeps dated snapshots per team member; only the latest
//! snapshot per rep is authoritative. The bar itself is fixed, not
//! per-rep.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::areas;

/// The fixed monthly sales+assists bar every rep is measured against.
pub const GOLD_STANDARD_GOAL: u32 = 8;

/// Which month the standings reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthSelection {
    ThisMonth,
    LastMonth,
}

/// One dated team-member snapshot from the warehouse mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepSnapshot {
    pub name: String,
    pub effective_date: NaiveDate,
    pub current_month_sales: u32,
    pub current_month_assists: u32,
    pub previous_month_sales: u32,
    pub previous_month_assists: u32,
    pub picture_link: Option<String>,
}

/// One standings row, ready for card rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepStanding {
    pub name: String,
    pub actual: u32,
    pub goal: u32,
    pub profile_picture: String,
}

/// Compute standings for the selected month, latest snapshot per rep,
/// sorted by actual descending (name ascending on ties).
pub fn standings(snapshots: &[RepSnapshot], selection: MonthSelection) -> Vec<RepStanding> {
    let mut latest: BTreeMap<&str, &RepSnapshot> = BTreeMap::new();
    for snapshot in snapshots {
        match latest.get(snapshot.name.as_str()) {
            Some(existing) if existing.effective_date >= snapshot.effective_date => {}
            _ => {
                latest.insert(snapshot.name.as_str(), snapshot);
            }
        }
    }

    let mut rows: Vec<RepStanding> = latest
        .into_values()
        .map(|snapshot| {
            let actual = match selection {
                MonthSelection::ThisMonth => {
                    snapshot.current_month_sales + snapshot.current_month_assists
                }
                MonthSelection::LastMonth => {
                    snapshot.previous_month_sales + snapshot.previous_month_assists
                }
            };
            RepStanding {
                name: snapshot.name.clone(),
                actual,
                goal: GOLD_STANDARD_GOAL,
                profile_picture: snapshot
                    .picture_link
                    .clone()
                    .filter(|link| !link.is_empty())
                    .unwrap_or_else(|| areas::DEFAULT_PROFILE_PICTURE.to_string()),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.actual.cmp(&a.actual).then_with(|| a.name.cmp(&b.name)));
    rows
}
