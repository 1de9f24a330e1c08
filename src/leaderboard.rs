//! Ranked leaderboards over metric-tagged warehouse events.
//!
//! Pure functions: the caller fetches events once (cached), then filters
//! and regroups them per page interaction. Counts are of distinct record
//! ids, so the same opportunity tagged twice never double-credits a rep.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::DateRange;

/// Metric tag on a leaderboard event row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Sales,
    Sits,
    Opportunities,
    Sets,
}

impl Metric {
    /// Parse the warehouse's metric label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Sales" => Some(Self::Sales),
            "Sits" => Some(Self::Sits),
            "Opportunities" => Some(Self::Opportunities),
            "Sets" => Some(Self::Sets),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Sits => "Sits",
            Self::Opportunities => "Opportunities",
            Self::Sets => "Sets",
        }
    }
}

/// One metric-tagged event from the warehouse leaderboard table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEvent {
    pub record_id: String,
    pub occurred_on: NaiveDate,
    pub metric: Metric,
    pub closer: Option<String>,
    pub closer_picture: Option<String>,
    pub lead_generator: Option<String>,
    pub fm_picture: Option<String>,
    pub area: String,
    pub area_picture: Option<String>,
}

/// Grouping dimension for the boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Rep,
    Area,
}

/// One closer-board row: sales, sits, and opportunities for a rep or area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloserRow {
    pub label: String,
    pub picture: Option<String>,
    pub sales: u32,
    pub sits: u32,
    pub opportunities: u32,
}

/// One field-marketer-board row: assists, sits, and sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMarketerRow {
    pub label: String,
    pub picture: Option<String>,
    pub assists: u32,
    pub sits: u32,
    pub sets: u32,
}

#[derive(Default)]
struct Tally<'a> {
    picture: Option<&'a str>,
    ids: [BTreeSet<&'a str>; 3],
}

fn in_scope(event: &LeaderboardEvent, range: &DateRange, area_filter: &[String]) -> bool {
    if !range.contains(event.occurred_on) {
        return false;
    }
    area_filter.is_empty() || area_filter.iter().any(|a| a == &event.area)
}

/// Energy-consultant board: distinct Sales / Sits / Opportunities counts
/// grouped by rep or by area, sorted by sales descending (label ascending
/// on ties). An empty `area_filter` means all areas.
pub fn closer_board(
    events: &[LeaderboardEvent],
    range: &DateRange,
    area_filter: &[String],
    dimension: Dimension,
) -> Vec<CloserRow> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for event in events {
        if !in_scope(event, range, area_filter) {
            continue;
        }
        let (label, picture) = match dimension {
            Dimension::Rep => match event.closer.as_deref() {
                Some(closer) => (closer, event.closer_picture.as_deref()),
                None => continue,
            },
            Dimension::Area => (event.area.as_str(), event.area_picture.as_deref()),
        };
        let slot = match event.metric {
            Metric::Sales => 0,
            Metric::Sits => 1,
            Metric::Opportunities => 2,
            Metric::Sets => continue,
        };
        let tally = tallies.entry(label).or_default();
        tally.ids[slot].insert(event.record_id.as_str());
        if tally.picture.is_none() {
            tally.picture = picture;
        }
    }

    let mut rows: Vec<CloserRow> = tallies
        .into_iter()
        .map(|(label, tally)| CloserRow {
            label: label.to_string(),
            picture: tally.picture.map(str::to_string),
            sales: tally.ids[0].len() as u32,
            sits: tally.ids[1].len() as u32,
            opportunities: tally.ids[2].len() as u32,
        })
        .collect();
    rows.sort_by(|a, b| b.sales.cmp(&a.sales).then(a.label.cmp(&b.label)));
    rows
}

/// Field-marketer board: only events credited to a lead generator count.
/// Sales credit as assists; sorted by assists descending.
pub fn field_marketer_board(
    events: &[LeaderboardEvent],
    range: &DateRange,
    area_filter: &[String],
    dimension: Dimension,
) -> Vec<FieldMarketerRow> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for event in events {
        if !in_scope(event, range, area_filter) {
            continue;
        }
        let lead_generator = match event.lead_generator.as_deref() {
            Some(fm) => fm,
            None => continue,
        };
        let (label, picture) = match dimension {
            Dimension::Rep => (lead_generator, event.fm_picture.as_deref()),
            Dimension::Area => (event.area.as_str(), event.area_picture.as_deref()),
        };
        let slot = match event.metric {
            Metric::Sales => 0,
            Metric::Sits => 1,
            Metric::Sets => 2,
            Metric::Opportunities => continue,
        };
        let tally = tallies.entry(label).or_default();
        tally.ids[slot].insert(event.record_id.as_str());
        if tally.picture.is_none() {
            tally.picture = picture;
        }
    }

    let mut rows: Vec<FieldMarketerRow> = tallies
        .into_iter()
        .map(|(label, tally)| FieldMarketerRow {
            label: label.to_string(),
            picture: tally.picture.map(str::to_string),
            assists: tally.ids[0].len() as u32,
            sits: tally.ids[1].len() as u32,
            sets: tally.ids[2].len() as u32,
        })
        .collect();
    rows.sort_by(|a, b| b.assists.cmp(&a.assists).then(a.label.cmp(&b.label)));
    rows
}

/// One sold opportunity with its contract economics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub record_id: String,
    pub sale_date: NaiveDate,
    pub closer: Option<String>,
    pub closer_picture: Option<String>,
    pub area: String,
    pub project_sub_category: Option<String>,
    pub grand_total: f64,
    pub lender_fee_total: f64,
}

impl SaleRecord {
    /// Contract value: the grand total net of lender fees.
    pub fn contract_value(&self) -> f64 {
        self.grand_total - self.lender_fee_total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductCategory {
    Solar,
    Battery,
    Roof,
    Bundled,
}

/// Classify a project sub-category label. `Roof` and every `Reroof*`
/// variant count as roofs; `Solar +*` combinations count as bundled.
pub fn categorize(sub_category: &str) -> Option<ProductCategory> {
    if sub_category == "Solar" {
        Some(ProductCategory::Solar)
    } else if sub_category == "Battery" {
        Some(ProductCategory::Battery)
    } else if sub_category == "Roof" || sub_category.starts_with("Reroof") {
        Some(ProductCategory::Roof)
    } else if sub_category.starts_with("Solar +") {
        Some(ProductCategory::Bundled)
    } else {
        None
    }
}

/// One contract-value-board row: product mix and total contract value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractValueRow {
    pub closer: String,
    pub picture: String,
    pub solar: u32,
    pub batteries: u32,
    pub roofs: u32,
    pub bundled: u32,
    pub contract_value: f64,
}

/// Contract-value board: per closer, distinct sales by product category
/// plus the summed contract value, sorted by contract value descending.
/// Sales without a credited closer are skipped.
pub fn contract_value_board(sales: &[SaleRecord], range: &DateRange) -> Vec<ContractValueRow> {
    struct CvTally<'a> {
        picture: Option<&'a str>,
        seen: BTreeSet<&'a str>,
        categories: [BTreeSet<&'a str>; 4],
        contract_value: f64,
    }

    let mut tallies: BTreeMap<&str, CvTally> = BTreeMap::new();

    for sale in sales {
        if !range.contains(sale.sale_date) {
            continue;
        }
        let closer = match sale.closer.as_deref() {
            Some(closer) => closer,
            None => continue,
        };
        let tally = tallies.entry(closer).or_insert_with(|| CvTally {
            picture: None,
            seen: BTreeSet::new(),
            categories: Default::default(),
            contract_value: 0.0,
        });
        if tally.picture.is_none() {
            tally.picture = sale.closer_picture.as_deref();
        }
        // Each opportunity contributes its contract value once.
        if tally.seen.insert(sale.record_id.as_str()) {
            tally.contract_value += sale.contract_value();
        }
        if let Some(category) = sale.project_sub_category.as_deref().and_then(categorize) {
            let slot = match category {
                ProductCategory::Solar => 0,
                ProductCategory::Battery => 1,
                ProductCategory::Roof => 2,
                ProductCategory::Bundled => 3,
            };
            tally.categories[slot].insert(sale.record_id.as_str());
        }
    }

    let mut rows: Vec<ContractValueRow> = tallies
        .into_iter()
        .map(|(closer, tally)| ContractValueRow {
            closer: closer.to_string(),
            picture: tally
                .picture
                .unwrap_or(crate::areas::DEFAULT_PROFILE_PICTURE)
                .to_string(),
            solar: tally.categories[0].len() as u32,
            batteries: tally.categories[1].len() as u32,
            roofs: tally.categories[2].len() as u32,
            bundled: tally.categories[3].len() as u32,
            contract_value: tally.contract_value,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.contract_value
            .partial_cmp(&a.contract_value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.closer.cmp(&b.closer))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, date: NaiveDate, metric: Metric, closer: &str, area: &str) -> LeaderboardEvent {
        LeaderboardEvent {
            record_id: id.to_string(),
            occurred_on: date,
            metric,
            closer: Some(closer.to_string()),
            closer_picture: Some(format!("https://cdn.example/{closer}.png")),
            lead_generator: Some("Casey Diaz".to_string()),
            fm_picture: None,
            area: area.to_string(),
            area_picture: Some(format!("https://cdn.example/{area}.png")),
        }
    }

    #[test]
    fn closer_board_ranks_by_sales() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let events = vec![
            event("1", day(2024, 6, 3), Metric::Sales, "Avery", "Bend"),
            event("2", day(2024, 6, 4), Metric::Sales, "Avery", "Bend"),
            event("3", day(2024, 6, 4), Metric::Sales, "Blake", "Salem"),
            event("4", day(2024, 6, 4), Metric::Sits, "Blake", "Salem"),
        ];

        let rows = closer_board(&events, &june, &[], Dimension::Rep);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Avery");
        assert_eq!(rows[0].sales, 2);
        assert_eq!(rows[1].label, "Blake");
        assert_eq!(rows[1].sales, 1);
        assert_eq!(rows[1].sits, 1);
    }

    #[test]
    fn closer_board_counts_distinct_ids() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let events = vec![
            event("1", day(2024, 6, 3), Metric::Sales, "Avery", "Bend"),
            event("1", day(2024, 6, 3), Metric::Sales, "Avery", "Bend"),
        ];

        let rows = closer_board(&events, &june, &[], Dimension::Rep);
        assert_eq!(rows[0].sales, 1);
    }

    #[test]
    fn closer_board_area_dimension_and_filter() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let events = vec![
            event("1", day(2024, 6, 3), Metric::Sales, "Avery", "Bend"),
            event("2", day(2024, 6, 4), Metric::Sales, "Blake", "Salem"),
        ];

        let rows = closer_board(&events, &june, &["Bend".to_string()], Dimension::Area);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Bend");
        assert_eq!(rows[0].sales, 1);
    }

    #[test]
    fn closer_board_excludes_out_of_range_events() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let events = vec![event("1", day(2024, 5, 30), Metric::Sales, "Avery", "Bend")];
        assert!(closer_board(&events, &june, &[], Dimension::Rep).is_empty());
    }

    #[test]
    fn ties_break_alphabetically() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let events = vec![
            event("1", day(2024, 6, 3), Metric::Sales, "Blake", "Bend"),
            event("2", day(2024, 6, 3), Metric::Sales, "Avery", "Bend"),
        ];

        let rows = closer_board(&events, &june, &[], Dimension::Rep);
        assert_eq!(rows[0].label, "Avery");
        assert_eq!(rows[1].label, "Blake");
    }

    #[test]
    fn field_marketer_board_credits_sales_as_assists() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let mut sale = event("1", day(2024, 6, 3), Metric::Sales, "Avery", "Bend");
        sale.lead_generator = Some("Casey Diaz".to_string());
        let mut set = event("2", day(2024, 6, 4), Metric::Sets, "Avery", "Bend");
        set.lead_generator = Some("Casey Diaz".to_string());
        let mut uncredited = event("3", day(2024, 6, 4), Metric::Sets, "Avery", "Bend");
        uncredited.lead_generator = None;

        let rows = field_marketer_board(&[sale, set, uncredited], &june, &[], Dimension::Rep);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Casey Diaz");
        assert_eq!(rows[0].assists, 1);
        assert_eq!(rows[0].sets, 1);
    }

    #[test]
    fn categorize_covers_roof_and_bundle_variants() {
        assert_eq!(categorize("Solar"), Some(ProductCategory::Solar));
        assert_eq!(categorize("Battery"), Some(ProductCategory::Battery));
        assert_eq!(categorize("Roof"), Some(ProductCategory::Roof));
        assert_eq!(categorize("Reroof - Composite"), Some(ProductCategory::Roof));
        assert_eq!(categorize("Solar + Roof"), Some(ProductCategory::Bundled));
        assert_eq!(categorize("HVAC"), None);
    }

    fn sale(id: &str, closer: &str, sub: &str, total: f64, fee: f64) -> SaleRecord {
        SaleRecord {
            record_id: id.to_string(),
            sale_date: day(2024, 6, 10),
            closer: Some(closer.to_string()),
            closer_picture: None,
            area: "Bend".to_string(),
            project_sub_category: Some(sub.to_string()),
            grand_total: total,
            lender_fee_total: fee,
        }
    }

    #[test]
    fn contract_value_board_sums_net_value_per_closer() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let sales = vec![
            sale("1", "Avery", "Solar", 30_000.0, 2_000.0),
            sale("2", "Avery", "Solar + Roof", 45_000.0, 3_000.0),
            sale("3", "Blake", "Roof", 20_000.0, 0.0),
        ];

        let rows = contract_value_board(&sales, &june);
        assert_eq!(rows[0].closer, "Avery");
        assert_eq!(rows[0].contract_value, 70_000.0);
        assert_eq!(rows[0].solar, 1);
        assert_eq!(rows[0].bundled, 1);
        assert_eq!(rows[1].closer, "Blake");
        assert_eq!(rows[1].roofs, 1);
        // No closer picture on file falls back to the default artwork.
        assert_eq!(rows[0].picture, crate::areas::DEFAULT_PROFILE_PICTURE);
    }

    #[test]
    fn contract_value_counts_each_record_once() {
        let june = DateRange::calendar_month(2024, 6).unwrap();
        let sales = vec![
            sale("1", "Avery", "Solar", 30_000.0, 2_000.0),
            sale("1", "Avery", "Solar", 30_000.0, 2_000.0),
        ];

        let rows = contract_value_board(&sales, &june);
        assert_eq!(rows[0].contract_value, 28_000.0);
    }

    #[test]
    fn metric_labels_round_trip() {
        for metric in [Metric::Sales, Metric::Sits, Metric::Opportunities, Metric::Sets] {
            assert_eq!(Metric::parse(metric.as_str()), Some(metric));
        }
        assert_eq!(Metric::parse("Installs"), None);
    }
}
