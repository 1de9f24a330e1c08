//! SQLite mirror of the warehouse tables the dashboard reads.
//!
//! The warehouse itself stays authoritative; an external sync job
//! refreshes the mirror at `~/.goalboard/warehouse.db` and this module
//! only reads it. Queries reproduce the filters the upstream reporting
//! views applied: lookback windows, the area allow-list, lead-generator
//! presence for appointments, and positive totals for sales.

use std::path::PathBuf;

use chrono::{Duration, Months, NaiveDate};
use rusqlite::{params, Connection};

use crate::areas;
use crate::error::StoreError;
use crate::goals::{AreaGoalRow, BandTable, GoalTable};
use crate::gold_standard::RepSnapshot;
use crate::leaderboard::{LeaderboardEvent, Metric, SaleRecord};
use crate::types::FactRow;

/// Fetches already-materialized fact rows for a lookback window.
pub trait FactSource {
    fn appointments(&self, as_of: NaiveDate, lookback_days: u32) -> Result<Vec<FactRow>, StoreError>;
    fn sales(&self, as_of: NaiveDate, lookback_months: u32) -> Result<Vec<FactRow>, StoreError>;
}

/// Supplies the per-area goal tables.
pub trait GoalSource {
    fn daily_goals(&self) -> Result<GoalTable, StoreError>;
    fn goal_bands(&self) -> Result<BandTable, StoreError>;
}

/// SQLite connection wrapper for the warehouse mirror.
///
/// Intentionally not `Clone` or `Sync`; callers own serialization of
/// access, and the dashboard's TTL caches keep read traffic low.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the mirror at `~/.goalboard/warehouse.db` and
    /// apply the schema.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(Self::default_path()?)
    }

    /// Open a mirror at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for concurrent readers while the sync job writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        // Schema is idempotent (IF NOT EXISTS throughout)
        conn.execute_batch(include_str!("schema.sql"))?;

        Ok(Self { conn })
    }

    /// Fully in-memory mirror for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn default_path() -> Result<PathBuf, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::HomeDirNotFound)?;
        Ok(home.join(".goalboard").join("warehouse.db"))
    }

    /// The per-area goal rows feeding both goal tables.
    pub fn area_goals(&self) -> Result<Vec<AreaGoalRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT area, sets_goal, min_goal, max_goal FROM area_goals ORDER BY area")?;
        let rows = stmt.query_map([], |row| {
            Ok(AreaGoalRow {
                area: row.get(0)?,
                sets_goal: row.get::<_, i64>(1)?.max(0) as u32,
                min_goal: row.get::<_, i64>(2)?.max(0) as u32,
                max_goal: row.get::<_, i64>(3)?.max(0) as u32,
            })
        })?;

        let mut goals = Vec::new();
        for row in rows {
            goals.push(row?);
        }
        Ok(goals)
    }

    /// Metric-tagged leaderboard events, unknown metrics skipped.
    pub fn leaderboard_events(&self) -> Result<Vec<LeaderboardEvent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, metric, closer, closer_picture_link,
                    lead_generator, fm_picture_link, area, area_picture_link
             FROM leaderboard_events
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, date, metric, closer, closer_picture, lead_generator, fm_picture, area, area_picture) =
                row?;
            let metric = match Metric::parse(&metric) {
                Some(metric) => metric,
                None => {
                    log::warn!("skipping leaderboard event {id}: unknown metric {metric}");
                    continue;
                }
            };
            let occurred_on = match parse_day(&date) {
                Some(day) => day,
                None => {
                    log::warn!("skipping leaderboard event {id}: bad date {date}");
                    continue;
                }
            };
            events.push(LeaderboardEvent {
                record_id: id,
                occurred_on,
                metric,
                closer,
                closer_picture,
                lead_generator,
                fm_picture,
                area,
                area_picture,
            });
        }
        Ok(events)
    }

    /// Sold opportunities with contract economics for the value board.
    pub fn sales_records(&self, as_of: NaiveDate, lookback_months: u32) -> Result<Vec<SaleRecord>, StoreError> {
        let cutoff = month_cutoff(as_of, lookback_months);
        let mut stmt = self.conn.prepare(
            "SELECT id, sale_date, closer, closer_picture_link, area,
                    project_sub_category, grand_total, IFNULL(lender_fee_total, 0)
             FROM opportunities
             WHERE sale_date IS NOT NULL
               AND date(sale_date) >= date(?1)
               AND grand_total > 0
               AND area IS NOT NULL
             ORDER BY sale_date ASC",
        )?;
        let rows = stmt.query_map(params![cutoff.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, f64>(7)?,
            ))
        })?;

        let mut sales = Vec::new();
        for row in rows {
            let (id, sale_date, closer, closer_picture, area, sub_category, grand_total, lender_fee) =
                row?;
            let sale_date = match parse_day(&sale_date) {
                Some(day) => day,
                None => {
                    log::warn!("skipping sale {id}: bad sale_date {sale_date}");
                    continue;
                }
            };
            sales.push(SaleRecord {
                record_id: id,
                sale_date,
                closer,
                closer_picture,
                area,
                project_sub_category: sub_category,
                grand_total,
                lender_fee_total: lender_fee,
            });
        }
        Ok(sales)
    }

    /// All dated team-member snapshots for the gold-standard page.
    pub fn rep_snapshots(&self) -> Result<Vec<RepSnapshot>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, effective_date, current_month_sales, current_month_assists,
                    previous_month_sales, previous_month_assists, picture_link
             FROM team_member_snapshots
             ORDER BY name ASC, effective_date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (name, effective, cur_sales, cur_assists, prev_sales, prev_assists, picture) = row?;
            let effective_date = match parse_day(&effective) {
                Some(day) => day,
                None => {
                    log::warn!("skipping snapshot for {name}: bad effective_date {effective}");
                    continue;
                }
            };
            snapshots.push(RepSnapshot {
                name,
                effective_date,
                current_month_sales: cur_sales.max(0) as u32,
                current_month_assists: cur_assists.max(0) as u32,
                previous_month_sales: prev_sales.max(0) as u32,
                previous_month_assists: prev_assists.max(0) as u32,
                picture_link: picture,
            });
        }
        Ok(snapshots)
    }
}

impl FactSource for Warehouse {
    /// Appointments set within the lookback window. The area falls back to
    /// the field marketer's area when the opportunity has none, and rows
    /// without a lead generator never count as sets.
    fn appointments(&self, as_of: NaiveDate, lookback_days: u32) -> Result<Vec<FactRow>, StoreError> {
        let cutoff = as_of - Duration::days(lookback_days as i64);
        let mut stmt = self.conn.prepare(
            "SELECT id, area, fm_area, created_at
             FROM opportunities
             WHERE date(created_at) >= date(?1)
               AND lead_generator IS NOT NULL
             ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![cutoff.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut facts = Vec::new();
        for row in rows {
            let (id, area, fm_area, created_at) = row?;
            let area = match area.or(fm_area) {
                Some(area) => area,
                None => continue,
            };
            if !areas::is_operating_area(&area) {
                continue;
            }
            let occurred_on = match parse_day(&created_at) {
                Some(day) => day,
                None => {
                    log::warn!("skipping opportunity {id}: bad created_at {created_at}");
                    continue;
                }
            };
            facts.push(FactRow {
                area,
                occurred_on,
                record_id: id,
            });
        }
        Ok(facts)
    }

    /// Sales closed within the lookback window; only funded deals count.
    fn sales(&self, as_of: NaiveDate, lookback_months: u32) -> Result<Vec<FactRow>, StoreError> {
        let cutoff = month_cutoff(as_of, lookback_months);
        let mut stmt = self.conn.prepare(
            "SELECT id, area, sale_date
             FROM opportunities
             WHERE sale_date IS NOT NULL
               AND date(sale_date) >= date(?1)
               AND grand_total > 0
               AND area IS NOT NULL
             ORDER BY sale_date ASC",
        )?;
        let rows = stmt.query_map(params![cutoff.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut facts = Vec::new();
        for row in rows {
            let (id, area, sale_date) = row?;
            if !areas::is_operating_area(&area) {
                continue;
            }
            let occurred_on = match parse_day(&sale_date) {
                Some(day) => day,
                None => {
                    log::warn!("skipping sale {id}: bad sale_date {sale_date}");
                    continue;
                }
            };
            facts.push(FactRow {
                area,
                occurred_on,
                record_id: id,
            });
        }
        Ok(facts)
    }
}

impl GoalSource for Warehouse {
    fn daily_goals(&self) -> Result<GoalTable, StoreError> {
        Ok(GoalTable::from_rows(&self.area_goals()?))
    }

    fn goal_bands(&self) -> Result<BandTable, StoreError> {
        Ok(BandTable::from_rows(&self.area_goals()?))
    }
}

/// First calendar day of the lookback window.
fn month_cutoff(as_of: NaiveDate, lookback_months: u32) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(lookback_months))
        .unwrap_or(as_of)
}

/// Read the date part of an ISO date or datetime string.
fn parse_day(value: &str) -> Option<NaiveDate> {
    let day = value.get(0..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
