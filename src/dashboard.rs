//! Dashboard service: cached warehouse fetches composed with the
//! aggregation pipeline into the card rows the rendering surface consumes.
//!
//! The service owns no rendering: it returns a tagged Success/Empty/Error
//! result so a collaborator can show cards, an empty-state notice, or an
//! error banner. Fetch failures degrade to `Error`; they never panic.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::areas;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::latency;
use crate::pipeline::{self, AreaPacing, AreaProgress};
use crate::store::{FactSource, GoalSource};
use crate::types::{DateRange, FactRow, GoalPolicy};

/// p95 latency budgets for the two card pages.
const PROGRESS_LATENCY_BUDGET_MS: u128 = 300;
const PACING_LATENCY_BUDGET_MS: u128 = 300;

/// One rendered progress card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCard {
    pub area: String,
    pub actual: u32,
    pub goal: u32,
    pub percent_of_total: f64,
    /// Progress-bar fill percentage, clamped to 100. A zero goal renders
    /// as full.
    pub fill_percent: f64,
    pub reached_goal: bool,
    pub profile_picture: String,
}

/// Result of loading the appointment-progress page.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardResult {
    Success {
        cards: Vec<AreaCard>,
        totals: AreaCard,
    },
    Empty {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Result of loading the sales-pacing page.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PacingResult {
    Success { rows: Vec<AreaPacing> },
    Empty { message: String },
    Error { message: String },
}

/// Composes a fact/goal source with the pipeline for the two card pages.
pub struct Dashboard<S> {
    source: S,
    timezone: Tz,
    policy: GoalPolicy,
    appointment_lookback_days: u32,
    sales_lookback_months: u32,
    appointments: TtlCache<Vec<FactRow>>,
    sales: TtlCache<Vec<FactRow>>,
}

impl<S: FactSource + GoalSource> Dashboard<S> {
    pub fn new(source: S, config: &Config) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            source,
            timezone: config.tz(),
            policy: config.appointment_goal_policy,
            appointment_lookback_days: config.appointment_lookback_days,
            sales_lookback_months: config.sales_lookback_months,
            appointments: TtlCache::new(ttl),
            sales: TtlCache::new(ttl),
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Drop both fetch caches so the next page load refetches.
    pub fn refresh(&self) {
        self.appointments.invalidate();
        self.sales.invalidate();
    }

    /// Appointment progress cards for the selected range, plus the
    /// aggregate "All Areas" card.
    pub fn appointment_progress(&self, range: &DateRange) -> DashboardResult {
        let started = Instant::now();
        let result = self.appointment_progress_inner(range);

        let elapsed_ms = started.elapsed().as_millis();
        latency::record_latency("appointment_progress", elapsed_ms, PROGRESS_LATENCY_BUDGET_MS);
        if elapsed_ms > PROGRESS_LATENCY_BUDGET_MS {
            log::warn!(
                "appointment_progress exceeded latency budget: {}ms > {}ms",
                elapsed_ms,
                PROGRESS_LATENCY_BUDGET_MS
            );
        } else {
            log::debug!("appointment_progress completed in {}ms", elapsed_ms);
        }
        result
    }

    fn appointment_progress_inner(&self, range: &DateRange) -> DashboardResult {
        let as_of = self.today();
        let facts = match self.appointments.get_or_refresh(|| {
            self.source
                .appointments(as_of, self.appointment_lookback_days)
        }) {
            Ok(facts) => facts,
            Err(e) => {
                return DashboardResult::Error {
                    message: format!("Appointment fetch failed: {}", e),
                }
            }
        };

        if facts.is_empty() {
            return DashboardResult::Empty {
                message: "No appointments recorded for this window yet.".to_string(),
            };
        }

        let goals = match self.source.daily_goals() {
            Ok(goals) => goals,
            Err(e) => {
                return DashboardResult::Error {
                    message: format!("Goal table fetch failed: {}", e),
                }
            }
        };

        let rows = pipeline::aggregate(range, &facts, &goals, self.policy);
        let totals = totals_card(&rows);
        let cards = rows.into_iter().map(card_from_progress).collect();

        DashboardResult::Success { cards, totals }
    }

    /// Sales pacing rows for one calendar month.
    pub fn sales_pacing(&self, year: i32, month: u32) -> PacingResult {
        let started = Instant::now();
        let result = self.sales_pacing_inner(year, month);

        let elapsed_ms = started.elapsed().as_millis();
        latency::record_latency("sales_pacing", elapsed_ms, PACING_LATENCY_BUDGET_MS);
        if elapsed_ms > PACING_LATENCY_BUDGET_MS {
            log::warn!(
                "sales_pacing exceeded latency budget: {}ms > {}ms",
                elapsed_ms,
                PACING_LATENCY_BUDGET_MS
            );
        } else {
            log::debug!("sales_pacing completed in {}ms", elapsed_ms);
        }
        result
    }

    fn sales_pacing_inner(&self, year: i32, month: u32) -> PacingResult {
        let range = match DateRange::calendar_month(year, month) {
            Some(range) => range,
            None => {
                return PacingResult::Error {
                    message: format!("Invalid month selection: {}-{}", year, month),
                }
            }
        };

        let as_of = self.today();
        let facts = match self
            .sales
            .get_or_refresh(|| self.source.sales(as_of, self.sales_lookback_months))
        {
            Ok(facts) => facts,
            Err(e) => {
                return PacingResult::Error {
                    message: format!("Sales fetch failed: {}", e),
                }
            }
        };

        if facts.is_empty() {
            return PacingResult::Empty {
                message: "No sales data available for the selected month and year.".to_string(),
            };
        }

        let bands = match self.source.goal_bands() {
            Ok(bands) => bands,
            Err(e) => {
                return PacingResult::Error {
                    message: format!("Goal table fetch failed: {}", e),
                }
            }
        };

        let rows = pipeline::aggregate_with_pacing(&range, &facts, &bands, as_of);
        PacingResult::Success { rows }
    }
}

/// Progress-bar fill: actual/goal as a percentage clamped to 100. A zero
/// goal renders as a full bar.
fn fill_percent(actual: u32, goal: u32) -> f64 {
    if goal == 0 {
        100.0
    } else {
        ((actual as f64 / goal as f64) * 100.0).min(100.0)
    }
}

fn card_from_progress(row: AreaProgress) -> AreaCard {
    let fill = fill_percent(row.actual, row.goal);
    AreaCard {
        area: row.area,
        actual: row.actual,
        goal: row.goal,
        percent_of_total: row.percent_of_total,
        fill_percent: fill,
        reached_goal: fill >= 100.0,
        profile_picture: row.profile_picture,
    }
}

/// The aggregate "All Areas" card: summed actuals against summed goals.
fn totals_card(rows: &[AreaProgress]) -> AreaCard {
    let actual: u32 = rows.iter().map(|r| r.actual).sum();
    let goal: u32 = rows.iter().map(|r| r.goal).sum();
    let fill = fill_percent(actual, goal);
    AreaCard {
        area: "All Areas".to_string(),
        actual,
        goal,
        percent_of_total: pipeline::percent_of(actual, goal),
        fill_percent: fill,
        reached_goal: fill >= 100.0,
        profile_picture: areas::ALL_AREAS_PICTURE.to_string(),
    }
}
