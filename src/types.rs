use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One warehouse event row: an appointment set or a sale made.
///
/// Rows are immutable and already materialized by the fact source; the
/// pipeline never mutates or re-fetches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRow {
    pub area: String,
    pub occurred_on: NaiveDate,
    pub record_id: String,
}

impl FactRow {
    pub fn new(area: impl Into<String>, occurred_on: NaiveDate, record_id: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            occurred_on,
            record_id: record_id.into(),
        }
    }
}

/// Rejected at `DateRange` construction; the pipeline itself assumes a
/// validated range and never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid date range: {start} is after {end}")]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if start > end {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A single date treated as a one-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The full calendar month, first day through last day.
    ///
    /// Returns `None` for an invalid month number or out-of-range year.
    pub fn calendar_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every calendar date in the range, inclusive on both ends.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// How a per-area daily goal is applied across the date grid.
///
/// The two observed policies are intentionally distinct per dashboard
/// variant: unifying them would change historical totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPolicy {
    /// The daily goal applies Monday through Friday; weekend goals are zero.
    #[default]
    Weekdays,
    /// The daily goal applies every calendar day.
    Uniform,
}

impl GoalPolicy {
    /// The goal in effect for one calendar date.
    pub fn goal_for(self, daily_goal: u32, date: NaiveDate) -> u32 {
        match self {
            GoalPolicy::Uniform => daily_goal,
            GoalPolicy::Weekdays => {
                if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                    0
                } else {
                    daily_goal
                }
            }
        }
    }
}
