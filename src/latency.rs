//! Bounded in-memory latency rollups for dashboard queries.
//!
//! Keeps a small sample window per query so p95 diagnostics can be
//! surfaced without persistent storage. Recording never blocks a query:
//! a poisoned lock just drops the sample.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock};

const MAX_SAMPLES_PER_QUERY: usize = 256;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRollup {
    pub query: String,
    pub sample_count: usize,
    pub p50_ms: u128,
    pub p95_ms: u128,
    pub max_ms: u128,
    pub budget_ms: u128,
    pub budget_violations: u64,
}

#[derive(Debug, Default)]
struct QueryWindow {
    samples_ms: VecDeque<u128>,
    budget_ms: u128,
    budget_violations: u64,
}

#[derive(Default)]
struct LatencyRecorder {
    windows: Mutex<HashMap<String, QueryWindow>>,
}

impl LatencyRecorder {
    fn global() -> &'static Self {
        static RECORDER: OnceLock<LatencyRecorder> = OnceLock::new();
        RECORDER.get_or_init(Self::default)
    }

    fn record_sample(&self, query: &str, elapsed_ms: u128, budget_ms: u128) {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        let window = windows.entry(query.to_string()).or_default();
        window.budget_ms = budget_ms;
        if elapsed_ms > budget_ms {
            window.budget_violations += 1;
        }
        if window.samples_ms.len() >= MAX_SAMPLES_PER_QUERY {
            window.samples_ms.pop_front();
        }
        window.samples_ms.push_back(elapsed_ms);
    }

    fn snapshot(&self) -> Vec<QueryRollup> {
        let windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };

        let mut rollups: Vec<QueryRollup> = windows
            .iter()
            .map(|(query, window)| {
                let mut values: Vec<u128> = window.samples_ms.iter().copied().collect();
                values.sort_unstable();
                QueryRollup {
                    query: query.clone(),
                    sample_count: values.len(),
                    p50_ms: percentile(&values, 50.0).unwrap_or(0),
                    p95_ms: percentile(&values, 95.0).unwrap_or(0),
                    max_ms: values.last().copied().unwrap_or(0),
                    budget_ms: window.budget_ms,
                    budget_violations: window.budget_violations,
                }
            })
            .collect();

        rollups.sort_by(|a, b| b.p95_ms.cmp(&a.p95_ms).then_with(|| a.query.cmp(&b.query)));
        rollups
    }
}

fn percentile(values: &[u128], p: f64) -> Option<u128> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let rank = ((p / 100.0) * n as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(n - 1);
    Some(values[idx])
}

pub fn record_latency(query: &str, elapsed_ms: u128, budget_ms: u128) {
    LatencyRecorder::global().record_sample(query, elapsed_ms, budget_ms);
}

/// Current rollups, slowest p95 first.
pub fn rollups() -> Vec<QueryRollup> {
    LatencyRecorder::global().snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 95.0), None);
    }

    #[test]
    fn percentile_of_small_samples() {
        let values = vec![10_u128, 20, 30];
        assert_eq!(percentile(&values, 50.0), Some(20));
        assert_eq!(percentile(&values, 95.0), Some(30));
    }

    #[test]
    fn window_evicts_oldest_samples() {
        let recorder = LatencyRecorder::default();
        for ms in 1..=300 {
            recorder.record_sample("progress", ms, 100);
        }
        let snapshot = recorder.snapshot();
        let rollup = snapshot.iter().find(|r| r.query == "progress").unwrap();
        assert_eq!(rollup.sample_count, MAX_SAMPLES_PER_QUERY);
        assert_eq!(rollup.max_ms, 300);
    }

    #[test]
    fn violations_count_only_over_budget() {
        let recorder = LatencyRecorder::default();
        recorder.record_sample("pacing", 95, 100);
        recorder.record_sample("pacing", 100, 100);
        recorder.record_sample("pacing", 101, 100);

        let snapshot = recorder.snapshot();
        let rollup = snapshot.iter().find(|r| r.query == "pacing").unwrap();
        assert_eq!(rollup.budget_violations, 1);
    }
}
