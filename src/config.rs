//! Deployment configuration loaded from `~/.goalboard/config.json`.
//!
//! Every tunable has a serde default so a minimal file only names the
//! warehouse mirror path. The goal-application policy is configured per
//! deployment and defaults to weekend zeroing, matching the appointments
//! dashboard; the sales pacing page always applies goals uniformly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::GoalPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub warehouse_path: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_appointment_lookback_days")]
    pub appointment_lookback_days: u32,
    #[serde(default = "default_sales_lookback_months")]
    pub sales_lookback_months: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub appointment_goal_policy: GoalPolicy,
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_appointment_lookback_days() -> u32 {
    30
}

fn default_sales_lookback_months() -> u32 {
    6
}

fn default_cache_ttl_secs() -> u64 {
    600
}

impl Config {
    /// The configured timezone, falling back to Pacific time when the
    /// string does not parse.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone
            .parse()
            .unwrap_or(chrono_tz::America::Los_Angeles)
    }
}

/// Get the canonical config file path (~/.goalboard/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".goalboard").join("config.json"))
}

/// Load configuration from ~/.goalboard/config.json
pub fn load_config() -> Result<Config, String> {
    load_config_from(&config_path()?)
}

/// Load and validate a config file at an explicit path. Useful for testing.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"warehousePath\": \"/path/to/warehouse.db\" }}",
            path.display()
        ));
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    // Validate the warehouse mirror exists
    let warehouse_path = Path::new(&config.warehouse_path);
    if !warehouse_path.exists() {
        return Err(format!(
            "Warehouse mirror does not exist: {}",
            config.warehouse_path
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let warehouse = dir.path().join("warehouse.db");
        fs::write(&warehouse, b"").unwrap();

        let body = format!("{{\"warehousePath\": {:?}}}", warehouse.to_string_lossy());
        let path = write_config(dir.path(), &body);

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.timezone, "America/Los_Angeles");
        assert_eq!(config.appointment_lookback_days, 30);
        assert_eq!(config.sales_lookback_months, 6);
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.appointment_goal_policy, GoalPolicy::Weekdays);
    }

    #[test]
    fn uniform_policy_parses() {
        let dir = tempfile::tempdir().unwrap();
        let warehouse = dir.path().join("warehouse.db");
        fs::write(&warehouse, b"").unwrap();

        let body = format!(
            "{{\"warehousePath\": {:?}, \"appointmentGoalPolicy\": \"uniform\", \"cacheTtlSecs\": 60}}",
            warehouse.to_string_lossy()
        );
        let path = write_config(dir.path(), &body);

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.appointment_goal_policy, GoalPolicy::Uniform);
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("config.json")).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn missing_warehouse_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{\"warehousePath\": \"/nonexistent/warehouse.db\"}");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn bad_timezone_falls_back_to_pacific() {
        let config = Config {
            warehouse_path: String::new(),
            timezone: "Mars/Olympus_Mons".to_string(),
            appointment_lookback_days: 30,
            sales_lookback_months: 6,
            cache_ttl_secs: 600,
            appointment_goal_policy: GoalPolicy::Weekdays,
        };
        assert_eq!(config.tz(), chrono_tz::America::Los_Angeles);
    }
}
