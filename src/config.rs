use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "ODDBET_CONFIG";

/// Tunable engine constants. Every field falls back to its default when a
/// config file or environment variable leaves it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Matches per team before the season rolls over.
    pub season_match_cap: u32,
    pub four_goal_warning: u32,
    pub four_goal_critical: u32,
    pub three_goal_warning: u32,
    pub three_goal_critical: u32,
    /// Length of the recent-form window in the league table.
    pub form_window: usize,
    /// Rows kept by the "recent matches" and counter board views.
    pub recent_window: usize,
    /// Meetings listed in a head-to-head summary.
    pub head_to_head_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            season_match_cap: 38,
            four_goal_warning: 8,
            four_goal_critical: 10,
            three_goal_warning: 7,
            three_goal_critical: 9,
            form_window: 5,
            recent_window: 10,
            head_to_head_window: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            season_match_cap: env_or_default("ODDBET_SEASON_CAP", d.season_match_cap),
            four_goal_warning: env_or_default("ODDBET_FOUR_GOAL_WARNING", d.four_goal_warning),
            four_goal_critical: env_or_default("ODDBET_FOUR_GOAL_CRITICAL", d.four_goal_critical),
            three_goal_warning: env_or_default("ODDBET_THREE_GOAL_WARNING", d.three_goal_warning),
            three_goal_critical: env_or_default(
                "ODDBET_THREE_GOAL_CRITICAL",
                d.three_goal_critical,
            ),
            form_window: env_or_default("ODDBET_FORM_WINDOW", d.form_window),
            recent_window: env_or_default("ODDBET_RECENT_WINDOW", d.recent_window),
            head_to_head_window: env_or_default("ODDBET_H2H_WINDOW", d.head_to_head_window),
        }
        .sanitized()
    }

    /// The JSON file named by `ODDBET_CONFIG` when set, otherwise the
    /// environment variables. Both binaries resolve their settings here.
    pub fn from_env_or_file() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        Self::resolve(path.as_deref().map(Path::new))
    }

    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::from_env()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Windows and the cap stay at least 1; a critical threshold never sits
    /// below its warning threshold.
    pub fn sanitized(mut self) -> Self {
        self.season_match_cap = self.season_match_cap.max(1);
        self.form_window = self.form_window.max(1);
        self.recent_window = self.recent_window.max(1);
        self.head_to_head_window = self.head_to_head_window.max(1);
        self.four_goal_critical = self.four_goal_critical.max(self.four_goal_warning);
        self.three_goal_critical = self.three_goal_critical.max(self.three_goal_warning);
        self
    }
}

fn env_or_default<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
