use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::metrics::round1;
use crate::state::{MatchRecord, SeasonState};
use crate::teams::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CounterKind {
    /// Reset by a game with exactly four goals.
    FourGoal,
    /// Reset by a game with exactly three goals.
    ThreeGoal,
}

impl CounterKind {
    pub const ALL: [CounterKind; 2] = [CounterKind::FourGoal, CounterKind::ThreeGoal];

    pub fn trigger_total(self) -> u32 {
        match self {
            CounterKind::FourGoal => 4,
            CounterKind::ThreeGoal => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CounterKind::FourGoal => "4-goal",
            CounterKind::ThreeGoal => "3-goal",
        }
    }

    pub fn thresholds(self, cfg: &EngineConfig) -> (u32, u32) {
        match self {
            CounterKind::FourGoal => (cfg.four_goal_warning, cfg.four_goal_critical),
            CounterKind::ThreeGoal => (cfg.three_goal_warning, cfg.three_goal_critical),
        }
    }

    pub fn live_value(self, state: &SeasonState, team: Team) -> u32 {
        let c = state.counters(team);
        match self {
            CounterKind::FourGoal => c.four_goal,
            CounterKind::ThreeGoal => c.three_goal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakPattern {
    pub team: Team,
    pub kind: CounterKind,
    pub matches: usize,
    pub resets: usize,
    /// Run lengths that ended in a reset, oldest first.
    pub completed: Vec<u32>,
    pub average_streak: f64,
    pub max_streak: u32,
    pub hit_rate: f64,
    pub current: u32,
}

/// Replay the full match log for one club and counter. Runs restart at each
/// season boundary (as the live counter does) without being counted as
/// completed streaks.
pub fn streak_pattern(state: &SeasonState, team: Team, kind: CounterKind) -> StreakPattern {
    let mut run = 0u32;
    let mut season: Option<u32> = None;
    let mut matches = 0usize;
    let mut completed = Vec::new();

    for m in state.history().iter().filter(|m| m.involves(team)) {
        if season != Some(m.season_number) {
            season = Some(m.season_number);
            run = 0;
        }
        matches += 1;
        if m.total_goals == kind.trigger_total() {
            completed.push(run);
            run = 0;
        } else {
            run += 1;
        }
    }

    let resets = completed.len();
    let average_streak = if resets > 0 {
        round1(completed.iter().sum::<u32>() as f64 / resets as f64)
    } else {
        0.0
    };
    let hit_rate = if matches > 0 {
        round1(resets as f64 / matches as f64 * 100.0)
    } else {
        0.0
    };

    StreakPattern {
        team,
        kind,
        matches,
        resets,
        max_streak: completed.iter().copied().max().unwrap_or(0),
        completed,
        average_streak,
        hit_rate,
        current: kind.live_value(state, team),
    }
}

/// Both counters' patterns for one club.
pub fn historical_streak_patterns(
    state: &SeasonState,
    team: Team,
) -> HashMap<CounterKind, StreakPattern> {
    CounterKind::ALL
        .iter()
        .map(|kind| (*kind, streak_pattern(state, team, *kind)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterAlert {
    pub team: Team,
    pub kind: CounterKind,
    pub current: u32,
    pub level: AlertLevel,
    pub threshold: u32,
    pub average_streak: f64,
    pub max_streak: u32,
    pub hit_rate: f64,
    /// Rough chance the counter resets next match, in percent.
    pub reset_probability: f64,
    pub message: String,
}

pub fn alert_for(pattern: &StreakPattern, cfg: &EngineConfig) -> Option<CounterAlert> {
    let (warning, critical) = pattern.kind.thresholds(cfg);
    let (level, threshold) = if pattern.current >= critical {
        (AlertLevel::Critical, critical)
    } else if pattern.current >= warning {
        (AlertLevel::Warning, warning)
    } else {
        return None;
    };

    let reset_probability = reset_probability(pattern);
    let message = format!(
        "{level}: {} {} counter at {} (avg {:.1}, max {}, hit rate {:.1}%) - reset chance {:.1}%",
        pattern.team,
        pattern.kind.label(),
        pattern.current,
        pattern.average_streak,
        pattern.max_streak,
        pattern.hit_rate,
        reset_probability,
    );

    Some(CounterAlert {
        team: pattern.team,
        kind: pattern.kind,
        current: pattern.current,
        level,
        threshold,
        average_streak: pattern.average_streak,
        max_streak: pattern.max_streak,
        hit_rate: pattern.hit_rate,
        reset_probability,
        message,
    })
}

// Heuristic: how far the live run has outgrown the usual gap between resets.
fn reset_probability(pattern: &StreakPattern) -> f64 {
    let raw = if pattern.average_streak > 0.0 {
        pattern.current as f64 / pattern.average_streak * 50.0
    } else {
        pattern.hit_rate
    };
    round1(raw.clamp(10.0, 95.0))
}

/// Threshold alerts for every club and both counters, most urgent first.
pub fn counter_alerts(state: &SeasonState) -> Vec<CounterAlert> {
    let cfg = state.config();
    let mut alerts: Vec<CounterAlert> = Team::all()
        .flat_map(|team| CounterKind::ALL.map(|kind| (team, kind)))
        .filter_map(|(team, kind)| alert_for(&streak_pattern(state, team, kind), cfg))
        .collect();
    alerts.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then(b.current.cmp(&a.current))
            .then(a.team.cmp(&b.team))
    });
    alerts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterBoardRow {
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub four_goal_display: String,
    pub three_goal_display: String,
    /// The home club's 3-goal counter right after this game.
    pub three_goal_home: u32,
}

impl From<&MatchRecord> for CounterBoardRow {
    fn from(m: &MatchRecord) -> Self {
        Self {
            home_team: m.home_team,
            away_team: m.away_team,
            home_score: m.home_score,
            away_score: m.away_score,
            four_goal_display: m.four_goal_display.clone(),
            three_goal_display: m.three_goal_display.clone(),
            three_goal_home: m.three_goal_home,
        }
    }
}

/// Latest game of each distinct pairing (home/away order ignored), newest
/// first, capped by the recent window.
pub fn counter_board(state: &SeasonState) -> Vec<CounterBoardRow> {
    let mut seen: Vec<(Team, Team)> = Vec::new();
    let mut rows = Vec::new();
    for m in state.history().iter().rev() {
        if rows.len() >= state.config().recent_window {
            break;
        }
        let key = if m.home_team <= m.away_team {
            (m.home_team, m.away_team)
        } else {
            (m.away_team, m.home_team)
        };
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        rows.push(CounterBoardRow::from(m));
    }
    rows
}
