use std::collections::HashMap;

use serde::Serialize;

use crate::state::{FormCode, LeagueRow, MatchRecord, MatchResult, SeasonState};
use crate::teams::Team;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub avg_gf: f64,
    pub avg_ga: f64,
    pub bts_rate: f64,
    pub form: Vec<FormCode>,
    pub points_per_game: f64,
}

/// Per-team rate metrics for the current season.
///
/// The both-teams-scored rate counts qualifying games across the whole match
/// log but divides by this season's `played`. After a rollover the log still
/// holds earlier seasons, so the rate can exceed 100.
pub fn team_metrics(state: &SeasonState) -> HashMap<Team, TeamMetrics> {
    Team::all()
        .map(|team| (team, metrics_for(state, team)))
        .collect()
}

pub fn metrics_for(state: &SeasonState, team: Team) -> TeamMetrics {
    let stats = state.stats(team);
    let played = stats.played as f64;
    let per_game = |value: u32| {
        if stats.played > 0 {
            value as f64 / played
        } else {
            0.0
        }
    };

    let bts_matches = state
        .history()
        .iter()
        .filter(|m| m.involves(team) && m.both_teams_scored)
        .count() as u32;

    TeamMetrics {
        win_rate: round1(per_game(stats.won) * 100.0),
        draw_rate: round1(per_game(stats.drawn) * 100.0),
        loss_rate: round1(per_game(stats.lost) * 100.0),
        avg_gf: round2(per_game(stats.goals_for)),
        avg_ga: round2(per_game(stats.goals_against)),
        bts_rate: round1(per_game(bts_matches) * 100.0),
        form: stats.form.iter().copied().collect(),
        points_per_game: round2(per_game(stats.points)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub total_matches: usize,
    /// Wins for the side passed as `home`, whatever venue they played at.
    pub home_wins: usize,
    pub away_wins: usize,
    pub draws: usize,
    pub avg_goals: f64,
    pub over_2_5: usize,
    pub over_3_5: usize,
    pub both_teams_score: usize,
    pub over_2_5_pct: f64,
    pub over_3_5_pct: f64,
    pub both_teams_score_pct: f64,
    /// Latest meetings, newest first, capped by the head-to-head window.
    pub recent: Vec<MatchRecord>,
}

pub fn head_to_head(state: &SeasonState, home: Team, away: Team) -> Option<HeadToHead> {
    let meetings: Vec<&MatchRecord> = state
        .history()
        .iter()
        .filter(|m| m.is_between(home, away))
        .collect();
    if meetings.is_empty() {
        return None;
    }

    let mut h2h = HeadToHead {
        total_matches: meetings.len(),
        home_wins: 0,
        away_wins: 0,
        draws: 0,
        avg_goals: 0.0,
        over_2_5: 0,
        over_3_5: 0,
        both_teams_score: 0,
        over_2_5_pct: 0.0,
        over_3_5_pct: 0.0,
        both_teams_score_pct: 0.0,
        recent: meetings
            .iter()
            .rev()
            .take(state.config().head_to_head_window)
            .map(|m| (*m).clone())
            .collect(),
    };

    let mut total_goals = 0u32;
    for m in &meetings {
        total_goals += m.total_goals;
        let result = if m.home_team == home {
            m.result
        } else {
            swap_perspective(m.result)
        };
        match result {
            MatchResult::HomeWin => h2h.home_wins += 1,
            MatchResult::AwayWin => h2h.away_wins += 1,
            MatchResult::Draw => h2h.draws += 1,
        }
        if m.total_goals > 2 {
            h2h.over_2_5 += 1;
        }
        if m.total_goals > 3 {
            h2h.over_3_5 += 1;
        }
        if m.both_teams_scored {
            h2h.both_teams_score += 1;
        }
    }

    let n = meetings.len() as f64;
    h2h.avg_goals = round2(total_goals as f64 / n);
    h2h.over_2_5_pct = round1(h2h.over_2_5 as f64 / n * 100.0);
    h2h.over_3_5_pct = round1(h2h.over_3_5 as f64 / n * 100.0);
    h2h.both_teams_score_pct = round1(h2h.both_teams_score as f64 / n * 100.0);
    Some(h2h)
}

fn swap_perspective(result: MatchResult) -> MatchResult {
    match result {
        MatchResult::HomeWin => MatchResult::AwayWin,
        MatchResult::AwayWin => MatchResult::HomeWin,
        MatchResult::Draw => MatchResult::Draw,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueInsights {
    pub best_attack: LeagueRow,
    pub best_defense: LeagueRow,
    pub best_goal_difference: LeagueRow,
    pub leader: LeagueRow,
}

/// Standout clubs of the current table. Ties go to the higher-placed club.
pub fn league_insights(state: &SeasonState) -> Option<LeagueInsights> {
    let table = state.league_table();
    let first = table.first()?;

    let mut best_attack = first;
    let mut best_defense = first;
    let mut best_gd = first;
    let mut leader = first;
    for row in &table[1..] {
        if row.goals_for > best_attack.goals_for {
            best_attack = row;
        }
        if row.goals_against < best_defense.goals_against {
            best_defense = row;
        }
        if row.goal_difference > best_gd.goal_difference {
            best_gd = row;
        }
        if row.points > leader.points {
            leader = row;
        }
    }

    Some(LeagueInsights {
        best_attack: best_attack.clone(),
        best_defense: best_defense.clone(),
        best_goal_difference: best_gd.clone(),
        leader: leader.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub matches: usize,
    pub avg_goals: f64,
    pub home_wins: usize,
    pub draws: usize,
    pub away_wins: usize,
}

/// Quick stats over the current season's part of the match log.
pub fn season_summary(state: &SeasonState) -> Option<SeasonSummary> {
    let season = state.season_number();
    let current: Vec<&MatchRecord> = state
        .history()
        .iter()
        .filter(|m| m.season_number == season)
        .collect();
    if current.is_empty() {
        return None;
    }

    let goals: u32 = current.iter().map(|m| m.total_goals).sum();
    let count_of = |result: MatchResult| current.iter().filter(|m| m.result == result).count();
    Some(SeasonSummary {
        season_number: season,
        matches: current.len(),
        avg_goals: round2(goals as f64 / current.len() as f64),
        home_wins: count_of(MatchResult::HomeWin),
        draws: count_of(MatchResult::Draw),
        away_wins: count_of(MatchResult::AwayWin),
    })
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
