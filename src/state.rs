use std::collections::VecDeque;
use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::parsing::{self, ParseError, ParsedMatch};
use crate::teams::{Team, TEAM_COUNT};

const MAX_LOGS: usize = 200;
const ERROR_LOG_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "Home Win")]
    HomeWin,
    #[serde(rename = "Away Win")]
    AwayWin,
    #[serde(rename = "Draw")]
    Draw,
}

impl MatchResult {
    pub fn from_scores(home_score: u32, away_score: u32) -> Self {
        if home_score > away_score {
            MatchResult::HomeWin
        } else if away_score > home_score {
            MatchResult::AwayWin
        } else {
            MatchResult::Draw
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchResult::HomeWin => "Home Win",
            MatchResult::AwayWin => "Away Win",
            MatchResult::Draw => "Draw",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "Home Win" => Some(MatchResult::HomeWin),
            "Away Win" => Some(MatchResult::AwayWin),
            "Draw" => Some(MatchResult::Draw),
            _ => None,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormCode {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FormCode::Win => "W",
            FormCode::Draw => "D",
            FormCode::Loss => "L",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamSeasonStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// Oldest first, bounded by the configured form window.
    pub form: VecDeque<FormCode>,
}

impl TeamSeasonStats {
    fn record(&mut self, scored: u32, conceded: u32, form_window: usize) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;

        let code = if scored > conceded {
            self.won += 1;
            self.points += 3;
            FormCode::Win
        } else if scored < conceded {
            self.lost += 1;
            FormCode::Loss
        } else {
            self.drawn += 1;
            self.points += 1;
            FormCode::Draw
        };

        self.form.push_back(code);
        while self.form.len() > form_window {
            self.form.pop_front();
        }
    }

    /// Space-joined form codes, or "No matches" before the first game.
    pub fn form_string(&self) -> String {
        if self.form.is_empty() {
            return "No matches".to_string();
        }
        self.form
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn ranking_key(&self) -> (u32, i32, u32) {
        (self.points, self.goal_difference, self.goals_for)
    }
}

/// Live streak counters for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamCounters {
    /// Matches since the team was last in a 4-goal game.
    pub four_goal: u32,
    /// Matches since the team was last in a 3-goal game.
    pub three_goal: u32,
    // Legacy "games since last won" columns; same 4-goal rule split by venue.
    pub home_role: u32,
    pub away_role: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: u32,
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub total_goals: u32,
    pub total_goals_label: String,
    pub result: MatchResult,
    pub goal_difference: i32,
    pub both_teams_scored: bool,
    pub over_2_5: bool,
    pub home_rank: usize,
    pub away_rank: usize,
    pub legacy_home_counter: u32,
    pub legacy_away_counter: u32,
    pub four_goal_home: u32,
    pub four_goal_away: u32,
    pub three_goal_home: u32,
    pub three_goal_away: u32,
    pub four_goal_display: String,
    pub three_goal_display: String,
    pub season_number: u32,
    pub season_label: String,
}

impl MatchRecord {
    pub fn involves(&self, team: Team) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn is_between(&self, a: Team, b: Team) -> bool {
        (self.home_team == a && self.away_team == b) || (self.home_team == b && self.away_team == a)
    }

    pub fn over_under_label(&self) -> &'static str {
        if self.over_2_5 { "Over 2.5" } else { "Under 2.5" }
    }

    pub fn both_teams_scored_label(&self) -> &'static str {
        if self.both_teams_scored { "Yes" } else { "No" }
    }
}

/// "Won" for a 4-goal game, a tick for a 3-goal game, the plain total otherwise.
pub fn total_goals_label(total_goals: u32) -> String {
    match total_goals {
        4 => "Won".to_string(),
        3 => "3 ✔".to_string(),
        n => n.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueRow {
    pub pos: usize,
    pub team: Team,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub form: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub added: usize,
    pub rollovers: usize,
}

/// All mutable session data: standings, counters and the match log.
#[derive(Debug, Clone)]
pub struct SeasonState {
    config: EngineConfig,
    season_number: u32,
    next_match_id: u32,
    history: Vec<MatchRecord>,
    stats: Vec<TeamSeasonStats>,
    counters: Vec<TeamCounters>,
    pub logs: VecDeque<String>,
}

impl Default for SeasonState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SeasonState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
            season_number: 1,
            next_match_id: 1,
            history: Vec::new(),
            stats: vec![TeamSeasonStats::default(); TEAM_COUNT],
            counters: vec![TeamCounters::default(); TEAM_COUNT],
            logs: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn season_number(&self) -> u32 {
        self.season_number
    }

    pub fn season_label(&self) -> String {
        format!("Season {}", self.season_number)
    }

    pub fn next_match_id(&self) -> u32 {
        self.next_match_id
    }

    /// Every applied match, oldest first, across all seasons.
    pub fn history(&self) -> &[MatchRecord] {
        &self.history
    }

    pub fn stats(&self, team: Team) -> &TeamSeasonStats {
        &self.stats[team.index()]
    }

    pub fn counters(&self, team: Team) -> TeamCounters {
        self.counters[team.index()]
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let line = format!("{} {}", Local::now().format("%H:%M:%S"), msg.into());
        self.logs.push_back(line);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Apply one validated fixture. Performs no rollover check; callers go
    /// through [`SeasonState::ingest_batch`] for that.
    pub fn apply_match(&mut self, m: ParsedMatch) -> &MatchRecord {
        let match_id = self.next_match_id;
        self.next_match_id += 1;

        let (home, away) = (m.home, m.away);
        let total_goals = m.total_goals();

        let four_goal_game = total_goals == 4;
        let three_goal_game = total_goals == 3;
        step_counter(&mut self.counters[home.index()].four_goal, four_goal_game);
        step_counter(&mut self.counters[away.index()].four_goal, four_goal_game);
        step_counter(&mut self.counters[home.index()].home_role, four_goal_game);
        step_counter(&mut self.counters[away.index()].away_role, four_goal_game);
        step_counter(&mut self.counters[home.index()].three_goal, three_goal_game);
        step_counter(&mut self.counters[away.index()].three_goal, three_goal_game);

        let form_window = self.config.form_window;
        self.stats[home.index()].record(m.home_score, m.away_score, form_window);
        self.stats[away.index()].record(m.away_score, m.home_score, form_window);

        let ranking = self.rankings();
        let home_rank = position_in(&ranking, home);
        let away_rank = position_in(&ranking, away);

        let home_c = self.counters[home.index()];
        let away_c = self.counters[away.index()];

        let record = MatchRecord {
            match_id,
            home_team: home,
            away_team: away,
            home_score: m.home_score,
            away_score: m.away_score,
            total_goals,
            total_goals_label: total_goals_label(total_goals),
            result: MatchResult::from_scores(m.home_score, m.away_score),
            goal_difference: m.home_score as i32 - m.away_score as i32,
            both_teams_scored: m.home_score > 0 && m.away_score > 0,
            over_2_5: total_goals > 2,
            home_rank,
            away_rank,
            legacy_home_counter: home_c.home_role,
            legacy_away_counter: away_c.away_role,
            four_goal_home: home_c.four_goal,
            four_goal_away: away_c.four_goal,
            three_goal_home: home_c.three_goal,
            three_goal_away: away_c.three_goal,
            four_goal_display: format!(
                "{home}: {} | {away}: {}",
                home_c.four_goal, away_c.four_goal
            ),
            three_goal_display: format!(
                "{home}: {} | {away}: {}",
                home_c.three_goal, away_c.three_goal
            ),
            season_number: self.season_number,
            season_label: self.season_label(),
        };
        self.history.push(record);
        &self.history[self.history.len() - 1]
    }

    /// Zero standings and counters, bump the season, restart match ids.
    /// The match log is kept.
    pub fn start_new_season(&mut self) {
        self.reset_season_tables();
        self.season_number += 1;
    }

    /// Erase the match log and start over from season 1.
    pub fn clear_all(&mut self) {
        self.history.clear();
        self.reset_season_tables();
        self.season_number = 1;
    }

    fn reset_season_tables(&mut self) {
        self.stats = vec![TeamSeasonStats::default(); TEAM_COUNT];
        self.counters = vec![TeamCounters::default(); TEAM_COUNT];
        self.next_match_id = 1;
    }

    /// Roll the season over once any club has reached the match cap.
    pub fn maybe_roll_season(&mut self) -> bool {
        let cap = self.config.season_match_cap;
        let Some(team) = Team::all().find(|team| self.stats(*team).played >= cap) else {
            return false;
        };
        let finished = self.season_number;
        self.push_log(format!(
            "[WARN] Season {finished} complete! {team} has played {cap} matches. Starting Season {}...",
            finished + 1
        ));
        self.start_new_season();
        true
    }

    /// Apply parsed fixtures oldest first, rolling the season whenever the
    /// cap is reached, including mid-batch.
    pub fn ingest_batch(&mut self, matches: &[ParsedMatch]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for m in matches {
            if self.maybe_roll_season() {
                summary.rollovers += 1;
            }
            self.apply_match(*m);
            summary.added += 1;
        }
        summary
    }

    /// Teams ordered by points, goal difference, goals for. Exact ties keep
    /// registry order.
    pub fn rankings(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = Team::all().collect();
        teams.sort_by(|a, b| {
            self.stats(*b)
                .ranking_key()
                .cmp(&self.stats(*a).ranking_key())
        });
        teams
    }

    pub fn rank_of(&self, team: Team) -> usize {
        position_in(&self.rankings(), team)
    }

    pub fn league_table(&self) -> Vec<LeagueRow> {
        self.rankings()
            .into_iter()
            .enumerate()
            .map(|(idx, team)| {
                let s = self.stats(team);
                LeagueRow {
                    pos: idx + 1,
                    team,
                    played: s.played,
                    won: s.won,
                    drawn: s.drawn,
                    lost: s.lost,
                    goals_for: s.goals_for,
                    goals_against: s.goals_against,
                    goal_difference: s.goal_difference,
                    points: s.points,
                    form: s.form_string(),
                }
            })
            .collect()
    }

    /// Most matches played by any club this season, next to the cap.
    pub fn season_progress(&self) -> (u32, u32) {
        let max_played = self.stats.iter().map(|s| s.played).max().unwrap_or(0);
        (max_played, self.config.season_match_cap)
    }

    /// Newest first.
    pub fn recent_matches(&self) -> Vec<&MatchRecord> {
        self.history
            .iter()
            .rev()
            .take(self.config.recent_window)
            .collect()
    }
}

fn step_counter(counter: &mut u32, reset: bool) {
    if reset {
        *counter = 0;
    } else {
        *counter += 1;
    }
}

fn position_in(ranking: &[Team], team: Team) -> usize {
    ranking
        .iter()
        .position(|t| *t == team)
        .map(|idx| idx + 1)
        .unwrap_or(ranking.len())
}

/// One user action from the presentation side.
#[derive(Debug, Clone)]
pub enum SessionAction {
    IngestText(String),
    ManualReset,
    ClearAll,
    Log(String),
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub blank_input: bool,
    pub parsed: usize,
    pub added: usize,
    pub rollovers: usize,
    pub season_number: u32,
    pub errors: Vec<ParseError>,
    pub cleaned_tokens: usize,
}

impl IngestReport {
    /// Non-blank paste that yielded no usable fixture.
    pub fn no_valid_matches(&self) -> bool {
        !self.blank_input && self.parsed == 0
    }
}

#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Ingested(IngestReport),
    SeasonReset { season_number: u32 },
    Cleared,
    Logged,
}

pub fn apply_action(state: &mut SeasonState, action: SessionAction) -> ActionOutcome {
    match action {
        SessionAction::IngestText(text) => ActionOutcome::Ingested(ingest_text(state, &text)),
        SessionAction::ManualReset => {
            state.start_new_season();
            let season_number = state.season_number();
            state.push_log(format!("[INFO] Manual reset: starting Season {season_number}"));
            ActionOutcome::SeasonReset { season_number }
        }
        SessionAction::ClearAll => {
            state.clear_all();
            state.push_log("[INFO] Cleared all match data");
            ActionOutcome::Cleared
        }
        SessionAction::Log(msg) => {
            state.push_log(msg);
            ActionOutcome::Logged
        }
    }
}

/// Parse a pasted block and apply every accepted fixture.
pub fn ingest_text(state: &mut SeasonState, text: &str) -> IngestReport {
    if text.trim().is_empty() {
        return IngestReport {
            blank_input: true,
            season_number: state.season_number(),
            ..IngestReport::default()
        };
    }

    let outcome = parsing::parse_matches(text);
    if outcome.has_errors() {
        state.push_log(format!("[WARN] Found {} parsing errors", outcome.errors.len()));
        for line in outcome.error_summary(ERROR_LOG_LIMIT) {
            state.push_log(format!("[WARN] - {line}"));
        }
    }

    let batch = state.ingest_batch(&outcome.matches);
    if outcome.matches.is_empty() {
        state.push_log("[WARN] No valid matches found in the input");
    } else {
        state.push_log(format!(
            "[INFO] Added {} matches to Season {}",
            batch.added,
            state.season_number()
        ));
    }

    IngestReport {
        blank_input: false,
        parsed: outcome.matches.len(),
        added: batch.added,
        rollovers: batch.rollovers,
        season_number: state.season_number(),
        errors: outcome.errors,
        cleaned_tokens: outcome.cleaned.len(),
    }
}
