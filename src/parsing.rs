use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::teams::{self, Team};

/// Largest bare integer still accepted as a score line.
pub const MAX_SCORE_TOKEN: u32 = 20;

// Timestamps, week headers, league banners and ids that surround pasted results.
static NOISE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)WEEK \d+",
        r"(?i)English League",
        r"(?i)\d{1,2}:\d{2}\s*(?:am|pm)",
        r"#\d+",
        r"^\d{8,}$",
    ])
    .expect("noise patterns are valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMatch {
    pub home: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub away: Team,
}

impl ParsedMatch {
    pub fn new(home: Team, home_score: u32, away_score: u32, away: Team) -> Self {
        Self {
            home,
            home_score,
            away_score,
            away,
        }
    }

    pub fn total_goals(&self) -> u32 {
        self.home_score + self.away_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Incomplete match at position {0}")]
    IncompleteMatch(usize),

    #[error("Invalid home team: {0}")]
    InvalidHomeTeam(String),

    #[error("Invalid away team: {0}")]
    InvalidAwayTeam(String),

    #[error("Non-numeric home score: {0}")]
    NonNumericHomeScore(String),

    #[error("Non-numeric away score: {0}")]
    NonNumericAwayScore(String),
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Accepted fixtures, oldest first.
    pub matches: Vec<ParsedMatch>,
    pub errors: Vec<ParseError>,
    /// Token stream after the cleaning pass, kept for diagnostics.
    pub cleaned: Vec<String>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// First `limit` error messages plus a trailing "... and N more" line.
    pub fn error_summary(&self, limit: usize) -> Vec<String> {
        let mut out: Vec<String> = self
            .errors
            .iter()
            .take(limit)
            .map(|err| err.to_string())
            .collect();
        if self.errors.len() > limit {
            out.push(format!("... and {} more errors", self.errors.len() - limit));
        }
        out
    }
}

/// Parse a pasted block of results. The paste lists the newest fixture first;
/// the returned matches are reversed so they can be applied oldest first.
pub fn parse_matches(text: &str) -> ParseOutcome {
    let cleaned = clean_lines(text);
    let (mut matches, errors) = group_tokens(&cleaned);
    matches.reverse();
    ParseOutcome {
        matches,
        errors,
        cleaned,
    }
}

/// Token cleaning pass: keep team names and small integers, drop noise,
/// recover team names buried in decorated lines.
pub fn clean_lines(text: &str) -> Vec<String> {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(clean_line)
        .collect()
}

// Bare carriage returns and the other Unicode line separators end a line too.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

fn clean_line(line: &str) -> Option<String> {
    if teams::is_valid_team(line) || score_token(line).is_some() {
        return Some(line.to_string());
    }
    if NOISE_PATTERNS.is_match(line) {
        return None;
    }
    teams::find_team_in(line).map(|team| team.name().to_string())
}

fn score_token(line: &str) -> Option<u32> {
    if !is_digits(line) {
        return None;
    }
    line.parse::<u32>().ok().filter(|n| *n <= MAX_SCORE_TOKEN)
}

fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Grouping pass over fixed windows of `[home, home score, away score, away]`.
fn group_tokens(tokens: &[String]) -> (Vec<ParsedMatch>, Vec<ParseError>) {
    let mut matches = Vec::new();
    let mut errors = Vec::new();

    for (window_idx, window) in tokens.chunks(4).enumerate() {
        let [home_raw, home_score_raw, away_score_raw, away_raw] = window else {
            errors.push(ParseError::IncompleteMatch(window_idx * 4 + 1));
            break;
        };

        let home = Team::from_name(home_raw);
        let away = Team::from_name(away_raw);
        let home_score = is_digits(home_score_raw)
            .then(|| home_score_raw.parse::<u32>().ok())
            .flatten();
        let away_score = is_digits(away_score_raw)
            .then(|| away_score_raw.parse::<u32>().ok())
            .flatten();

        if home.is_none() {
            errors.push(ParseError::InvalidHomeTeam(home_raw.clone()));
        }
        if away.is_none() {
            errors.push(ParseError::InvalidAwayTeam(away_raw.clone()));
        }
        if home_score.is_none() {
            errors.push(ParseError::NonNumericHomeScore(home_score_raw.clone()));
        }
        if away_score.is_none() {
            errors.push(ParseError::NonNumericAwayScore(away_score_raw.clone()));
        }

        if let (Some(home), Some(home_score), Some(away_score), Some(away)) =
            (home, home_score, away_score, away)
        {
            matches.push(ParsedMatch::new(home, home_score, away_score, away));
        }
    }

    (matches, errors)
}
