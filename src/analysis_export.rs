use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::state::{LeagueRow, MatchRecord, SeasonState};

/// Match log columns, in the order earlier exports used.
pub const MATCH_COLUMNS: [&str; 23] = [
    "Match_ID",
    "Home_Team",
    "Home_Score",
    "Away_Score",
    "Away_Team",
    "Total_Goals",
    "Total-G",
    "Match_Result",
    "Goal_Difference",
    "Both_Teams_Scored",
    "Over_Under",
    "Home_Rank",
    "Away_Rank",
    "Games_Since_Last_Won_Home",
    "Games_Since_Last_Won_Away",
    "Games_Since_Last_4Goals_Home",
    "Games_Since_Last_4Goals_Away",
    "Games_Since_Last_3Goals_Home",
    "Games_Since_Last_3Goals_Away",
    "F!=4HA",
    "Status3",
    "Season_Number",
    "Season_Label",
];

pub const LEAGUE_COLUMNS: [&str; 11] = [
    "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Form",
];

pub struct ExportReport {
    pub matches: usize,
    pub league_rows: usize,
}

pub fn match_history_rows(history: &[MatchRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&MATCH_COLUMNS)];
    rows.extend(history.iter().map(match_row));
    rows
}

fn match_row(m: &MatchRecord) -> Vec<String> {
    vec![
        m.match_id.to_string(),
        m.home_team.to_string(),
        m.home_score.to_string(),
        m.away_score.to_string(),
        m.away_team.to_string(),
        m.total_goals.to_string(),
        m.total_goals_label.clone(),
        m.result.to_string(),
        m.goal_difference.to_string(),
        m.both_teams_scored_label().to_string(),
        m.over_under_label().to_string(),
        m.home_rank.to_string(),
        m.away_rank.to_string(),
        m.legacy_home_counter.to_string(),
        m.legacy_away_counter.to_string(),
        m.four_goal_home.to_string(),
        m.four_goal_away.to_string(),
        m.three_goal_home.to_string(),
        m.three_goal_away.to_string(),
        m.four_goal_display.clone(),
        m.three_goal_display.clone(),
        m.season_number.to_string(),
        m.season_label.clone(),
    ]
}

pub fn league_table_rows(table: &[LeagueRow]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&LEAGUE_COLUMNS)];
    rows.extend(table.iter().map(|r| {
        vec![
            r.pos.to_string(),
            r.team.to_string(),
            r.played.to_string(),
            r.won.to_string(),
            r.drawn.to_string(),
            r.lost.to_string(),
            r.goals_for.to_string(),
            r.goals_against.to_string(),
            r.goal_difference.to_string(),
            r.points.to_string(),
            r.form.clone(),
        ]
    }));
    rows
}

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

pub fn to_csv_string(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }
    fs::write(path, to_csv_string(rows))
        .with_context(|| format!("failed writing csv to {}", path.display()))
}

/// Match log as CSV, the export the dashboard offers for download.
pub fn export_history_csv(path: &Path, state: &SeasonState) -> Result<usize> {
    write_csv(path, &match_history_rows(state.history()))?;
    Ok(state.history().len())
}

pub fn export_workbook(path: &Path, state: &SeasonState) -> Result<ExportReport> {
    let match_rows = match_history_rows(state.history());
    let league_rows = league_table_rows(&state.league_table());

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &match_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("League")?;
        write_rows(sheet, &league_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        matches: match_rows.len().saturating_sub(1),
        league_rows: league_rows.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::csv_escape;

    #[test]
    fn csv_cells_are_quoted_when_needed() {
        assert_eq!(csv_escape("Leeds: 1 | Everton: 2"), "Leeds: 1 | Everton: 2");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
