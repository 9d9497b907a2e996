use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use oddbet::analysis_export;
use oddbet::config::EngineConfig;
use oddbet::metrics::{season_summary, SeasonSummary};
use oddbet::state::{ingest_text, LeagueRow, MatchRecord, SeasonState};
use oddbet::streaks::{counter_alerts, CounterAlert};

#[derive(Default)]
struct Args {
    inputs: Vec<PathBuf>,
    csv: Option<PathBuf>,
    xlsx: Option<PathBuf>,
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    season_number: u32,
    history: &'a [MatchRecord],
    summary: Option<SeasonSummary>,
    table: Vec<LeagueRow>,
    alerts: Vec<CounterAlert>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1))?;
    if args.inputs.is_empty() {
        anyhow::bail!("usage: ingest <paste.txt>... [--csv PATH] [--xlsx PATH] [--json]");
    }

    let config = EngineConfig::from_env_or_file()?;
    let mut state = SeasonState::new(config);
    for path in &args.inputs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read paste file {}", path.display()))?;
        let report = ingest_text(&mut state, &text);
        if args.json {
            continue;
        }

        println!(
            "{}: parsed {} | added {} | rollovers {} | now Season {}",
            path.display(),
            report.parsed,
            report.added,
            report.rollovers,
            report.season_number
        );
        if !report.errors.is_empty() {
            println!("Errors: {}", report.errors.len());
            for err in report.errors.iter().take(8) {
                println!(" - {err}");
            }
        }
        if report.no_valid_matches() {
            println!(" - no valid matches found");
        }
    }

    if let Some(path) = &args.csv {
        let rows = analysis_export::export_history_csv(path, &state)?;
        if !args.json {
            println!("Wrote {rows} matches to {}", path.display());
        }
    }
    if let Some(path) = &args.xlsx {
        let report = analysis_export::export_workbook(path, &state)?;
        if !args.json {
            println!(
                "Wrote workbook {} ({} matches, {} table rows)",
                path.display(),
                report.matches,
                report.league_rows
            );
        }
    }

    if !args.json {
        for line in &state.logs {
            eprintln!("{line}");
        }
    }

    if args.json {
        let report = JsonReport {
            season_number: state.season_number(),
            history: state.history(),
            summary: season_summary(&state),
            table: state.league_table(),
            alerts: counter_alerts(&state),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_table(&state);
    let alerts = counter_alerts(&state);
    if !alerts.is_empty() {
        println!();
        println!("Counter alerts:");
        for alert in &alerts {
            println!(" - {}", alert.message);
        }
    }
    Ok(())
}

fn print_table(state: &SeasonState) {
    println!();
    println!("{} League Table", state.season_label());
    println!(
        "{:>3}  {:<16} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}  Form",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for r in state.league_table() {
        println!(
            "{:>3}  {:<16} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}  {}",
            r.pos,
            r.team.name(),
            r.played,
            r.won,
            r.drawn,
            r.lost,
            r.goals_for,
            r.goals_against,
            format!("{:+}", r.goal_difference),
            r.points,
            r.form
        );
    }
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--csv" => {
                let path = raw.next().context("--csv needs a path")?;
                args.csv = Some(PathBuf::from(path));
            }
            "--xlsx" => {
                let path = raw.next().context("--xlsx needs a path")?;
                args.xlsx = Some(PathBuf::from(path));
            }
            other => {
                if let Some(path) = other.strip_prefix("--csv=") {
                    args.csv = Some(PathBuf::from(path.trim()));
                } else if let Some(path) = other.strip_prefix("--xlsx=") {
                    args.xlsx = Some(PathBuf::from(path.trim()));
                } else if other.starts_with("--") {
                    anyhow::bail!("unknown flag {other}");
                } else {
                    args.inputs.push(PathBuf::from(other));
                }
            }
        }
    }
    Ok(args)
}
