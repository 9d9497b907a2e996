use rand::SeedableRng;
use rand::rngs::StdRng;

use oddbet::config::EngineConfig;
use oddbet::fake_feed;
use oddbet::parsing::ParsedMatch;
use oddbet::state::{
    ActionOutcome, MatchResult, SeasonState, SessionAction, apply_action, ingest_text,
};
use oddbet::teams::{TEAM_NAMES, Team};

fn team(name: &str) -> Team {
    Team::from_name(name).expect("registry team")
}

fn fixture(home: &str, home_score: u32, away_score: u32, away: &str) -> ParsedMatch {
    ParsedMatch::new(team(home), home_score, away_score, team(away))
}

fn capped(cap: u32) -> SeasonState {
    SeasonState::new(EngineConfig {
        season_match_cap: cap,
        ..EngineConfig::default()
    })
}

#[test]
fn first_result_updates_table_and_record() {
    let mut state = SeasonState::default();
    let record = state.apply_match(fixture("Leeds", 2, 1, "Everton")).clone();

    assert_eq!(record.match_id, 1);
    assert_eq!(record.result, MatchResult::HomeWin);
    assert_eq!(record.total_goals, 3);
    assert_eq!(record.total_goals_label, "3 ✔");
    assert_eq!(record.goal_difference, 1);
    assert!(record.both_teams_scored);
    assert!(record.over_2_5);
    assert_eq!(record.home_rank, 1);
    assert_eq!(record.away_rank, 20);
    assert_eq!(record.four_goal_display, "Leeds: 1 | Everton: 1");
    assert_eq!(record.three_goal_display, "Leeds: 0 | Everton: 0");
    assert_eq!(record.season_label, "Season 1");

    let leeds = state.stats(team("Leeds"));
    assert_eq!((leeds.played, leeds.won, leeds.points), (1, 1, 3));
    assert_eq!(leeds.form_string(), "W");
    let everton = state.stats(team("Everton"));
    assert_eq!((everton.played, everton.lost, everton.points), (1, 1, 0));
    assert_eq!(everton.goal_difference, -1);
    assert_eq!(state.stats(team("Palace")).form_string(), "No matches");
    assert_eq!(state.next_match_id(), 2);
}

#[test]
fn four_goal_game_resets_only_the_four_goal_counter() {
    let mut state = SeasonState::default();
    for opponent in ["Everton", "Palace", "Burnley", "Fulham", "Wolves", "Brighton", "Leicester"] {
        state.apply_match(fixture("Leeds", 1, 0, opponent));
    }
    let c = state.counters(team("Leeds"));
    assert_eq!((c.four_goal, c.three_goal), (7, 7));

    let record = state.apply_match(fixture("Leeds", 2, 2, "Newcastle")).clone();
    let c = state.counters(team("Leeds"));
    assert_eq!(c.four_goal, 0);
    assert_eq!(c.three_goal, 8);
    assert_eq!(record.total_goals_label, "Won");
    assert_eq!(record.four_goal_display, "Leeds: 0 | Newcastle: 0");
    assert_eq!(record.three_goal_display, "Leeds: 8 | Newcastle: 1");
    assert_eq!(record.result, MatchResult::Draw);
}

#[test]
fn three_goal_game_resets_only_the_three_goal_counter() {
    let mut state = SeasonState::default();
    state.apply_match(fixture("Leeds", 0, 0, "Everton"));
    state.apply_match(fixture("Everton", 2, 1, "Leeds"));

    let leeds = state.counters(team("Leeds"));
    assert_eq!((leeds.four_goal, leeds.three_goal), (2, 0));
    let everton = state.counters(team("Everton"));
    assert_eq!((everton.four_goal, everton.three_goal), (2, 0));
}

#[test]
fn legacy_counters_follow_the_venue() {
    let mut state = SeasonState::default();
    let first = state.apply_match(fixture("Leeds", 1, 0, "Everton")).clone();
    assert_eq!((first.legacy_home_counter, first.legacy_away_counter), (1, 1));

    let second = state.apply_match(fixture("Leeds", 1, 0, "Palace")).clone();
    assert_eq!(second.legacy_home_counter, 2);
    assert_eq!(second.legacy_away_counter, 1);

    let third = state.apply_match(fixture("Everton", 3, 1, "Leeds")).clone();
    assert_eq!((third.legacy_home_counter, third.legacy_away_counter), (0, 0));
    // Leeds' home-role counter is untouched by an away game.
    assert_eq!(state.counters(team("Leeds")).home_role, 2);
}

#[test]
fn form_keeps_the_latest_five() {
    let mut state = SeasonState::default();
    state.apply_match(fixture("Leeds", 0, 1, "Everton"));
    for _ in 0..4 {
        state.apply_match(fixture("Leeds", 2, 0, "Palace"));
    }
    state.apply_match(fixture("Leeds", 1, 1, "Burnley"));
    assert_eq!(state.stats(team("Leeds")).form_string(), "W W W W D");
}

#[test]
fn ranking_uses_points_then_goal_difference_then_goals() {
    let mut state = SeasonState::default();
    assert_eq!(
        state.rankings().iter().map(|t| t.name()).collect::<Vec<_>>(),
        TEAM_NAMES.to_vec()
    );

    state.apply_match(fixture("Palace", 1, 0, "Leeds"));
    state.apply_match(fixture("Wolves", 2, 1, "Everton"));
    let table = state.league_table();
    assert_eq!(table[0].team, team("Wolves"));
    assert_eq!(table[1].team, team("Palace"));
    assert_eq!(state.rank_of(team("Palace")), 2);
    // Level on points and goal difference; goals scored decides.
    assert_eq!(table[18].team, team("Everton"));
    assert_eq!(table[19].team, team("Leeds"));
    assert_eq!(table[2].team, team("Aston V"));
    assert_eq!(table[0].pos, 1);
}

#[test]
fn same_inputs_give_the_same_table() {
    let run = || {
        let mut state = SeasonState::default();
        for text in fake_feed::generate_season(&mut StdRng::seed_from_u64(3), 4) {
            ingest_text(&mut state, &text);
        }
        state.league_table()
    };
    assert_eq!(run(), run());
}

#[test]
fn goals_for_and_against_balance() {
    let mut state = SeasonState::default();
    for text in fake_feed::generate_season(&mut StdRng::seed_from_u64(21), 6) {
        ingest_text(&mut state, &text);
    }
    let table = state.league_table();
    let gf: u32 = table.iter().map(|r| r.goals_for).sum();
    let ga: u32 = table.iter().map(|r| r.goals_against).sum();
    assert_eq!(gf, ga);
    assert_eq!(table.iter().map(|r| r.goal_difference).sum::<i32>(), 0);
    for row in &table {
        assert_eq!(row.played, row.won + row.drawn + row.lost);
        assert_eq!(row.points, row.won * 3 + row.drawn);
    }
    assert_eq!(state.history().len(), 60);
}

#[test]
fn season_rolls_over_when_a_club_reaches_the_cap() {
    let mut state = SeasonState::default();
    let batch: Vec<ParsedMatch> = (0..38).map(|_| fixture("Leeds", 1, 0, "Everton")).collect();
    let summary = state.ingest_batch(&batch);
    assert_eq!((summary.added, summary.rollovers), (38, 0));
    assert_eq!(state.season_number(), 1);
    assert_eq!(state.season_progress(), (38, 38));

    let summary = state.ingest_batch(&[fixture("Palace", 0, 0, "Burnley")]);
    assert_eq!(summary.rollovers, 1);
    assert_eq!(state.season_number(), 2);
    assert_eq!(state.history().len(), 39);

    let last = state.history().last().expect("match logged");
    assert_eq!(last.match_id, 1);
    assert_eq!(last.season_label, "Season 2");
    assert_eq!(state.stats(team("Leeds")).played, 0);
    assert_eq!(state.counters(team("Leeds")).four_goal, 0);
    assert!(state.logs.iter().any(|l| l.contains(
        "[WARN] Season 1 complete! Leeds has played 38 matches. Starting Season 2..."
    )));
}

#[test]
fn rollover_can_happen_mid_batch() {
    let mut state = capped(3);
    let batch: Vec<ParsedMatch> = (0..5).map(|_| fixture("Leeds", 2, 0, "Everton")).collect();
    let summary = state.ingest_batch(&batch);

    assert_eq!(summary.added, 5);
    assert_eq!(summary.rollovers, 1);
    assert_eq!(state.season_number(), 2);
    assert_eq!(state.stats(team("Leeds")).played, 2);

    let ids: Vec<u32> = state.history().iter().map(|m| m.match_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 1, 2]);
    let seasons: Vec<u32> = state.history().iter().map(|m| m.season_number).collect();
    assert_eq!(seasons, vec![1, 1, 1, 2, 2]);
}

#[test]
fn no_club_exceeds_the_cap() {
    let mut state = capped(4);
    for text in fake_feed::generate_season(&mut StdRng::seed_from_u64(5), 9) {
        ingest_text(&mut state, &text);
        assert!(state.league_table().iter().all(|r| r.played <= 4));
    }
    assert!(state.season_number() >= 3);
}

#[test]
fn manual_reset_keeps_history() {
    let mut state = SeasonState::default();
    state.apply_match(fixture("Leeds", 3, 0, "Everton"));

    let outcome = apply_action(&mut state, SessionAction::ManualReset);
    assert!(matches!(outcome, ActionOutcome::SeasonReset { season_number: 2 }));
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.stats(team("Leeds")).points, 0);
    assert_eq!(state.next_match_id(), 1);
}

#[test]
fn clear_all_returns_to_season_one() {
    let mut state = capped(1);
    state.ingest_batch(&[
        fixture("Leeds", 1, 0, "Everton"),
        fixture("Leeds", 1, 0, "Everton"),
    ]);
    assert_eq!(state.season_number(), 2);

    let outcome = apply_action(&mut state, SessionAction::ClearAll);
    assert!(matches!(outcome, ActionOutcome::Cleared));
    assert_eq!(state.season_number(), 1);
    assert!(state.history().is_empty());
    assert_eq!(state.next_match_id(), 1);
    assert!(state.league_table().iter().all(|r| r.played == 0));
}

#[test]
fn ingest_text_reports_and_logs() {
    let mut state = SeasonState::default();

    let report = ingest_text(&mut state, "   \n");
    assert!(report.blank_input);
    assert!(!report.no_valid_matches());
    assert!(state.logs.is_empty());

    let report = ingest_text(&mut state, "hello there\nnothing useful");
    assert!(report.no_valid_matches());
    assert!(
        state
            .logs
            .back()
            .is_some_and(|l| l.ends_with("[WARN] No valid matches found in the input"))
    );

    let report = ingest_text(&mut state, "Leeds\n1\n0\nEverton\nPalace\n2");
    assert_eq!((report.parsed, report.added), (1, 1));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.season_number, 1);
    assert!(state.logs.iter().any(|l| l.ends_with("[WARN] Found 1 parsing errors")));
    assert!(state.logs.iter().any(|l| l.ends_with("[WARN] - Incomplete match at position 5")));
    assert!(state.logs.back().is_some_and(|l| l.ends_with("[INFO] Added 1 matches to Season 1")));
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = SeasonState::default();
    for idx in 0..250 {
        apply_action(&mut state, SessionAction::Log(format!("line {idx}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert!(state.logs.back().is_some_and(|l| l.ends_with("line 249")));
}

#[test]
fn two_match_example_between_leeds_and_everton() {
    let mut state = SeasonState::default();
    state.ingest_batch(&[
        fixture("Leeds", 2, 1, "Everton"),
        fixture("Everton", 0, 0, "Leeds"),
    ]);

    let leeds = state.stats(team("Leeds"));
    assert_eq!(
        (leeds.played, leeds.won, leeds.drawn, leeds.lost),
        (2, 1, 1, 0)
    );
    assert_eq!((leeds.goals_for, leeds.goals_against, leeds.points), (2, 1, 4));
    assert_eq!(leeds.form_string(), "W D");

    let everton = state.stats(team("Everton"));
    assert_eq!(
        (everton.played, everton.won, everton.drawn, everton.lost),
        (2, 0, 1, 1)
    );
    assert_eq!(
        (everton.goals_for, everton.goals_against, everton.points),
        (1, 2, 1)
    );

    assert_eq!(state.rank_of(team("Leeds")), 1);
    assert_eq!(state.rank_of(team("Everton")), 2);
}

#[test]
fn each_club_goal_tally_matches_its_games() {
    let mut state = SeasonState::default();
    for text in fake_feed::generate_season(&mut StdRng::seed_from_u64(8), 5) {
        ingest_text(&mut state, &text);
    }
    for club in Team::all() {
        let in_games: u32 = state
            .history()
            .iter()
            .filter(|m| m.involves(club))
            .map(|m| m.total_goals)
            .sum();
        let stats = state.stats(club);
        assert_eq!(in_games, stats.goals_for + stats.goals_against, "{club}");
    }
}

#[test]
fn four_goal_game_clears_uneven_counters() {
    let mut state = SeasonState::default();
    let opponents = ["Palace", "Burnley", "Fulham", "Wolves", "Brighton", "Leicester", "Newcastle"];
    for opponent in opponents {
        state.apply_match(fixture("Leeds", 1, 0, opponent));
    }
    for opponent in ["West Ham", "Tottenham", "Southampton"] {
        state.apply_match(fixture("Everton", 0, 0, opponent));
    }
    assert_eq!(state.counters(team("Leeds")).four_goal, 7);
    assert_eq!(state.counters(team("Everton")).four_goal, 3);

    let record = state.apply_match(fixture("Leeds", 3, 1, "Everton")).clone();
    assert_eq!((record.four_goal_home, record.four_goal_away), (0, 0));
    assert_eq!((record.three_goal_home, record.three_goal_away), (8, 4));
}

#[test]
fn ranking_is_stable_across_calls() {
    let mut state = SeasonState::default();
    state.ingest_batch(&[
        fixture("Leeds", 1, 0, "Everton"),
        fixture("Palace", 1, 0, "Burnley"),
        fixture("Wolves", 0, 0, "Fulham"),
    ]);
    let first = state.rankings();
    for _ in 0..5 {
        assert_eq!(state.rankings(), first);
    }
    assert_eq!(state.league_table(), state.league_table());
    // Leeds and Palace are level on everything; registry order keeps Leeds first.
    assert_eq!(first[0], team("Leeds"));
    assert_eq!(first[1], team("Palace"));
}

#[test]
fn zero_cap_is_raised_to_one() {
    let mut state = capped(0);
    assert_eq!(state.config().season_match_cap, 1);

    let summary = state.ingest_batch(&[
        fixture("Leeds", 1, 0, "Everton"),
        fixture("Palace", 1, 0, "Burnley"),
    ]);
    assert_eq!(summary.rollovers, 1);
    assert_eq!(state.season_number(), 2);
}
