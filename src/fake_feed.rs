use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::teams::Team;

// Skewed toward the low scores real leagues produce.
const GOAL_BAG: [u32; 12] = [0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 3, 4];

/// One matchweek of ten fixtures as it would be pasted from a results page:
/// newest fixture first, with banner, clock and id lines between results and
/// some club names decorated.
pub fn generate_round<R: Rng>(rng: &mut R, week: u32) -> String {
    let mut teams: Vec<Team> = Team::all().collect();
    teams.shuffle(rng);

    let kickoff_day = NaiveDate::from_ymd_opt(2025, 8, 16)
        .map(|d| d + ChronoDuration::days(7 * i64::from(week.saturating_sub(1))))
        .map(|d| d.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "20250816".to_string());

    let mut lines: Vec<String> = Vec::new();
    for (slot, pair) in teams.chunks(2).enumerate() {
        let [home, away] = pair else { continue };
        lines.push(decorate(rng, *home));
        lines.push(GOAL_BAG[rng.gen_range(0..GOAL_BAG.len())].to_string());
        lines.push(GOAL_BAG[rng.gen_range(0..GOAL_BAG.len())].to_string());
        lines.push(decorate(rng, *away));
        lines.push(format!(
            "English League WEEK {week} - #{kickoff_day}{:02}",
            slot + 10
        ));
        lines.push(format!(
            "{}:{:02} pm",
            rng.gen_range(1..=9),
            rng.gen_range(0..60)
        ));
        if rng.gen_bool(0.2) {
            lines.push(format!("{kickoff_day}{}", rng.gen_range(1000..9999)));
        }
    }
    lines.join("\n")
}

fn decorate<R: Rng>(rng: &mut R, team: Team) -> String {
    match rng.gen_range(0..6) {
        0 => format!("{team} (H)"),
        1 => format!("  {team}  "),
        _ => team.to_string(),
    }
}

/// `rounds` consecutive matchweeks, oldest first.
pub fn generate_season<R: Rng>(rng: &mut R, rounds: u32) -> Vec<String> {
    (1..=rounds).map(|week| generate_round(rng, week)).collect()
}
