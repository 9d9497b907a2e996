use std::collections::HashMap;

use serde::Serialize;

use crate::metrics::{TeamMetrics, round1, round2};
use crate::teams::Team;

// Percentage points added to the home side (half of it taken off the away side).
const HOME_ADVANTAGE_PP: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePrediction {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over_2_5: f64,
    pub over_3_5: f64,
    pub over_4_5: f64,
    pub both_teams_score: f64,
    pub expected_goals: f64,
    pub predicted_score: String,
}

/// Heuristic 1X2, goal-line and both-teams-score percentages built from the
/// two clubs' season rates. Not a calibrated model.
pub fn predict_outcome(
    metrics: &HashMap<Team, TeamMetrics>,
    home: Team,
    away: Team,
) -> Option<OutcomePrediction> {
    let h = metrics.get(&home)?;
    let a = metrics.get(&away)?;
    Some(predict_from(h, a))
}

pub fn predict_from(h: &TeamMetrics, a: &TeamMetrics) -> OutcomePrediction {
    let mut p_home = h.win_rate * (1.0 - a.win_rate / 100.0);
    let mut p_away = a.win_rate * (1.0 - h.win_rate / 100.0);
    let mut p_draw = (h.draw_rate + a.draw_rate) / 2.0;

    // Without any played games there is nothing to tilt.
    let has_history =
        h.win_rate + h.draw_rate + h.loss_rate + a.win_rate + a.draw_rate + a.loss_rate > 0.0;
    if has_history {
        p_home += HOME_ADVANTAGE_PP;
        p_away = (p_away - HOME_ADVANTAGE_PP * 0.5).max(0.0);
    }

    let total = p_home + p_away + p_draw;
    if total > 0.0 {
        p_home = p_home / total * 100.0;
        p_away = p_away / total * 100.0;
        p_draw = p_draw / total * 100.0;
    } else {
        p_home = 33.3;
        p_draw = 33.3;
        p_away = 33.3;
    }

    let expected_goals = h.avg_gf + a.avg_gf;
    let over_2_5 = ((expected_goals - 1.5) * 30.0).clamp(10.0, 90.0);
    let over_3_5 = ((expected_goals - 2.5) * 25.0).clamp(5.0, 70.0);
    let over_4_5 = ((expected_goals - 3.5) * 20.0).clamp(2.0, 50.0);
    let both_teams_score = (h.bts_rate + a.bts_rate) / 2.0;

    OutcomePrediction {
        home_win: pct(p_home),
        draw: pct(p_draw),
        away_win: pct(p_away),
        over_2_5: pct(over_2_5),
        over_3_5: pct(over_3_5),
        over_4_5: pct(over_4_5),
        both_teams_score: pct(both_teams_score),
        expected_goals: round2(expected_goals),
        predicted_score: format!("{:.1}-{:.1}", h.avg_gf, a.avg_gf),
    }
}

fn pct(value: f64) -> f64 {
    round1(value.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(win: f64, draw: f64, loss: f64, gf: f64, bts: f64) -> TeamMetrics {
        TeamMetrics {
            win_rate: win,
            draw_rate: draw,
            loss_rate: loss,
            avg_gf: gf,
            avg_ga: 1.0,
            bts_rate: bts,
            form: Vec::new(),
            points_per_game: 0.0,
        }
    }

    #[test]
    fn empty_season_falls_back_to_even_split() {
        let blank = metrics(0.0, 0.0, 0.0, 0.0, 0.0);
        let p = predict_from(&blank, &blank);
        assert_eq!((p.home_win, p.draw, p.away_win), (33.3, 33.3, 33.3));
        assert_eq!(p.over_2_5, 10.0);
        assert_eq!(p.over_3_5, 5.0);
        assert_eq!(p.over_4_5, 2.0);
        assert_eq!(p.predicted_score, "0.0-0.0");
    }

    #[test]
    fn outcome_split_sums_to_about_one_hundred() {
        let h = metrics(50.0, 25.0, 25.0, 1.8, 60.0);
        let a = metrics(40.0, 30.0, 30.0, 1.2, 40.0);
        let p = predict_from(&h, &a);
        let sum = p.home_win + p.draw + p.away_win;
        assert!((sum - 100.0).abs() < 0.2, "sum {sum}");
        assert!(p.home_win > p.away_win);
        assert_eq!(p.both_teams_score, 50.0);
        assert_eq!(p.expected_goals, 3.0);
        assert_eq!(p.over_2_5, 45.0);
    }

    #[test]
    fn goal_lines_are_clamped() {
        let h = metrics(50.0, 0.0, 50.0, 6.0, 100.0);
        let p = predict_from(&h, &h);
        assert_eq!(p.over_2_5, 90.0);
        assert_eq!(p.over_3_5, 70.0);
        assert_eq!(p.over_4_5, 50.0);
    }
}
