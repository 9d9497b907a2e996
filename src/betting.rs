use serde::Serialize;

use crate::metrics::{HeadToHead, TeamMetrics, round1};
use crate::teams::Team;
use crate::win_prob::OutcomePrediction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestBet {
    pub market: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BettingAdvice {
    pub best_bets: Vec<BestBet>,
    pub avoid_bets: Vec<String>,
    pub insights: Vec<String>,
}

impl BettingAdvice {
    fn best(&mut self, market: impl Into<String>, reason: impl Into<String>) {
        self.best_bets.push(BestBet {
            market: market.into(),
            reason: reason.into(),
        });
    }
}

/// Fixed-threshold rule table over the prediction, the two clubs' metrics and
/// their head-to-head record.
pub fn betting_recommendations(
    home: Team,
    away: Team,
    prediction: &OutcomePrediction,
    home_metrics: &TeamMetrics,
    away_metrics: &TeamMetrics,
    h2h: Option<&HeadToHead>,
) -> BettingAdvice {
    let mut advice = BettingAdvice::default();

    if prediction.both_teams_score >= 50.0 {
        let mut reason = format!(
            "{home} leaks goals ({} GA/game) | {away} can score ({} GF/game)",
            rate(home_metrics.avg_ga),
            rate(away_metrics.avg_gf)
        );
        if let Some(h) = h2h.filter(|h| h.both_teams_score_pct >= 70.0) {
            reason.push_str(&format!(
                " | Historical: {:.1}% both teams scored",
                h.both_teams_score_pct
            ));
        }
        advice.best("Both Teams to Score: YES", reason);
    } else {
        advice.avoid_bets.push("Both Teams to Score".to_string());
    }

    let home_or_draw = round1(prediction.home_win + prediction.draw);
    if home_or_draw >= 65.0 {
        advice.best(
            format!("{home} or Draw (Double Chance)"),
            format!("{home_or_draw:.1}% probability | Covers both likely outcomes"),
        );
    }

    if prediction.over_2_5 < 50.0 {
        let under = round1(100.0 - prediction.over_2_5);
        advice.best(
            "Under 2.5 Goals",
            format!(
                "{under:.1}% probability | {away}'s defense ({} GA) considered",
                rate(away_metrics.avg_ga)
            ),
        );
    } else {
        advice.best(
            "Over 2.5 Goals",
            format!(
                "{:.1}% probability | High expected goals ({})",
                prediction.over_2_5,
                rate(prediction.expected_goals)
            ),
        );
    }

    if home_metrics.avg_ga > 1.4 {
        advice
            .avoid_bets
            .push(format!("{home} to Win to Nil (Clean Sheet)"));
    }
    if prediction.over_3_5 < 25.0 {
        advice.avoid_bets.push("Over 3.5 Goals".to_string());
    }
    if prediction.over_4_5 < 10.0 {
        advice.avoid_bets.push("Over 4.5 Goals".to_string());
    }

    if home_metrics.avg_gf > away_metrics.avg_gf {
        advice.insights.push(format!(
            "{home} has better attack ({} vs {} GF/game)",
            rate(home_metrics.avg_gf),
            rate(away_metrics.avg_gf)
        ));
    } else {
        advice.insights.push(format!(
            "{away} has better attack ({} vs {} GF/game)",
            rate(away_metrics.avg_gf),
            rate(home_metrics.avg_gf)
        ));
    }

    if away_metrics.avg_ga < home_metrics.avg_ga {
        advice.insights.push(format!(
            "{away} has better defense ({} vs {} GA/game)",
            rate(away_metrics.avg_ga),
            rate(home_metrics.avg_ga)
        ));
    } else {
        advice.insights.push(format!(
            "{home} has better defense ({} vs {} GA/game)",
            rate(home_metrics.avg_ga),
            rate(away_metrics.avg_ga)
        ));
    }

    if let Some(h) = h2h.filter(|h| h.total_matches > 0) {
        if h.home_wins == 0 && h.away_wins == 0 {
            advice.insights.push(format!(
                "Historical trend: {}/{} matches ended in draw",
                h.draws, h.total_matches
            ));
        } else if h.home_wins > h.away_wins * 2 {
            advice
                .insights
                .push("Strong historical advantage for home side".to_string());
        } else if h.away_wins > h.home_wins * 2 {
            advice
                .insights
                .push("Strong historical advantage for away side".to_string());
        }
    }

    advice
}

/// Rounded per-game figure in shortest form, keeping one decimal for whole
/// numbers ("1.5", "1.67", "2.0").
fn rate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::rate;

    #[test]
    fn rates_print_like_the_rounded_value() {
        assert_eq!(rate(1.5), "1.5");
        assert_eq!(rate(1.67), "1.67");
        assert_eq!(rate(2.0), "2.0");
        assert_eq!(rate(0.0), "0.0");
    }
}
