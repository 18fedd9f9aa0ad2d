use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::BallContext;
use crate::rates::{balls_to_overs, ratio};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingFigures {
    pub bowler: String,
    /// Set for single-innings figures.
    pub match_id: Option<u64>,
    pub wickets: u32,
    pub runs_conceded: u32,
    pub legal_balls: u32,
    /// Cricket notation, e.g. `3.4` is three overs and four balls.
    pub overs: f64,
    /// Runs conceded per wicket.
    pub strike_rate: Option<f64>,
    pub economy_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BowlingAnalysis {
    pub wickets_total: Vec<BowlingFigures>,
    pub wickets_inning: Vec<BowlingFigures>,
}

pub fn analyze(bowling: &[BallContext<'_>]) -> BowlingAnalysis {
    BowlingAnalysis {
        wickets_total: career_figures(bowling),
        wickets_inning: innings_figures(bowling),
    }
}

#[derive(Default, Clone, Copy)]
struct Tally {
    wickets: u32,
    runs: u32,
    legal_balls: u32,
}

impl Tally {
    fn add(&mut self, ctx: &BallContext<'_>) {
        self.runs += ctx.ball.total_runs;
        if ctx.ball.is_legal() {
            self.legal_balls += 1;
        }
        if ctx.ball.is_bowler_wicket() {
            self.wickets += 1;
        }
    }
}

pub fn career_figures(bowling: &[BallContext<'_>]) -> Vec<BowlingFigures> {
    let mut by_bowler: BTreeMap<&str, Tally> = BTreeMap::new();
    for ctx in bowling {
        by_bowler.entry(ctx.ball.bowler.as_str()).or_default().add(ctx);
    }
    ranked(
        by_bowler
            .into_iter()
            .map(|(bowler, tally)| figures(bowler, None, tally)),
    )
}

pub fn innings_figures(bowling: &[BallContext<'_>]) -> Vec<BowlingFigures> {
    let mut by_innings: BTreeMap<(&str, u64), Tally> = BTreeMap::new();
    for ctx in bowling {
        by_innings
            .entry((ctx.ball.bowler.as_str(), ctx.ball.match_id))
            .or_default()
            .add(ctx);
    }
    ranked(
        by_innings
            .into_iter()
            .map(|((bowler, match_id), tally)| figures(bowler, Some(match_id), tally)),
    )
}

fn figures(bowler: &str, match_id: Option<u64>, tally: Tally) -> BowlingFigures {
    let overs = balls_to_overs(tally.legal_balls);
    BowlingFigures {
        bowler: bowler.to_string(),
        match_id,
        wickets: tally.wickets,
        runs_conceded: tally.runs,
        legal_balls: tally.legal_balls,
        overs,
        strike_rate: ratio(tally.runs as f64, tally.wickets as f64),
        economy_rate: ratio(tally.runs as f64, overs),
    }
}

/// Wicket-takers only; more wickets first, then fewer runs conceded.
fn ranked(rows: impl Iterator<Item = BowlingFigures>) -> Vec<BowlingFigures> {
    let mut rows: Vec<BowlingFigures> = rows.filter(|r| r.wickets > 0).collect();
    rows.sort_by(|a, b| {
        b.wickets
            .cmp(&a.wickets)
            .then_with(|| a.runs_conceded.cmp(&b.runs_conceded))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryRecord, join_deliveries};
    use crate::test_support::{delivery, extra, fixture, wicket};

    #[test]
    fn economy_and_strike_rate() {
        let matches = vec![fixture(1, "Punjab Kings", "Delhi Capitals").build()];
        let mut balls: Vec<DeliveryRecord> = Vec::new();
        for i in 0..24 {
            let runs = if i < 12 { 2 } else { 0 };
            let ball = delivery(1, 2, "DA Warner", "Arshdeep Singh", runs);
            balls.push(if i % 8 == 7 { wicket(ball, "caught") } else { ball });
        }
        let joined = join_deliveries(&matches, &balls);
        let rows = career_figures(&joined);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.wickets, 3);
        assert_eq!(row.runs_conceded, 24);
        assert!((row.overs - 4.0).abs() < 1e-9);
        assert_eq!(row.economy_rate, Some(6.0));
        assert_eq!(row.strike_rate, Some(8.0));
    }

    #[test]
    fn run_outs_are_not_bowler_wickets() {
        let matches = vec![fixture(1, "Punjab Kings", "Delhi Capitals").build()];
        let balls = vec![
            wicket(delivery(1, 1, "PP Shaw", "K Rabada", 0), "run out"),
            wicket(delivery(1, 1, "RR Pant", "K Rabada", 0), "bowled"),
            wicket(delivery(1, 1, "AR Patel", "Harpreet Brar", 1), "run out"),
        ];
        let joined = join_deliveries(&matches, &balls);
        let rows = career_figures(&joined);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bowler, "K Rabada");
        assert_eq!(rows[0].wickets, 1);
    }

    #[test]
    fn extras_do_not_count_as_legal_balls() {
        let matches = vec![fixture(1, "Punjab Kings", "Delhi Capitals").build()];
        let mut balls: Vec<DeliveryRecord> = (0..7)
            .map(|_| delivery(1, 1, "PP Shaw", "K Rabada", 1))
            .collect();
        balls.push(extra(delivery(1, 1, "PP Shaw", "K Rabada", 0), "noballs", 1));
        balls.push(wicket(delivery(1, 1, "PP Shaw", "K Rabada", 0), "lbw"));
        let joined = join_deliveries(&matches, &balls);
        let row = &innings_figures(&joined)[0];
        assert_eq!(row.legal_balls, 8);
        assert!((row.overs - 1.2).abs() < 1e-9);
        assert_eq!(row.runs_conceded, 8);
        assert_eq!(row.match_id, Some(1));
    }

    #[test]
    fn best_figures_order() {
        let matches = vec![
            fixture(1, "Punjab Kings", "Delhi Capitals").build(),
            fixture(2, "Punjab Kings", "Delhi Capitals").build(),
        ];
        let balls = vec![
            wicket(delivery(1, 1, "a", "Kuldeep Yadav", 4), "caught"),
            wicket(delivery(1, 1, "b", "Kuldeep Yadav", 0), "caught"),
            wicket(delivery(2, 1, "a", "Kuldeep Yadav", 0), "bowled"),
            wicket(delivery(2, 1, "b", "Kuldeep Yadav", 0), "bowled"),
            wicket(delivery(2, 1, "c", "AR Patel", 1), "stumped"),
        ];
        let joined = join_deliveries(&matches, &balls);
        let rows = innings_figures(&joined);
        let order: Vec<(&str, Option<u64>)> =
            rows.iter().map(|r| (r.bowler.as_str(), r.match_id)).collect();
        assert_eq!(
            order,
            vec![
                ("Kuldeep Yadav", Some(2)),
                ("Kuldeep Yadav", Some(1)),
                ("AR Patel", Some(2)),
            ]
        );
    }
}
