use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::BallContext;
use crate::rates::ratio;

pub const LEADERBOARD_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatterTally {
    pub batter: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InningsTally {
    pub batter: String,
    pub match_id: u64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsScore {
    pub batter: String,
    pub match_id: u64,
    pub runs: u32,
    /// Deliveries faced, wides excluded.
    pub balls: u32,
    /// `None` when no countable ball was faced.
    pub strike_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BattingAnalysis {
    pub total_fours: Vec<BatterTally>,
    pub fours_inning: Vec<InningsTally>,
    pub total_sixes: Vec<BatterTally>,
    pub sixes_inning: Vec<InningsTally>,
    /// Career aggregate runs.
    pub most_runs: Vec<BatterTally>,
    /// Best single innings, with strike rate.
    pub highest_innings: Vec<InningsScore>,
    pub fifties: Vec<BatterTally>,
    pub centuries: Vec<BatterTally>,
}

pub fn analyze(batting: &[BallContext<'_>]) -> BattingAnalysis {
    BattingAnalysis {
        total_fours: boundary_totals(batting, 4),
        fours_inning: boundary_innings(batting, 4),
        total_sixes: boundary_totals(batting, 6),
        sixes_inning: boundary_innings(batting, 6),
        most_runs: most_runs(batting),
        highest_innings: highest_innings(batting),
        fifties: milestones(batting, 50, Some(100)),
        centuries: milestones(batting, 100, None),
    }
}

pub fn boundary_totals(batting: &[BallContext<'_>], runs: u32) -> Vec<BatterTally> {
    let mut by_batter: BTreeMap<&str, u32> = BTreeMap::new();
    for ctx in batting.iter().filter(|c| c.ball.batsman_runs == runs) {
        *by_batter.entry(ctx.ball.batter.as_str()).or_insert(0) += 1;
    }
    top_tallies(by_batter, LEADERBOARD_LEN)
}

pub fn boundary_innings(batting: &[BallContext<'_>], runs: u32) -> Vec<InningsTally> {
    let mut by_innings: BTreeMap<(&str, u64), u32> = BTreeMap::new();
    for ctx in batting.iter().filter(|c| c.ball.batsman_runs == runs) {
        *by_innings
            .entry((ctx.ball.batter.as_str(), ctx.ball.match_id))
            .or_insert(0) += 1;
    }
    let mut rows: Vec<InningsTally> = by_innings
        .into_iter()
        .map(|((batter, match_id), count)| InningsTally {
            batter: batter.to_string(),
            match_id,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(LEADERBOARD_LEN);
    rows
}

pub fn most_runs(batting: &[BallContext<'_>]) -> Vec<BatterTally> {
    let mut by_batter: BTreeMap<&str, u32> = BTreeMap::new();
    for ctx in batting {
        *by_batter.entry(ctx.ball.batter.as_str()).or_insert(0) += ctx.ball.batsman_runs;
    }
    top_tallies(by_batter, LEADERBOARD_LEN)
}

#[derive(Default, Clone, Copy)]
struct InningsLine {
    runs: u32,
    balls: u32,
}

fn innings_lines<'a>(batting: &[BallContext<'a>]) -> BTreeMap<(&'a str, u64), InningsLine> {
    let mut lines: BTreeMap<(&'a str, u64), InningsLine> = BTreeMap::new();
    for ctx in batting {
        let line = lines
            .entry((ctx.ball.batter.as_str(), ctx.ball.match_id))
            .or_default();
        line.runs += ctx.ball.batsman_runs;
        if !ctx.ball.is_wide() {
            line.balls += 1;
        }
    }
    lines
}

pub fn highest_innings(batting: &[BallContext<'_>]) -> Vec<InningsScore> {
    let mut rows: Vec<InningsScore> = innings_lines(batting)
        .into_iter()
        .map(|((batter, match_id), line)| InningsScore {
            batter: batter.to_string(),
            match_id,
            runs: line.runs,
            balls: line.balls,
            strike_rate: strike_rate(line.runs, line.balls),
        })
        .collect();
    rows.sort_by(|a, b| b.runs.cmp(&a.runs));
    rows.truncate(LEADERBOARD_LEN);
    rows
}

pub fn strike_rate(runs: u32, balls: u32) -> Option<f64> {
    ratio(runs as f64 * 100.0, balls as f64)
}

/// Innings totals in `[lower, upper)` counted per batter.
pub fn milestones(batting: &[BallContext<'_>], lower: u32, upper: Option<u32>) -> Vec<BatterTally> {
    let mut by_batter: BTreeMap<&str, u32> = BTreeMap::new();
    for ((batter, _), line) in innings_lines(batting) {
        if line.runs >= lower && upper.is_none_or(|u| line.runs < u) {
            *by_batter.entry(batter).or_insert(0) += 1;
        }
    }
    top_tallies(by_batter, usize::MAX)
}

fn top_tallies(groups: BTreeMap<&str, u32>, limit: usize) -> Vec<BatterTally> {
    let mut rows: Vec<BatterTally> = groups
        .into_iter()
        .map(|(batter, count)| BatterTally {
            batter: batter.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryRecord, MatchRecord, join_deliveries};
    use crate::test_support::{delivery, extra, fixture};

    fn one_match() -> Vec<MatchRecord> {
        vec![
            fixture(1, "Mumbai Indians", "Gujarat Titans").build(),
            fixture(2, "Mumbai Indians", "Gujarat Titans").build(),
        ]
    }

    #[test]
    fn strike_rate_excludes_wides() {
        let matches = one_match();
        let mut balls: Vec<DeliveryRecord> = Vec::new();
        // 45 off 30: seven fours, two sixes, five singles, sixteen dots.
        for _ in 0..7 {
            balls.push(delivery(1, 1, "RG Sharma", "Rashid Khan", 4));
        }
        for _ in 0..2 {
            balls.push(delivery(1, 1, "RG Sharma", "Rashid Khan", 6));
        }
        for _ in 0..5 {
            balls.push(delivery(1, 1, "RG Sharma", "Rashid Khan", 1));
        }
        for _ in 0..16 {
            balls.push(delivery(1, 1, "RG Sharma", "Rashid Khan", 0));
        }
        balls.push(extra(delivery(1, 1, "RG Sharma", "Rashid Khan", 0), "wides", 1));
        balls.push(extra(delivery(1, 1, "RG Sharma", "Rashid Khan", 0), "wides", 1));
        let joined = join_deliveries(&matches, &balls);

        let innings = highest_innings(&joined);
        assert_eq!(innings.len(), 1);
        assert_eq!(innings[0].runs, 45);
        assert_eq!(innings[0].balls, 30);
        assert_eq!(innings[0].strike_rate, Some(150.0));
    }

    #[test]
    fn only_wides_faced_has_undefined_strike_rate() {
        assert_eq!(strike_rate(0, 0), None);
    }

    #[test]
    fn boundaries_and_milestones() {
        let matches = one_match();
        let mut balls = Vec::new();
        for _ in 0..13 {
            balls.push(delivery(1, 1, "SA Yadav", "Mohammed Shami", 4));
        }
        for _ in 0..9 {
            balls.push(delivery(2, 1, "SA Yadav", "Mohammed Shami", 6));
        }
        for _ in 0..3 {
            balls.push(delivery(2, 1, "Ishan Kishan", "Mohammed Shami", 4));
        }
        let joined = join_deliveries(&matches, &balls);
        let analysis = analyze(&joined);

        assert_eq!(analysis.total_fours[0], BatterTally { batter: "SA Yadav".into(), count: 13 });
        assert_eq!(analysis.total_fours[1].batter, "Ishan Kishan");
        assert_eq!(analysis.sixes_inning[0].match_id, 2);
        assert_eq!(analysis.most_runs[0].count, 13 * 4 + 9 * 6);
        // 52 in match 1 is a fifty; 54 in match 2 is another.
        assert_eq!(analysis.fifties, vec![BatterTally { batter: "SA Yadav".into(), count: 2 }]);
        assert!(analysis.centuries.is_empty());
    }

    #[test]
    fn century_is_not_a_fifty() {
        let matches = one_match();
        let balls: Vec<DeliveryRecord> =
            (0..17).map(|_| delivery(1, 1, "Shubman Gill", "JJ Bumrah", 6)).collect();
        let joined = join_deliveries(&matches, &balls);
        assert!(milestones(&joined, 50, Some(100)).is_empty());
        assert_eq!(milestones(&joined, 100, None)[0].count, 1);
    }
}
