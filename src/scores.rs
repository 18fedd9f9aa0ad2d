//! Highest and lowest team totals under the four toss scenarios.
//!
//! Match rows only carry the chase target, so totals are reconstructed:
//! a side batting first made `target_runs - 1`. This ignores the rare case of a
//! tied or abandoned first innings where the target was set differently.
//! A chasing side either reached the target (any non-runs result it won)
//! or fell short by the runs margin.

use serde::Serialize;

use crate::model::{MatchRecord, ResultKind, TossDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScoreScenario {
    TossWonBat,
    TossWonField,
    TossLostBat,
    TossLostField,
}

impl ScoreScenario {
    pub const ALL: [ScoreScenario; 4] = [
        ScoreScenario::TossWonBat,
        ScoreScenario::TossWonField,
        ScoreScenario::TossLostBat,
        ScoreScenario::TossLostField,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TossWonBat => "Won toss, batted first",
            Self::TossWonField => "Won toss, fielded first",
            Self::TossLostBat => "Lost toss, batted first",
            Self::TossLostField => "Lost toss, fielded first",
        }
    }

    fn matches(self, fixture: &MatchRecord, team: &str) -> bool {
        let Some(decision) = fixture.toss_decision else {
            return false;
        };
        if fixture.toss_winner.is_none() || !fixture.involves(team) {
            return false;
        }
        let won_toss = fixture.toss_won_by(team);
        match self {
            Self::TossWonBat => won_toss && decision == TossDecision::Bat,
            Self::TossWonField => won_toss && decision == TossDecision::Field,
            Self::TossLostBat => !won_toss && decision == TossDecision::Field,
            Self::TossLostField => !won_toss && decision == TossDecision::Bat,
        }
    }

    fn batting_first(self) -> bool {
        matches!(self, Self::TossWonBat | Self::TossLostBat)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRecord {
    pub scenario: ScoreScenario,
    pub score: i64,
    pub fixture: MatchRecord,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioScores {
    pub toss_won_bat: Option<ScoreRecord>,
    pub toss_won_field: Option<ScoreRecord>,
    pub toss_lost_bat: Option<ScoreRecord>,
    pub toss_lost_field: Option<ScoreRecord>,
}

impl ScenarioScores {
    pub fn get(&self, scenario: ScoreScenario) -> Option<&ScoreRecord> {
        match scenario {
            ScoreScenario::TossWonBat => self.toss_won_bat.as_ref(),
            ScoreScenario::TossWonField => self.toss_won_field.as_ref(),
            ScoreScenario::TossLostBat => self.toss_lost_bat.as_ref(),
            ScoreScenario::TossLostField => self.toss_lost_field.as_ref(),
        }
    }

    fn slot(&mut self, scenario: ScoreScenario) -> &mut Option<ScoreRecord> {
        match scenario {
            ScoreScenario::TossWonBat => &mut self.toss_won_bat,
            ScoreScenario::TossWonField => &mut self.toss_won_field,
            ScoreScenario::TossLostBat => &mut self.toss_lost_bat,
            ScoreScenario::TossLostField => &mut self.toss_lost_field,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        ScoreScenario::ALL.into_iter().filter_map(|s| self.get(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Highest,
    Lowest,
}

/// Team total for one fixture, `None` when it cannot be reconstructed.
pub fn team_score(fixture: &MatchRecord, team: &str, scenario: ScoreScenario) -> Option<i64> {
    let target = fixture.target_runs?;
    if scenario.batting_first() {
        return Some(target - 1);
    }
    match fixture.result {
        ResultKind::Runs => Some(target - fixture.result_margin? - 1),
        _ if fixture.won_by(team) => Some(target),
        _ => None,
    }
}

/// Scores for every fixture of a scenario, as a fresh table in input order.
pub fn scenario_scores<'a>(
    matches: &[&'a MatchRecord],
    team: &str,
    scenario: ScoreScenario,
) -> Vec<(i64, &'a MatchRecord)> {
    matches
        .iter()
        .filter(|m| scenario.matches(m, team))
        .filter_map(|m| team_score(m, team, scenario).map(|score| (score, *m)))
        .collect()
}

pub fn extreme_scores(matches: &[&MatchRecord], team: &str, extreme: Extreme) -> ScenarioScores {
    let mut out = ScenarioScores::default();
    for scenario in ScoreScenario::ALL {
        let rows = scenario_scores(matches, team, scenario);
        // First row wins ties, as a stable sort would leave it.
        let mut best: Option<(i64, &MatchRecord)> = None;
        for (score, fixture) in rows {
            let better = match (best, extreme) {
                (None, _) => true,
                (Some((current, _)), Extreme::Highest) => score > current,
                (Some((current, _)), Extreme::Lowest) => score < current,
            };
            if better {
                best = Some((score, fixture));
            }
        }
        *out.slot(scenario) = best.map(|(score, fixture)| ScoreRecord {
            scenario,
            score,
            fixture: fixture.clone(),
        });
    }
    out
}

pub fn highest_scores(matches: &[&MatchRecord], team: &str) -> ScenarioScores {
    extreme_scores(matches, team, Extreme::Highest)
}

pub fn lowest_scores(matches: &[&MatchRecord], team: &str) -> ScenarioScores {
    extreme_scores(matches, team, Extreme::Lowest)
}
