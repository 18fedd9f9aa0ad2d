use serde::{Deserialize, Serialize};

use crate::model::{BallContext, TossDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InningsRole {
    Batting,
    Bowling,
}

/// Role of `team` during a delivery, derived from the toss alone.
///
/// Returns `None` when toss data is missing or the innings is not 1 or 2
/// (super-over innings are numbered 3 and up).
pub fn innings_role(
    team: &str,
    toss_winner: Option<&str>,
    toss_decision: Option<TossDecision>,
    inning: u8,
) -> Option<InningsRole> {
    let won_toss = toss_winner? == team;
    let decision = toss_decision?;
    let first_innings = match inning {
        1 => true,
        2 => false,
        _ => return None,
    };
    let bats_first = match decision {
        TossDecision::Bat => won_toss,
        TossDecision::Field => !won_toss,
    };
    if bats_first == first_innings {
        Some(InningsRole::Batting)
    } else {
        Some(InningsRole::Bowling)
    }
}

pub fn role_of(team: &str, ctx: &BallContext<'_>) -> Option<InningsRole> {
    innings_role(
        team,
        ctx.fixture.toss_winner.as_deref(),
        ctx.fixture.toss_decision,
        ctx.ball.inning,
    )
}

#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub batting: Vec<BallContext<'a>>,
    pub bowling: Vec<BallContext<'a>>,
}

/// Split deliveries into the team's batting and bowling innings. Rows without
/// a role land in neither side.
pub fn partition<'a>(team: &str, deliveries: &[BallContext<'a>]) -> Partition<'a> {
    let mut out = Partition::default();
    for ctx in deliveries {
        match role_of(team, ctx) {
            Some(InningsRole::Batting) => out.batting.push(*ctx),
            Some(InningsRole::Bowling) => out.bowling.push(*ctx),
            None => {}
        }
    }
    out
}
