use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bat" | "batting" => Some(Self::Bat),
            "field" | "fielding" | "bowl" => Some(Self::Field),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Field => "field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    League,
    Final,
    /// Qualifiers, eliminators, semi-finals.
    Knockout(String),
}

impl MatchType {
    /// An empty label reads as `League`; the importer rejects rows without one.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("league") || trimmed.is_empty() {
            Self::League
        } else if trimmed.eq_ignore_ascii_case("final") {
            Self::Final
        } else {
            Self::Knockout(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::League => "League",
            Self::Final => "Final",
            Self::Knockout(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    Runs,
    Wickets,
    Tie,
    NoResult,
    Other(String),
}

impl ResultKind {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::NoResult;
        };
        match raw.to_ascii_lowercase().as_str() {
            "runs" => Self::Runs,
            "wickets" => Self::Wickets,
            "tie" => Self::Tie,
            "no result" | "na" | "nr" => Self::NoResult,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Runs => "runs",
            Self::Wickets => "wickets",
            Self::Tie => "tie",
            Self::NoResult => "no result",
            Self::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub season: String,
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
    pub match_type: MatchType,
    pub player_of_match: Option<String>,
    pub venue: String,
    pub team1: String,
    pub team2: String,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<TossDecision>,
    pub winner: Option<String>,
    pub result: ResultKind,
    pub result_margin: Option<i64>,
    pub target_runs: Option<i64>,
    pub target_overs: Option<f64>,
    pub super_over: bool,
    pub method: Option<String>,
}

impl MatchRecord {
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }

    pub fn won_by(&self, team: &str) -> bool {
        self.winner.as_deref() == Some(team)
    }

    pub fn toss_won_by(&self, team: &str) -> bool {
        self.toss_winner.as_deref() == Some(team)
    }

    pub fn is_drawn(&self) -> bool {
        self.winner.is_none()
    }

    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.team1 == team {
            Some(&self.team2)
        } else if self.team2 == team {
            Some(&self.team1)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub match_id: u64,
    pub inning: u8,
    pub over: u8,
    pub ball: u8,
    pub batter: String,
    pub bowler: String,
    pub batsman_runs: u32,
    pub extra_runs: u32,
    pub total_runs: u32,
    pub extras_type: Option<String>,
    pub is_wicket: bool,
    pub player_dismissed: Option<String>,
    pub dismissal_kind: Option<String>,
}

impl DeliveryRecord {
    pub fn is_wide(&self) -> bool {
        self.extras_type.as_deref() == Some("wides")
    }

    pub fn is_legal(&self) -> bool {
        self.extras_type.is_none()
    }

    pub fn is_run_out(&self) -> bool {
        self.dismissal_kind.as_deref() == Some("run out")
    }

    pub fn is_bowler_wicket(&self) -> bool {
        self.is_wicket && !self.is_run_out()
    }
}

/// A delivery joined to the fixture it was bowled in.
#[derive(Debug, Clone, Copy)]
pub struct BallContext<'a> {
    pub ball: &'a DeliveryRecord,
    pub fixture: &'a MatchRecord,
}

/// Inner join on match id. Deliveries without a fixture cannot be attributed
/// to a team and are dropped.
pub fn join_deliveries<'a>(
    matches: &'a [MatchRecord],
    deliveries: &'a [DeliveryRecord],
) -> Vec<BallContext<'a>> {
    let by_id: HashMap<u64, &MatchRecord> = matches.iter().map(|m| (m.id, m)).collect();
    let mut orphans = 0usize;
    let mut out = Vec::with_capacity(deliveries.len());
    for ball in deliveries {
        match by_id.get(&ball.match_id) {
            Some(fixture) => out.push(BallContext { ball, fixture }),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        log::warn!("dropped {orphans} deliveries with no matching fixture");
    }
    out
}
