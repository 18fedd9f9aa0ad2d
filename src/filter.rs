use serde::{Deserialize, Serialize};

use crate::model::{BallContext, MatchRecord};

pub const ALL_SEASONS_LABEL: &str = "All Seasons";

/// Season selector. A literal season keeps that season *and every later one*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonFilter {
    AllSeasons,
    From(String),
}

impl SeasonFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SEASONS_LABEL) {
            Self::AllSeasons
        } else {
            Self::From(trimmed.to_string())
        }
    }

    pub fn admits(&self, season: &str) -> bool {
        match self {
            Self::AllSeasons => true,
            Self::From(from) => season >= from.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::AllSeasons => ALL_SEASONS_LABEL,
            Self::From(season) => season,
        }
    }
}

/// Which fixtures a query is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamScope {
    All,
    Single(String),
    Pair(String, String),
}

impl TeamScope {
    pub fn admits(&self, fixture: &MatchRecord) -> bool {
        match self {
            Self::All => true,
            Self::Single(team) => fixture.involves(team),
            Self::Pair(a, b) => fixture.is_between(a, b),
        }
    }
}

pub struct Filtered<'a> {
    pub matches: Vec<&'a MatchRecord>,
    pub deliveries: Vec<BallContext<'a>>,
}

pub fn filter_matches<'a>(
    matches: &'a [MatchRecord],
    season: &SeasonFilter,
    scope: &TeamScope,
) -> Vec<&'a MatchRecord> {
    matches
        .iter()
        .filter(|m| season.admits(&m.season) && scope.admits(m))
        .collect()
}

pub fn filter_deliveries<'a>(
    deliveries: &[BallContext<'a>],
    season: &SeasonFilter,
    scope: &TeamScope,
) -> Vec<BallContext<'a>> {
    deliveries
        .iter()
        .filter(|d| season.admits(&d.fixture.season) && scope.admits(d.fixture))
        .copied()
        .collect()
}

pub fn apply<'a>(
    matches: &'a [MatchRecord],
    deliveries: &[BallContext<'a>],
    season: &SeasonFilter,
    scope: &TeamScope,
) -> Filtered<'a> {
    Filtered {
        matches: filter_matches(matches, season, scope),
        deliveries: filter_deliveries(deliveries, season, scope),
    }
}
