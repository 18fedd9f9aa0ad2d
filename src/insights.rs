use serde::Serialize;

use crate::batting::{self, BattingAnalysis};
use crate::bowling::{self, BowlingAnalysis};
use crate::dataset::MatchSource;
use crate::error::{InsightsError, InsightsResult};
use crate::filter::{self, SeasonFilter, TeamScope};
use crate::innings;
use crate::match_stats::{
    self, HeadToHeadHomeAway, HeadToHeadRecord, HomeAwaySplit, KnockoutSplit, MarginStats,
    PlayerOfMatchCount, SuperOverSplit, TeamRecord, TossSplit,
};
use crate::model::{BallContext, DeliveryRecord, MatchRecord, join_deliveries};
use crate::scores::{self, ScenarioScores};

pub const TOP_PLAYERS_OF_MATCH: usize = 5;

/// Batting and bowling seen from one side.
#[derive(Debug, Clone, Serialize)]
pub struct SideAnalysis {
    pub team: String,
    pub batting: BattingAnalysis,
    pub bowling: BowlingAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadInsights {
    pub team1: String,
    pub team2: String,
    pub season: SeasonFilter,
    pub record: HeadToHeadRecord,
    pub home_away: HeadToHeadHomeAway,
    pub toss_team1: TossSplit,
    pub toss_team2: TossSplit,
    pub margins_team1: MarginStats,
    pub margins_team2: MarginStats,
    pub top_players_of_match: Vec<PlayerOfMatchCount>,
    pub side_team1: SideAnalysis,
    pub side_team2: SideAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamInsights {
    pub team: String,
    pub season: SeasonFilter,
    pub record: TeamRecord,
    pub win_pct: f64,
    pub home_away: HomeAwaySplit,
    pub toss: TossSplit,
    pub super_over: SuperOverSplit,
    pub knockouts: KnockoutSplit,
    pub highest_scores: ScenarioScores,
    pub lowest_scores: ScenarioScores,
    pub margins: MarginStats,
    pub top_players_of_match: Vec<PlayerOfMatchCount>,
    pub batting: BattingAnalysis,
    pub bowling: BowlingAnalysis,
}

fn require_team(raw: &str) -> InsightsResult<String> {
    let team = raw.trim();
    if team.is_empty() {
        return Err(InsightsError::MissingTeam);
    }
    Ok(team.to_string())
}

fn require_pair(team1: &str, team2: &str) -> InsightsResult<(String, String)> {
    let team1 = require_team(team1)?;
    let team2 = require_team(team2)?;
    if team1 == team2 {
        return Err(InsightsError::SameTeam(team1));
    }
    Ok((team1, team2))
}

/// Fetch the rivalry from `source` and analyse it. Input is validated
/// before anything is read.
pub fn head_to_head_insights(
    source: &dyn MatchSource,
    team1: &str,
    team2: &str,
    season: &SeasonFilter,
) -> InsightsResult<HeadToHeadInsights> {
    let (team1, team2) = require_pair(team1, team2)?;
    let scope = TeamScope::Pair(team1.clone(), team2.clone());
    let matches = source.fetch_matches(&scope)?;
    let deliveries = source.fetch_deliveries(&scope)?;
    analyze_head_to_head(&matches, &deliveries, &team1, &team2, season)
}

pub fn team_insights(
    source: &dyn MatchSource,
    team: &str,
    season: &SeasonFilter,
) -> InsightsResult<TeamInsights> {
    let team = require_team(team)?;
    let scope = TeamScope::Single(team.clone());
    let matches = source.fetch_matches(&scope)?;
    let deliveries = source.fetch_deliveries(&scope)?;
    analyze_team(&matches, &deliveries, &team, season)
}

pub fn analyze_head_to_head(
    matches: &[MatchRecord],
    deliveries: &[DeliveryRecord],
    team1: &str,
    team2: &str,
    season: &SeasonFilter,
) -> InsightsResult<HeadToHeadInsights> {
    let (team1, team2) = require_pair(team1, team2)?;
    let joined = join_deliveries(matches, deliveries);
    let scope = TeamScope::Pair(team1.clone(), team2.clone());
    let filtered = filter::apply(matches, &joined, season, &scope);
    log::debug!(
        "head-to-head {team1} v {team2} ({}): {} matches, {} deliveries",
        season.label(),
        filtered.matches.len(),
        filtered.deliveries.len()
    );

    let fixtures = &filtered.matches;
    Ok(HeadToHeadInsights {
        record: match_stats::head_to_head_record(fixtures, &team1, &team2),
        home_away: match_stats::head_to_head_home_away(fixtures, &team1, &team2)?,
        toss_team1: match_stats::toss_split(fixtures, &team1),
        toss_team2: match_stats::toss_split(fixtures, &team2),
        margins_team1: match_stats::margin_stats(fixtures, &team1),
        margins_team2: match_stats::margin_stats(fixtures, &team2),
        top_players_of_match: match_stats::top_players_of_match(fixtures, TOP_PLAYERS_OF_MATCH),
        side_team1: side_analysis(&team1, &filtered.deliveries),
        side_team2: side_analysis(&team2, &filtered.deliveries),
        team1,
        team2,
        season: season.clone(),
    })
}

pub fn analyze_team(
    matches: &[MatchRecord],
    deliveries: &[DeliveryRecord],
    team: &str,
    season: &SeasonFilter,
) -> InsightsResult<TeamInsights> {
    let team = require_team(team)?;
    let joined = join_deliveries(matches, deliveries);
    let scope = TeamScope::Single(team.clone());
    let filtered = filter::apply(matches, &joined, season, &scope);
    log::debug!(
        "team {team} ({}): {} matches, {} deliveries",
        season.label(),
        filtered.matches.len(),
        filtered.deliveries.len()
    );

    let fixtures = &filtered.matches;
    let record = match_stats::team_record(fixtures, &team);
    let side = side_analysis(&team, &filtered.deliveries);
    Ok(TeamInsights {
        win_pct: record.win_pct(),
        record,
        home_away: match_stats::home_away(fixtures, &team)?,
        toss: match_stats::toss_split(fixtures, &team),
        super_over: match_stats::super_over_split(fixtures, &team),
        knockouts: match_stats::knockout_split(fixtures, &team),
        highest_scores: scores::highest_scores(fixtures, &team),
        lowest_scores: scores::lowest_scores(fixtures, &team),
        margins: match_stats::margin_stats(fixtures, &team),
        top_players_of_match: match_stats::top_players_of_match(fixtures, TOP_PLAYERS_OF_MATCH),
        batting: side.batting,
        bowling: side.bowling,
        team,
        season: season.clone(),
    })
}

fn side_analysis(team: &str, deliveries: &[BallContext<'_>]) -> SideAnalysis {
    let split = innings::partition(team, deliveries);
    SideAnalysis {
        team: team.to_string(),
        batting: batting::analyze(&split.batting),
        bowling: bowling::analyze(&split.bowling),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemorySource;
    use crate::test_support::{delivery, fixture};

    const SRH: &str = "Sunrisers Hyderabad";
    const LSG: &str = "Lucknow Super Giants";

    struct FailingSource;

    impl MatchSource for FailingSource {
        fn fetch_matches(&self, _: &TeamScope) -> InsightsResult<Vec<MatchRecord>> {
            Err(InsightsError::DataSource("connection refused".into()))
        }
        fn fetch_deliveries(&self, _: &TeamScope) -> InsightsResult<Vec<DeliveryRecord>> {
            Err(InsightsError::DataSource("connection refused".into()))
        }
        fn teams(&self) -> InsightsResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn seasons(&self) -> InsightsResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn same_team_is_rejected_before_fetching() {
        let err = head_to_head_insights(&FailingSource, SRH, SRH, &SeasonFilter::AllSeasons)
            .unwrap_err();
        assert!(matches!(err, InsightsError::SameTeam(team) if team == SRH));
    }

    #[test]
    fn blank_team_is_missing() {
        let err = team_insights(&FailingSource, "  ", &SeasonFilter::AllSeasons).unwrap_err();
        assert!(matches!(err, InsightsError::MissingTeam));
    }

    #[test]
    fn fetch_failure_surfaces_as_data_source() {
        let err = team_insights(&FailingSource, SRH, &SeasonFilter::AllSeasons).unwrap_err();
        assert!(matches!(err, InsightsError::DataSource(_)));
    }

    #[test]
    fn empty_filter_is_zero_not_error() {
        let source = InMemorySource {
            matches: vec![fixture(1, SRH, LSG).season("2019").winner(SRH).build()],
            deliveries: Vec::new(),
        };
        let season = SeasonFilter::parse("2023");
        let insights = head_to_head_insights(&source, SRH, LSG, &season).unwrap();
        assert_eq!(insights.record.total_matches_played, 0);
        assert!(insights.top_players_of_match.is_empty());
        assert!(insights.side_team1.batting.most_runs.is_empty());
    }

    #[test]
    fn sides_mirror_each_other() {
        let source = InMemorySource {
            matches: vec![fixture(1, SRH, LSG).toss(SRH, "bat").winner(SRH).build()],
            deliveries: vec![
                delivery(1, 1, "TM Head", "Ravi Bishnoi", 6),
                delivery(1, 2, "KL Rahul", "T Natarajan", 4),
            ],
        };
        let insights =
            head_to_head_insights(&source, SRH, LSG, &SeasonFilter::AllSeasons).unwrap();
        assert_eq!(insights.side_team1.batting.most_runs[0].batter, "TM Head");
        assert_eq!(insights.side_team2.batting.most_runs[0].batter, "KL Rahul");
        assert_eq!(insights.side_team1.batting.total_sixes.len(), 1);
        assert_eq!(insights.side_team2.batting.total_sixes.len(), 0);
    }
}
