use std::collections::HashMap;

use serde::Serialize;

use crate::error::InsightsResult;
use crate::model::{MatchRecord, MatchType, ResultKind};
use crate::rates::percentage;
use crate::teams::home_city;

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadRecord {
    pub total_matches_played: usize,
    pub won_by_team1: usize,
    pub won_by_team2: usize,
    pub drawn: usize,
    pub won_matches_team1: Vec<MatchRecord>,
    pub won_matches_team2: Vec<MatchRecord>,
}

pub fn head_to_head_record(matches: &[&MatchRecord], team1: &str, team2: &str) -> HeadToHeadRecord {
    let won_matches_team1 = collect(matches, |m| m.won_by(team1));
    let won_matches_team2 = collect(matches, |m| m.won_by(team2));
    HeadToHeadRecord {
        total_matches_played: matches.len(),
        won_by_team1: won_matches_team1.len(),
        won_by_team2: won_matches_team2.len(),
        drawn: matches.iter().filter(|m| m.is_drawn()).count(),
        won_matches_team1,
        won_matches_team2,
    }
}

/// Single-team record. A match the team did not win counts as lost,
/// no-result fixtures included; `no_result` reports how many of those had no winner.
#[derive(Debug, Clone, Serialize)]
pub struct TeamRecord {
    pub total_matches: usize,
    pub matches_won: Vec<MatchRecord>,
    pub matches_lost: Vec<MatchRecord>,
    pub no_result: usize,
}

impl TeamRecord {
    pub fn win_pct(&self) -> f64 {
        percentage(self.matches_won.len(), self.total_matches)
    }
}

pub fn team_record(matches: &[&MatchRecord], team: &str) -> TeamRecord {
    TeamRecord {
        total_matches: matches.len(),
        matches_won: collect(matches, |m| m.won_by(team)),
        matches_lost: collect(matches, |m| !m.won_by(team)),
        no_result: matches.iter().filter(|m| m.is_drawn()).count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HomeAwaySplit {
    pub home_wins: usize,
    pub home_losses: usize,
    pub away_wins: usize,
    pub away_losses: usize,
}

impl HomeAwaySplit {
    pub fn total(&self) -> usize {
        self.home_wins + self.home_losses + self.away_wins + self.away_losses
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeadToHeadHomeAway {
    pub team1: HomeAwaySplit,
    pub team2: HomeAwaySplit,
}

fn is_home(fixture: &MatchRecord, city: &str) -> bool {
    fixture.city.as_deref() == Some(city)
}

/// Home/away for a single team; anything not won is a loss.
pub fn home_away(matches: &[&MatchRecord], team: &str) -> InsightsResult<HomeAwaySplit> {
    let city = home_city(team)?;
    let mut split = HomeAwaySplit::default();
    for m in matches {
        match (is_home(m, city), m.won_by(team)) {
            (true, true) => split.home_wins += 1,
            (true, false) => split.home_losses += 1,
            (false, true) => split.away_wins += 1,
            (false, false) => split.away_losses += 1,
        }
    }
    Ok(split)
}

/// Home/away for one side of a rivalry; only wins by `opponent` are losses.
fn home_away_against(
    matches: &[&MatchRecord],
    team: &str,
    opponent: &str,
) -> InsightsResult<HomeAwaySplit> {
    let city = home_city(team)?;
    let mut split = HomeAwaySplit::default();
    for m in matches {
        let home = is_home(m, city);
        if m.won_by(team) {
            if home {
                split.home_wins += 1;
            } else {
                split.away_wins += 1;
            }
        } else if m.won_by(opponent) {
            if home {
                split.home_losses += 1;
            } else {
                split.away_losses += 1;
            }
        }
    }
    Ok(split)
}

pub fn head_to_head_home_away(
    matches: &[&MatchRecord],
    team1: &str,
    team2: &str,
) -> InsightsResult<HeadToHeadHomeAway> {
    Ok(HeadToHeadHomeAway {
        team1: home_away_against(matches, team1, team2)?,
        team2: home_away_against(matches, team2, team1)?,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TossSplit {
    pub total_matches: usize,
    pub toss_won: usize,
    pub toss_won_match_won: usize,
    pub toss_lost_match_won: usize,
}

impl TossSplit {
    pub fn toss_lost(&self) -> usize {
        self.total_matches.saturating_sub(self.toss_won)
    }

    pub fn toss_won_match_lost(&self) -> usize {
        self.toss_won.saturating_sub(self.toss_won_match_won)
    }

    pub fn toss_lost_match_lost(&self) -> usize {
        self.toss_lost().saturating_sub(self.toss_lost_match_won)
    }

    pub fn toss_win_pct(&self) -> f64 {
        percentage(self.toss_won, self.total_matches)
    }

    pub fn win_pct_after_toss_won(&self) -> f64 {
        percentage(self.toss_won_match_won, self.toss_won)
    }

    pub fn win_pct_after_toss_lost(&self) -> f64 {
        percentage(self.toss_lost_match_won, self.toss_lost())
    }
}

pub fn toss_split(matches: &[&MatchRecord], team: &str) -> TossSplit {
    let mut split = TossSplit {
        total_matches: matches.len(),
        ..TossSplit::default()
    };
    for m in matches {
        let won_toss = m.toss_won_by(team);
        let won_match = m.won_by(team);
        if won_toss {
            split.toss_won += 1;
            if won_match {
                split.toss_won_match_won += 1;
            }
        } else if won_match {
            split.toss_lost_match_won += 1;
        }
    }
    split
}

#[derive(Debug, Clone, Serialize)]
pub struct SuperOverSplit {
    pub matches: Vec<MatchRecord>,
    pub won: usize,
}

impl SuperOverSplit {
    pub fn lost(&self) -> usize {
        self.matches.len().saturating_sub(self.won)
    }
}

pub fn super_over_split(matches: &[&MatchRecord], team: &str) -> SuperOverSplit {
    let super_overs = collect(matches, |m| m.super_over);
    let won = super_overs.iter().filter(|m| m.won_by(team)).count();
    SuperOverSplit {
        matches: super_overs,
        won,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnockoutSplit {
    pub final_matches: Vec<MatchRecord>,
    pub final_matches_won: Vec<MatchRecord>,
    /// Qualifiers, eliminators and semi-finals.
    pub non_final_matches: Vec<MatchRecord>,
}

impl KnockoutSplit {
    pub fn trophies(&self) -> usize {
        self.final_matches_won.len()
    }

    pub fn finals_lost<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a MatchRecord> + 'a {
        self.final_matches.iter().filter(move |m| !m.won_by(team))
    }
}

pub fn knockout_split(matches: &[&MatchRecord], team: &str) -> KnockoutSplit {
    let final_matches = collect(matches, |m| m.match_type == MatchType::Final);
    let final_matches_won = final_matches
        .iter()
        .filter(|m| m.won_by(team))
        .cloned()
        .collect();
    KnockoutSplit {
        final_matches,
        final_matches_won,
        non_final_matches: collect(matches, |m| matches!(m.match_type, MatchType::Knockout(_))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarginRecord {
    pub margin: i64,
    pub fixture: MatchRecord,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarginStats {
    pub largest_win_by_runs: Option<MarginRecord>,
    pub largest_win_by_wickets: Option<MarginRecord>,
}

pub fn margin_stats(matches: &[&MatchRecord], team: &str) -> MarginStats {
    MarginStats {
        largest_win_by_runs: largest_margin(matches, team, ResultKind::Runs),
        largest_win_by_wickets: largest_margin(matches, team, ResultKind::Wickets),
    }
}

fn largest_margin(matches: &[&MatchRecord], team: &str, kind: ResultKind) -> Option<MarginRecord> {
    let mut best: Option<MarginRecord> = None;
    for m in matches.iter().filter(|m| m.won_by(team) && m.result == kind) {
        let Some(margin) = m.result_margin else {
            continue;
        };
        if best.as_ref().is_none_or(|b| margin > b.margin) {
            best = Some(MarginRecord {
                margin,
                fixture: (*m).clone(),
            });
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerOfMatchCount {
    pub player: String,
    pub awards: usize,
}

pub fn top_players_of_match(matches: &[&MatchRecord], limit: usize) -> Vec<PlayerOfMatchCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in matches {
        if let Some(player) = m.player_of_match.as_deref() {
            *counts.entry(player).or_insert(0) += 1;
        }
    }
    let mut rows: Vec<PlayerOfMatchCount> = counts
        .into_iter()
        .map(|(player, awards)| PlayerOfMatchCount {
            player: player.to_string(),
            awards,
        })
        .collect();
    rows.sort_by(|a, b| b.awards.cmp(&a.awards).then_with(|| a.player.cmp(&b.player)));
    rows.truncate(limit);
    rows
}

fn collect(matches: &[&MatchRecord], keep: impl Fn(&MatchRecord) -> bool) -> Vec<MatchRecord> {
    matches
        .iter()
        .filter(|m| keep(m))
        .map(|m| (*m).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    const CSK: &str = "Chennai Super Kings";
    const MI: &str = "Mumbai Indians";

    #[test]
    fn null_winner_is_drawn_not_a_win() {
        let rows = [
            fixture(1, CSK, MI).winner(CSK).build(),
            fixture(2, MI, CSK).winner(CSK).build(),
            fixture(3, CSK, MI).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let record = head_to_head_record(&refs, CSK, MI);
        assert_eq!(record.total_matches_played, 3);
        assert_eq!(record.won_by_team1, 2);
        assert_eq!(record.won_by_team2, 0);
        assert_eq!(record.drawn, 1);
        assert_eq!(record.won_matches_team1.len(), 2);
    }

    #[test]
    fn single_team_home_away_covers_every_match() {
        let rows = [
            fixture(1, CSK, MI).city("Chennai").winner(CSK).build(),
            fixture(2, CSK, MI).city("Chennai").winner(MI).build(),
            fixture(3, MI, CSK).city("Mumbai").winner(CSK).build(),
            fixture(4, MI, CSK).city("Mumbai").build(),
            fixture(5, MI, CSK).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let split = home_away(&refs, CSK).unwrap();
        assert_eq!(
            split,
            HomeAwaySplit {
                home_wins: 1,
                home_losses: 1,
                away_wins: 1,
                away_losses: 2,
            }
        );
        assert_eq!(split.total(), rows.len());
    }

    #[test]
    fn head_to_head_home_away_uses_each_teams_city() {
        let rows = [
            fixture(1, CSK, MI).city("Chennai").winner(CSK).build(),
            fixture(2, MI, CSK).city("Mumbai").winner(MI).build(),
            fixture(3, MI, CSK).city("Bangalore").winner(CSK).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let split = head_to_head_home_away(&refs, CSK, MI).unwrap();
        assert_eq!(split.team1.home_wins, 1);
        assert_eq!(split.team1.away_wins, 1);
        assert_eq!(split.team1.away_losses, 1);
        assert_eq!(split.team2.home_wins, 1);
        assert_eq!(split.team2.home_losses, 0);
        assert_eq!(split.team2.away_losses, 2);
    }

    #[test]
    fn home_away_rejects_unmapped_team() {
        let rows = [fixture(1, "Deccan Gladiators", MI).build()];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        assert!(home_away(&refs, "Deccan Gladiators").is_err());
    }

    #[test]
    fn toss_split_guards_empty_denominators() {
        let rows = [
            fixture(1, CSK, MI).toss(CSK, "bat").winner(CSK).build(),
            fixture(2, CSK, MI).toss(CSK, "field").winner(MI).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let split = toss_split(&refs, CSK);
        assert_eq!(split.toss_won, 2);
        assert_eq!(split.toss_won_match_won, 1);
        assert_eq!(split.toss_lost(), 0);
        assert_eq!(split.win_pct_after_toss_won(), 50.0);
        assert_eq!(split.win_pct_after_toss_lost(), 0.0);

        let empty = toss_split(&[], CSK);
        assert_eq!(empty.toss_win_pct(), 0.0);
        assert_eq!(empty.win_pct_after_toss_won(), 0.0);
    }

    #[test]
    fn knockout_stages() {
        let rows = [
            fixture(1, CSK, MI).match_type("Final").winner(CSK).build(),
            fixture(2, CSK, MI).match_type("Final").winner(MI).build(),
            fixture(3, CSK, MI).match_type("Qualifier 1").winner(CSK).build(),
            fixture(4, CSK, MI).winner(CSK).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let split = knockout_split(&refs, CSK);
        assert_eq!(split.final_matches.len(), 2);
        assert_eq!(split.trophies(), 1);
        assert_eq!(split.finals_lost(CSK).count(), 1);
        assert_eq!(split.non_final_matches.len(), 1);
        assert_eq!(split.non_final_matches[0].id, 3);
    }

    #[test]
    fn super_over_wins() {
        let rows = [
            fixture(1, CSK, MI).super_over().winner(CSK).build(),
            fixture(2, CSK, MI).super_over().winner(MI).build(),
            fixture(3, CSK, MI).winner(CSK).build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let split = super_over_split(&refs, CSK);
        assert_eq!(split.matches.len(), 2);
        assert_eq!(split.won, 1);
        assert_eq!(split.lost(), 1);
    }

    #[test]
    fn largest_margins_and_player_awards() {
        let rows = [
            fixture(1, CSK, MI).winner(CSK).result("runs", 12).potm("MS Dhoni").build(),
            fixture(2, CSK, MI).winner(CSK).result("runs", 40).potm("RA Jadeja").build(),
            fixture(3, CSK, MI).winner(CSK).result("wickets", 7).potm("MS Dhoni").build(),
            fixture(4, CSK, MI).winner(MI).result("runs", 90).potm("JJ Bumrah").build(),
        ];
        let refs: Vec<&MatchRecord> = rows.iter().collect();
        let margins = margin_stats(&refs, CSK);
        assert_eq!(margins.largest_win_by_runs.as_ref().map(|m| m.margin), Some(40));
        assert_eq!(margins.largest_win_by_wickets.as_ref().map(|m| m.margin), Some(7));

        let awards = top_players_of_match(&refs, 2);
        assert_eq!(awards.len(), 2);
        assert_eq!(awards[0].player, "MS Dhoni");
        assert_eq!(awards[0].awards, 2);
        assert_eq!(awards[1].player, "JJ Bumrah");
    }
}
