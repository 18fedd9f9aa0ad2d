use ipl_insights::demo_league::{self, DEMO_TEAMS};
use ipl_insights::filter::SeasonFilter;
use ipl_insights::innings::{self, InningsRole};
use ipl_insights::model::join_deliveries;
use ipl_insights::{InsightsError, analyze_head_to_head, analyze_team};

fn seasons() -> Vec<SeasonFilter> {
    vec![
        SeasonFilter::AllSeasons,
        SeasonFilter::parse("2010"),
        SeasonFilter::parse("2013"),
        SeasonFilter::parse("2099"),
    ]
}

#[test]
fn head_to_head_outcomes_cover_every_match() {
    let league = demo_league::generate(42, 4);
    for season in seasons() {
        for (i, team1) in DEMO_TEAMS.iter().enumerate() {
            for team2 in &DEMO_TEAMS[i + 1..] {
                let h2h =
                    analyze_head_to_head(&league.matches, &league.deliveries, team1, team2, &season)
                        .expect("known teams");
                let record = &h2h.record;
                assert_eq!(
                    record.won_by_team1 + record.won_by_team2 + record.drawn,
                    record.total_matches_played,
                    "{team1} v {team2} ({season:?})"
                );
            }
        }
    }
}

#[test]
fn team_home_away_sums_to_matches_played() {
    let league = demo_league::generate(17, 3);
    for season in seasons() {
        for team in DEMO_TEAMS {
            let insights = analyze_team(&league.matches, &league.deliveries, team, &season)
                .expect("known team");
            assert_eq!(
                insights.home_away.total(),
                insights.record.total_matches,
                "{team} ({season:?})"
            );
            assert_eq!(
                insights.record.matches_won.len() + insights.record.matches_lost.len(),
                insights.record.total_matches
            );
        }
    }
}

#[test]
fn literal_season_means_from_that_season_on() {
    let league = demo_league::generate(5, 4);
    let team = DEMO_TEAMS[0];
    let all = analyze_team(&league.matches, &league.deliveries, team, &SeasonFilter::AllSeasons)
        .unwrap();
    let from_first = analyze_team(&league.matches, &league.deliveries, team, &SeasonFilter::parse("2008"))
        .unwrap();
    let from_last = analyze_team(&league.matches, &league.deliveries, team, &SeasonFilter::parse("2011"))
        .unwrap();
    assert_eq!(all.record.total_matches, from_first.record.total_matches);
    assert!(from_last.record.total_matches < all.record.total_matches);
    assert!(from_last.record.total_matches > 0);
}

#[test]
fn partition_splits_each_match_into_two_covering_sets() {
    let league = demo_league::generate(99, 1);
    let joined = join_deliveries(&league.matches, &league.deliveries);
    for fixture in league.matches.iter().take(10) {
        let balls: Vec<_> = joined
            .iter()
            .copied()
            .filter(|c| c.fixture.id == fixture.id)
            .collect();
        let split = innings::partition(&fixture.team1, &balls);
        assert_eq!(split.batting.len() + split.bowling.len(), balls.len());

        let mirror = innings::partition(&fixture.team2, &balls);
        assert_eq!(mirror.batting.len(), split.bowling.len());
        assert_eq!(mirror.bowling.len(), split.batting.len());

        for ctx in &split.batting {
            assert_eq!(innings::role_of(&fixture.team1, ctx), Some(InningsRole::Batting));
        }
    }
}

#[test]
fn bowler_wickets_never_include_run_outs() {
    let league = demo_league::generate(8, 3);
    let team = DEMO_TEAMS[1];
    let insights =
        analyze_team(&league.matches, &league.deliveries, team, &SeasonFilter::AllSeasons).unwrap();

    let joined = join_deliveries(&league.matches, &league.deliveries);
    let bowling = innings::partition(team, &joined).bowling;
    for row in &insights.bowling.wickets_total {
        let credited = bowling
            .iter()
            .filter(|c| c.ball.bowler == row.bowler && c.ball.is_wicket)
            .filter(|c| c.ball.dismissal_kind.as_deref() != Some("run out"))
            .count();
        assert_eq!(row.wickets as usize, credited, "{}", row.bowler);
    }
    for pair in insights.bowling.wickets_total.windows(2) {
        assert!(
            pair[0].wickets > pair[1].wickets
                || (pair[0].wickets == pair[1].wickets
                    && pair[0].runs_conceded <= pair[1].runs_conceded)
        );
    }
}

#[test]
fn analysis_is_repeatable_on_the_same_snapshot() {
    let league = demo_league::generate(1234, 2);
    let before = league.matches.clone();
    let season = SeasonFilter::AllSeasons;
    let first = analyze_team(&league.matches, &league.deliveries, DEMO_TEAMS[2], &season).unwrap();
    let second = analyze_team(&league.matches, &league.deliveries, DEMO_TEAMS[2], &season).unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert_eq!(league.matches, before);
}

#[test]
fn unmapped_team_reports_missing_home_city() {
    let mut league = demo_league::generate(3, 1);
    for m in &mut league.matches {
        if m.team1 == DEMO_TEAMS[0] {
            m.team1 = "Kochi Nomads".to_string();
        }
    }
    let err = analyze_team(
        &league.matches,
        &league.deliveries,
        "Kochi Nomads",
        &SeasonFilter::AllSeasons,
    )
    .unwrap_err();
    assert!(matches!(err, InsightsError::UnknownHomeCity(team) if team == "Kochi Nomads"));
}
