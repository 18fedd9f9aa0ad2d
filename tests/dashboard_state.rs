use ipl_insights::dataset::{InMemorySource, MatchSource};
use ipl_insights::demo_league;
use ipl_insights::filter::SeasonFilter;
use ipl_insights::state::{AppState, Insights, Mode, ResultTab, Screen, SelectField, tabs_for};

fn demo_state(league: &InMemorySource) -> AppState {
    AppState::new(
        league.teams().unwrap(),
        league.seasons().unwrap(),
        &SeasonFilter::AllSeasons,
    )
}

#[test]
fn season_list_starts_with_all_seasons() {
    let league = demo_league::generate(1, 2);
    let state = demo_state(&league);
    assert_eq!(state.seasons[0], "All Seasons");
    assert_eq!(state.selected_season(), SeasonFilter::AllSeasons);

    let state = AppState::new(
        league.teams().unwrap(),
        league.seasons().unwrap(),
        &SeasonFilter::parse("2009"),
    );
    assert_eq!(state.selected_season(), SeasonFilter::From("2009".into()));
}

#[test]
fn same_team_search_logs_a_warning() {
    let league = demo_league::generate(1, 1);
    let mut state = demo_state(&league);
    state.team2_idx = state.team1_idx;
    state.search(&league);
    assert!(state.results.is_none());
    assert_eq!(state.screen, Screen::Select);
    let last = state.logs.back().unwrap();
    assert!(last.starts_with("[WARN]"), "{last}");
}

#[test]
fn head_to_head_search_switches_to_results() {
    let league = demo_league::generate(2, 2);
    let mut state = demo_state(&league);
    state.search(&league);
    assert_eq!(state.screen, Screen::Results);
    assert!(matches!(state.results, Some(Insights::HeadToHead(_))));
    assert!(state.logs.back().unwrap().starts_with("[INFO]"));

    let first_side = state.current_side().unwrap().team.clone();
    state.toggle_side();
    assert_ne!(state.current_side().unwrap().team, first_side);
}

#[test]
fn single_team_mode_skips_team2_and_offers_all_tabs() {
    let league = demo_league::generate(3, 1);
    let mut state = demo_state(&league);
    state.toggle_mode();
    assert_eq!(state.mode, Mode::SingleTeam);
    state.cycle_field();
    assert_eq!(state.field, SelectField::Season);
    state.cycle_field();
    assert_eq!(state.field, SelectField::Team1);

    state.search(&league);
    assert!(matches!(state.results, Some(Insights::Team(_))));
    let tabs = tabs_for(Mode::SingleTeam);
    for _ in 0..tabs.len() {
        assert!(!state.report_lines().is_empty());
        state.next_tab();
    }
    assert_eq!(state.tab, ResultTab::Overview);
    state.prev_tab();
    assert_eq!(state.tab, ResultTab::Bowling);
}

#[test]
fn selection_wraps_around() {
    let league = demo_league::generate(4, 1);
    let mut state = demo_state(&league);
    state.select_prev();
    assert_eq!(state.team1_idx, state.teams.len() - 1);
    state.select_next();
    assert_eq!(state.team1_idx, 0);
}

#[test]
fn console_keeps_the_latest_entries() {
    let mut state = AppState::new(Vec::new(), Vec::new(), &SeasonFilter::AllSeasons);
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().unwrap(), "[INFO] line 50");
}
