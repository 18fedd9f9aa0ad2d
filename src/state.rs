use std::collections::VecDeque;

use crate::batting::BattingAnalysis;
use crate::bowling::BowlingAnalysis;
use crate::dataset::MatchSource;
use crate::error::InsightsError;
use crate::filter::{ALL_SEASONS_LABEL, SeasonFilter};
use crate::insights::{self, HeadToHeadInsights, SideAnalysis, TeamInsights};
use crate::match_stats::{HomeAwaySplit, MarginRecord, MarginStats, TossSplit};
use crate::scores::{ScenarioScores, ScoreScenario};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Select,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    HeadToHead,
    SingleTeam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectField {
    Team1,
    Team2,
    Season,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTab {
    Overview,
    HomeAway,
    Toss,
    Scores,
    Knockouts,
    Batting,
    Bowling,
}

impl ResultTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::HomeAway => "Home/Away",
            Self::Toss => "Toss",
            Self::Scores => "Scores",
            Self::Knockouts => "Knockouts",
            Self::Batting => "Batting",
            Self::Bowling => "Bowling",
        }
    }
}

pub fn tabs_for(mode: Mode) -> &'static [ResultTab] {
    match mode {
        Mode::HeadToHead => &[
            ResultTab::Overview,
            ResultTab::HomeAway,
            ResultTab::Toss,
            ResultTab::Batting,
            ResultTab::Bowling,
        ],
        Mode::SingleTeam => &[
            ResultTab::Overview,
            ResultTab::HomeAway,
            ResultTab::Toss,
            ResultTab::Scores,
            ResultTab::Knockouts,
            ResultTab::Batting,
            ResultTab::Bowling,
        ],
    }
}

#[derive(Debug, Clone)]
pub enum Insights {
    HeadToHead(Box<HeadToHeadInsights>),
    Team(Box<TeamInsights>),
}

pub struct AppState {
    pub screen: Screen,
    pub mode: Mode,
    pub field: SelectField,
    pub teams: Vec<String>,
    /// First entry is always the all-seasons sentinel.
    pub seasons: Vec<String>,
    pub team1_idx: usize,
    pub team2_idx: usize,
    pub season_idx: usize,
    pub tab: ResultTab,
    /// Which side of a rivalry the batting and bowling tabs show.
    pub side: usize,
    pub scroll: u16,
    pub results: Option<Insights>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(teams: Vec<String>, seasons: Vec<String>, default_season: &SeasonFilter) -> Self {
        let mut all_seasons = vec![ALL_SEASONS_LABEL.to_string()];
        all_seasons.extend(seasons);
        let season_idx = all_seasons
            .iter()
            .position(|s| s == default_season.label())
            .unwrap_or(0);
        let team2_idx = if teams.len() > 1 { 1 } else { 0 };
        Self {
            screen: Screen::Select,
            mode: Mode::HeadToHead,
            field: SelectField::Team1,
            teams,
            seasons: all_seasons,
            team1_idx: 0,
            team2_idx,
            season_idx,
            tab: ResultTab::Overview,
            side: 0,
            scroll: 0,
            results: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selected_team1(&self) -> Option<&str> {
        self.teams.get(self.team1_idx).map(String::as_str)
    }

    pub fn selected_team2(&self) -> Option<&str> {
        self.teams.get(self.team2_idx).map(String::as_str)
    }

    pub fn selected_season(&self) -> SeasonFilter {
        self.seasons
            .get(self.season_idx)
            .map(|s| SeasonFilter::parse(s))
            .unwrap_or(SeasonFilter::AllSeasons)
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::HeadToHead => Mode::SingleTeam,
            Mode::SingleTeam => Mode::HeadToHead,
        };
        if self.mode == Mode::SingleTeam && self.field == SelectField::Team2 {
            self.field = SelectField::Season;
        }
        self.results = None;
        self.tab = ResultTab::Overview;
    }

    pub fn cycle_field(&mut self) {
        self.field = match (self.field, self.mode) {
            (SelectField::Team1, Mode::HeadToHead) => SelectField::Team2,
            (SelectField::Team1, Mode::SingleTeam) => SelectField::Season,
            (SelectField::Team2, _) => SelectField::Season,
            (SelectField::Season, _) => SelectField::Team1,
        };
    }

    fn field_slot(&mut self) -> (&mut usize, usize) {
        match self.field {
            SelectField::Team1 => (&mut self.team1_idx, self.teams.len()),
            SelectField::Team2 => (&mut self.team2_idx, self.teams.len()),
            SelectField::Season => (&mut self.season_idx, self.seasons.len()),
        }
    }

    pub fn select_next(&mut self) {
        if self.screen == Screen::Results {
            self.scroll = self.scroll.saturating_add(1);
            return;
        }
        let (idx, total) = self.field_slot();
        if total == 0 {
            *idx = 0;
            return;
        }
        *idx = (*idx + 1) % total;
    }

    pub fn select_prev(&mut self) {
        if self.screen == Screen::Results {
            self.scroll = self.scroll.saturating_sub(1);
            return;
        }
        let (idx, total) = self.field_slot();
        if total == 0 {
            *idx = 0;
            return;
        }
        *idx = if *idx == 0 { total - 1 } else { *idx - 1 };
    }

    pub fn next_tab(&mut self) {
        let tabs = tabs_for(self.mode);
        let pos = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = tabs[(pos + 1) % tabs.len()];
        self.scroll = 0;
    }

    pub fn prev_tab(&mut self) {
        let tabs = tabs_for(self.mode);
        let pos = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = tabs[(pos + tabs.len() - 1) % tabs.len()];
        self.scroll = 0;
    }

    pub fn toggle_side(&mut self) {
        self.side = 1 - self.side.min(1);
    }

    /// Runs one full fetch and aggregation for the current selection.
    /// Failures go to the console; the previous results are cleared.
    pub fn search(&mut self, source: &dyn MatchSource) {
        let season = self.selected_season();
        let team1 = self.selected_team1().unwrap_or_default().to_string();
        let outcome = match self.mode {
            Mode::HeadToHead => {
                let team2 = self.selected_team2().unwrap_or_default().to_string();
                insights::head_to_head_insights(source, &team1, &team2, &season)
                    .map(|r| Insights::HeadToHead(Box::new(r)))
            }
            Mode::SingleTeam => insights::team_insights(source, &team1, &season)
                .map(|r| Insights::Team(Box::new(r))),
        };
        match outcome {
            Ok(results) => {
                let summary = match &results {
                    Insights::HeadToHead(h) => format!(
                        "[INFO] {} v {} ({}): {} matches",
                        h.team1,
                        h.team2,
                        season.label(),
                        h.record.total_matches_played
                    ),
                    Insights::Team(t) => format!(
                        "[INFO] {} ({}): {} matches",
                        t.team,
                        season.label(),
                        t.record.total_matches
                    ),
                };
                self.push_log(summary);
                self.results = Some(results);
                self.screen = Screen::Results;
                self.tab = ResultTab::Overview;
                self.side = 0;
                self.scroll = 0;
            }
            Err(err) => {
                let level = match err {
                    InsightsError::DataSource(_) => "[ERROR]",
                    _ => "[WARN]",
                };
                self.push_log(format!("{level} {err}"));
                self.results = None;
            }
        }
    }

    pub fn current_side(&self) -> Option<&SideAnalysis> {
        match self.results.as_ref()? {
            Insights::HeadToHead(h) => Some(if self.side == 0 {
                &h.side_team1
            } else {
                &h.side_team2
            }),
            Insights::Team(_) => None,
        }
    }

    /// Text body for the active tab.
    pub fn report_lines(&self) -> Vec<String> {
        let Some(results) = self.results.as_ref() else {
            return vec!["No results yet. Pick teams and press Enter.".to_string()];
        };
        match results {
            Insights::HeadToHead(h) => self.head_to_head_lines(h),
            Insights::Team(t) => self.team_lines(t),
        }
    }

    fn head_to_head_lines(&self, h: &HeadToHeadInsights) -> Vec<String> {
        match self.tab {
            ResultTab::Overview => {
                let mut lines = vec![
                    format!("{} v {}  |  {}", h.team1, h.team2, h.season.label()),
                    format!("Matches played: {}", h.record.total_matches_played),
                    format!("Won by {}: {}", h.team1, h.record.won_by_team1),
                    format!("Won by {}: {}", h.team2, h.record.won_by_team2),
                    format!("No result: {}", h.record.drawn),
                    String::new(),
                ];
                lines.extend(margin_lines(&h.team1, &h.margins_team1));
                lines.extend(margin_lines(&h.team2, &h.margins_team2));
                lines.push(String::new());
                lines.push("Most player-of-the-match awards:".to_string());
                for row in &h.top_players_of_match {
                    lines.push(format!("  {:<28} {}", row.player, row.awards));
                }
                lines
            }
            ResultTab::HomeAway => {
                let mut lines = home_away_lines(&h.team1, &h.home_away.team1);
                lines.push(String::new());
                lines.extend(home_away_lines(&h.team2, &h.home_away.team2));
                lines
            }
            ResultTab::Toss => {
                let mut lines = toss_lines(&h.team1, &h.toss_team1);
                lines.push(String::new());
                lines.extend(toss_lines(&h.team2, &h.toss_team2));
                lines
            }
            ResultTab::Batting => self
                .current_side()
                .map(|side| batting_lines(&side.team, &side.batting))
                .unwrap_or_default(),
            ResultTab::Bowling => self
                .current_side()
                .map(|side| bowling_lines(&side.team, &side.bowling))
                .unwrap_or_default(),
            ResultTab::Scores | ResultTab::Knockouts => Vec::new(),
        }
    }

    fn team_lines(&self, t: &TeamInsights) -> Vec<String> {
        match self.tab {
            ResultTab::Overview => {
                let mut lines = vec![
                    format!("{}  |  {}", t.team, t.season.label()),
                    format!("Matches: {}", t.record.total_matches),
                    format!("Won: {}", t.record.matches_won.len()),
                    format!("Lost: {} (incl. {} no result)", t.record.matches_lost.len(), t.record.no_result),
                    format!("Win %: {:.2}", t.win_pct),
                    format!(
                        "Super overs: {} played, {} won, {} lost",
                        t.super_over.matches.len(),
                        t.super_over.won,
                        t.super_over.lost()
                    ),
                    String::new(),
                ];
                lines.extend(margin_lines(&t.team, &t.margins));
                lines.push(String::new());
                lines.push("Most player-of-the-match awards:".to_string());
                for row in &t.top_players_of_match {
                    lines.push(format!("  {:<28} {}", row.player, row.awards));
                }
                lines
            }
            ResultTab::HomeAway => home_away_lines(&t.team, &t.home_away),
            ResultTab::Toss => toss_lines(&t.team, &t.toss),
            ResultTab::Scores => {
                let mut lines = score_lines("Highest", &t.team, &t.highest_scores);
                lines.push(String::new());
                lines.extend(score_lines("Lowest", &t.team, &t.lowest_scores));
                lines
            }
            ResultTab::Knockouts => {
                let k = &t.knockouts;
                let mut lines = vec![
                    format!("Finals played: {}", k.final_matches.len()),
                    format!("Titles: {}", k.trophies()),
                    format!("Finals lost: {}", k.finals_lost(&t.team).count()),
                    format!("Other knockout matches: {}", k.non_final_matches.len()),
                    String::new(),
                ];
                for m in k.final_matches.iter().chain(&k.non_final_matches) {
                    lines.push(format!(
                        "  {:<7} {:<12} {} v {}  winner: {}",
                        m.season,
                        m.match_type.label(),
                        m.team1,
                        m.team2,
                        m.winner.as_deref().unwrap_or("no result")
                    ));
                }
                lines
            }
            ResultTab::Batting => batting_lines(&t.team, &t.batting),
            ResultTab::Bowling => bowling_lines(&t.team, &t.bowling),
        }
    }
}

fn margin_lines(team: &str, margins: &MarginStats) -> Vec<String> {
    let describe = |m: Option<&MarginRecord>, unit: &str| match m {
        Some(r) => format!(
            "{} {unit} v {} ({})",
            r.margin,
            r.fixture.opponent_of(team).unwrap_or("?"),
            r.fixture.season
        ),
        None => "-".to_string(),
    };
    vec![
        format!(
            "{team} biggest win by runs: {}",
            describe(margins.largest_win_by_runs.as_ref(), "runs")
        ),
        format!(
            "{team} biggest win by wickets: {}",
            describe(margins.largest_win_by_wickets.as_ref(), "wickets")
        ),
    ]
}

fn home_away_lines(team: &str, split: &HomeAwaySplit) -> Vec<String> {
    vec![
        team.to_string(),
        format!("  Home: {} won, {} lost", split.home_wins, split.home_losses),
        format!("  Away: {} won, {} lost", split.away_wins, split.away_losses),
    ]
}

fn toss_lines(team: &str, split: &TossSplit) -> Vec<String> {
    vec![
        team.to_string(),
        format!(
            "  Toss won {} of {} ({:.2}%)",
            split.toss_won,
            split.total_matches,
            split.toss_win_pct()
        ),
        format!(
            "  After winning toss: {} won, {} lost ({:.2}% wins)",
            split.toss_won_match_won,
            split.toss_won_match_lost(),
            split.win_pct_after_toss_won()
        ),
        format!(
            "  After losing toss: {} won, {} lost ({:.2}% wins)",
            split.toss_lost_match_won,
            split.toss_lost_match_lost(),
            split.win_pct_after_toss_lost()
        ),
    ]
}

fn score_lines(extreme: &str, team: &str, scores: &ScenarioScores) -> Vec<String> {
    let mut lines = vec![format!("{extreme} scores")];
    for scenario in ScoreScenario::ALL {
        match scores.get(scenario) {
            Some(r) => lines.push(format!(
                "  {:<26} {:>4}  v {} ({})",
                scenario.label(),
                r.score,
                r.fixture.opponent_of(team).unwrap_or("?"),
                r.fixture.season
            )),
            None => lines.push(format!("  {:<26}    -", scenario.label())),
        }
    }
    lines
}

fn batting_lines(team: &str, b: &BattingAnalysis) -> Vec<String> {
    let mut lines = vec![format!("{team} batting")];
    lines.push("Most runs:".to_string());
    for row in &b.most_runs {
        lines.push(format!("  {:<28} {}", row.batter, row.count));
    }
    lines.push("Highest innings:".to_string());
    for row in &b.highest_innings {
        let sr = row
            .strike_rate
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {:<28} {:>3} ({} balls, SR {sr})  match {}",
            row.batter, row.runs, row.balls, row.match_id
        ));
    }
    lines.push("Most fours:".to_string());
    for row in &b.total_fours {
        lines.push(format!("  {:<28} {}", row.batter, row.count));
    }
    lines.push("Most sixes:".to_string());
    for row in &b.total_sixes {
        lines.push(format!("  {:<28} {}", row.batter, row.count));
    }
    lines.push("Fifties:".to_string());
    for row in &b.fifties {
        lines.push(format!("  {:<28} {}", row.batter, row.count));
    }
    lines.push("Centuries:".to_string());
    for row in &b.centuries {
        lines.push(format!("  {:<28} {}", row.batter, row.count));
    }
    lines
}

fn bowling_lines(team: &str, bowling: &BowlingAnalysis) -> Vec<String> {
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
    let mut lines = vec![format!("{team} bowling"), "Most wickets:".to_string()];
    for row in &bowling.wickets_total {
        lines.push(format!(
            "  {:<28} {:>3} wkts  {:>4} runs  {} ov  SR {}  Econ {}",
            row.bowler,
            row.wickets,
            row.runs_conceded,
            row.overs,
            fmt(row.strike_rate),
            fmt(row.economy_rate)
        ));
    }
    lines.push("Best figures:".to_string());
    for row in bowling.wickets_inning.iter().take(10) {
        lines.push(format!(
            "  {:<28} {}/{}  ({} ov)  match {}",
            row.bowler,
            row.wickets,
            row.runs_conceded,
            row.overs,
            row.match_id.map(|id| id.to_string()).unwrap_or_default()
        ));
    }
    lines
}
