use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::batting::{BattingAnalysis, BatterTally, InningsTally};
use crate::bowling::{BowlingAnalysis, BowlingFigures};
use crate::insights::{HeadToHeadInsights, SideAnalysis, TeamInsights};
use crate::match_stats::{HomeAwaySplit, MarginStats, PlayerOfMatchCount, TossSplit};
use crate::model::MatchRecord;
use crate::scores::{ScenarioScores, ScoreScenario};

pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            rows: vec![header.iter().map(|h| h.to_string()).collect()],
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn data_rows(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
}

pub fn export_team(path: &Path, insights: &TeamInsights) -> Result<ExportReport> {
    save(path, &team_sheets(insights))
}

pub fn export_head_to_head(path: &Path, insights: &HeadToHeadInsights) -> Result<ExportReport> {
    save(path, &head_to_head_sheets(insights))
}

fn save(path: &Path, sheets: &[Sheet]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .with_context(|| format!("name worksheet {}", sheet.name))?;
        write_rows(worksheet, &sheet.rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(ExportReport {
        sheets: sheets.len(),
        rows: sheets.iter().map(Sheet::data_rows).sum(),
    })
}

pub fn team_sheets(insights: &TeamInsights) -> Vec<Sheet> {
    let team = insights.team.as_str();
    let record = &insights.record;

    let mut overview = Sheet::new("Overview", &["Metric", "Value"]);
    overview.push(pair("Team", team));
    overview.push(pair("Season", insights.season.label()));
    overview.push(pair("Matches", record.total_matches));
    overview.push(pair("Won", record.matches_won.len()));
    overview.push(pair("Lost", record.matches_lost.len()));
    overview.push(pair("No result", record.no_result));
    overview.push(pair("Win %", insights.win_pct));
    overview.push(pair("Super overs won", insights.super_over.won));
    overview.push(pair("Super overs lost", insights.super_over.lost()));
    overview.push(pair("Finals", insights.knockouts.final_matches.len()));
    overview.push(pair("Titles", insights.knockouts.trophies()));
    overview.push(pair("Finals lost", insights.knockouts.finals_lost(team).count()));
    overview.push(pair("Other knockouts", insights.knockouts.non_final_matches.len()));
    margin_rows(&mut overview, team, &insights.margins);

    let mut home_away = Sheet::new("HomeAway", HOME_AWAY_HEADER);
    home_away.push(home_away_row(team, &insights.home_away));

    let mut toss = Sheet::new("Toss", TOSS_HEADER);
    toss.push(toss_row(team, &insights.toss));

    let mut scores = Sheet::new("Scores", &["Extreme", "Scenario", "Score", "Match", "Opponent", "Season"]);
    score_rows(&mut scores, "Highest", team, &insights.highest_scores);
    score_rows(&mut scores, "Lowest", team, &insights.lowest_scores);

    let mut knockouts = Sheet::new("Knockouts", MATCH_HEADER);
    for m in insights
        .knockouts
        .final_matches
        .iter()
        .chain(&insights.knockouts.non_final_matches)
    {
        knockouts.push(match_row(m));
    }

    let mut sheets = vec![
        overview,
        home_away,
        toss,
        scores,
        knockouts,
        potm_sheet(&insights.top_players_of_match),
    ];
    sheets.extend(batting_sheets("", &insights.batting));
    sheets.extend(bowling_sheets("", &insights.bowling));
    sheets
}

pub fn head_to_head_sheets(insights: &HeadToHeadInsights) -> Vec<Sheet> {
    let (t1, t2) = (insights.team1.as_str(), insights.team2.as_str());
    let record = &insights.record;

    let mut overview = Sheet::new("Overview", &["Metric", "Value"]);
    overview.push(pair("Teams", format!("{t1} v {t2}")));
    overview.push(pair("Season", insights.season.label()));
    overview.push(pair("Matches", record.total_matches_played));
    overview.push(pair(&format!("Won by {t1}"), record.won_by_team1));
    overview.push(pair(&format!("Won by {t2}"), record.won_by_team2));
    overview.push(pair("No result", record.drawn));
    margin_rows(&mut overview, t1, &insights.margins_team1);
    margin_rows(&mut overview, t2, &insights.margins_team2);

    let mut results = Sheet::new("Results", MATCH_HEADER);
    for m in record.won_matches_team1.iter().chain(&record.won_matches_team2) {
        results.push(match_row(m));
    }

    let mut home_away = Sheet::new("HomeAway", HOME_AWAY_HEADER);
    home_away.push(home_away_row(t1, &insights.home_away.team1));
    home_away.push(home_away_row(t2, &insights.home_away.team2));

    let mut toss = Sheet::new("Toss", TOSS_HEADER);
    toss.push(toss_row(t1, &insights.toss_team1));
    toss.push(toss_row(t2, &insights.toss_team2));

    let mut sheets = vec![
        overview,
        results,
        home_away,
        toss,
        potm_sheet(&insights.top_players_of_match),
    ];
    for (prefix, side) in [("T1 ", &insights.side_team1), ("T2 ", &insights.side_team2)] {
        sheets.extend(side_sheets(prefix, side));
    }
    sheets
}

fn side_sheets(prefix: &str, side: &SideAnalysis) -> Vec<Sheet> {
    let mut sheets = batting_sheets(prefix, &side.batting);
    sheets.extend(bowling_sheets(prefix, &side.bowling));
    sheets
}

const MATCH_HEADER: &[&str] = &[
    "Match", "Season", "Date", "Stage", "Team 1", "Team 2", "City", "Winner", "Result", "Margin",
];
const HOME_AWAY_HEADER: &[&str] = &["Team", "Home won", "Home lost", "Away won", "Away lost"];
const TOSS_HEADER: &[&str] = &[
    "Team",
    "Matches",
    "Toss won",
    "Toss won, match won",
    "Toss lost, match won",
    "Toss win %",
    "Win % after toss won",
    "Win % after toss lost",
];

fn pair(metric: &str, value: impl ToString) -> Vec<String> {
    vec![metric.to_string(), value.to_string()]
}

fn match_row(m: &MatchRecord) -> Vec<String> {
    vec![
        m.id.to_string(),
        m.season.clone(),
        opt_to_string(m.date),
        m.match_type.label().to_string(),
        m.team1.clone(),
        m.team2.clone(),
        m.city.clone().unwrap_or_default(),
        m.winner.clone().unwrap_or_default(),
        m.result.as_str().to_string(),
        opt_to_string(m.result_margin),
    ]
}

fn home_away_row(team: &str, split: &HomeAwaySplit) -> Vec<String> {
    vec![
        team.to_string(),
        split.home_wins.to_string(),
        split.home_losses.to_string(),
        split.away_wins.to_string(),
        split.away_losses.to_string(),
    ]
}

fn toss_row(team: &str, split: &TossSplit) -> Vec<String> {
    vec![
        team.to_string(),
        split.total_matches.to_string(),
        split.toss_won.to_string(),
        split.toss_won_match_won.to_string(),
        split.toss_lost_match_won.to_string(),
        split.toss_win_pct().to_string(),
        split.win_pct_after_toss_won().to_string(),
        split.win_pct_after_toss_lost().to_string(),
    ]
}

fn margin_rows(sheet: &mut Sheet, team: &str, margins: &MarginStats) {
    let runs = margins.largest_win_by_runs.as_ref().map(|m| m.margin);
    let wickets = margins.largest_win_by_wickets.as_ref().map(|m| m.margin);
    sheet.push(pair(&format!("{team} biggest win (runs)"), opt_to_string(runs)));
    sheet.push(pair(&format!("{team} biggest win (wickets)"), opt_to_string(wickets)));
}

fn score_rows(sheet: &mut Sheet, extreme: &str, team: &str, scores: &ScenarioScores) {
    for scenario in ScoreScenario::ALL {
        let Some(record) = scores.get(scenario) else {
            continue;
        };
        sheet.push(vec![
            extreme.to_string(),
            scenario.label().to_string(),
            record.score.to_string(),
            record.fixture.id.to_string(),
            record.fixture.opponent_of(team).unwrap_or_default().to_string(),
            record.fixture.season.clone(),
        ]);
    }
}

fn potm_sheet(rows: &[PlayerOfMatchCount]) -> Sheet {
    let mut sheet = Sheet::new("PlayerOfMatch", &["Player", "Awards"]);
    for row in rows {
        sheet.push(vec![row.player.clone(), row.awards.to_string()]);
    }
    sheet
}

fn tally_sheet(name: String, metric: &str, rows: &[BatterTally]) -> Sheet {
    let mut sheet = Sheet::new(&name, &["Batter", metric]);
    for row in rows {
        sheet.push(vec![row.batter.clone(), row.count.to_string()]);
    }
    sheet
}

fn innings_tally_sheet(name: String, metric: &str, rows: &[InningsTally]) -> Sheet {
    let mut sheet = Sheet::new(&name, &["Batter", "Match", metric]);
    for row in rows {
        sheet.push(vec![
            row.batter.clone(),
            row.match_id.to_string(),
            row.count.to_string(),
        ]);
    }
    sheet
}

fn batting_sheets(prefix: &str, batting: &BattingAnalysis) -> Vec<Sheet> {
    let mut innings = Sheet::new(
        &format!("{prefix}Top Innings"),
        &["Batter", "Match", "Runs", "Balls", "Strike rate"],
    );
    for row in &batting.highest_innings {
        innings.push(vec![
            row.batter.clone(),
            row.match_id.to_string(),
            row.runs.to_string(),
            row.balls.to_string(),
            opt_to_string(row.strike_rate),
        ]);
    }
    vec![
        tally_sheet(format!("{prefix}Most Runs"), "Runs", &batting.most_runs),
        innings,
        tally_sheet(format!("{prefix}Fours"), "Fours", &batting.total_fours),
        innings_tally_sheet(format!("{prefix}Fours Innings"), "Fours", &batting.fours_inning),
        tally_sheet(format!("{prefix}Sixes"), "Sixes", &batting.total_sixes),
        innings_tally_sheet(format!("{prefix}Sixes Innings"), "Sixes", &batting.sixes_inning),
        tally_sheet(format!("{prefix}Fifties"), "Fifties", &batting.fifties),
        tally_sheet(format!("{prefix}Centuries"), "Centuries", &batting.centuries),
    ]
}

fn figures_sheet(name: String, rows: &[BowlingFigures]) -> Sheet {
    let mut sheet = Sheet::new(
        &name,
        &["Bowler", "Match", "Wickets", "Runs", "Overs", "Strike rate", "Economy"],
    );
    for row in rows {
        sheet.push(vec![
            row.bowler.clone(),
            opt_to_string(row.match_id),
            row.wickets.to_string(),
            row.runs_conceded.to_string(),
            row.overs.to_string(),
            opt_to_string(row.strike_rate),
            opt_to_string(row.economy_rate),
        ]);
    }
    sheet
}

fn bowling_sheets(prefix: &str, bowling: &BowlingAnalysis) -> Vec<Sheet> {
    vec![
        figures_sheet(format!("{prefix}Wickets"), &bowling.wickets_total),
        figures_sheet(format!("{prefix}Best Figures"), &bowling.wickets_inning),
    ]
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
