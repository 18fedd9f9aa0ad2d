//! Synthetic league used by `--demo`, the benches and volume tests.
//!
//! Every match is simulated ball by ball, so targets, margins and deliveries
//! agree with each other. The same seed always yields the same league.

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::InMemorySource;
use crate::model::{DeliveryRecord, MatchRecord, MatchType, ResultKind, TossDecision};
use crate::teams::home_city;

pub const DEMO_TEAMS: &[&str] = &[
    "Chennai Super Kings",
    "Mumbai Indians",
    "Royal Challengers Bangalore",
    "Kolkata Knight Riders",
    "Delhi Capitals",
    "Punjab Kings",
    "Rajasthan Royals",
    "Sunrisers Hyderabad",
];

const FIRST_SEASON: i32 = 2008;
const NEUTRAL_CITY: &str = "Dubai";
const SQUAD_SIZE: usize = 11;
const BOWLERS: usize = 5;
const DISMISSALS: &[&str] = &["caught", "bowled", "lbw", "run out", "stumped", "caught"];
const RUN_WEIGHTS: &[(u32, u32)] = &[(0, 36), (1, 34), (2, 9), (3, 1), (4, 13), (6, 7)];

pub fn generate(seed: u64, seasons: u32) -> InMemorySource {
    let squads: HashMap<&str, Vec<String>> =
        DEMO_TEAMS.iter().map(|team| (*team, squad(team))).collect();
    let mut schedule = Schedule {
        rng: StdRng::seed_from_u64(seed),
        league: InMemorySource::default(),
        squads: &squads,
        next_id: 1,
    };

    for offset in 0..seasons as i32 {
        let year = FIRST_SEASON + offset;
        let season = year.to_string();
        let mut day = NaiveDate::from_ymd_opt(year, 4, 1);
        let mut wins: HashMap<&str, u32> = HashMap::new();

        for (i, home) in DEMO_TEAMS.iter().enumerate() {
            for away in &DEMO_TEAMS[i + 1..] {
                if let Some(winner) = schedule.play(&season, day, home, away, MatchType::League) {
                    *wins.entry(winner).or_insert(0) += 1;
                }
                day = day.and_then(|d| d.checked_add_signed(ChronoDuration::days(1)));
            }
        }

        let mut table: Vec<&str> = DEMO_TEAMS.to_vec();
        table.sort_by_key(|team| std::cmp::Reverse(wins.get(team).copied().unwrap_or(0)));
        let (first, second, third, fourth) = (table[0], table[1], table[2], table[3]);

        let q1_winner = schedule
            .play(&season, day, first, second, knockout("Qualifier 1"))
            .unwrap_or(first);
        let q1_loser = if q1_winner == first { second } else { first };
        let elim_winner = schedule
            .play(&season, day, third, fourth, knockout("Eliminator"))
            .unwrap_or(third);
        let q2_winner = schedule
            .play(&season, day, q1_loser, elim_winner, knockout("Qualifier 2"))
            .unwrap_or(q1_loser);
        schedule.play(&season, day, q1_winner, q2_winner, MatchType::Final);
    }

    let league = schedule.league;
    log::debug!(
        "demo league: {} matches, {} deliveries",
        league.matches.len(),
        league.deliveries.len()
    );
    league
}

fn knockout(label: &str) -> MatchType {
    MatchType::Knockout(label.to_string())
}

fn squad(team: &str) -> Vec<String> {
    let initials: String = team
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    (1..=SQUAD_SIZE)
        .map(|n| format!("{initials} Player {n:02}"))
        .collect()
}

struct Innings {
    deliveries: Vec<DeliveryRecord>,
    runs: u32,
    wickets: u32,
    top_scorer: Option<String>,
}

struct Schedule<'s> {
    rng: StdRng,
    league: InMemorySource,
    squads: &'s HashMap<&'static str, Vec<String>>,
    next_id: u64,
}

impl Schedule<'_> {
    fn play<'a>(
        &mut self,
        season: &str,
        date: Option<NaiveDate>,
        team1: &'a str,
        team2: &'a str,
        match_type: MatchType,
    ) -> Option<&'a str> {
        let id = self.next_id;
        self.next_id += 1;
        let rng = &mut self.rng;
        let city = if rng.gen_bool(0.85) {
            home_city(team1).unwrap_or(NEUTRAL_CITY)
        } else {
            NEUTRAL_CITY
        };
        let toss_winner = if rng.gen_bool(0.5) { team1 } else { team2 };
        let toss_loser = if toss_winner == team1 { team2 } else { team1 };
        let decision = if rng.gen_bool(0.6) {
            TossDecision::Field
        } else {
            TossDecision::Bat
        };
        let (first, second) = match decision {
            TossDecision::Bat => (toss_winner, toss_loser),
            TossDecision::Field => (toss_loser, toss_winner),
        };

        let mut fixture = MatchRecord {
            id,
            season: season.to_string(),
            city: Some(city.to_string()),
            date,
            match_type,
            player_of_match: None,
            venue: format!("{city} Stadium"),
            team1: team1.to_string(),
            team2: team2.to_string(),
            toss_winner: Some(toss_winner.to_string()),
            toss_decision: Some(decision),
            winner: None,
            result: ResultKind::NoResult,
            result_margin: None,
            target_runs: None,
            target_overs: None,
            super_over: false,
            method: None,
        };

        // Washed out before a ball was bowled.
        if rng.gen_bool(0.02) {
            self.league.matches.push(fixture);
            return None;
        }

        let empty = Vec::new();
        let first_xi = self.squads.get(first).unwrap_or(&empty);
        let second_xi = self.squads.get(second).unwrap_or(&empty);
        let setting = simulate_innings(rng, id, 1, first_xi, second_xi, None);
        let target = setting.runs + 1;
        let chase = simulate_innings(rng, id, 2, second_xi, first_xi, Some(target));

        fixture.target_runs = Some(target as i64);
        fixture.target_overs = Some(20.0);
        let winner = if chase.runs >= target {
            fixture.result = ResultKind::Wickets;
            fixture.result_margin = Some(10 - chase.wickets as i64);
            fixture.player_of_match = chase.top_scorer.clone();
            second
        } else if chase.runs == setting.runs {
            fixture.result = ResultKind::Tie;
            fixture.super_over = true;
            if rng.gen_bool(0.5) { first } else { second }
        } else {
            fixture.result = ResultKind::Runs;
            fixture.result_margin = Some((setting.runs - chase.runs) as i64);
            fixture.player_of_match = setting.top_scorer.clone();
            first
        };
        fixture.winner = Some(winner.to_string());

        self.league.matches.push(fixture);
        self.league.deliveries.extend(setting.deliveries);
        self.league.deliveries.extend(chase.deliveries);
        Some(winner)
    }
}

fn simulate_innings(
    rng: &mut StdRng,
    match_id: u64,
    inning: u8,
    batters: &[String],
    bowlers: &[String],
    target: Option<u32>,
) -> Innings {
    let mut innings = Innings {
        deliveries: Vec::new(),
        runs: 0,
        wickets: 0,
        top_scorer: None,
    };
    if batters.len() < 2 || bowlers.len() < BOWLERS {
        return innings;
    }
    let attack = &bowlers[bowlers.len() - BOWLERS..];
    let mut scored: HashMap<usize, u32> = HashMap::new();
    let (mut striker, mut non_striker, mut next_in) = (0usize, 1usize, 2usize);

    'overs: for over in 0..20u8 {
        let bowler = &attack[over as usize % BOWLERS];
        let mut legal = 0u8;
        while legal < 6 {
            let batter = batters[striker].clone();
            let mut ball = DeliveryRecord {
                match_id,
                inning,
                over,
                ball: legal + 1,
                batter,
                bowler: bowler.clone(),
                batsman_runs: 0,
                extra_runs: 0,
                total_runs: 0,
                extras_type: None,
                is_wicket: false,
                player_dismissed: None,
                dismissal_kind: None,
            };

            if rng.gen_bool(0.05) {
                let kind = if rng.gen_bool(0.65) { "wides" } else { "noballs" };
                ball.extras_type = Some(kind.to_string());
                ball.extra_runs = 1;
                ball.total_runs = 1;
            } else if rng.gen_bool(0.045) {
                let kind = DISMISSALS[rng.gen_range(0..DISMISSALS.len())];
                ball.is_wicket = true;
                ball.player_dismissed = Some(ball.batter.clone());
                ball.dismissal_kind = Some(kind.to_string());
                legal += 1;
            } else {
                let runs = weighted_runs(rng);
                ball.batsman_runs = runs;
                ball.total_runs = runs;
                *scored.entry(striker).or_insert(0) += runs;
                legal += 1;
                if runs % 2 == 1 {
                    std::mem::swap(&mut striker, &mut non_striker);
                }
            }

            innings.runs += ball.total_runs;
            let wicket = ball.is_wicket;
            innings.deliveries.push(ball);

            if wicket {
                innings.wickets += 1;
                if innings.wickets >= 10 || next_in >= batters.len() {
                    break 'overs;
                }
                striker = next_in;
                next_in += 1;
            }
            if target.is_some_and(|t| innings.runs >= t) {
                break 'overs;
            }
        }
        std::mem::swap(&mut striker, &mut non_striker);
    }

    innings.top_scorer = scored
        .into_iter()
        .max_by_key(|(idx, runs)| (*runs, std::cmp::Reverse(*idx)))
        .map(|(idx, _)| batters[idx].clone());
    innings
}

fn weighted_runs(rng: &mut StdRng) -> u32 {
    let total: u32 = RUN_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut pick = rng.gen_range(0..total);
    for (runs, weight) in RUN_WEIGHTS {
        if pick < *weight {
            return *runs;
        }
        pick -= weight;
    }
    0
}
