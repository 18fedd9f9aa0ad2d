use crate::model::{DeliveryRecord, MatchRecord, MatchType, ResultKind, TossDecision};

pub struct MatchBuilder(MatchRecord);

pub fn fixture(id: u64, team1: &str, team2: &str) -> MatchBuilder {
    MatchBuilder(MatchRecord {
        id,
        season: "2020".to_string(),
        city: None,
        date: None,
        match_type: MatchType::League,
        player_of_match: None,
        venue: "Test Ground".to_string(),
        team1: team1.to_string(),
        team2: team2.to_string(),
        toss_winner: Some(team1.to_string()),
        toss_decision: Some(TossDecision::Bat),
        winner: None,
        result: ResultKind::NoResult,
        result_margin: None,
        target_runs: None,
        target_overs: None,
        super_over: false,
        method: None,
    })
}

impl MatchBuilder {
    pub fn season(mut self, season: &str) -> Self {
        self.0.season = season.to_string();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.0.city = Some(city.to_string());
        self
    }

    pub fn winner(mut self, team: &str) -> Self {
        self.0.winner = Some(team.to_string());
        self
    }

    pub fn toss(mut self, team: &str, decision: &str) -> Self {
        self.0.toss_winner = Some(team.to_string());
        self.0.toss_decision = TossDecision::parse(decision);
        self
    }

    pub fn no_toss(mut self) -> Self {
        self.0.toss_winner = None;
        self.0.toss_decision = None;
        self
    }

    pub fn match_type(mut self, label: &str) -> Self {
        self.0.match_type = MatchType::parse(label);
        self
    }

    pub fn super_over(mut self) -> Self {
        self.0.super_over = true;
        self
    }

    pub fn result(mut self, kind: &str, margin: i64) -> Self {
        self.0.result = ResultKind::parse(Some(kind));
        self.0.result_margin = Some(margin);
        self
    }

    pub fn target(mut self, runs: i64) -> Self {
        self.0.target_runs = Some(runs);
        self
    }

    pub fn potm(mut self, player: &str) -> Self {
        self.0.player_of_match = Some(player.to_string());
        self
    }

    pub fn build(self) -> MatchRecord {
        self.0
    }
}

pub fn delivery(match_id: u64, inning: u8, batter: &str, bowler: &str, runs: u32) -> DeliveryRecord {
    DeliveryRecord {
        match_id,
        inning,
        over: 0,
        ball: 1,
        batter: batter.to_string(),
        bowler: bowler.to_string(),
        batsman_runs: runs,
        extra_runs: 0,
        total_runs: runs,
        extras_type: None,
        is_wicket: false,
        player_dismissed: None,
        dismissal_kind: None,
    }
}

pub fn extra(mut ball: DeliveryRecord, kind: &str, runs: u32) -> DeliveryRecord {
    ball.extras_type = Some(kind.to_string());
    ball.extra_runs = runs;
    ball.total_runs = ball.batsman_runs + runs;
    ball
}

pub fn wicket(mut ball: DeliveryRecord, kind: &str) -> DeliveryRecord {
    ball.is_wicket = true;
    ball.player_dismissed = Some(ball.batter.clone());
    ball.dismissal_kind = Some(kind.to_string());
    ball
}
