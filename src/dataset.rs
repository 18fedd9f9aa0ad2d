use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Error::FromSqlConversionFailure;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, params, params_from_iter};

use crate::error::{InsightsError, InsightsResult};
use crate::filter::TeamScope;
use crate::model::{DeliveryRecord, MatchRecord, MatchType, ResultKind, TossDecision};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read side of the match store.
pub trait MatchSource {
    fn fetch_matches(&self, scope: &TeamScope) -> InsightsResult<Vec<MatchRecord>>;
    fn fetch_deliveries(&self, scope: &TeamScope) -> InsightsResult<Vec<DeliveryRecord>>;
    fn teams(&self) -> InsightsResult<Vec<String>>;
    fn seasons(&self) -> InsightsResult<Vec<String>>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path, timeout: Duration) -> InsightsResult<Self> {
        open_db(path, timeout)
            .map(Self::new)
            .map_err(InsightsError::data_source)
    }

    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl MatchSource for SqliteStore {
    fn fetch_matches(&self, scope: &TeamScope) -> InsightsResult<Vec<MatchRecord>> {
        let rows = load_matches(&self.conn, scope).map_err(InsightsError::data_source)?;
        log::debug!("fetched {} matches for {scope:?}", rows.len());
        Ok(rows)
    }

    fn fetch_deliveries(&self, scope: &TeamScope) -> InsightsResult<Vec<DeliveryRecord>> {
        let rows = load_deliveries(&self.conn, scope).map_err(InsightsError::data_source)?;
        log::debug!("fetched {} deliveries for {scope:?}", rows.len());
        Ok(rows)
    }

    fn teams(&self) -> InsightsResult<Vec<String>> {
        distinct_strings(
            &self.conn,
            "SELECT team1 FROM matches UNION SELECT team2 FROM matches ORDER BY 1",
        )
        .map_err(InsightsError::data_source)
    }

    fn seasons(&self) -> InsightsResult<Vec<String>> {
        distinct_strings(&self.conn, "SELECT DISTINCT season FROM matches ORDER BY season")
            .map_err(InsightsError::data_source)
    }
}

/// Snapshot held in memory, used by the demo league and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub matches: Vec<MatchRecord>,
    pub deliveries: Vec<DeliveryRecord>,
}

impl MatchSource for InMemorySource {
    fn fetch_matches(&self, scope: &TeamScope) -> InsightsResult<Vec<MatchRecord>> {
        Ok(self
            .matches
            .iter()
            .filter(|m| scope.admits(m))
            .cloned()
            .collect())
    }

    fn fetch_deliveries(&self, scope: &TeamScope) -> InsightsResult<Vec<DeliveryRecord>> {
        let ids: std::collections::HashSet<u64> = self
            .matches
            .iter()
            .filter(|m| scope.admits(m))
            .map(|m| m.id)
            .collect();
        Ok(self
            .deliveries
            .iter()
            .filter(|d| ids.contains(&d.match_id))
            .cloned()
            .collect())
    }

    fn teams(&self) -> InsightsResult<Vec<String>> {
        let mut teams: Vec<String> = self
            .matches
            .iter()
            .flat_map(|m| [m.team1.clone(), m.team2.clone()])
            .collect();
        teams.sort();
        teams.dedup();
        Ok(teams)
    }

    fn seasons(&self) -> InsightsResult<Vec<String>> {
        let mut seasons: Vec<String> = self.matches.iter().map(|m| m.season.clone()).collect();
        seasons.sort();
        seasons.dedup();
        Ok(seasons)
    }
}

pub fn open_db(path: &Path, timeout: Duration) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    conn.busy_timeout(timeout).context("set sqlite busy timeout")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            season TEXT NOT NULL,
            city TEXT NULL,
            date TEXT NULL,
            match_type TEXT NOT NULL,
            player_of_match TEXT NULL,
            venue TEXT NOT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            toss_winner TEXT NULL,
            toss_decision TEXT NULL,
            winner TEXT NULL,
            result TEXT NULL,
            result_margin INTEGER NULL,
            target_runs INTEGER NULL,
            target_overs REAL NULL,
            super_over INTEGER NOT NULL,
            method TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);
        CREATE INDEX IF NOT EXISTS idx_matches_team1 ON matches(team1);
        CREATE INDEX IF NOT EXISTS idx_matches_team2 ON matches(team2);

        CREATE TABLE IF NOT EXISTS deliveries (
            delivery_id INTEGER PRIMARY KEY AUTOINCREMENT,
            match_id INTEGER NOT NULL,
            inning INTEGER NOT NULL,
            over_no INTEGER NOT NULL,
            ball INTEGER NOT NULL,
            batter TEXT NOT NULL,
            bowler TEXT NOT NULL,
            batsman_runs INTEGER NOT NULL,
            extra_runs INTEGER NOT NULL,
            total_runs INTEGER NOT NULL,
            extras_type TEXT NULL,
            is_wicket INTEGER NOT NULL,
            player_dismissed TEXT NULL,
            dismissal_kind TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_deliveries_match ON deliveries(match_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn scope_clause(scope: &TeamScope, prefix: &str) -> (String, Vec<String>) {
    match scope {
        TeamScope::All => (String::new(), Vec::new()),
        TeamScope::Single(team) => (
            format!("WHERE ({prefix}team1 = ?1 OR {prefix}team2 = ?1)"),
            vec![team.clone()],
        ),
        TeamScope::Pair(a, b) => (
            format!(
                "WHERE (({prefix}team1 = ?1 AND {prefix}team2 = ?2) OR ({prefix}team1 = ?2 AND {prefix}team2 = ?1))"
            ),
            vec![a.clone(), b.clone()],
        ),
    }
}

pub fn load_matches(conn: &Connection, scope: &TeamScope) -> Result<Vec<MatchRecord>> {
    let (clause, args) = scope_clause(scope, "");
    let sql = format!(
        r#"
        SELECT
            id, season, city, date, match_type, player_of_match, venue,
            team1, team2, toss_winner, toss_decision, winner, result,
            result_margin, target_runs, target_overs, super_over, method
        FROM matches
        {clause}
        ORDER BY date ASC, id ASC
        "#
    );
    let mut stmt = conn.prepare(&sql).context("prepare load matches query")?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), match_from_row)
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<MatchRecord> {
    let date: Option<String> = row.get(3)?;
    let match_type: String = row.get(4)?;
    let toss_decision: Option<String> = row.get(10)?;
    let result: Option<String> = row.get(12)?;
    Ok(MatchRecord {
        id: row.get::<_, i64>(0)? as u64,
        season: row.get(1)?,
        city: row.get(2)?,
        date: date
            .map(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT))
            .transpose()
            .map_err(|err| FromSqlConversionFailure(3, Type::Text, Box::new(err)))?,
        match_type: MatchType::parse(&match_type),
        player_of_match: row.get(5)?,
        venue: row.get(6)?,
        team1: row.get(7)?,
        team2: row.get(8)?,
        toss_winner: row.get(9)?,
        toss_decision: toss_decision.as_deref().and_then(TossDecision::parse),
        winner: row.get(11)?,
        result: ResultKind::parse(result.as_deref()),
        result_margin: row.get(13)?,
        target_runs: row.get(14)?,
        target_overs: row.get(15)?,
        super_over: row.get::<_, i64>(16)? != 0,
        method: row.get(17)?,
    })
}

pub fn load_deliveries(conn: &Connection, scope: &TeamScope) -> Result<Vec<DeliveryRecord>> {
    let (clause, args) = scope_clause(scope, "m.");
    let sql = format!(
        r#"
        SELECT
            d.match_id, d.inning, d.over_no, d.ball, d.batter, d.bowler,
            d.batsman_runs, d.extra_runs, d.total_runs, d.extras_type,
            d.is_wicket, d.player_dismissed, d.dismissal_kind
        FROM deliveries d
        INNER JOIN matches m ON d.match_id = m.id
        {clause}
        ORDER BY d.match_id ASC, d.delivery_id ASC
        "#
    );
    let mut stmt = conn.prepare(&sql).context("prepare load deliveries query")?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok(DeliveryRecord {
                match_id: row.get::<_, i64>(0)? as u64,
                inning: row.get(1)?,
                over: row.get(2)?,
                ball: row.get(3)?,
                batter: row.get(4)?,
                bowler: row.get(5)?,
                batsman_runs: row.get(6)?,
                extra_runs: row.get(7)?,
                total_runs: row.get(8)?,
                extras_type: row.get(9)?,
                is_wicket: row.get::<_, i64>(10)? != 0,
                player_dismissed: row.get(11)?,
                dismissal_kind: row.get(12)?,
            })
        })
        .context("query load deliveries")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode delivery row")?);
    }
    Ok(out)
}

fn distinct_strings(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql).context("prepare distinct query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query distinct values")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode distinct value")?);
    }
    Ok(out)
}

pub fn upsert_match(tx: &Transaction<'_>, m: &MatchRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO matches (
            id, season, city, date, match_type, player_of_match, venue,
            team1, team2, toss_winner, toss_decision, winner, result,
            result_margin, target_runs, target_overs, super_over, method
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11, ?12, ?13,
            ?14, ?15, ?16, ?17, ?18
        )
        ON CONFLICT(id) DO UPDATE SET
            season = excluded.season,
            city = excluded.city,
            date = excluded.date,
            match_type = excluded.match_type,
            player_of_match = excluded.player_of_match,
            venue = excluded.venue,
            team1 = excluded.team1,
            team2 = excluded.team2,
            toss_winner = excluded.toss_winner,
            toss_decision = excluded.toss_decision,
            winner = excluded.winner,
            result = excluded.result,
            result_margin = excluded.result_margin,
            target_runs = excluded.target_runs,
            target_overs = excluded.target_overs,
            super_over = excluded.super_over,
            method = excluded.method
        "#,
        params![
            m.id as i64,
            m.season,
            m.city,
            m.date.map(|d| d.format(DATE_FORMAT).to_string()),
            m.match_type.label(),
            m.player_of_match,
            m.venue,
            m.team1,
            m.team2,
            m.toss_winner,
            m.toss_decision.map(TossDecision::as_str),
            m.winner,
            result_to_sql(&m.result),
            m.result_margin,
            m.target_runs,
            m.target_overs,
            bool_to_i64(m.super_over),
            m.method,
        ],
    )
    .with_context(|| format!("upsert match {}", m.id))?;
    Ok(())
}

/// Replaces every delivery of the matches present in `rows`.
pub fn replace_deliveries(tx: &Transaction<'_>, rows: &[DeliveryRecord]) -> Result<()> {
    let mut ids: Vec<u64> = rows.iter().map(|d| d.match_id).collect();
    ids.sort_unstable();
    ids.dedup();
    for id in ids {
        tx.execute("DELETE FROM deliveries WHERE match_id = ?1", params![id as i64])
            .with_context(|| format!("clear deliveries of match {id}"))?;
    }

    let mut stmt = tx
        .prepare(
            r#"
            INSERT INTO deliveries (
                match_id, inning, over_no, ball, batter, bowler,
                batsman_runs, extra_runs, total_runs, extras_type,
                is_wicket, player_dismissed, dismissal_kind
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .context("prepare insert delivery")?;
    for d in rows {
        stmt.execute(params![
            d.match_id as i64,
            d.inning,
            d.over,
            d.ball,
            d.batter,
            d.bowler,
            d.batsman_runs,
            d.extra_runs,
            d.total_runs,
            d.extras_type,
            bool_to_i64(d.is_wicket),
            d.player_dismissed,
            d.dismissal_kind,
        ])
        .with_context(|| format!("insert delivery of match {}", d.match_id))?;
    }
    Ok(())
}

/// Writes a full snapshot in one transaction.
pub fn store_snapshot(
    conn: &mut Connection,
    matches: &[MatchRecord],
    deliveries: &[DeliveryRecord],
) -> Result<()> {
    let tx = conn.transaction().context("begin snapshot transaction")?;
    for m in matches {
        upsert_match(&tx, m)?;
    }
    replace_deliveries(&tx, deliveries)?;
    tx.commit().context("commit snapshot transaction")?;
    Ok(())
}

fn result_to_sql(result: &ResultKind) -> Option<&str> {
    match result {
        ResultKind::NoResult => None,
        other => Some(other.as_str()),
    }
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{delivery, fixture};

    fn memory_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SqliteStore::new(conn)
    }

    #[test]
    fn snapshot_round_trips_through_sqlite() {
        let mut store = memory_store();
        let matches = vec![
            fixture(1, "Mumbai Indians", "Chennai Super Kings")
                .city("Mumbai")
                .winner("Mumbai Indians")
                .result("runs", 12)
                .target(180)
                .match_type("Final")
                .build(),
            fixture(2, "Gujarat Titans", "Chennai Super Kings").no_toss().build(),
        ];
        let deliveries = vec![
            delivery(1, 1, "RG Sharma", "DL Chahar", 4),
            delivery(2, 1, "Shubman Gill", "DL Chahar", 6),
        ];
        store_snapshot(store.connection_mut(), &matches, &deliveries).unwrap();

        let loaded = store.fetch_matches(&TeamScope::All).unwrap();
        assert_eq!(loaded, matches);

        let pair = TeamScope::Pair("Chennai Super Kings".into(), "Mumbai Indians".into());
        let balls = store.fetch_deliveries(&pair).unwrap();
        assert_eq!(balls, vec![deliveries[0].clone()]);
    }

    #[test]
    fn distinct_teams_and_seasons() {
        let mut store = memory_store();
        let matches = vec![
            fixture(1, "Mumbai Indians", "Chennai Super Kings").season("2019").build(),
            fixture(2, "Gujarat Titans", "Mumbai Indians").season("2022").build(),
        ];
        store_snapshot(store.connection_mut(), &matches, &[]).unwrap();
        assert_eq!(
            store.teams().unwrap(),
            vec!["Chennai Super Kings", "Gujarat Titans", "Mumbai Indians"]
        );
        assert_eq!(store.seasons().unwrap(), vec!["2019", "2022"]);
    }

    #[test]
    fn unreadable_stored_date_is_a_data_source_error() {
        let mut store = memory_store();
        let matches = vec![fixture(1, "Mumbai Indians", "Chennai Super Kings").build()];
        store_snapshot(store.connection_mut(), &matches, &[]).unwrap();
        store
            .connection_mut()
            .execute("UPDATE matches SET date = '18/04/2008' WHERE id = 1", [])
            .unwrap();
        let err = store.fetch_matches(&TeamScope::All).unwrap_err();
        assert!(matches!(err, InsightsError::DataSource(msg) if msg.contains("decode match row")));
    }

    #[test]
    fn quoted_team_names_are_bound_not_interpolated() {
        let mut store = memory_store();
        let matches = vec![fixture(1, "Mumbai Indians", "Chennai Super Kings").build()];
        store_snapshot(store.connection_mut(), &matches, &[]).unwrap();
        let scope = TeamScope::Single("x' OR '1'='1".into());
        assert!(store.fetch_matches(&scope).unwrap().is_empty());
    }
}
