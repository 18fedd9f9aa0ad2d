use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rusqlite::Connection;
use serde::Deserialize;

use crate::dataset;
use crate::model::{DeliveryRecord, MatchRecord, MatchType, ResultKind, TossDecision};
use crate::teams::canonical_team_name;

/// Skipped rows beyond this many are counted but not logged one by one.
const REPORTED_SKIPS: usize = 5;

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub matches_upserted: usize,
    pub deliveries_inserted: usize,
    pub rows_skipped: usize,
    pub orphan_deliveries: usize,
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    id: String,
    season: String,
    city: Option<String>,
    date: Option<String>,
    match_type: Option<String>,
    player_of_match: Option<String>,
    venue: Option<String>,
    team1: String,
    team2: String,
    toss_winner: Option<String>,
    toss_decision: Option<String>,
    winner: Option<String>,
    result: Option<String>,
    result_margin: Option<String>,
    target_runs: Option<String>,
    target_overs: Option<String>,
    super_over: Option<String>,
    method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeliveryRow {
    match_id: String,
    inning: String,
    over: String,
    ball: String,
    batter: String,
    bowler: String,
    batsman_runs: String,
    extra_runs: String,
    total_runs: String,
    extras_type: Option<String>,
    is_wicket: String,
    player_dismissed: Option<String>,
    dismissal_kind: Option<String>,
}

/// Missing-value markers in the public dataset.
fn present(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "NA" && v != "NR")
}

fn team(raw: Option<String>) -> Option<String> {
    present(raw).map(|name| canonical_team_name(&name))
}

/// Integer columns come through as `140` or `140.0`.
fn whole_number(raw: Option<String>) -> Option<i64> {
    let value = present(raw)?;
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|v| v.round() as i64))
}

fn parse_match(row: MatchRow) -> Result<MatchRecord> {
    let id = whole_number(Some(row.id.clone()))
        .with_context(|| format!("bad match id {:?}", row.id))? as u64;
    let team1 = canonical_team_name(&row.team1);
    let team2 = canonical_team_name(&row.team2);
    anyhow::ensure!(team1 != team2, "match {id}: {team1} listed on both sides");
    let toss_winner = team(row.toss_winner);
    let winner = team(row.winner);
    for (column, side) in [("toss_winner", &toss_winner), ("winner", &winner)] {
        if let Some(side) = side {
            anyhow::ensure!(
                *side == team1 || *side == team2,
                "match {id}: {column} {side} did not play"
            );
        }
    }
    let match_type = present(row.match_type)
        .with_context(|| format!("match {id}: missing match_type"))?;

    let date = match present(row.date) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("match {id}: bad date {raw:?}"))?,
        ),
        None => None,
    };
    let result = ResultKind::parse(present(row.result).as_deref());
    Ok(MatchRecord {
        id,
        season: row.season.trim().to_string(),
        city: present(row.city),
        date,
        match_type: MatchType::parse(&match_type),
        player_of_match: present(row.player_of_match),
        venue: present(row.venue).unwrap_or_default(),
        team1,
        team2,
        toss_winner,
        toss_decision: present(row.toss_decision)
            .as_deref()
            .and_then(TossDecision::parse),
        winner,
        result,
        result_margin: whole_number(row.result_margin),
        target_runs: whole_number(row.target_runs),
        target_overs: present(row.target_overs).and_then(|v| v.parse::<f64>().ok()),
        super_over: present(row.super_over).is_some_and(|v| v.eq_ignore_ascii_case("Y")),
        method: present(row.method),
    })
}

fn number<T: std::str::FromStr>(raw: &str, column: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("bad {column} value {raw:?}"))
}

fn parse_delivery(row: DeliveryRow) -> Result<DeliveryRecord> {
    Ok(DeliveryRecord {
        match_id: number(&row.match_id, "match_id")?,
        inning: number(&row.inning, "inning")?,
        over: number(&row.over, "over")?,
        ball: number(&row.ball, "ball")?,
        batter: row.batter.trim().to_string(),
        bowler: row.bowler.trim().to_string(),
        batsman_runs: number(&row.batsman_runs, "batsman_runs")?,
        extra_runs: number(&row.extra_runs, "extra_runs")?,
        total_runs: number(&row.total_runs, "total_runs")?,
        extras_type: present(row.extras_type),
        is_wicket: number::<u8>(&row.is_wicket, "is_wicket")? != 0,
        player_dismissed: present(row.player_dismissed),
        dismissal_kind: present(row.dismissal_kind),
    })
}

/// Rows that fail to parse are logged and skipped; the count comes back.
pub fn read_matches<R: Read>(input: R) -> Result<(Vec<MatchRecord>, usize)> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
    let mut out = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in reader.deserialize::<MatchRow>().enumerate() {
        match row.context("decode match csv row").and_then(parse_match) {
            Ok(record) => out.push(record),
            Err(err) => {
                skipped += 1;
                if skipped <= REPORTED_SKIPS {
                    log::warn!("matches row {}: {err:#}", line + 2);
                }
            }
        }
    }
    if skipped > REPORTED_SKIPS {
        log::warn!("{} more matches rows skipped", skipped - REPORTED_SKIPS);
    }
    Ok((out, skipped))
}

pub fn read_deliveries<R: Read>(input: R) -> Result<(Vec<DeliveryRecord>, usize)> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
    let mut out = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in reader.deserialize::<DeliveryRow>().enumerate() {
        match row.context("decode delivery csv row").and_then(parse_delivery) {
            Ok(record) => out.push(record),
            Err(err) => {
                skipped += 1;
                if skipped <= REPORTED_SKIPS {
                    log::warn!("deliveries row {}: {err:#}", line + 2);
                }
            }
        }
    }
    if skipped > REPORTED_SKIPS {
        log::warn!("{} more deliveries rows skipped", skipped - REPORTED_SKIPS);
    }
    Ok((out, skipped))
}

/// Imports both CSV files into `conn` in a single transaction. Re-running
/// with the same files leaves the database unchanged.
pub fn ingest_files(
    conn: &mut Connection,
    db_path: PathBuf,
    matches_csv: &Path,
    deliveries_csv: &Path,
) -> Result<IngestSummary> {
    let matches_file = std::fs::File::open(matches_csv)
        .with_context(|| format!("open {}", matches_csv.display()))?;
    let deliveries_file = std::fs::File::open(deliveries_csv)
        .with_context(|| format!("open {}", deliveries_csv.display()))?;
    let (matches, skipped_matches) = read_matches(matches_file)?;
    let (deliveries, skipped_deliveries) = read_deliveries(deliveries_file)?;
    ingest_records(conn, db_path, matches, deliveries, skipped_matches + skipped_deliveries)
}

pub fn ingest_records(
    conn: &mut Connection,
    db_path: PathBuf,
    matches: Vec<MatchRecord>,
    deliveries: Vec<DeliveryRecord>,
    rows_skipped: usize,
) -> Result<IngestSummary> {
    let ids: HashSet<u64> = matches.iter().map(|m| m.id).collect();
    let total = deliveries.len();
    let deliveries: Vec<DeliveryRecord> = deliveries
        .into_iter()
        .filter(|d| ids.contains(&d.match_id))
        .collect();
    let orphan_deliveries = total - deliveries.len();
    if orphan_deliveries > 0 {
        log::warn!("{orphan_deliveries} deliveries reference unknown matches and were not imported");
    }

    dataset::store_snapshot(conn, &matches, &deliveries)?;
    let summary = IngestSummary {
        db_path,
        matches_upserted: matches.len(),
        deliveries_inserted: deliveries.len(),
        rows_skipped,
        orphan_deliveries,
    };
    log::info!(
        "imported {} matches and {} deliveries into {} ({} rows skipped)",
        summary.matches_upserted,
        summary.deliveries_inserted,
        summary.db_path.display(),
        summary.rows_skipped
    );
    Ok(summary)
}
