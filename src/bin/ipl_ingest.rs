use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use ipl_insights::config::{self, AppConfig};
use ipl_insights::dataset;
use ipl_insights::ingest;

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();

    let matches_csv = parse_path_arg("matches")
        .ok_or_else(|| anyhow!("missing --matches <matches.csv>"))?;
    let deliveries_csv = parse_path_arg("deliveries")
        .ok_or_else(|| anyhow!("missing --deliveries <deliveries.csv>"))?;
    let db_path = parse_path_arg("db")
        .or(config.db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = dataset::open_db(&db_path, config.db_timeout)?;
    let summary = ingest::ingest_files(&mut conn, db_path, &matches_csv, &deliveries_csv)?;

    println!("IPL ingest complete");
    println!("DB: {}", summary.db_path.display());
    println!("Matches upserted: {}", summary.matches_upserted);
    println!("Deliveries inserted: {}", summary.deliveries_inserted);
    if summary.rows_skipped > 0 {
        println!("Rows skipped: {}", summary.rows_skipped);
    }
    if summary.orphan_deliveries > 0 {
        println!("Deliveries without a match: {}", summary.orphan_deliveries);
    }
    Ok(())
}

/// Accepts `--name=value` and `--name value`.
fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
