use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use ipl_insights::config::{self, AppConfig};
use ipl_insights::dataset::{MatchSource, SqliteStore};
use ipl_insights::demo_league;
use ipl_insights::export;
use ipl_insights::filter::SeasonFilter;
use ipl_insights::insights;

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let team = arg_value(&args, "team").ok_or_else(|| anyhow!("missing --team <name>"))?;
    let team2 = arg_value(&args, "team2");
    let season = arg_value(&args, "season")
        .map(|s| SeasonFilter::parse(&s))
        .unwrap_or(config.default_season.clone());
    let xlsx = arg_value(&args, "xlsx").map(PathBuf::from);

    let source: Box<dyn MatchSource> = if args.iter().any(|a| a == "--demo") {
        Box::new(demo_league::generate(2008, 6))
    } else {
        let db_path = arg_value(&args, "db")
            .map(PathBuf::from)
            .or(config.db_path.clone())
            .context("unable to resolve sqlite path")?;
        Box::new(SqliteStore::open(&db_path, config.db_timeout)?)
    };

    match team2 {
        Some(team2) => {
            let report = insights::head_to_head_insights(source.as_ref(), &team, &team2, &season)?;
            match xlsx {
                Some(path) => {
                    let written = export::export_head_to_head(&path, &report)?;
                    println!(
                        "Wrote {} sheets ({} rows) to {}",
                        written.sheets,
                        written.rows,
                        path.display()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        None => {
            let report = insights::team_insights(source.as_ref(), &team, &season)?;
            match xlsx {
                Some(path) => {
                    let written = export::export_team(&path, &report)?;
                    println!(
                        "Wrote {} sheets ({} rows) to {}",
                        written.sheets,
                        written.rows,
                        path.display()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
    }
    Ok(())
}

/// Accepts `--name=value` and `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
