use std::path::PathBuf;
use std::time::Duration;

use crate::filter::SeasonFilter;

const APP_DIR: &str = "ipl_insights";
const DB_FILE: &str = "ipl.sqlite";
const LOG_FILE: &str = "ipl_insights.log";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub db_timeout: Duration,
    pub default_season: SeasonFilter,
    pub log_file: Option<PathBuf>,
}

/// Loads `.env.local` then `.env`; already-set variables win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let db_timeout = non_empty("IPL_DB_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 60);
        Self {
            db_path: non_empty("IPL_DB_PATH")
                .map(PathBuf::from)
                .or_else(|| app_data_dir(&lookup).map(|dir| dir.join(DB_FILE))),
            db_timeout: Duration::from_secs(db_timeout),
            default_season: non_empty("IPL_DEFAULT_SEASON")
                .map(|s| SeasonFilter::parse(&s))
                .unwrap_or(SeasonFilter::AllSeasons),
            log_file: non_empty("IPL_LOG_FILE")
                .map(PathBuf::from)
                .or_else(|| app_data_dir(&lookup).map(|dir| dir.join(LOG_FILE))),
        }
    }
}

fn app_data_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = lookup("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}
