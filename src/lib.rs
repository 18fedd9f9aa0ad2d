pub mod batting;
pub mod bowling;
pub mod config;
pub mod dataset;
pub mod demo_league;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod innings;
pub mod insights;
pub mod match_stats;
pub mod model;
pub mod rates;
pub mod scores;
pub mod state;
pub mod teams;

#[cfg(test)]
mod test_support;

pub use dataset::{InMemorySource, MatchSource, SqliteStore};
pub use error::{InsightsError, InsightsResult};
pub use filter::SeasonFilter;
pub use insights::{
    HeadToHeadInsights, TeamInsights, analyze_head_to_head, analyze_team, head_to_head_insights,
    team_insights,
};
