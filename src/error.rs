use thiserror::Error;

/// Failures surfaced to callers of the insights pipeline.
///
/// Empty filter results are not errors; they come back as zero counts and
/// missing score scenarios.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("teams are the same: {0}")]
    SameTeam(String),
    #[error("no team selected")]
    MissingTeam,
    #[error("no home city on record for {0:?}")]
    UnknownHomeCity(String),
    #[error("data source failure: {0}")]
    DataSource(String),
}

impl InsightsError {
    pub fn data_source(err: anyhow::Error) -> Self {
        Self::DataSource(format!("{err:#}"))
    }
}

pub type InsightsResult<T> = std::result::Result<T, InsightsError>;
