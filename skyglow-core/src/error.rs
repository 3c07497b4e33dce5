use thiserror::Error;

use crate::provider::SourceId;

/// Errors surfaced by the forecast engine.
///
/// Scoring and twilight window derivation never fail; everything here comes
/// from the data sources, caller input, or the injected location capabilities.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Transport failure, non-2xx status, non-OK payload status, or a payload
    /// that does not match the expected schema.
    #[error("{provider} is unavailable: {reason}")]
    SourceUnavailable { provider: SourceId, reason: String },

    /// The weather source returned no hourly samples to align against.
    #[error("weather series contains no hourly samples")]
    EmptySeries,

    /// The closest hourly sample is too far from a sun event to describe it.
    #[error("weather series has no sample within an hour of {0}")]
    NoNearbySample(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error(
        "invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]"
    )]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid day count {0}: must be between 1 and {max}", max = crate::forecast::MAX_DAYS)]
    InvalidDayCount(u8),

    /// A newer request superseded this one before it finished.
    #[error("forecast request was superseded by a newer request")]
    Cancelled,

    #[error("current location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("location store failure: {0}")]
    Storage(String),
}

impl ForecastError {
    pub(crate) fn unavailable(provider: SourceId, reason: impl Into<String>) -> Self {
        ForecastError::SourceUnavailable { provider, reason: reason.into() }
    }
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
