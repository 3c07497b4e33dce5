use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ForecastError, Result},
    model::{Coordinate, HourlySeries},
    provider::{SourceId, get_text, truncate_body},
};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const SOURCE: SourceId = SourceId::OpenMeteo;
const HOURLY_FIELDS: &str = "cloudcover,precipitation_probability,relative_humidity_2m,visibility";

/// Client for the Open-Meteo hourly forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn with_client(http: Client, base_url: String) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    async fn fetch(&self, coordinate: Coordinate, days: u8) -> Result<HourlySeries> {
        let url = format!("{}/v1/forecast", self.base_url);
        let query = [
            ("latitude", coordinate.latitude().to_string()),
            ("longitude", coordinate.longitude().to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("forecast_days", days.to_string()),
            ("timezone", "auto".to_string()),
        ];

        debug!(%coordinate, days, "requesting hourly weather");
        let (status, body) = get_text(&self.http, SOURCE, &url, &query).await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<OmError>(&body)
                .map(|e| e.reason)
                .unwrap_or_else(|_| truncate_body(&body));
            return Err(ForecastError::unavailable(
                SOURCE,
                format!("request failed with status {status}: {reason}"),
            ));
        }

        parse_response(&body).inspect_err(|e| warn!(error = %e, "rejected weather payload"))
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn hourly_series(&self, coordinate: Coordinate, days: u8) -> Result<HourlySeries> {
        self.fetch(coordinate, days).await
    }
}

#[derive(Debug, Deserialize)]
struct OmError {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    #[serde(default)]
    cloudcover: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    visibility: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    utc_offset_seconds: Option<i32>,
    timezone: Option<String>,
    hourly: Option<OmHourly>,
}

/// Validate and convert a forecast body into an absolute-time series.
///
/// `timezone=auto` makes the hourly axis local wall-clock time without an
/// offset; `utc_offset_seconds` pins it down.
pub(crate) fn parse_response(body: &str) -> Result<HourlySeries> {
    let parsed: OmResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(SOURCE, format!("malformed JSON: {e}")))?;

    if parsed.error {
        let reason = parsed.reason.unwrap_or_else(|| "unspecified error".to_string());
        return Err(ForecastError::unavailable(SOURCE, reason));
    }

    let offset_secs = parsed
        .utc_offset_seconds
        .ok_or_else(|| ForecastError::unavailable(SOURCE, "response has no utc_offset_seconds"))?;
    let utc_offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        ForecastError::unavailable(SOURCE, format!("utc offset {offset_secs}s out of range"))
    })?;
    let hourly = parsed
        .hourly
        .ok_or_else(|| ForecastError::unavailable(SOURCE, "response has no hourly block"))?;

    let times = hourly
        .time
        .iter()
        .map(|t| local_instant(&utc_offset, t))
        .collect::<Result<Vec<_>>>()?;

    Ok(HourlySeries {
        timezone: parsed.timezone.unwrap_or_else(|| "GMT".to_string()),
        utc_offset,
        times,
        cloud_cover: hourly.cloudcover,
        precipitation_probability: hourly.precipitation_probability,
        relative_humidity: hourly.relative_humidity_2m,
        visibility: hourly.visibility,
    })
}

fn local_instant(offset: &FixedOffset, value: &str) -> Result<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map_err(|e| ForecastError::unavailable(SOURCE, format!("invalid hourly time '{value}': {e}")))?;

    offset.from_local_datetime(&naive).single().ok_or_else(|| {
        ForecastError::unavailable(SOURCE, format!("hourly time '{value}' is not representable"))
    })
}
