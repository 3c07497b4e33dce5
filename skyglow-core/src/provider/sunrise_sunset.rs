use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ForecastError, Result},
    model::{Coordinate, SunEventInstants},
    provider::{SourceId, get_text, truncate_body},
};

use super::SunEventSource;

pub const DEFAULT_BASE_URL: &str = "https://api.sunrise-sunset.org";

const SOURCE: SourceId = SourceId::SunriseSunset;

/// Client for the sunrise-sunset.org JSON API.
#[derive(Debug, Clone)]
pub struct SunriseSunsetSource {
    base_url: String,
    http: Client,
}

impl SunriseSunsetSource {
    pub fn with_client(http: Client, base_url: String) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    async fn fetch(&self, coordinate: Coordinate, date: NaiveDate) -> Result<SunEventInstants> {
        let url = format!("{}/json", self.base_url);
        let query = [
            ("lat", coordinate.latitude().to_string()),
            ("lng", coordinate.longitude().to_string()),
            ("formatted", "0".to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];

        debug!(%coordinate, %date, "requesting sun events");
        let (status, body) = get_text(&self.http, SOURCE, &url, &query).await?;

        if !status.is_success() {
            return Err(ForecastError::unavailable(
                SOURCE,
                format!("request for {date} failed with status {status}: {}", truncate_body(&body)),
            ));
        }

        parse_response(&body, date).inspect_err(|e| warn!(%date, error = %e, "rejected sun event payload"))
    }
}

#[async_trait]
impl SunEventSource for SunriseSunsetSource {
    async fn sun_events(&self, coordinate: Coordinate, date: NaiveDate) -> Result<SunEventInstants> {
        self.fetch(coordinate, date).await
    }
}

#[derive(Debug, Deserialize)]
struct SsResults {
    sunrise: String,
    sunset: String,
    solar_noon: String,
    day_length: i64,
    civil_twilight_begin: String,
    civil_twilight_end: String,
    nautical_twilight_begin: String,
    nautical_twilight_end: String,
    astronomical_twilight_begin: String,
    astronomical_twilight_end: String,
}

#[derive(Debug, Deserialize)]
struct SsResponse {
    status: String,
    // Absent or an empty string when the status is not OK.
    results: Option<serde_json::Value>,
}

/// Validate and convert a `formatted=0` response body for `date`.
pub(crate) fn parse_response(body: &str, date: NaiveDate) -> Result<SunEventInstants> {
    let parsed: SsResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(SOURCE, format!("malformed JSON: {e}")))?;

    if parsed.status != "OK" {
        return Err(ForecastError::unavailable(SOURCE, format!("status {}", parsed.status)));
    }

    let results = parsed
        .results
        .ok_or_else(|| ForecastError::unavailable(SOURCE, "response has no results"))?;
    let r: SsResults = serde_json::from_value(results)
        .map_err(|e| ForecastError::unavailable(SOURCE, format!("unexpected results shape: {e}")))?;

    Ok(SunEventInstants {
        sunrise: event_on(date, "sunrise", instant("sunrise", &r.sunrise)?)?,
        sunset: event_on(date, "sunset", instant("sunset", &r.sunset)?)?,
        solar_noon: instant("solar_noon", &r.solar_noon)?,
        day_length_secs: r.day_length,
        civil_twilight_begin: instant("civil_twilight_begin", &r.civil_twilight_begin)?,
        civil_twilight_end: instant("civil_twilight_end", &r.civil_twilight_end)?,
        nautical_twilight_begin: instant("nautical_twilight_begin", &r.nautical_twilight_begin)?,
        nautical_twilight_end: instant("nautical_twilight_end", &r.nautical_twilight_end)?,
        astronomical_twilight_begin: instant(
            "astronomical_twilight_begin",
            &r.astronomical_twilight_begin,
        )?,
        astronomical_twilight_end: instant("astronomical_twilight_end", &r.astronomical_twilight_end)?,
    })
}

fn instant(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| ForecastError::unavailable(SOURCE, format!("invalid {field} '{value}': {e}")))
}

/// Polar day and night come back as `OK` with the sun events pinned to
/// `1970-01-01T00:00:01+00:00`. Times are UTC, so a real event may land on
/// the neighbouring UTC date but never further away.
fn event_on(
    date: NaiveDate,
    field: &str,
    value: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>> {
    if value.timestamp() <= 1 {
        return Err(ForecastError::unavailable(
            SOURCE,
            format!("no {field} on {date} (polar day or night)"),
        ));
    }

    let drift = (value.date_naive() - date).num_days().abs();
    if drift > 1 {
        return Err(ForecastError::unavailable(
            SOURCE,
            format!("{field} {value} does not belong to {date}"),
        ));
    }

    Ok(value)
}
