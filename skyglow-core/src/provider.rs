use crate::{
    Config,
    error::{ForecastError, Result},
    model::{Coordinate, HourlySeries, SunEventInstants},
    provider::{open_meteo::OpenMeteoSource, sunrise_sunset::SunriseSunsetSource},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod open_meteo;
pub mod sunrise_sunset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    SunriseSunset,
    OpenMeteo,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::SunriseSunset => "sunrise-sunset",
            SourceId::OpenMeteo => "open-meteo",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sunrise, sunset and twilight instants for one date.
#[async_trait]
pub trait SunEventSource: Send + Sync + Debug {
    async fn sun_events(&self, coordinate: Coordinate, date: NaiveDate) -> Result<SunEventInstants>;
}

/// Hourly cloud cover, precipitation probability, humidity and visibility.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn hourly_series(&self, coordinate: Coordinate, days: u8) -> Result<HourlySeries>;
}

/// The pair of sources one forecast run reads from.
#[derive(Debug, Clone)]
pub struct Sources {
    pub sun: Arc<dyn SunEventSource>,
    pub weather: Arc<dyn WeatherSource>,
}

/// Construct both HTTP sources from config, sharing one client.
pub fn sources_from_config(config: &Config) -> Result<Sources> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.sources.http_timeout_secs))
        .user_agent(concat!("skyglow/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ForecastError::HttpClient(e.to_string()))?;

    Ok(Sources {
        sun: Arc::new(SunriseSunsetSource::with_client(
            http.clone(),
            config.sources.sunrise_sunset_url.clone(),
        )),
        weather: Arc::new(OpenMeteoSource::with_client(http, config.sources.open_meteo_url.clone())),
    })
}

/// Shared by both adapters: issue a GET and return the body of a 2xx response.
pub(crate) async fn get_text(
    http: &Client,
    source: SourceId,
    url: &str,
    query: &[(&str, String)],
) -> Result<(reqwest::StatusCode, String)> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ForecastError::unavailable(source, format!("request failed: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| ForecastError::unavailable(source, format!("failed to read body: {e}")))?;

    Ok((status, body))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn source_names() {
        assert_eq!(SourceId::SunriseSunset.to_string(), "sunrise-sunset");
        assert_eq!(SourceId::OpenMeteo.to_string(), "open-meteo");
    }

    #[test]
    fn truncate_long_body_on_char_boundary() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn sources_from_default_config() {
        let cfg = Config::default();
        assert!(sources_from_config(&cfg).is_ok());
    }
}
