use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// A validated point on the globe, in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if !lat_ok || !lon_ok {
            return Err(ForecastError::InvalidCoordinate { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Re-check the range after deserialization; serde bypasses `new`.
    pub fn validate(&self) -> Result<Self> {
        Self::new(self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A named coordinate, as picked from the catalog, the config, or the last session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl Location {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self { name: name.into(), coordinate }
    }
}

/// Sun event instants for one calendar day at one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunEventInstants {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    pub solar_noon: DateTime<FixedOffset>,
    pub day_length_secs: i64,
    pub civil_twilight_begin: DateTime<FixedOffset>,
    pub civil_twilight_end: DateTime<FixedOffset>,
    pub nautical_twilight_begin: DateTime<FixedOffset>,
    pub nautical_twilight_end: DateTime<FixedOffset>,
    pub astronomical_twilight_begin: DateTime<FixedOffset>,
    pub astronomical_twilight_end: DateTime<FixedOffset>,
}

/// Hourly atmospheric readings for the whole forecast range.
///
/// The reading vectors run parallel to `times`. Upstream may report `null`
/// for an hour or send a shorter array, so each reading is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    pub timezone: String,
    pub utc_offset: FixedOffset,
    pub times: Vec<DateTime<FixedOffset>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub relative_humidity: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// The four readings the scorer consumes, picked for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericSample {
    pub cloud_cover_pct: f64,
    pub precipitation_probability_pct: f64,
    pub humidity_pct: f64,
    pub visibility_m: f64,
}

impl AtmosphericSample {
    pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;
}

impl Default for AtmosphericSample {
    /// Best case: clear, dry, unlimited visibility.
    fn default() -> Self {
        Self {
            cloud_cover_pct: 0.0,
            precipitation_probability_pct: 0.0,
            humidity_pct: 0.0,
            visibility_m: Self::DEFAULT_VISIBILITY_M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyLabel {
    Poor,
    Fair,
    Good,
    Great,
}

impl SkyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkyLabel::Poor => "Poor",
            SkyLabel::Fair => "Fair",
            SkyLabel::Good => "Good",
            SkyLabel::Great => "Great",
        }
    }

    /// Hex display color for the label.
    pub fn color(&self) -> &'static str {
        match self {
            SkyLabel::Great => "#10b981",
            SkyLabel::Good => "#f59e0b",
            SkyLabel::Fair => "#f97316",
            SkyLabel::Poor => "#ef4444",
        }
    }
}

impl std::fmt::Display for SkyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyQualityScore {
    pub score: u8,
    pub label: SkyLabel,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilightWindows {
    pub blue_hour_morning_start: DateTime<FixedOffset>,
    pub blue_hour_morning_end: DateTime<FixedOffset>,
    pub golden_hour_morning_start: DateTime<FixedOffset>,
    pub golden_hour_morning_end: DateTime<FixedOffset>,
    pub golden_hour_evening_start: DateTime<FixedOffset>,
    pub golden_hour_evening_end: DateTime<FixedOffset>,
    pub blue_hour_evening_start: DateTime<FixedOffset>,
    pub blue_hour_evening_end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    pub windows: TwilightWindows,
    pub sunrise_sample: AtmosphericSample,
    pub sunset_sample: AtmosphericSample,
    pub sunrise_score: SkyQualityScore,
    pub sunset_score: SkyQualityScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunEventKind {
    Sunrise,
    Sunset,
}

impl std::fmt::Display for SunEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SunEventKind::Sunrise => f.write_str("sunrise"),
            SunEventKind::Sunset => f.write_str("sunset"),
        }
    }
}

/// Time left until a sun event, or `Past` once today's events are over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Countdown {
    Remaining { hours: i64, minutes: i64 },
    Past,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextSunEvent {
    pub kind: SunEventKind,
    pub time: String,
    pub countdown: Countdown,
    pub score: SkyQualityScore,
}

impl NextSunEvent {
    /// True when both of today's events are behind us. No rollover to
    /// tomorrow's sunrise happens here.
    pub fn is_past(&self) -> bool {
        matches!(self.countdown, Countdown::Past)
    }
}

/// Everything one aggregation run produces for a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub coordinate: Coordinate,
    pub timezone: String,
    pub days: Vec<DayForecast>,
    pub next_event: Option<NextSunEvent>,
}
