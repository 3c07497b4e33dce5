//! Forecast aggregation: one weather fetch plus one sun-event fetch per day,
//! joined, aligned, scored and windowed into [`DayForecast`] records.

use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::future::try_join_all;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    align::sample_at,
    error::{ForecastError, Result},
    format::format_time,
    model::{
        Coordinate, Countdown, DayForecast, Forecast, HourlySeries, NextSunEvent, SunEventInstants,
        SunEventKind,
    },
    provider::Sources,
    score::score_sky,
    twilight::twilight_windows,
};

pub const DEFAULT_DAYS: u8 = 5;
/// Open-Meteo's forecast horizon.
pub const MAX_DAYS: u8 = 16;

#[derive(Debug, Clone)]
pub struct ForecastService {
    sources: Sources,
}

impl ForecastService {
    pub fn new(sources: Sources) -> Self {
        Self { sources }
    }

    /// Forecast `day_count` days starting at `now`'s UTC date.
    pub async fn forecast(
        &self,
        coordinate: Coordinate,
        day_count: u8,
        now: DateTime<Utc>,
    ) -> Result<Forecast> {
        self.forecast_with_cancel(coordinate, day_count, now, &CancellationToken::new()).await
    }

    /// Like [`forecast`](Self::forecast), but gives up with
    /// [`ForecastError::Cancelled`] as soon as `cancel` fires.
    pub async fn forecast_with_cancel(
        &self,
        coordinate: Coordinate,
        day_count: u8,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Forecast> {
        let coordinate = coordinate.validate()?;
        if !(1..=MAX_DAYS).contains(&day_count) {
            return Err(ForecastError::InvalidDayCount(day_count));
        }

        let start = now.date_naive();
        info!(%coordinate, day_count, %start, "building forecast");

        let (series, sun_days) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ForecastError::Cancelled),
            joined = self.fetch_all(coordinate, start, day_count) => joined?,
        };

        let days = sun_days
            .iter()
            .map(|(date, events)| build_day(*date, events, &series))
            .collect::<Result<Vec<_>>>()?;

        let next_event = days.first().map(|today| next_event(today, now));
        debug!(days = days.len(), "forecast assembled");

        Ok(Forecast { coordinate, timezone: series.timezone.clone(), days, next_event })
    }

    /// Weather and every day's sun events, concurrently. The first failure
    /// drops the remaining requests.
    async fn fetch_all(
        &self,
        coordinate: Coordinate,
        start: NaiveDate,
        day_count: u8,
    ) -> Result<(HourlySeries, Vec<(NaiveDate, SunEventInstants)>)> {
        let dates = (0..u64::from(day_count))
            .map(|i| start.checked_add_days(Days::new(i)))
            .collect::<Option<Vec<_>>>()
            .ok_or(ForecastError::InvalidDayCount(day_count))?;

        let weather = self.sources.weather.hourly_series(coordinate, day_count);
        let sun = try_join_all(dates.into_iter().map(|date| async move {
            let events = self.sources.sun.sun_events(coordinate, date).await?;
            Ok::<_, ForecastError>((date, events))
        }));

        tokio::try_join!(weather, sun)
    }
}

/// Combine one day's sun events with the weather aligned to each event.
///
/// Sunrise and sunset are re-expressed in the series' offset so displayed
/// times are local to the coordinate.
pub fn build_day(
    date: NaiveDate,
    events: &SunEventInstants,
    series: &HourlySeries,
) -> Result<DayForecast> {
    let sunrise = events.sunrise.with_timezone(&series.utc_offset);
    let sunset = events.sunset.with_timezone(&series.utc_offset);

    let sunrise_sample = sample_at(series, &sunrise)?;
    let sunset_sample = sample_at(series, &sunset)?;

    Ok(DayForecast {
        date,
        sunrise,
        sunset,
        windows: twilight_windows(sunrise, sunset),
        sunrise_score: score_sky(&sunrise_sample),
        sunset_score: score_sky(&sunset_sample),
        sunrise_sample,
        sunset_sample,
    })
}

/// The next sun event of `day` relative to `now`.
///
/// Only `day` is considered: once its sunset has passed the result is that
/// sunset with [`Countdown::Past`].
pub fn next_event(day: &DayForecast, now: DateTime<Utc>) -> NextSunEvent {
    if now < day.sunrise.with_timezone(&Utc) {
        NextSunEvent {
            kind: SunEventKind::Sunrise,
            time: format_time(&day.sunrise),
            countdown: Countdown::until(&now, &day.sunrise),
            score: day.sunrise_score.clone(),
        }
    } else if now < day.sunset.with_timezone(&Utc) {
        NextSunEvent {
            kind: SunEventKind::Sunset,
            time: format_time(&day.sunset),
            countdown: Countdown::until(&now, &day.sunset),
            score: day.sunset_score.clone(),
        }
    } else {
        NextSunEvent {
            kind: SunEventKind::Sunset,
            time: format_time(&day.sunset),
            countdown: Countdown::Past,
            score: day.sunset_score.clone(),
        }
    }
}

/// Hands out one cancellation token per request and cancels the previous
/// one, so a newer location selection supersedes anything still in flight.
#[derive(Debug, Default)]
pub struct RequestTracker {
    current: Mutex<Option<CancellationToken>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            previous.cancel();
        }
        token
    }
}
