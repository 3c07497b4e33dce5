//! Core library for the `skyglow` CLI.
//!
//! This crate defines:
//! - Sky quality scoring and golden/blue hour windows
//! - Adapters for the sun-event and hourly weather sources
//! - The forecast aggregator that ties them together per day
//! - Configuration and the last-location store
//!
//! It is used by `skyglow-cli`, but can also be reused by other front ends.

pub mod align;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod location;
pub mod model;
pub mod provider;
pub mod score;
pub mod twilight;

pub use config::{Config, SourceConfig};
pub use error::ForecastError;
pub use forecast::{ForecastService, RequestTracker, next_event};
pub use model::{
    AtmosphericSample, Coordinate, Countdown, DayForecast, Forecast, Location, NextSunEvent,
    SkyLabel, SkyQualityScore, SunEventKind, TwilightWindows,
};
pub use provider::{Sources, SunEventSource, WeatherSource, sources_from_config};
pub use score::score_sky;
pub use twilight::twilight_windows;
