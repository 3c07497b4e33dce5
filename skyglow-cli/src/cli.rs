use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select};
use skyglow_core::{
    Config, Coordinate, Forecast, ForecastService, Location, catalog,
    forecast::MAX_DAYS,
    location::{
        FileLocationStore, FixedLocationProvider, LocationRequestOptions, LocationStore, locate,
    },
    sources_from_config,
};
use tracing::{debug, info, warn};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglow", version, about = "Sunrise and sunset sky quality forecasts")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the home location and default number of days.
    Configure,

    /// Show the multi-day sunrise/sunset forecast.
    Forecast {
        #[command(flatten)]
        place: PlaceArgs,

        /// Number of days to forecast (1-16).
        #[arg(long, short)]
        days: Option<u8>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the next sunrise or sunset today and its countdown.
    Next {
        #[command(flatten)]
        place: PlaceArgs,

        #[arg(long)]
        json: bool,
    },

    /// Search the built-in city list.
    Search {
        query: String,
    },
}

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// City name from the built-in list, e.g. "Milano".
    pub place: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast { place, days, json } => {
                let config = Config::load()?;
                let days = days.unwrap_or_else(|| config.days());
                let forecast = run_forecast(&config, &place, days).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&forecast)?);
                } else {
                    output::print_forecast(&forecast, Utc::now());
                }
                Ok(())
            }
            Command::Next { place, json } => {
                let config = Config::load()?;
                let forecast = run_forecast(&config, &place, 1).await?;
                let next = forecast
                    .next_event
                    .ok_or_else(|| anyhow!("Forecast contained no days"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&next)?);
                } else {
                    output::print_next_event(&next);
                }
                Ok(())
            }
            Command::Search { query } => {
                let matches = catalog::search(&query);
                if matches.is_empty() {
                    println!("No cities match '{query}'.");
                }
                for loc in matches {
                    println!("{:<10} {}", loc.name, loc.coordinate);
                }
                Ok(())
            }
        }
    }
}

async fn run_forecast(config: &Config, place: &PlaceArgs, days: u8) -> anyhow::Result<Forecast> {
    let store = FileLocationStore::default_location()?;
    let location = resolve_location(config, place, &store).await?;
    info!(name = %location.name, coordinate = %location.coordinate, "resolved location");

    let service = ForecastService::new(sources_from_config(config)?);
    let forecast = service
        .forecast(location.coordinate, days, Utc::now())
        .await
        .with_context(|| format!("Could not build forecast for {}", location.name))?;

    // Only a successful run replaces the remembered location.
    remember_location(&store, &location);

    Ok(forecast)
}

/// Best effort: a failed save is reported but does not fail the command.
fn remember_location(store: &dyn LocationStore, location: &Location) -> bool {
    match store.save(location) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, name = %location.name, "could not remember last location");
            false
        }
    }
}

/// Explicit coordinates, then a catalog name, then the last location, then home.
async fn resolve_location(
    config: &Config,
    place: &PlaceArgs,
    store: &dyn LocationStore,
) -> anyhow::Result<Location> {
    if let (Some(lat), Some(lon)) = (place.lat, place.lon) {
        let coordinate = Coordinate::new(lat, lon)?;
        let name = place.place.clone().unwrap_or_else(|| coordinate.to_string());
        return Ok(Location::new(name, coordinate));
    }

    if let Some(name) = &place.place {
        return catalog::find(name).ok_or_else(|| {
            anyhow!("Unknown place '{name}'.\nHint: run `skyglow search <name>` or pass --lat/--lon.")
        });
    }

    if let Some(last) = store.load()? {
        debug!(name = %last.name, "using last location");
        return Ok(last);
    }

    let home = FixedLocationProvider::new(config.home.clone());
    locate(&home, &LocationRequestOptions::default()).await.map_err(|_| {
        anyhow!(
            "No location given and no home location configured.\n\
             Hint: pass a city name, use --lat/--lon, or run `skyglow configure`."
        )
    })
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    const CUSTOM: &str = "Enter coordinates...";
    let mut choices: Vec<String> = catalog::all().into_iter().map(|l| l.name).collect();
    choices.push(CUSTOM.to_string());

    let choice = Select::new("Home location:", choices).prompt()?;
    let home = if choice == CUSTOM {
        let name = inquire::Text::new("Name:").prompt()?;
        let lat = CustomType::<f64>::new("Latitude:").prompt()?;
        let lon = CustomType::<f64>::new("Longitude:").prompt()?;
        Location::new(name, Coordinate::new(lat, lon)?)
    } else {
        catalog::find(&choice).ok_or_else(|| anyhow!("Unknown place '{choice}'"))?
    };
    config.set_home(home);

    let days = CustomType::<u8>::new(&format!("Default number of days (1-{MAX_DAYS}):"))
        .with_default(config.days())
        .prompt()?;
    config.set_default_days(days)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
