//! Capabilities the front end injects: remembering the last location and
//! resolving the device's current position.

use async_trait::async_trait;
use directories::ProjectDirs;
use parking_lot::Mutex;
use std::{
    fmt::Debug,
    fs,
    path::PathBuf,
    time::Duration,
};
use tracing::debug;

use crate::{
    error::{ForecastError, Result},
    model::Location,
};

/// Remembers the last location the user picked, so the next session can
/// start from it.
pub trait LocationStore: Send + Sync + Debug {
    fn load(&self) -> Result<Option<Location>>;
    fn save(&self, location: &Location) -> Result<()>;
}

/// TOML file in the platform data directory.
#[derive(Debug, Clone)]
pub struct FileLocationStore {
    path: PathBuf,
}

impl FileLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `last_location.toml` under the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skyglow", "skyglow").ok_or_else(|| {
            ForecastError::Storage("could not determine platform data directory".to_string())
        })?;

        Ok(Self::new(dirs.data_dir().join("last_location.toml")))
    }
}

impl LocationStore for FileLocationStore {
    fn load(&self) -> Result<Option<Location>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ForecastError::Storage(format!("failed to read {}: {e}", self.path.display()))
        })?;

        // A corrupt or out-of-range record is treated as absent rather than fatal.
        match toml::from_str::<Location>(&contents) {
            Ok(location) if location.coordinate.validate().is_ok() => Ok(Some(location)),
            Ok(_) | Err(_) => {
                debug!(path = %self.path.display(), "ignoring unusable last location");
                Ok(None)
            }
        }
    }

    fn save(&self, location: &Location) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ForecastError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let contents = toml::to_string_pretty(location)
            .map_err(|e| ForecastError::Storage(format!("failed to serialize location: {e}")))?;

        fs::write(&self.path, contents).map_err(|e| {
            ForecastError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    slot: Mutex<Option<Location>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStore for MemoryLocationStore {
    fn load(&self) -> Result<Option<Location>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, location: &Location) -> Result<()> {
        *self.slot.lock() = Some(location.clone());
        Ok(())
    }
}

/// Options for a current-position lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequestOptions {
    /// Give up after this long.
    pub timeout: Duration,
    /// A cached fix no older than this may be returned.
    pub maximum_age: Duration,
}

impl Default for LocationRequestOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), maximum_age: Duration::from_secs(5 * 60) }
    }
}

/// Resolves "where am I" to a location.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_location(&self, options: &LocationRequestOptions) -> Result<Location>;
}

/// Always answers with one configured location.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    location: Option<Location>,
}

impl FixedLocationProvider {
    pub fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self, _options: &LocationRequestOptions) -> Result<Location> {
        self.location.clone().ok_or_else(|| {
            ForecastError::LocationUnavailable("no home location configured".to_string())
        })
    }
}

/// Ask `provider` for the current location, enforcing `options.timeout`.
pub async fn locate(
    provider: &dyn LocationProvider,
    options: &LocationRequestOptions,
) -> Result<Location> {
    tokio::time::timeout(options.timeout, provider.current_location(options))
        .await
        .map_err(|_| {
            ForecastError::LocationUnavailable(format!(
                "timed out after {}s",
                options.timeout.as_secs()
            ))
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    fn roma() -> Location {
        Location::new("Roma", Coordinate::new(41.9028, 12.4964).unwrap())
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLocationStore::new(dir.path().join("nested").join("last.toml"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&roma()).unwrap();
        assert_eq!(store.load().unwrap(), Some(roma()));
    }

    #[test]
    fn file_store_ignores_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last.toml");
        fs::write(&path, "name = \"Nowhere\"\nlatitude = 123.0\nlongitude = 0.0\n").unwrap();

        assert_eq!(FileLocationStore::new(&path).load().unwrap(), None);

        fs::write(&path, "not toml at all [").unwrap();
        assert_eq!(FileLocationStore::new(&path).load().unwrap(), None);
    }

    #[test]
    fn memory_store_keeps_last_write() {
        let store = MemoryLocationStore::new();
        store.save(&roma()).unwrap();
        let milano = Location::new("Milano", Coordinate::new(45.4642, 9.19).unwrap());
        store.save(&milano).unwrap();
        assert_eq!(store.load().unwrap(), Some(milano));
    }

    #[test]
    fn default_request_options() {
        let opts = LocationRequestOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn fixed_provider_without_location_fails() {
        let provider = FixedLocationProvider::new(None);
        let err = locate(&provider, &LocationRequestOptions::default()).await.unwrap_err();
        assert!(matches!(err, ForecastError::LocationUnavailable(_)));
    }

    #[derive(Debug)]
    struct NeverAnswers;

    #[async_trait]
    impl LocationProvider for NeverAnswers {
        async fn current_location(&self, _options: &LocationRequestOptions) -> Result<Location> {
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn locate_times_out() {
        let opts = LocationRequestOptions { timeout: Duration::from_secs(10), ..Default::default() };
        let err = locate(&NeverAnswers, &opts).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 10s"));
    }

    #[tokio::test]
    async fn fixed_provider_returns_location() {
        let provider = FixedLocationProvider::new(Some(roma()));
        assert_eq!(locate(&provider, &LocationRequestOptions::default()).await.unwrap(), roma());
    }
}
