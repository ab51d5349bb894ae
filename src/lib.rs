pub mod catalog;
pub mod config;
pub mod db;
pub mod history;
pub mod models;
pub mod prediction;
pub mod refresh;
pub mod storage;
pub mod store;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};

use config::{ConfigStore, TrackerConfig};
use db::Database;
use models::Flight;
use prediction::PredictionClient;
use refresh::RefreshOutcome;
use storage::SqliteStorage;
use store::{FlightStore, STORAGE_KEY};

pub use config::{DelayHeuristics, RefreshThresholds};
pub use models::{Airline, Airport, FlightEdit, FlightStatus, RiskLevel};

const DATABASE_FILE: &str = "flyrely.sqlite3";
const CONFIG_FILE: &str = "config.json";

/// Sets up `env_logger` from `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Everything the app needs, opened from one data directory.
pub struct FlightTracker {
    config: ConfigStore,
    store: FlightStore,
}

impl FlightTracker {
    /// Opens (or creates) the database and config under `data_dir`, then
    /// moves flights past their grace period into history.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let db = Database::new(data_dir.join(DATABASE_FILE))?;
        let config = ConfigStore::new(data_dir.join(CONFIG_FILE))?;
        let grace = config.snapshot().completion_grace();
        let store = FlightStore::new(Arc::new(SqliteStorage::new(db, STORAGE_KEY)))
            .with_completion_grace(grace);

        match store.auto_complete_old_flights().await {
            Ok(0) => {}
            Ok(completed) => info!("Moved {completed} past flight(s) to history"),
            Err(err) => warn!("Skipped auto-completion, flight list left untouched: {err:#}"),
        }
        info!("FlyRely data opened at {}", data_dir.display());

        Ok(Self { config, store })
    }

    pub fn store(&self) -> &FlightStore {
        &self.store
    }

    pub fn config(&self) -> TrackerConfig {
        self.config.snapshot()
    }

    pub fn update_config(&self, config: TrackerConfig) -> Result<()> {
        self.config.update(config)
    }

    pub async fn refresh(
        &self,
        client: &dyn PredictionClient,
        id: &str,
        force: bool,
    ) -> Result<RefreshOutcome> {
        self.refresh_at(client, id, Utc::now(), force).await
    }

    pub async fn refresh_at(
        &self,
        client: &dyn PredictionClient,
        id: &str,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<RefreshOutcome> {
        refresh::refresh_flight(&self.store, client, &self.config(), id, now, force).await
    }

    pub async fn refresh_due(&self, client: &dyn PredictionClient) -> Result<Vec<RefreshOutcome>> {
        refresh::refresh_due(&self.store, client, &self.config(), Utc::now()).await
    }

    /// Stores a confirmed search result, returning it as tracked.
    pub async fn track(&self, flight: Flight) -> Result<Flight> {
        let flight = flight.into_tracked();
        info!("Tracking {} ({})", flight.flight_number, flight.id);
        self.store.save(flight.clone()).await?;
        Ok(flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::flight::fixtures::flight_departing;

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("flyrely-tracker-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn open_completes_old_flights_and_persists() {
        let dir = temp_dir();
        let old = flight_departing(Utc::now() - Duration::hours(5));
        let upcoming = flight_departing(Utc::now() + Duration::hours(5));

        {
            let tracker = FlightTracker::open(&dir).await.unwrap();
            tracker.track(old.clone()).await.unwrap();
            tracker.track(upcoming.clone()).await.unwrap();
        }

        let tracker = FlightTracker::open(&dir).await.unwrap();
        let reopened_old = tracker.store().get_by_id(&old.id).await.unwrap();
        assert_eq!(reopened_old.status, FlightStatus::Completed);
        let reopened_upcoming = tracker.store().get_by_id(&upcoming.id).await.unwrap();
        assert_eq!(reopened_upcoming.status, FlightStatus::Scheduled);
        assert_eq!(tracker.config(), TrackerConfig::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn tracking_a_route_candidate_gives_it_a_flight_id() {
        let dir = temp_dir();
        let tracker = FlightTracker::open(&dir).await.unwrap();
        let candidate = flight_departing(Utc::now() + Duration::hours(30)).into_route_candidate();

        let tracked = tracker.track(candidate.clone()).await.unwrap();

        assert!(tracked.id.starts_with("flight-"));
        assert!(tracker.store().get_by_id(&candidate.id).await.is_none());
        assert_eq!(tracker.store().get_by_id(&tracked.id).await, Some(tracked));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn out_of_range_grace_on_disk_does_not_break_open() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), r#"{"completion_grace_hours": -48}"#).unwrap();

        let tracker = FlightTracker::open(&dir).await.unwrap();
        let upcoming = tracker
            .track(flight_departing(Utc::now() + Duration::hours(5)))
            .await
            .unwrap();
        assert_eq!(tracker.store().completion_grace(), Duration::hours(2));
        assert_eq!(tracker.store().auto_complete_old_flights().await.unwrap(), 0);
        assert!(tracker.store().get_by_id(&upcoming.id).await.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn configured_grace_is_applied() {
        let dir = temp_dir();
        {
            let tracker = FlightTracker::open(&dir).await.unwrap();
            let mut config = tracker.config();
            config.completion_grace_hours = 12;
            tracker.update_config(config).unwrap();
        }

        let tracker = FlightTracker::open(&dir).await.unwrap();
        assert_eq!(tracker.store().completion_grace(), Duration::hours(12));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
