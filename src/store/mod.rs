//! Durable list of tracked flights.
//!
//! The whole collection is read and rewritten on every change; a personal
//! flight list stays small. Partitions are computed on read from the same
//! snapshot `get_all` returns. Mutations hold `write_lock` across their
//! read-modify-write so two concurrent saves cannot drop each other's update.

use std::{cmp::Reverse, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::models::{Flight, FlightEdit, FlightStatus};
use crate::storage::StoragePort;

/// Storage key the flight list has always been saved under.
pub const STORAGE_KEY: &str = "flyrely_flights";

const DEFAULT_COMPLETION_GRACE_HOURS: i64 = 2;

pub struct FlightStore {
    storage: Arc<dyn StoragePort>,
    write_lock: Mutex<()>,
    completion_grace: Duration,
}

impl FlightStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
            completion_grace: Duration::hours(DEFAULT_COMPLETION_GRACE_HOURS),
        }
    }

    pub fn with_completion_grace(mut self, grace: Duration) -> Self {
        self.completion_grace = grace;
        self
    }

    pub fn completion_grace(&self) -> Duration {
        self.completion_grace
    }

    /// All stored flights. Unreadable or corrupt storage reads as empty.
    pub async fn get_all(&self) -> Vec<Flight> {
        match self.load_all().await {
            Ok(flights) => flights,
            Err(err) => {
                warn!("Flight storage unreadable, treating as empty: {err:#}");
                Vec::new()
            }
        }
    }

    /// Strict read for mutations: a list that cannot be read is never
    /// written back over.
    async fn load_all(&self) -> Result<Vec<Flight>> {
        match self.storage.load().await.context("failed to load flight list")? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).context("stored flight list is corrupt")
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, flights: &[Flight]) -> Result<()> {
        let bytes = serde_json::to_vec(flights).context("failed to encode flight list")?;
        self.storage
            .save(bytes)
            .await
            .context("failed to persist flight list")
    }

    /// Inserts the flight, or replaces the stored flight with the same id.
    pub async fn save(&self, flight: Flight) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut flights = self.load_all().await?;

        match flights.iter_mut().find(|f| f.id == flight.id) {
            Some(existing) => *existing = flight,
            None => flights.push(flight),
        }

        self.write_all(&flights).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut flights = self.load_all().await?;
        let before = flights.len();
        flights.retain(|f| f.id != id);

        if flights.len() == before {
            debug!("remove: no flight with id {id}");
            return Ok(());
        }
        self.write_all(&flights).await
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Flight> {
        self.get_all().await.into_iter().find(|f| f.id == id)
    }

    /// Applies `mutate` to the stored flight and persists the result.
    /// Returns the updated flight, or `None` when the id is unknown.
    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<Option<Flight>>
    where
        F: FnOnce(&mut Flight),
    {
        let _guard = self.write_lock.lock().await;
        let mut flights = self.load_all().await?;

        let Some(flight) = flights.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        mutate(flight);
        let updated = flight.clone();

        self.write_all(&flights).await?;
        Ok(Some(updated))
    }

    /// Edits route or schedule; such changes drop the stale prediction.
    pub async fn edit(&self, id: &str, edit: FlightEdit) -> Result<Option<Flight>> {
        self.update(id, |flight| {
            if flight.apply_edit(edit) {
                info!("Flight {} edited; prediction cleared", flight.id);
            }
        })
        .await
    }

    pub async fn get_upcoming(&self) -> Vec<Flight> {
        self.get_upcoming_at(Utc::now()).await
    }

    /// Flights departing at or after `now`, soonest first.
    pub async fn get_upcoming_at(&self, now: DateTime<Utc>) -> Vec<Flight> {
        let mut flights: Vec<Flight> = self
            .get_all()
            .await
            .into_iter()
            .filter(|f| f.is_upcoming_at(now))
            .collect();
        flights.sort_by_key(|f| f.scheduled_departure);
        flights
    }

    pub async fn get_completed(&self) -> Vec<Flight> {
        self.get_completed_at(Utc::now()).await
    }

    /// Flights that departed before `now`, most recent first.
    pub async fn get_completed_at(&self, now: DateTime<Utc>) -> Vec<Flight> {
        let mut flights: Vec<Flight> = self
            .get_all()
            .await
            .into_iter()
            .filter(|f| !f.is_upcoming_at(now))
            .collect();
        flights.sort_by_key(|f| Reverse(f.scheduled_departure));
        flights
    }

    pub async fn auto_complete_old_flights(&self) -> Result<usize> {
        self.auto_complete_old_flights_at(Utc::now()).await
    }

    /// Marks flights past the grace period as completed in one write.
    /// Nothing is written when no flight changes.
    pub async fn auto_complete_old_flights_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut flights = self.load_all().await?;

        let mut completed = 0;
        for flight in flights
            .iter_mut()
            .filter(|f| !f.is_completed() && f.is_past_grace(now, self.completion_grace))
        {
            flight.status = FlightStatus::Completed;
            completed += 1;
        }

        if completed > 0 {
            self.write_all(&flights).await?;
            info!("Auto-completed {completed} flight(s)");
        }
        Ok(completed)
    }

    pub async fn clear_completed(&self) -> Result<usize> {
        self.clear_completed_at(Utc::now()).await
    }

    /// Drops every flight that departed before `now`. Returns how many went.
    pub async fn clear_completed_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut flights = self.load_all().await?;
        let before = flights.len();
        flights.retain(|f| f.is_upcoming_at(now));

        let removed = before - flights.len();
        if removed > 0 {
            self.write_all(&flights).await?;
            info!("Cleared {removed} completed flight(s)");
        }
        Ok(removed)
    }
}
