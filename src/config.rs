use anyhow::{bail, Context, Result};
use chrono::Duration;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

/// Time-to-departure tiers that gate prediction refreshes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshThresholds {
    /// Beyond this many hours out a flight is in the far tier.
    pub far_horizon_hours: f64,
    /// Max prediction age in the far tier.
    pub far_max_age_hours: f64,
    /// At or under this many hours out every check refreshes.
    pub imminent_hours: f64,
    /// Max prediction age between the imminent and far tiers.
    pub near_max_age_hours: f64,
}

impl Default for RefreshThresholds {
    fn default() -> Self {
        Self {
            far_horizon_hours: 48.0,
            far_max_age_hours: 24.0,
            imminent_hours: 2.0,
            near_max_age_hours: 2.0,
        }
    }
}

/// Heuristics that turn a delay probability into display minutes and a risk tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DelayHeuristics {
    pub minor_midpoint_minutes: f64,
    pub moderate_midpoint_minutes: f64,
    pub severe_midpoint_minutes: f64,
    /// Minutes per unit probability when only `risk_level` is known.
    pub high_risk_scale_minutes: f64,
    pub medium_risk_scale_minutes: f64,
    /// Probability at which a flight stops being low risk.
    pub medium_risk_threshold: f64,
    pub high_risk_threshold: f64,
}

impl Default for DelayHeuristics {
    fn default() -> Self {
        Self {
            minor_midpoint_minutes: 25.0,
            moderate_midpoint_minutes: 75.0,
            severe_midpoint_minutes: 150.0,
            high_risk_scale_minutes: 90.0,
            medium_risk_scale_minutes: 45.0,
            medium_risk_threshold: 0.35,
            high_risk_threshold: 0.65,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub refresh: RefreshThresholds,
    pub delay: DelayHeuristics,
    /// Hours past scheduled departure before a flight is auto-completed.
    pub completion_grace_hours: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshThresholds::default(),
            delay: DelayHeuristics::default(),
            completion_grace_hours: 2,
        }
    }
}

/// Upper bound for `completion_grace_hours`: one year.
pub const MAX_COMPLETION_GRACE_HOURS: i64 = 24 * 365;

impl TrackerConfig {
    pub fn completion_grace(&self) -> Duration {
        Duration::hours(self.completion_grace_hours.clamp(0, MAX_COMPLETION_GRACE_HOURS))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_COMPLETION_GRACE_HOURS).contains(&self.completion_grace_hours) {
            bail!(
                "completion_grace_hours must be within 0..={MAX_COMPLETION_GRACE_HOURS}, got {}",
                self.completion_grace_hours
            );
        }
        Ok(())
    }

    /// Replaces out-of-range values read from disk with their defaults.
    fn sanitized(mut self, source: &Path) -> Self {
        if let Err(err) = self.validate() {
            warn!("{err} in {}; using the default", source.display());
            self.completion_grace_hours = TrackerConfig::default().completion_grace_hours;
        }
        self
    }
}

/// JSON-file backed config. A missing or unreadable file yields defaults.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<TrackerConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<TrackerConfig>(&contents)
                .map(|config| config.sanitized(&path))
                .unwrap_or_else(|err| {
                    warn!(
                        "Ignoring malformed config at {}: {err}; using defaults",
                        path.display()
                    );
                    TrackerConfig::default()
                })
        } else {
            TrackerConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> TrackerConfig {
        *self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&config)?;
        *guard = config;
        Ok(())
    }

    fn persist(&self, data: &TrackerConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }
}
