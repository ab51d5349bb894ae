use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;

use crate::config::RefreshThresholds;
use crate::models::Flight;
use crate::store::FlightStore;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Whether `flight`'s prediction is stale at `now`, under default thresholds.
pub fn should_refresh(flight: &Flight, now: DateTime<Utc>) -> bool {
    should_refresh_with(flight, now, &RefreshThresholds::default())
}

/// Tiered on time to departure:
/// - departed: never, the prediction is frozen
/// - at or inside `imminent_hours`: always
/// - at or beyond `far_horizon_hours`: when older than `far_max_age_hours`
/// - in between: when older than `near_max_age_hours`
///
/// A flight that was never checked is infinitely stale.
pub fn should_refresh_with(
    flight: &Flight,
    now: DateTime<Utc>,
    thresholds: &RefreshThresholds,
) -> bool {
    if flight.scheduled_departure < now {
        return false;
    }

    let hours_until_departure = hours_between(now, flight.scheduled_departure);
    let hours_since_check = flight
        .last_checked()
        .map_or(f64::INFINITY, |checked| hours_between(checked, now));

    let due = if hours_until_departure <= thresholds.imminent_hours {
        true
    } else if hours_until_departure >= thresholds.far_horizon_hours {
        hours_since_check > thresholds.far_max_age_hours
    } else {
        hours_since_check > thresholds.near_max_age_hours
    };

    debug!(
        "refresh check {}: {hours_until_departure:.2}h to departure, {hours_since_check:.2}h since check, due={due}",
        flight.id
    );
    due
}

/// Sets the staleness marker. Only call once new prediction data is merged.
pub fn mark_checked(flight: &mut Flight, now: DateTime<Utc>) {
    flight.last_checked_at = Some(now.timestamp_millis());
}

/// Copy of `flight` marked as checked at `now`, persisted through `store`.
pub async fn stamp_checked(
    store: &FlightStore,
    flight: &Flight,
    now: DateTime<Utc>,
) -> Result<Flight> {
    let mut stamped = flight.clone();
    mark_checked(&mut stamped, now);
    store.save(stamped.clone()).await?;
    Ok(stamped)
}
