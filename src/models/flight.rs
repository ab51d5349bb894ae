//! Tracked flight record and its prediction snapshot.
//!
//! The JSON layout matches what earlier app versions wrote to storage, so every
//! field added since then is optional with a serde default.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{datetime, Airline, Airport, DelaySeverity, RiskLevel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    OnTime,
    Delayed,
    Cancelled,
    Boarding,
    Departed,
    Landed,
    Completed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::OnTime => "on_time",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Departed => "departed",
            FlightStatus::Landed => "landed",
            FlightStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub flight_number: String,
    pub airline: Airline,
    pub origin: Airport,
    pub destination: Airport,
    #[serde(with = "datetime")]
    pub scheduled_departure: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub scheduled_arrival: DateTime<Utc>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicted_departure: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicted_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: FlightStatus,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub delay_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_severity: Option<DelaySeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    /// Epoch milliseconds of the last successful prediction refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<i64>,
}

/// Prediction-derived fields, replaced wholesale on every successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSnapshot {
    pub risk_level: RiskLevel,
    pub delay_minutes: u32,
    pub delay_reason: Option<String>,
    pub delay_severity: Option<DelaySeverity>,
    pub predicted_departure: Option<DateTime<Utc>>,
    pub predicted_arrival: Option<DateTime<Utc>>,
}

/// User edit to a tracked flight. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct FlightEdit {
    pub flight_number: Option<String>,
    pub airline: Option<Airline>,
    pub origin: Option<Airport>,
    pub destination: Option<Airport>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
}

const TRACKED_ID_PREFIX: &str = "flight-";
const ROUTE_CANDIDATE_ID_PREFIX: &str = "route-";

impl Flight {
    pub fn new(
        flight_number: impl Into<String>,
        airline: Airline,
        origin: Airport,
        destination: Airport,
        scheduled_departure: DateTime<Utc>,
        scheduled_arrival: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{TRACKED_ID_PREFIX}{}", Uuid::new_v4()),
            flight_number: flight_number.into(),
            airline,
            origin,
            destination,
            scheduled_departure,
            scheduled_arrival,
            predicted_departure: None,
            predicted_arrival: None,
            status: FlightStatus::Scheduled,
            risk_level: RiskLevel::Low,
            delay_minutes: 0,
            delay_reason: None,
            delay_severity: None,
            airline_status: None,
            gate: None,
            terminal: None,
            last_checked_at: None,
        }
    }

    /// Re-ids the flight as an unconfirmed route-search result.
    pub fn into_route_candidate(mut self) -> Self {
        self.id = format!("{ROUTE_CANDIDATE_ID_PREFIX}{}", Uuid::new_v4());
        self
    }

    pub fn is_route_candidate(&self) -> bool {
        self.id.starts_with(ROUTE_CANDIDATE_ID_PREFIX)
    }

    /// A route candidate gets a tracked id once the user keeps it.
    pub fn into_tracked(mut self) -> Self {
        if self.is_route_candidate() {
            self.id = format!("{TRACKED_ID_PREFIX}{}", Uuid::new_v4());
        }
        self
    }

    /// Last successful refresh; a stored 0 means never checked.
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at
            .filter(|ms| *ms > 0)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_departure >= now
    }

    pub fn is_completed(&self) -> bool {
        self.status == FlightStatus::Completed
    }

    /// True once departure lies more than `grace` in the past. A negative
    /// grace counts as zero.
    pub fn is_past_grace(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        now.checked_sub_signed(grace.max(Duration::zero()))
            .is_some_and(|cutoff| self.scheduled_departure < cutoff)
    }

    pub fn apply_prediction(&mut self, snapshot: PredictionSnapshot) {
        self.risk_level = snapshot.risk_level;
        self.delay_minutes = snapshot.delay_minutes;
        self.delay_reason = snapshot.delay_reason;
        self.delay_severity = snapshot.delay_severity;
        self.predicted_departure = snapshot.predicted_departure;
        self.predicted_arrival = snapshot.predicted_arrival;
    }

    /// Drops prediction data and the staleness marker so the next refresh
    /// check fetches a fresh prediction.
    pub fn clear_prediction(&mut self) {
        self.risk_level = RiskLevel::Low;
        self.delay_minutes = 0;
        self.delay_reason = None;
        self.delay_severity = None;
        self.predicted_departure = None;
        self.predicted_arrival = None;
        self.last_checked_at = None;
    }

    /// Applies an edit. Route or schedule changes invalidate the prediction.
    /// Returns whether the prediction was cleared.
    pub fn apply_edit(&mut self, edit: FlightEdit) -> bool {
        let mut invalidated = false;

        if let Some(flight_number) = edit.flight_number {
            self.flight_number = flight_number;
        }
        if let Some(airline) = edit.airline {
            invalidated |= airline.code != self.airline.code;
            self.airline = airline;
        }
        if let Some(origin) = edit.origin {
            invalidated |= origin.code != self.origin.code;
            self.origin = origin;
        }
        if let Some(destination) = edit.destination {
            invalidated |= destination.code != self.destination.code;
            self.destination = destination;
        }
        if let Some(departure) = edit.scheduled_departure {
            invalidated |= departure != self.scheduled_departure;
            self.scheduled_departure = departure;
        }
        if let Some(arrival) = edit.scheduled_arrival {
            invalidated |= arrival != self.scheduled_arrival;
            self.scheduled_arrival = arrival;
        }

        if invalidated {
            self.clear_prediction();
        }
        invalidated
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn flight_departing(departure: DateTime<Utc>) -> Flight {
        Flight::new(
            "DL123",
            Airline::from_code("DL").unwrap(),
            Airport::from_code("JFK").unwrap(),
            Airport::from_code("LAX").unwrap(),
            departure,
            departure + Duration::hours(5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::flight_departing;
    use super::*;
    use chrono::TimeZone;

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_flight_has_unique_prefixed_id() {
        let a = flight_departing(departure());
        let b = flight_departing(departure());
        assert!(a.id.starts_with("flight-"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, FlightStatus::Scheduled);
        assert!(a.last_checked().is_none());
    }

    #[test]
    fn grace_check_ignores_negative_and_huge_grace() {
        let upcoming = flight_departing(departure() + Duration::hours(5));
        assert!(!upcoming.is_past_grace(departure(), Duration::hours(-24)));

        let long_gone = flight_departing(departure() - Duration::days(400));
        assert!(!long_gone.is_past_grace(departure(), Duration::days(100_000_000)));
        assert!(long_gone.is_past_grace(departure(), Duration::hours(2)));
    }

    #[test]
    fn route_candidates_are_re_ided_when_tracked() {
        let candidate = flight_departing(departure()).into_route_candidate();
        assert!(candidate.id.starts_with("route-"));
        assert!(candidate.is_route_candidate());

        let tracked = candidate.clone().into_tracked();
        assert!(tracked.id.starts_with("flight-"));
        assert_ne!(tracked.id, candidate.id);
        assert_eq!(tracked.clone().into_tracked().id, tracked.id);
    }

    #[test]
    fn zero_last_checked_means_never() {
        let mut flight = flight_departing(departure());
        flight.last_checked_at = Some(0);
        assert!(flight.last_checked().is_none());
        flight.last_checked_at = Some(departure().timestamp_millis());
        assert_eq!(flight.last_checked(), Some(departure()));
    }

    #[test]
    fn reads_legacy_record_without_optional_fields() {
        let raw = r#"{
            "id": "flight-1700000000000",
            "flightNumber": "AA100",
            "airline": {"code": "AA", "name": "American Airlines"},
            "origin": {"code": "JFK", "name": "JFK", "city": "JFK", "timezone": "UTC"},
            "destination": {"code": "LAX", "name": "LAX", "city": "LAX", "timezone": "UTC"},
            "scheduledDeparture": "2025-06-01T09:00:00",
            "scheduledArrival": "2025-06-01T14:00:00.000Z",
            "status": "scheduled",
            "riskLevel": "medium"
        }"#;

        let flight: Flight = serde_json::from_str(raw).unwrap();
        assert_eq!(flight.scheduled_departure, departure());
        assert_eq!(flight.risk_level, RiskLevel::Medium);
        assert_eq!(flight.delay_minutes, 0);
        assert!(flight.delay_severity.is_none());
        assert!(flight.last_checked_at.is_none());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let flight = flight_departing(departure());
        let value = serde_json::to_value(&flight).unwrap();
        assert_eq!(value["scheduledDeparture"], "2025-06-01T09:00:00.000Z");
        assert_eq!(value["status"], "scheduled");
        assert!(value.get("predictedDeparture").is_none());
        assert!(value.get("lastCheckedAt").is_none());
    }

    #[test]
    fn schedule_edit_clears_prediction() {
        let mut flight = flight_departing(departure());
        flight.apply_prediction(PredictionSnapshot {
            risk_level: RiskLevel::High,
            delay_minutes: 60,
            delay_reason: Some("Weather".into()),
            delay_severity: None,
            predicted_departure: Some(departure() + Duration::minutes(60)),
            predicted_arrival: None,
        });
        flight.last_checked_at = Some(departure().timestamp_millis());

        let cleared = flight.apply_edit(FlightEdit {
            scheduled_departure: Some(departure() + Duration::days(1)),
            ..FlightEdit::default()
        });

        assert!(cleared);
        assert_eq!(flight.delay_minutes, 0);
        assert_eq!(flight.risk_level, RiskLevel::Low);
        assert!(flight.predicted_departure.is_none());
        assert!(flight.last_checked_at.is_none());
    }

    #[test]
    fn cosmetic_edit_keeps_prediction() {
        let mut flight = flight_departing(departure());
        flight.delay_minutes = 30;
        let cleared = flight.apply_edit(FlightEdit {
            flight_number: Some("DL124".into()),
            scheduled_departure: Some(departure()),
            ..FlightEdit::default()
        });
        assert!(!cleared);
        assert_eq!(flight.flight_number, "DL124");
        assert_eq!(flight.delay_minutes, 30);
    }
}
