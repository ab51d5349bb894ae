use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::{info, warn};
use serde::Serialize;

use super::{deriver, policy, ReasonStyle};
use crate::config::TrackerConfig;
use crate::models::{Airline, Airport, Flight};
use crate::prediction::{PredictRequest, PredictionClient};
use crate::store::FlightStore;

/// Default block time for a searched flight when no schedule is known.
const ASSUMED_BLOCK_HOURS: i64 = 5;
/// Flight-number searches assume a morning departure on the chosen date.
const NUMBER_SEARCH_DEPARTURE: (u32, u32) = (9, 0);
/// Route searches sample these departure slots on the chosen date.
const ROUTE_SEARCH_SLOTS: [(u32, u32); 3] = [(7, 0), (12, 0), (17, 0)];

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefreshOutcome {
    NotFound { id: String },
    /// Prediction still fresh, or the flight already departed.
    Skipped { flight: Flight },
    Refreshed { flight: Flight },
    /// The flight was edited while the prediction was in flight; the
    /// response described the old schedule and was dropped.
    Superseded { flight: Flight },
    /// Prediction call failed; the stored snapshot is unchanged.
    Failed { flight: Flight, error: String },
}

impl RefreshOutcome {
    pub fn flight(&self) -> Option<&Flight> {
        match self {
            RefreshOutcome::NotFound { .. } => None,
            RefreshOutcome::Skipped { flight }
            | RefreshOutcome::Refreshed { flight }
            | RefreshOutcome::Superseded { flight }
            | RefreshOutcome::Failed { flight, .. } => Some(flight),
        }
    }
}

fn request_for(flight: &Flight) -> PredictRequest {
    PredictRequest::new(
        &flight.origin.code,
        &flight.destination.code,
        flight.scheduled_departure,
        Some(&flight.airline.code),
    )
}

fn same_itinerary(a: &Flight, b: &Flight) -> bool {
    a.scheduled_departure == b.scheduled_departure
        && a.scheduled_arrival == b.scheduled_arrival
        && a.origin.code == b.origin.code
        && a.destination.code == b.destination.code
}

/// Fetches and merges a new prediction for one flight.
///
/// `force` skips the staleness check (manual refresh), but a departed
/// flight is never refreshed. Storage write errors propagate; prediction
/// errors are reported as [`RefreshOutcome::Failed`].
pub async fn refresh_flight(
    store: &FlightStore,
    client: &dyn PredictionClient,
    config: &TrackerConfig,
    id: &str,
    now: DateTime<Utc>,
    force: bool,
) -> Result<RefreshOutcome> {
    let Some(flight) = store.get_by_id(id).await else {
        return Ok(RefreshOutcome::NotFound { id: id.to_string() });
    };

    let departed = flight.scheduled_departure < now;
    if departed || !(force || policy::should_refresh_with(&flight, now, &config.refresh)) {
        return Ok(RefreshOutcome::Skipped { flight });
    }

    let response = match client.predict(request_for(&flight)).await {
        Ok(response) => response,
        Err(err) => {
            warn!("Prediction for {} failed, keeping previous data: {err:#}", flight.id);
            return Ok(RefreshOutcome::Failed {
                flight,
                error: format!("{err:#}"),
            });
        }
    };

    let snapshot = deriver::derive(&flight, &response, &config.delay, ReasonStyle::Tracked);
    let mut applied = false;
    let updated = store
        .update(id, |stored| {
            if same_itinerary(stored, &flight) {
                stored.apply_prediction(snapshot);
                policy::mark_checked(stored, now);
                applied = true;
            }
        })
        .await?;

    Ok(match updated {
        None => RefreshOutcome::NotFound { id: id.to_string() },
        Some(flight) if applied => {
            info!(
                "Refreshed {}: {} risk, {} min",
                flight.id,
                flight.risk_level.as_str(),
                flight.delay_minutes
            );
            RefreshOutcome::Refreshed { flight }
        }
        Some(flight) => RefreshOutcome::Superseded { flight },
    })
}

/// Refreshes every upcoming flight whose prediction is stale, one at a time.
pub async fn refresh_due(
    store: &FlightStore,
    client: &dyn PredictionClient,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Result<Vec<RefreshOutcome>> {
    let mut outcomes = Vec::new();
    for flight in store.get_upcoming_at(now).await {
        if policy::should_refresh_with(&flight, now, &config.refresh) {
            outcomes.push(refresh_flight(store, client, config, &flight.id, now, false).await?);
        }
    }
    Ok(outcomes)
}

/// A flight-number lookup as entered on the add-flight screen.
#[derive(Debug, Clone)]
pub struct FlightQuery {
    pub flight_number: String,
    /// Airline name or code as typed.
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

fn route_endpoint(input: &str) -> Airport {
    Airport::from_code(input).unwrap_or_else(|| Airport::unlisted(input))
}

fn at_slot(date: NaiveDate, (hour, minute): (u32, u32)) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    date.and_time(time).and_utc()
}

/// Splits "dl 123" / "DL123" / "123" into an airline code and full number.
fn normalize_flight_number(flight_number: &str, airline: &str) -> (String, String) {
    let compact: String = flight_number
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let prefix: String = compact.chars().take(2).collect();

    let airline_code = if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        prefix
    } else {
        airline.trim().chars().take(2).collect::<String>().to_uppercase()
    };
    let numeric = compact.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let full_number = format!("{airline_code}{numeric}");
    (airline_code, full_number)
}

/// Builds a candidate flight for a flight-number search and predicts it.
/// The result is not stored; save it once the user confirms.
pub async fn lookup_flight(
    client: &dyn PredictionClient,
    config: &TrackerConfig,
    query: &FlightQuery,
    now: DateTime<Utc>,
) -> Result<Flight> {
    let (airline_code, full_number) = normalize_flight_number(&query.flight_number, &query.airline);
    let airline = Airline::from_code(&airline_code).unwrap_or_else(|| Airline {
        code: airline_code.clone(),
        name: query.airline.trim().to_string(),
        logo: None,
    });

    let departure = at_slot(query.date, NUMBER_SEARCH_DEPARTURE);
    let mut flight = Flight::new(
        full_number,
        airline,
        route_endpoint(&query.origin),
        route_endpoint(&query.destination),
        departure,
        departure + Duration::hours(ASSUMED_BLOCK_HOURS),
    );
    flight.airline_status = Some("On time".into());

    let response = client.predict(request_for(&flight)).await?;
    flight.apply_prediction(deriver::derive(
        &flight,
        &response,
        &config.delay,
        ReasonStyle::Tracked,
    ));
    policy::mark_checked(&mut flight, now);
    Ok(flight)
}

/// Candidate departures across the day for a route. Any failed prediction
/// fails the whole search.
pub async fn search_route(
    client: &dyn PredictionClient,
    config: &TrackerConfig,
    origin: &str,
    destination: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<Flight>> {
    let airline = Airline {
        code: "FL".into(),
        name: "Various Airlines".into(),
        logo: None,
    };

    let mut results = Vec::with_capacity(ROUTE_SEARCH_SLOTS.len());
    for (i, slot) in ROUTE_SEARCH_SLOTS.iter().enumerate() {
        let departure = at_slot(date, *slot);
        let mut flight = Flight::new(
            format!("FL{}", 100 + i * 11),
            airline.clone(),
            route_endpoint(origin),
            route_endpoint(destination),
            departure,
            departure + Duration::hours(ASSUMED_BLOCK_HOURS),
        )
        .into_route_candidate();

        let request =
            PredictRequest::new(&flight.origin.code, &flight.destination.code, departure, None);
        let response = client.predict(request).await?;
        flight.apply_prediction(deriver::derive(
            &flight,
            &response,
            &config.delay,
            ReasonStyle::RouteSearch,
        ));
        policy::mark_checked(&mut flight, now);
        results.push(flight);
    }
    Ok(results)
}
