//! Summaries for the flight list and history screens.

use std::str::FromStr;

use anyhow::{bail, Error};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{datetime, Flight};

/// A flight counts as delayed past this many predicted minutes.
pub const ON_TIME_TOLERANCE_MINUTES: u32 = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub on_time: usize,
    pub delayed: usize,
}

impl HistoryStats {
    pub fn from_flights(flights: &[Flight]) -> Self {
        let delayed = flights
            .iter()
            .filter(|f| f.delay_minutes > ON_TIME_TOLERANCE_MINUTES)
            .count();
        Self {
            total: flights.len(),
            on_time: flights.len() - delayed,
            delayed,
        }
    }

    /// Whole-percent on-time share; `None` with no history.
    pub fn on_time_percent(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some(((self.on_time as f64 / self.total as f64) * 100.0).round() as u32)
    }
}

/// How far back the history screen looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryPeriod {
    #[default]
    All,
    Week,
    Month,
    ThreeMonths,
}

impl HistoryPeriod {
    fn span(self) -> Option<Duration> {
        match self {
            HistoryPeriod::All => None,
            HistoryPeriod::Week => Some(Duration::days(7)),
            HistoryPeriod::Month => Some(Duration::days(30)),
            HistoryPeriod::ThreeMonths => Some(Duration::days(90)),
        }
    }

    /// Keeps flights that departed within the period before `now`.
    pub fn filter(self, flights: Vec<Flight>, now: DateTime<Utc>) -> Vec<Flight> {
        match self.span() {
            None => flights,
            Some(span) => {
                let since = now - span;
                flights
                    .into_iter()
                    .filter(|f| f.scheduled_departure >= since)
                    .collect()
            }
        }
    }
}

impl FromStr for HistoryPeriod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "all" => HistoryPeriod::All,
            "week" => HistoryPeriod::Week,
            "month" => HistoryPeriod::Month,
            "3months" | "three-months" => HistoryPeriod::ThreeMonths,
            other => bail!("unknown period `{other}` (all, week, month, 3months)"),
        })
    }
}

/// Groups flights under "June 2025" style headings, keeping input order.
pub fn group_by_month(flights: &[Flight]) -> Vec<(String, Vec<Flight>)> {
    let mut groups: Vec<(String, Vec<Flight>)> = Vec::new();
    for flight in flights {
        let heading = flight.scheduled_departure.format("%B %Y").to_string();
        match groups.iter_mut().find(|(key, _)| *key == heading) {
            Some((_, members)) => members.push(flight.clone()),
            None => groups.push((heading, vec![flight.clone()])),
        }
    }
    groups
}

pub fn delay_range_label(min_delay: u32, max_delay: u32) -> String {
    if min_delay == max_delay {
        format!("{min_delay} min delay")
    } else {
        format!("{min_delay}-{max_delay} min delay")
    }
}

/// Text under a flight's risk badge, e.g. "45-75 min delay expected".
/// The estimate is a floor; the upper bound adds half an hour.
pub fn expected_delay_text(flight: &Flight) -> Option<String> {
    (flight.delay_minutes > 0)
        .then(|| format!("{} expected", delay_range_label(flight.delay_minutes, flight.delay_minutes + 30)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    pub expected: &'static str,
    pub range: String,
    pub minor_pct: u32,
    pub moderate_pct: u32,
    pub severe_pct: u32,
}

/// One row of the flight list, ready to print.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightCard {
    pub id: String,
    pub flight_number: String,
    pub route: String,
    pub departure: String,
    pub status: &'static str,
    pub risk: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityBreakdown>,
}

impl FlightCard {
    pub fn from_flight(flight: &Flight) -> Self {
        let severity = flight.delay_severity.as_ref().map(|severity| {
            let (minor_pct, moderate_pct, severe_pct) = severity.rounded_percentages();
            SeverityBreakdown {
                expected: severity.expected_delay_label.as_str(),
                range: severity.expected_delay_range.clone(),
                minor_pct,
                moderate_pct,
                severe_pct,
            }
        });

        Self {
            id: flight.id.clone(),
            flight_number: flight.flight_number.clone(),
            route: format!("{} → {}", flight.origin.code, flight.destination.code),
            departure: datetime::format(&flight.scheduled_departure),
            status: flight.status.as_str(),
            risk: flight.risk_level.label(),
            expected_delay: expected_delay_text(flight),
            reason: flight.delay_reason.clone(),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flight::fixtures::flight_departing;
    use crate::models::{DelaySeverity, RiskLevel, SeverityLabel};
    use chrono::TimeZone;

    fn flight_with_delay(month: u32, day: u32, delay: u32) -> Flight {
        let mut flight = flight_departing(Utc.with_ymd_and_hms(2025, month, day, 9, 0, 0).unwrap());
        flight.delay_minutes = delay;
        flight
    }

    #[test]
    fn stats_split_on_tolerance() {
        let flights = vec![
            flight_with_delay(5, 1, 0),
            flight_with_delay(5, 2, 15),
            flight_with_delay(5, 3, 16),
            flight_with_delay(5, 4, 45),
        ];
        let stats = HistoryStats::from_flights(&flights);
        assert_eq!(
            stats,
            HistoryStats {
                total: 4,
                on_time: 2,
                delayed: 2
            }
        );
        assert_eq!(stats.on_time_percent(), Some(50));
        assert_eq!(HistoryStats::default().on_time_percent(), None);
    }

    #[test]
    fn groups_by_month_in_order() {
        let flights = vec![
            flight_with_delay(6, 20, 0),
            flight_with_delay(6, 2, 0),
            flight_with_delay(5, 30, 0),
        ];
        let groups = group_by_month(&flights);
        let headings: Vec<&str> = groups.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(headings, vec!["June 2025", "May 2025"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn period_filter_keeps_recent_departures() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let flights = vec![
            flight_with_delay(6, 28, 0),
            flight_with_delay(6, 10, 0),
            flight_with_delay(4, 15, 0),
            flight_with_delay(1, 5, 0),
        ];
        let kept = |period: HistoryPeriod| period.filter(flights.clone(), now).len();
        assert_eq!(kept(HistoryPeriod::All), 4);
        assert_eq!(kept(HistoryPeriod::Week), 1);
        assert_eq!(kept(HistoryPeriod::Month), 2);
        assert_eq!(kept(HistoryPeriod::ThreeMonths), 3);

        assert_eq!("3months".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::ThreeMonths);
        assert_eq!("Week".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Week);
        assert!("fortnight".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn card_shows_badge_and_severity() {
        let mut flight = flight_with_delay(6, 1, 45);
        flight.risk_level = RiskLevel::Medium;
        flight.delay_reason = Some("Weather at JFK".into());
        flight.delay_severity = Some(DelaySeverity {
            minor_pct: 0.204,
            moderate_pct: 0.5,
            severe_pct: 0.296,
            expected_delay_label: SeverityLabel::Moderate,
            expected_delay_range: "30-60 min".into(),
        });

        let card = FlightCard::from_flight(&flight);
        assert_eq!(card.route, "JFK → LAX");
        assert_eq!(card.departure, "2025-06-01T09:00:00.000Z");
        assert_eq!(card.status, "scheduled");
        assert_eq!(card.risk, "At risk");
        assert_eq!(card.expected_delay.as_deref(), Some("45-75 min delay expected"));
        let severity = card.severity.unwrap();
        assert_eq!(severity.expected, "moderate");
        assert_eq!((severity.minor_pct, severity.moderate_pct, severity.severe_pct), (20, 50, 30));

        let calm = FlightCard::from_flight(&flight_with_delay(6, 1, 0));
        assert_eq!(calm.risk, "On track");
        assert!(calm.expected_delay.is_none());
        assert!(calm.severity.is_none());
    }

    #[test]
    fn delay_labels() {
        assert_eq!(delay_range_label(30, 30), "30 min delay");
        assert_eq!(delay_range_label(45, 75), "45-75 min delay");
        assert_eq!(
            expected_delay_text(&flight_with_delay(6, 1, 45)).as_deref(),
            Some("45-75 min delay expected")
        );
        assert!(expected_delay_text(&flight_with_delay(6, 1, 0)).is_none());
    }
}
