//! Contract with the external delay-prediction service.
//!
//! Transport is the caller's business: implement [`PredictionClient`] over
//! whatever HTTP stack the shell uses. The core only consumes successful
//! responses; a failed call leaves the flight's previous snapshot in place.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{datetime, DelaySeverity, RiskLevel};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRequest {
    pub origin: String,
    pub destination: String,
    #[serde(with = "datetime")]
    pub departure_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
}

impl PredictRequest {
    pub fn new(
        origin: &str,
        destination: &str,
        departure_time: DateTime<Utc>,
        airline: Option<&str>,
    ) -> Self {
        Self {
            origin: origin.trim().to_uppercase(),
            destination: destination.trim().to_uppercase(),
            departure_time,
            airline: airline
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub delay_probability: f64,
    /// The service always sends this today; older deployments did not, in
    /// which case the tier is bucketed from `delay_probability`.
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub delay_severity: Option<DelaySeverity>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeverityLabel;
    use chrono::TimeZone;

    #[test]
    fn request_normalizes_codes() {
        let departure = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let request = PredictRequest::new(" jfk", "lax ", departure, Some("  "));
        assert_eq!(request.origin, "JFK");
        assert_eq!(request.destination, "LAX");
        assert!(request.airline.is_none());

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["departure_time"], "2025-06-01T09:00:00.000Z");
        assert!(body.get("airline").is_none());
    }

    #[test]
    fn parses_full_service_response() {
        let raw = r#"{
            "delay_probability": 0.8,
            "risk_level": "high",
            "confidence": 0.7,
            "delay_severity": {
                "minor_pct": 0.2, "moderate_pct": 0.3, "severe_pct": 0.5,
                "expected_delay_label": "severe", "expected_delay_range": "2h+"
            },
            "risk_factors": ["Storms at JFK", "Evening bank"],
            "recommendations": ["Book an earlier flight"]
        }"#;
        let response: PredictResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.risk_level, Some(RiskLevel::High));
        assert_eq!(
            response.delay_severity.map(|s| s.expected_delay_label),
            Some(SeverityLabel::Severe)
        );
        assert_eq!(response.risk_factors.len(), 2);
    }

    #[test]
    fn tolerates_minimal_response() {
        let response: PredictResponse =
            serde_json::from_str(r#"{"delay_probability": 0.5, "risk_level": null}"#).unwrap();
        assert!(response.risk_level.is_none());
        assert!(response.delay_severity.is_none());
        assert!(response.risk_factors.is_empty());
    }
}
