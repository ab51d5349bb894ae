//! Turns a prediction response into the display fields stored on a flight.
//!
//! `risk_level` and `delay_minutes` are sourced independently: a low delay
//! estimate never downgrades the tier the service reported, and vice versa.

use chrono::Duration;

use crate::config::DelayHeuristics;
use crate::models::{Flight, PredictionSnapshot, RiskLevel, SeverityLabel};
use crate::prediction::PredictResponse;

const REASON_SEPARATOR: &str = " • ";

/// How many risk factors make it into the delay reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonStyle {
    /// A tracked flight's detail view: top two factors.
    Tracked,
    /// A route-search result card: top factor only.
    RouteSearch,
}

impl ReasonStyle {
    fn factor_limit(self) -> usize {
        match self {
            ReasonStyle::Tracked => 2,
            ReasonStyle::RouteSearch => 1,
        }
    }
}

fn clamp_probability(probability: f64) -> f64 {
    if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// Non-negative inputs only, so `round` (half away from zero) is half-up here.
fn round_minutes(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

pub fn severity_midpoint(label: SeverityLabel, heuristics: &DelayHeuristics) -> f64 {
    match label {
        SeverityLabel::Minor => heuristics.minor_midpoint_minutes,
        SeverityLabel::Moderate => heuristics.moderate_midpoint_minutes,
        SeverityLabel::Severe => heuristics.severe_midpoint_minutes,
    }
}

/// Probability bucketing used when the service reports no tier.
pub fn classify_probability(probability: f64, heuristics: &DelayHeuristics) -> RiskLevel {
    let probability = clamp_probability(probability);
    if probability < heuristics.medium_risk_threshold {
        RiskLevel::Low
    } else if probability < heuristics.high_risk_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn risk_level(response: &PredictResponse, heuristics: &DelayHeuristics) -> RiskLevel {
    response
        .risk_level
        .unwrap_or_else(|| classify_probability(response.delay_probability, heuristics))
}

/// Severity-weighted estimate when a distribution is present, otherwise a
/// coarser per-tier scale. Low tier without severity estimates no delay.
pub fn estimate_delay_minutes(response: &PredictResponse, heuristics: &DelayHeuristics) -> u32 {
    let probability = clamp_probability(response.delay_probability);

    if let Some(severity) = &response.delay_severity {
        return round_minutes(
            probability * severity_midpoint(severity.expected_delay_label, heuristics),
        );
    }

    match risk_level(response, heuristics) {
        RiskLevel::High => round_minutes(probability * heuristics.high_risk_scale_minutes),
        RiskLevel::Medium => round_minutes(probability * heuristics.medium_risk_scale_minutes),
        RiskLevel::Low => 0,
    }
}

pub fn delay_reason(factors: &[String], style: ReasonStyle) -> Option<String> {
    let picked: Vec<&str> = factors
        .iter()
        .map(|factor| factor.trim())
        .filter(|factor| !factor.is_empty())
        .take(style.factor_limit())
        .collect();

    if picked.is_empty() {
        None
    } else {
        Some(picked.join(REASON_SEPARATOR))
    }
}

/// Full snapshot for `flight`. Predicted times only exist for a positive delay.
pub fn derive(
    flight: &Flight,
    response: &PredictResponse,
    heuristics: &DelayHeuristics,
    style: ReasonStyle,
) -> PredictionSnapshot {
    let delay_minutes = estimate_delay_minutes(response, heuristics);
    let (predicted_departure, predicted_arrival) = if delay_minutes > 0 {
        let delay = Duration::minutes(i64::from(delay_minutes));
        (
            Some(flight.scheduled_departure + delay),
            Some(flight.scheduled_arrival + delay),
        )
    } else {
        (None, None)
    };

    PredictionSnapshot {
        risk_level: risk_level(response, heuristics),
        delay_minutes,
        delay_reason: delay_reason(&response.risk_factors, style),
        delay_severity: response.delay_severity.clone(),
        predicted_departure,
        predicted_arrival,
    }
}
