use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Badge text shown next to a flight.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "On track",
            RiskLevel::Medium => "At risk",
            RiskLevel::High => "High risk",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLabel {
    Minor,
    Moderate,
    Severe,
}

impl SeverityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLabel::Minor => "minor",
            SeverityLabel::Moderate => "moderate",
            SeverityLabel::Severe => "severe",
        }
    }
}

/// Probability split across delay-duration buckets, conditioned on a delay
/// happening at all. Field names follow the prediction service payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelaySeverity {
    pub minor_pct: f64,
    pub moderate_pct: f64,
    pub severe_pct: f64,
    pub expected_delay_label: SeverityLabel,
    #[serde(default)]
    pub expected_delay_range: String,
}

impl DelaySeverity {
    /// Bucket percentages rounded to whole numbers, in minor/moderate/severe order.
    pub fn rounded_percentages(&self) -> (u32, u32, u32) {
        let pct = |value: f64| (value.clamp(0.0, 1.0) * 100.0).round() as u32;
        (
            pct(self.minor_pct),
            pct(self.moderate_pct),
            pct(self.severe_pct),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
        let parsed: RiskLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, RiskLevel::Medium);
        assert!(serde_json::from_str::<RiskLevel>("\"extreme\"").is_err());
    }

    #[test]
    fn severity_without_range_still_parses() {
        let severity: DelaySeverity = serde_json::from_str(
            r#"{"minor_pct":0.5,"moderate_pct":0.3,"severe_pct":0.2,"expected_delay_label":"minor"}"#,
        )
        .unwrap();
        assert_eq!(severity.expected_delay_label, SeverityLabel::Minor);
        assert!(severity.expected_delay_range.is_empty());
        assert_eq!(severity.rounded_percentages(), (50, 30, 20));
    }
}
