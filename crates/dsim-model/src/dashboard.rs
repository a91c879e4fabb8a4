//! Rows served by the read-only dashboard endpoints.

use crate::decode::{FromPayload, number_field, number_field_any, optional_text, text_field};
use crate::payload::Payload;

/// `GET /forecast` - actual vs. predicted national trend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastPoint {
    pub date: String,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
}

impl FromPayload for ForecastPoint {
    fn from_payload(value: &Payload) -> Self {
        Self {
            date: text_field(value, "date"),
            actual: number_field(value, "Actual"),
            predicted: number_field(value, "Predicted"),
        }
    }
}

/// `GET /clusters` - one sampled district point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterPoint {
    pub district: String,
    pub cluster_name: String,
    pub intensity: f64,
    pub lat: f64,
    pub lng: f64,
}

impl FromPayload for ClusterPoint {
    fn from_payload(value: &Payload) -> Self {
        Self {
            district: text_field(value, "district"),
            cluster_name: text_field(value, "cluster_name"),
            intensity: number_field_any(value, &["intensity", "labor_intensity"])
                .unwrap_or_default(),
            lat: number_field(value, "lat").unwrap_or_default(),
            lng: number_field(value, "lng").unwrap_or_default(),
        }
    }
}

/// `GET /anomalies` - a high-risk alert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnomalyAlert {
    pub district: String,
    pub state: String,
    pub score: f64,
    pub lat: f64,
    pub lng: f64,
}

impl FromPayload for AnomalyAlert {
    fn from_payload(value: &Payload) -> Self {
        Self {
            district: text_field(value, "district"),
            state: text_field(value, "state"),
            score: number_field_any(value, &["score", "risk_score"]).unwrap_or_default(),
            lat: number_field(value, "lat").unwrap_or_default(),
            lng: number_field(value, "lng").unwrap_or_default(),
        }
    }
}

/// `GET /insights` - model feature importance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

impl FromPayload for FeatureImportance {
    fn from_payload(value: &Payload) -> Self {
        Self {
            feature: text_field(value, "feature"),
            importance: number_field(value, "importance").unwrap_or_default(),
        }
    }
}

/// `GET /generate_report` - generated narrative plus the stats it summarizes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AiReport {
    pub summary: String,
    pub report: String,
}

impl AiReport {
    /// Non-empty lines of the report body.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.report
            .lines()
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl FromPayload for AiReport {
    fn from_payload(value: &Payload) -> Self {
        Self {
            summary: text_field(value, "summary"),
            report: text_field(value, "report"),
        }
    }
}

/// `GET /` - service liveness.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthStatus {
    pub status: String,
    pub models_loaded: bool,
}

impl HealthStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

impl FromPayload for HealthStatus {
    fn from_payload(value: &Payload) -> Self {
        Self {
            status: optional_text(value, "status").unwrap_or_default(),
            models_loaded: value
                .get("models_loaded")
                .and_then(Payload::as_bool)
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_list;

    #[test]
    fn test_forecast_rows() {
        let payload = Payload::parse(
            r#"[{"date": "2025-03-01", "Actual": 120.0, "Predicted": 118.2},
                {"date": "2025-03-02", "Actual": null, "Predicted": 121}]"#,
        )
        .unwrap();
        let rows: Vec<ForecastPoint> = decode_list(Some(&payload));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].actual, None);
        assert_eq!(rows[1].predicted, Some(121.0));
    }

    #[test]
    fn test_health_status() {
        let payload = Payload::parse(r#"{"status": "online", "models_loaded": true}"#).unwrap();
        let health = HealthStatus::from_payload(&payload);
        assert!(health.is_online());
        assert!(health.models_loaded);
    }

    #[test]
    fn test_ai_report_paragraphs() {
        let report = AiReport {
            summary: "Analyzed 10 districts.".to_string(),
            report: "First.\n\nSecond.".to_string(),
        };
        assert_eq!(report.paragraphs(), vec!["First.", "Second."]);
    }
}
