//! Simulation results returned by the simulate endpoint.

use crate::decode::{
    FromPayload, decode_list, number_field, number_field_any, optional_text, text_field,
};
use crate::payload::Payload;
use crate::sanitize::sanitize_in_place;

/// One district prediction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionRow {
    pub district: String,
    pub state: String,
    /// Probability of meeting targets, in percent (0-100). `None` when the
    /// service sent `null` or omitted it.
    pub success_probability: Option<f64>,
    pub performance_label: String,
    pub anomaly_status: String,
    /// Forecasted footfall, when the forecasting models ran.
    pub forecasted_footfall: Option<f64>,
}

impl PredictionRow {
    /// Probability above which a district is highlighted as likely to succeed.
    pub const HIGH_PROBABILITY: f64 = 65.0;

    /// Returns true when the success probability is strictly above 65%.
    pub fn is_high_probability(&self) -> bool {
        self.success_probability
            .is_some_and(|value| value > Self::HIGH_PROBABILITY)
    }

    /// Case-insensitive substring match on district or state.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.district.to_lowercase().contains(needle)
            || self.state.to_lowercase().contains(needle)
    }
}

impl FromPayload for PredictionRow {
    fn from_payload(value: &Payload) -> Self {
        Self {
            district: text_field(value, "district"),
            state: text_field(value, "state"),
            success_probability: number_field(value, "success_probability"),
            performance_label: text_field(value, "performance_label"),
            anomaly_status: text_field(value, "anomaly_status"),
            forecasted_footfall: number_field(value, "forecasted_footfall"),
        }
    }
}

/// A flagged district on the risk map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskPoint {
    pub district: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
}

impl FromPayload for RiskPoint {
    fn from_payload(value: &Payload) -> Self {
        Self {
            district: text_field(value, "district"),
            state: optional_text(value, "state"),
            lat: number_field(value, "lat").unwrap_or_default(),
            lng: number_field(value, "lng").unwrap_or_default(),
            score: number_field_any(value, &["score", "risk_score"]).unwrap_or_default(),
        }
    }
}

/// A district's cluster assignment and labor intensity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterRow {
    pub district: String,
    /// Labor intensity score in `[0, 1]`.
    pub labor_intensity: f64,
    pub cluster_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ClusterRow {
    /// Intensity above which a district counts as labor-heavy.
    pub const HIGH_INTENSITY: f64 = 0.7;

    pub fn is_high_intensity(&self) -> bool {
        self.labor_intensity > Self::HIGH_INTENSITY
    }
}

impl FromPayload for ClusterRow {
    fn from_payload(value: &Payload) -> Self {
        Self {
            district: text_field(value, "district"),
            labor_intensity: number_field(value, "labor_intensity").unwrap_or_default(),
            cluster_name: text_field(value, "cluster_name"),
            lat: number_field(value, "lat"),
            lng: number_field(value, "lng"),
        }
    }
}

/// The narrative report attached to a simulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Report {
    /// No report, or a falsy value (`null`, `""`, `0`, `false`).
    #[default]
    Absent,
    /// Free text; paragraphs are separated by newlines.
    Narrative(String),
    /// Any other value, shown as pretty-printed JSON.
    Structured(Payload),
}

impl Report {
    pub fn from_payload(value: Option<&Payload>) -> Self {
        match value {
            Some(value) if value.is_truthy() => match value {
                Payload::String(text) => Self::Narrative(text.clone()),
                other => Self::Structured(other.clone()),
            },
            _ => Self::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Non-empty paragraphs of a narrative report.
    ///
    /// Lines are split on `\n` (a trailing `\r` is dropped) and empty lines
    /// are skipped. A line holding only `\r` is therefore skipped too, so
    /// CRLF text renders the same as LF text. Structured and absent reports
    /// have no paragraphs.
    pub fn paragraphs(&self) -> Vec<&str> {
        match self {
            Self::Narrative(text) => text
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .filter(|line| !line.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A sanitized simulation response.
///
/// Construction always sanitizes, so no numeric leaf reachable from a
/// `SimulationResult` is `NaN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationResult {
    pub predictions: Vec<PredictionRow>,
    pub anomalies_map: Vec<RiskPoint>,
    pub clusters_map: Vec<ClusterRow>,
    pub report: Report,
    /// Optional `status` marker sent by the service.
    pub status: Option<String>,
    /// Top-level keys present in the response, in order.
    pub received_keys: Vec<String>,
    payload: Payload,
}

impl SimulationResult {
    /// Sanitizes `payload` and decodes every slice.
    ///
    /// Missing or malformed slices decode as empty.
    pub fn from_payload(mut payload: Payload) -> Self {
        sanitize_in_place(&mut payload);
        Self {
            predictions: decode_list(payload.get("predictions")),
            anomalies_map: decode_list(payload.get("anomalies_map")),
            clusters_map: decode_list(payload.get("clusters_map")),
            report: Report::from_payload(payload.get("report")),
            status: optional_text(&payload, "status"),
            received_keys: payload.keys().into_iter().map(str::to_string).collect(),
            payload,
        }
    }

    /// The sanitized response tree.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_row_from_backend_shape() {
        let value = Payload::parse(
            r#"{"district": "Pune", "state": "MH", "success_probability": 72.4,
                "performance_label": "High Performer", "anomaly_status": "Normal",
                "forecasted_footfall": 1520.5, "risk_score": 12.0}"#,
        )
        .unwrap();
        let row = PredictionRow::from_payload(&value);
        assert_eq!(row.district, "Pune");
        assert_eq!(row.success_probability, Some(72.4));
        assert!(row.is_high_probability());
        assert_eq!(row.forecasted_footfall, Some(1520.5));
    }

    #[test]
    fn test_null_probability_is_none() {
        let value = Payload::parse(r#"{"district": "Pune", "success_probability": null}"#).unwrap();
        let row = PredictionRow::from_payload(&value);
        assert_eq!(row.success_probability, None);
        assert!(!row.is_high_probability());
        assert_eq!(row.state, "");
    }

    #[test]
    fn test_risk_point_accepts_risk_score_key() {
        let value =
            Payload::parse(r#"{"district": "Agra", "lat": 27.1, "lng": 78.0, "risk_score": 88.5}"#)
                .unwrap();
        let point = RiskPoint::from_payload(&value);
        assert_eq!(point.score, 88.5);
        assert_eq!(point.state, None);
    }

    #[test]
    fn test_report_variants() {
        assert_eq!(Report::from_payload(None), Report::Absent);
        assert_eq!(Report::from_payload(Some(&Payload::Null)), Report::Absent);
        assert_eq!(Report::from_payload(Some(&Payload::from(""))), Report::Absent);
        let narrative = Report::from_payload(Some(&Payload::from("A.\r\n\nB.\n")));
        assert_eq!(narrative.paragraphs(), vec!["A.", "B."]);
        let structured = Report::from_payload(Some(&Payload::parse(r#"{"k": 1}"#).unwrap()));
        assert!(matches!(structured, Report::Structured(_)));
        assert!(structured.paragraphs().is_empty());
    }

    #[test]
    fn test_crlf_blank_lines_are_skipped() {
        let crlf = Report::Narrative("Summary.\r\n\r\nDetail.\r\n".to_string());
        let lf = Report::Narrative("Summary.\n\nDetail.\n".to_string());
        assert_eq!(crlf.paragraphs(), vec!["Summary.", "Detail."]);
        assert_eq!(crlf.paragraphs(), lf.paragraphs());
    }

    #[test]
    fn test_numeric_text_never_decodes_to_nan() {
        let payload = Payload::parse(
            r#"{"predictions": [{"district": "Pune", "success_probability": "NaN"}],
                "anomalies_map": [{"district": "Agra", "risk_score": "inf"}],
                "clusters_map": [{"district": "Pune", "labor_intensity": "nan"}]}"#,
        )
        .unwrap();
        let result = SimulationResult::from_payload(payload);

        assert_eq!(result.predictions[0].success_probability, None);
        assert_eq!(result.anomalies_map[0].score, 0.0);
        assert_eq!(result.clusters_map[0].labor_intensity, 0.0);
        // Quoted values are text, not numbers, and stay untouched.
        let rows = result.payload().get("predictions").and_then(Payload::as_array).unwrap();
        assert_eq!(
            rows[0].get("success_probability").and_then(Payload::as_str),
            Some("NaN")
        );
    }

    #[test]
    fn test_missing_slices_are_empty() {
        let payload = Payload::parse(r#"{"predictions": 5}"#).unwrap();
        let result = SimulationResult::from_payload(payload);
        assert!(result.predictions.is_empty());
        assert!(result.anomalies_map.is_empty());
        assert!(result.clusters_map.is_empty());
        assert!(result.report.is_absent());
        assert_eq!(result.received_keys, vec!["predictions"]);
    }

    #[test]
    fn test_non_object_payload() {
        let result = SimulationResult::from_payload(Payload::parse("[1, 2]").unwrap());
        assert!(result.predictions.is_empty());
        assert!(result.received_keys.is_empty());
    }
}
