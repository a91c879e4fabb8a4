//! View state - which part of a simulation result is shown.
//!
//! Five views share one result. Switching views only changes the selection;
//! it never fetches or recomputes anything. A successful submission always
//! lands on [`ActiveView::Table`].

use std::fmt;
use std::str::FromStr;

use dsim_model::{ClusterRow, PredictionRow, Report, RiskPoint, SimulationResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of clusters shown in the importance view.
pub const IMPORTANCE_LIMIT: usize = 15;

/// Selected result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    /// Searchable predictions table.
    #[default]
    Table,
    /// Risk map points.
    Anomaly,
    /// Forecasted footfall per district.
    Forecast,
    /// Labor intensity by cluster.
    Importance,
    /// Narrative report.
    Report,
}

impl ActiveView {
    /// All views in tab order.
    pub const ALL: [Self; 5] = [
        Self::Table,
        Self::Anomaly,
        Self::Forecast,
        Self::Importance,
        Self::Report,
    ];

    /// Short identifier, as typed in commands.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Anomaly => "anomaly",
            Self::Forecast => "forecast",
            Self::Importance => "importance",
            Self::Report => "report",
        }
    }

    /// Tab title.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Table => "Predictions",
            Self::Anomaly => "Risk Map",
            Self::Forecast => "Demand Forecast",
            Self::Importance => "Feature Insights",
            Self::Report => "AI Report",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown view name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view '{0}' (expected one of: table, anomaly, forecast, importance, report)")]
pub struct ParseViewError(pub String);

impl FromStr for ActiveView {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|view| view.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseViewError(s.to_string()))
    }
}

static ABSENT_REPORT: Report = Report::Absent;

/// The slice of a result a view reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewData<'a> {
    /// `table` and `forecast` read `predictions`.
    Predictions(&'a [PredictionRow]),
    /// `anomaly` reads `anomalies_map`.
    RiskPoints(&'a [RiskPoint]),
    /// `importance` reads `clusters_map`.
    Clusters(&'a [ClusterRow]),
    /// `report` reads `report`, plus the keys that did arrive.
    Report {
        report: &'a Report,
        received_keys: &'a [String],
    },
}

impl<'a> ViewData<'a> {
    /// Selects the slice for `view`. A missing result reads as empty.
    pub fn select(view: ActiveView, result: Option<&'a SimulationResult>) -> Self {
        match view {
            ActiveView::Table | ActiveView::Forecast => {
                Self::Predictions(result.map(|r| r.predictions.as_slice()).unwrap_or_default())
            }
            ActiveView::Anomaly => {
                Self::RiskPoints(result.map(|r| r.anomalies_map.as_slice()).unwrap_or_default())
            }
            ActiveView::Importance => {
                Self::Clusters(result.map(|r| r.clusters_map.as_slice()).unwrap_or_default())
            }
            ActiveView::Report => Self::Report {
                report: result.map_or(&ABSENT_REPORT, |r| &r.report),
                received_keys: result.map(|r| r.received_keys.as_slice()).unwrap_or_default(),
            },
        }
    }

    /// Returns true when the slice has nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Predictions(rows) => rows.is_empty(),
            Self::RiskPoints(points) => points.is_empty(),
            Self::Clusters(rows) => rows.is_empty(),
            Self::Report { report, .. } => report.is_absent(),
        }
    }
}

/// The clusters shown in the importance view.
///
/// Takes the first [`IMPORTANCE_LIMIT`] rows as sent, then orders them by
/// labor intensity, highest first. Ties keep their original order.
pub fn ranked_clusters(rows: &[ClusterRow]) -> Vec<&ClusterRow> {
    let mut ranked: Vec<&ClusterRow> = rows.iter().take(IMPORTANCE_LIMIT).collect();
    ranked.sort_by(|a, b| b.labor_intensity.total_cmp(&a.labor_intensity));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsim_model::Payload;

    #[test]
    fn test_parse_view() {
        assert_eq!("table".parse::<ActiveView>(), Ok(ActiveView::Table));
        assert_eq!(" Report ".parse::<ActiveView>(), Ok(ActiveView::Report));
        assert!("chart".parse::<ActiveView>().is_err());
        for view in ActiveView::ALL {
            assert_eq!(view.to_string().parse::<ActiveView>(), Ok(view));
        }
    }

    #[test]
    fn test_select_without_result() {
        for view in ActiveView::ALL {
            assert!(ViewData::select(view, None).is_empty(), "{view}");
        }
    }

    #[test]
    fn test_slice_mapping() {
        let result = SimulationResult::from_payload(
            Payload::parse(
                r#"{"predictions": [{"district": "Pune"}],
                    "anomalies_map": [{"district": "Agra", "score": 3}],
                    "clusters_map": [],
                    "report": "Line"}"#,
            )
            .unwrap(),
        );

        assert!(matches!(
            ViewData::select(ActiveView::Table, Some(&result)),
            ViewData::Predictions(rows) if rows.len() == 1
        ));
        assert!(matches!(
            ViewData::select(ActiveView::Forecast, Some(&result)),
            ViewData::Predictions(rows) if rows.len() == 1
        ));
        assert!(matches!(
            ViewData::select(ActiveView::Anomaly, Some(&result)),
            ViewData::RiskPoints(points) if points[0].district == "Agra"
        ));
        assert!(ViewData::select(ActiveView::Importance, Some(&result)).is_empty());
        assert!(matches!(
            ViewData::select(ActiveView::Report, Some(&result)),
            ViewData::Report { report: Report::Narrative(_), .. }
        ));
    }

    #[test]
    fn test_ranked_clusters() {
        let rows: Vec<ClusterRow> = (0..20)
            .map(|i| ClusterRow {
                district: format!("D{i}"),
                labor_intensity: f64::from(i) / 20.0,
                ..ClusterRow::default()
            })
            .collect();
        let ranked = ranked_clusters(&rows);
        assert_eq!(ranked.len(), IMPORTANCE_LIMIT);
        assert_eq!(ranked[0].district, "D14");
        assert_eq!(ranked[14].district, "D0");
        assert!(ranked.iter().all(|row| row.district != "D19"));
    }
}
