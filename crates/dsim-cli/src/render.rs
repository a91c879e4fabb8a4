//! Terminal rendering of simulation views, previews and dashboard data.
//!
//! Every function returns a `String` so output can be printed, written to
//! the shell, or compared in tests.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dsim_core::{ActiveView, Session, ViewData, ranked_clusters};
use dsim_ingest::{CsvPreview, MappingCoverage, MappingSuggestion, MatchKind};
use dsim_model::{
    AiReport, AnomalyAlert, ClusterPoint, ClusterRow, DEFAULT_MAPPING, FeatureImportance,
    ForecastPoint, HealthStatus, PredictionRow, Report, RiskPoint,
};

pub const NO_THREAT_DATA: &str = "No threat data available";
pub const NO_FORECAST_DATA: &str = "No forecast data...";
pub const NO_CLUSTER_DATA: &str = "Waiting for cluster analysis data...";
pub const NO_REPORT: &str = "No report found in simulation results.";

const BAR_WIDTH: usize = 24;

/// Renders with or without ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// No ANSI escapes, regardless of terminal.
    pub fn plain() -> Self {
        Self::new(false)
    }

    // === Workspace ===

    /// Tab strip with the active view in brackets.
    pub fn tabs(&self, active: ActiveView) -> String {
        ActiveView::ALL
            .iter()
            .map(|view| {
                if *view == active {
                    format!("[{}]", view.label())
                } else {
                    view.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// The active view of `session`, preceded by the tab strip.
    pub fn workspace(&self, session: &mut Session) -> String {
        format!("{}\n\n{}", self.tabs(session.view()), self.active_view(session))
    }

    /// The active view of `session`.
    ///
    /// The table view shows the search-filtered predictions.
    pub fn active_view(&self, session: &mut Session) -> String {
        if session.view() == ActiveView::Table {
            let term = session.search_term().to_string();
            let rows = session.filtered_predictions();
            return self.predictions(&rows, &term);
        }
        match session.view_data() {
            ViewData::Predictions(rows) => self.forecast(rows),
            ViewData::RiskPoints(points) => self.risk_points(points),
            ViewData::Clusters(rows) => self.importance(rows),
            ViewData::Report {
                report,
                received_keys,
            } => self.report(report, received_keys),
        }
    }

    /// One-paragraph summary of the session state.
    pub fn status(&self, session: &Session) -> String {
        let mut lines = Vec::new();
        lines.push(match session.file() {
            Some(file) => format!("File: {} ({} bytes)", file.name(), file.len()),
            None => "File: none selected".to_string(),
        });
        lines.push(if session.mapping().is_default() {
            "Mapping: default".to_string()
        } else {
            "Mapping: custom".to_string()
        });
        lines.push(match session.result() {
            Some(result) => format!(
                "Result: {} predictions, {} risk points, {} clusters",
                result.predictions.len(),
                result.anomalies_map.len(),
                result.clusters_map.len()
            ),
            None => "Result: none".to_string(),
        });
        lines.push(format!("View: {}", session.view().label()));
        if !session.search_term().is_empty() {
            lines.push(format!("Search: {}", session.search_term()));
        }
        if session.is_loading() {
            lines.push("Simulating...".to_string());
        }
        if let Some(error) = session.error() {
            lines.push(self.banner(error));
        }
        lines.join("\n")
    }

    /// Dismissible error banner.
    pub fn banner(&self, message: &str) -> String {
        format!("error: {message} (type 'dismiss' to hide)")
    }

    // === Result Views ===

    /// Predictions table with the "Results: N" count.
    pub fn predictions(&self, rows: &[&PredictionRow], search: &str) -> String {
        let mut table = self.table(&["District", "State", "Success Prob", "Status", "Risk"]);
        align_column(&mut table, 2, CellAlignment::Right);
        for row in rows {
            table.add_row(vec![
                Cell::new(&row.district).add_attribute(Attribute::Bold),
                Cell::new(&row.state),
                probability_cell(row),
                Cell::new(&row.performance_label),
                Cell::new(&row.anomaly_status),
            ]);
        }
        let search_line = if search.is_empty() {
            "Search district...".to_string()
        } else {
            format!("Search: {search}")
        };
        format!("{search_line}\n{table}\nResults: {}", rows.len())
    }

    /// Risk map points with their scores.
    pub fn risk_points(&self, points: &[RiskPoint]) -> String {
        if points.is_empty() {
            return NO_THREAT_DATA.to_string();
        }
        let mut table = self.table(&["District", "State", "Lat", "Lng", "Risk Score"]);
        for column in 2..=4 {
            align_column(&mut table, column, CellAlignment::Right);
        }
        for point in points {
            table.add_row(vec![
                Cell::new(&point.district),
                optional_text_cell(point.state.as_deref()),
                Cell::new(number(point.lat)),
                Cell::new(number(point.lng)),
                Cell::new(number(point.score)).fg(Color::Red),
            ]);
        }
        table.to_string()
    }

    /// Forecasted footfall and success probability per district.
    pub fn forecast(&self, rows: &[PredictionRow]) -> String {
        if rows.is_empty() {
            return NO_FORECAST_DATA.to_string();
        }
        let peak = rows
            .iter()
            .filter_map(|row| row.forecasted_footfall)
            .fold(0.0_f64, f64::max);
        let mut table = self.table(&[
            "District",
            "Forecasted Footfall",
            "Success Prob (%)",
            "",
        ]);
        align_column(&mut table, 1, CellAlignment::Right);
        align_column(&mut table, 2, CellAlignment::Right);
        for row in rows {
            let footfall = row.forecasted_footfall;
            table.add_row(vec![
                Cell::new(&row.district),
                optional_number_cell(footfall),
                optional_number_cell(row.success_probability),
                Cell::new(bar(ratio(footfall.unwrap_or_default(), peak))).fg(Color::Blue),
            ]);
        }
        format!("Simulated Demand Forecast\n{table}")
    }

    /// Labor intensity of the ranked clusters.
    pub fn importance(&self, rows: &[ClusterRow]) -> String {
        if rows.is_empty() {
            return NO_CLUSTER_DATA.to_string();
        }
        let mut table = self.table(&["District", "Cluster", "Intensity", ""]);
        align_column(&mut table, 2, CellAlignment::Right);
        for row in ranked_clusters(rows) {
            let shade = if row.is_high_intensity() {
                Color::DarkBlue
            } else {
                Color::Blue
            };
            let mut label = format!("{:.2}", row.labor_intensity);
            if row.is_high_intensity() {
                label.push_str(" high");
            }
            table.add_row(vec![
                Cell::new(&row.district),
                Cell::new(&row.cluster_name),
                Cell::new(label),
                Cell::new(bar(row.labor_intensity)).fg(shade),
            ]);
        }
        format!("Labor Intensity by District\n{table}")
    }

    /// Narrative paragraphs, structured JSON, or the absent placeholder.
    pub fn report(&self, report: &Report, received_keys: &[String]) -> String {
        match report {
            Report::Narrative(_) => {
                format!("Detailed Analysis\n\n{}", report.paragraphs().join("\n\n"))
            }
            Report::Structured(value) => {
                format!("Detailed Analysis\n\n{}", value.to_pretty_string())
            }
            Report::Absent => format!(
                "{NO_REPORT}\nKeys received: {}",
                received_keys.join(", ")
            ),
        }
    }

    // === Intake ===

    /// Shape and per-column summary of a CSV file.
    pub fn preview(&self, preview: &CsvPreview) -> String {
        let mut table = self.table(&["Column", "Type", "Nulls", "Numeric", "Samples"]);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Center);
        for column in &preview.columns {
            table.add_row(vec![
                Cell::new(&column.name).add_attribute(Attribute::Bold),
                dim_cell(&column.dtype),
                Cell::new(format!("{:.0}%", column.null_ratio * 100.0)),
                Cell::new(if column.is_numeric { "yes" } else { "no" }),
                Cell::new(column.samples.join(", ")),
            ]);
        }
        format!(
            "{} ({} rows, {} columns)\n{table}",
            preview.path.display(),
            preview.rows,
            preview.columns.len()
        )
    }

    /// Suggested column per canonical field.
    pub fn suggestion(&self, suggestion: &MappingSuggestion) -> String {
        let mut table = self.table(&["Field", "Column", "Match"]);
        for (field, default_column) in DEFAULT_MAPPING {
            match suggestion.get(field) {
                Some(found) => {
                    let kind = match found.kind {
                        MatchKind::Alias => "alias".to_string(),
                        MatchKind::Fuzzy => format!("fuzzy {:.2}", found.score),
                    };
                    table.add_row(vec![
                        Cell::new(field),
                        Cell::new(&found.column).fg(Color::Green),
                        Cell::new(kind),
                    ]);
                }
                None => {
                    table.add_row(vec![
                        Cell::new(field),
                        dim_cell(default_column),
                        Cell::new("default").fg(Color::Yellow),
                    ]);
                }
            }
        }
        table.to_string()
    }

    /// One warning line per coverage problem; empty when clean.
    pub fn coverage(&self, coverage: &MappingCoverage) -> String {
        coverage
            .warnings()
            .iter()
            .map(|warning| format!("warning: {warning}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // === Dashboard ===

    pub fn forecast_points(&self, points: &[ForecastPoint]) -> String {
        if points.is_empty() {
            return NO_FORECAST_DATA.to_string();
        }
        let mut table = self.table(&["Date", "Actual", "Predicted"]);
        align_column(&mut table, 1, CellAlignment::Right);
        align_column(&mut table, 2, CellAlignment::Right);
        for point in points {
            table.add_row(vec![
                Cell::new(&point.date),
                optional_number_cell(point.actual),
                optional_number_cell(point.predicted),
            ]);
        }
        table.to_string()
    }

    pub fn cluster_points(&self, points: &[ClusterPoint]) -> String {
        if points.is_empty() {
            return NO_CLUSTER_DATA.to_string();
        }
        let mut table = self.table(&["District", "Cluster", "Intensity", "Lat", "Lng"]);
        for column in 2..=4 {
            align_column(&mut table, column, CellAlignment::Right);
        }
        for point in points {
            table.add_row(vec![
                Cell::new(&point.district),
                Cell::new(&point.cluster_name),
                Cell::new(format!("{:.2}", point.intensity)),
                Cell::new(number(point.lat)),
                Cell::new(number(point.lng)),
            ]);
        }
        table.to_string()
    }

    pub fn anomaly_alerts(&self, alerts: &[AnomalyAlert]) -> String {
        if alerts.is_empty() {
            return NO_THREAT_DATA.to_string();
        }
        let mut table = self.table(&["District", "State", "Risk Score", "Lat", "Lng"]);
        for column in 2..=4 {
            align_column(&mut table, column, CellAlignment::Right);
        }
        for alert in alerts {
            table.add_row(vec![
                Cell::new(&alert.district),
                Cell::new(&alert.state),
                Cell::new(number(alert.score)).fg(Color::Red),
                Cell::new(number(alert.lat)),
                Cell::new(number(alert.lng)),
            ]);
        }
        table.to_string()
    }

    pub fn insights(&self, features: &[FeatureImportance]) -> String {
        if features.is_empty() {
            return "No feature importance data".to_string();
        }
        let peak = features
            .iter()
            .map(|feature| feature.importance)
            .fold(0.0_f64, f64::max);
        let mut table = self.table(&["Feature", "Importance", ""]);
        align_column(&mut table, 1, CellAlignment::Right);
        for feature in features {
            table.add_row(vec![
                Cell::new(&feature.feature),
                Cell::new(format!("{:.3}", feature.importance)),
                Cell::new(bar(ratio(feature.importance, peak))).fg(Color::Blue),
            ]);
        }
        table.to_string()
    }

    pub fn ai_report(&self, report: &AiReport) -> String {
        let mut sections = Vec::new();
        if !report.summary.is_empty() {
            sections.push(report.summary.clone());
        }
        let paragraphs = report.paragraphs();
        if paragraphs.is_empty() {
            sections.push("No report generated.".to_string());
        } else {
            sections.push(paragraphs.join("\n\n"));
        }
        sections.join("\n\n")
    }

    pub fn health(&self, health: &HealthStatus) -> String {
        let models = if health.models_loaded {
            "models loaded"
        } else {
            "models not loaded"
        };
        let status = if health.status.is_empty() {
            "unknown"
        } else {
            health.status.as_str()
        };
        format!("Service: {status} ({models})")
    }

    fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.set_header(headers.iter().map(|label| header_cell(label)));
        apply_table_style(&mut table);
        if self.color {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }
        table
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn probability_cell(row: &PredictionRow) -> Cell {
    match row.success_probability {
        Some(value) if row.is_high_probability() => Cell::new(format!("{}%", number(value)))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(value) => Cell::new(format!("{}%", number(value))),
        None => dim_cell("-"),
    }
}

fn optional_number_cell(value: Option<f64>) -> Cell {
    value.map_or_else(|| dim_cell("-"), |value| Cell::new(number(value)))
}

fn optional_text_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

/// Shortest decimal form: `81`, `72.4`, `-0.5`.
fn number(value: f64) -> String {
    value.to_string()
}

fn ratio(value: f64, peak: f64) -> f64 {
    if peak > 0.0 { value / peak } else { 0.0 }
}

/// Horizontal bar for a fraction in `[0, 1]`.
fn bar(fraction: f64) -> String {
    let clamped = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (clamped * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}
