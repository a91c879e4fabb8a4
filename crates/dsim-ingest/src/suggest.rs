//! Mapping suggestions from CSV headers.
//!
//! Each canonical field is matched against the column names the prediction
//! service itself recognizes. When none is present the closest column by
//! Jaro-Winkler similarity is proposed, provided it clears
//! [`MIN_CONFIDENCE`]. Suggestions are advisory only.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use dsim_model::{CANONICAL_FIELDS, DEFAULT_MAPPING, MappingConfig};
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::csv::CsvHeaders;

/// Minimum similarity for a fuzzy suggestion.
pub const MIN_CONFIDENCE: f64 = 0.8;

/// Column names recognized per canonical field, most specific first.
pub const FIELD_ALIASES: [(&str, &[&str]); 4] = [
    ("labor", &["labor_intensity_score", "labor", "labor_score"]),
    ("mobility", &["mobility_index", "mobility", "mobility_val"]),
    ("infiltration", &["infiltration_index", "infiltration", "inf_index"]),
    ("weekend", &["is_weekend", "weekend", "record_date"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Column name is a known alias.
    Alias,
    /// Column name is similar to an alias.
    Fuzzy,
}

/// A proposed column for one canonical field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSuggestion {
    pub field: &'static str,
    pub column: String,
    /// Similarity in `[0, 1]`; alias matches score 1.
    pub score: f64,
    pub kind: MatchKind,
}

/// Suggested columns for the canonical fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MappingSuggestion {
    /// Matched fields, in canonical order.
    pub fields: Vec<FieldSuggestion>,
    /// Fields with no acceptable column.
    pub unmatched: Vec<&'static str>,
}

impl MappingSuggestion {
    pub fn get(&self, field: &str) -> Option<&FieldSuggestion> {
        self.fields.iter().find(|s| s.field == field)
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Renders the suggestion as mapping text.
    ///
    /// Unmatched fields keep their default column so every canonical field
    /// is present.
    pub fn to_mapping(&self) -> MappingConfig {
        let pairs = DEFAULT_MAPPING.iter().map(|&(field, default_column)| {
            let column = self
                .get(field)
                .map_or(default_column, |suggestion| suggestion.column.as_str());
            (field, column)
        });
        MappingConfig::from_pairs(pairs)
    }
}

/// Suggests a one-to-one assignment of CSV columns to canonical fields.
pub fn suggest_mapping(headers: &CsvHeaders) -> MappingSuggestion {
    let mut candidates: Vec<(usize, &str, f64, MatchKind)> = Vec::new();

    for (field_index, (_, aliases)) in FIELD_ALIASES.iter().enumerate() {
        for column in &headers.columns {
            if column.is_empty() {
                continue;
            }
            if let Some((score, kind)) = score_column(column, aliases) {
                candidates.push((field_index, column.as_str(), score, kind));
            }
        }
    }

    // Highest score first; alias beats fuzzy on ties; then canonical order.
    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| alias_rank(a.3).cmp(&alias_rank(b.3)))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut assigned_fields: BTreeSet<usize> = BTreeSet::new();
    let mut assigned_columns: BTreeSet<&str> = BTreeSet::new();
    let mut matched: Vec<(usize, FieldSuggestion)> = Vec::new();

    for (field_index, column, score, kind) in candidates {
        if assigned_fields.contains(&field_index) || assigned_columns.contains(column) {
            continue;
        }
        assigned_fields.insert(field_index);
        assigned_columns.insert(column);
        matched.push((
            field_index,
            FieldSuggestion {
                field: CANONICAL_FIELDS[field_index],
                column: column.to_string(),
                score,
                kind,
            },
        ));
    }
    matched.sort_by_key(|(field_index, _)| *field_index);

    let unmatched = (0..CANONICAL_FIELDS.len())
        .filter(|index| !assigned_fields.contains(index))
        .map(|index| CANONICAL_FIELDS[index])
        .collect();

    tracing::debug!(
        matched = matched.len(),
        columns = headers.len(),
        "Suggested mapping"
    );

    MappingSuggestion {
        fields: matched.into_iter().map(|(_, suggestion)| suggestion).collect(),
        unmatched,
    }
}

fn score_column(column: &str, aliases: &[&str]) -> Option<(f64, MatchKind)> {
    let normalized = normalize(column);
    if aliases.iter().any(|alias| normalize(alias) == normalized) {
        return Some((1.0, MatchKind::Alias));
    }

    let best = aliases
        .iter()
        .map(|alias| jaro_winkler::similarity(normalized.chars(), normalize(alias).chars()))
        .fold(0.0_f64, f64::max);
    (best >= MIN_CONFIDENCE).then_some((best, MatchKind::Fuzzy))
}

fn alias_rank(kind: MatchKind) -> u8 {
    match kind {
        MatchKind::Alias => 0,
        MatchKind::Fuzzy => 1,
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['_', '-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
