//! Mapping configuration - the editable column mapping text.
//!
//! The mapping is kept as raw text. It is never parsed before submission;
//! the prediction service is the only authority on whether it is valid.

use crate::payload::Payload;

/// Canonical analysis fields, in display order.
pub const CANONICAL_FIELDS: [&str; 4] = ["labor", "mobility", "infiltration", "weekend"];

/// Default field-to-column assignments shown to a new user.
pub const DEFAULT_MAPPING: [(&str, &str); 4] = [
    ("labor", "labor_score"),
    ("mobility", "mobility_val"),
    ("infiltration", "inf_index"),
    ("weekend", "record_date"),
];

/// Editable mapping text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    text: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_MAPPING)
    }
}

impl MappingConfig {
    /// Wraps user-provided text verbatim.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Renders field/column pairs as a pretty-printed JSON object.
    ///
    /// Pairs keep their given order and use a two-space indent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let lines: Vec<String> = pairs
            .into_iter()
            .map(|(field, column)| {
                format!(
                    "  {}: {}",
                    quote_json(field.as_ref()),
                    quote_json(column.as_ref())
                )
            })
            .collect();
        if lines.is_empty() {
            return Self::from_text("{}");
        }
        Self {
            text: format!("{{\n{}\n}}", lines.join(",\n")),
        }
    }

    /// The text exactly as it will be submitted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the buffer contents.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Consumes the config, returning the text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns true if the buffer still holds the default mapping.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Best-effort read of `field -> column` string entries.
    ///
    /// Returns `None` when the text is not a strict JSON object. Entries whose
    /// value is not a string are skipped. This is advisory only and never gates a
    /// submission.
    pub fn try_entries(&self) -> Option<Vec<(String, String)>> {
        let payload: Payload = serde_json::from_str(&self.text).ok()?;
        let entries = payload.as_object()?;
        Some(
            entries
                .iter()
                .filter_map(|(field, value)| {
                    value
                        .as_str()
                        .map(|column| (field.clone(), column.to_string()))
                })
                .collect(),
        )
    }
}

fn quote_json(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
