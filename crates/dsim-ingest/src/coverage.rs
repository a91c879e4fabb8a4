//! Advisory check of a mapping against the columns of a CSV file.
//!
//! The service substitutes `0` for any mapped column it cannot find, so a
//! typo in the mapping silently zeroes a feature. This check surfaces that
//! before submission, but never blocks it.

use dsim_model::{CANONICAL_FIELDS, MappingConfig};

use crate::csv::CsvHeaders;

/// Outcome of [`mapping_coverage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingCoverage {
    /// The mapping text is not a JSON object, so nothing could be checked.
    NotChecked,
    Checked {
        /// `(field, column)` entries whose column is absent from the CSV.
        missing_columns: Vec<(String, String)>,
        /// Canonical fields the mapping does not mention.
        unmapped_fields: Vec<&'static str>,
        /// Mapped fields that are not canonical.
        unknown_fields: Vec<String>,
    },
}

impl MappingCoverage {
    /// Returns true when every canonical field maps to a present column.
    pub fn is_clean(&self) -> bool {
        match self {
            Self::NotChecked => false,
            Self::Checked {
                missing_columns,
                unmapped_fields,
                unknown_fields,
            } => {
                missing_columns.is_empty()
                    && unmapped_fields.is_empty()
                    && unknown_fields.is_empty()
            }
        }
    }

    /// Human-readable warnings, one per problem.
    pub fn warnings(&self) -> Vec<String> {
        match self {
            Self::NotChecked => {
                vec!["mapping is not a JSON object; columns not checked".to_string()]
            }
            Self::Checked {
                missing_columns,
                unmapped_fields,
                unknown_fields,
            } => {
                let mut warnings = Vec::new();
                for (field, column) in missing_columns {
                    warnings.push(format!(
                        "'{field}' maps to column '{column}', which is not in the file"
                    ));
                }
                for field in unmapped_fields {
                    warnings.push(format!("'{field}' is not mapped and will be treated as 0"));
                }
                for field in unknown_fields {
                    warnings.push(format!(
                        "'{field}' is not an analysis field and will be ignored"
                    ));
                }
                warnings
            }
        }
    }
}

/// Compares mapping entries with the CSV header row.
pub fn mapping_coverage(mapping: &MappingConfig, headers: &CsvHeaders) -> MappingCoverage {
    let Some(entries) = mapping.try_entries() else {
        return MappingCoverage::NotChecked;
    };

    let missing_columns = entries
        .iter()
        .filter(|(field, column)| {
            CANONICAL_FIELDS.contains(&field.as_str()) && !headers.contains(column)
        })
        .cloned()
        .collect();
    let unmapped_fields = CANONICAL_FIELDS
        .iter()
        .copied()
        .filter(|field| !entries.iter().any(|(mapped, _)| mapped == field))
        .collect();
    let unknown_fields = entries
        .iter()
        .filter(|(field, _)| !CANONICAL_FIELDS.contains(&field.as_str()))
        .map(|(field, _)| field.clone())
        .collect();

    MappingCoverage::Checked {
        missing_columns,
        unmapped_fields,
        unknown_fields,
    }
}
