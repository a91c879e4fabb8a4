//! Prediction search.

use dsim_model::PredictionRow;

/// Rows whose district or state contains `term`, ignoring case.
///
/// An empty term keeps every row. Order is preserved.
pub fn filter_predictions<'a>(rows: &'a [PredictionRow], term: &str) -> Vec<&'a PredictionRow> {
    let needle = term.to_lowercase();
    rows.iter().filter(|row| row.matches_lowercase(&needle)).collect()
}

/// Search term plus a memo of the rows it last selected.
///
/// The memo is keyed on the result generation and the term, so it is
/// recomputed only after a new result arrives or the term changes.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    term: String,
    memo: Option<Memo>,
    recomputations: usize,
}

#[derive(Debug, Clone)]
struct Memo {
    generation: u64,
    term: String,
    indices: Vec<usize>,
}

impl SearchFilter {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    /// How many times the selection has been computed.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Matching rows of the result with the given generation.
    pub fn apply<'a>(
        &mut self,
        generation: u64,
        rows: &'a [PredictionRow],
    ) -> Vec<&'a PredictionRow> {
        let fresh = self
            .memo
            .as_ref()
            .is_some_and(|memo| memo.generation == generation && memo.term == self.term);

        if !fresh {
            let needle = self.term.to_lowercase();
            let indices = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row.matches_lowercase(&needle))
                .map(|(index, _)| index)
                .collect();
            self.memo = Some(Memo {
                generation,
                term: self.term.clone(),
                indices,
            });
            self.recomputations += 1;
        }

        self.memo
            .as_ref()
            .map(|memo| memo.indices.iter().filter_map(|&index| rows.get(index)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(district: &str, state: &str) -> PredictionRow {
        PredictionRow {
            district: district.to_string(),
            state: state.to_string(),
            ..PredictionRow::default()
        }
    }

    fn districts<'a>(rows: &[&'a PredictionRow]) -> Vec<&'a str> {
        rows.iter().map(|row| row.district.as_str()).collect()
    }

    #[test]
    fn test_filter_matches_district_or_state() {
        let rows = vec![
            row("Pune", "Maharashtra"),
            row("Agra", "Uttar Pradesh"),
            row("Nagpur", "Maharashtra"),
        ];
        assert_eq!(districts(&filter_predictions(&rows, "pu")), vec!["Pune", "Nagpur"]);
        assert_eq!(districts(&filter_predictions(&rows, "UTTAR")), vec!["Agra"]);
        assert_eq!(districts(&filter_predictions(&rows, "")), vec!["Pune", "Agra", "Nagpur"]);
        assert!(filter_predictions(&rows, "xyz").is_empty());
    }

    #[test]
    fn test_term_pu_keeps_only_pune() {
        let rows = vec![row("Pune", "MH"), row("Delhi", "DL")];
        let filtered = filter_predictions(&rows, "pu");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0], &rows[0]);
    }

    #[test]
    fn test_memo_reuse_and_invalidation() {
        let rows = vec![row("Pune", "MH"), row("Agra", "UP")];
        let mut filter = SearchFilter::new("pu");

        assert_eq!(districts(&filter.apply(1, &rows)), vec!["Pune"]);
        assert_eq!(districts(&filter.apply(1, &rows)), vec!["Pune"]);
        assert_eq!(filter.recomputations(), 1);

        filter.set_term("ag");
        assert_eq!(districts(&filter.apply(1, &rows)), vec!["Agra"]);
        assert_eq!(filter.recomputations(), 2);

        let replaced = vec![row("Agartala", "TR")];
        assert_eq!(districts(&filter.apply(2, &replaced)), vec!["Agartala"]);
        assert_eq!(filter.recomputations(), 3);
    }
}
