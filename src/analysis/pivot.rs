use std::collections::{BTreeMap, BTreeSet};

use crate::data::model::{AromaDataset, Record};

// ---------------------------------------------------------------------------
// Row dimension
// ---------------------------------------------------------------------------

/// Which record field becomes the pivot's row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowField {
    /// Flavor, suffixed with `" (formula)"` when the record carries one.
    CompositeFlavor,
    Food,
}

impl RowField {
    /// Row key for `record`.
    pub fn key(self, record: &Record) -> String {
        match self {
            RowField::CompositeFlavor => record.composite_flavor(),
            RowField::Food => record.food.clone(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RowField::CompositeFlavor => "Flavour of Aroma",
            RowField::Food => "Food",
        }
    }
}

// ---------------------------------------------------------------------------
// PivotTable
// ---------------------------------------------------------------------------

/// Dense (row × canonical effect) count matrix; unobserved cells are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_field: RowField,
    /// Sorted distinct row keys.
    pub rows: Vec<String>,
    /// Sorted distinct canonical effects.
    pub columns: Vec<String>,
    /// `counts[row][col]`.
    pub counts: Vec<Vec<u64>>,
}

impl PivotTable {
    /// Sum over all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Column `j` as floats, one entry per row.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.counts.iter().map(|row| row[j] as f64).collect()
    }

    /// Largest cell, used to scale heat maps.
    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Group `dataset` by (`row_field`, canonical effect) and count.
///
/// Row keys are built per record before grouping, so the same flavor with two
/// different formulas yields two rows.
pub fn build_pivot(dataset: &AromaDataset, row_field: RowField) -> PivotTable {
    let mut grouped: BTreeMap<(String, &str), u64> = BTreeMap::new();
    let mut columns: BTreeSet<&str> = BTreeSet::new();

    for record in dataset.records() {
        let effect = record.canonical_effect.as_str();
        columns.insert(effect);
        *grouped.entry((row_field.key(record), effect)).or_default() += 1;
    }

    let rows: Vec<String> = grouped
        .keys()
        .map(|(row, _)| row.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: Vec<String> = columns.into_iter().map(str::to_string).collect();

    let mut counts = vec![vec![0u64; columns.len()]; rows.len()];
    for ((row, effect), n) in &grouped {
        // Both keys come from the sets just built.
        let r = rows.binary_search(row).unwrap_or_default();
        let c = columns
            .binary_search_by(|probe| probe.as_str().cmp(*effect))
            .unwrap_or_default();
        counts[r][c] = *n;
    }

    PivotTable {
        row_field,
        rows,
        columns,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{catalogue, cyclic, dataset, raw};

    fn cell(pivot: &PivotTable, row: &str, column: &str) -> u64 {
        let r = pivot.rows.iter().position(|x| x == row);
        let c = pivot.columns.iter().position(|x| x == column);
        match (r, c) {
            (Some(r), Some(c)) => pivot.counts[r][c],
            _ => 0,
        }
    }

    #[test]
    fn pivot_conserves_mass() {
        let ds = catalogue();
        for field in [RowField::CompositeFlavor, RowField::Food] {
            assert_eq!(build_pivot(&ds, field).total(), ds.len() as u64, "{field:?}");
        }
    }

    #[test]
    fn hundred_records_by_food_sum_to_hundred() {
        let ds = cyclic(100);
        assert_eq!(ds.effects().len(), 6);
        let pivot = build_pivot(&ds, RowField::Food);
        assert_eq!(pivot.columns.len(), 6);
        assert_eq!(pivot.total(), 100);
    }

    #[test]
    fn pivot_is_dense_and_zero_filled() {
        let ds = catalogue();
        let pivot = build_pivot(&ds, RowField::Food);
        assert_eq!(pivot.counts.len(), pivot.rows.len());
        assert!(pivot.counts.iter().all(|r| r.len() == pivot.columns.len()));
        assert_eq!(cell(&pivot, "Perfume", "Systemic Toxicity"), 1);
        assert_eq!(cell(&pivot, "Perfume", "Allergic Reaction"), 0);
        assert_eq!(cell(&pivot, "Candy", "Irritation Effects"), 1);
        assert_eq!(cell(&pivot, "Candy", "Allergic Reaction"), 1);
    }

    #[test]
    fn rows_and_columns_are_sorted() {
        let pivot = build_pivot(&catalogue(), RowField::Food);
        let mut rows = pivot.rows.clone();
        rows.sort();
        assert_eq!(rows, pivot.rows);
        let mut cols = pivot.columns.clone();
        cols.sort();
        assert_eq!(cols, pivot.columns);
    }

    #[test]
    fn composite_keys_split_same_flavor() {
        let ds = dataset(vec![
            raw("Allergic Reaction", "Vanillin", Some("C8H8O3"), "Candy"),
            raw("Allergic Reaction", "Vanillin", Some("C9H10O3"), "Candy"),
            raw("Allergic Reaction", "Vanillin", None, "Candy"),
        ]);
        let pivot = build_pivot(&ds, RowField::CompositeFlavor);
        assert_eq!(
            pivot.rows,
            ["Vanillin", "Vanillin (C8H8O3)", "Vanillin (C9H10O3)"]
        );
        assert_eq!(pivot.counts, vec![vec![1], vec![1], vec![1]]);
    }

    #[test]
    fn empty_dataset_gives_empty_pivot() {
        let pivot = build_pivot(&dataset(Vec::new()), RowField::Food);
        assert!(pivot.is_empty());
        assert_eq!(pivot.total(), 0);
        assert_eq!(pivot.max_count(), 0);
    }
}
