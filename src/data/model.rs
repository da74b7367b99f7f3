use std::collections::BTreeSet;

use super::normalize::{self, UnmappedPolicy};
use super::loader::LoadError;

// ---------------------------------------------------------------------------
// Column names of the source catalogue
// ---------------------------------------------------------------------------

pub const EFFECT_COLUMN: &str = "Causes/Effects";
pub const FLAVOR_COLUMN: &str = "Flavour of Aroma";
pub const FOOD_COLUMN: &str = "Food";
pub const SYNTHETIC_COLUMN: &str = "Synthetic Aroma Agent Name";
pub const NATURAL_COLUMN: &str = "Natural Agents";
pub const FORMULA_COLUMN: &str = "Chemical Formula";

/// Fields that must be present (and non-empty in every row) for a load to succeed.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    EFFECT_COLUMN,
    FLAVOR_COLUMN,
    FOOD_COLUMN,
    SYNTHETIC_COLUMN,
    NATURAL_COLUMN,
];

// ---------------------------------------------------------------------------
// RawRecord – one row as it came out of the source
// ---------------------------------------------------------------------------

/// A catalogue row before effect normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub effect: String,
    pub flavor: String,
    pub chemical_formula: Option<String>,
    pub food: String,
    pub synthetic_agent: String,
    pub natural_agent: String,
}

// ---------------------------------------------------------------------------
// Record – one normalized catalogue row
// ---------------------------------------------------------------------------

/// A single aroma agent entry with its canonical effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub effect_raw: String,
    pub canonical_effect: String,
    pub flavor: String,
    pub chemical_formula: Option<String>,
    pub food: String,
    pub synthetic_agent: String,
    pub natural_agent: String,
}

impl Record {
    /// Flavor label used for grouping and display: `"Limonene (C10H16)"` when a
    /// formula is known, the bare flavor otherwise.
    pub fn composite_flavor(&self) -> String {
        match self.chemical_formula.as_deref() {
            Some(formula) if !formula.trim().is_empty() => {
                format!("{} ({})", self.flavor, formula.trim())
            }
            _ => self.flavor.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// AromaDataset – the complete normalized catalogue
// ---------------------------------------------------------------------------

/// The loaded, normalized catalogue. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct AromaDataset {
    records: Vec<Record>,
    /// Distinct canonical effects in order of first appearance.
    effects: Vec<String>,
    /// Raw labels (trimmed, lower-cased) that missed the synonym table.
    unmapped_labels: BTreeSet<String>,
    has_formula_column: bool,
}

impl AromaDataset {
    /// Normalize raw rows into a dataset.
    ///
    /// Every distinct unmapped label is reported once at `warn` level; under
    /// [`UnmappedPolicy::Reject`] the first one aborts the build instead.
    pub fn from_raw(
        raw: Vec<RawRecord>,
        has_formula_column: bool,
        policy: UnmappedPolicy,
    ) -> Result<Self, LoadError> {
        let mut records = Vec::with_capacity(raw.len());
        let mut effects: Vec<String> = Vec::new();
        let mut unmapped_labels = BTreeSet::new();

        for row in raw {
            let canonical = match normalize::canonicalize(&row.effect, policy) {
                Ok(label) => label,
                Err(label) => return Err(LoadError::UnmappedLabel(label)),
            };
            if !canonical.mapped {
                let folded = normalize::fold(&row.effect);
                if unmapped_labels.insert(folded.clone()) {
                    log::warn!(
                        "Effect label {:?} is not in the synonym table; using {:?}",
                        folded,
                        canonical.value
                    );
                }
            }
            if !effects.contains(&canonical.value) {
                effects.push(canonical.value.clone());
            }
            records.push(Record {
                effect_raw: row.effect,
                canonical_effect: canonical.value,
                flavor: row.flavor,
                chemical_formula: row.chemical_formula,
                food: row.food,
                synthetic_agent: row.synthetic_agent,
                natural_agent: row.natural_agent,
            });
        }

        Ok(AromaDataset {
            records,
            effects,
            unmapped_labels,
            has_formula_column,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct canonical effects, first-appearance order.
    pub fn effects(&self) -> &[String] {
        &self.effects
    }

    pub fn unmapped_labels(&self) -> &BTreeSet<String> {
        &self.unmapped_labels
    }

    /// Whether the source carried a `Chemical Formula` column at all.
    pub fn has_formula_column(&self) -> bool {
        self.has_formula_column
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::raw;

    #[test]
    fn composite_flavor_appends_formula() {
        let ds = AromaDataset::from_raw(
            vec![raw("Allergic Reaction", "Limonene", Some("C10H16"), "Candy")],
            true,
            UnmappedPolicy::PassThrough,
        )
        .unwrap();
        assert_eq!(ds.records()[0].composite_flavor(), "Limonene (C10H16)");
    }

    #[test]
    fn composite_flavor_without_formula_is_bare_flavor() {
        let ds = AromaDataset::from_raw(
            vec![
                raw("Allergic Reaction", "Vanilla", None, "Cake"),
                raw("Allergic Reaction", "Vanilla", Some("  "), "Cake"),
            ],
            true,
            UnmappedPolicy::PassThrough,
        )
        .unwrap();
        for rec in ds.records() {
            assert_eq!(rec.composite_flavor(), "Vanilla");
        }
    }

    #[test]
    fn effects_follow_first_appearance() {
        let ds = AromaDataset::from_raw(
            vec![
                raw("systemic toxicity", "A", None, "x"),
                raw("SAFETY APPROVALS", "B", None, "y"),
                raw("Systemic Toxicity", "C", None, "z"),
            ],
            false,
            UnmappedPolicy::PassThrough,
        )
        .unwrap();
        assert_eq!(ds.effects(), ["Systemic Toxicity", "Safety Approvals"]);
        assert_eq!(ds.records()[1].effect_raw, "SAFETY APPROVALS");
    }

    #[test]
    fn unmapped_labels_pass_through_and_are_tracked() {
        let ds = AromaDataset::from_raw(
            vec![
                raw("Skin Sensitization", "A", None, "x"),
                raw("skin sensitization ", "B", None, "y"),
            ],
            false,
            UnmappedPolicy::PassThrough,
        )
        .unwrap();
        assert_eq!(ds.effects(), ["skin sensitization"]);
        assert_eq!(ds.unmapped_labels().len(), 1);
    }

    #[test]
    fn reject_policy_fails_on_unmapped_label() {
        let err = AromaDataset::from_raw(
            vec![raw("Mystery", "A", None, "x")],
            false,
            UnmappedPolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::UnmappedLabel(ref l) if l == "mystery"));
    }
}
