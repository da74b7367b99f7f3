use crate::data::model::{AromaDataset, Record};

use super::counts::value_counts;

// ---------------------------------------------------------------------------
// EffectSlice – records sharing one canonical effect
// ---------------------------------------------------------------------------

/// The records of one canonical effect plus the distributions drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSlice {
    pub effect: String,
    /// Indices into the full dataset, in dataset order.
    pub indices: Vec<usize>,
    /// Composite flavor label per slice record.
    pub labels: Vec<String>,
    pub food_counts: Vec<(String, usize)>,
    pub flavor_counts: Vec<(String, usize)>,
    /// `(position within slice, row index in dataset)` for index scatter plots.
    pub index_pairs: Vec<(usize, usize)>,
}

impl EffectSlice {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The slice's records, borrowed from `dataset`.
    pub fn records<'a>(&'a self, dataset: &'a AromaDataset) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().map(move |&i| &dataset.records()[i])
    }

    /// Distinct composite flavors, first-appearance order.
    pub fn flavors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for label in &self.labels {
            if !out.contains(&label.as_str()) {
                out.push(label);
            }
        }
        out
    }

    /// `(synthetic agent, natural replacement)` rows in slice order.
    pub fn replacements<'a>(&'a self, dataset: &'a AromaDataset) -> Vec<(&'a str, &'a str)> {
        self.records(dataset)
            .map(|rec| (rec.synthetic_agent.as_str(), rec.natural_agent.as_str()))
            .collect()
    }
}

/// Indices of records whose canonical effect is `effect`.
pub fn matching_indices(dataset: &AromaDataset, effect: &str) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| rec.canonical_effect == effect)
        .map(|(i, _)| i)
        .collect()
}

/// Partition out the records of one canonical effect. An effect absent from
/// the dataset yields an empty slice.
pub fn slice(dataset: &AromaDataset, effect: &str) -> EffectSlice {
    let indices = matching_indices(dataset, effect);
    let records: Vec<&Record> = indices.iter().map(|&i| &dataset.records()[i]).collect();

    let labels: Vec<String> = records.iter().map(|r| r.composite_flavor()).collect();
    let food_counts = value_counts(records.iter().map(|r| r.food.as_str()));
    let flavor_counts = value_counts(labels.iter().map(String::as_str));
    let index_pairs = indices.iter().copied().enumerate().collect();

    EffectSlice {
        effect: effect.to_string(),
        indices,
        labels,
        food_counts,
        flavor_counts,
        index_pairs,
    }
}
