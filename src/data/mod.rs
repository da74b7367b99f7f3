/// Data layer: record types, label normalization, and loading.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → schema check
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ normalize   │  raw effect text → canonical effect
///   └────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ AromaDataset  │  Vec<Record>, effect index
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod normalize;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::model::{AromaDataset, RawRecord};
    use super::normalize::UnmappedPolicy;

    pub fn raw(effect: &str, flavor: &str, formula: Option<&str>, food: &str) -> RawRecord {
        RawRecord {
            effect: effect.to_string(),
            flavor: flavor.to_string(),
            chemical_formula: formula.map(str::to_string),
            food: food.to_string(),
            synthetic_agent: format!("synthetic {flavor}"),
            natural_agent: format!("natural {flavor}"),
        }
    }

    pub fn dataset(rows: Vec<RawRecord>) -> AromaDataset {
        AromaDataset::from_raw(rows, true, UnmappedPolicy::PassThrough).unwrap()
    }

    /// Small catalogue covering every synonym plus an unmapped label.
    pub fn catalogue() -> AromaDataset {
        dataset(vec![
            raw("Irritation Effects", "Limonene", Some("C10H16"), "Candy"),
            raw("irritation effects", "Limonene", Some("C10H16"), "Soda"),
            raw("SPECIFIED EFFECTS", "Vanillin", Some("C8H8O3"), "Ice cream"),
            raw("specialized effects", "Vanillin", None, "Candy"),
            raw("Allergic Reaction", "Cinnamon", Some("C9H8O"), "Bakery"),
            raw("allergic reaction", "Limonene", Some("C10H16"), "Candy"),
            raw("Systemic Toxicity", "Musk", None, "Perfume"),
            raw("safety approvals", "Mint", Some("C10H20O"), "Gum"),
            raw("Safety Approvals", "Mint", Some("C10H20O"), "Candy"),
            raw("Skin Sensitization", "Citral", None, "Soda"),
        ])
    }

    /// `n` records cycling through six distinct effects and four foods.
    pub fn cyclic(n: usize) -> AromaDataset {
        const EFFECTS: [&str; 6] = [
            "irritation effects",
            "Specialized Effects",
            "SYSTEMIC TOXICITY",
            "safety approvals",
            "Allergic reaction",
            "phototoxicity",
        ];
        const FOODS: [&str; 4] = ["Candy", "Soda", "Bakery", "Gum"];
        const FLAVORS: [&str; 3] = ["Limonene", "Vanillin", "Mint"];
        dataset(
            (0..n)
                .map(|i| {
                    raw(
                        EFFECTS[i % EFFECTS.len()],
                        FLAVORS[i % FLAVORS.len()],
                        (i % 2 == 0).then_some("C10H16"),
                        FOODS[(i / 3) % FOODS.len()],
                    )
                })
                .collect(),
        )
    }
}
