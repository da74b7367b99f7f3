// ---------------------------------------------------------------------------
// Effect label normalization
// ---------------------------------------------------------------------------

/// Lower-cased spellings seen in the catalogue → canonical effect.
///
/// `"specified effects"` is a recurring typo for specialized effects.
pub const SYNONYMS: [(&str, &str); 6] = [
    ("irritation effects", "Irritation Effects"),
    ("specialized effects", "Specialized Effects"),
    ("specified effects", "Specialized Effects"),
    ("systemic toxicity", "Systemic Toxicity"),
    ("safety approvals", "Safety Approvals"),
    ("allergic reaction", "Allergic Reaction"),
];

/// Canonical value used by [`UnmappedPolicy::Other`].
pub const OTHER_EFFECT: &str = "Other";

/// What to do with an effect label the synonym table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
    /// Keep the lower-cased label as its own category.
    #[default]
    PassThrough,
    /// Bucket every unknown label into [`OTHER_EFFECT`].
    Other,
    /// Refuse to build the dataset.
    Reject,
}

/// Result of canonicalizing one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    pub value: String,
    /// False when the label missed the synonym table.
    pub mapped: bool,
}

/// Trim and lower-case a raw label.
pub fn fold(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canonical effect for `raw`, if the synonym table knows it.
pub fn lookup(raw: &str) -> Option<&'static str> {
    let folded = fold(raw);
    SYNONYMS
        .iter()
        .find(|(key, _)| *key == folded)
        .map(|(_, canonical)| *canonical)
}

/// Normalize a raw effect label, passing unknown labels through lower-cased.
///
/// Idempotent: canonical values fold back onto their own synonym key.
pub fn normalize(raw: &str) -> String {
    match lookup(raw) {
        Some(canonical) => canonical.to_string(),
        None => fold(raw),
    }
}

/// Normalize under `policy`. `Err` carries the folded label when the policy
/// rejects it.
pub fn canonicalize(raw: &str, policy: UnmappedPolicy) -> Result<Canonical, String> {
    if let Some(canonical) = lookup(raw) {
        return Ok(Canonical {
            value: canonical.to_string(),
            mapped: true,
        });
    }
    match policy {
        UnmappedPolicy::PassThrough => Ok(Canonical {
            value: normalize(raw),
            mapped: false,
        }),
        UnmappedPolicy::Other => Ok(Canonical {
            value: OTHER_EFFECT.to_string(),
            mapped: false,
        }),
        UnmappedPolicy::Reject => Err(fold(raw)),
    }
}

/// The distinct canonical effects of the synonym table, in table order.
pub fn vocabulary() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for (_, canonical) in SYNONYMS {
        if !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    out
}
