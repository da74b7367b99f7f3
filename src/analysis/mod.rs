/// Analysis layer: pure derivations over a loaded [`AromaDataset`].
///
/// ```text
///   AromaDataset ──► pivot ──► correlation
///        │
///        ├──────► slice ──► counts
///        ▼
///   questions: question id → ChartSet (kind → payload)
/// ```
///
/// Nothing here mutates the dataset or fails on well-formed input; empty
/// groups come back as empty results.
///
/// [`AromaDataset`]: crate::data::model::AromaDataset

pub mod correlation;
pub mod counts;
pub mod pivot;
pub mod questions;
pub mod slice;
