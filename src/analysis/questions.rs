use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::data::model::AromaDataset;

use super::correlation::{CorrelationMatrix, correlate};
use super::counts::{BoxStats, box_stats, value_counts};
use super::pivot::{PivotTable, RowField, build_pivot};
use super::slice::slice;

// ---------------------------------------------------------------------------
// Chart kinds and payloads
// ---------------------------------------------------------------------------

/// The chart styles a question can offer. Ordering is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    CategoricalDistribution,
    PivotHeatmap,
    Correlation,
    PieShare,
    BarCount,
    ScatterIndex,
    BoxSpread,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::CategoricalDistribution,
        ChartKind::PivotHeatmap,
        ChartKind::Correlation,
        ChartKind::PieShare,
        ChartKind::BarCount,
        ChartKind::ScatterIndex,
        ChartKind::BoxSpread,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            ChartKind::CategoricalDistribution => "categorical-distribution",
            ChartKind::PivotHeatmap => "pivot-heatmap",
            ChartKind::Correlation => "correlation",
            ChartKind::PieShare => "pie-share",
            ChartKind::BarCount => "bar-count",
            ChartKind::ScatterIndex => "scatter-index",
            ChartKind::BoxSpread => "box-spread",
        }
    }

    /// Checkbox label.
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::CategoricalDistribution => "Distribution",
            ChartKind::PivotHeatmap => "Heat-map",
            ChartKind::Correlation => "Correlation",
            ChartKind::PieShare => "Pie chart",
            ChartKind::BarCount => "Bar chart",
            ChartKind::ScatterIndex => "Scatter plot",
            ChartKind::BoxSpread => "Box plot",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Chart-ready data handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPayload {
    /// Labelled counts, drawn as bars or pie wedges.
    Counts {
        title: String,
        x_label: String,
        y_label: String,
        entries: Vec<(String, usize)>,
    },
    Heatmap {
        title: String,
        pivot: PivotTable,
    },
    Correlation {
        title: String,
        matrix: CorrelationMatrix,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<[f64; 2]>,
    },
    /// `stats` is `None` when there was nothing to summarize.
    Box {
        title: String,
        y_label: String,
        stats: Option<BoxStats>,
    },
}

impl ChartPayload {
    pub fn title(&self) -> &str {
        match self {
            ChartPayload::Counts { title, .. }
            | ChartPayload::Heatmap { title, .. }
            | ChartPayload::Correlation { title, .. }
            | ChartPayload::Scatter { title, .. }
            | ChartPayload::Box { title, .. } => title,
        }
    }
}

/// Charts produced by one question, keyed (and ordered) by kind.
pub type ChartSet = BTreeMap<ChartKind, ChartPayload>;

// ---------------------------------------------------------------------------
// Chart builders
// ---------------------------------------------------------------------------

/// Counts of every canonical effect across the whole dataset.
pub fn distribution_charts(dataset: &AromaDataset) -> ChartSet {
    let entries = value_counts(dataset.records().iter().map(|r| r.canonical_effect.as_str()));
    let spread: Vec<f64> = entries.iter().map(|(_, n)| *n as f64).collect();

    let mut charts = ChartSet::new();
    charts.insert(
        ChartKind::CategoricalDistribution,
        ChartPayload::Counts {
            title: "Distribution of Effects".into(),
            x_label: "Effect".into(),
            y_label: "Count".into(),
            entries: entries.clone(),
        },
    );
    charts.insert(
        ChartKind::PieShare,
        ChartPayload::Counts {
            title: "Effects – share".into(),
            x_label: "Effect".into(),
            y_label: String::new(),
            entries,
        },
    );
    charts.insert(
        ChartKind::BoxSpread,
        ChartPayload::Box {
            title: "Spread of Effect Counts".into(),
            y_label: "Count".into(),
            stats: box_stats(&spread),
        },
    );
    charts
}

/// Heat map and effect correlation for a pivot on `row_field`.
pub fn pivot_charts(dataset: &AromaDataset, row_field: RowField, noun: &str) -> ChartSet {
    let pivot = build_pivot(dataset, row_field);
    let matrix = correlate(&pivot);

    let mut charts = ChartSet::new();
    charts.insert(
        ChartKind::PivotHeatmap,
        ChartPayload::Heatmap {
            title: format!("Effects by {noun}"),
            pivot,
        },
    );
    charts.insert(
        ChartKind::Correlation,
        ChartPayload::Correlation {
            title: format!("Correlation between Effects ({noun} table)"),
            matrix,
        },
    );
    charts
}

/// Flavor share, food counts, and row-index scatter for one effect.
pub fn effect_charts(dataset: &AromaDataset, effect: &str) -> ChartSet {
    let s = slice(dataset, effect);
    let points = s
        .index_pairs
        .iter()
        .map(|&(pos, row)| [pos as f64, row as f64])
        .collect();

    let mut charts = ChartSet::new();
    charts.insert(
        ChartKind::PieShare,
        ChartPayload::Counts {
            title: format!("Flavours causing {effect}"),
            x_label: "Flavour".into(),
            y_label: String::new(),
            entries: s.flavor_counts,
        },
    );
    charts.insert(
        ChartKind::BarCount,
        ChartPayload::Counts {
            title: format!("Food count – {effect}"),
            x_label: "Food".into(),
            y_label: "Count".into(),
            entries: s.food_counts,
        },
    );
    charts.insert(
        ChartKind::ScatterIndex,
        ChartPayload::Scatter {
            title: format!("Index scatter – {effect}"),
            x_label: "Index".into(),
            y_label: "Row #".into(),
            points,
        },
    );
    charts
}

// ---------------------------------------------------------------------------
// Question registry
// ---------------------------------------------------------------------------

pub const DISTRIBUTION_QUESTION: &str = "Distribution of Effects";
pub const FLAVOR_QUESTION: &str = "Effects by Flavour of Aroma";
pub const FOOD_QUESTION: &str = "Effects by Food Type";

type ChartBuilder = Arc<dyn Fn(&AromaDataset) -> ChartSet + Send + Sync>;

/// One entry of the question dropdown.
#[derive(Clone)]
pub struct Question {
    pub id: String,
    /// Canonical effect for per-effect questions.
    pub effect: Option<String>,
    build: ChartBuilder,
}

impl Question {
    fn new(
        id: impl Into<String>,
        effect: Option<String>,
        build: impl Fn(&AromaDataset) -> ChartSet + Send + Sync + 'static,
    ) -> Self {
        Question {
            id: id.into(),
            effect,
            build: Arc::new(build),
        }
    }

    /// Compute this question's charts from `dataset`.
    pub fn charts(&self, dataset: &AromaDataset) -> ChartSet {
        (self.build)(dataset)
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("id", &self.id)
            .field("effect", &self.effect)
            .finish_non_exhaustive()
    }
}

/// Ordered list of questions: three fixed ones, then one per observed effect.
#[derive(Debug, Clone, Default)]
pub struct QuestionRegistry {
    questions: Vec<Question>,
}

impl QuestionRegistry {
    pub fn for_dataset(dataset: &AromaDataset) -> Self {
        let mut questions = vec![
            Question::new(DISTRIBUTION_QUESTION, None, distribution_charts),
            Question::new(FLAVOR_QUESTION, None, |ds: &AromaDataset| {
                pivot_charts(ds, RowField::CompositeFlavor, "Flavour")
            }),
            Question::new(FOOD_QUESTION, None, |ds: &AromaDataset| {
                pivot_charts(ds, RowField::Food, "Food")
            }),
        ];

        for effect in dataset.effects() {
            let bound = effect.clone();
            questions.push(Question::new(
                format!("{effect} (specific)"),
                Some(effect.clone()),
                move |ds: &AromaDataset| effect_charts(ds, &bound),
            ));
        }

        QuestionRegistry { questions }
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }

    pub fn first(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
