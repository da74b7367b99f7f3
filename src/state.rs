use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::questions::{ChartKind, ChartPayload, ChartSet, Question, QuestionRegistry};
use crate::analysis::slice::{EffectSlice, slice};
use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::loader::{LoadError, load_file};
use crate::data::model::AromaDataset;
use crate::data::normalize::UnmappedPolicy;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

/// Which charts the active question offers, which are ticked, and which were
/// drawn on the last "Draw".
#[derive(Debug, Clone, Default)]
pub struct ChartSelection {
    question_id: Option<String>,
    charts: Arc<ChartSet>,
    available: Vec<ChartKind>,
    enabled: BTreeSet<ChartKind>,
    drawn: Vec<ChartKind>,
}

impl ChartSelection {
    /// Switch to a question. All toggles start off and nothing is drawn.
    pub fn select(&mut self, question_id: &str, charts: Arc<ChartSet>) {
        self.question_id = Some(question_id.to_string());
        self.available = charts.keys().copied().collect();
        self.charts = charts;
        self.enabled.clear();
        self.drawn.clear();
    }

    pub fn question_id(&self) -> Option<&str> {
        self.question_id.as_deref()
    }

    /// Chart kinds of the active question, in display order.
    pub fn available(&self) -> &[ChartKind] {
        &self.available
    }

    pub fn is_enabled(&self, kind: ChartKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Tick or untick `kind`. Kinds the question does not offer are ignored.
    pub fn set_enabled(&mut self, kind: ChartKind, on: bool) {
        if !self.available.contains(&kind) {
            return;
        }
        if on {
            self.enabled.insert(kind);
        } else {
            self.enabled.remove(&kind);
        }
    }

    pub fn toggle(&mut self, kind: ChartKind) {
        let on = !self.is_enabled(kind);
        self.set_enabled(kind, on);
    }

    /// Snapshot the ticked kinds as the charts to render.
    pub fn draw(&mut self) {
        self.drawn = self
            .available
            .iter()
            .copied()
            .filter(|k| self.enabled.contains(k))
            .collect();
    }

    /// Payloads to render, in display order.
    pub fn specs(&self) -> Vec<(ChartKind, &ChartPayload)> {
        self.drawn
            .iter()
            .filter_map(|k| self.charts.get(k).map(|p| (*k, p)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Built once at startup around
/// the loaded dataset and passed to every panel.
pub struct AppState {
    /// Normalized catalogue, read-only after load.
    pub dataset: Arc<AromaDataset>,

    /// Where `dataset` was read from.
    pub source_path: PathBuf,

    /// Question dropdown entries for `dataset`.
    pub registry: QuestionRegistry,

    /// Chart toggles for the active question.
    pub selection: ChartSelection,

    /// Slice behind the active per-effect question, if any.
    pub current_slice: Option<EffectSlice>,

    /// Colours for canonical effects.
    pub effect_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    unmapped_policy: UnmappedPolicy,

    /// Chart sets already computed for this dataset, by question id.
    cache: HashMap<String, Arc<ChartSet>>,
}

impl AppState {
    pub fn new(dataset: AromaDataset, config: &AppConfig) -> Self {
        let mut state = Self {
            dataset: Arc::new(AromaDataset::default()),
            source_path: config.source_path.clone(),
            registry: QuestionRegistry::default(),
            selection: ChartSelection::default(),
            current_slice: None,
            effect_colors: ColorMap::default(),
            status_message: None,
            unmapped_policy: config.unmapped_policy,
            cache: HashMap::new(),
        };
        state.set_dataset(dataset, config.source_path.clone());
        state
    }

    /// Ingest a newly loaded dataset: rebuild questions and colours, drop
    /// cached charts, and select the first question.
    pub fn set_dataset(&mut self, dataset: AromaDataset, source_path: PathBuf) {
        self.registry = QuestionRegistry::for_dataset(&dataset);
        self.effect_colors = ColorMap::new(dataset.effects());
        self.dataset = Arc::new(dataset);
        self.source_path = source_path;
        self.cache.clear();
        self.status_message = None;

        if let Some(first) = self.registry.first().map(|q| q.id.clone()) {
            self.select_question(&first);
        }
    }

    /// Load another catalogue. On failure the current dataset is kept.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        match load_file(path, self.unmapped_policy) {
            Ok(dataset) => {
                self.set_dataset(dataset, path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Make `id` the active question. Unknown ids are ignored.
    pub fn select_question(&mut self, id: &str) {
        let Some(question) = self.registry.get(id).cloned() else {
            log::warn!("Unknown question {id:?}");
            return;
        };
        let charts = self.charts_for(&question);
        self.current_slice = question
            .effect
            .as_deref()
            .map(|effect| slice(&self.dataset, effect));
        self.selection.select(id, charts);
    }

    fn charts_for(&mut self, question: &Question) -> Arc<ChartSet> {
        if let Some(charts) = self.cache.get(&question.id) {
            log::debug!("Chart cache hit for {:?}", question.id);
            return Arc::clone(charts);
        }
        log::debug!("Computing charts for {:?}", question.id);
        let charts = Arc::new(question.charts(&self.dataset));
        self.cache.insert(question.id.clone(), Arc::clone(&charts));
        charts
    }
}
