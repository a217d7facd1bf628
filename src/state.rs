use std::sync::Arc;

use crate::data::filter::{FilterOptions, FilterResult};
use crate::data::model::{Dataset, DefectRecord, FilterSelection, TopDefectsRecord};
use crate::data::provider::{DatasetProvider, combine_origins};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One per session.
pub struct AppState {
    /// Loaded dataset (None until a load succeeds). Never mutated in place.
    pub dataset: Option<Arc<Dataset>>,

    /// Dropdown values derived from the dataset.
    pub options: FilterOptions,

    /// Current dropdown selection.
    pub selection: FilterSelection,

    /// Filtered rows and average for `selection` (cached).
    pub result: FilterResult,

    /// Where the defect-rate table came from.
    pub defects_origin: Option<String>,

    /// Where the top-3 table came from.
    pub top_defects_origin: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let options = FilterOptions::default();
        Self {
            dataset: None,
            selection: options.default_selection(),
            options,
            result: FilterResult::default(),
            defects_origin: None,
            top_defects_origin: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: rebuild options, reset the selection
    /// to the first value of every dropdown and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.options = dataset.filter_options();
        self.selection = self.options.default_selection();
        self.result = dataset.apply(&self.selection);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load from a provider. On failure the dataset is dropped and the error
    /// goes to the status bar; nothing is filtered.
    pub fn load_from(&mut self, provider: &dyn DatasetProvider) {
        match Dataset::load(provider) {
            Ok(dataset) => {
                self.set_dataset(Arc::new(dataset));
                self.defects_origin = Some(provider.defects_origin());
                self.top_defects_origin = Some(provider.top_defects_origin());
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.clear_with_error(format!("Error: {e:#}"));
            }
        }
    }

    /// Handler for a changed dropdown. Recomputes synchronously.
    pub fn on_selection_changed(&mut self, selection: FilterSelection) {
        if selection == self.selection {
            return;
        }
        log::debug!("Selection changed to {selection:?}");
        self.selection = selection;
        self.refilter();
    }

    /// Recompute `result` for the current selection.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.result = ds.apply(&self.selection);
        }
    }

    /// Origins of both tables, collapsed when they are the same file.
    pub fn source(&self) -> Option<String> {
        match (&self.defects_origin, &self.top_defects_origin) {
            (Some(d), Some(t)) => Some(combine_origins(d, t)),
            (Some(one), None) | (None, Some(one)) => Some(one.clone()),
            (None, None) => None,
        }
    }

    /// Swap in a new defect-rate table, keeping the top-3 table.
    pub fn replace_defects(&mut self, defects: Vec<DefectRecord>, origin: impl Into<String>) {
        let top_defects = self
            .dataset
            .as_ref()
            .map(|ds| ds.top_defects.clone())
            .unwrap_or_default();
        self.set_dataset(Arc::new(Dataset::new(defects, top_defects)));
        self.defects_origin = Some(origin.into());
    }

    /// Swap in a new top-3 table, keeping the defect rates and the selection.
    pub fn replace_top_defects(
        &mut self,
        top_defects: Vec<TopDefectsRecord>,
        origin: impl Into<String>,
    ) {
        let defects = self
            .dataset
            .as_ref()
            .map(|ds| ds.defects.clone())
            .unwrap_or_default();
        let selection = self.selection.clone();
        self.set_dataset(Arc::new(Dataset::new(defects, top_defects)));
        self.top_defects_origin = Some(origin.into());
        self.on_selection_changed(selection);
    }

    fn clear_with_error(&mut self, message: String) {
        *self = Self {
            status_message: Some(message),
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Section;
    use crate::data::provider::{DataSource, FileProvider, SampleProvider};

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_from(&SampleProvider);
        state
    }

    #[test]
    fn loading_selects_first_options() {
        let state = loaded();
        assert_eq!(state.selection.year, "2026");
        assert_eq!(state.selection.month, "Jan");
        assert_eq!(state.selection.section, Section::Inline);
        assert_eq!(state.selection.factory, "HITCP4");
        assert_eq!(state.result.defects.len(), 2);
        assert_eq!(state.source().as_deref(), Some("built-in sample"));
    }

    #[test]
    fn selection_change_recomputes() {
        let mut state = loaded();
        let mut sel = state.selection.clone();
        sel.section = Section::Endline;
        sel.factory = "HITSR".into();
        state.on_selection_changed(sel);

        assert_eq!(state.result.defects.len(), 2);
        assert!((state.result.average_rate - 8.245).abs() < 1e-9);
        assert_eq!(state.result.top_defects.len(), 1);
    }

    #[test]
    fn selection_without_match_is_empty_not_error() {
        let mut state = loaded();
        let mut sel = state.selection.clone();
        sel.year = "2027".into();
        state.on_selection_changed(sel);

        assert!(state.result.defects.is_empty());
        assert_eq!(state.result.average_rate, 0.0);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_load_clears_dataset_and_reports() {
        let mut state = loaded();
        state.load_from(&FileProvider {
            defects: DataSource::new("/nonexistent/rates.csv"),
            top_defects: DataSource::new("/nonexistent/top3.csv"),
        });
        assert!(state.dataset.is_none());
        assert!(state.result.defects.is_empty());
        let msg = state.status_message.unwrap();
        assert!(msg.starts_with("Error:"), "{msg}");
    }

    #[test]
    fn replacing_top3_keeps_selection() {
        let mut state = loaded();
        let mut sel = state.selection.clone();
        sel.section = Section::Cutting;
        sel.factory = "HIT91".into();
        state.on_selection_changed(sel.clone());

        state.replace_top_defects(Vec::new(), "top3.csv");
        assert_eq!(state.selection, sel);
        assert!(state.result.top_defects.is_empty());
        assert_eq!(state.result.defects.len(), 2);
    }

    #[test]
    fn replacing_one_table_keeps_both_origins() {
        let mut state = loaded();
        state.replace_top_defects(Vec::new(), "top3.csv");
        assert_eq!(state.source().as_deref(), Some("built-in sample + top3.csv"));

        state.replace_defects(Vec::new(), "rates.xlsx");
        assert_eq!(state.source().as_deref(), Some("rates.xlsx + top3.csv"));

        state.replace_defects(Vec::new(), "top3.csv");
        assert_eq!(state.source().as_deref(), Some("top3.csv"));
    }

    #[test]
    fn file_provider_origins_are_tracked_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let rates = dir.path().join("rates.csv");
        let top = dir.path().join("top3.csv");
        std::fs::write(&rates, "Date,Month,Year,Section,Factory,Defect_Rate\n").unwrap();
        std::fs::write(&top, "Date,Section,Top1,Top2,Top3\n").unwrap();

        let mut state = AppState::default();
        state.load_from(&FileProvider {
            defects: DataSource::new(&rates),
            top_defects: DataSource::new(&top),
        });
        assert_eq!(state.defects_origin, Some(rates.display().to_string()));
        assert_eq!(state.top_defects_origin, Some(top.display().to_string()));
        assert_eq!(
            state.source(),
            Some(format!("{} + {}", rates.display(), top.display()))
        );
    }

    #[test]
    fn dataset_is_shared_not_copied() {
        let state = loaded();
        let ds = state.dataset.clone().unwrap();
        assert_eq!(Arc::strong_count(&ds), 2);
    }
}
