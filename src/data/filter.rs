use std::collections::BTreeSet;

use super::model::{Dataset, DefectRecord, FilterSelection, Section, TopDefectsRecord};

// ---------------------------------------------------------------------------
// Dropdown options
// ---------------------------------------------------------------------------

/// The selectable values of the four dropdowns.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub months: Vec<String>,
    pub sections: Vec<Section>,
    pub factories: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            months: Vec::new(),
            sections: Section::ALL.to_vec(),
            factories: Vec::new(),
        }
    }
}

impl FilterOptions {
    /// The initial selection: the first entry of every list, like a freshly
    /// rendered dropdown. Empty lists yield empty labels.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection {
            year: self.years.first().cloned().unwrap_or_default(),
            month: self.months.first().cloned().unwrap_or_default(),
            section: self.sections.first().copied().unwrap_or(Section::Inline),
            factory: self.factories.first().cloned().unwrap_or_default(),
        }
    }
}

/// Build the dropdown options from the defect table.
///
/// Years, months and factories are the distinct values present in the data,
/// in order of first occurrence. Sections are always the fixed set.
pub fn filter_options(records: &[DefectRecord]) -> FilterOptions {
    FilterOptions {
        years: distinct_in_order(records.iter().map(|r| r.year.as_str())),
        months: distinct_in_order(records.iter().map(|r| r.month.as_str())),
        sections: Section::ALL.to_vec(),
        factories: distinct_in_order(records.iter().map(|r| r.factory.as_str())),
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Filtering & aggregation
// ---------------------------------------------------------------------------

/// Records matching year, month, section and factory, in input order.
pub fn filter_defects(
    records: &[DefectRecord],
    selection: &FilterSelection,
) -> Vec<DefectRecord> {
    records
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect()
}

/// Top-3 rows of one section, in input order.
pub fn filter_top_defects(
    records: &[TopDefectsRecord],
    section: Section,
) -> Vec<TopDefectsRecord> {
    records
        .iter()
        .filter(|r| r.section == section)
        .cloned()
        .collect()
}

/// Mean defect rate; `0.0` for an empty slice so the KPI never shows NaN.
pub fn average_defect_rate(filtered: &[DefectRecord]) -> f64 {
    if filtered.is_empty() {
        return 0.0;
    }
    let sum: f64 = filtered.iter().map(|r| r.defect_rate).sum();
    sum / filtered.len() as f64
}

/// Everything the presentation layer renders for one selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    pub defects: Vec<DefectRecord>,
    pub top_defects: Vec<TopDefectsRecord>,
    pub average_rate: f64,
}

/// Run the full pipeline for one selection. Pure; called after every change.
pub fn apply_filters(
    defects: &[DefectRecord],
    top_defects: &[TopDefectsRecord],
    selection: &FilterSelection,
) -> FilterResult {
    let defects = filter_defects(defects, selection);
    let top_defects = filter_top_defects(top_defects, selection.section);
    let average_rate = average_defect_rate(&defects);
    FilterResult {
        defects,
        top_defects,
        average_rate,
    }
}

impl Dataset {
    /// Dropdown options for this dataset.
    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.defects)
    }

    /// [`apply_filters`] over both tables.
    pub fn apply(&self, selection: &FilterSelection) -> FilterResult {
        apply_filters(&self.defects, &self.top_defects, selection)
    }
}
