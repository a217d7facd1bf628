use std::env;
use std::path::PathBuf;

use crate::data::provider::{DataSource, DatasetProvider, FileProvider, SampleProvider};

/// Startup configuration, read from the environment.
///
/// | Variable               | Meaning                                        |
/// |------------------------|------------------------------------------------|
/// | `QC_DEFECT_DATA`       | defect-rate file (csv/json/parquet/xlsx)       |
/// | `QC_TOP_DEFECTS_DATA`  | top-3 file; defaults to `QC_DEFECT_DATA`       |
/// | `QC_DEFECT_SHEET`      | worksheet holding the defect rates             |
/// | `QC_TOP_DEFECTS_SHEET` | worksheet holding the top-3 defects            |
/// | `QC_UI_FONT`           | extra TTF/OTF font (e.g. for Thai labels)      |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardConfig {
    pub defect_data: Option<PathBuf>,
    pub top_defects_data: Option<PathBuf>,
    pub defect_sheet: Option<String>,
    pub top_defects_sheet: Option<String>,
    pub ui_font: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            defect_data: get("QC_DEFECT_DATA").map(PathBuf::from),
            top_defects_data: get("QC_TOP_DEFECTS_DATA").map(PathBuf::from),
            defect_sheet: get("QC_DEFECT_SHEET"),
            top_defects_sheet: get("QC_TOP_DEFECTS_SHEET"),
            ui_font: get("QC_UI_FONT").map(PathBuf::from),
        }
    }

    /// File provider when a data path is configured, the built-in sample otherwise.
    pub fn provider(&self) -> Box<dyn DatasetProvider> {
        let Some(defect_path) = self.defect_data.clone().or_else(|| self.top_defects_data.clone())
        else {
            return Box::new(SampleProvider);
        };
        let top_path = self
            .top_defects_data
            .clone()
            .unwrap_or_else(|| defect_path.clone());

        Box::new(FileProvider {
            defects: DataSource {
                path: defect_path,
                sheet: self.defect_sheet.clone(),
            },
            top_defects: DataSource {
                path: top_path,
                sheet: self.top_defects_sheet.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DashboardConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn no_paths_means_sample() {
        let cfg = config(&[]);
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.provider().describe(), "built-in sample");
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = config(&[("QC_DEFECT_DATA", "  "), ("QC_UI_FONT", "")]);
        assert_eq!(cfg.defect_data, None);
        assert_eq!(cfg.ui_font, None);
    }

    #[test]
    fn single_workbook_serves_both_tables() {
        let cfg = config(&[
            ("QC_DEFECT_DATA", "qc.xlsx"),
            ("QC_DEFECT_SHEET", "Defect Rate"),
            ("QC_TOP_DEFECTS_SHEET", "Top 3"),
        ]);
        assert_eq!(cfg.provider().describe(), "qc.xlsx");
        assert_eq!(cfg.top_defects_sheet.as_deref(), Some("Top 3"));
    }

    #[test]
    fn separate_files_are_both_described() {
        let cfg = config(&[
            ("QC_DEFECT_DATA", "rates.csv"),
            ("QC_TOP_DEFECTS_DATA", "top3.csv"),
        ]);
        assert_eq!(cfg.provider().describe(), "rates.csv + top3.csv");
    }
}
