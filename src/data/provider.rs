use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use super::loader;
use super::model::{Dataset, DefectRecord, Section, TopDefectsRecord};

// ---------------------------------------------------------------------------
// DatasetProvider – where the two tables come from
// ---------------------------------------------------------------------------

/// Supplies the defect-rate and top-3 tables. Called once per load; the
/// result is frozen into a [`Dataset`].
pub trait DatasetProvider {
    fn load_defect_data(&self) -> Result<Vec<DefectRecord>>;
    fn load_top_defects_data(&self) -> Result<Vec<TopDefectsRecord>>;

    /// Short human-readable origin, for the status bar and logs.
    fn describe(&self) -> String;

    /// Origin of the defect-rate table alone.
    fn defects_origin(&self) -> String {
        self.describe()
    }

    /// Origin of the top-3 table alone.
    fn top_defects_origin(&self) -> String {
        self.describe()
    }
}

/// One origin when both tables share it, otherwise `"rates + top3"`.
pub fn combine_origins(defects: &str, top_defects: &str) -> String {
    if defects == top_defects {
        defects.to_string()
    } else {
        format!("{defects} + {top_defects}")
    }
}

impl Dataset {
    /// Load both tables from a provider.
    pub fn load(provider: &dyn DatasetProvider) -> Result<Self> {
        let defects = provider.load_defect_data()?;
        let top_defects = provider.load_top_defects_data()?;
        log::info!(
            "Loaded {} defect-rate rows and {} top-3 rows from {}",
            defects.len(),
            top_defects.len(),
            provider.describe()
        );
        Ok(Dataset::new(defects, top_defects))
    }
}

// ---------------------------------------------------------------------------
// Built-in sample
// ---------------------------------------------------------------------------

/// The built-in demo data: ten daily defect rates and one top-3 row per section.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleProvider;

const SAMPLE_FACTORIES: [&str; 5] = ["HITCP4", "HITSR", "HIC", "HIT91", "HIT70"];
const SAMPLE_RATES: [f64; 10] = [80.40, 16.49, 40.92, 1.74, 8.48, 0.0, 0.0, 1.13, 1.31, 0.47];

const SAMPLE_TOP3: [[&str; 3]; 5] = [
    ["ผ้าเป็นตำหนิ", "ตัวรีดหลุดลอก", "สีตัวรีดแตก"],
    ["ตัวรีดเป็นตำหนิ", "ตัวรีดมีคราบกาว", "ผ้าติดริม"],
    ["รอยเกี่ยวเกิดจากผ้า", "ตัดเศษด้ายไม่เกลี้ยง", "เย็บตกร่อง"],
    ["รีดผิดหน้าผ้า", "ผ้าเปื้อน", "ตัวรีดเปิด"],
    ["ไม่ได้สเปค", "รีดเอียง", "ด้ายโดด"],
];

fn sample_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 9).unwrap_or_default()
}

impl DatasetProvider for SampleProvider {
    fn load_defect_data(&self) -> Result<Vec<DefectRecord>> {
        let start = sample_start();
        Ok(SAMPLE_RATES
            .iter()
            .enumerate()
            .map(|(i, &rate)| DefectRecord {
                date: start + Duration::days(i as i64),
                month: "Jan".to_string(),
                year: "2026".to_string(),
                section: Section::ALL[i % Section::ALL.len()],
                factory: SAMPLE_FACTORIES[i % SAMPLE_FACTORIES.len()].to_string(),
                defect_rate: rate,
            })
            .collect())
    }

    fn load_top_defects_data(&self) -> Result<Vec<TopDefectsRecord>> {
        let start = sample_start();
        Ok(Section::ALL
            .iter()
            .zip(SAMPLE_TOP3.iter())
            .enumerate()
            .map(|(i, (&section, [top1, top2, top3]))| TopDefectsRecord {
                date: start + Duration::days(i as i64),
                section,
                top1: Some(top1.to_string()),
                top2: Some(top2.to_string()),
                top3: Some(top3.to_string()),
            })
            .collect())
    }

    fn describe(&self) -> String {
        "built-in sample".to_string()
    }
}

// ---------------------------------------------------------------------------
// File-backed provider
// ---------------------------------------------------------------------------

/// A file plus, for workbooks, the sheet holding the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// Reads both tables from files (CSV, JSON, Parquet or a spreadsheet).
/// Both sources may point at the same workbook with different sheets.
#[derive(Debug, Clone)]
pub struct FileProvider {
    pub defects: DataSource,
    pub top_defects: DataSource,
}

impl DatasetProvider for FileProvider {
    fn load_defect_data(&self) -> Result<Vec<DefectRecord>> {
        loader::load_defects(&self.defects.path, self.defects.sheet.as_deref())
            .with_context(|| format!("loading {}", self.defects.path.display()))
    }

    fn load_top_defects_data(&self) -> Result<Vec<TopDefectsRecord>> {
        loader::load_top_defects(&self.top_defects.path, self.top_defects.sheet.as_deref())
            .with_context(|| format!("loading {}", self.top_defects.path.display()))
    }

    fn describe(&self) -> String {
        combine_origins(&self.defects_origin(), &self.top_defects_origin())
    }

    fn defects_origin(&self) -> String {
        self.defects.path.display().to_string()
    }

    fn top_defects_origin(&self) -> String {
        self.top_defects.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sample_cycles_sections_and_factories() {
        let rows = SampleProvider.load_defect_data().unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[5].section, Section::Inline);
        assert_eq!(rows[5].factory, "HITCP4");
        assert_eq!(rows[9].section, Section::Embellishment);
        assert_eq!(rows[9].date, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
        assert!(rows.iter().all(|r| r.defect_rate >= 0.0));
    }

    #[test]
    fn sample_has_one_top3_row_per_section() {
        let rows = SampleProvider.load_top_defects_data().unwrap();
        let sections: Vec<Section> = rows.iter().map(|r| r.section).collect();
        assert_eq!(sections, Section::ALL.to_vec());
    }

    #[test]
    fn sample_is_deterministic() {
        let a = Dataset::load(&SampleProvider).unwrap();
        let b = Dataset::load(&SampleProvider).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn file_provider_reads_csv_pair() {
        let dir = tempfile::tempdir().unwrap();
        let defects = dir.path().join("defects.csv");
        let top = dir.path().join("top3.csv");
        let mut f = std::fs::File::create(&defects).unwrap();
        writeln!(f, "Date,Month,Year,Section,Factory,Defect_Rate").unwrap();
        writeln!(f, "2026-02-01,Feb,2026,Final,HIC,2.5").unwrap();
        let mut f = std::fs::File::create(&top).unwrap();
        writeln!(f, "Date,Section,Top1,Top2,Top3").unwrap();
        writeln!(f, "2026-02-01,Final,a,b,c").unwrap();

        let provider = FileProvider {
            defects: DataSource::new(&defects),
            top_defects: DataSource::new(&top),
        };
        let ds = Dataset::load(&provider).unwrap();
        assert_eq!(ds.defects.len(), 1);
        assert_eq!(ds.defects[0].month, "Feb");
        assert_eq!(ds.top_defects[0].top3.as_deref(), Some("c"));
    }

    #[test]
    fn file_provider_reports_each_origin() {
        let provider = FileProvider {
            defects: DataSource::new("rates.csv"),
            top_defects: DataSource::new("top3.csv"),
        };
        assert_eq!(provider.defects_origin(), "rates.csv");
        assert_eq!(provider.top_defects_origin(), "top3.csv");
        assert_eq!(provider.describe(), "rates.csv + top3.csv");
        assert_eq!(SampleProvider.top_defects_origin(), "built-in sample");
    }

    #[test]
    fn missing_file_fails_with_path_in_message() {
        let provider = FileProvider {
            defects: DataSource::new("/nonexistent/defects.csv"),
            top_defects: DataSource::new("/nonexistent/top3.csv"),
        };
        let err = Dataset::load(&provider).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/defects.csv"));
    }
}
