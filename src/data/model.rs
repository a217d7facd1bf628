use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Section – production stage at which defects are recorded
// ---------------------------------------------------------------------------

/// A production stage. The set is closed: the dashboard always offers all
/// five, whether or not the loaded data mentions them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    Inline,
    Endline,
    Final,
    Cutting,
    Embellishment,
}

impl Section {
    /// Dropdown order.
    pub const ALL: [Section; 5] = [
        Section::Inline,
        Section::Endline,
        Section::Final,
        Section::Cutting,
        Section::Embellishment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Inline => "Inline",
            Section::Endline => "Endline",
            Section::Final => "Final",
            Section::Cutting => "Cutting",
            Section::Embellishment => "Embellishment",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Section::Inline),
            "endline" => Ok(Section::Endline),
            "final" => Ok(Section::Final),
            "cutting" => Ok(Section::Cutting),
            // Older QC workbooks spell it "Embalishment".
            "embellishment" | "embalishment" => Ok(Section::Embellishment),
            _ => Err(DataError::UnknownSection(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Records – one row of each source table
// ---------------------------------------------------------------------------

/// Defect rate observed for one day / section / factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Section")]
    pub section: Section,
    #[serde(rename = "Factory")]
    pub factory: String,
    /// Percentage, `>= 0`.
    #[serde(rename = "Defect_Rate")]
    pub defect_rate: f64,
}

/// The three most frequent defect causes of a section on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDefectsRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Section")]
    pub section: Section,
    #[serde(rename = "Top1")]
    pub top1: Option<String>,
    #[serde(rename = "Top2")]
    pub top2: Option<String>,
    #[serde(rename = "Top3")]
    pub top3: Option<String>,
}

// ---------------------------------------------------------------------------
// FilterSelection – the user's current query
// ---------------------------------------------------------------------------

/// One value per dropdown. Owned by a single session and replaced wholesale
/// whenever a control changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub year: String,
    pub month: String,
    pub section: Section,
    pub factory: String,
}

impl FilterSelection {
    /// Whether a defect record passes all four equality predicates.
    pub fn matches(&self, record: &DefectRecord) -> bool {
        record.year == self.year
            && record.month == self.month
            && record.section == self.section
            && record.factory == self.factory
    }
}

// ---------------------------------------------------------------------------
// Dataset – both tables, immutable once built
// ---------------------------------------------------------------------------

/// The loaded tables. Built once and then only shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub defects: Vec<DefectRecord>,
    pub top_defects: Vec<TopDefectsRecord>,
}

impl Dataset {
    pub fn new(defects: Vec<DefectRecord>, top_defects: Vec<TopDefectsRecord>) -> Self {
        Dataset {
            defects,
            top_defects,
        }
    }

    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.defects.is_empty() && self.top_defects.is_empty()
    }
}
