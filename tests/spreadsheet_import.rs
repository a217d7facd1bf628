//! Workbook import against `tests/fixtures/qc_workbook.xlsx`.
//!
//! Sheet "Defect Rate" (first): three data rows, dates 46031 and 46032 stored
//! as date-formatted serials, a third date stored as text, then a blank row.
//! Sheet "Top 3 Defects": two rows, the second without a Top2 cause.

use std::path::PathBuf;

use chrono::NaiveDate;

use qc_dashboard::data::loader::{load_defects, load_top_defects};
use qc_dashboard::data::model::{Dataset, Section};
use qc_dashboard::data::provider::{DataSource, DatasetProvider, FileProvider};

const DEFECT_SHEET: &str = "Defect Rate";
const TOP3_SHEET: &str = "Top 3 Defects";

fn workbook() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/qc_workbook.xlsx")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
}

#[test]
fn first_sheet_is_read_by_default() {
    let rows = load_defects(&workbook(), None).unwrap();

    // The trailing blank row is skipped.
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date, day(9));
    assert_eq!(rows[0].month, "Jan");
    assert_eq!(rows[0].year, "2026");
    assert_eq!(rows[0].section, Section::Inline);
    assert_eq!(rows[0].factory, "HITCP4");
    assert_eq!(rows[0].defect_rate, 80.4);

    assert_eq!(rows[1].date, day(10));
    assert_eq!(rows[1].section, Section::Embellishment);

    // Text date in a workbook cell.
    assert_eq!(rows[2].date, day(11));
    assert_eq!(rows[2].defect_rate, 0.0);
}

#[test]
fn named_sheet_selects_the_worksheet() {
    let by_name = load_defects(&workbook(), Some(DEFECT_SHEET)).unwrap();
    assert_eq!(by_name, load_defects(&workbook(), None).unwrap());

    let top = load_top_defects(&workbook(), Some(TOP3_SHEET)).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].date, day(12));
    assert_eq!(top[0].section, Section::Cutting);
    assert_eq!(top[0].top1.as_deref(), Some("รีดผิดหน้าผ้า"));
    assert_eq!(top[1].date, day(13));
    assert_eq!(top[1].section, Section::Final);
    assert_eq!(top[1].top2, None);
    assert_eq!(top[1].top3.as_deref(), Some("เย็บตกร่อง"));
}

#[test]
fn unknown_sheet_is_reported() {
    let err = load_defects(&workbook(), Some("Sheet9")).unwrap_err();
    assert_eq!(format!("{err}"), "Sheet 'Sheet9' not found in workbook");
}

#[test]
fn wrong_sheet_reports_the_missing_column() {
    // The first sheet has no Top1..Top3 columns.
    let err = load_top_defects(&workbook(), None).unwrap_err();
    assert!(format!("{err:#}").contains("Missing column 'Top1'"));
}

#[test]
fn one_workbook_feeds_both_tables() {
    let provider = FileProvider {
        defects: DataSource::new(workbook()).with_sheet(DEFECT_SHEET),
        top_defects: DataSource::new(workbook()).with_sheet(TOP3_SHEET),
    };
    assert_eq!(provider.describe(), workbook().display().to_string());

    let ds = Dataset::load(&provider).unwrap();
    assert_eq!(ds.defects.len(), 3);
    assert_eq!(ds.top_defects.len(), 2);

    let mut sel = ds.filter_options().default_selection();
    sel.section = Section::Cutting;
    assert_eq!(ds.apply(&sel).top_defects.len(), 1);
}
