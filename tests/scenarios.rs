use qc_dashboard::data::filter::{
    apply_filters, average_defect_rate, filter_defects, filter_top_defects,
};
use qc_dashboard::data::model::{Dataset, FilterSelection, Section};
use qc_dashboard::data::provider::SampleProvider;

fn sample() -> Dataset {
    Dataset::load(&SampleProvider).expect("sample data loads")
}

fn selection(section: Section, factory: &str) -> FilterSelection {
    FilterSelection {
        year: "2026".to_string(),
        month: "Jan".to_string(),
        section,
        factory: factory.to_string(),
    }
}

#[test]
fn inline_hitcp4_returns_first_and_sixth_rows() {
    let ds = sample();
    let result = ds.apply(&selection(Section::Inline, "HITCP4"));

    assert_eq!(result.defects.len(), 2);
    assert_eq!(result.defects[0], ds.defects[0]);
    assert_eq!(result.defects[1], ds.defects[5]);
    assert_eq!(result.defects[0].defect_rate, 80.40);
    assert_eq!(result.defects[1].defect_rate, 0.0);
    assert!((result.average_rate - 40.20).abs() < 1e-9);
}

#[test]
fn unknown_factory_gives_empty_rows_and_zero_average() {
    let ds = sample();
    let result = ds.apply(&selection(Section::Inline, "HITXX"));
    assert!(result.defects.is_empty());
    assert_eq!(result.average_rate, 0.0);
}

#[test]
fn cutting_top3_comes_from_sample() {
    let ds = sample();
    let rows = filter_top_defects(&ds.top_defects, Section::Cutting);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].top1.as_deref(), Some("รีดผิดหน้าผ้า"));
}

#[test]
fn section_missing_from_top3_table_gives_empty() {
    let ds = sample();
    let without_final: Vec<_> = ds
        .top_defects
        .iter()
        .filter(|r| r.section != Section::Final)
        .cloned()
        .collect();
    assert!(filter_top_defects(&without_final, Section::Final).is_empty());
}

#[test]
fn changing_only_the_year_to_an_absent_one_is_empty() {
    let ds = sample();
    let mut sel = selection(Section::Inline, "HITCP4");
    sel.year = "2025".to_string();
    let result = apply_filters(&ds.defects, &ds.top_defects, &sel);
    assert!(result.defects.is_empty());
    assert_eq!(result.average_rate, 0.0);
    // Top-3 rows depend on the section only.
    assert_eq!(result.top_defects.len(), 1);
}

#[test]
fn every_sample_combination_is_consistent() {
    let ds = sample();
    let options = ds.filter_options();
    for section in &options.sections {
        for factory in &options.factories {
            let sel = selection(*section, factory);
            let rows = filter_defects(&ds.defects, &sel);
            assert!(rows.iter().all(|r| sel.matches(r)));
            assert_eq!(filter_defects(&rows, &sel), rows);

            let expected = if rows.is_empty() {
                0.0
            } else {
                rows.iter().map(|r| r.defect_rate).sum::<f64>() / rows.len() as f64
            };
            assert!((average_defect_rate(&rows) - expected).abs() < 1e-12);
        }
    }
}
