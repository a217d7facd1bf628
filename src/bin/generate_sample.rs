use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use qc_dashboard::data::model::{DefectRecord, TopDefectsRecord};
use qc_dashboard::data::provider::{DatasetProvider, SampleProvider};

/// Days since 1970-01-01, Arrow's Date32 encoding.
fn date32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

fn defects_batch(rows: &[DefectRecord]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("Month", DataType::Utf8, false),
        Field::new("Year", DataType::Utf8, false),
        Field::new("Section", DataType::Utf8, false),
        Field::new("Factory", DataType::Utf8, false),
        Field::new("Defect_Rate", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(rows.iter().map(|r| date32(r.date)).collect::<Vec<_>>())),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.month.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.year.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.section.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.factory.as_str()))),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.defect_rate).collect::<Vec<_>>())),
    ];

    RecordBatch::try_new(schema, columns).context("building defect-rate batch")
}

fn top_defects_batch(rows: &[TopDefectsRecord]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("Section", DataType::Utf8, false),
        Field::new("Top1", DataType::Utf8, true),
        Field::new("Top2", DataType::Utf8, true),
        Field::new("Top3", DataType::Utf8, true),
    ]));

    let causes = |pick: fn(&TopDefectsRecord) -> &Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(
            rows.iter().map(|r| pick(r).as_deref()).collect::<Vec<_>>(),
        ))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(rows.iter().map(|r| date32(r.date)).collect::<Vec<_>>())),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.section.as_str()))),
        causes(|r| &r.top1),
        causes(|r| &r.top2),
        causes(|r| &r.top3),
    ];

    RecordBatch::try_new(schema, columns).context("building top-3 batch")
}

fn write_parquet(path: &str, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(Path::new(path)).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row).with_context(|| format!("writing {path}"))?;
    }
    writer.flush().with_context(|| format!("flushing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let defects = SampleProvider.load_defect_data()?;
    let top_defects = SampleProvider.load_top_defects_data()?;

    write_parquet("defect_rate.parquet", &defects_batch(&defects)?)?;
    write_parquet("top3_defects.parquet", &top_defects_batch(&top_defects)?)?;
    write_csv("defect_rate.csv", &defects)?;
    write_csv("top3_defects.csv", &top_defects)?;

    log::info!(
        "Wrote {} defect-rate rows and {} top-3 rows (parquet + csv)",
        defects.len(),
        top_defects.len()
    );
    println!("QC_DEFECT_DATA=defect_rate.parquet QC_TOP_DEFECTS_DATA=top3_defects.parquet");
    Ok(())
}
