use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{DefectRecord, Section, TopDefectsRecord};

/// Header shared by both tables; numeric JSON values in it are epoch millis.
const DATE_COLUMN: &str = "Date";

// ---------------------------------------------------------------------------
// Cell / Table – format-neutral view of a source sheet
// ---------------------------------------------------------------------------

/// A single source cell after format-specific decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    /// Text cells are trimmed; blank text counts as empty.
    fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// One data row and its 1-based position below the header in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Cell>,
}

/// Header row plus data rows, as read from any supported file.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Index of a column, matching headers case-insensitively.
    fn column(&self, name: &'static str) -> Result<usize, DataError> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or(DataError::MissingColumn(name))
    }

    /// Keep a row unless every cell is empty. `index` is 0-based; blank
    /// rows still count toward the numbering.
    fn push_row(&mut self, index: usize, cells: Vec<Cell>) {
        if !cells.iter().all(Cell::is_empty) {
            self.rows.push(Row {
                number: index + 1,
                cells,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the defect-rate table from a file.
///
/// Required columns: `Date`, `Month`, `Year`, `Section`, `Factory`, `Defect_Rate`.
pub fn load_defects(path: &Path, sheet: Option<&str>) -> Result<Vec<DefectRecord>> {
    let table = read_table(path, sheet)?;
    defects_from_table(&table)
        .with_context(|| format!("reading defect rates from {}", path.display()))
}

/// Load the top-3-defects table from a file.
///
/// Required columns: `Date`, `Section`, `Top1`, `Top2`, `Top3`.
pub fn load_top_defects(path: &Path, sheet: Option<&str>) -> Result<Vec<TopDefectsRecord>> {
    let table = read_table(path, sheet)?;
    top_defects_from_table(&table)
        .with_context(|| format!("reading top-3 defects from {}", path.display()))
}

/// Read a file into a [`Table`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`      – header row, one record per line
/// * `.json`     – `[{ "Date": "2026-01-09", "Section": "Inline", ... }, ...]`
/// * `.parquet`  – one column per field (as written by `df.to_parquet()`)
/// * `.xlsx` / `.xls` / `.xlsm` / `.ods` – header in the first row of the sheet
///
/// `sheet` selects a worksheet by name; other formats ignore it.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        "xlsx" | "xls" | "xlsm" | "ods" => read_spreadsheet(path, sheet),
        other => Err(DataError::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Table → typed records
// ---------------------------------------------------------------------------

pub fn defects_from_table(table: &Table) -> Result<Vec<DefectRecord>, DataError> {
    let date = table.column(DATE_COLUMN)?;
    let month = table.column("Month")?;
    let year = table.column("Year")?;
    let section = table.column("Section")?;
    let factory = table.column("Factory")?;
    let rate = table.column("Defect_Rate")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(DefectRecord {
                date: cell_date(row, date, DATE_COLUMN)?,
                month: cell_label(row, month, "Month")?,
                year: cell_label(row, year, "Year")?,
                section: cell_section(row, section)?,
                factory: cell_label(row, factory, "Factory")?,
                defect_rate: cell_number(row, rate, "Defect_Rate")?,
            })
        })
        .collect()
}

pub fn top_defects_from_table(table: &Table) -> Result<Vec<TopDefectsRecord>, DataError> {
    let date = table.column(DATE_COLUMN)?;
    let section = table.column("Section")?;
    let top1 = table.column("Top1")?;
    let top2 = table.column("Top2")?;
    let top3 = table.column("Top3")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(TopDefectsRecord {
                date: cell_date(row, date, DATE_COLUMN)?,
                section: cell_section(row, section)?,
                top1: cell_optional_text(row, top1),
                top2: cell_optional_text(row, top2),
                top3: cell_optional_text(row, top3),
            })
        })
        .collect()
}

static EMPTY: Cell = Cell::Empty;

fn cell(row: &Row, idx: usize) -> &Cell {
    row.cells.get(idx).unwrap_or(&EMPTY)
}

fn invalid(row: &Row, column: &'static str, message: impl Into<String>) -> DataError {
    DataError::InvalidCell {
        row: row.number,
        column,
        message: message.into(),
    }
}

fn cell_date(row: &Row, idx: usize, column: &'static str) -> Result<NaiveDate, DataError> {
    match cell(row, idx) {
        Cell::Date(d) => Ok(*d),
        Cell::Text(s) => {
            parse_date(s).ok_or_else(|| invalid(row, column, format!("'{s}' is not a date")))
        }
        // Spreadsheet serial day number.
        Cell::Number(n) => excel_serial_to_date(*n)
            .ok_or_else(|| invalid(row, column, format!("{n} is not a date serial"))),
        Cell::Empty => Err(invalid(row, column, "empty")),
    }
}

/// Labels such as the year may arrive as numbers; `2026.0` becomes `"2026"`.
fn cell_label(row: &Row, idx: usize, column: &'static str) -> Result<String, DataError> {
    match cell(row, idx) {
        Cell::Text(s) => Ok(s.clone()),
        Cell::Number(n) if n.fract() == 0.0 => Ok(format!("{}", *n as i64)),
        Cell::Number(n) => Ok(n.to_string()),
        Cell::Date(d) => Ok(d.to_string()),
        Cell::Empty => Err(invalid(row, column, "empty")),
    }
}

/// A finite number; `nan` and `inf` are rejected whatever the source format.
fn cell_number(row: &Row, idx: usize, column: &'static str) -> Result<f64, DataError> {
    let value = match cell(row, idx) {
        Cell::Number(n) => *n,
        Cell::Text(s) => s
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(row, column, format!("'{s}' is not a number")))?,
        Cell::Date(d) => {
            return Err(invalid(row, column, format!("expected a number, got date {d}")));
        }
        Cell::Empty => return Err(invalid(row, column, "empty")),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(row, column, format!("{value} is not a number")))
    }
}

fn cell_section(row: &Row, idx: usize) -> Result<Section, DataError> {
    match cell(row, idx) {
        Cell::Text(s) => s
            .parse()
            .map_err(|e: DataError| invalid(row, "Section", e.to_string())),
        other => Err(invalid(row, "Section", format!("expected text, got {other:?}"))),
    }
}

fn cell_optional_text(row: &Row, idx: usize) -> Option<String> {
    match cell(row, idx) {
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(n) => Some(n.to_string()),
        Cell::Date(d) => Some(d.to_string()),
        Cell::Empty => None,
    }
}

/// ISO dates, with or without a time part.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..3_000_000.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut table = Table {
        headers: reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect(),
        rows: Vec::new(),
    };

    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV data row {}", index + 1))?;
        table.push_row(index, record.iter().map(Cell::from_text).collect());
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Column order follows the first object. Pandas writes datetimes as epoch
/// milliseconds, so numbers in the `Date` column are read that way.
fn read_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    json_to_table(&root)
}

fn json_to_table(root: &JsonValue) -> Result<Table> {
    let records = root.as_array().ok_or(DataError::NotARecordArray)?;

    let mut table = Table::default();
    for rec in records {
        let obj = rec.as_object().ok_or(DataError::NotARecordArray)?;
        for key in obj.keys() {
            if !table.headers.contains(key) {
                table.headers.push(key.clone());
            }
        }
    }

    for (index, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(DataError::NotARecordArray)?;
        let cells = table
            .headers
            .iter()
            .map(|h| match obj.get(h) {
                Some(val) if h.eq_ignore_ascii_case(DATE_COLUMN) => json_date_cell(val),
                Some(val) => json_to_cell(val),
                None => Cell::Empty,
            })
            .collect();
        table.push_row(index, cells);
    }

    Ok(table)
}

fn json_date_cell(val: &JsonValue) -> Cell {
    let millis = val.as_i64().or_else(|| val.as_f64().map(|f| f as i64));
    match millis.and_then(DateTime::from_timestamp_millis) {
        Some(dt) => Cell::Date(dt.date_naive()),
        None => json_to_cell(val),
    }
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_text(s),
        JsonValue::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        JsonValue::Bool(b) => Cell::Text(b.to_string()),
        JsonValue::Null => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;

    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                bail!(DataError::SheetNotFound(name.to_string()));
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(DataError::EmptyWorkbook)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };

    let mut table = Table {
        headers: header_row
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect(),
        rows: Vec::new(),
    };
    for (index, data_row) in rows.enumerate() {
        table.push_row(index, data_row.iter().map(spreadsheet_cell).collect());
    }

    Ok(table)
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => parse_date(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::from_text(s)),
        Data::DurationIso(s) => Cell::from_text(s),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Text columns map to text, numeric columns to numbers, and Arrow date /
/// timestamp columns to dates.
fn read_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table {
        headers,
        rows: Vec::new(),
    };

    let mut offset = 0;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns: Vec<Vec<Cell>> = batch
            .columns()
            .iter()
            .map(arrow_column_cells)
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            table.push_row(offset + row, columns.iter().map(|col| col[row].clone()).collect());
        }
        offset += batch.num_rows();
    }

    Ok(table)
}

/// Decode one Arrow column into cells, casting to a common type first.
fn arrow_column_cells(col: &Arc<dyn Array>) -> Result<Vec<Cell>> {
    let cells = match col.data_type() {
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates =
                cast(col.as_ref(), &DataType::Date32).context("casting column to dates")?;
            let dates = dates.as_primitive::<Date32Type>();
            (0..dates.len())
                .map(|i| {
                    if dates.is_null(i) {
                        Cell::Empty
                    } else {
                        dates.value_as_date(i).map(Cell::Date).unwrap_or(Cell::Empty)
                    }
                })
                .collect()
        }
        dt if dt.is_numeric() => {
            let numbers =
                cast(col.as_ref(), &DataType::Float64).context("casting column to floats")?;
            let numbers = numbers.as_primitive::<Float64Type>();
            (0..numbers.len())
                .map(|i| {
                    if numbers.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::Number(numbers.value(i))
                    }
                })
                .collect()
        }
        _ => {
            let text = cast(col.as_ref(), &DataType::Utf8).context("casting column to text")?;
            let text = text.as_string::<i32>();
            (0..text.len())
                .map(|i| {
                    if text.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::from_text(text.value(i))
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}
