use thiserror::Error;

/// Failures while turning a source file into typed records.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Unknown section '{0}' (expected Inline, Endline, Final, Cutting or Embellishment)")]
    UnknownSection(String),

    #[error("Data row {row}, column '{column}': {message}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    #[error("Expected a top-level JSON array of row objects")]
    NotARecordArray,
}
