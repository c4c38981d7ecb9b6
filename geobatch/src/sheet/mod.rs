//! Sheet model and row I/O.
//!
//! Rows are read from CSV with the first record as header. After a batch
//! run each row gains the result columns `latitude`, `longitude`,
//! `formatted_address` and `status`, written after the input columns.

mod csv;
mod row;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use self::csv::{output_columns, read_csv, read_rows, write_csv, write_json, write_rows};
pub use row::{
    find_address_column, AddressRow, CellValue, FORMATTED_ADDRESS_COLUMN, LATITUDE_COLUMN,
    LONGITUDE_COLUMN, RESULT_COLUMNS, STATUS_COLUMN, STATUS_ERROR, STATUS_NO_ADDRESS,
    STATUS_SUCCESS,
};

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "addresses_with_coordinates.csv";

/// Default output path: [`DEFAULT_OUTPUT_FILE`] next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(DEFAULT_OUTPUT_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
}

/// Errors reading or writing sheets.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Sheet has no header row")]
    NoHeaders,

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
