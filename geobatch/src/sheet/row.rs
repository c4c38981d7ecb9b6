//! Address rows: an ordered, open mapping of column name to cell.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::provider::GeocodeOutcome;

/// Result column: latitude in decimal degrees.
pub const LATITUDE_COLUMN: &str = "latitude";
/// Result column: longitude in decimal degrees.
pub const LONGITUDE_COLUMN: &str = "longitude";
/// Result column: provider's display name for the match.
pub const FORMATTED_ADDRESS_COLUMN: &str = "formatted_address";
/// Result column: processing status.
pub const STATUS_COLUMN: &str = "status";

/// Result columns, in output order.
pub const RESULT_COLUMNS: [&str; 4] = [
    LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
    FORMATTED_ADDRESS_COLUMN,
    STATUS_COLUMN,
];

/// Status of a successfully geocoded row.
pub const STATUS_SUCCESS: &str = "Success";
/// Status of a row without a usable address.
pub const STATUS_NO_ADDRESS: &str = "No address";
/// Status of a row whose geocoding call kept failing.
pub const STATUS_ERROR: &str = "Error";

/// A scalar spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Returns the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Renders the cell for text output; empty cells render as "".
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

/// One record of the input sheet.
///
/// Columns keep their insertion order; setting an existing column replaces
/// the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressRow {
    cells: Vec<(String, CellValue)>,
}

impl AddressRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_cells<I, K, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new();
        for (column, value) in cells {
            row.set(column, value);
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Sets a cell, appending the column if it is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Removes a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        let index = self.cells.iter().position(|(name, _)| name == column)?;
        Some(self.cells.remove(index).1)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The geocodable address in `column`.
    ///
    /// Only non-blank text cells qualify; numbers, empty cells and missing
    /// columns yield `None`.
    pub fn address(&self, column: &str) -> Option<&str> {
        self.get(column)
            .and_then(CellValue::as_text)
            .filter(|s| !s.trim().is_empty())
    }

    /// Writes an outcome into the result columns.
    ///
    /// Absent coordinates or display name remove the column; the status is
    /// `"Success"` or the outcome's error text.
    pub fn apply_outcome(&mut self, outcome: &GeocodeOutcome) {
        self.set_optional(LATITUDE_COLUMN, outcome.latitude.map(CellValue::Number));
        self.set_optional(LONGITUDE_COLUMN, outcome.longitude.map(CellValue::Number));
        self.set_optional(
            FORMATTED_ADDRESS_COLUMN,
            outcome.formatted_address.clone().map(CellValue::Text),
        );
        let status = outcome.error.as_deref().unwrap_or(STATUS_SUCCESS);
        self.set_status(status);
    }

    fn set_optional(&mut self, column: &str, value: Option<CellValue>) {
        match value {
            Some(value) => self.set(column, value),
            None => {
                self.remove(column);
            }
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.set(STATUS_COLUMN, status);
    }

    pub fn status(&self) -> Option<&str> {
        self.get(STATUS_COLUMN).and_then(CellValue::as_text)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.get(LATITUDE_COLUMN).and_then(CellValue::as_number)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get(LONGITUDE_COLUMN).and_then(CellValue::as_number)
    }

    pub fn formatted_address(&self) -> Option<&str> {
        self.get(FORMATTED_ADDRESS_COLUMN).and_then(CellValue::as_text)
    }
}

impl Serialize for AddressRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Column-name keywords that mark an address column.
const ADDRESS_KEYWORDS: [&str; 6] = ["address", "alamat", "jalan", "jl", "lokasi", "location"];

/// Picks the address column from the first row's headers.
///
/// Returns the first header containing one of `address`, `alamat`, `jalan`,
/// `jl`, `lokasi` or `location` (case-insensitive), otherwise the first
/// header. `None` for an empty sheet.
pub fn find_address_column(rows: &[AddressRow]) -> Option<String> {
    let first = rows.first()?;
    first
        .columns()
        .find(|header| {
            let lower = header.to_lowercase();
            ADDRESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .or_else(|| first.columns().next())
        .map(str::to_string)
}
