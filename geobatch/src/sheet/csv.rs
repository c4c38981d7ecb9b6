//! CSV row source and sink.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use super::row::{AddressRow, CellValue, RESULT_COLUMNS};
use super::SheetError;

/// Reads all rows of a CSV file. The first record is the header.
pub fn read_csv(path: &Path) -> Result<Vec<AddressRow>, SheetError> {
    let file = File::open(path).map_err(|e| SheetError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = read_rows(file)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded sheet");
    Ok(rows)
}

/// Reads rows from any CSV source.
///
/// Non-empty cells are kept as text, so numeric-looking addresses (house
/// numbers, postcodes) remain geocodable. Short records are padded with
/// empty cells; fields beyond the header are dropped.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<AddressRow>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SheetError::NoHeaders);
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            debug!(
                record = index + 1,
                extra = record.len() - headers.len(),
                "Dropping fields beyond header"
            );
        }

        let cells = headers.iter().enumerate().map(|(i, header)| {
            let value = match record.get(i) {
                Some(field) if !field.is_empty() => CellValue::Text(field.to_string()),
                _ => CellValue::Empty,
            };
            (header.clone(), value)
        });
        rows.push(AddressRow::from_cells(cells));
    }

    Ok(rows)
}

/// Output column order: input columns in first-appearance order, then the
/// result columns.
pub fn output_columns(rows: &[AddressRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !RESULT_COLUMNS.contains(&column) && !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }
    columns.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// Writes rows to a CSV file.
pub fn write_csv(path: &Path, rows: &[AddressRow]) -> Result<(), SheetError> {
    let file = File::create(path).map_err(|e| SheetError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_rows(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote sheet");
    Ok(())
}

/// Writes rows as CSV to any sink. Missing cells are written empty.
pub fn write_rows<W: Write>(writer: W, rows: &[AddressRow]) -> Result<(), SheetError> {
    let columns = output_columns(rows);
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(CellValue::to_field).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes rows as a JSON array of objects.
pub fn write_json(path: &Path, rows: &[AddressRow]) -> Result<(), SheetError> {
    let file = File::create(path).map_err(|e| SheetError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::to_writer_pretty(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote sheet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GeocodeOutcome;
    use crate::sheet::STATUS_NO_ADDRESS;

    const INPUT: &str = "\
id,Alamat,kode_pos
1,\"Jl. Sudirman 1, Jakarta\",10220
2,,40115
3,Jl. Asia Afrika
";

    #[test]
    fn test_read_rows() {
        let rows = read_rows(INPUT.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].address("Alamat"), Some("Jl. Sudirman 1, Jakarta"));
        // numeric-looking cells stay text
        assert_eq!(rows[0].get("kode_pos"), Some(&CellValue::Text("10220".to_string())));
        assert_eq!(rows[1].get("Alamat"), Some(&CellValue::Empty));
        // short record padded
        assert_eq!(rows[2].get("kode_pos"), Some(&CellValue::Empty));
        assert_eq!(rows[2].columns().count(), 3);
    }

    #[test]
    fn test_read_header_only() {
        let rows = read_rows("address\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_empty_input() {
        let err = read_rows("".as_bytes()).unwrap_err();
        assert!(matches!(err, SheetError::NoHeaders));
    }

    #[test]
    fn test_output_columns_puts_results_last() {
        let mut a = AddressRow::from_cells([("status", "old"), ("id", "1")]);
        a.set("address", "x");
        let b = AddressRow::from_cells([("id", "2"), ("extra", "y")]);

        assert_eq!(
            output_columns(&[a, b]),
            vec![
                "id",
                "address",
                "extra",
                "latitude",
                "longitude",
                "formatted_address",
                "status"
            ]
        );
    }

    #[test]
    fn test_write_rows_with_results() {
        let mut rows = read_rows(INPUT.as_bytes()).unwrap();
        rows[0].apply_outcome(&GeocodeOutcome::found(-6.2, 106.8, "Jakarta, Indonesia"));
        rows[1].set_status(STATUS_NO_ADDRESS);
        rows[2].apply_outcome(&GeocodeOutcome::no_results());

        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,Alamat,kode_pos,latitude,longitude,formatted_address,status"
        );
        assert_eq!(
            lines[1],
            "1,\"Jl. Sudirman 1, Jakarta\",10220,-6.2,106.8,\"Jakarta, Indonesia\",Success"
        );
        assert_eq!(lines[2], "2,,40115,,,,No address");
        assert_eq!(lines[3], "3,Jl. Asia Afrika,,,,,No results found");
    }

    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut rows = read_rows(INPUT.as_bytes()).unwrap();
        rows[0].apply_outcome(&GeocodeOutcome::found(-6.2, 106.8, "Jakarta"));
        write_csv(&path, &rows).unwrap();

        let back = read_csv(&path).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back[0].get("latitude"), Some(&CellValue::Text("-6.2".to_string())));
        assert_eq!(back[0].status(), Some("Success"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input.csv"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        let mut row = AddressRow::from_cells([("address", "Jakarta")]);
        row.apply_outcome(&GeocodeOutcome::found(-6.2, 106.8, "Jakarta"));
        write_json(&path, &[row]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["address"], "Jakarta");
        assert_eq!(value[0]["latitude"], -6.2);
        assert_eq!(value[0]["status"], "Success");
    }
}
