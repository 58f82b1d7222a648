//! Delimited text reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::{IngestError, RawSheet, RawValue};

/// Read a CSV file into a raw sheet
pub fn read_csv(path: &Path) -> Result<RawSheet, IngestError> {
    let file = File::open(path)?;
    read_csv_from(file)
}

/// Read CSV from any reader; every non-empty field stays text
pub fn read_csv_from<R: Read>(reader: R) -> Result<RawSheet, IngestError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        RawValue::Empty
                    } else {
                        RawValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    tracing::debug!(rows = rows.len(), "read delimited sheet");
    Ok(RawSheet { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_headers_and_ragged_rows() {
        let data = "Date,Project name,Hours\n2024-01-02, Apollo ,4\n2024-01-03,Gemini\n";
        let sheet = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["Date", "Project name", "Hours"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], RawValue::Text("Apollo".into()));
        assert_eq!(sheet.rows[1].len(), 2);
    }

    #[test]
    fn empty_fields_are_empty_values() {
        let data = "Date,Project,Hours\n2024-01-02,A,\n";
        let sheet = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(sheet.rows[0][2], RawValue::Empty);
    }
}
