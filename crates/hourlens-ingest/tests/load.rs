//! File-level ingestion tests

use std::fs;

use hourlens_core::Month;
use hourlens_ingest::{load_table, IngestError};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn loads_csv_with_renamed_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hours.csv");
    fs::write(
        &path,
        "Date,Project Name,Hou,Note\n\
         2024-01-15,Apollo,10,\n\
         2024-02-01,Apollo,5,x\n\
         2024-01-20,Gemini,3,\n\
         garbage,Gemini,99,\n\
         2024-02-11,Gemini,oops,\n",
    )
    .unwrap();

    let normalized = load_table(&path, None).unwrap();
    assert_eq!(normalized.table.len(), 4);
    assert_eq!(normalized.dropped_rows, 1);
    assert_eq!(normalized.zeroed_hours, 1);
    assert_eq!(normalized.table.total_hours(), 18.0);
    assert_eq!(
        normalized.table.months_in(2024).into_iter().collect::<Vec<_>>(),
        vec![Month::January, Month::February]
    );
}

#[test]
fn missing_hours_column_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hours.csv");
    fs::write(&path, "Date,Project\n2024-01-15,Apollo\n").unwrap();

    let err = load_table(&path, None).unwrap_err();
    assert!(matches!(
        err,
        IngestError::MissingColumn {
            column: "Hours",
            ..
        }
    ));
    assert!(err.to_string().contains("Hours"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hours.json");
    fs::write(&path, "{}").unwrap();
    assert!(matches!(
        load_table(&path, None),
        Err(IngestError::UnsupportedFormat(_))
    ));
}
