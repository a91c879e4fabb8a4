//! Tests for file intake from disk.

use std::fs;

use dsim_ingest::{
    IngestError, MappingCoverage, UploadedFile, mapping_coverage, preview_csv, suggest_mapping,
};
use dsim_model::MappingConfig;
use tempfile::TempDir;

const DISTRICTS: &str = "district,state,labor_score,mobility_val,inf_index,record_date\n\
                         Pune,Maharashtra,0.42,0.8,0.1,2025-03-01\n\
                         Agra,Uttar Pradesh,0.91,0.2,0.6,2025-03-02\n";

#[test]
fn txt_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, DISTRICTS).unwrap();

    let err = UploadedFile::open(&path).unwrap_err();
    assert!(matches!(err, IngestError::NotCsv { ref name } if name == "data.txt"));
}

#[test]
fn uppercase_extension_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.CSV");
    fs::write(&path, DISTRICTS).unwrap();

    let file = UploadedFile::open(&path).unwrap();
    assert_eq!(file.name(), "data.CSV");
    assert_eq!(file.bytes(), DISTRICTS.as_bytes());
    assert_eq!(file.path(), Some(path.as_path()));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = UploadedFile::open(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn size_limit_is_enforced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.csv");
    fs::write(&path, DISTRICTS).unwrap();

    let err = UploadedFile::open_with_limit(&path, 16).unwrap_err();
    assert!(matches!(err, IngestError::FileTooLarge { max_size: 16, .. }));
}

#[test]
fn utf16_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wide.csv");
    fs::write(&path, [0xFE, 0xFF, 0, b'a']).unwrap();

    let err = UploadedFile::open(&path).unwrap_err();
    assert!(matches!(
        err,
        IngestError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
            ..
        }
    ));
}

#[test]
fn preview_and_mapping_checks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("districts.csv");
    fs::write(&path, DISTRICTS).unwrap();

    let preview = preview_csv(&path, 3).unwrap();
    assert_eq!(preview.rows, 2);
    assert_eq!(preview.columns.len(), 6);
    assert_eq!(
        preview.column("state").unwrap().samples,
        vec!["Maharashtra", "Uttar Pradesh"]
    );

    let file = UploadedFile::open(&path).unwrap();
    let headers = file.headers().unwrap();
    assert!(mapping_coverage(&MappingConfig::default(), &headers).is_clean());

    let suggestion = suggest_mapping(&headers);
    assert!(suggestion.is_complete());
    assert!(suggestion.to_mapping().is_default());

    let typo = MappingConfig::from_text(r#"{"labor": "labor_scor"}"#);
    let coverage = mapping_coverage(&typo, &headers);
    assert!(matches!(
        coverage,
        MappingCoverage::Checked { ref missing_columns, .. } if missing_columns.len() == 1
    ));
}
