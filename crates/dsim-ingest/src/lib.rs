//! File intake for district simulations.
//!
//! This crate accepts the CSV a user selects and prepares what the CLI needs
//! before submission.
//!
//! # Features
//!
//! - **Upload Gate**: accept only `.csv` names, within the size limit, UTF-8
//! - **CSV Reading**: header rows and Polars-backed column previews
//! - **Mapping Suggestions**: propose columns for the canonical fields
//! - **Mapping Coverage**: warn about mapped columns missing from the file
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dsim_ingest::{UploadedFile, suggest_mapping};
//!
//! let file = UploadedFile::open(Path::new("districts.csv"))?;
//! if let Some(headers) = file.headers() {
//!     let mapping = suggest_mapping(&headers).to_mapping();
//!     println!("{}", mapping.text());
//! }
//! ```

mod coverage;
mod csv;
mod error;
mod preview;
mod suggest;
mod upload;

// === Error Types ===
pub use error::{IngestError, Result};

// === Upload Gate ===
pub use upload::{MAX_UPLOAD_SIZE, UploadedFile, validate_upload_name};

// === CSV Reading ===
pub use csv::{
    CsvHeaders, check_file_size_with_limit, parse_csv_line, read_csv_headers, read_csv_table,
    validate_encoding,
};
pub use preview::{ColumnPreview, CsvPreview, preview_csv};

// === Mapping Assistance ===
pub use coverage::{MappingCoverage, mapping_coverage};
pub use suggest::{
    FIELD_ALIASES, FieldSuggestion, MIN_CONFIDENCE, MappingSuggestion, MatchKind, suggest_mapping,
};
