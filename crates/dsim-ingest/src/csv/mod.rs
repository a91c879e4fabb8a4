//! CSV reading utilities.

mod header;
mod reader;

pub use header::{CsvHeaders, parse_csv_line};
pub(crate) use reader::detect_utf16_bom;
pub use reader::{check_file_size_with_limit, read_csv_headers, read_csv_table, validate_encoding};
