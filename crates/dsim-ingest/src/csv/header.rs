//! CSV header parsing.

/// Column names from the first line of a CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvHeaders {
    /// Column names, trimmed, in file order.
    pub columns: Vec<String>,
}

impl CsvHeaders {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Parses a single header line. A leading UTF-8 BOM and a trailing `\r`
    /// are dropped.
    pub fn from_line(line: &str) -> Self {
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Self::new(parse_csv_line(line))
    }

    /// Parses the header line out of raw file contents.
    ///
    /// Returns `None` when the first line holds no column names.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let end = bytes
            .iter()
            .position(|&byte| byte == b'\n')
            .unwrap_or(bytes.len());
        let line = String::from_utf8_lossy(&bytes[..end]);
        let headers = Self::from_line(&line);
        if headers.columns.iter().all(String::is_empty) {
            return None;
        }
        Some(headers)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true if `column` is present (exact match).
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Normalizes a header value by trimming whitespace.
pub fn normalize_header(value: &str) -> String {
    value.trim().to_string()
}

/// Parses a CSV line into fields, handling quoted values.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(normalize_header(&current));
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(normalize_header(&current));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_strips_bom_and_cr() {
        let headers = CsvHeaders::from_line("\u{feff}district,state,labor_score\r");
        assert_eq!(headers.columns, vec!["district", "state", "labor_score"]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_from_bytes_reads_first_line_only() {
        let headers = CsvHeaders::from_bytes(b"a,b\n1,2\n").unwrap();
        assert_eq!(headers.columns, vec!["a", "b"]);
        assert!(headers.contains("b"));
        assert!(!headers.contains("B"));
    }

    #[test]
    fn test_from_bytes_empty() {
        assert_eq!(CsvHeaders::from_bytes(b""), None);
        assert_eq!(CsvHeaders::from_bytes(b" , \n1,2"), None);
    }

    #[test]
    fn test_parse_csv_line_simple() {
        let result = parse_csv_line("a,b,c");
        assert_eq!(result, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted() {
        let result = parse_csv_line("\"hello, world\",b,c");
        assert_eq!(result, vec!["hello, world", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_escaped_quotes() {
        let result = parse_csv_line("\"he said \"\"hello\"\"\",b");
        assert_eq!(result, vec!["he said \"hello\"", "b"]);
    }

    #[test]
    fn test_parse_csv_line_trimmed() {
        let result = parse_csv_line("  a  ,  b  ");
        assert_eq!(result, vec!["a", "b"]);
    }
}
