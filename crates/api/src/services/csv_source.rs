//! Reads semicolon separated import files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvSourceError {
    #[error("The file has no header row")]
    Empty,

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Header row plus data rows of an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvSheet {
    pub fn first_row(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Parses `;`-delimited CSV. Rows may be shorter or longer than the header.
pub fn read_sheet(bytes: &[u8]) -> Result<CsvSheet, CsvSourceError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(CsvSourceError::Empty),
    };
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvSourceError::Empty);
    }

    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(CsvSheet { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sheet() {
        let sheet = read_sheet("###;Titel (de);PLZ\n1;Café Mitte;10318\n2;\"A; B\";10115\n".as_bytes())
            .unwrap();
        assert_eq!(sheet.headers, vec!["###", "Titel (de)", "PLZ"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][1], "A; B");
        assert_eq!(sheet.first_row().unwrap()[1], "Café Mitte");
    }

    #[test]
    fn test_read_sheet_strips_bom_and_allows_ragged_rows() {
        let sheet = read_sheet(b"\xEF\xBB\xBFa;b;c\n1;2\n1;2;3;4\n").unwrap();
        assert_eq!(sheet.headers[0], "a");
        assert_eq!(sheet.rows[0].len(), 2);
        assert_eq!(sheet.rows[1].len(), 4);
    }

    #[test]
    fn test_read_sheet_empty() {
        assert!(matches!(read_sheet(b""), Err(CsvSourceError::Empty)));
    }

    #[test]
    fn test_header_only() {
        let sheet = read_sheet(b"a;b\n").unwrap();
        assert!(sheet.rows.is_empty());
        assert!(sheet.first_row().is_none());
    }
}
