//! Load a paper metadata CSV into a header plus ordered rows.
//! Comma delimited, standard quoting, header row mandatory.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::LoadError;

/// How header names are keyed when rows are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Surrounding whitespace is stripped from every header name.
    Trimmed,
    /// Header names are used exactly as written in the file.
    Verbatim,
}

/// One data record keyed by header name, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperRow {
    fields: Vec<(String, String)>,
    /// Cells past the end of the header.
    overflow: Vec<String>,
}

impl PaperRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self {
            fields,
            overflow: Vec::new(),
        }
    }

    /// Raw cell for `column`. With duplicate header names the last one wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed cell for `column`; absent columns read as empty.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("").trim()
    }

    /// True when every cell, overflow included, is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.trim().is_empty())
            && self.overflow.iter().all(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<PaperRow>,
}

impl CsvTable {
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        missing_columns(required, &self.header)
    }
}

/// Required columns absent from `header`, in required-list order.
pub fn missing_columns(required: &[&str], header: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|column| !header.iter().any(|name| name == *column))
        .map(|column| column.to_string())
        .collect()
}

/// Header names outside the required list, in header order.
pub fn unexpected_columns(required: &[&str], header: &[String]) -> Vec<String> {
    header
        .iter()
        .filter(|name| !required.contains(&name.as_str()))
        .cloned()
        .collect()
}

/// I/O failures while reading are not CSV syntax problems.
fn read_error(path: &Path, source: csv::Error) -> LoadError {
    if let csv::ErrorKind::Io(err) = source.kind() {
        return LoadError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(err.kind(), err.to_string()),
        };
    }
    LoadError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_table(path: &Path, mode: HeaderMode) -> Result<CsvTable, LoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let raw_header = reader
        .headers()
        .map_err(|source| read_error(path, source))?
        .clone();
    if raw_header.is_empty() {
        return Err(LoadError::NoHeader {
            path: path.to_path_buf(),
        });
    }

    let header: Vec<String> = raw_header
        .iter()
        .map(|name| match mode {
            HeaderMode::Trimmed => name.trim().to_string(),
            HeaderMode::Verbatim => name.to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| read_error(path, source))?;
        let fields = header
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), record.get(index).unwrap_or("").to_string()))
            .collect();
        let overflow = record
            .iter()
            .skip(header.len())
            .map(str::to_string)
            .collect();
        rows.push(PaperRow { fields, overflow });
    }

    tracing::debug!(
        path = %path.display(),
        columns = header.len(),
        rows = rows.len(),
        "loaded csv table"
    );

    Ok(CsvTable { header, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn load_table_reads_quoted_fields_and_embedded_newlines() {
        let file = write_fixture("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n\"multi\nline\",z\n");
        let table = load_table(file.path(), HeaderMode::Verbatim).expect("load");
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("a"), Some("x, y"));
        assert_eq!(table.rows[0].get("b"), Some("say \"hi\""));
        assert_eq!(table.rows[1].get("a"), Some("multi\nline"));
    }

    #[test]
    fn header_mode_controls_trimming_of_names() {
        let file = write_fixture(" year ,title\n2001,x\n");
        let trimmed = load_table(file.path(), HeaderMode::Trimmed).expect("load");
        assert_eq!(trimmed.header[0], "year");
        assert_eq!(trimmed.rows[0].value("year"), "2001");

        let verbatim = load_table(file.path(), HeaderMode::Verbatim).expect("load");
        assert_eq!(verbatim.header[0], " year ");
        assert_eq!(verbatim.rows[0].get("year"), None);
        assert_eq!(verbatim.rows[0].get(" year "), Some("2001"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_table(&dir.path().join("nope.csv"), HeaderMode::Trimmed)
            .expect_err("should fail");
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().starts_with("File not found: "));
    }

    #[test]
    fn directory_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_table(dir.path(), HeaderMode::Trimmed).expect_err("should fail");
        assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
        assert!(err.to_string().starts_with("unable to read '"));
    }

    #[test]
    fn malformed_utf8_is_a_csv_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"a,b\n\xff\xfe,x\n").expect("write fixture");
        let err = load_table(file.path(), HeaderMode::Trimmed).expect_err("should fail");
        assert!(matches!(err, LoadError::Csv { .. }), "got {err:?}");
    }

    #[test]
    fn empty_file_has_no_header() {
        let file = write_fixture("");
        let err = load_table(file.path(), HeaderMode::Verbatim).expect_err("should fail");
        assert!(matches!(err, LoadError::NoHeader { .. }));
        assert_eq!(err.to_string(), "CSV has no header row.");
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let file = write_fixture("a,b,c\n1\n");
        let table = load_table(file.path(), HeaderMode::Trimmed).expect("load");
        let row = &table.rows[0];
        assert_eq!(row.get("a"), Some("1"));
        assert_eq!(row.get("c"), Some(""));
        assert_eq!(row.value("not_a_column"), "");
    }

    #[test]
    fn overflow_cells_count_against_blankness() {
        let file = write_fixture("a,b\n,,extra\n , \n");
        let table = load_table(file.path(), HeaderMode::Trimmed).expect("load");
        assert!(!table.rows[0].is_blank());
        assert!(table.rows[1].is_blank());
    }

    #[test]
    fn duplicate_header_names_resolve_to_last_occurrence() {
        let row = PaperRow::new(vec![
            ("tag".to_string(), "first".to_string()),
            ("tag".to_string(), "second".to_string()),
        ]);
        assert_eq!(row.get("tag"), Some("second"));
    }

    #[test]
    fn column_set_difference_keeps_list_order() {
        let header = vec!["c".to_string(), "x".to_string(), "a".to_string()];
        assert_eq!(missing_columns(&["a", "b", "c", "d"], &header), vec!["b", "d"]);
        assert_eq!(unexpected_columns(&["a", "b", "c", "d"], &header), vec!["x"]);
    }
}
