use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::data::table::{load_table, missing_columns, unexpected_columns, HeaderMode, PaperRow};

pub const DEFAULT_PAPERS_PATH: &str = "data/papers.csv";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "paper_id",
    "year",
    "citation",
    "doi_or_url",
    "system",
    "topic_tags",
    "assumption_targeted",
    "key_findings_1",
    "key_findings_2",
    "methods",
    "model_system",
    "data_type",
    "notes",
    "confidence",
    "added_by",
    "date_added",
];

/// Fields that must carry a value on every row that is not fully blank.
pub const REQUIRED_NONEMPTY_FIELDS: &[&str] = &[
    "paper_id",
    "year",
    "citation",
    "topic_tags",
    "assumption_targeted",
    "date_added",
];

pub const ALLOWED_ASSUMPTIONS: &[&str] = &[
    "pathway_independence",
    "static_complexes",
    "single_defect_disease",
    "general",
];

/// Blank is accepted alongside the three labels.
pub const ALLOWED_CONFIDENCE: &[&str] = &["low", "medium", "high", ""];

pub const MIN_PLAUSIBLE_YEAR: i64 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i64 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    /// Prefix used on the console.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "[ERROR]",
            Self::Warning => "[WARN]",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    /// CSV row number (header is row 1); `None` for file-level diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "{} Row {row}: {}", self.severity.label(), self.message),
            None => write!(f, "{} {}", self.severity.label(), self.message),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
    /// Data rows read, blank ones included.
    pub row_count: usize,
    /// Row rule violations summed over all rows.
    pub error_count: usize,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        row: Option<usize>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            row,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn passed(&self) -> bool {
        !self.has_errors()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.with_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.with_severity(ValidationSeverity::Warning)
    }

    fn with_severity(
        &self,
        severity: ValidationSeverity,
    ) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diag| diag.severity == severity)
    }
}

/// Validate a papers CSV. Load failures become a single error diagnostic;
/// the returned report always says whether the file passed.
pub fn validate_papers_csv(path: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    let table = match load_table(path, HeaderMode::Trimmed) {
        Ok(table) => table,
        Err(err) => {
            report.push(ValidationSeverity::Error, None, err.to_string());
            return report;
        }
    };

    if !validate_header(&table.header, &mut report) {
        return report;
    }

    for (index, row) in table.rows.iter().enumerate() {
        report.row_count += 1;
        if row.is_blank() {
            continue;
        }
        let row_num = index + 2;
        let errors = validate_row(row_num, row, &mut report);
        report.error_count += errors;
    }

    if report.row_count == 0 {
        report.push(
            ValidationSeverity::Warning,
            None,
            "No rows found (header only). That is fine for now.",
        );
    }

    if report.error_count > 0 {
        let count = report.error_count;
        report.push(
            ValidationSeverity::Error,
            None,
            format!("Validation failed with {count} error(s)."),
        );
    }

    tracing::debug!(
        path = %path.display(),
        rows = report.row_count,
        errors = report.error_count,
        "validated papers csv"
    );

    report
}

/// Returns false when required columns are missing. Extra columns only warn.
pub fn validate_header(header: &[String], report: &mut ValidationReport) -> bool {
    let missing = missing_columns(REQUIRED_COLUMNS, header);
    let extra = unexpected_columns(REQUIRED_COLUMNS, header);

    if !missing.is_empty() {
        report.push(
            ValidationSeverity::Error,
            None,
            format!("Missing required columns: {}", bracketed_list(&missing)),
        );
    }
    if !extra.is_empty() {
        report.push(
            ValidationSeverity::Warning,
            None,
            format!(
                "Unexpected columns present (allowed, but check typos): {}",
                bracketed_list(&extra)
            ),
        );
    }

    missing.is_empty()
}

/// Run every row rule and return how many errors the row produced.
pub fn validate_row(row_num: usize, row: &PaperRow, report: &mut ValidationReport) -> usize {
    let mut errors = 0;
    let at = Some(row_num);

    for field in REQUIRED_NONEMPTY_FIELDS {
        if row.value(field).is_empty() {
            report.push(
                ValidationSeverity::Error,
                at,
                format!("missing value for '{field}'"),
            );
            errors += 1;
        }
    }

    let year = row.value("year");
    if !year.is_empty() {
        match parse_year(year) {
            YearValue::Integer(value)
                if (MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&value) => {}
            YearValue::Integer(_) | YearValue::Oversized => report.push(
                ValidationSeverity::Warning,
                at,
                format!("year '{year}' looks unusual"),
            ),
            YearValue::NotAnInteger => {
                report.push(
                    ValidationSeverity::Error,
                    at,
                    format!("year '{year}' is not an integer"),
                );
                errors += 1;
            }
        }
    }

    let assumption = row.value("assumption_targeted");
    if !assumption.is_empty() && !ALLOWED_ASSUMPTIONS.contains(&assumption) {
        report.push(
            ValidationSeverity::Error,
            at,
            format!(
                "assumption_targeted '{assumption}' not in {}",
                bracketed_list(&sorted(ALLOWED_ASSUMPTIONS.iter().copied()))
            ),
        );
        errors += 1;
    }

    let confidence = row.value("confidence").to_lowercase();
    if !ALLOWED_CONFIDENCE.contains(&confidence.as_str()) {
        let labels = sorted(ALLOWED_CONFIDENCE.iter().copied().filter(|c| !c.is_empty()));
        report.push(
            ValidationSeverity::Error,
            at,
            format!("confidence '{confidence}' not in {}", bracketed_list(&labels)),
        );
        errors += 1;
    }

    let tags = row.value("topic_tags");
    if !tags.is_empty() && tags.contains(',') {
        report.push(
            ValidationSeverity::Warning,
            at,
            "topic_tags contains commas. Prefer semicolons.",
        );
    }

    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearValue {
    Integer(i64),
    /// Well-formed digits too large for `i64`.
    Oversized,
    NotAnInteger,
}

/// Code points of every Unicode decimal digit zero (category Nd). Each is
/// followed by the digits one through nine.
const DECIMAL_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140,
    0x1E2F0, 0x1E950, 0x1FBF0,
];

fn decimal_digit(c: char) -> Option<u32> {
    let code = u32::from(c);
    let slot = match DECIMAL_ZEROS.binary_search(&code) {
        Ok(slot) => slot,
        Err(0) => return None,
        Err(next) => next - 1,
    };
    let offset = code - DECIMAL_ZEROS[slot];
    (offset < 10).then_some(offset)
}

/// Decimal integer with optional sign; single underscores may group digits.
/// Digits from any script count.
fn parse_year(raw: &str) -> YearValue {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'+') => (false, &raw[1..]),
        Some(b'-') => (true, &raw[1..]),
        _ => (false, raw),
    };

    let well_grouped = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__");
    if !well_grouped {
        return YearValue::NotAnInteger;
    }

    let mut value: Option<i64> = Some(0);
    for c in digits.chars().filter(|c| *c != '_') {
        let Some(digit) = decimal_digit(c) else {
            return YearValue::NotAnInteger;
        };
        value = value
            .and_then(|v| v.checked_mul(10))
            .and_then(|v| v.checked_add(i64::from(digit)));
    }

    match value {
        Some(value) if negative => YearValue::Integer(-value),
        Some(value) => YearValue::Integer(value),
        None => YearValue::Oversized,
    }
}

fn sorted<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut items: Vec<&str> = items.collect();
    items.sort_unstable();
    items
}

/// `['a', 'b']`
fn bracketed_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| format!("'{}'", item.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}
