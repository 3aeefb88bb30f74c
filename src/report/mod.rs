//! Status report over a papers index CSV.
//! Counts entries, tallies missing required fields and summarises
//! evidence level and status, then renders a markdown document.

pub mod tally;

use std::fs;
use std::path::Path;

use crate::data::table::{load_table, CsvTable, HeaderMode, PaperRow};
use crate::error::{ReportError, SchemaError};

pub use tally::Tally;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "citation_key",
    "title",
    "authors",
    "year",
    "venue",
    "doi",
    "url",
    "tags",
    "why_included",
    "evidence_level",
    "status",
    "notes",
    "full_citation",
];

/// Required columns that may be blank without counting as missing.
pub const ALLOW_EMPTY: &[&str] = &["doi", "url", "notes", "tags"];

#[derive(Debug, Clone, Default)]
pub struct StatusSummary {
    pub total: usize,
    /// Rows with at least one missing required field.
    pub rows_with_missing: usize,
    pub missing_fields: Tally,
    pub evidence_levels: Tally,
    pub statuses: Tally,
}

impl StatusSummary {
    pub fn from_rows(rows: &[PaperRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };

        for row in rows {
            let mut row_missing = false;
            for column in REQUIRED_COLUMNS {
                if ALLOW_EMPTY.contains(column) {
                    continue;
                }
                if row.value(column).is_empty() {
                    summary.missing_fields.add(column);
                    row_missing = true;
                }
            }
            if row_missing {
                summary.rows_with_missing += 1;
            }
        }

        summary.evidence_levels = non_blank_tally(rows, "evidence_level");
        summary.statuses = non_blank_tally(rows, "status");
        summary
    }
}

fn non_blank_tally(rows: &[PaperRow], column: &str) -> Tally {
    Tally::from_values(
        rows.iter()
            .map(|row| row.value(column))
            .filter(|value| !value.is_empty()),
    )
}

/// Header names are matched exactly as written; no trimming.
pub fn load_papers(path: &Path) -> Result<CsvTable, ReportError> {
    let table = load_table(path, HeaderMode::Verbatim)?;
    let missing = table.missing_columns(REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(SchemaError { missing }.into());
    }
    Ok(table)
}

/// Local time as `YYYY-MM-DD HH:MM`.
pub fn generated_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_status(summary: &StatusSummary, generated: &str) -> String {
    let mut lines: Vec<String> = vec![
        "# Repo status".to_string(),
        String::new(),
        format!("Generated: {generated}"),
        String::new(),
        "## Papers index".to_string(),
        format!("- Total entries: {}", summary.total),
        format!(
            "- Entries with missing required fields: {}",
            summary.rows_with_missing
        ),
        String::new(),
    ];

    push_section(&mut lines, "Missing fields summary", &summary.missing_fields);
    push_section(&mut lines, "Evidence level", &summary.evidence_levels);
    push_section(&mut lines, "Status", &summary.statuses);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_section(lines: &mut Vec<String>, title: &str, tally: &Tally) {
    if tally.is_empty() {
        return;
    }
    lines.push(format!("## {title}"));
    for (key, count) in tally.most_common() {
        lines.push(format!("- {key}: {count}"));
    }
    lines.push(String::new());
}

/// Load, summarise and write the report to `out_path`, replacing any existing file.
pub fn generate_report(papers_path: &Path, out_path: &Path) -> Result<StatusSummary, ReportError> {
    let table = load_papers(papers_path)?;
    let summary = StatusSummary::from_rows(&table.rows);
    let text = render_status(&summary, &generated_timestamp());

    fs::write(out_path, text).map_err(|source| ReportError::Write {
        path: out_path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        papers = %papers_path.display(),
        out = %out_path.display(),
        total = summary.total,
        rows_with_missing = summary.rows_with_missing,
        "status report written"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(overrides: &[(&str, &str)]) -> PaperRow {
        let fields = REQUIRED_COLUMNS
            .iter()
            .map(|column| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| *value)
                    .unwrap_or("filled");
                (column.to_string(), value.to_string())
            })
            .collect();
        PaperRow::new(fields)
    }

    #[test]
    fn three_row_scenario_renders_expected_sections() {
        let rows = vec![
            paper(&[("evidence_level", "high"), ("status", "read")]),
            paper(&[("evidence_level", "high"), ("title", " "), ("status", "queued")]),
            paper(&[("evidence_level", "low"), ("status", "read")]),
        ];
        let summary = StatusSummary::from_rows(&rows);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rows_with_missing, 1);

        let text = render_status(&summary, "2024-01-02 03:04");
        assert_eq!(
            text,
            "# Repo status\n\
             \n\
             Generated: 2024-01-02 03:04\n\
             \n\
             ## Papers index\n\
             - Total entries: 3\n\
             - Entries with missing required fields: 1\n\
             \n\
             ## Missing fields summary\n\
             - title: 1\n\
             \n\
             ## Evidence level\n\
             - high: 2\n\
             - low: 1\n\
             \n\
             ## Status\n\
             - read: 2\n\
             - queued: 1\n\
             \n"
        );
    }

    #[test]
    fn allow_empty_columns_never_count_as_missing() {
        let rows = vec![paper(&[("doi", ""), ("url", ""), ("notes", ""), ("tags", "")])];
        let summary = StatusSummary::from_rows(&rows);
        assert_eq!(summary.rows_with_missing, 0);
        assert!(summary.missing_fields.is_empty());

        let text = render_status(&summary, "now");
        assert!(!text.contains("## Missing fields summary"));
    }

    #[test]
    fn missing_fields_are_ranked_most_frequent_first() {
        let rows = vec![
            paper(&[("venue", "")]),
            paper(&[("authors", ""), ("venue", "")]),
            paper(&[("authors", ""), ("venue", "")]),
        ];
        let summary = StatusSummary::from_rows(&rows);
        assert_eq!(summary.rows_with_missing, 3);
        assert_eq!(
            summary.missing_fields.most_common(),
            vec![("venue", 3), ("authors", 2)]
        );
    }

    #[test]
    fn empty_index_renders_only_the_papers_section() {
        let summary = StatusSummary::from_rows(&[]);
        let text = render_status(&summary, "t");
        assert!(text.ends_with("- Entries with missing required fields: 0\n\n"));
        assert!(!text.contains("## Status"));
        assert!(!text.contains("## Evidence level"));
    }

    #[test]
    fn timestamp_has_minute_resolution() {
        let stamp = generated_timestamp();
        assert_eq!(stamp.len(), "2024-01-02 03:04".len());
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }
}
