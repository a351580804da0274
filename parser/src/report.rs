//! Structured import reporting.

use std::collections::BTreeMap;

use ifr_menu_core::{ItemKind, MenuDocument};
use serde::{Deserialize, Serialize};

use crate::config::TitleDelimiter;
use crate::parser::DanglingReference;

/// Structured failure code for imports that produced no document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// The dump contained no recognizable form.
    NoForms,
    /// The dump file could not be read.
    ReadFailed,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoForms => write!(f, "no_forms"),
            Self::ReadFailed => write!(f, "read_failed"),
        }
    }
}

/// Item totals across all forms of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub submenu: usize,
    pub select: usize,
    pub text: usize,
}

impl ItemCounts {
    pub fn from_document(document: &MenuDocument) -> Self {
        document.forms().fold(Self::default(), |counts, form| Self {
            submenu: counts.submenu + form.count_kind(ItemKind::Submenu),
            select: counts.select + form.count_kind(ItemKind::Select),
            text: counts.text + form.count_kind(ItemKind::Text),
        })
    }

    pub fn total(&self) -> usize {
        self.submenu + self.select + self.text
    }
}

/// Per-dump import report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Dump file name or caller-supplied label.
    pub source: String,
    pub success: bool,
    /// Structured failure code when no document was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<FailureCode>,
    /// Human-readable detail about the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
    pub title_delimiter: TitleDelimiter,
    pub form_count: usize,
    pub tab_count: usize,
    pub submenu_count: usize,
    pub item_counts: ItemCounts,
    pub total_lines: usize,
    /// Lines carrying an opcode address.
    pub relevant_lines: usize,
    pub recognized_lines: usize,
    pub coverage: f64,
    /// Recognized lines per event kind.
    pub event_counts: BTreeMap<String, usize>,
    /// Unrecognized opcode lines per opcode name.
    pub unknown_opcodes: BTreeMap<String, usize>,
    pub dropped_options: usize,
    /// Item lines seen before the first form.
    pub orphan_items: usize,
    pub skipped_empty_text: usize,
    pub duplicate_forms: Vec<String>,
    pub dangling_references: Vec<DanglingReference>,
    /// First unrecognized opcode lines, verbatim.
    pub unresolved_lines: Vec<String>,
    pub warnings: Vec<String>,
    pub validation_errors: Vec<String>,
}

impl ExtractionReport {
    /// Creates a report for an import that never reached the parser.
    pub fn failed(
        source: impl Into<String>,
        code: FailureCode,
        detail: impl Into<String>,
        title_delimiter: TitleDelimiter,
    ) -> Self {
        Self {
            source: source.into(),
            success: false,
            failure_code: Some(code),
            failure_detail: Some(detail.into()),
            title_delimiter,
            form_count: 0,
            tab_count: 0,
            submenu_count: 0,
            item_counts: ItemCounts::default(),
            total_lines: 0,
            relevant_lines: 0,
            recognized_lines: 0,
            coverage: 0.0,
            event_counts: BTreeMap::new(),
            unknown_opcodes: BTreeMap::new(),
            dropped_options: 0,
            orphan_items: 0,
            skipped_empty_text: 0,
            duplicate_forms: Vec::new(),
            dangling_references: Vec::new(),
            unresolved_lines: Vec::new(),
            warnings: Vec::new(),
            validation_errors: Vec::new(),
        }
    }
}

/// Combined report for a batch run, written as `import-report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReportBundle {
    /// Menu contract version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub generated_at: String,
    pub reports: Vec<ExtractionReport>,
    /// Sources that produced no document.
    pub failures: Vec<String>,
}
