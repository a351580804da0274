//! IFR dump import.
//!
//! This crate turns the textual dump of a firmware setup database (the
//! output of an IFR extractor) into a [`MenuDocument`]: root tabs, nested
//! submenus, selectable settings and informational rows, ready for a UI
//! renderer.
//!
//! # Main entry points
//!
//! - [`parse_ifr_dump`]: parse dump text already in memory.
//! - [`parse_ifr_dump_with_report`]: same, with an [`ExtractionReport`]
//!   describing coverage and everything that was skipped.
//! - [`import_file`]: read a dump file and parse it with a report.
//! - [`batch::import_batch`]: import many dump files in parallel.
//!
//! # Example
//!
//! ```
//! use ifr_menu_parser::{config::ImportConfig, parse_ifr_dump};
//!
//! let dump = "\
//! 0x2A5E0 Form: Setup (0x1)
//! 0x2A5E6   Ref: Main, FormId: 0x2
//! 0x2A600 Form: Main (0x2)
//! 0x2A606   OneOf: Boot Mode, Variable: 0x10
//! 0x2A60C     OneOfOption: UEFI, Value: 0x0
//! 0x2A612     OneOfOption: Legacy, Value: 0x1
//! 0x2A618   End of Options
//! ";
//!
//! let result = parse_ifr_dump(dump, &ImportConfig::default());
//! assert!(result.success);
//! let document = result.document.unwrap();
//! assert_eq!(document.tab_titles(), vec!["Main"]);
//! assert_eq!(document.tabs[0].items[0].value(), Some("UEFI"));
//! ```
//!
//! Content problems inside a dump never produce errors: unknown opcodes,
//! stray options and dangling links are skipped and counted in the report.
//! Only file access and configuration fail with [`ImportError`].
//!
//! [`MenuDocument`]: ifr_menu_core::MenuDocument

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod report;

use std::path::Path;

use chrono::Utc;
use ifr_menu_core::{MenuDocument, validate_document};
use tracing::{info, warn};

use config::ImportConfig;
pub use error::{ImportError, Result};
use parser::IfrParser;
use report::{ExtractionReport, FailureCode, ItemCounts};

/// Result of importing one dump.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The assembled document, absent when the dump held no forms.
    pub document: Option<MenuDocument>,
    /// Warnings encountered during parsing.
    pub warnings: Vec<String>,
    /// Whether a document was produced.
    pub success: bool,
}

/// A parse result together with its report.
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    pub result: ExtractionResult,
    pub report: ExtractionReport,
}

/// Parses dump text into a menu document.
///
/// # Examples
///
/// ```
/// use ifr_menu_parser::{config::ImportConfig, parse_ifr_dump};
///
/// let result = parse_ifr_dump("", &ImportConfig::default());
/// assert!(!result.success);
/// assert!(result.document.is_none());
/// ```
pub fn parse_ifr_dump(text: &str, config: &ImportConfig) -> ExtractionResult {
    parse_ifr_dump_with_report("<input>", text, config).result
}

/// Parses dump text and builds a full [`ExtractionReport`].
///
/// `source` names the dump in the report and in the document's `source`
/// field.
///
/// # Examples
///
/// ```
/// use ifr_menu_parser::{config::ImportConfig, parse_ifr_dump_with_report};
///
/// let dump = "0x10 Form: Main (0x2)\n0x11 Numeric: Timeout, Variable: 0x4\n";
/// let run = parse_ifr_dump_with_report("board.txt", dump, &ImportConfig::default());
/// assert!(run.report.success);
/// assert_eq!(run.report.relevant_lines, 2);
/// assert_eq!(run.report.recognized_lines, 1);
/// assert_eq!(run.report.unknown_opcodes.get("Numeric"), Some(&1));
/// ```
pub fn parse_ifr_dump_with_report(source: &str, text: &str, config: &ImportConfig) -> ExtractionRun {
    let dump = IfrParser::new(&config.parser).parse(text);
    let diagnostics = dump.diagnostics.clone();
    let mut warnings = diagnostics.warnings();

    let document = dump.into_document(config).map(|mut document| {
        document.source = Some(source.to_string());
        document
    });

    let validation_errors: Vec<String> = document
        .as_ref()
        .map(|document| {
            validate_document(document)
                .iter()
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();
    if !validation_errors.is_empty() {
        warn!(source, errors = validation_errors.len(), "Imported document failed validation");
    }

    let (success, failure_code, failure_detail) = match &document {
        Some(document) => {
            info!(
                source,
                forms = document.form_count(),
                tabs = document.tabs.len(),
                coverage = diagnostics.coverage(),
                "Imported IFR dump"
            );
            (true, None, None)
        }
        None => {
            let detail = "Dump contains no recognizable Form lines".to_string();
            warn!(source, lines = diagnostics.total_lines, "{detail}");
            warnings.push(detail.clone());
            (false, Some(FailureCode::NoForms), Some(detail))
        }
    };

    let item_counts = document
        .as_ref()
        .map(ItemCounts::from_document)
        .unwrap_or_default();

    let report = ExtractionReport {
        source: source.to_string(),
        success,
        failure_code,
        failure_detail,
        title_delimiter: config.parser.title_delimiter,
        form_count: document.as_ref().map_or(0, MenuDocument::form_count),
        tab_count: document.as_ref().map_or(0, |d| d.tabs.len()),
        submenu_count: document.as_ref().map_or(0, |d| d.submenus.len()),
        item_counts,
        total_lines: diagnostics.total_lines,
        relevant_lines: diagnostics.relevant_lines,
        recognized_lines: diagnostics.recognized_lines,
        coverage: diagnostics.coverage(),
        event_counts: diagnostics
            .event_counts
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect(),
        unknown_opcodes: diagnostics.unknown_opcodes,
        dropped_options: diagnostics.dropped_options,
        orphan_items: diagnostics.orphan_events,
        skipped_empty_text: diagnostics.skipped_empty_text,
        duplicate_forms: diagnostics.duplicate_forms,
        dangling_references: diagnostics.dangling_references,
        unresolved_lines: diagnostics.unresolved_lines,
        warnings: warnings.clone(),
        validation_errors,
    };

    ExtractionRun {
        result: ExtractionResult {
            document,
            warnings,
            success,
        },
        report,
    }
}

/// Reads a dump file and parses it with a report.
///
/// Invalid UTF-8 is replaced rather than rejected. The document's
/// `generated_at` is stamped with the current time.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if the file cannot be read.
pub fn import_file(path: impl AsRef<Path>, config: &ImportConfig) -> Result<ExtractionRun> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| ImportError::io(path, err))?;
    let text = String::from_utf8_lossy(&bytes);

    let mut run = parse_ifr_dump_with_report(&batch::source_label(path), &text, config);
    if let Some(document) = run.result.document.as_mut() {
        document.generated_at = Some(Utc::now().to_rfc3339());
    }
    Ok(run)
}

/// Loads a menu document from a JSON file.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if the file cannot be read or
/// [`ImportError::Json`] if it is not a document.
pub fn load_document(path: impl AsRef<Path>) -> Result<MenuDocument> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|err| ImportError::io(path, err))?;
    Ok(serde_json::from_str(&raw)?)
}
