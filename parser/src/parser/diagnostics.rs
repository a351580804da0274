//! Diagnostics collected while building forms from a dump.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cap on unrecognized opcode lines kept verbatim for reports.
pub const MAX_UNRESOLVED_SAMPLES: usize = 20;

/// A submenu item whose target form was never defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    /// Form containing the submenu item.
    pub form: String,
    pub target: String,
}

/// Counters and samples for a single parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    pub total_lines: usize,
    /// Lines carrying an opcode address.
    pub relevant_lines: usize,
    pub recognized_lines: usize,
    pub unresolved_lines: Vec<String>,
    /// Unrecognized opcode lines keyed by their opcode token.
    pub unknown_opcodes: BTreeMap<String, usize>,
    pub event_counts: BTreeMap<&'static str, usize>,
    /// Option lines with no open select.
    pub dropped_options: usize,
    /// Item events seen before the first form.
    pub orphan_events: usize,
    /// Subtitle/text rows whose label was empty.
    pub skipped_empty_text: usize,
    /// Form ids defined more than once (later definitions win).
    pub duplicate_forms: Vec<String>,
    pub dangling_references: Vec<DanglingReference>,
}

impl ParseDiagnostics {
    pub fn coverage(&self) -> f64 {
        if self.relevant_lines == 0 {
            return 0.0;
        }
        self.recognized_lines as f64 / self.relevant_lines as f64
    }

    pub(super) fn record_unresolved(&mut self, line: &str, opcode: Option<&str>) {
        if self.unresolved_lines.len() < MAX_UNRESOLVED_SAMPLES {
            self.unresolved_lines.push(line.trim().to_string());
        }
        let key = opcode.unwrap_or("?").to_string();
        *self.unknown_opcodes.entry(key).or_default() += 1;
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.dropped_options > 0 {
            warnings.push(format!(
                "Dropped {} option line(s) with no open setting",
                self.dropped_options
            ));
        }

        if self.orphan_events > 0 {
            warnings.push(format!(
                "Ignored {} item line(s) before the first form",
                self.orphan_events
            ));
        }

        if !self.duplicate_forms.is_empty() {
            warnings.push(format!(
                "Form id(s) defined more than once, last definition kept: {}",
                self.duplicate_forms.join(", ")
            ));
        }

        if !self.dangling_references.is_empty() {
            warnings.push(format!(
                "{} submenu link(s) point to undefined forms",
                self.dangling_references.len()
            ));
        }

        if self.event_counts.get("form_start").is_none()
            && self.unknown_opcodes.contains_key("Form")
        {
            warnings.push(
                "Form lines were present but none matched the configured title delimiter"
                    .to_string(),
            );
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_with_no_relevant_lines_is_zero() {
        assert_eq!(ParseDiagnostics::default().coverage(), 0.0);
    }

    #[test]
    fn test_unresolved_samples_are_capped() {
        let mut diagnostics = ParseDiagnostics::default();
        for idx in 0..(MAX_UNRESOLVED_SAMPLES + 5) {
            diagnostics.record_unresolved(&format!("0x{idx:X} End Form"), Some("End"));
        }
        assert_eq!(diagnostics.unresolved_lines.len(), MAX_UNRESOLVED_SAMPLES);
        assert_eq!(
            diagnostics.unknown_opcodes.get("End"),
            Some(&(MAX_UNRESOLVED_SAMPLES + 5))
        );
    }

    #[test]
    fn test_delimiter_hint_when_forms_went_unmatched() {
        let mut diagnostics = ParseDiagnostics::default();
        diagnostics.record_unresolved("0x10 Form: Main, FormId: 0x1", Some("Form"));
        assert!(
            diagnostics
                .warnings()
                .iter()
                .any(|w| w.contains("title delimiter"))
        );
    }
}
