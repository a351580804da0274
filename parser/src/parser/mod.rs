//! IFR dump parser.
//!
//! Turns the flat text rendering of a firmware setup database into forms and
//! items. Parsing runs in two phases:
//!
//! 1. **Building**: every line is classified into a [`LineEvent`] and fed to a
//!    small state machine ([`IfrParser`]) that appends items to the form
//!    currently open. Nothing here can fail; lines that do not fit are
//!    counted in [`ParseDiagnostics`] and skipped.
//! 2. **Resolving**: once all forms are known, [`ParsedDump::into_document`]
//!    decides which forms are root tabs, assigns select ids and splits the
//!    forms into a [`MenuDocument`].
//!
//! Most callers should use [`parse_ifr_dump`](crate::parse_ifr_dump) instead
//! of driving the parser directly.

mod classify;
mod diagnostics;
mod hierarchy;
mod identity;
mod normalize;

use std::collections::{BTreeSet, HashMap};

use ifr_menu_core::{Form, Item, MenuDocument};
use tracing::debug;

use crate::config::{ImportConfig, ParserConfig};

pub use classify::{LineClassifier, LineEvent, has_opcode_prefix};
pub use diagnostics::{DanglingReference, MAX_UNRESOLVED_SAMPLES, ParseDiagnostics};
pub use hierarchy::{compare_form_ids, resolve_root_tabs};
pub use identity::{assign_item_ids, synthesize_id};
pub use normalize::{normalize_label, split_dump_lines};

/// Position of the builder inside the form list.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    /// Index of the form receiving items.
    form: Option<usize>,
    /// Index (within that form) of the select receiving options.
    item: Option<usize>,
}

/// Stateful line-by-line builder.
///
/// # Examples
///
/// ```
/// use ifr_menu_parser::config::ParserConfig;
/// use ifr_menu_parser::parser::IfrParser;
///
/// let mut parser = IfrParser::new(&ParserConfig::default());
/// parser.feed_line("0x10 Form: Main (0x2)");
/// parser.feed_line("0x11 OneOf: Boot Mode, Variable: 0x10");
/// parser.feed_line("0x12 OneOfOption: UEFI, Value: 0x0");
/// let dump = parser.finish();
///
/// assert_eq!(dump.forms.len(), 1);
/// assert_eq!(dump.forms[0].items[0].value(), Some("UEFI"));
/// ```
pub struct IfrParser {
    config: ParserConfig,
    classifier: &'static LineClassifier,
    forms: Vec<Form>,
    form_index: HashMap<String, usize>,
    cursor: Cursor,
    referenced: BTreeSet<String>,
    diagnostics: ParseDiagnostics,
}

impl IfrParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            config: config.clone(),
            classifier: LineClassifier::shared(config.title_delimiter),
            forms: Vec::new(),
            form_index: HashMap::new(),
            cursor: Cursor::default(),
            referenced: BTreeSet::new(),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    /// Parses a complete dump.
    pub fn parse(mut self, text: &str) -> ParsedDump {
        for line in split_dump_lines(text) {
            self.feed_line(&line);
        }
        self.finish()
    }

    /// Classifies one line and applies it to the builder state.
    pub fn feed_line(&mut self, line: &str) {
        self.diagnostics.total_lines += 1;

        let event = self.classifier.classify(line);
        if has_opcode_prefix(line.trim()) {
            self.diagnostics.relevant_lines += 1;
        }

        if event.is_recognized() {
            self.diagnostics.recognized_lines += 1;
            *self.diagnostics.event_counts.entry(event.name()).or_default() += 1;
        } else if event == LineEvent::NoMatch {
            self.diagnostics.record_unresolved(line, opcode_token(line));
        }

        self.apply(event);
    }

    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    fn apply(&mut self, event: LineEvent) {
        if let LineEvent::FormStart { id, title } = event {
            self.start_form(id, title);
            return;
        }
        if !event.is_recognized() {
            return;
        }

        let Some(form_idx) = self.cursor.form else {
            self.diagnostics.orphan_events += 1;
            return;
        };
        let form = &mut self.forms[form_idx];

        match event {
            LineEvent::SubmenuRef { label, target } => {
                self.referenced.insert(target.clone());
                form.items.push(Item::submenu(label, target));
                self.cursor.item = None;
            }
            LineEvent::SettingStart { label, variable } => {
                form.items.push(Item::select(
                    label,
                    variable.as_deref(),
                    &self.config.placeholder_value,
                ));
                self.cursor.item = Some(form.items.len() - 1);
            }
            LineEvent::CheckboxStart { label, variable } => {
                form.items.push(Item::checkbox(label, variable.as_deref()));
                self.cursor.item = Some(form.items.len() - 1);
            }
            LineEvent::Option { label, is_default } => {
                let open = match self.cursor.item {
                    Some(idx) => form.items.get_mut(idx),
                    None => None,
                };
                let Some(Item::Select { value, options, .. }) = open else {
                    self.diagnostics.dropped_options += 1;
                    return;
                };
                if options.is_empty() || (is_default && self.config.honor_default_flags) {
                    *value = label.clone();
                }
                options.push(label);
            }
            LineEvent::EndOfOptions => self.cursor.item = None,
            LineEvent::Subtitle { label } | LineEvent::Text { label } => {
                self.cursor.item = None;
                if label.is_empty() {
                    self.diagnostics.skipped_empty_text += 1;
                } else {
                    form.items.push(Item::text(label));
                }
            }
            LineEvent::FormStart { .. } | LineEvent::Ignore | LineEvent::NoMatch => {}
        }
    }

    fn start_form(&mut self, id: String, title: String) {
        let form = Form::new(id.clone(), title);
        let idx = match self.form_index.get(&id) {
            Some(&idx) => {
                if !self.diagnostics.duplicate_forms.contains(&id) {
                    self.diagnostics.duplicate_forms.push(id);
                }
                self.forms[idx] = form;
                idx
            }
            None => {
                self.forms.push(form);
                let idx = self.forms.len() - 1;
                self.form_index.insert(id, idx);
                idx
            }
        };
        self.cursor = Cursor {
            form: Some(idx),
            item: None,
        };
    }

    /// Ends the build phase.
    pub fn finish(mut self) -> ParsedDump {
        for form in &self.forms {
            for target in form.submenu_targets() {
                if !self.form_index.contains_key(target) {
                    self.diagnostics.dangling_references.push(DanglingReference {
                        form: form.id.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        debug!(
            forms = self.forms.len(),
            referenced = self.referenced.len(),
            lines = self.diagnostics.total_lines,
            recognized = self.diagnostics.recognized_lines,
            dropped_options = self.diagnostics.dropped_options,
            dangling = self.diagnostics.dangling_references.len(),
            "Finished building forms"
        );

        ParsedDump {
            forms: self.forms,
            referenced_form_ids: self.referenced,
            diagnostics: self.diagnostics,
        }
    }
}

/// Output of the build phase.
#[derive(Debug, Clone)]
pub struct ParsedDump {
    /// Forms in first-seen order, unique by id.
    pub forms: Vec<Form>,
    /// Every submenu target seen, including targets of forms that were later
    /// redefined.
    pub referenced_form_ids: BTreeSet<String>,
    pub diagnostics: ParseDiagnostics,
}

impl ParsedDump {
    /// Resolves root tab ids in display order.
    pub fn root_tab_ids(&self, unwrap_single_root: bool) -> Vec<String> {
        resolve_root_tabs(&self.forms, &self.referenced_form_ids, unwrap_single_root)
    }

    /// Assembles the document, or `None` when the dump held no forms.
    ///
    /// Runs hierarchy resolution and the select id pass. Tabs keep the
    /// resolved order; every other form becomes a submenu in first-seen
    /// order.
    pub fn into_document(self, config: &ImportConfig) -> Option<MenuDocument> {
        if self.forms.is_empty() {
            return None;
        }

        let tab_ids = self.root_tab_ids(config.parser.unwrap_single_root);
        let mut forms = self.forms;
        let assigned = assign_item_ids(&mut forms);
        debug!(tabs = tab_ids.len(), assigned, "Resolved document hierarchy");

        let position: HashMap<String, usize> = forms
            .iter()
            .enumerate()
            .map(|(idx, form)| (form.id.clone(), idx))
            .collect();
        let mut slots: Vec<Option<Form>> = forms.into_iter().map(Some).collect();

        let mut document = MenuDocument::new(
            config.document.title.as_str(),
            config.document.theme.as_str(),
            config.document.footer_text.as_str(),
        );
        for id in &tab_ids {
            if let Some(form) = position.get(id).and_then(|&idx| slots[idx].take()) {
                document.tabs.push(form);
            }
        }
        document.submenus = slots.into_iter().flatten().collect();

        Some(document)
    }
}

/// Returns the opcode name of an address-prefixed line (`0x1F End Form` →
/// `End`).
fn opcode_token(line: &str) -> Option<&str> {
    let mut parts = line.split_whitespace();
    parts.next()?;
    let token = parts.next()?.trim_end_matches(':');
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use ifr_menu_core::ItemKind;

    use super::*;

    fn parse(text: &str) -> ParsedDump {
        IfrParser::new(&ParserConfig::default()).parse(text)
    }

    #[test]
    fn test_settings_collect_options_and_first_value() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n\
             0x11 OneOf: Boot Mode, Variable: 0x10\n\
             0x12 OneOfOption: UEFI, Value: 0x0\n\
             0x13 OneOfOption: Legacy, Value: 0x1\n\
             0x14 End of Options\n",
        );
        let item = &dump.forms[0].items[0];
        assert_eq!(item.value(), Some("UEFI"));
        assert_eq!(item.options().map(<[String]>::len), Some(2));
        assert_eq!(item.select_id(), Some("0x10"));
    }

    #[test]
    fn test_select_without_options_keeps_placeholder() {
        let dump = parse("0x10 Form: Main (0x2)\n0x11 OneOf: Empty, Variable: 0x3\n");
        assert_eq!(dump.forms[0].items[0].value(), Some("Select..."));
    }

    #[test]
    fn test_option_after_end_of_options_is_dropped() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n\
             0x11 OneOf: Boot Mode, Variable: 0x10\n\
             0x12 OneOfOption: UEFI, Value: 0x0\n\
             0x13 End of Options\n\
             0x14 OneOfOption: Stray, Value: 0x1\n",
        );
        assert_eq!(dump.forms[0].items[0].options().map(<[String]>::len), Some(1));
        assert_eq!(dump.diagnostics.dropped_options, 1);
    }

    #[test]
    fn test_text_and_submenu_close_the_open_select() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n\
             0x11 OneOf: A, Variable: 0x10\n\
             0x12 Text: Info\n\
             0x13 OneOfOption: Lost, Value: 0x0\n\
             0x14 OneOf: B, Variable: 0x11\n\
             0x15 Ref: CPU, FormId: 0x4\n\
             0x16 OneOfOption: Lost too, Value: 0x0\n",
        );
        assert_eq!(dump.diagnostics.dropped_options, 2);
        assert_eq!(dump.forms[0].items.len(), 4);
    }

    #[test]
    fn test_new_form_closes_unterminated_select() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n\
             0x11 OneOf: Boot Mode, Variable: 0x10\n\
             0x12 OneOfOption: UEFI, Value: 0x0\n\
             0x13 Form: Boot (0x3)\n\
             0x14 OneOfOption: Stray, Value: 0x1\n",
        );
        assert_eq!(dump.forms.len(), 2);
        assert_eq!(
            dump.forms[0].items[0].options(),
            Some(&["UEFI".to_string()][..])
        );
        assert!(dump.forms[1].items.is_empty());
        assert_eq!(dump.diagnostics.dropped_options, 1);
    }

    #[test]
    fn test_diagnostics_track_fed_lines() {
        let mut parser = IfrParser::new(&ParserConfig::default());
        parser.feed_line("0x10 Form: Main (0x2)");
        parser.feed_line("0x11 OneOfOption: Stray, Value: 0x1");
        assert_eq!(parser.diagnostics().total_lines, 2);
        assert_eq!(parser.diagnostics().dropped_options, 1);

        parser.feed_line("0x12 Text: Info");
        assert_eq!(parser.diagnostics().recognized_lines, 3);
        assert_eq!(parser.finish().forms[0].items.len(), 1);
    }

    #[test]
    fn test_checkbox_keeps_disabled_value() {
        let dump = parse("0x10 Form: Main (0x2)\n0x11 CheckBox: Fast Boot, Variable: 0x5\n");
        let item = &dump.forms[0].items[0];
        assert_eq!(item.value(), Some("Disabled"));
        assert_eq!(
            item.options(),
            Some(&["Disabled".to_string(), "Enabled".to_string()][..])
        );
    }

    #[test]
    fn test_default_flag_only_honored_when_enabled() {
        let text = "0x10 Form: Main (0x2)\n\
                    0x11 OneOf: Boot Mode, Variable: 0x10\n\
                    0x12 OneOfOption: UEFI, Value: 0x0\n\
                    0x13 OneOfOption: Legacy, Value: 0x1 (default)\n";
        assert_eq!(parse(text).forms[0].items[0].value(), Some("UEFI"));

        let config = ParserConfig {
            honor_default_flags: true,
            ..ParserConfig::default()
        };
        let dump = IfrParser::new(&config).parse(text);
        assert_eq!(dump.forms[0].items[0].value(), Some("Legacy"));
    }

    #[test]
    fn test_redefined_form_overwrites_in_place() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n\
             0x11 Ref: Old, FormId: 0x9\n\
             0x12 Form: Boot (0x3)\n\
             0x13 Form: Main v2 (0x2)\n\
             0x14 Text: Fresh\n",
        );
        assert_eq!(dump.forms.len(), 2);
        assert_eq!(dump.forms[0].title, "Main v2");
        assert_eq!(dump.forms[0].items, vec![Item::text("Fresh")]);
        assert_eq!(dump.diagnostics.duplicate_forms, vec!["0x2"]);
        // The overwritten form's link still counts as a reference.
        assert!(dump.referenced_form_ids.contains("0x9"));
    }

    #[test]
    fn test_items_before_first_form_are_orphans() {
        let dump = parse("0x1 Text: Banner\n0x2 OneOf: A, Variable: 0x1\n0x3 Form: Main (0x2)\n");
        assert_eq!(dump.diagnostics.orphan_events, 2);
        assert!(dump.forms[0].items.is_empty());
    }

    #[test]
    fn test_empty_subtitle_is_skipped() {
        let dump = parse(
            "0x10 Form: Main (0x2)\n0x11 Subtitle: Statement.Prompt: , Flags: 0x0\n0x12 Subtitle: Statement.Prompt: Info\n",
        );
        assert_eq!(dump.forms[0].count_kind(ItemKind::Text), 1);
        assert_eq!(dump.diagnostics.skipped_empty_text, 1);
    }

    #[test]
    fn test_line_statistics() {
        let dump = parse(
            "Program version: 0.3.7\n\
             \n\
             0x10 Form: Main (0x2)\n\
             0x11 Numeric: Timeout, Variable: 0x4\n\
             0x12 End Form\n",
        );
        let diagnostics = &dump.diagnostics;
        assert_eq!(diagnostics.total_lines, 5);
        assert_eq!(diagnostics.relevant_lines, 3);
        assert_eq!(diagnostics.recognized_lines, 1);
        assert_eq!(diagnostics.unknown_opcodes.get("Numeric"), Some(&1));
        assert_eq!(diagnostics.unknown_opcodes.get("End"), Some(&1));
        assert_eq!(diagnostics.event_counts.get("form_start"), Some(&1));
    }

    #[test]
    fn test_dangling_references_are_listed() {
        let dump = parse("0x10 Form: Main (0x2)\n0x11 Ref: Gone, FormId: 0x77\n");
        assert_eq!(
            dump.diagnostics.dangling_references,
            vec![DanglingReference {
                form: "0x2".into(),
                target: "0x77".into()
            }]
        );
        assert_eq!(dump.forms[0].items[0].target(), Some("0x77"));
    }

    #[test]
    fn test_into_document_splits_tabs_and_submenus() {
        let dump = parse(
            "0x10 Form: Setup (0x1)\n\
             0x11 Ref: Main, FormId: 0x2\n\
             0x12 Ref: Boot, FormId: 0x3\n\
             0x13 Form: Main (0x2)\n\
             0x14 Ref: CPU, FormId: 0x4\n\
             0x15 Form: Boot (0x3)\n\
             0x16 Form: CPU (0x4)\n\
             0x17 OneOf: Turbo, Variable: 0x20\n",
        );
        let document = dump.into_document(&ImportConfig::default()).unwrap();
        assert_eq!(document.tab_titles(), vec!["Main", "Boot"]);
        let submenus: Vec<_> = document.submenus.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(submenus, vec!["0x1", "0x4"]);
        assert_eq!(document.form_count(), 4);
        assert_eq!(document.title, "IMPORTED BIOS SETUP");
    }

    #[test]
    fn test_into_document_synthesizes_missing_ids() {
        let dump = parse("0x10 Form: Main (0x2)\n0x11 OneOf: Boot Mode\n");
        let document = dump.into_document(&ImportConfig::default()).unwrap();
        let id = document.tabs[0].items[0].select_id().unwrap();
        assert!(id.starts_with("q_"));
    }

    #[test]
    fn test_empty_dump_has_no_document() {
        let dump = parse("");
        assert!(dump.forms.is_empty());
        assert!(dump.into_document(&ImportConfig::default()).is_none());
    }

    #[test]
    fn test_opcode_token() {
        assert_eq!(opcode_token("0x2A610 End Form {29 02}"), Some("End"));
        assert_eq!(opcode_token("0x10 Numeric: Timeout"), Some("Numeric"));
        assert_eq!(opcode_token("0x10"), None);
    }
}
