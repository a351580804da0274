//! Output formatting for menu documents and reports.

use std::collections::HashSet;

use ifr_menu_core::{Form, Item, ItemKind, MenuDocument};

use crate::report::ExtractionReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

impl OutputFormat {
    /// File extension used when writing this format to disk.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "md",
            Self::Table => "txt",
        }
    }
}

/// Formats a menu document in the requested output format.
///
/// Markdown and table output are read-only outlines: each tab is listed with
/// its submenus expanded inline.
pub fn format_document(document: &MenuDocument, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(document_to_markdown(document)),
        OutputFormat::Table => Ok(document_to_table(document)),
    }
}

/// Formats an import report in the requested output format.
pub fn format_report(report: &ExtractionReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

/// One line of a tab outline.
struct OutlineRow {
    depth: usize,
    kind: ItemKind,
    label: String,
    detail: String,
}

fn outline(document: &MenuDocument, tab: &Form) -> Vec<OutlineRow> {
    let mut walk = OutlineWalk {
        document,
        path: vec![tab.id.as_str()],
        expanded: HashSet::from([tab.id.as_str()]),
        rows: Vec::new(),
    };
    walk.form(tab, 0);
    walk.rows
}

/// Expands each form at most once per tab. `path` holds the forms currently
/// being expanded so links back up the chain are told apart from links to a
/// form already listed elsewhere in the outline.
struct OutlineWalk<'a> {
    document: &'a MenuDocument,
    path: Vec<&'a str>,
    expanded: HashSet<&'a str>,
    rows: Vec<OutlineRow>,
}

impl<'a> OutlineWalk<'a> {
    fn form(&mut self, form: &'a Form, depth: usize) {
        for item in &form.items {
            let row = match item {
                Item::Submenu { label, target } => {
                    self.submenu(label, target, depth);
                    continue;
                }
                Item::Select {
                    label,
                    value,
                    options,
                    ..
                } => OutlineRow {
                    depth,
                    kind: ItemKind::Select,
                    label: label.clone(),
                    detail: if options.is_empty() {
                        value.clone()
                    } else {
                        format!("{value} [{}]", options.join(" | "))
                    },
                },
                Item::Text { label } => OutlineRow {
                    depth,
                    kind: ItemKind::Text,
                    label: label.clone(),
                    detail: String::new(),
                },
            };
            self.rows.push(row);
        }
    }

    fn submenu(&mut self, label: &str, target: &str, depth: usize) {
        let child = self.document.find_form(target);
        let detail = match child {
            None => format!("-> {target} (missing)"),
            Some(child) if self.path.contains(&child.id.as_str()) => {
                format!("-> {target} (cycle)")
            }
            Some(child) if self.expanded.contains(child.id.as_str()) => {
                format!("-> {target} (see above)")
            }
            Some(_) => format!("-> {target}"),
        };
        self.rows.push(OutlineRow {
            depth,
            kind: ItemKind::Submenu,
            label: label.to_string(),
            detail,
        });

        if let Some(child) = child
            && self.expanded.insert(child.id.as_str())
        {
            self.path.push(child.id.as_str());
            self.form(child, depth + 1);
            self.path.pop();
        }
    }
}

fn document_to_markdown(document: &MenuDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", document.title));
    out.push_str(&format!("**Theme:** {}\n\n", document.theme));
    if let Some(ref source) = document.source {
        out.push_str(&format!("**Source:** {source}\n\n"));
    }
    out.push_str(&format!(
        "**Forms:** {} ({} tabs, {} submenus)\n\n",
        document.form_count(),
        document.tabs.len(),
        document.submenus.len()
    ));

    for tab in &document.tabs {
        out.push_str(&format!("## {} (`{}`)\n\n", tab.title, tab.id));
        let rows = outline(document, tab);
        if rows.is_empty() {
            out.push_str("_No items._\n\n");
            continue;
        }
        for row in rows {
            let indent = "  ".repeat(row.depth);
            match row.kind {
                ItemKind::Submenu => {
                    out.push_str(&format!("{indent}- **{}** {}\n", row.label, row.detail));
                }
                ItemKind::Select => {
                    out.push_str(&format!("{indent}- {}: `{}`\n", row.label, row.detail));
                }
                ItemKind::Text => out.push_str(&format!("{indent}- _{}_\n", row.label)),
            }
        }
        out.push('\n');
    }

    if !document.footer_text.is_empty() {
        out.push_str(&format!("---\n\n{}\n", document.footer_text));
    }

    out
}

fn document_to_table(document: &MenuDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Menu: {}  Theme: {}  Forms: {}\n",
        document.title,
        document.theme,
        document.form_count()
    ));

    for tab in &document.tabs {
        out.push_str(&format!("\n[{}] {}\n", tab.title, tab.id));
        let rows = outline(document, tab);
        let max_label = rows
            .iter()
            .map(|row| row.label.chars().count() + row.depth * 2)
            .max()
            .unwrap_or(4);

        for row in rows {
            let label = format!("{}{}", "  ".repeat(row.depth), row.label);
            out.push_str(&format!(
                "  {:<7} {:<width$}  {}\n",
                row.kind.to_string(),
                label,
                row.detail,
                width = max_label
            ));
        }
    }

    out
}

fn report_to_markdown(report: &ExtractionReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Import Report: {}\n\n", report.source));
    out.push_str(&format!(
        "- **Success:** {}\n",
        if report.success { "yes" } else { "no" }
    ));
    out.push_str(&format!(
        "- **Forms:** {} ({} tabs, {} submenus)\n",
        report.form_count, report.tab_count, report.submenu_count
    ));
    out.push_str(&format!(
        "- **Items:** {} submenu, {} select, {} text\n",
        report.item_counts.submenu, report.item_counts.select, report.item_counts.text
    ));
    out.push_str(&format!("- **Coverage:** {:.2}\n", report.coverage));

    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("- **Failure Code:** {code}\n"));
    }
    if let Some(ref detail) = report.failure_detail {
        out.push_str(&format!("- **Failure Detail:** {detail}\n"));
    }

    if !report.unknown_opcodes.is_empty() {
        out.push_str("\n## Unrecognized Opcodes\n\n");
        out.push_str("| Opcode | Lines |\n");
        out.push_str("|--------|-------|\n");
        for (opcode, count) in &report.unknown_opcodes {
            out.push_str(&format!("| `{opcode}` | {count} |\n"));
        }
    }

    if !report.dangling_references.is_empty() {
        out.push_str("\n## Dangling References\n\n");
        for dangling in &report.dangling_references {
            out.push_str(&format!("- `{}` -> `{}`\n", dangling.form, dangling.target));
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn report_to_table(report: &ExtractionReport) -> String {
    let mut out = String::new();
    let status = if report.success { "OK" } else { "FAIL" };
    out.push_str(&format!(
        "{:<24} {:<6} forms={} tabs={} items={} cov={:.2}",
        report.source,
        status,
        report.form_count,
        report.tab_count,
        report.item_counts.total(),
        report.coverage,
    ));
    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("  [{code}]"));
    }
    out.push('\n');
    out
}
