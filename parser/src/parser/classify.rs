//! Line classification for IFR dump text.
//!
//! Each dump line is tested against an ordered rule table; the first rule
//! whose pattern matches builds the [`LineEvent`]. Lines that do not start
//! with an opcode address (`0x<hex>`) are ignored before any rule runs.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::normalize::normalize_label;
use crate::config::TitleDelimiter;

/// One classified dump line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    FormStart {
        id: String,
        title: String,
    },
    SubmenuRef {
        label: String,
        target: String,
    },
    SettingStart {
        label: String,
        variable: Option<String>,
    },
    CheckboxStart {
        label: String,
        variable: Option<String>,
    },
    Option {
        label: String,
        /// The option carries a default marker after its label.
        is_default: bool,
    },
    EndOfOptions,
    Subtitle {
        label: String,
    },
    Text {
        label: String,
    },
    /// Line without an opcode address (headers, blank lines, noise).
    Ignore,
    /// Opcode line no rule recognized.
    NoMatch,
}

impl LineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FormStart { .. } => "form_start",
            Self::SubmenuRef { .. } => "submenu_ref",
            Self::SettingStart { .. } => "setting_start",
            Self::CheckboxStart { .. } => "checkbox_start",
            Self::Option { .. } => "option",
            Self::EndOfOptions => "end_of_options",
            Self::Subtitle { .. } => "subtitle",
            Self::Text { .. } => "text",
            Self::Ignore => "ignore",
            Self::NoMatch => "no_match",
        }
    }

    /// Returns `true` for events produced by a classifier rule.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Ignore | Self::NoMatch)
    }
}

type Constructor = fn(&Captures<'_>) -> LineEvent;

struct ClassifierRule {
    name: &'static str,
    pattern: Regex,
    build: Constructor,
}

impl ClassifierRule {
    fn new(name: &'static str, pattern: &str, build: Constructor) -> Self {
        // All patterns are compile-time constants. An expect() failure indicates
        // a programmer error in the pattern, not a runtime condition.
        Self {
            name,
            pattern: Regex::new(pattern).expect("static regex must compile"),
            build,
        }
    }
}

/// Ordered rule table turning dump lines into [`LineEvent`]s.
pub struct LineClassifier {
    rules: Vec<ClassifierRule>,
}

static PAREN_CLASSIFIER: LazyLock<LineClassifier> =
    LazyLock::new(|| LineClassifier::new(TitleDelimiter::Paren));
static COMMA_CLASSIFIER: LazyLock<LineClassifier> =
    LazyLock::new(|| LineClassifier::new(TitleDelimiter::Comma));

// Field values such as `Variable: 0x12` or `Value (8 bit): 0x1`.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Variable|QuestionId|FormId|Value)\s*(?:\([^)]*\))?\s*:\s*(0x[0-9A-Fa-f]+)")
        .expect("static regex must compile")
});
static DEFAULT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdefault\b").expect("static regex must compile"));

const ADDRESS: &str = r"^0x[0-9A-Fa-f]+\s+";

impl LineClassifier {
    /// Builds the rule table for the given form-title delimiter.
    pub fn new(delimiter: TitleDelimiter) -> Self {
        let form = match delimiter {
            TitleDelimiter::Paren => ClassifierRule::new(
                "form",
                &format!(r"{ADDRESS}Form:\s*(?P<title>.*?)\s*\((?P<id>0x[0-9A-Fa-f]+)\)"),
                build_form,
            ),
            TitleDelimiter::Comma => ClassifierRule::new(
                "form",
                &format!(
                    r"{ADDRESS}Form:\s*(?P<title>[^,]*?)\s*,.*?\bFormId:\s*(?P<id>0x[0-9A-Fa-f]+)"
                ),
                build_form,
            ),
        };

        let rules = vec![
            form,
            ClassifierRule::new(
                "ref",
                &format!(r"{ADDRESS}Ref:\s*(?P<rest>.*?)\bFormId:\s*(?P<target>0x[0-9A-Fa-f]+)"),
                build_ref,
            ),
            ClassifierRule::new(
                "one_of",
                &format!(r"{ADDRESS}(?:OneOf|Setting):\s*(?P<rest>.*)$"),
                build_setting,
            ),
            ClassifierRule::new(
                "check_box",
                &format!(r"{ADDRESS}CheckBox:\s*(?P<rest>.*)$"),
                build_checkbox,
            ),
            ClassifierRule::new(
                "option",
                &format!(r"{ADDRESS}(?:OneOfOption|Option):\s*(?P<rest>.*)$"),
                build_option,
            ),
            ClassifierRule::new(
                "end_of_options",
                &format!(r"{ADDRESS}End of Options\b"),
                |_| LineEvent::EndOfOptions,
            ),
            ClassifierRule::new(
                "subtitle",
                &format!(r"{ADDRESS}Subtitle:\s*(?:Statement\.Prompt:\s*)?(?P<rest>.*)$"),
                build_subtitle,
            ),
            ClassifierRule::new(
                "text",
                &format!(r"{ADDRESS}Text:\s*(?:Statement\.Prompt:\s*)?(?P<rest>.*)$"),
                build_text,
            ),
        ];

        Self { rules }
    }

    /// Returns the shared classifier for `delimiter`, compiled once per process.
    pub fn shared(delimiter: TitleDelimiter) -> &'static LineClassifier {
        match delimiter {
            TitleDelimiter::Paren => &PAREN_CLASSIFIER,
            TitleDelimiter::Comma => &COMMA_CLASSIFIER,
        }
    }

    /// Rule names in precedence order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }

    /// Returns the name of the first rule matching `line`, if any.
    pub fn matching_rule(&self, line: &str) -> Option<&'static str> {
        let trimmed = line.trim();
        if !has_opcode_prefix(trimmed) {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(trimmed))
            .map(|rule| rule.name)
    }

    /// Classifies one dump line.
    pub fn classify(&self, line: &str) -> LineEvent {
        let trimmed = line.trim();
        if !has_opcode_prefix(trimmed) {
            return LineEvent::Ignore;
        }

        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(trimmed) {
                return (rule.build)(&caps);
            }
        }
        LineEvent::NoMatch
    }
}

/// Returns `true` when `trimmed` starts with an opcode address like `0x1A2B`.
pub fn has_opcode_prefix(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("0x")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|ch| ch.is_ascii_hexdigit())
}

/// Returns the text before the first comma.
fn first_field(rest: &str) -> &str {
    rest.split(',').next().unwrap_or_default()
}

fn hex_field(rest: &str, name: &str) -> Option<String> {
    FIELD_RE
        .captures_iter(rest)
        .find(|caps| &caps[1] == name)
        .map(|caps| caps[2].to_string())
}

fn capture<'a>(caps: &'a Captures<'_>, name: &str) -> &'a str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn build_form(caps: &Captures<'_>) -> LineEvent {
    LineEvent::FormStart {
        id: capture(caps, "id").to_string(),
        title: normalize_label(capture(caps, "title")),
    }
}

fn build_ref(caps: &Captures<'_>) -> LineEvent {
    LineEvent::SubmenuRef {
        label: normalize_label(first_field(capture(caps, "rest"))),
        target: capture(caps, "target").to_string(),
    }
}

fn variable_of(rest: &str) -> Option<String> {
    hex_field(rest, "Variable").or_else(|| hex_field(rest, "QuestionId"))
}

fn build_setting(caps: &Captures<'_>) -> LineEvent {
    let rest = capture(caps, "rest");
    LineEvent::SettingStart {
        label: normalize_label(first_field(rest)),
        variable: variable_of(rest),
    }
}

fn build_checkbox(caps: &Captures<'_>) -> LineEvent {
    let rest = capture(caps, "rest");
    LineEvent::CheckboxStart {
        label: normalize_label(first_field(rest)),
        variable: variable_of(rest),
    }
}

fn build_option(caps: &Captures<'_>) -> LineEvent {
    let rest = capture(caps, "rest");
    let is_default = rest
        .split_once(',')
        .is_some_and(|(_, tail)| DEFAULT_MARKER_RE.is_match(tail));
    LineEvent::Option {
        label: normalize_label(first_field(rest)),
        is_default,
    }
}

fn build_subtitle(caps: &Captures<'_>) -> LineEvent {
    LineEvent::Subtitle {
        label: normalize_label(first_field(capture(caps, "rest"))),
    }
}

fn build_text(caps: &Captures<'_>) -> LineEvent {
    LineEvent::Text {
        label: normalize_label(first_field(capture(caps, "rest"))),
    }
}
