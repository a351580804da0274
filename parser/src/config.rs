//! Import configuration.
//!
//! Controls how dump lines are interpreted and what presentation metadata is
//! written into the resulting [`MenuDocument`](ifr_menu_core::MenuDocument).
//! Every field has a default, so a partial (or empty) YAML file is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! parser:
//!   title_delimiter: comma
//!   placeholder_value: "Select..."
//!   honor_default_flags: false
//!   unwrap_single_root: true
//! document:
//!   title: "BIOS SETUP UTILITY"
//!   theme: "award_blue"
//!   footer_text: "F10: Save & Exit  ESC: Back"
//! ```

use std::path::Path;

use ifr_menu_core::SELECT_PLACEHOLDER;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// How a form's title is delimited on a `Form:` line.
///
/// Dump tools disagree here, and the choice changes titles containing commas
/// or parentheses, so it is explicit configuration rather than a guess.
///
/// - `Paren`: `0x.. Form: Main (0x2711)`; the title ends before the id's
///   opening parenthesis and the id is the parenthesized value.
/// - `Comma`: `0x.. Form: Main, FormId: 0x2711 {..}`; the title ends at the
///   first comma and the id is the `FormId:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum TitleDelimiter {
    #[default]
    Paren,
    Comma,
}

/// Settings controlling line interpretation and hierarchy recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub title_delimiter: TitleDelimiter,
    /// Value shown on a select until its first option is seen.
    pub placeholder_value: String,
    /// Let an option flagged `(default)` replace the first-option value.
    pub honor_default_flags: bool,
    /// Promote the children of a sole root form to tabs.
    pub unwrap_single_root: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            title_delimiter: TitleDelimiter::default(),
            placeholder_value: SELECT_PLACEHOLDER.to_string(),
            honor_default_flags: false,
            unwrap_single_root: true,
        }
    }
}

/// Presentation metadata copied into every generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: String,
    pub theme: String,
    pub footer_text: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "IMPORTED BIOS SETUP".to_string(),
            theme: "ami_grey".to_string(),
            footer_text: "v02.61 (C)Copyright 1985-202x, American Megatrends, Inc.".to_string(),
        }
    }
}

/// Top-level import configuration.
///
/// # Examples
///
/// ```
/// use ifr_menu_parser::config::{ImportConfig, TitleDelimiter};
///
/// let config = ImportConfig::from_yaml_str("parser:\n  title_delimiter: comma\n").unwrap();
/// assert_eq!(config.parser.title_delimiter, TitleDelimiter::Comma);
/// assert!(config.parser.unwrap_single_root);
/// assert_eq!(config.document.theme, "ami_grey");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub parser: ParserConfig,
    pub document: DocumentConfig,
}

impl ImportConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Io`] if the file cannot be read,
    /// [`ImportError::Yaml`] if parsing fails, or [`ImportError::Config`] if
    /// the values are unusable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ImportError::io(path, err))?;
        Self::from_yaml_str(&raw)
    }

    /// Parses configuration from YAML text. An empty document yields the
    /// defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.parser.placeholder_value.trim().is_empty() {
            return Err(ImportError::Config(
                "parser.placeholder_value cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
