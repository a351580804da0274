use serde::{Deserialize, Serialize};

use crate::Form;

/// Serializable menu document handed to renderers.
///
/// `tabs` holds the root tabs in display order; `submenus` holds every other
/// parsed form in the order it first appeared in the dump. Each form appears
/// exactly once across both lists, so a renderer resolves submenu targets by
/// searching both.
///
/// # Examples
///
/// ```
/// use ifr_menu_core::*;
///
/// let mut doc = MenuDocument::new("BIOS SETUP", "ami_grey", "F10: Save");
/// doc.tabs.push(Form::new("0x2", "Main").with_item(Item::submenu("CPU", "0x4")));
/// doc.submenus.push(Form::new("0x4", "CPU Configuration"));
///
/// assert_eq!(doc.form_count(), 2);
/// assert_eq!(doc.tab_titles(), vec!["Main"]);
/// assert_eq!(doc.find_form("0x4").map(|f| f.title.as_str()), Some("CPU Configuration"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuDocument {
    /// Contract version (populated from
    /// [`MENU_CONTRACT_VERSION`](crate::MENU_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Window title shown by the renderer.
    pub title: String,
    /// Renderer theme name (resolved by the renderer, not here).
    pub theme: String,
    pub footer_text: String,
    /// Name of the dump this document was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// ISO-8601 timestamp of the import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub tabs: Vec<Form>,
    #[serde(default)]
    pub submenus: Vec<Form>,
}

impl MenuDocument {
    /// Creates an empty document with presentation metadata.
    ///
    /// The `schema_version` is set from
    /// [`MENU_CONTRACT_VERSION`](crate::MENU_CONTRACT_VERSION).
    pub fn new(
        title: impl Into<String>,
        theme: impl Into<String>,
        footer_text: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: Some(crate::MENU_CONTRACT_VERSION.to_string()),
            title: title.into(),
            theme: theme.into(),
            footer_text: footer_text.into(),
            source: None,
            generated_at: None,
            tabs: Vec::new(),
            submenus: Vec::new(),
        }
    }

    /// Iterates all forms, tabs first.
    pub fn forms(&self) -> impl Iterator<Item = &Form> {
        self.tabs.iter().chain(self.submenus.iter())
    }

    /// Returns the total number of forms.
    pub fn form_count(&self) -> usize {
        self.tabs.len() + self.submenus.len()
    }

    /// Finds a form by id among tabs and submenus.
    pub fn find_form(&self, id: &str) -> Option<&Form> {
        self.forms().find(|form| form.id == id)
    }

    pub fn tab_titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|tab| tab.title.as_str()).collect()
    }
}
