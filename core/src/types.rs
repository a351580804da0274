//! Menu type definitions for firmware setup screens.
//!
//! This module defines the data model recovered from an IFR dump: forms
//! (screens) holding an ordered list of items. The types are designed for
//! serialization with [`serde`] and are handed as-is to UI renderers.

use serde::{Deserialize, Serialize};

/// Version of the menu document contract (semver).
///
/// Embedded in every [`MenuDocument`](crate::MenuDocument) to track
/// compatibility between the importer and downstream renderers.
pub const MENU_CONTRACT_VERSION: &str = "1.0.0";

/// Value shown on a select item before any option has been attached to it.
pub const SELECT_PLACEHOLDER: &str = "Select...";

/// Option labels synthesized for a checkbox, in display order.
pub const CHECKBOX_OPTIONS: [&str; 2] = ["Disabled", "Enabled"];

/// Kind of an [`Item`], without its payload.
///
/// # Examples
///
/// ```
/// use ifr_menu_core::{Item, ItemKind};
///
/// assert_eq!(Item::text("Main").kind(), ItemKind::Text);
/// assert_eq!(ItemKind::Submenu.to_string(), "submenu");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Submenu,
    Select,
    Text,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submenu => write!(f, "submenu"),
            Self::Select => write!(f, "select"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// One row of a form.
///
/// Serialized with an internal `type` tag so renderers can dispatch on
/// `"submenu"`, `"select"` or `"text"`.
///
/// # Examples
///
/// ```
/// use ifr_menu_core::Item;
///
/// let item = Item::checkbox("Fast Boot", Some("0x12"));
/// let json = serde_json::to_value(&item).unwrap();
/// assert_eq!(json["type"], "select");
/// assert_eq!(json["value"], "Disabled");
/// assert_eq!(json["options"][1], "Enabled");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    /// Navigation link to another form.
    Submenu {
        label: String,
        /// Id of the target form. May not exist in the document.
        target: String,
    },
    /// A setting with a fixed set of choices (OneOf or checkbox).
    Select {
        label: String,
        /// Variable id from the dump, or a synthesized handle.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Displayed value; the first option unless a default was flagged.
        value: String,
        options: Vec<String>,
    },
    /// Non-interactive informational row.
    Text { label: String },
}

impl Item {
    /// Creates a submenu link.
    pub fn submenu(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Submenu {
            label: label.into(),
            target: target.into(),
        }
    }

    /// Creates an empty select item showing `placeholder` until an option
    /// arrives.
    ///
    /// # Examples
    ///
    /// ```
    /// use ifr_menu_core::{Item, SELECT_PLACEHOLDER};
    ///
    /// let item = Item::select("Boot Mode", None, SELECT_PLACEHOLDER);
    /// assert!(item.options().is_some_and(|o| o.is_empty()));
    /// assert_eq!(item.value(), Some(SELECT_PLACEHOLDER));
    /// ```
    pub fn select(label: impl Into<String>, id: Option<&str>, placeholder: &str) -> Self {
        Self::Select {
            label: label.into(),
            id: id.map(String::from),
            value: placeholder.to_string(),
            options: Vec::new(),
        }
    }

    /// Creates a boolean setting as a two-option select defaulting to
    /// `"Disabled"`.
    pub fn checkbox(label: impl Into<String>, id: Option<&str>) -> Self {
        Self::Select {
            label: label.into(),
            id: id.map(String::from),
            value: CHECKBOX_OPTIONS[0].to_string(),
            options: CHECKBOX_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates an informational text row.
    pub fn text(label: impl Into<String>) -> Self {
        Self::Text {
            label: label.into(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Submenu { .. } => ItemKind::Submenu,
            Self::Select { .. } => ItemKind::Select,
            Self::Text { .. } => ItemKind::Text,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Submenu { label, .. } | Self::Select { label, .. } | Self::Text { label } => {
                label
            }
        }
    }

    /// Returns the submenu target, if this is a submenu.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Submenu { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Returns the select id, if this is a select with an id.
    pub fn select_id(&self) -> Option<&str> {
        match self {
            Self::Select { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Select { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Select { options, .. } => Some(options),
            _ => None,
        }
    }
}

/// A setup screen: an id, a title and its rows in display order.
///
/// # Examples
///
/// ```
/// use ifr_menu_core::{Form, Item};
///
/// let form = Form::new("0x1", "Setup")
///     .with_item(Item::submenu("Main", "0x2"))
///     .with_item(Item::submenu("Advanced", "0x3"));
///
/// assert_eq!(form.submenu_targets().collect::<Vec<_>>(), vec!["0x2", "0x3"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Opaque id token from the dump (e.g. `0x2711`), kept verbatim.
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

impl Form {
    /// Creates a form with no items.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Iterates the targets of this form's submenu items, in item order.
    pub fn submenu_targets(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(Item::target)
    }

    /// Finds a select item by id.
    pub fn find_select(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.select_id() == Some(id))
    }

    /// Counts items of the given kind.
    pub fn count_kind(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|item| item.kind() == kind).count()
    }
}
