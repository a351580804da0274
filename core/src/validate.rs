//! Menu document validation.
//!
//! Checks structural invariants that renderers and persisted configuration
//! rely on: every form has an id, ids are unique, and every select item has a
//! unique handle and a value drawn from its options.
//!
//! Dangling submenu targets are deliberately not reported here; they are
//! kept as inert links.
//!
//! # Examples
//!
//! ```
//! use ifr_menu_core::*;
//!
//! let mut doc = MenuDocument::new("Setup", "ami_grey", "");
//! doc.tabs.push(Form::new("0x2", "Main").with_item(Item::checkbox("Fast Boot", Some("0x5"))));
//! assert!(validate_document(&doc).is_empty());
//!
//! // Invalid: a select without an id
//! doc.tabs[0].items.push(Item::select("Boot Mode", None, SELECT_PLACEHOLDER));
//! assert!(!validate_document(&doc).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Item, MenuDocument};

/// Document validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A form id is empty or whitespace-only.
    #[error("form id cannot be empty (title: {0})")]
    EmptyFormId(String),
    /// Two forms share an id.
    #[error("duplicate form id: {0}")]
    DuplicateFormId(String),
    /// A select item has no id.
    #[error("select item '{label}' in form {form} has no id")]
    MissingSelectId { form: String, label: String },
    /// Two select items share an id.
    #[error("duplicate select id: {0}")]
    DuplicateSelectId(String),
    /// A select's value is not one of its options.
    #[error("select '{label}' in form {form} has value '{value}' outside its options")]
    ValueNotInOptions {
        form: String,
        label: String,
        value: String,
    },
}

/// Validates a menu document and returns every problem found.
pub fn validate_document(document: &MenuDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut form_ids: HashSet<&str> = HashSet::new();
    let mut select_ids: HashSet<&str> = HashSet::new();

    for form in document.forms() {
        if form.id.trim().is_empty() {
            errors.push(ValidationError::EmptyFormId(form.title.clone()));
        } else if !form_ids.insert(form.id.as_str()) {
            errors.push(ValidationError::DuplicateFormId(form.id.clone()));
        }

        for item in &form.items {
            let Item::Select {
                label,
                id,
                value,
                options,
            } = item
            else {
                continue;
            };

            match id.as_deref() {
                None => errors.push(ValidationError::MissingSelectId {
                    form: form.id.clone(),
                    label: label.clone(),
                }),
                Some(id) => {
                    if !select_ids.insert(id) {
                        errors.push(ValidationError::DuplicateSelectId(id.to_string()));
                    }
                }
            }

            if !options.is_empty() && !options.contains(value) {
                errors.push(ValidationError::ValueNotInOptions {
                    form: form.id.clone(),
                    label: label.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Form, SELECT_PLACEHOLDER};

    fn document_with(forms: Vec<Form>) -> MenuDocument {
        let mut doc = MenuDocument::new("Setup", "ami_grey", "");
        doc.tabs = forms;
        doc
    }

    #[test]
    fn test_duplicate_form_id_across_tabs_and_submenus() {
        let mut doc = document_with(vec![Form::new("0x2", "Main")]);
        doc.submenus.push(Form::new("0x2", "Main again"));

        let errors = validate_document(&doc);
        assert_eq!(errors, vec![ValidationError::DuplicateFormId("0x2".into())]);
    }

    #[test]
    fn test_duplicate_select_id_across_forms() {
        let doc = document_with(vec![
            Form::new("0x2", "Main").with_item(Item::checkbox("A", Some("0x9"))),
            Form::new("0x3", "Boot").with_item(Item::checkbox("B", Some("0x9"))),
        ]);

        let errors = validate_document(&doc);
        assert_eq!(errors, vec![ValidationError::DuplicateSelectId("0x9".into())]);
    }

    #[test]
    fn test_placeholder_value_without_options_is_valid() {
        let mut item = Item::select("Boot Mode", Some("0x1"), SELECT_PLACEHOLDER);
        let doc = document_with(vec![Form::new("0x2", "Main").with_item(item.clone())]);
        assert!(validate_document(&doc).is_empty());

        if let Item::Select { options, .. } = &mut item {
            options.push("UEFI".into());
        }
        let doc = document_with(vec![Form::new("0x2", "Main").with_item(item)]);
        assert!(matches!(
            validate_document(&doc).as_slice(),
            [ValidationError::ValueNotInOptions { .. }]
        ));
    }

    #[test]
    fn test_dangling_submenu_is_not_an_error() {
        let doc = document_with(vec![
            Form::new("0x2", "Main").with_item(Item::submenu("Missing", "0xDEAD")),
        ]);
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_empty_form_id() {
        let doc = document_with(vec![Form::new("  ", "Nameless")]);
        assert_eq!(
            validate_document(&doc),
            vec![ValidationError::EmptyFormId("Nameless".into())]
        );
    }
}
