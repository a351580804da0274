//! Core menu types shared by the IFR importer and renderers.
//!
//! This crate defines the document model recovered from a firmware setup
//! dump:
//!
//! - [`Form`]: one setup screen with an ordered list of items.
//! - [`Item`]: a submenu link, a select (OneOf or checkbox), or a text row.
//! - [`MenuDocument`]: the versioned envelope holding root tabs, submenu
//!   forms and presentation metadata.
//!
//! Validation ([`validate_document`]) catches structural errors such as
//! duplicate form ids or select items without a stable handle.
//!
//! # Example
//!
//! ```
//! use ifr_menu_core::*;
//!
//! let mut doc = MenuDocument::new("BIOS SETUP UTILITY", "ami_grey", "F10: Save & Exit");
//! let mut boot = Item::select("Boot Mode", Some("0x10"), SELECT_PLACEHOLDER);
//! if let Item::Select { value, options, .. } = &mut boot {
//!     options.extend(["UEFI".to_string(), "Legacy".to_string()]);
//!     *value = "UEFI".to_string();
//! }
//! doc.tabs.push(Form::new("0x2", "Main").with_item(boot));
//!
//! assert_eq!(doc.tab_titles(), vec!["Main"]);
//! assert!(validate_document(&doc).is_empty());
//! ```

mod document;
mod types;
mod validate;

pub use document::MenuDocument;
pub use types::*;
pub use validate::{ValidationError, validate_document};
