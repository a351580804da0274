//! Root tab resolution from the submenu reference graph.
//!
//! A dump lists forms flat; nesting is only implied by `Ref` links. Forms no
//! link points at are roots. When exactly one root exists it is usually a
//! container wrapping the real top-level screens, so its linked forms are
//! promoted to tabs instead. That unwrap is a heuristic: a dump with a single
//! genuine tab and no wrapper gets flattened one level too far, which is why
//! it can be switched off.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use ifr_menu_core::Form;
use tracing::{debug, warn};

/// Returns root tab ids in display order.
///
/// `forms` must be in first-seen order with unique ids.
pub fn resolve_root_tabs(
    forms: &[Form],
    referenced: &BTreeSet<String>,
    unwrap_single_root: bool,
) -> Vec<String> {
    let Some(first) = forms.first() else {
        return Vec::new();
    };

    let mut roots: Vec<&Form> = forms
        .iter()
        .filter(|form| !referenced.contains(&form.id))
        .collect();
    roots.sort_by(|a, b| compare_form_ids(&a.id, &b.id));

    if roots.is_empty() {
        warn!(
            form = %first.id,
            "Every form is a submenu target; using the first form as the only tab"
        );
        return vec![first.id.clone()];
    }

    if let [wrapper] = roots.as_slice()
        && unwrap_single_root
    {
        let known: HashSet<&str> = forms.iter().map(|form| form.id.as_str()).collect();
        let mut seen = HashSet::new();
        let promoted: Vec<String> = wrapper
            .submenu_targets()
            .filter(|target| known.contains(target) && seen.insert(*target))
            .map(String::from)
            .collect();

        if promoted.is_empty() {
            debug!(form = %wrapper.id, "Single root links to no known forms; keeping it as the tab");
            return vec![wrapper.id.clone()];
        }

        debug!(form = %wrapper.id, tabs = promoted.len(), "Unwrapped single root form");
        return promoted;
    }

    roots.into_iter().map(|form| form.id.clone()).collect()
}

/// Orders form ids by numeric hex value; ids that are not hex sort last.
pub fn compare_form_ids(a: &str, b: &str) -> Ordering {
    match (parse_hex_id(a), parse_hex_id(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_hex_id(id: &str) -> Option<u128> {
    let digits = id.strip_prefix("0x").or_else(|| id.strip_prefix("0X"))?;
    u128::from_str_radix(digits, 16).ok()
}
