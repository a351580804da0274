//! Stable handles for select items.
//!
//! Renderers persist user choices keyed by a select's `id`, so the handle
//! must survive re-importing the same dump. Natural variable ids are kept
//! when unique; missing ones are derived from a digest of the item's
//! position and label, never from randomness or output order.

use std::collections::HashSet;

use ifr_menu_core::{Form, Item};
use sha2::{Digest, Sha256};

/// Gives every select item a unique id, returning how many ids were set or
/// changed.
///
/// Forms and items are visited in order. A natural id is kept the first time
/// it appears; later duplicates and synthesized ids that collide get a
/// `_2`, `_3`, ... suffix. Running the pass again changes nothing.
pub fn assign_item_ids(forms: &mut [Form]) -> usize {
    let mut used: HashSet<String> = HashSet::new();
    let mut changed = 0;

    for form in forms.iter_mut() {
        for (index, item) in form.items.iter_mut().enumerate() {
            let Item::Select { label, id, .. } = item else {
                continue;
            };

            let base = id
                .as_deref()
                .map(str::trim)
                .filter(|natural| !natural.is_empty())
                .map(String::from)
                .unwrap_or_else(|| synthesize_id(&form.id, index, label));
            let unique = claim_unique(base, &mut used);

            if id.as_deref() != Some(unique.as_str()) {
                *id = Some(unique);
                changed += 1;
            }
        }
    }

    changed
}

/// Derives a short deterministic handle for a select with no variable id.
pub fn synthesize_id(form_id: &str, index: usize, label: &str) -> String {
    let digest = Sha256::digest(format!("{form_id}\u{1f}{index}\u{1f}{label}").as_bytes());
    let hex = format!("{digest:x}");
    format!("q_{}", &hex[..10])
}

fn claim_unique(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}_{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}
