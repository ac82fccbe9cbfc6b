//! `{{Variable Name}}` placeholder references.

use compact_str::CompactString;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{([^{}]+)\}\}").expect("Failed to compile placeholder pattern")
    })
}

/// Every referenced variable name, trimmed and deduplicated, in order of
/// first appearance.
pub fn extract_references(text: &str) -> Vec<CompactString> {
    let mut refs = Vec::new();
    extend_references(&mut refs, text);
    refs
}

/// Append the references in `text` not already present in `refs`.
pub fn extend_references(refs: &mut Vec<CompactString>, text: &str) {
    let mut seen: FxHashSet<CompactString> = refs.iter().cloned().collect();
    for caps in placeholder_regex().captures_iter(text) {
        let name = caps[1].trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.into()) {
            refs.push(name.into());
        }
    }
}

/// The first referenced name in `text`.
pub fn first_reference(text: &str) -> Option<CompactString> {
    placeholder_regex()
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .find(|name| !name.is_empty())
        .map(CompactString::from)
}
