//! DOM lookups with a literal selector, id or class name.

use crate::extractors::SourceExtractor;
use crate::types::{DataSource, DomAccess};
use regex::Regex;
use std::sync::OnceLock;

static DOM_CALL: OnceLock<Regex> = OnceLock::new();

fn dom_call_regex() -> &'static Regex {
    DOM_CALL.get_or_init(|| {
        Regex::new(
            r#"\b(querySelectorAll|querySelector|getElementById|getElementsByClassName)\s*\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
        )
        .expect("Failed to compile DOM access pattern")
    })
}

pub struct DomAccessExtractor;

impl SourceExtractor for DomAccessExtractor {
    fn id(&self) -> &'static str {
        "dom"
    }

    /// One source per call site; repeated lookups are all reported.
    fn extract(&self, script: &str) -> Vec<DataSource> {
        dom_call_regex()
            .captures_iter(script)
            .filter_map(|caps| {
                let access = match &caps[1] {
                    "getElementById" => DomAccess::Id,
                    "getElementsByClassName" => DomAccess::ClassName,
                    _ => DomAccess::Selector,
                };
                let selector = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
                Some(DataSource::Dom {
                    access,
                    selector: selector.as_str().into(),
                })
            })
            .collect()
    }
}
