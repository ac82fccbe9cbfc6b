//! Reads from the structured event queue.
//!
//! Two shapes are recognized: indexed access into a named queue
//! (`dataLayer[i].page_type`, `dataLayer[i]['page_type']`) and dotted access
//! into an internal-data namespace (`digitalData.page.pageInfo.pageName`).
//! Indexed reads record which queue they came from. Namespace paths keep
//! the namespace as their first segment instead.

use crate::error::Result;
use crate::extractors::{push_unique, SourceExtractor};
use crate::types::DataSource;
use regex::Regex;

const PATH: &str = r"[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*";

pub struct QueueAccessExtractor {
    indexed: Option<Regex>,
    dotted: Option<Regex>,
}

impl QueueAccessExtractor {
    pub fn new(queue_names: &[String], namespaces: &[String]) -> Result<Self> {
        let indexed = match alternation(queue_names) {
            Some(names) => Some(Regex::new(&format!(
                r#"\b({})\s*\[[^\[\]]*\]\s*(?:\.\s*({})|\[\s*['"]([^'"]+)['"]\s*\])"#,
                names, PATH
            ))?),
            None => None,
        };

        let dotted = match alternation(namespaces) {
            Some(names) => Some(Regex::new(&format!(r"\b((?:{})\.{})", names, PATH))?),
            None => None,
        };

        Ok(Self { indexed, dotted })
    }
}

fn alternation(names: &[String]) -> Option<String> {
    let escaped: Vec<String> = names
        .iter()
        .filter(|n| !n.is_empty())
        .map(|n| regex::escape(n))
        .collect();
    (!escaped.is_empty()).then(|| escaped.join("|"))
}

impl SourceExtractor for QueueAccessExtractor {
    fn id(&self) -> &'static str {
        "queue_access"
    }

    fn extract(&self, script: &str) -> Vec<DataSource> {
        let mut sources = Vec::new();

        if let Some(indexed) = &self.indexed {
            for caps in indexed.captures_iter(script) {
                if let Some(path) = caps.get(2).or_else(|| caps.get(3)) {
                    push_unique(
                        &mut sources,
                        DataSource::queue_in(&caps[1], path.as_str(), None),
                    );
                }
            }
        }

        if let Some(dotted) = &self.dotted {
            for caps in dotted.captures_iter(script) {
                push_unique(&mut sources, DataSource::namespace(&caps[1]));
            }
        }

        sources
    }
}
