//! Flattens a chain into the distinct primitive sources it bottoms out in.

use crate::types::{DataSource, VariableChain};
use rustc_hash::FxHashSet;

/// Depth-first, pre-order collection of every non-computed source in the
/// tree, deduplicated by `(type, name)` with first occurrence kept. Queue
/// reads are also told apart by queue.
///
/// Computed sources (aggregator markers and sentinels) are dropped, so a
/// cycle or depth cut never shows up as an origin.
pub fn ultimate_sources(chain: &VariableChain) -> Vec<DataSource> {
    let mut seen = FxHashSet::default();
    let mut sources = Vec::new();
    collect(chain, &mut seen, &mut sources);
    sources
}

fn collect<'a>(
    node: &'a VariableChain,
    seen: &mut FxHashSet<(&'static str, Option<&'a str>, &'a str)>,
    out: &mut Vec<DataSource>,
) {
    for source in &node.data_sources {
        if source.is_computed() {
            continue;
        }
        if seen.insert(identity(source)) {
            out.push(source.clone());
        }
    }

    for child in &node.children {
        collect(child, seen, out);
    }
}

fn identity(source: &DataSource) -> (&'static str, Option<&str>, &str) {
    let queue = match source {
        DataSource::StructuredQueueAccess { queue, .. } => queue.as_deref(),
        _ => None,
    };
    (source.type_tag(), queue, source.name())
}
