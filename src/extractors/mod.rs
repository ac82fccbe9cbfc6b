//! Source extractors.
//!
//! Each extractor is a pure scan over a script body that reports the
//! primitive origins it recognizes. Extraction is pattern-based: shapes the
//! patterns do not cover are not reported. Extractors never consult other
//! variables and return an empty list when nothing matches.

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::types::DataSource;
use std::sync::Arc;

pub mod browser;
pub mod dom;
pub mod globals;
pub mod queue;
pub mod references;
pub mod registry;

pub use browser::{CookieExtractor, UrlExtractor, UserAgentExtractor};
pub use dom::DomAccessExtractor;
pub use globals::GlobalVariableExtractor;
pub use queue::QueueAccessExtractor;
pub use references::{extract_references, first_reference};
pub use registry::ExtractorRegistry;

pub trait SourceExtractor: Send + Sync {
    fn id(&self) -> &'static str;

    fn extract(&self, script: &str) -> Vec<DataSource>;
}

/// Build the standard extractor set for the given site conventions.
pub fn standard_extractors(config: &ExtractionConfig) -> Result<Vec<Arc<dyn SourceExtractor>>> {
    Ok(vec![
        Arc::new(GlobalVariableExtractor::new(
            &config.global_prefixes,
            config.fallback_window,
        )?),
        Arc::new(QueueAccessExtractor::new(
            &config.queue_names,
            &config.internal_namespaces,
        )?),
        Arc::new(DomAccessExtractor),
        Arc::new(UrlExtractor),
        Arc::new(UserAgentExtractor),
        Arc::new(CookieExtractor),
    ])
}

/// Keep only the first of each byte-identical match, preserving order.
pub(crate) fn push_unique(out: &mut Vec<DataSource>, source: DataSource) {
    if !out.contains(&source) {
        out.push(source);
    }
}
