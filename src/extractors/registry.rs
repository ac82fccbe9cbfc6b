use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::extractors::{standard_extractors, SourceExtractor};
use crate::types::DataSource;
use std::sync::Arc;

/// Ordered set of extractors run over every script body.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn SourceExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut registry = Self::new();
        for extractor in standard_extractors(config)? {
            registry.register(extractor);
        }
        Ok(registry)
    }

    /// Add an extractor. An extractor with the same id is replaced in place.
    pub fn register(&mut self, extractor: Arc<dyn SourceExtractor>) {
        match self.extractors.iter().position(|e| e.id() == extractor.id()) {
            Some(index) => self.extractors[index] = extractor,
            None => self.extractors.push(extractor),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn SourceExtractor>> {
        self.extractors.iter().find(|e| e.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.id()).collect()
    }

    /// Union of every extractor's results, in registration order.
    pub fn extract_all(&self, script: &str) -> Vec<DataSource> {
        self.extractors
            .iter()
            .flat_map(|extractor| extractor.extract(script))
            .collect()
    }
}
