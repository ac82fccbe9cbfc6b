//! In-page global variables following the site's upper-case naming convention.

use crate::error::Result;
use crate::extractors::SourceExtractor;
use crate::types::DataSource;
use compact_str::CompactString;
use regex::Regex;
use std::sync::OnceLock;

static CATCH_FALLBACK: OnceLock<Regex> = OnceLock::new();

fn catch_fallback_regex() -> &'static Regex {
    CATCH_FALLBACK.get_or_init(|| {
        Regex::new(
            r#"catch\s*(?:\(\s*[\w$]*\s*\))?\s*\{\s*(?:return\s+|[\w$.]+\s*=\s*)('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?|true|false|null|undefined)"#,
        )
        .expect("Failed to compile catch fallback pattern")
    })
}

pub struct GlobalVariableExtractor {
    /// `None` when no prefixes are configured
    pattern: Option<Regex>,
    fallback_window: usize,
}

impl GlobalVariableExtractor {
    pub fn new(prefixes: &[String], fallback_window: usize) -> Result<Self> {
        let alternatives: Vec<String> = prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(p))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"\b((?:{})[A-Z0-9_]*[A-Z0-9])\b",
                alternatives.join("|")
            ))?)
        };

        Ok(Self {
            pattern,
            fallback_window,
        })
    }

    /// Literal assigned or returned by the first `catch` block in `region`.
    fn find_fallback(region: &str) -> Option<CompactString> {
        let caps = catch_fallback_regex().captures(region)?;
        let literal = caps.get(1)?.as_str();
        let unquoted = literal
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
            .unwrap_or(literal);
        Some(unquoted.into())
    }
}

impl SourceExtractor for GlobalVariableExtractor {
    fn id(&self) -> &'static str {
        "global_variable"
    }

    fn extract(&self, script: &str) -> Vec<DataSource> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let matches: Vec<_> = pattern.find_iter(script).collect();
        let mut sources: Vec<DataSource> = Vec::new();

        for (index, m) in matches.iter().enumerate() {
            // The search region stops where the next global starts so one
            // variable's catch block is not credited to another.
            let window_end = (m.end() + self.fallback_window).min(script.len());
            let region_end = matches
                .get(index + 1)
                .map_or(window_end, |next| next.start().min(window_end));
            let region = &script[m.end()..floor_char_boundary(script, region_end)];
            let fallback = Self::find_fallback(region);

            let existing = sources.iter_mut().find_map(|source| match source {
                DataSource::GlobalVariable { name, fallback } if name.as_str() == m.as_str() => {
                    Some(fallback)
                }
                _ => None,
            });

            match existing {
                Some(existing_fallback) => {
                    if existing_fallback.is_none() {
                        *existing_fallback = fallback;
                    }
                }
                None => sources.push(DataSource::global(m.as_str(), fallback)),
            }
        }

        sources
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
