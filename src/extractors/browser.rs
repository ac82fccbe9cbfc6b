//! Presence checks for browser-provided values.

use crate::extractors::SourceExtractor;
use crate::types::DataSource;
use regex::Regex;
use std::sync::OnceLock;

static URL_USAGE: OnceLock<Regex> = OnceLock::new();
static USER_AGENT_USAGE: OnceLock<Regex> = OnceLock::new();
static COOKIE_USAGE: OnceLock<Regex> = OnceLock::new();

pub const USER_AGENT: &str = "navigator.userAgent";
pub const DOCUMENT_COOKIE: &str = "document.cookie";

pub struct UrlExtractor;

impl SourceExtractor for UrlExtractor {
    fn id(&self) -> &'static str {
        "url"
    }

    fn extract(&self, script: &str) -> Vec<DataSource> {
        let regex = URL_USAGE.get_or_init(|| {
            Regex::new(
                r"\b(?:window\.location|document\.location|document\.URL|location\.(?:href|pathname|search|hostname|hash|host|origin))\b",
            )
            .expect("Failed to compile URL usage pattern")
        });
        if regex.is_match(script) {
            vec![DataSource::Url]
        } else {
            Vec::new()
        }
    }
}

pub struct UserAgentExtractor;

impl SourceExtractor for UserAgentExtractor {
    fn id(&self) -> &'static str {
        "user_agent"
    }

    fn extract(&self, script: &str) -> Vec<DataSource> {
        let regex = USER_AGENT_USAGE.get_or_init(|| {
            Regex::new(r"\bnavigator\.userAgent\b").expect("Failed to compile user agent pattern")
        });
        if regex.is_match(script) {
            vec![DataSource::builtin(USER_AGENT)]
        } else {
            Vec::new()
        }
    }
}

pub struct CookieExtractor;

impl SourceExtractor for CookieExtractor {
    fn id(&self) -> &'static str {
        "cookie"
    }

    fn extract(&self, script: &str) -> Vec<DataSource> {
        let regex = COOKIE_USAGE.get_or_init(|| {
            Regex::new(r"\bdocument\.cookie\b").expect("Failed to compile cookie pattern")
        });
        if regex.is_match(script) {
            vec![DataSource::Cookie {
                name: DOCUMENT_COOKIE.into(),
            }]
        } else {
            Vec::new()
        }
    }
}
