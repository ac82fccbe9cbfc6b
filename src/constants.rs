//! Constants used throughout the codebase.
//!
//! Export parameter keys and default conventions live here so the
//! interpreter and the table extractors agree on them.

/// Maximum depth for resolving variable chains before a sentinel is inserted.
pub const MAX_CHAIN_DEPTH: usize = 10;

/// Bytes scanned after a global name when looking for its `catch` fallback.
pub const FALLBACK_WINDOW: usize = 400;

/// Sentinel source names.
pub const CYCLE_DETECTED: &str = "cycle detected";
pub const MAX_DEPTH_EXCEEDED: &str = "max depth exceeded";
pub const ALREADY_EXPANDED: &str = "already expanded";

/// Config file looked up next to an export.
pub const CONFIG_FILE_NAME: &str = "taglineage.toml";

pub mod params {
    pub const JAVASCRIPT: &str = "javascript";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const DEFAULT_VALUE: &str = "defaultValue";
    pub const INPUT: &str = "input";
    pub const MAP: &str = "map";
    pub const KEY: &str = "key";
    pub const EVENT_SETTINGS_TABLE: &str = "eventSettingsTable";
    pub const USER_PROPERTIES: &str = "userProperties";
    pub const PARAMETER: &str = "parameter";
    pub const PARAMETER_VALUE: &str = "parameterValue";
    pub const SELECTOR_TYPE: &str = "selectorType";
    pub const ELEMENT_ID: &str = "elementId";
    pub const ELEMENT_SELECTOR: &str = "elementSelector";
}

pub const DEFAULT_GLOBAL_PREFIXES: &[&str] = &[
    "SITE_", "PAGE_", "USER_", "BRAND_", "APP_", "CONTENT_", "PRODUCT_", "ENV_",
];

pub const DEFAULT_QUEUE_NAME: &str = "dataLayer";
pub const DEFAULT_QUEUE_NAMES: &[&str] = &[DEFAULT_QUEUE_NAME];

pub const DEFAULT_INTERNAL_NAMESPACES: &[&str] = &["digitalData"];

pub const DEFAULT_ROUTING_TOKENS: &[&str] = &["measurement id", "tracking id", "environment"];
