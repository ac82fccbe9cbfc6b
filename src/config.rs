use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_GLOBAL_PREFIXES, DEFAULT_INTERNAL_NAMESPACES, DEFAULT_QUEUE_NAMES,
    DEFAULT_ROUTING_TOKENS, FALLBACK_WINDOW, MAX_CHAIN_DEPTH,
};
use crate::error::{LineageError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineageConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub environments: EnvironmentConfig,
}

/// Site conventions recognized when scanning script bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_global_prefixes")]
    pub global_prefixes: Vec<String>,
    #[serde(default = "default_queue_names")]
    pub queue_names: Vec<String>,
    #[serde(default = "default_internal_namespaces")]
    pub internal_namespaces: Vec<String>,
    #[serde(default = "default_fallback_window")]
    pub fallback_window: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Case-insensitive substrings that mark a lookup table as the routing table
    #[serde(default = "default_routing_tokens")]
    pub name_tokens: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            global_prefixes: default_global_prefixes(),
            queue_names: default_queue_names(),
            internal_namespaces: default_internal_namespaces(),
            fallback_window: default_fallback_window(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name_tokens: default_routing_tokens(),
        }
    }
}

pub struct ConfigManager;

impl ConfigManager {
    /// Load an explicitly named config file, which must exist.
    pub fn load_file(path: &Path) -> Result<LineageConfig> {
        if !path.is_file() {
            return Err(LineageError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::load(path)
    }

    /// Load configuration from `taglineage.toml`.
    ///
    /// `location` may be the file itself or a directory containing it. Keys
    /// absent from the file keep their defaults; a missing file yields the
    /// defaults.
    pub fn load(location: &Path) -> Result<LineageConfig> {
        let config_path = if location.is_dir() {
            location.join(CONFIG_FILE_NAME)
        } else {
            location.to_path_buf()
        };

        let mut config_json = serde_json::to_value(LineageConfig::default())
            .map_err(|e| LineageError::config(format!("Failed to serialize defaults: {}", e)))?;

        if config_path.exists() {
            let toml_content = fs::read_to_string(&config_path).map_err(|e| LineageError::Io {
                path: config_path.clone(),
                source: e,
            })?;

            let toml_value: toml::Value = toml::from_str(&toml_content)
                .map_err(|e| LineageError::config(format!("Failed to parse config: {}", e)))?;
            let toml_json = toml_to_json(&toml_value)?;

            merge_json(&mut config_json, &toml_json, "")?;
            tracing::debug!(path = %config_path.display(), "Loaded configuration");
        }

        let config: LineageConfig = serde_json::from_value(config_json).map_err(|e| {
            LineageError::config(format!("Failed to deserialize merged config: {}", e))
        })?;

        if config.resolution.max_depth == 0 {
            return Err(LineageError::config("resolution.max_depth must be at least 1"));
        }

        Ok(config)
    }
}

/// Convert a parsed TOML document into JSON for merging. Values with no
/// place in the configuration (datetimes, non-finite floats) are rejected.
fn toml_to_json(toml: &toml::Value) -> Result<serde_json::Value> {
    Ok(match toml {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| LineageError::config(format!("Invalid number in config: {}", f)))?,
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Array(items) => serde_json::Value::Array(
            items.iter().map(toml_to_json).collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(key, value)| Ok((key.clone(), toml_to_json(value)?)))
                .collect::<Result<serde_json::Map<_, _>>>()?,
        ),
        toml::Value::Datetime(dt) => {
            return Err(LineageError::config(format!(
                "Dates are not valid config values: {}",
                dt
            )))
        }
    })
}

/// Overlay `overlay` onto `base`. Every key must already exist in `base`,
/// which holds the serialized defaults, so a misspelled key or section is
/// reported instead of silently ignored. `path` is the dotted key prefix.
fn merge_json(
    base: &mut serde_json::Value,
    overlay: &serde_json::Value,
    path: &str,
) -> Result<()> {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if overlay_val.is_null() {
                    continue;
                }
                let key_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                match base_map.get_mut(key) {
                    Some(base_val) => merge_json(base_val, overlay_val, &key_path)?,
                    None => {
                        return Err(LineageError::config(format!(
                            "Unknown config key `{}`",
                            key_path
                        )))
                    }
                }
            }
            Ok(())
        }
        (serde_json::Value::Object(_), _) => Err(LineageError::config(format!(
            "`{}` must be a table",
            path
        ))),
        (base, overlay) => {
            if !overlay.is_null() {
                *base = overlay.clone();
            }
            Ok(())
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_global_prefixes() -> Vec<String> {
    to_strings(DEFAULT_GLOBAL_PREFIXES)
}

fn default_queue_names() -> Vec<String> {
    to_strings(DEFAULT_QUEUE_NAMES)
}

fn default_internal_namespaces() -> Vec<String> {
    to_strings(DEFAULT_INTERNAL_NAMESPACES)
}

fn default_routing_tokens() -> Vec<String> {
    to_strings(DEFAULT_ROUTING_TOKENS)
}

fn default_fallback_window() -> usize {
    FALLBACK_WINDOW
}

fn default_max_depth() -> usize {
    MAX_CHAIN_DEPTH
}
