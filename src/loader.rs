//! Raw container export loading.
//!
//! Variables are kept untyped here; [`crate::analysis::interpreter`] gives
//! them meaning. Only the variable list is required; a variable whose shape
//! cannot be read is skipped with a warning instead of failing the load.

use crate::error::{LineageError, Result};
use crate::error_ext::ResultExt;
use compact_str::CompactString;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One parameter of a variable. Tables are `LIST` parameters whose entries
/// are `MAP` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParameter {
    #[serde(rename = "type", default)]
    pub kind: Option<CompactString>,
    #[serde(default)]
    pub key: Option<CompactString>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub list: Vec<RawParameter>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub map: Vec<RawParameter>,
}

impl RawParameter {
    pub fn template(key: &str, value: &str) -> Self {
        Self {
            kind: Some("TEMPLATE".into()),
            key: Some(key.into()),
            value: Some(value.to_string()),
            ..Self::default()
        }
    }

    /// A `MAP` row built from `(key, value)` entries.
    pub fn row(entries: &[(&str, &str)]) -> Self {
        Self {
            kind: Some("MAP".into()),
            map: entries
                .iter()
                .map(|(k, v)| Self::template(k, v))
                .collect(),
            ..Self::default()
        }
    }

    /// A `LIST` table of rows.
    pub fn table(key: &str, rows: Vec<RawParameter>) -> Self {
        Self {
            kind: Some("LIST".into()),
            key: Some(key.into()),
            list: rows,
            ..Self::default()
        }
    }

    /// Value of the entry named `key` inside a `MAP` row.
    pub fn map_value(&self, key: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .and_then(|entry| entry.value.as_deref())
    }

    /// Every scalar value in this parameter and its nested lists and maps,
    /// depth-first in declared order.
    pub fn collect_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(value) = self.value.as_deref() {
            out.push(value);
        }
        for nested in self.list.iter().chain(self.map.iter()) {
            nested.collect_values(out);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariable {
    #[serde(default, deserialize_with = "lenient_string")]
    pub variable_id: Option<String>,
    #[serde(default)]
    pub name: CompactString,
    #[serde(rename = "type", default)]
    pub kind: CompactString,
    #[serde(default, deserialize_with = "lenient_list")]
    pub parameter: Vec<RawParameter>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,
}

impl RawVariable {
    pub fn new(id: &str, name: &str, kind: &str, parameter: Vec<RawParameter>) -> Self {
        Self {
            variable_id: Some(id.to_string()),
            name: name.into(),
            kind: kind.into(),
            parameter,
            notes: None,
        }
    }

    pub fn param(&self, key: &str) -> Option<&RawParameter> {
        self.parameter
            .iter()
            .find(|p| p.key.as_deref() == Some(key))
    }

    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(|p| p.value.as_deref())
    }

    /// Rows of the table parameter `key`. Empty when absent or not a table.
    pub fn rows(&self, key: &str) -> &[RawParameter] {
        self.param(key).map(|p| p.list.as_slice()).unwrap_or(&[])
    }
}

/// A loaded container export.
#[derive(Debug, Clone, Default)]
pub struct ContainerExport {
    pub container_id: CompactString,
    pub container_name: Option<CompactString>,
    pub variables: Vec<RawVariable>,
}

impl ContainerExport {
    /// Parse an export document.
    ///
    /// Accepts both `{"containerVersion": {...}}` and a bare document holding
    /// a `variable` list.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        if !root.is_object() {
            return Err(serde::de::Error::custom(
                "export must be a JSON object",
            ));
        }

        let version = root.get("containerVersion").unwrap_or(&root);
        let container = version.get("container");

        let container_id = container
            .and_then(|c| c.get("publicId").or_else(|| c.get("containerId")))
            .or_else(|| version.get("containerId"))
            .map(scalar_to_string)
            .unwrap_or_default();

        let container_name = container
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .map(CompactString::from);

        let variables = version
            .get("variable")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| {
                        RawVariable::deserialize(entry)
                            .ok_warn(&format!("variable #{}", index))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            container_id: container_id.into(),
            container_name,
            variables,
        })
    }
}

/// Read and parse the export at `path`.
pub fn load_export(path: &Path) -> Result<ContainerExport> {
    if !path.exists() {
        return Err(LineageError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| LineageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let export =
        ContainerExport::from_json_str(&content).map_err(|e| LineageError::InvalidExport {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(
        path = %path.display(),
        container = %export.container_id,
        variables = export.variables.len(),
        "Loaded export"
    );

    Ok(export)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_to_string(&value)),
    })
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<RawParameter>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .iter()
        .filter_map(|entry| RawParameter::deserialize(entry).ok_debug("parameter"))
        .collect())
}
