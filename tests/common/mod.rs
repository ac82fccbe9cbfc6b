#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global atomic counter to ensure unique temp directory names
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct ExportFixture {
    pub temp_dir: PathBuf,
    variables: Vec<Value>,
}

impl ExportFixture {
    pub fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir =
            std::env::temp_dir().join(format!("taglineage_test_{}_{}", timestamp, counter));
        fs::create_dir_all(&temp_dir).unwrap();

        Self {
            temp_dir,
            variables: Vec::new(),
        }
    }

    pub fn variable(mut self, name: &str, kind: &str, parameter: Vec<Value>) -> Self {
        let id = (self.variables.len() + 1).to_string();
        self.variables.push(json!({
            "variableId": id,
            "name": name,
            "type": kind,
            "parameter": parameter,
        }));
        self
    }

    pub fn script(self, name: &str, body: &str) -> Self {
        self.variable(name, "jsm", vec![template("javascript", body)])
    }

    /// Aggregator declaring event parameters as `(name, expression)` pairs.
    pub fn event_settings(self, name: &str, params: &[(&str, &str)]) -> Self {
        let rows = params
            .iter()
            .map(|&(p, v)| row(&[("parameter", p), ("parameterValue", v)]))
            .collect();
        self.variable(name, "gtes", vec![table("eventSettingsTable", rows)])
    }

    pub fn lookup(self, name: &str, input: &str, rows: &[(&str, &str)], default: Option<&str>) -> Self {
        let rows = rows
            .iter()
            .map(|&(k, v)| row(&[("key", k), ("value", v)]))
            .collect();
        let mut parameter = vec![template("input", input), table("map", rows)];
        if let Some(default) = default {
            parameter.push(template("defaultValue", default));
        }
        self.variable(name, "smm", parameter)
    }

    /// Write the export wrapped in `containerVersion` and return its path.
    pub fn write(&self) -> PathBuf {
        let document = json!({
            "exportFormatVersion": 2,
            "containerVersion": {
                "container": { "publicId": "GTM-FIXTURE", "name": "fixture.example" },
                "variable": self.variables,
            }
        });
        self.create_file("export.json", &serde_json::to_string_pretty(&document).unwrap())
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for ExportFixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

pub fn template(key: &str, value: &str) -> Value {
    json!({ "type": "TEMPLATE", "key": key, "value": value })
}

pub fn row(entries: &[(&str, &str)]) -> Value {
    let map: Vec<Value> = entries.iter().map(|&(k, v)| template(k, v)).collect();
    json!({ "type": "MAP", "map": map })
}

pub fn table(key: &str, rows: Vec<Value>) -> Value {
    json!({ "type": "LIST", "key": key, "list": rows })
}
