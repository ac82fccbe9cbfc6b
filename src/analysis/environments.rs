//! Environment routing table detection.
//!
//! Environment labels are inferred from lookup keys with a small fixed
//! heuristic. Unmatched keys get no label.

use crate::analysis::registry::VariableRegistry;
use crate::types::{Environment, EnvironmentTable, EnvironmentTableEntry};

const STAGING_MARKERS: &[&str] = &["stag", "uat", "preprod", "qa"];
const DEVELOPMENT_MARKERS: &[&str] = &["dev", "local", "test"];
const APP_MARKERS: &[&str] = &["app"];
const PRODUCTION_MARKERS: &[&str] = &["prod", "live", "www"];

/// Find the first lookup-kind variable whose name contains one of `tokens`
/// (case-insensitive) and convert its rows into routing entries.
pub fn extract_environment_table(
    registry: &VariableRegistry,
    tokens: &[String],
) -> Option<EnvironmentTable> {
    let tokens: Vec<String> = tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let variable = registry.iter().find(|variable| {
        let name = variable.name.to_lowercase();
        variable.kind.is_lookup() && tokens.iter().any(|token| name.contains(token.as_str()))
    })?;

    let entries = variable
        .lookup_mappings
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|row| EnvironmentTableEntry {
            match_pattern: row.key.clone(),
            destination_id: row.value.clone(),
            inferred_environment: infer_environment(&row.key),
        })
        .collect();

    Some(EnvironmentTable {
        variable_name: variable.name.clone(),
        entries,
        fallback_id: variable.default_value().cloned(),
    })
}

/// Best-effort environment label for a lookup key.
pub fn infer_environment(key: &str) -> Option<Environment> {
    let key = key.trim().to_lowercase();

    match key.as_str() {
        "true" | "1" | "yes" => return Some(Environment::Production),
        "false" | "0" | "no" => return Some(Environment::Development),
        _ => {}
    }

    let contains_any = |markers: &[&str]| markers.iter().any(|m| key.contains(m));

    if contains_any(STAGING_MARKERS) {
        Some(Environment::Staging)
    } else if contains_any(DEVELOPMENT_MARKERS) {
        Some(Environment::Development)
    } else if contains_any(APP_MARKERS) {
        Some(Environment::App)
    } else if contains_any(PRODUCTION_MARKERS) {
        Some(Environment::Production)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataSource, LookupRow, ParsedVariable, VariableKind};

    fn lookup(name: &str, kind: VariableKind, rows: &[(&str, &str)]) -> ParsedVariable {
        let mut variable = ParsedVariable::new(name, name, kind);
        variable.lookup_mappings = Some(
            rows.iter()
                .map(|(k, v)| LookupRow {
                    key: (*k).into(),
                    value: (*v).into(),
                })
                .collect(),
        );
        variable
    }

    fn tokens() -> Vec<String> {
        vec!["measurement id".to_string(), "environment".to_string()]
    }

    #[test]
    fn test_boolean_routing_table() {
        let registry: VariableRegistry = vec![lookup(
            "GA4 - Measurement ID",
            VariableKind::LookupTable,
            &[("true", "PROD-1"), ("false", "DEV-1")],
        )]
        .into_iter()
        .collect();

        let table = extract_environment_table(&registry, &tokens()).unwrap();
        assert_eq!(table.variable_name, "GA4 - Measurement ID");
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].match_pattern, "true");
        assert_eq!(table.entries[0].destination_id, "PROD-1");
        assert_eq!(table.entries[0].inferred_environment, Some(Environment::Production));
        assert_eq!(table.entries[1].inferred_environment, Some(Environment::Development));
        assert_eq!(table.fallback_id, None);
    }

    #[test]
    fn test_first_matching_lookup_wins_and_fallback() {
        let mut routing = lookup(
            "Environment Routing",
            VariableKind::PatternLookupTable,
            &[("staging.example.com", "G-STG")],
        );
        routing
            .data_sources
            .push(DataSource::constant("Environment Routing (default)", "G-DEFAULT"));

        let registry: VariableRegistry = vec![
            ParsedVariable::new("c", "Environment Name", VariableKind::Constant),
            routing,
            lookup("Second Environment", VariableKind::LookupTable, &[]),
        ]
        .into_iter()
        .collect();

        let table = extract_environment_table(&registry, &tokens()).unwrap();
        assert_eq!(table.variable_name, "Environment Routing");
        assert_eq!(table.fallback_id.as_deref(), Some("G-DEFAULT"));
        assert_eq!(table.entries[0].inferred_environment, Some(Environment::Staging));
    }

    #[test]
    fn test_absent_table() {
        let registry: VariableRegistry =
            vec![lookup("Section Lookup", VariableKind::LookupTable, &[("a", "b")])]
                .into_iter()
                .collect();
        assert!(extract_environment_table(&registry, &tokens()).is_none());
    }

    #[test]
    fn test_infer_environment() {
        assert_eq!(infer_environment("TRUE"), Some(Environment::Production));
        assert_eq!(infer_environment("www.example.com"), Some(Environment::Production));
        assert_eq!(infer_environment("preprod.example.com"), Some(Environment::Staging));
        assert_eq!(infer_environment("localhost"), Some(Environment::Development));
        assert_eq!(infer_environment("dev.example.com"), Some(Environment::Development));
        assert_eq!(infer_environment("app.example.com"), Some(Environment::App));
        assert_eq!(infer_environment("example.com"), None);
    }
}
