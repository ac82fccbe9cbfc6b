//! Output parameters declared by event-settings aggregators.

use crate::constants::params;
use crate::loader::RawVariable;
use crate::types::{EventSettingsParam, ParamScope, VariableKind};

/// Collect every output parameter from every aggregator, in declaration order.
///
/// Rows without a name or an expression are skipped. Parameters declared by
/// more than one aggregator are all kept.
pub fn extract_output_params<'a, I>(variables: I) -> Vec<EventSettingsParam>
where
    I: IntoIterator<Item = &'a RawVariable>,
{
    let mut output = Vec::new();

    for raw in variables {
        if VariableKind::from_tag(&raw.kind) != VariableKind::EventSettings {
            continue;
        }

        collect_table(
            raw,
            params::EVENT_SETTINGS_TABLE,
            params::PARAMETER,
            params::PARAMETER_VALUE,
            ParamScope::Event,
            &mut output,
        );
        collect_table(
            raw,
            params::USER_PROPERTIES,
            params::NAME,
            params::VALUE,
            ParamScope::User,
            &mut output,
        );
    }

    output
}

fn collect_table(
    raw: &RawVariable,
    table: &str,
    name_key: &str,
    value_key: &str,
    scope: ParamScope,
    output: &mut Vec<EventSettingsParam>,
) {
    for row in raw.rows(table) {
        let (Some(name), Some(expression)) = (row.map_value(name_key), row.map_value(value_key))
        else {
            tracing::debug!(aggregator = %raw.name, table, "Skipping incomplete row");
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        output.push(EventSettingsParam {
            output_param_name: name.into(),
            variable_expression: expression.into(),
            scope,
            declared_by: raw.name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RawParameter;

    fn aggregator(name: &str, event_rows: &[(&str, &str)], user_rows: &[(&str, &str)]) -> RawVariable {
        RawVariable::new(
            name,
            name,
            "gtes",
            vec![
                RawParameter::table(
                    "eventSettingsTable",
                    event_rows
                        .iter()
                        .map(|&(p, v)| RawParameter::row(&[("parameter", p), ("parameterValue", v)]))
                        .collect(),
                ),
                RawParameter::table(
                    "userProperties",
                    user_rows
                        .iter()
                        .map(|&(n, v)| RawParameter::row(&[("name", n), ("value", v)]))
                        .collect(),
                ),
            ],
        )
    }

    #[test]
    fn test_event_and_user_scopes() {
        let vars = vec![aggregator(
            "Settings",
            &[("content_group", "{{Content Group Var}}")],
            &[("user_tier", "{{User Tier}}")],
        )];
        let params = extract_output_params(&vars);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].output_param_name, "content_group");
        assert_eq!(params[0].variable_expression, "{{Content Group Var}}");
        assert_eq!(params[0].scope, ParamScope::Event);
        assert_eq!(params[1].output_param_name, "user_tier");
        assert_eq!(params[1].scope, ParamScope::User);
        assert_eq!(params[1].declared_by, "Settings");
    }

    #[test]
    fn test_duplicates_across_aggregators_kept() {
        let vars = vec![
            aggregator("A", &[("site", "{{Site A}}")], &[]),
            aggregator("B", &[("site", "{{Site B}}")], &[]),
        ];
        let params = extract_output_params(&vars);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].declared_by, "A");
        assert_eq!(params[1].declared_by, "B");
    }

    #[test]
    fn test_non_aggregators_ignored() {
        let vars = vec![RawVariable::new(
            "1",
            "Lookup",
            "smm",
            vec![RawParameter::table(
                "eventSettingsTable",
                vec![RawParameter::row(&[("parameter", "x"), ("parameterValue", "y")])],
            )],
        )];
        assert!(extract_output_params(&vars).is_empty());
    }

    #[test]
    fn test_incomplete_rows_skipped() {
        let mut var = aggregator("Settings", &[("ok", "{{Ok}}")], &[]);
        var.parameter[0].list.push(RawParameter::row(&[("parameter", "missing_value")]));
        var.parameter[0].list.push(RawParameter::row(&[("parameter", "  "), ("parameterValue", "x")]));
        let vars = vec![var];
        let params = extract_output_params(&vars);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].output_param_name, "ok");
    }
}
