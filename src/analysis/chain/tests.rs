//! Tests for the chain builder.

use super::*;
use crate::types::{LookupRow, ParamScope, ParsedVariable, VariableKind};

fn variable(name: &str, sources: Vec<DataSource>, references: &[&str]) -> ParsedVariable {
    let mut variable = ParsedVariable::new(name, name, VariableKind::CustomScript);
    variable.data_sources = sources;
    variable.references = references.iter().map(|r| CompactString::from(*r)).collect();
    variable
}

fn registry(variables: Vec<ParsedVariable>) -> VariableRegistry {
    variables.into_iter().collect()
}

fn param(name: &str, expression: &str) -> EventSettingsParam {
    EventSettingsParam {
        output_param_name: name.into(),
        variable_expression: expression.into(),
        scope: ParamScope::Event,
        declared_by: "Settings".into(),
    }
}

fn is_cycle_leaf(chain: &VariableChain) -> bool {
    chain.is_sentinel() && chain.data_sources == vec![DataSource::computed(CYCLE_DETECTED)]
}

#[test]
fn test_single_variable_chain() {
    let registry = registry(vec![variable(
        "Site Name",
        vec![DataSource::global("SITE_NAME", None)],
        &[],
    )]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("site_name", "{{Site Name}}"))
        .unwrap();

    assert_eq!(chain.output_param_name.as_deref(), Some("site_name"));
    assert_eq!(chain.variable_name, "Site Name");
    assert_eq!(chain.depth, 0);
    assert_eq!(chain.data_sources, vec![DataSource::global("SITE_NAME", None)]);
    assert!(chain.children.is_empty());
}

#[test]
fn test_direct_child() {
    let registry = registry(vec![
        variable("Content Group Var", vec![], &["Page Type"]),
        variable("Page Type", vec![DataSource::queue("page.type", None)], &[]),
    ]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("content_group", "{{Content Group Var}}"))
        .unwrap();

    assert_eq!(chain.children.len(), 1);
    assert_eq!(chain.children[0].variable_name, "Page Type");
    assert_eq!(chain.children[0].depth, 1);
    assert!(chain.children[0].output_param_name.is_none());
}

#[test]
fn test_two_variable_cycle() {
    let registry = registry(vec![
        variable("A", vec![], &["B"]),
        variable("B", vec![], &["A"]),
    ]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("p", "{{A}}"))
        .unwrap();

    assert_eq!(chain.variable_name, "A");
    assert!(!chain.is_sentinel());
    assert_eq!(chain.children.len(), 1);

    let b = &chain.children[0];
    assert_eq!(b.variable_name, "B");
    assert!(!b.is_sentinel());
    assert_eq!(b.children.len(), 1);

    let back_edge = &b.children[0];
    assert!(is_cycle_leaf(back_edge));
    assert_eq!(back_edge.variable_name, "A");
    assert_eq!(back_edge.kind, VariableKind::Unknown);
    assert_eq!(chain.node_count(), 3);
}

#[test]
fn test_self_reference_terminates() {
    let registry = registry(vec![variable("Loop", vec![], &["Loop"])]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("p", "{{Loop}}"))
        .unwrap();

    assert_eq!(chain.children.len(), 1);
    assert!(is_cycle_leaf(&chain.children[0]));
}

#[test]
fn test_unresolved_reference_is_builtin_leaf() {
    let registry = registry(vec![variable("Wrapper", vec![], &["Page URL"])]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("page_location", "{{Wrapper}}"))
        .unwrap();

    let leaf = &chain.children[0];
    assert_eq!(leaf.variable_name, "Page URL");
    assert_eq!(leaf.data_sources, vec![DataSource::builtin("Page URL")]);
    assert!(leaf.children.is_empty());
}

#[test]
fn test_unresolved_root_is_builtin_leaf() {
    let registry = registry(vec![]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("event_name", "{{Event}}"))
        .unwrap();
    assert_eq!(chain.variable_name, "Event");
    assert_eq!(chain.data_sources, vec![DataSource::builtin("Event")]);
}

#[test]
fn test_depth_bound() {
    // V0 -> V1 -> ... -> V19
    let variables = (0..20)
        .map(|i| {
            let next = format!("V{}", i + 1);
            variable(&format!("V{}", i), vec![], &[next.as_str()])
        })
        .collect();
    let registry = registry(variables);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("deep", "{{V0}}"))
        .unwrap();

    let mut node = &chain;
    while let Some(child) = node.children.first() {
        node = child;
    }
    assert_eq!(node.depth, MAX_CHAIN_DEPTH + 1);
    assert_eq!(node.variable_name, "V11");
    assert_eq!(
        node.data_sources,
        vec![DataSource::computed(MAX_DEPTH_EXCEEDED)]
    );
    assert_eq!(chain.node_count(), MAX_CHAIN_DEPTH + 2);
}

#[test]
fn test_custom_depth_bound() {
    let registry = registry(vec![
        variable("A", vec![], &["B"]),
        variable("B", vec![], &["C"]),
        variable("C", vec![], &[]),
    ]);
    let chain = ChainBuilder::with_max_depth(&registry, 1)
        .build_for_param(&param("p", "{{A}}"))
        .unwrap();
    let c = &chain.children[0].children[0];
    assert!(c.is_sentinel());
    assert_eq!(c.data_sources, vec![DataSource::computed(MAX_DEPTH_EXCEEDED)]);
}

#[test]
fn test_diamond_expands_shared_variable_once() {
    let registry = registry(vec![
        variable("Top", vec![], &["Left", "Right"]),
        variable("Left", vec![], &["Shared"]),
        variable("Right", vec![], &["Shared"]),
        variable("Shared", vec![DataSource::global("SITE_ID", None)], &[]),
    ]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("p", "{{Top}}"))
        .unwrap();

    let first = &chain.children[0].children[0];
    assert_eq!(first.variable_name, "Shared");
    assert!(!first.is_sentinel());

    let second = &chain.children[1].children[0];
    assert_eq!(second.variable_name, "Shared");
    assert!(second.is_sentinel());
    assert_eq!(second.data_sources, vec![DataSource::computed(ALREADY_EXPANDED)]);
}

#[test]
fn test_repeated_builtin_expands_once() {
    let registry = registry(vec![variable("Wrapper", vec![], &["Page URL", "Page URL"])]);
    let chain = ChainBuilder::new(&registry).build_chain("Wrapper");
    assert_eq!(chain.children.len(), 2);
    assert_eq!(chain.children[0].data_sources, vec![DataSource::builtin("Page URL")]);
    assert_eq!(
        chain.children[1].data_sources,
        vec![DataSource::computed(ALREADY_EXPANDED)]
    );
}

#[test]
fn test_layered_lattice_stays_linear() {
    // Every variable in layer n references every variable in layer n + 1.
    const LAYERS: usize = 10;
    const WIDTH: usize = 8;
    let name = |layer: usize, index: usize| format!("L{}V{}", layer, index);

    let mut variables = Vec::new();
    for layer in 0..LAYERS {
        for index in 0..WIDTH {
            let next: Vec<String> = if layer + 1 < LAYERS {
                (0..WIDTH).map(|i| name(layer + 1, i)).collect()
            } else {
                Vec::new()
            };
            let refs: Vec<&str> = next.iter().map(String::as_str).collect();
            variables.push(variable(
                &name(layer, index),
                vec![DataSource::global(format!("SITE_L{}V{}", layer, index), None)],
                &refs,
            ));
        }
    }
    let registry = registry(variables);
    let chain = ChainBuilder::new(&registry).build_chain("L0V0");

    // One expanded node per variable plus one leaf per remaining edge.
    let edges = (LAYERS - 1) * WIDTH * WIDTH;
    assert!(chain.node_count() <= 1 + edges);
    assert_eq!(
        crate::analysis::reducer::ultimate_sources(&chain).len(),
        1 + (LAYERS - 1) * WIDTH
    );
}

#[test]
fn test_lookup_rows_carried() {
    let mut lookup = variable("Lookup", vec![], &[]);
    lookup.kind = VariableKind::LookupTable;
    lookup.lookup_mappings = Some(vec![LookupRow {
        key: "a".into(),
        value: "b".into(),
    }]);
    let registry = registry(vec![lookup]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("p", "{{Lookup}}"))
        .unwrap();
    assert_eq!(chain.kind, VariableKind::LookupTable);
    assert_eq!(chain.lookup_mappings.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_literal_expression_skipped() {
    let registry = registry(vec![]);
    let builder = ChainBuilder::new(&registry);
    assert!(builder.build_for_param(&param("platform", "web")).is_none());

    let chains = builder.build_all(&[param("platform", "web"), param("page", "{{Page}}")]);
    assert_eq!(chains.len(), 1);
    assert!(chains.contains_key("page"));
}

#[test]
fn test_fresh_visited_set_per_param() {
    let registry = registry(vec![
        variable("Shared", vec![DataSource::global("SITE_ID", None)], &[]),
        variable("Other", vec![], &["Shared"]),
    ]);
    let chains = ChainBuilder::new(&registry).build_all(&[
        param("first", "{{Shared}}"),
        param("second", "{{Other}}"),
    ]);

    assert!(!chains["first"].is_sentinel());
    let shared = &chains["second"].children[0];
    assert_eq!(shared.variable_name, "Shared");
    assert!(!shared.is_sentinel());
}

#[test]
fn test_later_declaration_replaces_earlier() {
    let registry = registry(vec![]);
    let chains = ChainBuilder::new(&registry)
        .build_all(&[param("site", "{{Site A}}"), param("site", "{{Site B}}")]);
    assert_eq!(chains["site"].variable_name, "Site B");
}

#[test]
fn test_expression_uses_first_placeholder() {
    let registry = registry(vec![]);
    let chain = ChainBuilder::new(&registry)
        .build_for_param(&param("title", "{{Page Title}} | {{Site Name}}"))
        .unwrap();
    assert_eq!(chain.variable_name, "Page Title");
}
