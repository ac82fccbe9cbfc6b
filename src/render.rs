//! Markdown rendering of a [`ParsedConfig`].

use crate::analysis::ParsedConfig;
use crate::types::{DataSource, EnvironmentTable, ParamScope, VariableChain};

const NONE: &str = "-";

pub fn render(config: &ParsedConfig) -> String {
    let mut markdown = match &config.container_name {
        Some(name) => format!("# Tag Lineage: `{}` ({})\n", config.container_id, name),
        None => format!("# Tag Lineage: `{}`\n", config.container_id),
    };

    markdown.push_str(&format!(
        "\n{} variables, {} output parameters.\n",
        config.variables.len(),
        config.event_settings.len()
    ));

    render_params(config, ParamScope::Event, "Event Parameters", &mut markdown);
    render_params(config, ParamScope::User, "User Properties", &mut markdown);

    render_listing("Global Variables", &config.global_variable_names(), &mut markdown);
    render_listing("Data Layer Paths", &config.queue_paths(), &mut markdown);

    if let Some(table) = &config.environment_table {
        render_environment_table(table, &mut markdown);
    }

    markdown.push_str("\n## Dependency Chains\n");
    if config.chains.is_empty() {
        markdown.push_str("\n_No chains resolved._\n");
    }
    for (param, chain) in &config.chains {
        markdown.push_str(&format!("\n### `{}`\n\n", param));
        render_chain(chain, &mut markdown);
    }

    markdown
}

fn render_params(config: &ParsedConfig, scope: ParamScope, title: &str, out: &mut String) {
    out.push_str(&format!("\n## {}\n\n", title));

    let params: Vec<_> = config.params_in_scope(scope).collect();
    if params.is_empty() {
        out.push_str("_None declared._\n");
        return;
    }

    out.push_str("| Parameter | Variable | Sources | Kind |\n");
    out.push_str("|---|---|---|---|\n");

    for param in params {
        let row = match config.chain(&param.output_param_name) {
            Some(chain) => {
                let sources = config.ultimate_sources(&param.output_param_name);
                format!(
                    "| `{}` | {} | {} | {} |\n",
                    param.output_param_name,
                    escape_cell(&chain.variable_name),
                    format_sources(&sources),
                    chain.kind.label()
                )
            }
            // Literal expression, no variable behind it.
            None => format!(
                "| `{}` | {} | {} | {} |\n",
                param.output_param_name,
                escape_cell(&param.variable_expression),
                NONE,
                NONE
            ),
        };
        out.push_str(&row);
    }
}

fn render_listing<S: AsRef<str>>(title: &str, names: &[S], out: &mut String) {
    out.push_str(&format!("\n## {}\n\n", title));
    if names.is_empty() {
        out.push_str("_None found._\n");
        return;
    }
    for name in names {
        out.push_str(&format!("- `{}`\n", name.as_ref()));
    }
}

fn render_environment_table(table: &EnvironmentTable, out: &mut String) {
    out.push_str("\n## Environment Routing\n\n");
    out.push_str(&format!("Routed by **`{}`**.\n\n", table.variable_name));
    out.push_str("| Match | Destination | Environment |\n");
    out.push_str("|---|---|---|\n");
    for entry in &table.entries {
        out.push_str(&format!(
            "| `{}` | `{}` | {} |\n",
            escape_cell(&entry.match_pattern),
            escape_cell(&entry.destination_id),
            entry.inferred_environment.map_or(NONE, |env| env.as_str())
        ));
    }
    if let Some(fallback) = &table.fallback_id {
        out.push_str(&format!("\n**Fallback**: `{}`\n", fallback));
    }
}

fn render_chain(node: &VariableChain, out: &mut String) {
    let indent = "  ".repeat(node.depth);

    if node.is_sentinel() {
        out.push_str(&format!(
            "{}- `{}` _({})_\n",
            indent,
            node.variable_name,
            node.data_sources[0].name()
        ));
        return;
    }

    out.push_str(&format!(
        "{}- **`{}`** ({})",
        indent,
        node.variable_name,
        node.kind.label()
    ));
    let direct: Vec<DataSource> = node
        .data_sources
        .iter()
        .filter(|source| !source.is_computed())
        .cloned()
        .collect();
    if !direct.is_empty() {
        out.push_str(&format!(": {}", format_sources(&direct)));
    }
    out.push('\n');

    for child in &node.children {
        render_chain(child, out);
    }
}

fn format_sources(sources: &[DataSource]) -> String {
    if sources.is_empty() {
        return NONE.to_string();
    }
    sources
        .iter()
        .map(|source| escape_cell(&source.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
