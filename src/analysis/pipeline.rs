//! End-to-end resolution of one container export.
//!
//! Interpretation, output-parameter extraction, routing-table detection and
//! chain building run in that order over a single export. The result is an
//! owned [`ParsedConfig`]; nothing is cached between runs.

use crate::analysis::chain::ChainBuilder;
use crate::analysis::environments::extract_environment_table;
use crate::analysis::interpreter::VariableInterpreter;
use crate::analysis::params::extract_output_params;
use crate::analysis::reducer;
use crate::analysis::registry::VariableRegistry;
use crate::config::{ConfigManager, LineageConfig};
use crate::error::Result;
use crate::loader::{load_export, ContainerExport};
use crate::types::{
    DataSource, EnvironmentTable, EventSettingsParam, ParamScope, VariableChain,
};
use compact_str::CompactString;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything resolved from one export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfig {
    pub container_id: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<CompactString>,
    pub variables: VariableRegistry,
    pub event_settings: Vec<EventSettingsParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_table: Option<EnvironmentTable>,
    /// Root chain per output parameter, ordered by parameter name
    pub chains: BTreeMap<CompactString, VariableChain>,
}

impl ParsedConfig {
    pub fn chain(&self, param: &str) -> Option<&VariableChain> {
        self.chains.get(param)
    }

    /// Distinct primitive origins of an output parameter. Empty when the
    /// parameter has no chain.
    pub fn ultimate_sources(&self, param: &str) -> Vec<DataSource> {
        self.chain(param)
            .map(reducer::ultimate_sources)
            .unwrap_or_default()
    }

    pub fn params_in_scope(&self, scope: ParamScope) -> impl Iterator<Item = &EventSettingsParam> {
        self.event_settings
            .iter()
            .filter(move |param| param.scope == scope)
    }

    /// Every global variable name read by any variable, sorted.
    pub fn global_variable_names(&self) -> Vec<&str> {
        self.collect_names(|source| match source {
            DataSource::GlobalVariable { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Every queue and namespace path read by any variable, qualified by
    /// its queue and sorted.
    pub fn queue_paths(&self) -> Vec<String> {
        let paths: BTreeSet<String> = self
            .variables
            .iter()
            .flat_map(|variable| variable.data_sources.iter())
            .filter_map(DataSource::qualified_path)
            .collect();
        paths.into_iter().collect()
    }

    fn collect_names<'a, F>(&'a self, select: F) -> Vec<&'a str>
    where
        F: Fn(&'a DataSource) -> Option<&'a str>,
    {
        let names: BTreeSet<&str> = self
            .variables
            .iter()
            .flat_map(|variable| variable.data_sources.iter())
            .filter_map(select)
            .collect();
        names.into_iter().collect()
    }
}

/// Owns the interpreter built from one configuration so it can be reused
/// across exports.
pub struct LineagePipeline {
    interpreter: VariableInterpreter,
    config: LineageConfig,
}

impl LineagePipeline {
    pub fn new(config: LineageConfig) -> Result<Self> {
        let interpreter = VariableInterpreter::from_config(&config.extraction)?;
        Ok(Self {
            interpreter,
            config,
        })
    }

    pub fn config(&self) -> &LineageConfig {
        &self.config
    }

    pub fn run(&self, export: &ContainerExport) -> ParsedConfig {
        let variables: VariableRegistry = export
            .variables
            .iter()
            .map(|raw| self.interpreter.interpret(raw))
            .collect();

        let event_settings = extract_output_params(&export.variables);

        let environment_table =
            extract_environment_table(&variables, &self.config.environments.name_tokens);

        let chains = ChainBuilder::with_max_depth(&variables, self.config.resolution.max_depth)
            .build_all(&event_settings);

        tracing::debug!(
            container = %export.container_id,
            variables = variables.len(),
            params = event_settings.len(),
            chains = chains.len(),
            routing_table = environment_table.is_some(),
            "Resolved export"
        );

        ParsedConfig {
            container_id: export.container_id.clone(),
            container_name: export.container_name.clone(),
            variables,
            event_settings,
            environment_table,
            chains,
        }
    }
}

/// Parse the export at `path`, reading `taglineage.toml` from its directory
/// when present.
pub fn parse(path: &Path) -> Result<ParsedConfig> {
    let config_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    // Check the input first so a missing export is reported as such rather
    // than as a config problem.
    let export = load_export(path)?;
    let config = ConfigManager::load(config_dir)?;
    parse_export(&export, &config)
}

pub fn parse_with(path: &Path, config: &LineageConfig) -> Result<ParsedConfig> {
    let export = load_export(path)?;
    parse_export(&export, config)
}

pub fn parse_export(export: &ContainerExport, config: &LineageConfig) -> Result<ParsedConfig> {
    Ok(LineagePipeline::new(config.clone())?.run(export))
}
