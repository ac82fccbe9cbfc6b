//! Chain builder - resolves an output parameter to its dependency tree.
//!
//! Recursion follows `{{...}}` references through the registry. Every name
//! is expanded at most once per chain: a name already seen in this chain
//! becomes a sentinel leaf, "cycle detected" when it is an ancestor of the
//! current node and "already expanded" otherwise. Anything deeper than the
//! depth bound becomes a "max depth exceeded" leaf. The tree therefore has
//! at most one expanded node per variable and terminates on any input.
//!
//! Names absent from the registry resolve to a `builtin` leaf: they are
//! provided by the platform, not missing.

use crate::analysis::registry::VariableRegistry;
use crate::constants::{ALREADY_EXPANDED, CYCLE_DETECTED, MAX_CHAIN_DEPTH, MAX_DEPTH_EXCEEDED};
use crate::extractors::first_reference;
use crate::types::{DataSource, EventSettingsParam, VariableChain};
use compact_str::CompactString;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Names seen while building one chain. Never shared between chains.
#[derive(Default)]
struct Walk {
    /// Every name visited so far in this chain
    visited: FxHashSet<CompactString>,
    /// Names from the root down to the current node
    ancestors: Vec<CompactString>,
}

pub struct ChainBuilder<'a> {
    registry: &'a VariableRegistry,
    max_depth: usize,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(registry: &'a VariableRegistry) -> Self {
        Self::with_max_depth(registry, MAX_CHAIN_DEPTH)
    }

    pub fn with_max_depth(registry: &'a VariableRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
        }
    }

    /// Build the chain for one output parameter, rooted at the first
    /// placeholder in its expression. `None` when the expression holds no
    /// placeholder (a literal embedded in the aggregator).
    pub fn build_for_param(&self, param: &EventSettingsParam) -> Option<VariableChain> {
        let root = first_reference(&param.variable_expression)?;
        let mut chain = self.build_chain(&root);
        chain.output_param_name = Some(param.output_param_name.clone());
        Some(chain)
    }

    /// Build the chain rooted at variable `name` with a fresh visited set.
    pub fn build_chain(&self, name: &str) -> VariableChain {
        self.resolve(name, 0, &mut Walk::default())
    }

    fn resolve(&self, name: &str, depth: usize, walk: &mut Walk) -> VariableChain {
        if walk.visited.contains(name) {
            let marker = if walk.ancestors.iter().any(|ancestor| ancestor.as_str() == name) {
                tracing::trace!(name, depth, "Cycle detected");
                CYCLE_DETECTED
            } else {
                ALREADY_EXPANDED
            };
            return VariableChain::leaf(name, DataSource::computed(marker), depth);
        }

        if depth > self.max_depth {
            tracing::debug!(name, depth, "Chain depth bound reached");
            return VariableChain::leaf(name, DataSource::computed(MAX_DEPTH_EXCEEDED), depth);
        }

        walk.visited.insert(name.into());

        let Some(variable) = self.registry.get(name) else {
            tracing::trace!(name, "Unresolved reference treated as builtin");
            return VariableChain::leaf(name, DataSource::builtin(name), depth);
        };

        walk.ancestors.push(variable.name.clone());
        let children = variable
            .references
            .iter()
            .map(|reference| self.resolve(reference, depth + 1, walk))
            .collect();
        walk.ancestors.pop();

        VariableChain {
            output_param_name: None,
            variable_name: variable.name.clone(),
            kind: variable.kind.clone(),
            data_sources: variable.data_sources.clone(),
            lookup_mappings: variable.lookup_mappings.clone(),
            children,
            depth,
        }
    }

    /// Build one chain per output parameter, each with its own visited set.
    ///
    /// Keyed by parameter name; a later declaration of the same name
    /// replaces an earlier one.
    pub fn build_all(&self, params: &[EventSettingsParam]) -> BTreeMap<CompactString, VariableChain> {
        let mut chains = BTreeMap::new();
        for param in params {
            match self.build_for_param(param) {
                Some(chain) => {
                    if chains
                        .insert(param.output_param_name.clone(), chain)
                        .is_some()
                    {
                        tracing::debug!(param = %param.output_param_name, "Output parameter declared more than once");
                    }
                }
                None => {
                    tracing::debug!(
                        param = %param.output_param_name,
                        expression = %param.variable_expression,
                        "No variable reference in expression, skipping"
                    );
                }
            }
        }
        chains
    }
}

#[cfg(test)]
mod tests;
