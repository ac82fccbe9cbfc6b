use crate::types::ParsedVariable;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

/// Name-keyed store of interpreted variables for one parse run.
///
/// Declaration order is preserved. When two variables share a name the
/// first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: Vec<ParsedVariable>,
    by_name: FxHashMap<CompactString, usize>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable. Returns `false` if the name was already taken.
    pub fn insert(&mut self, variable: ParsedVariable) -> bool {
        if self.by_name.contains_key(&variable.name) {
            tracing::warn!(name = %variable.name, "Duplicate variable name, keeping first declaration");
            return false;
        }
        self.by_name
            .insert(variable.name.clone(), self.variables.len());
        self.variables.push(variable);
        true
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ParsedVariable> {
        self.by_name.get(name).map(|&index| &self.variables[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedVariable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromIterator<ParsedVariable> for VariableRegistry {
    fn from_iter<I: IntoIterator<Item = ParsedVariable>>(iter: I) -> Self {
        let mut registry = Self::new();
        for variable in iter {
            registry.insert(variable);
        }
        registry
    }
}

impl Serialize for VariableRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.variables)
    }
}
