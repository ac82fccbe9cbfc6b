//! Variable interpreter - one raw export record in, one parsed variable out.
//!
//! Dispatch is closed over [`VariableKind`]. Interpretation never fails: a
//! missing or malformed parameter leaves the matching facet empty, and an
//! unrecognized kind still yields its placeholder references.

use crate::config::ExtractionConfig;
use crate::constants::{params, DEFAULT_QUEUE_NAME};
use crate::error::Result;
use crate::extractors::references::{extend_references, extract_references};
use crate::extractors::ExtractorRegistry;
use crate::loader::RawVariable;
use crate::types::{DataSource, DomAccess, LookupRow, ParsedVariable, VariableKind};
use compact_str::CompactString;

pub struct VariableInterpreter {
    extractors: ExtractorRegistry,
    /// Queue that data-layer variables read from
    queue_name: CompactString,
}

impl VariableInterpreter {
    pub fn new(extractors: ExtractorRegistry) -> Self {
        Self {
            extractors,
            queue_name: DEFAULT_QUEUE_NAME.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut interpreter = Self::new(ExtractorRegistry::from_config(config)?);
        if let Some(queue) = config.queue_names.iter().find(|q| !q.is_empty()) {
            interpreter.queue_name = queue.as_str().into();
        }
        Ok(interpreter)
    }

    pub fn interpret(&self, raw: &RawVariable) -> ParsedVariable {
        let kind = VariableKind::from_tag(&raw.kind);
        let mut parsed = ParsedVariable::new(
            raw.variable_id.as_deref().unwrap_or_default(),
            raw.name.clone(),
            kind.clone(),
        );
        parsed.notes = raw.notes.clone();

        match kind {
            VariableKind::CustomScript => self.interpret_script(raw, &mut parsed),
            VariableKind::QueueVariable => self.interpret_queue_variable(raw, &mut parsed),
            VariableKind::LookupTable | VariableKind::PatternLookupTable => {
                Self::interpret_lookup(raw, &mut parsed)
            }
            VariableKind::Constant => Self::interpret_constant(raw, &mut parsed),
            VariableKind::EventSettings => Self::interpret_event_settings(raw, &mut parsed),
            VariableKind::GlobalVariable => Self::interpret_global_variable(raw, &mut parsed),
            VariableKind::Cookie => Self::interpret_cookie(raw, &mut parsed),
            VariableKind::Url => parsed.data_sources.push(DataSource::Url),
            VariableKind::DomElement => Self::interpret_dom_element(raw, &mut parsed),
            VariableKind::Other(_) | VariableKind::Unknown => {
                tracing::debug!(name = %raw.name, kind = %raw.kind, "Unrecognized variable kind");
                Self::interpret_unrecognized(raw, &mut parsed)
            }
        }

        parsed
    }

    fn interpret_script(&self, raw: &RawVariable, parsed: &mut ParsedVariable) {
        let Some(script) = raw.param_value(params::JAVASCRIPT) else {
            return;
        };
        parsed.data_sources = self.extractors.extract_all(script);
        parsed.references = extract_references(script);
        parsed.script = Some(script.to_string());
    }

    fn interpret_queue_variable(&self, raw: &RawVariable, parsed: &mut ParsedVariable) {
        let Some(path) = raw.param_value(params::NAME).map(str::trim) else {
            return;
        };
        if path.is_empty() {
            return;
        }
        let fallback = raw.param_value(params::DEFAULT_VALUE).map(Into::into);
        parsed
            .data_sources
            .push(DataSource::queue_in(self.queue_name.clone(), path, fallback));
    }

    fn interpret_lookup(raw: &RawVariable, parsed: &mut ParsedVariable) {
        if let Some(input) = raw.param_value(params::INPUT) {
            parsed.references = extract_references(input);
        }

        let rows: Vec<LookupRow> = raw
            .rows(params::MAP)
            .iter()
            .filter_map(|row| {
                Some(LookupRow {
                    key: row.map_value(params::KEY)?.into(),
                    value: row.map_value(params::VALUE)?.into(),
                })
            })
            .collect();

        // Row outputs may themselves be variables.
        for row in &rows {
            extend_references(&mut parsed.references, &row.value);
        }
        parsed.lookup_mappings = Some(rows);

        if let Some(default) = raw.param_value(params::DEFAULT_VALUE) {
            extend_references(&mut parsed.references, default);
            parsed.data_sources.push(DataSource::constant(
                format!("{} (default)", raw.name),
                default,
            ));
        }
    }

    fn interpret_constant(raw: &RawVariable, parsed: &mut ParsedVariable) {
        if let Some(value) = raw.param_value(params::VALUE) {
            parsed
                .data_sources
                .push(DataSource::constant(raw.name.clone(), value));
        }
    }

    fn interpret_event_settings(raw: &RawVariable, parsed: &mut ParsedVariable) {
        let event_values = raw
            .rows(params::EVENT_SETTINGS_TABLE)
            .iter()
            .filter_map(|row| row.map_value(params::PARAMETER_VALUE));
        let user_values = raw
            .rows(params::USER_PROPERTIES)
            .iter()
            .filter_map(|row| row.map_value(params::VALUE));

        for value in event_values.chain(user_values) {
            extend_references(&mut parsed.references, value);
        }
        parsed.data_sources.push(DataSource::computed(raw.name.clone()));
    }

    fn interpret_global_variable(raw: &RawVariable, parsed: &mut ParsedVariable) {
        let Some(name) = raw.param_value(params::NAME).map(str::trim) else {
            return;
        };
        let name = name.strip_prefix("window.").unwrap_or(name);
        if !name.is_empty() {
            parsed.data_sources.push(DataSource::global(name, None));
        }
    }

    fn interpret_cookie(raw: &RawVariable, parsed: &mut ParsedVariable) {
        if let Some(name) = raw.param_value(params::NAME).filter(|n| !n.is_empty()) {
            parsed.data_sources.push(DataSource::Cookie { name: name.into() });
        }
    }

    fn interpret_dom_element(raw: &RawVariable, parsed: &mut ParsedVariable) {
        let (access, selector) = match raw.param_value(params::SELECTOR_TYPE) {
            Some("ID") => (DomAccess::Id, raw.param_value(params::ELEMENT_ID)),
            _ => (DomAccess::Selector, raw.param_value(params::ELEMENT_SELECTOR)),
        };
        if let Some(selector) = selector.filter(|s| !s.is_empty()) {
            parsed.data_sources.push(DataSource::Dom {
                access,
                selector: selector.into(),
            });
        }
    }

    fn interpret_unrecognized(raw: &RawVariable, parsed: &mut ParsedVariable) {
        let mut values = Vec::new();
        for param in &raw.parameter {
            param.collect_values(&mut values);
        }
        for value in values {
            extend_references(&mut parsed.references, value);
        }
    }
}
