use crate::constants::DEFAULT_QUEUE_NAME;
use compact_str::CompactString;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Data sources
// ============================================================================

/// How a DOM location is looked up from script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomAccess {
    /// `document.querySelector(...)` / `querySelectorAll(...)`
    Selector,
    /// `document.getElementById(...)`
    Id,
    /// `document.getElementsByClassName(...)`
    ClassName,
}

impl DomAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomAccess::Selector => "selector",
            DomAccess::Id => "id",
            DomAccess::ClassName => "class_name",
        }
    }
}

/// One primitive origin of a value.
///
/// A data source never names another configuration variable; links between
/// variables live in [`ParsedVariable::references`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// An in-page global (e.g. `window.SITE_NAME`), with the literal used
    /// when reading it throws.
    GlobalVariable {
        name: CompactString,
        fallback: Option<CompactString>,
    },

    /// A path into a structured event queue or an internal-data namespace.
    ///
    /// `queue` names the queue the path is read from. Namespace paths carry
    /// no queue: their first segment is the namespace itself.
    StructuredQueueAccess {
        #[serde(skip_serializing_if = "Option::is_none")]
        queue: Option<CompactString>,
        path: CompactString,
        fallback: Option<CompactString>,
    },

    /// A literal value.
    Constant {
        name: CompactString,
        value: CompactString,
    },

    /// Whole-URL usage.
    Url,

    /// A DOM location.
    Dom {
        access: DomAccess,
        selector: CompactString,
    },

    /// A cookie read.
    Cookie { name: CompactString },

    /// A value with no single primitive origin (aggregators, sentinels).
    Computed { name: CompactString },

    /// A name not declared in the configuration, provided by the platform.
    Builtin { name: CompactString },
}

impl DataSource {
    pub fn global(name: impl Into<CompactString>, fallback: Option<CompactString>) -> Self {
        DataSource::GlobalVariable {
            name: name.into(),
            fallback,
        }
    }

    /// A path read from the default `dataLayer` queue.
    pub fn queue(path: impl Into<CompactString>, fallback: Option<CompactString>) -> Self {
        Self::queue_in(DEFAULT_QUEUE_NAME, path, fallback)
    }

    pub fn queue_in(
        queue: impl Into<CompactString>,
        path: impl Into<CompactString>,
        fallback: Option<CompactString>,
    ) -> Self {
        DataSource::StructuredQueueAccess {
            queue: Some(queue.into()),
            path: path.into(),
            fallback,
        }
    }

    /// A dotted path whose first segment is an internal-data namespace.
    pub fn namespace(path: impl Into<CompactString>) -> Self {
        DataSource::StructuredQueueAccess {
            queue: None,
            path: path.into(),
            fallback: None,
        }
    }

    /// Fully qualified location of a queue or namespace read.
    pub fn qualified_path(&self) -> Option<String> {
        match self {
            DataSource::StructuredQueueAccess {
                queue: Some(queue),
                path,
                ..
            } => Some(format!("{}.{}", queue, path)),
            DataSource::StructuredQueueAccess { path, .. } => Some(path.to_string()),
            _ => None,
        }
    }

    pub fn constant(name: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        DataSource::Constant {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn computed(name: impl Into<CompactString>) -> Self {
        DataSource::Computed { name: name.into() }
    }

    pub fn builtin(name: impl Into<CompactString>) -> Self {
        DataSource::Builtin { name: name.into() }
    }

    /// The serialized `type` tag.
    pub fn type_tag(&self) -> &'static str {
        match self {
            DataSource::GlobalVariable { .. } => "global_variable",
            DataSource::StructuredQueueAccess { .. } => "structured_queue_access",
            DataSource::Constant { .. } => "constant",
            DataSource::Url => "url",
            DataSource::Dom { .. } => "dom",
            DataSource::Cookie { .. } => "cookie",
            DataSource::Computed { .. } => "computed",
            DataSource::Builtin { .. } => "builtin",
        }
    }

    /// The identifying name of the source. Empty for whole-URL usage.
    pub fn name(&self) -> &str {
        match self {
            DataSource::GlobalVariable { name, .. }
            | DataSource::Constant { name, .. }
            | DataSource::Cookie { name }
            | DataSource::Computed { name }
            | DataSource::Builtin { name } => name,
            DataSource::StructuredQueueAccess { path, .. } => path,
            DataSource::Dom { selector, .. } => selector,
            DataSource::Url => "",
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, DataSource::Computed { .. })
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::GlobalVariable { name, fallback } => match fallback {
                Some(fb) => write!(f, "window.{} (fallback: {})", name, fb),
                None => write!(f, "window.{}", name),
            },
            DataSource::StructuredQueueAccess {
                queue,
                path,
                fallback,
            } => {
                match queue {
                    Some(queue) => write!(f, "{}.{}", queue, path)?,
                    None => write!(f, "{}", path)?,
                }
                match fallback {
                    Some(fb) => write!(f, " (default: {})", fb),
                    None => Ok(()),
                }
            }
            DataSource::Constant { value, .. } => write!(f, "\"{}\"", value),
            DataSource::Url => write!(f, "page URL"),
            DataSource::Dom { access, selector } => write!(f, "DOM {} `{}`", access.as_str(), selector),
            DataSource::Cookie { name } => write!(f, "cookie {}", name),
            DataSource::Computed { name } => write!(f, "computed ({})", name),
            DataSource::Builtin { name } => write!(f, "builtin {}", name),
        }
    }
}

// ============================================================================
// Variables
// ============================================================================

/// The declared kind of a configuration variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    CustomScript,
    QueueVariable,
    LookupTable,
    PatternLookupTable,
    Constant,
    EventSettings,
    GlobalVariable,
    Cookie,
    Url,
    DomElement,
    /// A kind tag this crate does not interpret.
    Other(CompactString),
    /// No declaration exists (platform builtins and sentinel nodes).
    Unknown,
}

impl VariableKind {
    /// Map an export `type` tag to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "jsm" => VariableKind::CustomScript,
            "v" => VariableKind::QueueVariable,
            "smm" => VariableKind::LookupTable,
            "remm" => VariableKind::PatternLookupTable,
            "c" => VariableKind::Constant,
            "gtes" => VariableKind::EventSettings,
            "j" => VariableKind::GlobalVariable,
            "k" => VariableKind::Cookie,
            "u" => VariableKind::Url,
            "d" => VariableKind::DomElement,
            other => VariableKind::Other(other.into()),
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            VariableKind::LookupTable | VariableKind::PatternLookupTable
        )
    }

    pub fn label(&self) -> &str {
        match self {
            VariableKind::CustomScript => "Custom JavaScript",
            VariableKind::QueueVariable => "Data Layer Variable",
            VariableKind::LookupTable => "Lookup Table",
            VariableKind::PatternLookupTable => "RegEx Table",
            VariableKind::Constant => "Constant",
            VariableKind::EventSettings => "Event Settings",
            VariableKind::GlobalVariable => "JavaScript Variable",
            VariableKind::Cookie => "1st Party Cookie",
            VariableKind::Url => "URL",
            VariableKind::DomElement => "DOM Element",
            VariableKind::Other(tag) => tag,
            VariableKind::Unknown => "unknown",
        }
    }
}

/// One ordered row of a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRow {
    pub key: CompactString,
    pub value: CompactString,
}

/// A configuration variable after interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVariable {
    pub id: CompactString,
    pub name: CompactString,
    pub kind: VariableKind,

    /// Primitive origins this variable reads directly
    pub data_sources: Vec<DataSource>,

    /// Names of other variables referenced through `{{...}}` placeholders
    #[serde(rename = "gtmReferences")]
    pub references: Vec<CompactString>,

    /// Rows of a lookup table, in declared order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_mappings: Option<Vec<LookupRow>>,

    /// Script body, kept for re-inspection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ParsedVariable {
    pub fn new(id: impl Into<CompactString>, name: impl Into<CompactString>, kind: VariableKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            data_sources: Vec::new(),
            references: Vec::new(),
            lookup_mappings: None,
            script: None,
            notes: None,
        }
    }

    /// The literal of the default-value `constant` source, if any.
    pub fn default_value(&self) -> Option<&CompactString> {
        self.data_sources.iter().find_map(|source| match source {
            DataSource::Constant { value, .. } => Some(value),
            _ => None,
        })
    }
}

// ============================================================================
// Output parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamScope {
    Event,
    User,
}

/// An analytics output parameter declared by an aggregator variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSettingsParam {
    pub output_param_name: CompactString,
    pub variable_expression: CompactString,
    pub scope: ParamScope,
    /// Name of the aggregator that declared the parameter
    pub declared_by: CompactString,
}

// ============================================================================
// Environment routing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Staging,
    Development,
    App,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
            Environment::App => "app",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTableEntry {
    pub match_pattern: CompactString,
    pub destination_id: CompactString,
    pub inferred_environment: Option<Environment>,
}

/// The routing table found in the configuration. Entry order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTable {
    pub variable_name: CompactString,
    pub entries: Vec<EnvironmentTableEntry>,
    pub fallback_id: Option<CompactString>,
}

// ============================================================================
// Chains
// ============================================================================

/// The resolved dependency tree for one output parameter.
///
/// Always finite: cycles and the depth bound are represented by sentinel leaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableChain {
    /// Only set on the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_param_name: Option<CompactString>,
    pub variable_name: CompactString,
    pub kind: VariableKind,
    pub data_sources: Vec<DataSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_mappings: Option<Vec<LookupRow>>,
    pub children: Vec<VariableChain>,
    pub depth: usize,
}

impl VariableChain {
    /// A terminal node with a single data source and no children.
    pub fn leaf(name: impl Into<CompactString>, source: DataSource, depth: usize) -> Self {
        Self {
            output_param_name: None,
            variable_name: name.into(),
            kind: VariableKind::Unknown,
            data_sources: vec![source],
            lookup_mappings: None,
            children: Vec::new(),
            depth,
        }
    }

    /// Number of nodes in the tree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Whether this node was inserted in place of further recursion.
    pub fn is_sentinel(&self) -> bool {
        self.kind == VariableKind::Unknown
            && self.children.is_empty()
            && matches!(self.data_sources.as_slice(), [DataSource::Computed { .. }])
    }
}
