//! Snapshot records: one fixed-shape value type per family.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::change::{AttributeDelta, ChangeEntry};
use crate::identity::Normalizer;

/// The three orthogonal record families compared by an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Field,
    Model,
    #[serde(rename = "xmlid")]
    XmlId,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Field => write!(f, "field"),
            Family::Model => write!(f, "model"),
            Family::XmlId => write!(f, "xmlid"),
        }
    }
}

/// The `(module, model, name)` tuple addressing one record of a family.
///
/// Model records leave `name` empty; their model is their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    pub module: String,
    pub model: String,
    pub name: String,
}

impl Identity {
    pub fn new(module: impl Into<String>, model: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            model: model.into(),
            name: name.into(),
        }
    }

    /// Identity of a model record.
    pub fn of_model(module: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(module, model, String::new())
    }

    /// Column-aligned form used as the prefix of report lines.
    pub fn padded(&self) -> String {
        if self.name.is_empty() {
            format!("{:<12} / {}", self.module, self.model)
        } else {
            format!("{:<12} / {:<24} / {}", self.module, self.model, self.name)
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} / {}", self.module, self.model)
        } else {
            write!(f, "{} / {} / {}", self.module, self.model, self.name)
        }
    }
}

fn default_stored() -> bool {
    true
}

/// One declared attribute of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub module: String,
    pub model: String,
    pub name: String,
    /// Field kind, e.g. `char`, `many2one`.
    #[serde(rename = "field_type")]
    pub kind: String,
    #[serde(default = "default_stored")]
    pub stored: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub related: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub label: Option<String>,
    /// Target model of relational fields.
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub selection_keys: Vec<String>,
}

impl FieldRecord {
    /// A stored, non-computed field with no label or relation.
    pub fn new(
        module: impl Into<String>,
        model: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            model: model.into(),
            name: name.into(),
            kind: kind.into(),
            stored: true,
            computed: false,
            related: false,
            required: false,
            label: None,
            relation: None,
            selection_keys: Vec::new(),
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as computed and not stored.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.stored = false;
        self
    }
}

/// Kind of a declared model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    #[serde(alias = "")]
    Regular,
    Transient,
    Abstract,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Regular => write!(f, "regular"),
            ModelKind::Transient => write!(f, "transient"),
            ModelKind::Abstract => write!(f, "abstract"),
        }
    }
}

/// One declared entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub module: String,
    pub model: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Module that first declared the model.
    #[serde(default)]
    pub original_module: Option<String>,
    #[serde(default, rename = "model_type")]
    pub kind: ModelKind,
}

impl ModelRecord {
    pub fn new(module: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            model: model.into(),
            label: None,
            original_module: None,
            kind: ModelKind::Regular,
        }
    }

    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_original_module(mut self, module: impl Into<String>) -> Self {
        self.original_module = Some(module.into());
        self
    }
}

/// One externally addressable reference to a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlIdRecord {
    pub module: String,
    pub model: String,
    pub name: String,
    #[serde(default)]
    pub noupdate: bool,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl XmlIdRecord {
    /// An updatable xml id; prefix and suffix are split from a dotted `name`.
    pub fn new(module: impl Into<String>, model: impl Into<String>, name: impl Into<String>) -> Self {
        let module = module.into();
        let name = name.into();
        let (prefix, suffix) = match name.split_once('.') {
            Some((prefix, suffix)) => (prefix.to_string(), suffix.to_string()),
            None => (module.clone(), name.clone()),
        };
        Self {
            prefix: Some(prefix),
            suffix: Some(suffix),
            module,
            model: model.into(),
            name,
            noupdate: false,
            domain: None,
        }
    }

    pub fn noupdate(mut self) -> Self {
        self.noupdate = true;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Family-specific behaviour the reconciliation engine relies on.
///
/// Implementations live next to the engine in `diff::{fields, models, xmlids}`.
pub trait Record: Clone + fmt::Debug + Send + Sync {
    const FAMILY: Family;

    /// Raw identity as captured in the snapshot.
    fn identity(&self) -> Identity;

    /// Attribute differences between `self` (remote) and its matched local record.
    fn deltas(&self, local: &Self, normalizer: &Normalizer<'_>) -> Vec<AttributeDelta>;

    /// Descriptive bits appended to `NEW`/`DEL` lines.
    fn summary(&self, _added: bool) -> Vec<String> {
        Vec::new()
    }

    /// Cross-reference line for the `general` bucket, if this family keeps one.
    fn general_note(_entry: &ChangeEntry) -> Option<String> {
        None
    }
}
