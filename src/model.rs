//! Answer-schema types — the core data model
//!
//! A `ClassDefinition` describes one generated answer class: its name,
//! base class, ordered fields, and correctness pattern. Each
//! `FieldDefinition` pairs a semantic kind with the value that counts
//! as correct for that field.
//!
//! The three correctness methods (`set_correct_answer`, `verify`,
//! `verify_granular`) are never stored on the model; they are derived
//! from the field set by [`crate::synth::synthesize`] so they can
//! never drift from the fields that produced them. Methods the core
//! does not own survive round-trips in `extra_methods`.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The fixed base class every generated answer class extends.
pub const BASE_CLASS: &str = "BaseAnswer";

/// Name of the synthesized initializer method.
pub const INIT_METHOD: &str = "set_correct_answer";
/// Name of the synthesized boolean verifier.
pub const VERIFY_METHOD: &str = "verify";
/// Name of the synthesized granular scorer.
pub const GRANULAR_METHOD: &str = "verify_granular";
/// Attribute on the base class holding the stored correctness value.
pub const CORRECT_ATTR: &str = "correct_answer";

/// Semantic field kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum FieldKind {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Literal,
    List,
    Set,
    Union,
    Regex,
}

/// Item/member kinds used inside `list`, `set`, and `union` fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ScalarKind {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
    /// Absence; legal only as a union member
    #[serde(rename = "none")]
    Null,
}

/// A correctness value, tagged by shape
///
/// Decoded and encoded only at the parser/generator boundary; inside
/// the model it always carries its tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AnswerValue>),
    Absent,
}

impl Default for AnswerValue {
    fn default() -> Self {
        AnswerValue::Absent
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Int(i) => write!(f, "{}", i),
            AnswerValue::Float(fl) => write!(f, "{}", fl),
            AnswerValue::Str(s) => write!(f, "{}", s),
            AnswerValue::List(items) => {
                let strs: Vec<_> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", strs.join(", "))
            }
            AnswerValue::Absent => write!(f, "null"),
        }
    }
}

impl AnswerValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, AnswerValue::Absent)
    }
}

/// Optional per-field validation rules, mapped onto `Field(...)` kwargs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ValidationRules {
    /// Minimum string length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum string length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Numeric lower bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<f64>,

    /// Numeric upper bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<f64>,

    /// Constraining pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.ge.is_none()
            && self.le.is_none()
            && self.pattern.is_none()
    }
}

/// How a regex-match field applies its pattern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum RegexMode {
    /// `re.search` — match anywhere
    #[default]
    Search,
    /// `re.match` — match at the start
    Match,
    /// `re.fullmatch` — match the whole value
    Fullmatch,
}

impl RegexMode {
    /// The `re` module function this mode compiles to
    pub fn py_function(self) -> &'static str {
        match self {
            RegexMode::Search => "search",
            RegexMode::Match => "match",
            RegexMode::Fullmatch => "fullmatch",
        }
    }
}

/// Payload of a regex-match field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RegexSpec {
    /// The pattern applied to the field's value
    pub pattern: String,

    /// How the pattern is applied
    #[serde(default)]
    pub mode: RegexMode,

    /// Whether a match is the correct outcome. This is the field's
    /// correctness value; `correct_value` mirrors it as `Bool`.
    #[serde(default = "default_true")]
    pub expected: bool,
}

fn default_true() -> bool {
    true
}

/// One answer attribute: name, semantic kind, and its correctness value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FieldDefinition {
    /// Field name (a valid Python identifier, unique within the class)
    pub name: String,

    /// Semantic kind
    pub kind: FieldKind,

    /// Whether a value must be present (`false` wraps the annotation
    /// in `Optional[...]`)
    #[serde(default = "default_true")]
    pub required: bool,

    /// Human-readable description, rendered into `Field(description=…)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// For literal fields: the admissible values, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literal_values: Vec<String>,

    /// For list/set fields: the element kind (string when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_kind: Option<ScalarKind>,

    /// For union fields: the member kinds, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union_kinds: Vec<ScalarKind>,

    /// For regex-match fields: pattern, mode, and expected outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexSpec>,

    /// The value that counts as correct for this field
    #[serde(default, skip_serializing_if = "AnswerValue::is_absent")]
    pub correct_value: AnswerValue,

    /// Optional validation rules
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub rules: ValidationRules,
}

impl FieldDefinition {
    /// A required field of the given kind with no correctness value yet
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
            literal_values: Vec::new(),
            item_kind: None,
            union_kinds: Vec::new(),
            regex: None,
            correct_value: AnswerValue::Absent,
            rules: ValidationRules::default(),
        }
    }

    /// Element kind with the default applied
    pub fn effective_item_kind(&self) -> ScalarKind {
        self.item_kind.unwrap_or(ScalarKind::String)
    }

    /// Fill defaults so a committed field survives a round-trip
    /// byte-for-byte: list/set item kinds become explicit, degenerate
    /// unions collapse to the annotation fallback, and the correctness
    /// value is re-tagged to the canonical variant for the kind.
    pub fn normalize(&mut self) {
        match self.kind {
            FieldKind::List | FieldKind::Set => {
                self.item_kind = Some(self.effective_item_kind());
            }
            FieldKind::Union => {
                if self.union_kinds.len() < 2 {
                    self.union_kinds = vec![ScalarKind::String, ScalarKind::Integer];
                }
            }
            FieldKind::Regex => {
                if let Some(regex) = &self.regex {
                    self.correct_value = AnswerValue::Bool(regex.expected);
                }
            }
            _ => {}
        }
        self.correct_value = crate::literal::canonical_value(&self.correct_value, self);
        if let FieldKind::Regex = self.kind {
            if let (Some(regex), AnswerValue::Bool(expected)) =
                (self.regex.as_mut(), &self.correct_value)
            {
                regex.expected = *expected;
            }
        }
    }
}

/// Whether the stored ground truth is one scalar or a per-field mapping
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CorrectnessPattern {
    /// `self.correct_answer` holds the sole field's value
    Single,
    /// `self.correct_answer` is a dict keyed by field name
    #[default]
    Multiple,
}

/// A class method: name, dedented body, optional decorator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Method {
    pub name: String,

    /// Method source with the `def` line at column 0; the generator
    /// re-indents to class level.
    pub code: String,

    /// Decorator name without the leading `@`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator: Option<String>,
}

/// A complete answer-class definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(
    title = "Answer class definition",
    description = "Typed answer schema synchronized with a Python class"
)]
pub struct ClassDefinition {
    /// Class name
    pub name: String,

    /// Base class (fixed for the host verification engine)
    #[serde(default = "default_base_class")]
    pub base_class: String,

    /// Optional one-line class docstring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    /// Methods the core does not own, preserved verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_methods: Vec<Method>,

    /// Correctness representation
    #[serde(default)]
    pub pattern: CorrectnessPattern,
}

fn default_base_class() -> String {
    BASE_CLASS.to_string()
}

impl ClassDefinition {
    /// An empty shell with zero fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_class: default_base_class(),
            docstring: None,
            fields: Vec::new(),
            extra_methods: Vec::new(),
            pattern: CorrectnessPattern::default(),
        }
    }

    /// Parse a model from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Model(e.to_string()))
    }

    /// Serialize the model to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::Model(e.to_string()))
    }

    /// Parse a model from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Model(e.to_string()))
    }

    /// Serialize the model to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Model(e.to_string()))
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Compute hash of the model for change detection
    pub fn hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = self.to_yaml().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }
}
