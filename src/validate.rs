//! Validation — categorized issues for names, fields, and classes
//!
//! All functions here are pure, total, and advisory: they inform the
//! editing UI, and only ERROR-level issues block a field commit. The
//! generator still runs on a model carrying warnings.

use crate::model::{
    ClassDefinition, FieldDefinition, FieldKind, ScalarKind, CORRECT_ATTR, GRANULAR_METHOD,
    INIT_METHOD, VERIFY_METHOD,
};
use crate::util::{is_pascal_case, is_snake_case};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// A validation issue for a name, field, or class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    /// The field the issue belongs to, when class-level aggregation applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Issue {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn suggestion(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Suggestion,
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn for_field(mut self, name: &str) -> Self {
        self.field = Some(name.to_string());
        self
    }
}

/// Result of validating a whole class
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Python keywords a field or class may not shadow
const PY_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Reserved prefix used by the base-model framework
const MODEL_PREFIX: &str = "model_";

/// Base-model framework metadata/serialization names
const MODEL_RESERVED: &[&str] = &[
    "dict",
    "json",
    "copy",
    "schema",
    "schema_json",
    "construct",
    "validate",
    "parse_obj",
    "parse_raw",
    "parse_file",
    "fields",
];

/// Builtin type names a field would shadow
const BUILTIN_TYPES: &[&str] = &[
    "str", "int", "float", "bool", "list", "dict", "set", "tuple", "bytes", "object", "type",
];

/// Attributes of the fixed base class
fn base_class_reserved() -> [&'static str; 5] {
    ["id", CORRECT_ATTR, INIT_METHOD, VERIFY_METHOD, GRANULAR_METHOD]
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|_| unreachable!())
    })
}

/// Validate a field name
pub fn validate_identifier(name: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if name.is_empty() {
        issues.push(Issue::error("E101", "Field name cannot be empty"));
        return issues;
    }

    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        issues.push(Issue::error(
            "E103",
            format!("Field name '{}' cannot start with a digit", name),
        ));
    } else if !identifier_pattern().is_match(name) {
        issues.push(Issue::error(
            "E102",
            format!(
                "Field name '{}' must start with a letter or underscore, followed by letters, digits, or underscores",
                name
            ),
        ));
    }

    if PY_KEYWORDS.contains(&name) {
        issues.push(Issue::error(
            "E104",
            format!("'{}' is a Python keyword", name),
        ));
    }

    if name.starts_with(MODEL_PREFIX) || MODEL_RESERVED.contains(&name) {
        issues.push(Issue::error(
            "E105",
            format!("'{}' is reserved by the base-model framework", name),
        ));
    }

    if base_class_reserved().contains(&name) {
        issues.push(Issue::error(
            "E106",
            format!("'{}' is a reserved attribute of the answer base class", name),
        ));
    }

    if BUILTIN_TYPES.contains(&name) {
        issues.push(Issue::warning(
            "W101",
            format!("'{}' shadows a builtin type name", name),
        ));
    }

    if name.contains("__") {
        issues.push(Issue::warning(
            "W102",
            format!("'{}' contains a double underscore, reserved for special members", name),
        ));
    }

    if identifier_pattern().is_match(name) && !is_snake_case(name) {
        issues.push(Issue::warning(
            "W103",
            format!("'{}' is not lower_snake_case", name),
        ));
    }

    if name.len() > 50 {
        issues.push(Issue::warning(
            "W104",
            format!("'{}' is longer than 50 characters; consider shortening it", name),
        ));
    }

    if name.len() == 1 {
        issues.push(Issue::suggestion(
            "S101",
            format!("Single-character name '{}' is hard to read", name),
        ));
    }

    issues
}

/// Validate a field's type configuration
pub fn validate_field_type(field: &FieldDefinition) -> Vec<Issue> {
    let mut issues = Vec::new();

    match field.kind {
        FieldKind::Literal => {
            let resolvable = field
                .literal_values
                .iter()
                .filter(|v| !v.trim().is_empty())
                .count();
            if resolvable == 0 {
                issues.push(Issue::error(
                    "E201",
                    "Literal field needs at least one non-blank value",
                ));
            }
            if field.literal_values.iter().any(|v| v.trim().is_empty()) {
                issues.push(Issue::warning("W202", "Literal field has a blank value"));
            }
            let mut seen = std::collections::HashSet::new();
            for value in &field.literal_values {
                if !seen.insert(value.to_lowercase()) {
                    issues.push(Issue::warning(
                        "W201",
                        format!("Duplicate literal value '{}' (case-insensitive)", value),
                    ));
                }
            }
        }
        FieldKind::List | FieldKind::Set => {
            if field.item_kind.is_none() {
                issues.push(Issue::warning(
                    "W203",
                    "No item kind given; defaulting to string",
                ));
            }
        }
        FieldKind::Union => {
            if field.union_kinds.len() < 2 {
                issues.push(Issue::warning(
                    "W204",
                    "Union field has fewer than two member kinds",
                ));
            }
            if field.required && field.union_kinds.contains(&ScalarKind::Null) {
                issues.push(Issue::warning(
                    "W205",
                    "Union includes absence but the field is required",
                ));
            }
        }
        FieldKind::Regex => {
            if let Some(spec) = &field.regex {
                if Regex::new(&spec.pattern).is_err() {
                    issues.push(Issue::warning(
                        "W206",
                        format!("Pattern '{}' does not compile", spec.pattern),
                    ));
                }
            }
        }
        FieldKind::Date => {
            if let crate::model::AnswerValue::Str(s) = &field.correct_value {
                if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                    issues.push(Issue::warning(
                        "W207",
                        format!("'{}' is not an ISO date (expected YYYY-MM-DD)", s),
                    ));
                }
            }
        }
        _ => {}
    }

    match &field.description {
        None => issues.push(Issue::suggestion("S201", "Consider adding a description")),
        Some(d) if d.trim().len() < 10 => {
            issues.push(Issue::suggestion("S202", "Description is very short"));
        }
        Some(d) if d.len() > 500 => {
            issues.push(Issue::suggestion("S203", "Description is very long"));
        }
        Some(_) => {}
    }

    issues
}

/// Validate a whole class definition
pub fn validate_class(class: &ClassDefinition) -> ValidationReport {
    let mut report = ValidationReport::default();

    if class.name.is_empty()
        || !identifier_pattern().is_match(&class.name)
        || PY_KEYWORDS.contains(&class.name.as_str())
    {
        report.issues.push(Issue::error(
            "E301",
            format!("'{}' is not a usable class name", class.name),
        ));
    } else if !is_pascal_case(&class.name) {
        report.issues.push(Issue::warning(
            "W301",
            format!("Class name '{}' is not PascalCase", class.name),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for field in &class.fields {
        if !seen.insert(field.name.as_str()) {
            report.issues.push(
                Issue::error("E302", format!("Duplicate field name '{}'", field.name))
                    .for_field(&field.name),
            );
        }

        for issue in validate_identifier(&field.name) {
            report.issues.push(issue.for_field(&field.name));
        }
        for issue in validate_field_type(field) {
            report.issues.push(issue.for_field(&field.name));
        }

        if field.kind == FieldKind::Literal && field.literal_values.len() < 2 {
            report.issues.push(
                Issue::warning(
                    "W302",
                    "A classification field should offer at least two values",
                )
                .for_field(&field.name),
            );
        }
    }

    if class.pattern == crate::model::CorrectnessPattern::Single && class.fields.len() > 1 {
        report.issues.push(Issue::warning(
            "W303",
            "Single correctness pattern with multiple fields falls back to degenerate verification",
        ));
    }

    report
}
