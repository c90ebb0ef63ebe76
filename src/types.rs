//! Type mapping — semantic field kinds to Python annotations
//!
//! Pure in both directions: [`annotation`] derives the annotation text
//! a field serializes with, and [`parse_annotation`] inverts it for
//! the parser. The session re-derives annotations after every field
//! mutation so the stored text never drifts from the model.

use crate::literal::{quote, unquote};
use crate::model::{FieldDefinition, FieldKind, ScalarKind};

/// Annotation used for a literal field with no resolvable values
pub const LITERAL_PLACEHOLDER: &str = "Literal[\"\"]";

/// Fallback members for a union with fewer than two kinds
pub const UNION_FALLBACK: [ScalarKind; 2] = [ScalarKind::String, ScalarKind::Integer];

/// Derive the Python type annotation for a field
pub fn annotation(field: &FieldDefinition) -> String {
    let base = match field.kind {
        FieldKind::String | FieldKind::Regex => "str".to_string(),
        FieldKind::Integer => "int".to_string(),
        FieldKind::Float => "float".to_string(),
        FieldKind::Boolean => "bool".to_string(),
        FieldKind::Date => "date".to_string(),
        FieldKind::Literal => {
            if field.literal_values.is_empty() {
                LITERAL_PLACEHOLDER.to_string()
            } else {
                let values: Vec<_> = field.literal_values.iter().map(|v| quote(v)).collect();
                format!("Literal[{}]", values.join(", "))
            }
        }
        FieldKind::List => format!("List[{}]", scalar_annotation(field.effective_item_kind())),
        FieldKind::Set => format!("Set[{}]", scalar_annotation(field.effective_item_kind())),
        FieldKind::Union => {
            let kinds: &[ScalarKind] = if field.union_kinds.len() < 2 {
                &UNION_FALLBACK
            } else {
                &field.union_kinds
            };
            let members: Vec<_> = kinds.iter().map(|k| scalar_annotation(*k)).collect();
            format!("Union[{}]", members.join(", "))
        }
    };

    if field.required || base.starts_with("Optional[") {
        base
    } else {
        format!("Optional[{}]", base)
    }
}

/// Annotation text for an item/member kind
pub fn scalar_annotation(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "str",
        ScalarKind::Integer => "int",
        ScalarKind::Float => "float",
        ScalarKind::Boolean => "bool",
        ScalarKind::Date => "date",
        ScalarKind::Null => "None",
    }
}

/// Inverse of [`scalar_annotation`]
pub fn scalar_from_annotation(text: &str) -> Option<ScalarKind> {
    match text.trim() {
        "str" => Some(ScalarKind::String),
        "int" => Some(ScalarKind::Integer),
        "float" => Some(ScalarKind::Float),
        "bool" => Some(ScalarKind::Boolean),
        "date" => Some(ScalarKind::Date),
        "None" => Some(ScalarKind::Null),
        _ => None,
    }
}

/// Kind and payload recovered from an annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnnotation {
    pub kind: FieldKind,
    pub required: bool,
    pub literal_values: Vec<String>,
    pub item_kind: Option<ScalarKind>,
    pub union_kinds: Vec<ScalarKind>,
}

impl ParsedAnnotation {
    fn base(kind: FieldKind, required: bool) -> Self {
        Self {
            kind,
            required,
            literal_values: Vec::new(),
            item_kind: None,
            union_kinds: Vec::new(),
        }
    }
}

/// Recover kind, optionality, and payload from annotation text
///
/// Accepts exactly the annotations [`annotation`] emits; anything else
/// is an error with the offending text in the message.
pub fn parse_annotation(text: &str) -> Result<ParsedAnnotation, String> {
    let trimmed = text.trim();

    let (inner, required) = match bracket_body(trimmed, "Optional") {
        Some(body) => (body.trim(), false),
        None => (trimmed, true),
    };
    if bracket_body(inner, "Optional").is_some() {
        return Err(format!("nested Optional annotation: {}", text));
    }

    if let Some(kind) = scalar_from_annotation(inner) {
        return match kind {
            ScalarKind::String => Ok(ParsedAnnotation::base(FieldKind::String, required)),
            ScalarKind::Integer => Ok(ParsedAnnotation::base(FieldKind::Integer, required)),
            ScalarKind::Float => Ok(ParsedAnnotation::base(FieldKind::Float, required)),
            ScalarKind::Boolean => Ok(ParsedAnnotation::base(FieldKind::Boolean, required)),
            ScalarKind::Date => Ok(ParsedAnnotation::base(FieldKind::Date, required)),
            ScalarKind::Null => Err(format!("bare None annotation: {}", text)),
        };
    }

    if let Some(body) = bracket_body(inner, "Literal") {
        let mut values = Vec::new();
        for part in split_top_level(body) {
            let value = unquote(part.trim())
                .ok_or_else(|| format!("unquotable literal value: {}", part.trim()))?;
            values.push(value);
        }
        if values.is_empty() {
            return Err(format!("empty Literal annotation: {}", text));
        }
        // The placeholder for "no values yet" folds back to an empty list.
        if values.len() == 1 && values[0].is_empty() {
            values.clear();
        }
        let mut parsed = ParsedAnnotation::base(FieldKind::Literal, required);
        parsed.literal_values = values;
        return Ok(parsed);
    }

    for (name, kind) in [("List", FieldKind::List), ("Set", FieldKind::Set)] {
        if let Some(body) = bracket_body(inner, name) {
            let item = scalar_from_annotation(body)
                .filter(|k| *k != ScalarKind::Null)
                .ok_or_else(|| format!("unsupported {} item type: {}", name, body.trim()))?;
            let mut parsed = ParsedAnnotation::base(kind, required);
            parsed.item_kind = Some(item);
            return Ok(parsed);
        }
    }

    if let Some(body) = bracket_body(inner, "Union") {
        let mut members = Vec::new();
        for part in split_top_level(body) {
            let member = scalar_from_annotation(part.trim())
                .ok_or_else(|| format!("unsupported Union member: {}", part.trim()))?;
            members.push(member);
        }
        if members.len() < 2 {
            return Err(format!("Union needs at least two members: {}", text));
        }
        let mut parsed = ParsedAnnotation::base(FieldKind::Union, required);
        parsed.union_kinds = members;
        return Ok(parsed);
    }

    Err(format!("unsupported annotation: {}", text))
}

/// `"Name[body]"` → `Some("body")`
fn bracket_body<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('['))
        .and_then(|rest| rest.strip_suffix(']'))
}

/// Split on commas outside quotes and brackets
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;

    for (i, c) in text.char_indices() {
        if let Some(q) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !text[start..].trim().is_empty() {
        parts.push(&text[start..]);
    }
    parts
}
