//! Value formatting — correctness values to Python literal text
//!
//! Total over every input: malformed numerics coerce to `0`/`0.0`,
//! absent values render as `None`, and anything unrecognized falls
//! back to its string-literal rendering. The same coercion rules back
//! [`canonical_value`], which re-tags a value to the canonical variant
//! for its field's kind when a draft is committed.

use crate::model::{AnswerValue, FieldDefinition, FieldKind, ScalarKind};

/// Render a correctness value as Python literal text for its field
pub fn format_value(value: &AnswerValue, field: &FieldDefinition) -> String {
    if value.is_absent() {
        return "None".to_string();
    }

    match field.kind {
        FieldKind::String | FieldKind::Literal | FieldKind::Date => quote(&display(value)),
        FieldKind::Integer => coerce_int(value).to_string(),
        FieldKind::Float => float_literal(coerce_float(value)),
        FieldKind::Boolean | FieldKind::Regex => bool_literal(coerce_bool(value)).to_string(),
        FieldKind::List => match value {
            AnswerValue::List(items) => {
                let item_kind = field.effective_item_kind();
                let parts: Vec<_> = items.iter().map(|v| format_scalar(v, item_kind)).collect();
                format!("[{}]", parts.join(", "))
            }
            other => quote(&display(other)),
        },
        FieldKind::Set => match value {
            AnswerValue::List(items) if items.is_empty() => "set()".to_string(),
            AnswerValue::List(items) => {
                let item_kind = field.effective_item_kind();
                let parts: Vec<_> = items.iter().map(|v| format_scalar(v, item_kind)).collect();
                format!("{{{}}}", parts.join(", "))
            }
            other => quote(&display(other)),
        },
        FieldKind::Union => format_natural(value),
    }
}

/// Render a value as a scalar of the given item/member kind
pub fn format_scalar(value: &AnswerValue, kind: ScalarKind) -> String {
    if value.is_absent() {
        return "None".to_string();
    }
    match kind {
        ScalarKind::String | ScalarKind::Date => quote(&display(value)),
        ScalarKind::Integer => coerce_int(value).to_string(),
        ScalarKind::Float => float_literal(coerce_float(value)),
        ScalarKind::Boolean => bool_literal(coerce_bool(value)).to_string(),
        ScalarKind::Null => "None".to_string(),
    }
}

/// Render a value by its own tag, without a kind context
fn format_natural(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Bool(b) => bool_literal(*b).to_string(),
        AnswerValue::Int(i) => i.to_string(),
        AnswerValue::Float(f) => float_literal(*f),
        AnswerValue::Str(s) => quote(s),
        AnswerValue::List(items) => {
            let parts: Vec<_> = items.iter().map(format_natural).collect();
            format!("[{}]", parts.join(", "))
        }
        AnswerValue::Absent => "None".to_string(),
    }
}

/// The two canonical boolean literals
pub fn bool_literal(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Float literal that always carries a decimal point
pub fn float_literal(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Double-quoted Python string with escaping
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decode a Python string literal (single, double, or triple quoted,
/// optional `r` prefix). Returns `None` for anything else.
pub fn unquote(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let (raw, body) = match trimmed.strip_prefix('r').or_else(|| trimmed.strip_prefix('R')) {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let inner = strip_quotes(body)?;
    if raw {
        return Some(inner.to_string());
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                // Unknown escape: keep it verbatim, as Python does.
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Some(out)
}

fn strip_quotes(body: &str) -> Option<&str> {
    for delim in ["\"\"\"", "'''"] {
        if body.len() >= 6 && body.starts_with(delim) && body.ends_with(delim) {
            return Some(&body[3..body.len() - 3]);
        }
    }
    for delim in ['"', '\''] {
        if body.len() >= 2 && body.starts_with(delim) && body.ends_with(delim) {
            return Some(&body[1..body.len() - 1]);
        }
    }
    None
}

/// String form of a value, used by string-kind formatting and coercion
pub fn display(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Str(s) => s.clone(),
        AnswerValue::Bool(b) => bool_literal(*b).to_string(),
        other => other.to_string(),
    }
}

/// Coerce to an integer; malformed input becomes 0
pub fn coerce_int(value: &AnswerValue) -> i64 {
    match value {
        AnswerValue::Int(i) => *i,
        AnswerValue::Float(f) if f.is_finite() => *f as i64,
        AnswerValue::Bool(b) => i64::from(*b),
        AnswerValue::Str(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Coerce to a float; malformed input becomes 0.0
pub fn coerce_float(value: &AnswerValue) -> f64 {
    match value {
        AnswerValue::Float(f) if f.is_finite() => *f,
        AnswerValue::Int(i) => *i as f64,
        AnswerValue::Bool(b) => f64::from(u8::from(*b)),
        AnswerValue::Str(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce to a boolean
pub fn coerce_bool(value: &AnswerValue) -> bool {
    match value {
        AnswerValue::Bool(b) => *b,
        AnswerValue::Int(i) => *i != 0,
        AnswerValue::Float(f) => *f != 0.0,
        AnswerValue::Str(s) => matches!(s.trim(), "true" | "True" | "1"),
        AnswerValue::List(items) => !items.is_empty(),
        AnswerValue::Absent => false,
    }
}

/// Re-tag a value to the canonical variant for its field's kind
///
/// Mirrors [`format_value`]: the canonical form of a value is exactly
/// what the parser recovers from the formatter's output, which is what
/// makes committed models round-trip byte-for-byte.
pub fn canonical_value(value: &AnswerValue, field: &FieldDefinition) -> AnswerValue {
    if value.is_absent() {
        return AnswerValue::Absent;
    }
    match field.kind {
        FieldKind::String | FieldKind::Literal | FieldKind::Date => {
            AnswerValue::Str(display(value))
        }
        FieldKind::Integer => AnswerValue::Int(coerce_int(value)),
        FieldKind::Float => AnswerValue::Float(coerce_float(value)),
        FieldKind::Boolean | FieldKind::Regex => AnswerValue::Bool(coerce_bool(value)),
        FieldKind::List | FieldKind::Set => match value {
            AnswerValue::List(items) => {
                let item_kind = field.effective_item_kind();
                AnswerValue::List(
                    items
                        .iter()
                        .map(|v| canonical_scalar(v, item_kind))
                        .collect(),
                )
            }
            other => AnswerValue::Str(display(other)),
        },
        FieldKind::Union => canonical_natural(value),
    }
}

fn canonical_scalar(value: &AnswerValue, kind: ScalarKind) -> AnswerValue {
    if value.is_absent() {
        return AnswerValue::Absent;
    }
    match kind {
        ScalarKind::String | ScalarKind::Date => AnswerValue::Str(display(value)),
        ScalarKind::Integer => AnswerValue::Int(coerce_int(value)),
        ScalarKind::Float => AnswerValue::Float(coerce_float(value)),
        ScalarKind::Boolean => AnswerValue::Bool(coerce_bool(value)),
        ScalarKind::Null => AnswerValue::Absent,
    }
}

fn canonical_natural(value: &AnswerValue) -> AnswerValue {
    match value {
        AnswerValue::Float(f) if !f.is_finite() => AnswerValue::Float(0.0),
        AnswerValue::List(items) => {
            AnswerValue::List(items.iter().map(canonical_natural).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;

    fn field(kind: FieldKind) -> FieldDefinition {
        FieldDefinition::new("x", kind)
    }

    #[test]
    fn test_string_quoting() {
        let f = field(FieldKind::String);
        assert_eq!(
            format_value(&AnswerValue::Str("Paris".into()), &f),
            r#""Paris""#
        );
        assert_eq!(
            format_value(&AnswerValue::Str(r#"say "hi""#.into()), &f),
            r#""say \"hi\"""#
        );
    }

    #[test]
    fn test_bool_literals() {
        let f = field(FieldKind::Boolean);
        assert_eq!(format_value(&AnswerValue::Bool(true), &f), "True");
        assert_eq!(format_value(&AnswerValue::Bool(false), &f), "False");
        assert_eq!(format_value(&AnswerValue::Str("true".into()), &f), "True");
    }

    #[test]
    fn test_numeric_coercion() {
        let f = field(FieldKind::Integer);
        assert_eq!(format_value(&AnswerValue::Str("42".into()), &f), "42");
        assert_eq!(format_value(&AnswerValue::Str("oops".into()), &f), "0");

        let f = field(FieldKind::Float);
        assert_eq!(format_value(&AnswerValue::Int(5), &f), "5.0");
        assert_eq!(format_value(&AnswerValue::Str("bad".into()), &f), "0.0");
        assert_eq!(format_value(&AnswerValue::Float(0.25), &f), "0.25");
    }

    #[test]
    fn test_list_per_item_kind() {
        let mut f = field(FieldKind::List);
        f.item_kind = Some(ScalarKind::Integer);
        let value = AnswerValue::List(vec![
            AnswerValue::Int(1),
            AnswerValue::Str("2".into()),
            AnswerValue::Str("x".into()),
        ]);
        assert_eq!(format_value(&value, &f), "[1, 2, 0]");
    }

    #[test]
    fn test_set_literals() {
        let f = field(FieldKind::Set);
        let value = AnswerValue::List(vec![
            AnswerValue::Str("a".into()),
            AnswerValue::Str("b".into()),
        ]);
        assert_eq!(format_value(&value, &f), r#"{"a", "b"}"#);
        assert_eq!(format_value(&AnswerValue::List(vec![]), &f), "set()");
    }

    #[test]
    fn test_absent_is_none() {
        for kind in [FieldKind::String, FieldKind::Integer, FieldKind::List] {
            assert_eq!(format_value(&AnswerValue::Absent, &field(kind)), "None");
        }
    }

    #[test]
    fn test_fallback_never_fails() {
        // A non-list value on a list field renders as a string literal.
        let f = field(FieldKind::List);
        assert_eq!(format_value(&AnswerValue::Int(3), &f), r#""3""#);
    }

    #[test]
    fn test_quote_unquote_round_trip() {
        for s in ["plain", "with \"quotes\"", "tab\there", "back\\slash", ""] {
            assert_eq!(unquote(&quote(s)).as_deref(), Some(s));
        }
    }

    #[test]
    fn test_unquote_variants() {
        assert_eq!(unquote("'single'").as_deref(), Some("single"));
        assert_eq!(unquote("\"\"\"doc\"\"\"").as_deref(), Some("doc"));
        assert_eq!(unquote(r#"r"\d+""#).as_deref(), Some(r"\d+"));
        assert_eq!(unquote("not quoted"), None);
    }

    #[test]
    fn test_canonical_matches_formatter() {
        let mut f = field(FieldKind::List);
        f.item_kind = Some(ScalarKind::Integer);
        let messy = AnswerValue::List(vec![AnswerValue::Str("7".into()), AnswerValue::Bool(true)]);
        let canonical = canonical_value(&messy, &f);
        assert_eq!(
            canonical,
            AnswerValue::List(vec![AnswerValue::Int(7), AnswerValue::Int(1)])
        );
        assert_eq!(format_value(&messy, &f), format_value(&canonical, &f));
    }
}
