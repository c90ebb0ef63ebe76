//! Method synthesis — correctness methods derived from the field set
//!
//! Produces the initializer, the boolean verifier, and (when the field
//! set warrants one) the granular scorer. Bodies are stored with the
//! `def` line at column 0; the generator re-indents them to class
//! level. Synthesis is idempotent: an unchanged model yields
//! byte-identical method bodies.

use crate::literal::{format_value, quote};
use crate::model::{
    ClassDefinition, CorrectnessPattern, FieldDefinition, FieldKind, Method, CORRECT_ATTR,
    GRANULAR_METHOD, INIT_METHOD, VERIFY_METHOD,
};

/// Derive the correctness methods for a class
///
/// Returns an empty vec for a class with zero fields; otherwise the
/// initializer and verifier, plus the granular scorer when there is
/// more than one field or the sole field is a list.
pub fn synthesize(class: &ClassDefinition) -> Vec<Method> {
    if class.fields.is_empty() {
        return Vec::new();
    }

    let mut methods = vec![initializer(class), verifier(class)];
    if wants_granular(class) {
        methods.push(granular(class));
    }
    methods
}

/// Whether the granular scorer is emitted
pub fn wants_granular(class: &ClassDefinition) -> bool {
    class.fields.len() > 1
        || class
            .fields
            .first()
            .is_some_and(|f| f.kind == FieldKind::List)
}

/// Where the stored correctness value for `field` lives
fn expected_ref(pattern: CorrectnessPattern, field: &FieldDefinition) -> String {
    match pattern {
        CorrectnessPattern::Single => format!("self.{}", CORRECT_ATTR),
        CorrectnessPattern::Multiple => format!("self.{}[\"{}\"]", CORRECT_ATTR, field.name),
    }
}

/// The comparison expression shared by the verifier and the scorer
fn comparison(pattern: CorrectnessPattern, field: &FieldDefinition) -> String {
    match (&field.kind, &field.regex) {
        (FieldKind::Regex, Some(spec)) => format!(
            "(re.{}({}, self.{}) is not None) == {}",
            spec.mode.py_function(),
            pattern_literal(&spec.pattern),
            field.name,
            expected_ref(pattern, field)
        ),
        _ => format!(
            "self.{} == {}",
            field.name,
            expected_ref(pattern, field)
        ),
    }
}

/// Regex patterns render as raw strings when that is unambiguous
fn pattern_literal(pattern: &str) -> String {
    if !pattern.contains('"') && !pattern.ends_with('\\') {
        format!("r\"{}\"", pattern)
    } else {
        quote(pattern)
    }
}

fn initializer(class: &ClassDefinition) -> Method {
    let mut code = format!("def {}(self):\n", INIT_METHOD);
    match class.pattern {
        CorrectnessPattern::Single => {
            // Degenerate with several fields: the first field carries
            // the stored value.
            let field = &class.fields[0];
            code.push_str(&format!(
                "    self.{} = {}\n",
                CORRECT_ATTR,
                format_value(&field.correct_value, field)
            ));
        }
        CorrectnessPattern::Multiple => {
            code.push_str(&format!("    self.{} = {{\n", CORRECT_ATTR));
            for field in &class.fields {
                code.push_str(&format!(
                    "        \"{}\": {},\n",
                    field.name,
                    format_value(&field.correct_value, field)
                ));
            }
            code.push_str("    }\n");
        }
    }
    Method {
        name: INIT_METHOD.to_string(),
        code: code.trim_end().to_string(),
        decorator: None,
    }
}

fn verifier(class: &ClassDefinition) -> Method {
    let expr = match class.pattern {
        CorrectnessPattern::Single => comparison(CorrectnessPattern::Single, &class.fields[0]),
        CorrectnessPattern::Multiple => {
            let parts: Vec<_> = class
                .fields
                .iter()
                .map(|f| comparison(CorrectnessPattern::Multiple, f))
                .collect();
            parts.join(" and ")
        }
    };
    Method {
        name: VERIFY_METHOD.to_string(),
        code: format!("def {}(self) -> bool:\n    return {}", VERIFY_METHOD, expr),
        decorator: None,
    }
}

fn granular(class: &ClassDefinition) -> Method {
    let code = if class.fields.len() == 1 {
        // Sole list field: per-element credit against the stored list.
        let field = &class.fields[0];
        let expected = expected_ref(class.pattern, field);
        format!(
            "def {name}(self) -> float:\n\
             \x20   expected = {expected}\n\
             \x20   if not expected:\n\
             \x20       return 1.0 if self.{field} == expected else 0.0\n\
             \x20   matched = sum(1 for got, want in zip(self.{field}, expected) if got == want)\n\
             \x20   return matched / len(expected)",
            name = GRANULAR_METHOD,
            expected = expected,
            field = field.name
        )
    } else if class.pattern == CorrectnessPattern::Single {
        // Degenerate combination: mirror the boolean verifier.
        format!(
            "def {}(self) -> float:\n    return 1.0 if self.{}() else 0.0",
            GRANULAR_METHOD, VERIFY_METHOD
        )
    } else {
        let mut code = format!("def {}(self) -> float:\n    score = 0\n", GRANULAR_METHOD);
        for field in &class.fields {
            code.push_str(&format!(
                "    if {}:\n        score += 1\n",
                comparison(CorrectnessPattern::Multiple, field)
            ));
        }
        code.push_str(&format!("    return score / {}", class.fields.len()));
        code
    };
    Method {
        name: GRANULAR_METHOD.to_string(),
        code,
        decorator: None,
    }
}
