//! Class generation — model to Python source text
//!
//! Pure and deterministic: identical models always produce
//! byte-identical text. Methods are re-synthesized on every call, so
//! the emitted class can never carry stale correctness logic.

use crate::literal::{float_literal, quote};
use crate::model::{ClassDefinition, FieldDefinition};
use crate::synth::synthesize;
use crate::types::annotation;
use crate::util::indent;

/// Field lines longer than this wrap the metadata call
const MAX_LINE: usize = 88;

/// Serialize a class definition to source text
pub fn generate(class: &ClassDefinition) -> String {
    let mut out = format!("class {}({}):\n", class.name, class.base_class);
    let mut has_body = false;

    if let Some(docstring) = &class.docstring {
        out.push_str(&format!("    {}\n", docstring_literal(docstring)));
        has_body = true;
    }

    for field in &class.fields {
        out.push_str(&field_line(field));
        out.push('\n');
        has_body = true;
    }

    let methods = synthesize(class);
    for method in methods.iter().chain(class.extra_methods.iter()) {
        out.push('\n');
        if let Some(decorator) = &method.decorator {
            out.push_str(&format!("    @{}\n", decorator));
        }
        out.push_str(&indent(&method.code, 4));
        out.push('\n');
        has_body = true;
    }

    if !has_body {
        out.push_str("    pass\n");
    }

    out
}

/// One class-body line (or wrapped block) for a field
fn field_line(field: &FieldDefinition) -> String {
    let ann = annotation(field);
    let kwargs = metadata_kwargs(field);

    if kwargs.is_empty() {
        return format!("    {}: {}", field.name, ann);
    }

    let inline = format!("    {}: {} = Field({})", field.name, ann, kwargs.join(", "));
    if inline.len() <= MAX_LINE {
        return inline;
    }

    let mut out = format!("    {}: {} = Field(\n", field.name, ann);
    for kwarg in &kwargs {
        out.push_str(&format!("        {},\n", kwarg));
    }
    out.push_str("    )");
    out
}

/// `Field(...)` keyword arguments, in fixed order
fn metadata_kwargs(field: &FieldDefinition) -> Vec<String> {
    let mut kwargs = Vec::new();

    if let Some(description) = &field.description {
        kwargs.push(format!("description={}", quote(description)));
    }
    if let Some(n) = field.rules.min_length {
        kwargs.push(format!("min_length={}", n));
    }
    if let Some(n) = field.rules.max_length {
        kwargs.push(format!("max_length={}", n));
    }
    if let Some(bound) = field.rules.ge {
        kwargs.push(format!("ge={}", float_literal(bound)));
    }
    if let Some(bound) = field.rules.le {
        kwargs.push(format!("le={}", float_literal(bound)));
    }
    if let Some(pattern) = &field.rules.pattern {
        kwargs.push(format!("pattern={}", quote(pattern)));
    }
    if let Some(spec) = &field.regex {
        kwargs.push(format!(
            "json_schema_extra={{\"regex_pattern\": {}, \"regex_mode\": {}}}",
            quote(&spec.pattern),
            quote(spec.mode.py_function())
        ));
    }

    kwargs
}

fn docstring_literal(text: &str) -> String {
    let quoted = quote(text);
    let inner = &quoted[1..quoted.len() - 1];
    format!("\"\"\"{}\"\"\"", inner)
}
