//! Property-based tests for the round-trip contract
//!
//! Uses proptest to generate random committed models and verify that
//! parse(generate(model)) recovers an equivalent model and that
//! generation is byte-stable across the loop.

use answersync::{
    generate, parse, AnswerValue, ClassDefinition, CorrectnessPattern, FieldDefinition, FieldKind,
    Method, RegexMode, RegexSpec, ScalarKind,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_parse_recovers_model(class in any_class()) {
        let text = generate(&class);
        let reparsed = parse(&text).expect("generated text must parse");
        prop_assert_eq!(reparsed, class);
    }

    #[test]
    fn test_generate_is_idempotent(class in any_class()) {
        let text = generate(&class);
        let reparsed = parse(&text).expect("generated text must parse");
        prop_assert_eq!(generate(&reparsed), text);
    }

    #[test]
    fn test_parse_never_panics(source in "\\PC{0,200}") {
        // Arbitrary input either parses or fails with a message;
        // it must never panic or return a partial model.
        let _ = parse(&source);
    }
}

const WORD_POOL: &[&str] = &["alpha", "beta", "gamma", "delta"];

fn any_scalar_kind() -> impl Strategy<Value = ScalarKind> {
    prop_oneof![
        Just(ScalarKind::String),
        Just(ScalarKind::Integer),
        Just(ScalarKind::Float),
        Just(ScalarKind::Boolean),
    ]
}

fn nice_float() -> impl Strategy<Value = f64> {
    // Eighths survive decimal formatting exactly.
    (-8000i32..8000).prop_map(|i| f64::from(i) / 8.0)
}

fn any_string_value() -> impl Strategy<Value = AnswerValue> {
    "[a-zA-Z0-9 .,!?'\"-]{0,16}".prop_map(AnswerValue::Str)
}

fn scalar_value(kind: ScalarKind) -> BoxedStrategy<AnswerValue> {
    match kind {
        ScalarKind::String | ScalarKind::Date => any_string_value().boxed(),
        ScalarKind::Integer => (-1000i64..1000).prop_map(AnswerValue::Int).boxed(),
        ScalarKind::Float => nice_float().prop_map(AnswerValue::Float).boxed(),
        ScalarKind::Boolean => any::<bool>().prop_map(AnswerValue::Bool).boxed(),
        ScalarKind::Null => Just(AnswerValue::Absent).boxed(),
    }
}

fn any_description() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some("The expected response for this part".to_string())),
        1 => Just(Some("say \"hi\" back".to_string())),
        1 => "[a-z ]{0,120}".prop_map(Some),
    ]
}

/// A committed field of one random kind, with a matching correctness
/// value, mirroring what a session commit would produce.
fn any_field(name: &'static str) -> BoxedStrategy<FieldDefinition> {
    let string_field = any_string_value()
        .prop_map(|value| {
            let mut field = FieldDefinition::new("f", FieldKind::String);
            field.correct_value = value;
            field.rules.min_length = Some(1);
            field
        })
        .boxed();

    let integer_field = (-1000i64..1000)
        .prop_map(|i| {
            let mut field = FieldDefinition::new("f", FieldKind::Integer);
            field.correct_value = AnswerValue::Int(i);
            field
        })
        .boxed();

    let float_field = nice_float()
        .prop_map(|f| {
            let mut field = FieldDefinition::new("f", FieldKind::Float);
            field.correct_value = AnswerValue::Float(f);
            field
        })
        .boxed();

    let boolean_field = any::<bool>()
        .prop_map(|b| {
            let mut field = FieldDefinition::new("f", FieldKind::Boolean);
            field.correct_value = AnswerValue::Bool(b);
            field
        })
        .boxed();

    let date_field = prop_oneof![Just("2024-05-17"), Just("1999-12-31")]
        .prop_map(|date| {
            let mut field = FieldDefinition::new("f", FieldKind::Date);
            field.correct_value = AnswerValue::Str(date.to_string());
            field
        })
        .boxed();

    let literal_field = (
        proptest::sample::subsequence(WORD_POOL.to_vec(), 1..WORD_POOL.len()),
        0usize..4,
    )
        .prop_map(|(values, pick)| {
            let mut field = FieldDefinition::new("f", FieldKind::Literal);
            field.correct_value = AnswerValue::Str(values[pick % values.len()].to_string());
            field.literal_values = values.into_iter().map(String::from).collect();
            field
        })
        .boxed();

    let collection_field = (
        prop_oneof![Just(FieldKind::List), Just(FieldKind::Set)],
        any_scalar_kind(),
    )
        .prop_flat_map(|(kind, item)| {
            (
                Just(kind),
                Just(item),
                prop::collection::vec(scalar_value(item), 0..4),
            )
        })
        .prop_map(|(kind, item, items)| {
            let mut field = FieldDefinition::new("f", kind);
            field.item_kind = Some(item);
            field.correct_value = AnswerValue::List(items);
            field
        })
        .boxed();

    let union_field = proptest::sample::subsequence(
        vec![
            ScalarKind::String,
            ScalarKind::Integer,
            ScalarKind::Float,
            ScalarKind::Boolean,
            ScalarKind::Null,
        ],
        2..5,
    )
    .prop_flat_map(|members| {
        let value = scalar_value(members[0]);
        (Just(members), value)
    })
    .prop_map(|(members, value)| {
        let mut field = FieldDefinition::new("f", FieldKind::Union);
        field.union_kinds = members;
        field.correct_value = value;
        field
    })
    .boxed();

    let regex_field = (
        prop_oneof![
            Just(r"^\d+$".to_string()),
            Just("[a-z]+".to_string()),
            Just("foo.*bar".to_string()),
        ],
        prop_oneof![
            Just(RegexMode::Search),
            Just(RegexMode::Match),
            Just(RegexMode::Fullmatch),
        ],
        any::<bool>(),
    )
        .prop_map(|(pattern, mode, expected)| {
            let mut field = FieldDefinition::new("f", FieldKind::Regex);
            field.regex = Some(RegexSpec {
                pattern,
                mode,
                expected,
            });
            field.correct_value = AnswerValue::Bool(expected);
            field
        })
        .boxed();

    let kind_part = prop_oneof![
        string_field,
        integer_field,
        float_field,
        boolean_field,
        date_field,
        literal_field,
        collection_field,
        union_field,
        regex_field,
    ];

    (kind_part, any::<bool>(), any_description())
        .prop_map(move |(mut field, required, description)| {
            field.name = name.to_string();
            field.required = required;
            field.description = description;
            field.normalize();
            field
        })
        .boxed()
}

fn any_extra_method() -> impl Strategy<Value = Option<Method>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(Method {
            name: "hint".into(),
            code: "def hint(self):\n    return \"look closer\"".into(),
            decorator: None,
        })),
        1 => Just(Some(Method {
            name: "parts".into(),
            code: "def parts(self):\n    return len(self.correct_answer)".into(),
            decorator: Some("property".into()),
        })),
    ]
}

fn any_class() -> impl Strategy<Value = ClassDefinition> {
    let fields = (
        proptest::option::of(any_field("value")),
        proptest::option::of(any_field("count")),
        proptest::option::of(any_field("tags")),
        proptest::option::of(any_field("serial")),
    )
        .prop_map(|(a, b, c, d)| {
            [a, b, c, d].into_iter().flatten().collect::<Vec<_>>()
        });

    (
        prop_oneof![
            Just("Answer".to_string()),
            Just("CapitalAnswer".to_string()),
            Just("QuizAnswer".to_string()),
        ],
        prop_oneof![
            2 => Just(None),
            1 => Just(Some("Checks one graded response.".to_string())),
        ],
        fields,
        any_extra_method(),
        any::<bool>(),
    )
        .prop_map(|(name, docstring, fields, extra, single)| {
            let mut class = ClassDefinition::new(name);
            class.docstring = docstring;
            // Single is only meaningful with exactly one field; the
            // session never commits the degenerate combination.
            class.pattern = if fields.len() == 1 && single {
                CorrectnessPattern::Single
            } else {
                CorrectnessPattern::Multiple
            };
            class.fields = fields;
            class.extra_methods = extra.into_iter().collect();
            class
        })
}
