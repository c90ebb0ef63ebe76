//! Integration tests for the editing-session state machine

use answersync::{
    AnswerValue, CorrectnessPattern, EditingSession, Error, FieldDefinition, FieldKind,
    SessionState, SubmitOutcome,
};

fn field(name: &str, value: &str) -> FieldDefinition {
    let mut f = FieldDefinition::new(name, FieldKind::String);
    f.correct_value = AnswerValue::Str(value.into());
    f
}

#[test]
fn commit_cycle_ends_clean_and_emits_text() {
    let mut session = EditingSession::new("Answer");
    let text = session.commit_field(field("value", "Paris")).unwrap();
    assert!(text.contains("def verify(self) -> bool:"));
    assert_eq!(session.state(), SessionState::Clean);
}

#[test]
fn every_mutation_regenerates() {
    let mut session = EditingSession::new("Answer");
    session.commit_field(field("a", "x")).unwrap();
    session.commit_field(field("b", "y")).unwrap();
    assert!(session.source().contains("score / 2"));

    session.set_docstring(Some("Both parts must match.".into()));
    assert!(session.source().contains("\"\"\"Both parts must match.\"\"\""));

    session.rename_class("PairAnswer");
    assert!(session.source().starts_with("class PairAnswer(BaseAnswer):"));

    session.remove_field("b").unwrap();
    assert!(!session.source().contains("score / 2"));
}

#[test]
fn pattern_switch_changes_initializer_shape() {
    let mut session = EditingSession::new("Answer");
    session.commit_field(field("value", "Paris")).unwrap();

    session.set_pattern(CorrectnessPattern::Single);
    assert!(session.source().contains("self.correct_answer = \"Paris\""));

    session.set_pattern(CorrectnessPattern::Multiple);
    assert!(session.source().contains("\"value\": \"Paris\","));
}

#[test]
fn rejected_draft_blocks_only_that_field() {
    let mut session = EditingSession::new("Answer");
    session.commit_field(field("value", "Paris")).unwrap();

    let err = session.commit_field(field("correct_answer", "x")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // The earlier field and the session survive untouched.
    assert_eq!(session.model().fields.len(), 1);
    assert_eq!(session.state(), SessionState::Clean);
    session.commit_field(field("second", "y")).unwrap();
    assert_eq!(session.model().fields.len(), 2);
}

#[test]
fn guard_does_not_block_future_input_after_failures() {
    let mut session = EditingSession::new("Answer");
    session.commit_field(field("value", "Paris")).unwrap();
    let good = session.source().to_string();

    // Parse failure, then the session must still accept everything:
    session.submit_source("def lonely():\n    pass\n").unwrap_err();
    assert_eq!(session.state(), SessionState::ParseError);

    // its own text,
    assert_eq!(session.submit_source(&good).unwrap(), SubmitOutcome::Unchanged);
    assert_eq!(session.state(), SessionState::Clean);

    // and a genuinely new document.
    let other = "class Other(BaseAnswer):\n    pass\n";
    assert_eq!(session.submit_source(other).unwrap(), SubmitOutcome::Replaced);
    assert_eq!(session.model().name, "Other");
}

#[test]
fn failed_parse_never_partially_applies() {
    let mut session = EditingSession::new("Answer");
    session.commit_field(field("value", "Paris")).unwrap();
    let model_before = session.model().clone();
    let source_before = session.source().to_string();

    // Valid Python, unsupported shape: two classes.
    let text = "class A(BaseAnswer):\n    pass\n\nclass B(BaseAnswer):\n    pass\n";
    session.submit_source(text).unwrap_err();

    assert_eq!(*session.model(), model_before);
    assert_eq!(session.source(), source_before);
    assert!(session.last_error().unwrap().contains("one class"));
}

#[test]
fn open_then_edit_round_trips() {
    let text = "class Quiz(BaseAnswer):\n    score: int\n\n    def set_correct_answer(self):\n        self.correct_answer = 7\n";
    let mut session = EditingSession::open(text).unwrap();
    assert_eq!(session.model().pattern, CorrectnessPattern::Single);

    session.commit_field(field("note", "well done")).unwrap();
    assert_eq!(session.model().fields.len(), 2);
    let reparsed = answersync::parse(session.source()).unwrap();
    assert_eq!(reparsed, *session.model());
}

#[test]
fn open_rejects_bad_text_without_a_session() {
    assert!(EditingSession::open("not python at all {{{").is_err());
}
