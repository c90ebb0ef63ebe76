//! Editing session — the parse/mutate/regenerate state machine
//!
//! One session owns one [`ClassDefinition`] and its current source
//! text. Field edits are committed one at a time; each commit
//! re-synthesizes the correctness methods and regenerates the text.
//! Text arriving from outside goes through [`EditingSession::submit_source`],
//! which either replaces the model wholesale or, on a parse failure,
//! leaves both model and source untouched.
//!
//! The re-entrancy guard is a hash of the last emitted text: when the
//! session's own output comes back (the host reflects generated text
//! into the same channel external edits arrive on), the redundant
//! parse cycle is suppressed. The guard is plain data, so no exit path
//! can leave it held.

use crate::error::{Error, Result};
use crate::generate::generate;
use crate::model::{ClassDefinition, CorrectnessPattern, FieldDefinition};
use crate::parse::parse;
use crate::validate::{validate_field_type, validate_identifier, Severity};

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Model and source agree
    Clean,
    /// A mutation is being applied (transient within one call)
    Regenerating,
    /// The last external text failed to parse; model and source are
    /// the last good ones
    ParseError,
}

/// What [`EditingSession::submit_source`] did with the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session's own emitted text came back; nothing to do
    Unchanged,
    /// The text parsed and replaced the model
    Replaced,
}

/// Owns one class model and keeps it synchronized with source text
#[derive(Debug)]
pub struct EditingSession {
    model: ClassDefinition,
    source: String,
    state: SessionState,
    emitted_hash: Option<String>,
    last_error: Option<String>,
}

impl EditingSession {
    /// Start from an empty shell with zero fields
    pub fn new(class_name: impl Into<String>) -> Self {
        let mut session = Self {
            model: ClassDefinition::new(class_name),
            source: String::new(),
            state: SessionState::Clean,
            emitted_hash: None,
            last_error: None,
        };
        session.regenerate();
        session
    }

    /// Start from pre-existing source text
    pub fn open(text: &str) -> Result<Self> {
        let model = parse(text)?;
        let mut session = Self {
            model,
            source: String::new(),
            state: SessionState::Clean,
            emitted_hash: None,
            last_error: None,
        };
        session.regenerate();
        Ok(session)
    }

    pub fn model(&self) -> &ClassDefinition {
        &self.model
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Commit one field draft (insert, or replace the field with the
    /// same name). ERROR-level issues reject the draft and leave the
    /// model untouched; warnings and suggestions never block.
    pub fn commit_field(&mut self, draft: FieldDefinition) -> Result<&str> {
        let errors: Vec<_> = validate_identifier(&draft.name)
            .into_iter()
            .chain(validate_field_type(&draft))
            .filter(|i| i.severity == Severity::Error)
            .collect();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let mut draft = draft;
        draft.normalize();

        match self.model.fields.iter_mut().find(|f| f.name == draft.name) {
            Some(existing) => *existing = draft,
            None => self.model.fields.push(draft),
        }

        // Single is only meaningful with exactly one field; growing the
        // field set switches to the mapping representation.
        if self.model.fields.len() > 1 {
            self.model.pattern = CorrectnessPattern::Multiple;
        }

        self.regenerate();
        Ok(&self.source)
    }

    /// Remove a field by name
    pub fn remove_field(&mut self, name: &str) -> Result<&str> {
        let before = self.model.fields.len();
        self.model.fields.retain(|f| f.name != name);
        if self.model.fields.len() == before {
            return Err(Error::Other(format!("No field named '{}'", name)));
        }
        self.regenerate();
        Ok(&self.source)
    }

    /// Rename the class
    pub fn rename_class(&mut self, name: impl Into<String>) -> &str {
        self.model.name = name.into();
        self.regenerate();
        &self.source
    }

    /// Set or clear the class docstring
    pub fn set_docstring(&mut self, docstring: Option<String>) -> &str {
        self.model.docstring = docstring;
        self.regenerate();
        &self.source
    }

    /// Switch the correctness pattern
    pub fn set_pattern(&mut self, pattern: CorrectnessPattern) -> &str {
        self.model.pattern = pattern;
        self.regenerate();
        &self.source
    }

    /// Accept text from outside the session
    ///
    /// Returns `Unchanged` when the guard recognizes the session's own
    /// emitted text. On a parse failure the model and source stay as
    /// they were, the state moves to `ParseError`, and the caller keeps
    /// the raw text for manual correction.
    pub fn submit_source(&mut self, text: &str) -> Result<SubmitOutcome> {
        if self.emitted_hash.as_deref() == Some(text_hash(text).as_str()) {
            self.state = SessionState::Clean;
            self.last_error = None;
            return Ok(SubmitOutcome::Unchanged);
        }

        match parse(text) {
            Ok(model) => {
                self.model = model;
                self.regenerate();
                Ok(SubmitOutcome::Replaced)
            }
            Err(e) => {
                let message = e.to_string();
                self.state = SessionState::ParseError;
                self.last_error = Some(message.clone());
                Err(Error::Parse(message))
            }
        }
    }

    /// Re-synthesize methods and regenerate source; every path through
    /// here ends `Clean` with the guard pointing at the new text.
    fn regenerate(&mut self) {
        self.state = SessionState::Regenerating;
        self.source = generate(&self.model);
        self.emitted_hash = Some(text_hash(&self.source));
        self.last_error = None;
        self.state = SessionState::Clean;
    }
}

fn text_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerValue, FieldKind};

    fn paris_field() -> FieldDefinition {
        let mut field = FieldDefinition::new("value", FieldKind::String);
        field.correct_value = AnswerValue::Str("Paris".into());
        field
    }

    #[test]
    fn test_new_session_is_clean_shell() {
        let session = EditingSession::new("Answer");
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.source(), "class Answer(BaseAnswer):\n    pass\n");
    }

    #[test]
    fn test_commit_regenerates() {
        let mut session = EditingSession::new("Answer");
        session.commit_field(paris_field()).unwrap();
        assert_eq!(session.state(), SessionState::Clean);
        assert!(session.source().contains("value: str"));
        assert!(session.source().contains("def set_correct_answer(self):"));
    }

    #[test]
    fn test_commit_rejects_reserved_name() {
        let mut session = EditingSession::new("Answer");
        let before = session.source().to_string();
        let draft = FieldDefinition::new("verify", FieldKind::String);
        let err = session.commit_field(draft).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.source(), before);
        assert!(session.model().fields.is_empty());
    }

    #[test]
    fn test_commit_upserts_by_name() {
        let mut session = EditingSession::new("Answer");
        session.commit_field(paris_field()).unwrap();
        let mut replacement = paris_field();
        replacement.correct_value = AnswerValue::Str("Lyon".into());
        session.commit_field(replacement).unwrap();
        assert_eq!(session.model().fields.len(), 1);
        assert!(session.source().contains("\"Lyon\""));
    }

    #[test]
    fn test_guard_suppresses_own_text() {
        let mut session = EditingSession::new("Answer");
        session.commit_field(paris_field()).unwrap();
        let emitted = session.source().to_string();
        let outcome = session.submit_source(&emitted).unwrap();
        assert_eq!(outcome, SubmitOutcome::Unchanged);
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_submit_replaces_model() {
        let mut session = EditingSession::new("Answer");
        let text = "class Updated(BaseAnswer):\n    score: int\n\n    def set_correct_answer(self):\n        self.correct_answer = 3\n";
        let outcome = session.submit_source(text).unwrap();
        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(session.model().name, "Updated");
        assert_eq!(session.model().fields[0].correct_value, AnswerValue::Int(3));
    }

    #[test]
    fn test_parse_error_keeps_model_and_recovers() {
        let mut session = EditingSession::new("Answer");
        session.commit_field(paris_field()).unwrap();
        let good_source = session.source().to_string();

        let err = session.submit_source("class Broken(").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(session.state(), SessionState::ParseError);
        assert!(session.last_error().is_some());
        assert_eq!(session.source(), good_source);
        assert_eq!(session.model().fields.len(), 1);

        // A fixed resubmission brings the session back to Clean.
        let fixed = "class Fixed(BaseAnswer):\n    pass\n";
        session.submit_source(fixed).unwrap();
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.model().name, "Fixed");
        assert!(session.last_error().is_none());

        // A still-broken resubmission stays in ParseError.
        session.submit_source("class Broken(").unwrap_err();
        assert_eq!(session.state(), SessionState::ParseError);
    }

    #[test]
    fn test_remove_field() {
        let mut session = EditingSession::new("Answer");
        session.commit_field(paris_field()).unwrap();
        session.remove_field("value").unwrap();
        assert!(session.model().fields.is_empty());
        assert!(session.remove_field("value").is_err());
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_open_canonicalizes() {
        let text = "class Answer(BaseAnswer):\n    value: str\n\n    def set_correct_answer(self):\n        self.correct_answer = \"Paris\"\n";
        let session = EditingSession::open(text).unwrap();
        // Regeneration restores the verifier the input left out.
        assert!(session.source().contains("def verify(self) -> bool:"));
    }
}
