// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # Answersync — answer-schema ↔ source synchronization
//!
//! Keeps a typed answer schema (a small class with named, typed fields
//! and a designated correctness value) bidirectionally synchronized
//! with its textual representation: a Python class extending the fixed
//! `BaseAnswer` base class, in the format the host verification engine
//! expects.
//!
//! ## Core Concept
//!
//! The **model** is the source of truth while the user edits through a
//! form; the **text** is the source of truth when it arrives from
//! outside. Answersync guarantees the two agree:
//!
//! - **Generate** a class from the model — deterministic, byte-stable
//! - **Parse** a class back into an equivalent model
//! - **Synthesize** the three correctness methods from the field set
//! - **Validate** names and type configurations with categorized issues
//! - **Session** drives the parse/mutate/regenerate loop with a
//!   re-entrancy guard
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use answersync::{EditingSession, FieldDefinition, FieldKind, AnswerValue};
//!
//! let mut session = EditingSession::new("Answer");
//!
//! let mut field = FieldDefinition::new("value", FieldKind::String);
//! field.correct_value = AnswerValue::Str("Paris".into());
//! let text = session.commit_field(field)?;
//!
//! // text now holds the regenerated class:
//! //
//! //   class Answer(BaseAnswer):
//! //       value: str
//! //
//! //       def set_correct_answer(self):
//! //           self.correct_answer = "Paris"
//! //
//! //       def verify(self) -> bool:
//! //           return self.value == self.correct_answer
//!
//! // Round-trip: the emitted text parses back to an equal model.
//! let model = answersync::parse(text)?;
//! assert_eq!(&model, session.model());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │  TEXT ──► parse(text) ──► ClassDefinition                    │
//! │                               │                              │
//! │                        (field commits)                       │
//! │                               │                              │
//! │                validate_* ──► advisory Issues                │
//! │                               │                              │
//! │                 synthesize(model) ──► methods                │
//! │                               │                              │
//! │                 generate(model) ──► TEXT again               │
//! │                                                              │
//! │  EditingSession owns the loop and suppresses its own echo    │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Supported subset
//!
//! The parser accepts exactly one class extending `BaseAnswer`:
//! annotated fields (scalars, `Literal[...]`, `List`/`Set`, `Union`,
//! `Optional[...]`), `Field(...)` metadata, a `set_correct_answer`
//! assigning the stored correctness value, the synthesized `verify` /
//! `verify_granular` (discarded and re-derived), and arbitrary other
//! methods, which survive round-trips verbatim. Anything else fails
//! with a readable message and the raw text stays untouched.

// Core modules
pub mod error;
pub mod literal;
pub mod model;
pub mod types;
pub mod util;
pub mod validate;

// Operations
pub mod generate;
pub mod parse;
pub mod session;
pub mod synth;

// Re-exports
pub use error::{Error, Result};
pub use generate::generate;
pub use model::{
    AnswerValue, ClassDefinition, CorrectnessPattern, FieldDefinition, FieldKind, Method,
    RegexMode, RegexSpec, ScalarKind, ValidationRules, BASE_CLASS,
};
pub use parse::parse;
pub use session::{EditingSession, SessionState, SubmitOutcome};
pub use synth::synthesize;
pub use types::{annotation, parse_annotation, ParsedAnnotation};
pub use validate::{
    validate_class, validate_field_type, validate_identifier, Issue, Severity, ValidationReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
