//! Grammar assembly errors.
//!
//! Only *construction* can fail. Matching never returns an error: a rule that
//! does not apply at a position simply yields no match, and a transform that
//! rejects its text makes the engine backtrack.

use thiserror::Error;

/// A malformed grammar was assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("sequence must contain at least one rule")]
    EmptySequence,

    #[error("alternation must contain at least one alternative")]
    EmptyAlternation,

    #[error("invalid repetition bounds: min={min}, max={max}")]
    InvalidRepeat { min: usize, max: usize },

    #[error("invalid regex predicate `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("pipeline must contain at least one phrase")]
    EmptyPipeline,

    #[error("pipeline phrase #{index} has no tokens")]
    EmptyPhrase { index: usize },

    #[error("fact `{fact}` has no attribute `{attribute}`")]
    UnknownAttribute { fact: String, attribute: String },

    #[error("fact `{fact}` declares attribute `{attribute}` twice")]
    DuplicateAttribute { fact: String, attribute: String },

    #[error("rule `{rule}` is not an alternation and cannot be extended")]
    NotAnAlternation { rule: String },

    #[error("forward rule `{name}` is already defined")]
    ForwardAlreadyDefined { name: String },

    #[error("forward rule `{name}` is used but never defined")]
    UndefinedForward { name: String },
}

/// Result alias for grammar assembly.
pub type Result<T> = std::result::Result<T, GrammarError>;
