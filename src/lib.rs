//! Rule-combinator grammars over token streams.
//!
//! Grammars are assembled from small pieces (token [`Predicate`]s, phrase
//! [`Pipeline`]s, sequences, alternations, optional and repeated rules),
//! bound to typed [`Fact`] schemas through interpretations, and run by an
//! [`Extractor`] that scans a token stream for non-overlapping matches.
//!
//! Alternations are shared handles: appending to one with
//! [`Rule::extend`] is visible to every grammar that embeds it, which is how
//! a base grammar is extended without being rebuilt.

extern crate self as factum;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod fact;
mod grammar;
mod pipeline;
pub mod predicate;
pub mod rules;
mod token;

pub use api::{Extractor, Match, MatchValue, Options, Span, extract};
pub use engine::{GrammarInfo, RunMetrics, RunResult};
pub use error::{GrammarError, Result};
pub use fact::{
    AttributeKind, AttributeRef, AttributeSpec, Fact, FactSchema, FactSchemaBuilder, Interpretation, Transform, Value,
    ValueSource, attribute, int,
};
pub use grammar::{Forward, Rule, extend_alternation, with_interpretation};
pub use pipeline::{Pipeline, PipelineKey, PipelineMatch};
pub use predicate::Predicate;
pub use token::{Range, Token, TokenShape, Tokenizer, join_normalized, join_text};
