//! Ready-made grammars built on the engine.
//!
//! Nothing in here is engine behaviour: these modules only use the public
//! grammar API, the same way an application would.
//!
//! - `tokenizer`: a small regex tokenizer producing tagged tokens.
//! - `address`: base Russian street-address pieces plus the metro extension.
//! - `date`: base date grammar plus the colloquial time extension, and
//!   resolution of `Date` facts into calendar values.

#[path = "rules/address.rs"]
pub mod address;
#[path = "rules/date.rs"]
pub mod date;
#[path = "rules/tokenizer.rs"]
pub mod tokenizer;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;
