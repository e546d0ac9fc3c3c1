//! Matching and interpretation engine.
//!
//! This module holds the machinery behind [`Extractor`](crate::Extractor). The
//! grammar types themselves live in `grammar.rs`, `predicate.rs`,
//! `pipeline.rs` and `fact.rs`; the engine only reads them.
//!
//! ## How the parts work together
//!
//! ```text
//! root rule ── validate (validate.rs)  -> GrammarInfo / GrammarError
//!                  │
//! tokens ──────────┼─ for each start position (api.rs)
//!                  v
//!          Matcher::match_at (matcher.rs)
//!            - ordered-choice backtracking over the rule tree
//!            - trail of interpretation items
//!                  │
//!                  v
//!          interpret::fold (interpret.rs)
//!            - attribute values, transforms, fact folding
//!                  │
//!                  v
//!          Match { span, value }   (+ RunMetrics, metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `validate.rs`: fail-fast checks at assembly time and a grammar summary.
//! - `matcher.rs`: continuation-passing backtracking search.
//! - `interpret.rs`: bottom-up folding of bound spans into facts.
//! - `metrics.rs`: counters and timings for a run.
//!
//! ## Debugging
//!
//! The engine logs through `tracing`: `RUST_LOG=factum=trace` shows transform
//! rejections, recursion cuts and named-rule hits; `debug` shows accepted
//! matches and grammar extensions.

#[path = "engine/interpret.rs"]
mod interpret;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/validate.rs"]
mod validate;

pub(crate) use interpret::{Item, root_fact};
pub(crate) use matcher::Matcher;
pub use metrics::{RunMetrics, RunResult};
pub(crate) use validate::validate;
pub use validate::GrammarInfo;
