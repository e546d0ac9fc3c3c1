use std::time::Instant;

use crate::engine::{self, GrammarInfo, Matcher, RunMetrics, RunResult};
use crate::error::Result;
use crate::fact::Fact;
use crate::grammar::Rule;
use crate::token::{Range, Token, join_text};

/// Options that affect extraction.
///
/// Intentionally small; grammar behaviour lives in the grammar itself.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Stop after this many matches.
    pub limit: Option<usize>,
}

/// Half-open token-index span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// What a match produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchValue {
    /// The root rule (or a single fact-bound rule directly under it) produced
    /// exactly one fact.
    Fact(Fact),
    /// No single fact: the raw text of the span.
    Text(String),
}

/// One extracted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub span: Span,
    pub value: MatchValue,
}

impl Match {
    pub fn fact(&self) -> Option<&Fact> {
        match &self.value {
            MatchValue::Fact(f) => Some(f),
            MatchValue::Text(_) => None,
        }
    }

    /// Raw text of the matched tokens.
    pub fn text(&self, tokens: &[Token]) -> String {
        tokens.get(self.span.start..self.span.end).map(join_text).unwrap_or_default()
    }

    /// Byte range in the source text, when the tokenizer supplied ranges.
    pub fn byte_range(&self, tokens: &[Token]) -> Option<Range> {
        let first = tokens.get(self.span.start)?.range?;
        let last = tokens.get(self.span.end.checked_sub(1)?)?.range?;
        Some(Range { start: first.start, end: last.end })
    }
}

/// Top-level driver: scans a token stream for matches of one root rule.
///
/// Scanning is leftmost-first and non-overlapping: at each position the
/// first match in grammar priority order is taken and the scan resumes after
/// it; otherwise the scan advances one token.
///
/// ```text
/// tokens:  пошли  к  метро  Щукинская
///            ✗    ✗  └──── Metro ────┘
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    rule: Rule,
    info: GrammarInfo,
    options: Options,
}

impl Extractor {
    /// Validate `rule` and build an extractor for it.
    pub fn new(rule: Rule) -> Result<Self> {
        let info = engine::validate(&rule)?;
        Ok(Extractor { rule, info, options: Options::default() })
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Summary of the grammar computed at construction time. Alternatives
    /// appended later are not reflected here.
    pub fn info(&self) -> &GrammarInfo {
        &self.info
    }

    /// Attempt a single match anchored at `start`.
    pub fn find_at(&self, tokens: &[Token], start: usize) -> Option<Match> {
        let mut matcher = Matcher::new(tokens);
        let (end, trail) = matcher.match_at(&self.rule, start)?;
        Some(build_match(tokens, start, end, trail))
    }

    /// All non-overlapping matches, ordered by start index.
    pub fn extract(&self, tokens: &[Token]) -> Vec<Match> {
        self.extract_with_metrics(tokens).matches
    }

    /// Same as [`Extractor::extract`], plus counters and timing.
    pub fn extract_with_metrics(&self, tokens: &[Token]) -> RunResult {
        let started = Instant::now();
        let mut metrics = RunMetrics::default();
        let mut matches = Vec::new();
        let mut matcher = Matcher::new(tokens);
        let mut pos = 0;

        while pos < tokens.len() {
            if self.options.limit.is_some_and(|limit| matches.len() >= limit) {
                break;
            }
            metrics.positions += 1;

            match matcher.match_at(&self.rule, pos) {
                Some((end, trail)) => {
                    let m = build_match(tokens, pos, end, trail);
                    tracing::debug!(rule = %self.rule.label(), start = pos, end, value = ?m.value, "match");
                    matches.push(m);
                    pos = end;
                }
                None => pos += 1,
            }
        }

        metrics.absorb(matcher.stats);
        metrics.total = started.elapsed();
        RunResult { matches, metrics }
    }
}

fn build_match(tokens: &[Token], start: usize, end: usize, trail: Vec<engine::Item>) -> Match {
    let value = match engine::root_fact(trail) {
        Some(fact) => MatchValue::Fact(fact),
        None => MatchValue::Text(join_text(&tokens[start..end])),
    };
    Match { span: Span { start, end }, value }
}

/// Validate `rule` and extract from `tokens` with default options.
pub fn extract(rule: &Rule, tokens: &[Token]) -> Result<Vec<Match>> {
    Ok(Extractor::new(rule.clone())?.extract(tokens))
}
