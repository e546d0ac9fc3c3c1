//! Composable rule trees.
//!
//! A [`Rule`] is a cheap, clonable handle to an immutable node. Cloning a rule
//! shares the node, so one sub-grammar (say, a date grammar) can be embedded
//! in any number of larger grammars:
//!
//! ```text
//!            ADDRESS                 LANDMARK
//!               │                        │
//!          Sequence[..]             Sequence[..]
//!               └──────┐   ┌─────────────┘
//!                      ▼   ▼
//!                  STREET_LEVEL  (Alternation, shared)
//!                  ├─ STREET
//!                  └─ METRO      <- appended later via `extend`
//! ```
//!
//! Nodes never change after construction, with one exception: the child list
//! of an alternation may be *appended to* through [`Rule::extend`]. Every
//! holder of the alternation sees the new alternatives on its next match.
//! Existing alternatives are never removed or reordered, so they keep
//! priority over extensions.
//!
//! Recursive grammars go through a [`Forward`] placeholder which is resolved at
//! match time, never inlined.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::{GrammarError, Result};
use crate::fact::Interpretation;
use crate::pipeline::Pipeline;
use crate::predicate::{self, Predicate};

#[derive(Clone)]
pub struct Rule(Arc<RuleNode>);

pub(crate) enum RuleNode {
    Leaf(Predicate),
    Sequence(Vec<Rule>),
    Alternation(Arc<Alternation>),
    Optional(Rule),
    Repeat { rule: Rule, min: usize, max: Option<usize> },
    Pipeline(Arc<Pipeline>),
    Interpret { rule: Rule, interpretation: Interpretation },
    Named { rule: Rule, name: Cow<'static, str> },
    Forward(Forward),
}

/// Ordered, append-only list of alternatives.
pub(crate) struct Alternation {
    alternatives: RwLock<Vec<Rule>>,
}

impl Alternation {
    /// Copy of the current alternatives. Matching works on a snapshot so no
    /// lock is held while the engine recurses.
    pub(crate) fn snapshot(&self) -> Vec<Rule> {
        self.alternatives.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn append(&self, rules: Vec<Rule>) -> usize {
        let mut guard = self.alternatives.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(rules);
        guard.len()
    }
}

impl Rule {
    fn from_node(node: RuleNode) -> Self {
        Rule(Arc::new(node))
    }

    pub(crate) fn node(&self) -> &RuleNode {
        &self.0
    }

    /// Node identity (shared handles report the same id).
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// One token satisfying `predicate`.
    pub fn leaf(predicate: Predicate) -> Self {
        Self::from_node(RuleNode::Leaf(predicate))
    }

    /// One token whose raw text equals `text`.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::leaf(predicate::eq(text))
    }

    pub fn sequence(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let rules: Vec<Rule> = rules.into_iter().collect();
        if rules.is_empty() {
            return Err(GrammarError::EmptySequence);
        }
        Ok(Self::from_node(RuleNode::Sequence(rules)))
    }

    /// Ordered choice: alternatives are tried in declared order.
    pub fn or(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let rules: Vec<Rule> = rules.into_iter().collect();
        if rules.is_empty() {
            return Err(GrammarError::EmptyAlternation);
        }
        Ok(Self::from_node(RuleNode::Alternation(Arc::new(Alternation { alternatives: RwLock::new(rules) }))))
    }

    pub fn pipeline(pipeline: impl Into<Arc<Pipeline>>) -> Self {
        Self::from_node(RuleNode::Pipeline(pipeline.into()))
    }

    /// Late-bound reference to `forward`'s eventual definition.
    pub fn forward(forward: &Forward) -> Self {
        Self::from_node(RuleNode::Forward(forward.clone()))
    }

    /// Zero or one occurrence.
    pub fn optional(&self) -> Self {
        Self::from_node(RuleNode::Optional(self.clone()))
    }

    /// One or more occurrences, unbounded.
    pub fn repeatable(&self) -> Self {
        Self::from_node(RuleNode::Repeat { rule: self.clone(), min: 1, max: None })
    }

    /// Between `min` and `max` occurrences (`None` = unbounded).
    pub fn repeat(&self, min: usize, max: Option<usize>) -> Result<Self> {
        if let Some(max) = max {
            if max == 0 || max < min {
                return Err(GrammarError::InvalidRepeat { min, max });
            }
        }
        Ok(Self::from_node(RuleNode::Repeat { rule: self.clone(), min, max }))
    }

    /// Wrap this rule with an interpretation binding. Returns a new node; the
    /// wrapped rule is shared, not copied.
    pub fn interpretation(&self, interpretation: impl Into<Interpretation>) -> Self {
        Self::from_node(RuleNode::Interpret { rule: self.clone(), interpretation: interpretation.into() })
    }

    /// Attach a name used in traces and error messages.
    pub fn named(&self, name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_node(RuleNode::Named { rule: self.clone(), name: name.into() })
    }

    pub fn name(&self) -> Option<&str> {
        match self.node() {
            RuleNode::Named { name, .. } => Some(&**name),
            RuleNode::Forward(f) => Some(f.name()),
            _ => None,
        }
    }

    /// True when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Rule) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Append `alternatives` to the end of the underlying alternation, in
    /// place. Returns the new number of alternatives.
    ///
    /// Interpretation wrappers, names and defined forwards are looked
    /// through, so both `or![..]` and `or![..]?.interpretation(Date)` can be
    /// extended.
    pub fn extend(&self, alternatives: impl IntoIterator<Item = Rule>) -> Result<usize> {
        let Some(alternation) = self.alternation() else {
            return Err(GrammarError::NotAnAlternation { rule: self.label() });
        };
        let rules: Vec<Rule> = alternatives.into_iter().collect();
        let added = rules.len();
        let total = alternation.append(rules);
        tracing::debug!(rule = %self.label(), added, total, "extended alternation");
        Ok(total)
    }

    /// Current alternatives, if this rule resolves to an alternation.
    pub fn alternatives(&self) -> Option<Vec<Rule>> {
        self.alternation().map(|a| a.snapshot())
    }

    fn alternation(&self) -> Option<Arc<Alternation>> {
        let mut current = self.clone();
        let mut seen: Vec<*const ForwardSlot> = Vec::new();
        loop {
            let next = match current.node() {
                RuleNode::Alternation(alt) => return Some(Arc::clone(alt)),
                RuleNode::Interpret { rule, .. } | RuleNode::Named { rule, .. } => rule.clone(),
                RuleNode::Forward(f) => {
                    let ptr = Arc::as_ptr(&f.0);
                    if seen.contains(&ptr) {
                        return None;
                    }
                    seen.push(ptr);
                    f.target()?.clone()
                }
                _ => return None,
            };
            current = next;
        }
    }

    /// Short human-readable label: the name if any, else the node kind.
    pub fn label(&self) -> String {
        if let Some(name) = self.name() {
            return name.to_string();
        }
        let kind = match self.node() {
            RuleNode::Leaf(_) => "leaf",
            RuleNode::Sequence(_) => "sequence",
            RuleNode::Alternation(_) => "or",
            RuleNode::Optional(_) => "optional",
            RuleNode::Repeat { .. } => "repeat",
            RuleNode::Pipeline(_) => "pipeline",
            RuleNode::Interpret { .. } => "interpretation",
            RuleNode::Named { .. } | RuleNode::Forward(_) => "named",
        };
        kind.to_string()
    }
}

impl From<Predicate> for Rule {
    fn from(predicate: Predicate) -> Self {
        Rule::leaf(predicate)
    }
}

impl From<&str> for Rule {
    fn from(text: &str) -> Self {
        Rule::literal(text)
    }
}

impl From<&Rule> for Rule {
    fn from(rule: &Rule) -> Self {
        rule.clone()
    }
}

impl From<&Forward> for Rule {
    fn from(forward: &Forward) -> Self {
        Rule::forward(forward)
    }
}

impl From<Pipeline> for Rule {
    fn from(pipeline: Pipeline) -> Self {
        Rule::pipeline(pipeline)
    }
}

/// Predicates can be used directly where a single-token rule is expected.
impl Predicate {
    pub fn interpretation(self, interpretation: impl Into<Interpretation>) -> Rule {
        Rule::leaf(self).interpretation(interpretation)
    }

    pub fn optional(self) -> Rule {
        Rule::leaf(self).optional()
    }

    pub fn repeatable(self) -> Rule {
        Rule::leaf(self).repeatable()
    }
}

/// Attach `interpretation` to `rule`, returning the bound rule.
///
/// Whether an attribute collects several values is a property of the
/// schema, set with [`FactSchemaBuilder::repeatable`](crate::fact::FactSchemaBuilder::repeatable),
/// not of the binding attached here.
pub fn with_interpretation(rule: &Rule, interpretation: impl Into<Interpretation>) -> Rule {
    rule.interpretation(interpretation)
}

/// Append `alternatives` to the shared alternation behind `rule`.
pub fn extend_alternation(rule: &Rule, alternatives: impl IntoIterator<Item = Rule>) -> Result<usize> {
    rule.extend(alternatives)
}

// --- Forward placeholders ---------------------------------------------------

/// Named placeholder for a rule defined later (or recursively).
#[derive(Clone)]
pub struct Forward(Arc<ForwardSlot>);

struct ForwardSlot {
    name: String,
    target: OnceLock<Rule>,
}

impl Forward {
    pub fn new(name: impl Into<String>) -> Self {
        Forward(Arc::new(ForwardSlot { name: name.into(), target: OnceLock::new() }))
    }

    /// Bind the placeholder. A forward can only be defined once.
    pub fn define(&self, rule: Rule) -> Result<()> {
        self.0.target.set(rule).map_err(|_| GrammarError::ForwardAlreadyDefined { name: self.0.name.clone() })
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn target(&self) -> Option<&Rule> {
        self.0.target.get()
    }

    pub fn is_defined(&self) -> bool {
        self.0.target.get().is_some()
    }

    /// Stable identity used by the matcher's recursion guard.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Forward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forward").field("name", &self.0.name).field("defined", &self.is_defined()).finish()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            RuleNode::Leaf(p) => f.debug_tuple("Leaf").field(p).finish(),
            RuleNode::Sequence(rules) => f.debug_tuple("Sequence").field(rules).finish(),
            RuleNode::Alternation(alt) => f.debug_tuple("Or").field(&alt.snapshot()).finish(),
            RuleNode::Optional(rule) => f.debug_tuple("Optional").field(rule).finish(),
            RuleNode::Repeat { rule, min, max } => {
                f.debug_struct("Repeat").field("rule", rule).field("min", min).field("max", max).finish()
            }
            RuleNode::Pipeline(p) => f.debug_struct("Pipeline").field("phrases", &p.len()).finish(),
            RuleNode::Interpret { rule, interpretation } => {
                f.debug_struct("Interpret").field("rule", rule).field("interpretation", interpretation).finish()
            }
            RuleNode::Named { rule, name } => f.debug_struct("Named").field("name", name).field("rule", rule).finish(),
            // Forwards may be cyclic: print the name only.
            RuleNode::Forward(forward) => fmt::Debug::fmt(forward, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactSchema;

    #[test]
    fn construction_errors_fail_fast() {
        assert_eq!(Rule::sequence(vec![]).unwrap_err(), GrammarError::EmptySequence);
        assert_eq!(Rule::or(vec![]).unwrap_err(), GrammarError::EmptyAlternation);

        let x = Rule::literal("x");
        assert_eq!(x.repeat(2, Some(1)).unwrap_err(), GrammarError::InvalidRepeat { min: 2, max: 1 });
        assert_eq!(x.repeat(0, Some(0)).unwrap_err(), GrammarError::InvalidRepeat { min: 0, max: 0 });
        assert!(x.repeat(0, None).is_ok());
    }

    #[test]
    fn extend_appends_through_wrappers() {
        let schema = FactSchema::builder("Street").attribute("name").build().unwrap();
        let base = Rule::or(vec![Rule::literal("a"), Rule::literal("b")]).unwrap();
        let bound = with_interpretation(&base, &schema).named("STREET_LEVEL");
        assert!(matches!(base.node(), RuleNode::Alternation(_)));

        assert_eq!(extend_alternation(&bound, vec![Rule::literal("c")]).unwrap(), 3);
        assert_eq!(bound.extend(vec![Rule::literal("d")]).unwrap(), 4);
        let alts = base.alternatives().unwrap();
        assert_eq!(alts.len(), 4);
        assert!(matches!(alts[2].node(), RuleNode::Leaf(Predicate::Eq(s)) if s == "c"));
        assert!(matches!(alts[3].node(), RuleNode::Leaf(Predicate::Eq(s)) if s == "d"));
    }

    #[test]
    fn extend_rejects_non_alternations() {
        let seq = Rule::sequence(vec![Rule::literal("a")]).unwrap().named("SEQ");
        assert_eq!(seq.extend(vec![Rule::literal("b")]).unwrap_err(), GrammarError::NotAnAlternation {
            rule: "SEQ".to_string()
        });
    }

    #[test]
    fn forward_defines_once_and_extends_through() {
        let fwd = Forward::new("DATE");
        let rule = Rule::forward(&fwd);
        assert!(rule.extend(vec![Rule::literal("x")]).is_err());

        fwd.define(Rule::or(vec![Rule::literal("a")]).unwrap()).unwrap();
        assert_eq!(rule.extend(vec![Rule::literal("x")]).unwrap(), 2);
        assert_eq!(fwd.define(Rule::literal("b")).unwrap_err(), GrammarError::ForwardAlreadyDefined {
            name: "DATE".to_string()
        });
    }

    #[test]
    fn self_referential_forward_does_not_loop() {
        let fwd = Forward::new("LOOP");
        fwd.define(Rule::forward(&fwd)).unwrap();
        assert!(Rule::forward(&fwd).alternatives().is_none());
        assert!(format!("{:?}", Rule::forward(&fwd)).contains("LOOP"));
    }

    #[test]
    fn rules_are_thread_safe_handles() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Rule>();
        assert_send_sync::<Forward>();
    }
}
