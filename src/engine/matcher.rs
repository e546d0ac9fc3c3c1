//! Backtracking matcher.
//!
//! Matching is a recursive descent in continuation-passing style: every node
//! enumerates the ways it can match at a position *in priority order* and
//! hands each candidate end position to a continuation (`k`) representing
//! "the rest of the grammar". The first candidate whose continuation succeeds
//! wins. This gives ordered choice with full backtracking:
//!
//! ```text
//! Sequence[Optional(A), B] at 0
//!   A matches 0..1 -> k: B at 1 fails
//!   A absent  0..0 -> k: B at 0 ok   => match 0..1
//! ```
//!
//! Priority order per node:
//!
//! - `Leaf`: one token if the predicate holds.
//! - `Pipeline`: the longest phrase.
//! - `Alternation`: alternatives in declared order.
//! - `Optional`: present, then absent.
//! - `Repeat`: most iterations first (greedy); every iteration must consume
//!   at least one token, so repetition is bounded by the input length. A
//!   zero-width iteration only fills up the remaining minimum.
//! - `Interpret`: the inner candidates, each folded into the trail; a
//!   transform rejection drops the candidate and the search moves on.
//! - `Forward`: the target, unless the same forward is already being expanded
//!   at the same position (left recursion), which fails the branch.

use super::interpret::{self, Item};
use crate::grammar::{Rule, RuleNode};
use crate::token::Token;

/// Counters collected during one extraction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatchStats {
    pub node_visits: usize,
    pub backtracks: usize,
    pub transform_rejections: usize,
    pub recursion_cuts: usize,
}

type Cont<'k, 't> = dyn FnMut(&mut Matcher<'t>, usize) -> bool + 'k;

pub(crate) struct Matcher<'t> {
    tokens: &'t [Token],
    trail: Vec<Item>,
    /// Forwards currently being expanded, with their start positions.
    active: Vec<(usize, usize)>,
    pub(crate) stats: MatchStats,
}

impl<'t> Matcher<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        Matcher { tokens, trail: Vec::new(), active: Vec::new(), stats: MatchStats::default() }
    }

    /// First match of `rule` anchored at `start`, as `(end, trail)`.
    ///
    /// Zero-width matches are skipped in favour of the next candidate.
    pub(crate) fn match_at(&mut self, rule: &Rule, start: usize) -> Option<(usize, Vec<Item>)> {
        self.trail.clear();
        self.active.clear();

        let mut found = None;
        self.walk(rule, start, &mut |m: &mut Matcher<'t>, end| {
            if end == start {
                return false;
            }
            found = Some((end, m.trail.clone()));
            true
        });
        found
    }

    fn walk(&mut self, rule: &Rule, pos: usize, k: &mut Cont<'_, 't>) -> bool {
        self.stats.node_visits += 1;

        match rule.node() {
            RuleNode::Leaf(predicate) => match self.tokens.get(pos) {
                Some(token) if predicate.matches(token) => k(self, pos + 1),
                _ => false,
            },

            RuleNode::Pipeline(pipeline) => match pipeline.longest_match(self.tokens, pos) {
                Some(m) => k(self, pos + m.len),
                None => false,
            },

            RuleNode::Sequence(rules) => self.walk_sequence(rules, 0, pos, k),

            RuleNode::Alternation(alternation) => {
                for alternative in alternation.snapshot() {
                    if self.walk(&alternative, pos, &mut *k) {
                        return true;
                    }
                    self.stats.backtracks += 1;
                }
                false
            }

            RuleNode::Optional(inner) => {
                if self.walk(inner, pos, &mut *k) {
                    return true;
                }
                k(self, pos)
            }

            RuleNode::Repeat { rule, min, max } => self.walk_repeat(rule, *min, *max, 0, pos, k),

            RuleNode::Interpret { rule: inner, interpretation } => {
                let mark = self.trail.len();
                self.walk(inner, pos, &mut |m: &mut Matcher<'t>, end| {
                    let produced = m.trail.split_off(mark);
                    let ok = match interpret::fold(interpretation, m.tokens, pos, end, &produced) {
                        Some(folded) => {
                            m.trail.extend(folded);
                            let ok = k(m, end);
                            m.trail.truncate(mark);
                            ok
                        }
                        None => {
                            m.stats.transform_rejections += 1;
                            false
                        }
                    };
                    m.trail.extend(produced);
                    ok
                })
            }

            RuleNode::Named { rule: inner, name } => {
                let ok = self.walk(inner, pos, k);
                if ok {
                    tracing::trace!(rule = %name, pos, "named rule matched");
                }
                ok
            }

            RuleNode::Forward(forward) => {
                let Some(target) = forward.target() else {
                    return false;
                };
                let key = (forward.id(), pos);
                if self.active.contains(&key) {
                    self.stats.recursion_cuts += 1;
                    tracing::trace!(rule = forward.name(), pos, "left recursion cut");
                    return false;
                }

                self.active.push(key);
                let ok = self.walk(target, pos, &mut |m: &mut Matcher<'t>, end| {
                    // The forward is no longer "being entered" once the rest
                    // of the grammar continues past it.
                    let popped = m.active.pop();
                    let ok = k(m, end);
                    if let Some(entry) = popped {
                        m.active.push(entry);
                    }
                    ok
                });
                self.active.pop();
                ok
            }
        }
    }

    fn walk_sequence(&mut self, rules: &[Rule], idx: usize, pos: usize, k: &mut Cont<'_, 't>) -> bool {
        let Some(rule) = rules.get(idx) else {
            return k(self, pos);
        };
        self.walk(rule, pos, &mut |m: &mut Matcher<'t>, end| m.walk_sequence(rules, idx + 1, end, &mut *k))
    }

    fn walk_repeat(
        &mut self,
        rule: &Rule,
        min: usize,
        max: Option<usize>,
        count: usize,
        pos: usize,
        k: &mut Cont<'_, 't>,
    ) -> bool {
        if max.is_none_or(|max| count < max) {
            let grown = self.walk(rule, pos, &mut |m: &mut Matcher<'t>, end| {
                if end > pos {
                    m.walk_repeat(rule, min, max, count + 1, end, &mut *k)
                } else {
                    // A zero-width iteration can stand in for every remaining
                    // required one, but never loops.
                    count < min && k(m, pos)
                }
            });
            if grown {
                return true;
            }
        }
        count >= min && k(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{eq, gte, lte};

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().enumerate().map(|(i, w)| Token::new(i, *w)).collect()
    }

    fn end_at(rule: &Rule, words: &[&str], start: usize) -> Option<usize> {
        let toks = tokens(words);
        Matcher::new(&toks).match_at(rule, start).map(|(end, _)| end)
    }

    #[test]
    fn sequence_backtracks_into_optional() {
        // "через" optional, hours optional, then the hour word.
        let rule = rule![eq("через").optional(), Rule::leaf(gte(0).and(lte(23))).optional(), "часа"].unwrap();
        assert_eq!(end_at(&rule, &["через", "2", "часа"], 0), Some(3));
        assert_eq!(end_at(&rule, &["через", "часа"], 0), Some(2));
        assert_eq!(end_at(&rule, &["часа"], 0), Some(1));
        assert_eq!(end_at(&rule, &["через", "2"], 0), None);
    }

    #[test]
    fn alternation_is_ordered_choice() {
        let short_first = or![Rule::literal("a"), rule!["a", "b"].unwrap()].unwrap();
        assert_eq!(end_at(&short_first, &["a", "b"], 0), Some(1));

        // A later failure backtracks into the next alternative.
        let seq = rule![short_first, "c"].unwrap();
        assert_eq!(end_at(&seq, &["a", "b", "c"], 0), Some(3));
    }

    #[test]
    fn repeat_is_greedy_and_bounded() {
        let a = Rule::literal("a");
        assert_eq!(end_at(&a.repeatable(), &["a", "a", "a", "b"], 0), Some(3));
        assert_eq!(end_at(&a.repeat(1, Some(2)).unwrap(), &["a", "a", "a"], 0), Some(2));
        assert_eq!(end_at(&a.repeat(2, None).unwrap(), &["a", "b"], 0), None);

        // Greedy repetition gives back tokens when the rest needs them.
        let seq = rule![a.repeatable(), "a", "b"].unwrap();
        assert_eq!(end_at(&seq, &["a", "a", "a", "b"], 0), Some(4));
    }

    #[test]
    fn repeat_of_optional_terminates() {
        let star = Rule::literal("a").optional().repeat(0, None).unwrap();
        let seq = rule![star, "b"].unwrap();
        assert_eq!(end_at(&seq, &["a", "a", "b"], 0), Some(3));
        assert_eq!(end_at(&seq, &["b"], 0), Some(1));

        let plus = rule![Rule::literal("a").optional().repeatable(), "b"].unwrap();
        assert_eq!(end_at(&plus, &["b"], 0), Some(1));
        assert_eq!(end_at(&plus, &["a", "a", "b"], 0), Some(3));
    }

    #[test]
    fn zero_width_root_matches_are_skipped() {
        let rule = Rule::literal("x").optional();
        assert_eq!(end_at(&rule, &["y"], 0), None);
        assert_eq!(end_at(&rule, &["x"], 0), Some(1));
    }

    #[test]
    fn forward_supports_right_recursion_and_cuts_left_recursion() {
        use crate::grammar::Forward;

        // LIST := "a" "," LIST | "a"
        let list = Forward::new("LIST");
        list.define(or![rule!["a", ",", &list].unwrap(), "a"].unwrap()).unwrap();
        let root = Rule::forward(&list);
        assert_eq!(end_at(&root, &["a", ",", "a", ",", "a"], 0), Some(5));

        // LEFT := LEFT "b" | "b"  -- the recursive branch is cut.
        let left = Forward::new("LEFT");
        left.define(or![rule![&left, "b"].unwrap(), "b"].unwrap()).unwrap();
        let toks = tokens(&["b", "b"]);
        let mut m = Matcher::new(&toks);
        assert_eq!(m.match_at(&Rule::forward(&left), 0).map(|(end, _)| end), Some(1));
        assert!(m.stats.recursion_cuts > 0);
    }

    #[test]
    fn undefined_forward_never_matches() {
        use crate::grammar::Forward;
        let f = Forward::new("MISSING");
        assert_eq!(end_at(&Rule::forward(&f), &["a"], 0), None);
    }
}
