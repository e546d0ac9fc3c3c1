//! Grammar validation.
//!
//! Run once when an [`Extractor`](crate::Extractor) is built so that malformed
//! grammars fail at assembly time rather than silently never matching. The
//! walk visits every node reachable from the root exactly once (shared nodes
//! and forward cycles included) and records a small summary used by the
//! verbose API and the CLI.
//!
//! Checks:
//!
//! - every reachable [`Forward`](crate::Forward) is defined.
//!
//! Everything else (empty sequences, bad repeat bounds, empty pipelines,
//! unknown attributes) is already rejected by the builders themselves.

use std::collections::HashSet;

use crate::error::{GrammarError, Result};
use crate::grammar::{Rule, RuleNode};

/// Shape of a validated grammar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GrammarInfo {
    /// Distinct nodes reachable from the root.
    pub nodes: usize,
    /// Alternations reachable from the root (extension points).
    pub alternations: usize,
    /// Interpretation bindings reachable from the root.
    pub bindings: usize,
    /// Names of named rules and forwards, sorted.
    pub names: Vec<String>,
}

pub(crate) fn validate(root: &Rule) -> Result<GrammarInfo> {
    let mut info = GrammarInfo::default();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack = vec![root.clone()];

    while let Some(rule) = stack.pop() {
        if !seen.insert(rule.id()) {
            continue;
        }
        info.nodes += 1;

        match rule.node() {
            RuleNode::Leaf(_) | RuleNode::Pipeline(_) => {}
            RuleNode::Sequence(rules) => stack.extend(rules.iter().cloned()),
            RuleNode::Alternation(alternation) => {
                info.alternations += 1;
                stack.extend(alternation.snapshot());
            }
            RuleNode::Optional(inner) | RuleNode::Repeat { rule: inner, .. } => stack.push(inner.clone()),
            RuleNode::Interpret { rule: inner, .. } => {
                info.bindings += 1;
                stack.push(inner.clone());
            }
            RuleNode::Named { rule: inner, name } => {
                info.names.push(name.to_string());
                stack.push(inner.clone());
            }
            RuleNode::Forward(forward) => {
                let Some(target) = forward.target() else {
                    return Err(GrammarError::UndefinedForward { name: forward.name().to_string() });
                };
                info.names.push(forward.name().to_string());
                stack.push(target.clone());
            }
        }
    }

    info.names.sort_unstable();
    info.names.dedup();
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Forward;

    #[test]
    fn undefined_forward_is_rejected() {
        let f = Forward::new("ADDRESS");
        let root = rule!["к", &f].unwrap();
        assert_eq!(validate(&root).unwrap_err(), GrammarError::UndefinedForward { name: "ADDRESS".into() });

        f.define(Rule::literal("дому")).unwrap();
        assert!(validate(&root).is_ok());
    }

    #[test]
    fn shared_and_cyclic_nodes_are_counted_once() {
        let shared = Rule::literal("a").named("A");
        let list = Forward::new("LIST");
        list.define(or![rule![&shared, &list].unwrap(), &shared].unwrap()).unwrap();

        let info = validate(&Rule::forward(&list)).unwrap();
        // forward-ref, or, sequence, forward-ref (inner), named, leaf
        assert_eq!(info.alternations, 1);
        assert_eq!(info.names, vec!["A".to_string(), "LIST".to_string()]);
        assert!(info.nodes >= 5);
    }
}
