//! Bottom-up interpretation.
//!
//! While matching, the engine keeps a *trail* of [`Item`]s produced by the
//! interpretation wrappers it has passed through. Whenever an `Interpret` node
//! completes, the items produced inside its span are folded here:
//!
//! ```text
//! Date ──┬─ HOURS   (time, int)  -> Assign(time=15)
//!        ├─ ':'
//!        └─ MINUTES (time, int)  -> Assign(time=25)
//!
//! fold(Date, [Assign(time=15), Assign(time=25)])  -> [Fact(Date{time:[15,25]})]
//! ```
//!
//! Attribute bindings turn their span into an `Assign`; fact bindings collect
//! the assignments targeting their own schema into a `Fact`. Assignments for
//! other schemas pass through to the next enclosing fact.

use crate::fact::{AttributeRef, Fact, FactSchema, Interpretation, Value, ValueSource};
use crate::token::{Token, join_normalized, join_text};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub(crate) enum Item {
    Assign { attribute: AttributeRef, value: Value },
    Fact(Fact),
}

/// Fold the items produced inside `tokens[start..end]` for one completed
/// interpretation. `None` means a transform rejected the text.
pub(crate) fn fold(
    interpretation: &Interpretation,
    tokens: &[Token],
    start: usize,
    end: usize,
    inner: &[Item],
) -> Option<Vec<Item>> {
    match interpretation {
        Interpretation::Fact(schema) => Some(fold_fact(schema, inner)),
        Interpretation::Attribute { attribute, source } => {
            fold_attribute(attribute, source, &tokens[start..end], inner)
        }
    }
}

fn same_schema(a: &Arc<FactSchema>, b: &Arc<FactSchema>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn fold_fact(schema: &Arc<FactSchema>, inner: &[Item]) -> Vec<Item> {
    let mut fact = Fact::new(schema);
    let mut out = Vec::new();

    for item in inner {
        match item {
            Item::Assign { attribute, value } if same_schema(attribute.schema(), schema) => {
                fact.assign(attribute.index(), value.clone());
            }
            Item::Assign { .. } => out.push(item.clone()),
            Item::Fact(nested) => {
                tracing::trace!(fact = schema.name(), nested = nested.name(), "dropping unbound nested fact");
            }
        }
    }

    out.push(Item::Fact(fact));
    out
}

fn fold_attribute(attribute: &AttributeRef, source: &ValueSource, span: &[Token], inner: &[Item]) -> Option<Vec<Item>> {
    let mut nested: Option<&Fact> = None;
    let mut facts = 0;
    let mut out: Vec<Item> = Vec::new();

    for item in inner {
        match item {
            Item::Fact(f) => {
                facts += 1;
                nested = Some(f);
            }
            Item::Assign { .. } => out.push(item.clone()),
        }
    }

    let value = match source {
        ValueSource::Const(v) => v.clone(),
        ValueSource::Normalized => Value::Text(join_normalized(span)),
        ValueSource::Raw => match nested {
            Some(fact) if facts == 1 => Value::Fact(Box::new(fact.clone())),
            _ => Value::Text(join_text(span)),
        },
        ValueSource::Custom(transform) => {
            let text = join_text(span);
            match transform(&text) {
                Some(v) => v,
                None => {
                    tracing::trace!(attribute = attribute.name(), text = %text, "transform rejected text");
                    return None;
                }
            }
        }
    };

    out.push(Item::Assign { attribute: attribute.clone(), value });
    Some(out)
}

/// Pick the value of a whole match from the root trail: the single top-level
/// fact if there is exactly one, otherwise `None`.
pub(crate) fn root_fact(items: Vec<Item>) -> Option<Fact> {
    let mut facts = items.into_iter().filter_map(|item| match item {
        Item::Fact(f) => Some(f),
        Item::Assign { .. } => None,
    });
    let first = facts.next()?;
    if facts.next().is_some() { None } else { Some(first) }
}
