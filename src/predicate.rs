//! Single-token predicates.
//!
//! A [`Predicate`] is a pure, total test over one [`Token`]: it never fails
//! with an error and never mutates its input. Missing tags or unparseable
//! numbers simply evaluate to `false`.
//!
//! Predicates form a closed enum. The constructors below read like the grammar
//! they build:
//!
//! ```text
//! and([gte(0), lte(23)])        -> 0 <= int(text) <= 23
//! or([eq("ч"), normalized("час")])
//! not(shape(TokenShape::PUNCT))
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;

use crate::error::{GrammarError, Result};
use crate::token::{Token, TokenShape};

#[derive(Debug, Clone)]
pub enum Predicate {
    /// Raw text equals the literal (case-sensitive).
    Eq(String),
    /// Raw text equals the literal ignoring case. Stored lowercased.
    Caseless(String),
    /// Normalized form equals the value.
    Normalized(String),
    /// Integer value of the raw text is `>=` the bound.
    Gte(i64),
    /// Integer value of the raw text is `<=` the bound.
    Lte(i64),
    /// Integer value of the raw text lies in `min..=max`.
    Between { min: i64, max: i64 },
    /// Raw text is one of the set.
    InSet(Arc<HashSet<String>>),
    /// Lowercased raw text is one of the (lowercased) set.
    InCaseless(Arc<HashSet<String>>),
    /// Normalized form is one of the set.
    Dictionary(Arc<HashSet<String>>),
    /// Token carries the grammatical tag.
    Gram(String),
    /// Orthographic shape contains all the flags.
    Shape(TokenShape),
    /// Anchored regex over the raw text; built by [`regex`].
    Regex(Regex),
    /// Arbitrary pure function.
    Custom(fn(&Token) -> bool),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Evaluate the predicate against `token`.
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Predicate::Eq(value) => token.text == *value,
            Predicate::Caseless(value) => token.text.to_lowercase() == *value,
            Predicate::Normalized(value) => token.normalized == *value,
            Predicate::Gte(bound) => int_value(token).is_some_and(|v| v >= *bound),
            Predicate::Lte(bound) => int_value(token).is_some_and(|v| v <= *bound),
            Predicate::Between { min, max } => int_value(token).is_some_and(|v| (*min..=*max).contains(&v)),
            Predicate::InSet(set) => set.contains(&token.text),
            Predicate::InCaseless(set) => set.contains(&token.text.to_lowercase()),
            Predicate::Dictionary(set) => set.contains(&token.normalized),
            Predicate::Gram(tag) => token.has_tag(tag),
            Predicate::Shape(flags) => !flags.is_empty() && token.shape().contains(*flags),
            Predicate::Regex(re) => re.is_match(&token.text),
            Predicate::Custom(f) => f(token),
            Predicate::And(preds) => preds.iter().all(|p| p.matches(token)),
            Predicate::Or(preds) => preds.iter().any(|p| p.matches(token)),
            Predicate::Not(pred) => !pred.matches(token),
        }
    }

    /// The branch responsible for a positive result, for diagnostics.
    ///
    /// For `Or` this is the first alternative that holds; for every other
    /// predicate it is the predicate itself. Returns `None` when the predicate
    /// does not hold.
    pub fn first_match(&self, token: &Token) -> Option<&Predicate> {
        match self {
            Predicate::Or(preds) => preds.iter().find_map(|p| p.first_match(token)),
            _ if self.matches(token) => Some(self),
            _ => None,
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut preds) => {
                preds.push(other);
                Predicate::And(preds)
            }
            p => Predicate::And(vec![p, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut preds) => {
                preds.push(other);
                Predicate::Or(preds)
            }
            p => Predicate::Or(vec![p, other]),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Integer value of an all-digit raw text.
fn int_value(token: &Token) -> Option<i64> {
    if token.text.is_empty() || !token.text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.text.parse().ok()
}

// --- Constructors -----------------------------------------------------------

pub fn eq(value: impl Into<String>) -> Predicate {
    Predicate::Eq(value.into())
}

pub fn caseless(value: impl AsRef<str>) -> Predicate {
    Predicate::Caseless(value.as_ref().to_lowercase())
}

pub fn normalized(value: impl Into<String>) -> Predicate {
    Predicate::Normalized(value.into())
}

pub fn gte(bound: i64) -> Predicate {
    Predicate::Gte(bound)
}

pub fn lte(bound: i64) -> Predicate {
    Predicate::Lte(bound)
}

pub fn between(min: i64, max: i64) -> Predicate {
    Predicate::Between { min, max }
}

pub fn in_set<I, S>(values: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::InSet(Arc::new(values.into_iter().map(Into::into).collect()))
}

pub fn in_caseless<I, S>(values: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Predicate::InCaseless(Arc::new(values.into_iter().map(|v| v.as_ref().to_lowercase()).collect()))
}

/// Normalized-form membership. Entries are expected in normalized form.
pub fn dictionary<I, S>(values: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::Dictionary(Arc::new(values.into_iter().map(Into::into).collect()))
}

pub fn gram(tag: impl Into<String>) -> Predicate {
    Predicate::Gram(tag.into())
}

pub fn shape(flags: TokenShape) -> Predicate {
    Predicate::Shape(flags)
}

/// Whole-token regex: `re` is wrapped in `^(?:..)$` so every alternative
/// has to cover the full raw text.
pub fn regex(re: &Regex) -> Result<Predicate> {
    let anchored = Regex::new(&format!("^(?:{})$", re.as_str()))
        .map_err(|e| GrammarError::InvalidRegex { pattern: re.as_str().to_string(), message: e.to_string() })?;
    Ok(Predicate::Regex(anchored))
}

pub fn custom(f: fn(&Token) -> bool) -> Predicate {
    Predicate::Custom(f)
}

/// All must hold. An empty conjunction holds for every token.
pub fn and(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And(preds.into_iter().collect())
}

/// Any must hold. An empty disjunction never holds.
pub fn or(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or(preds.into_iter().collect())
}

pub fn not(pred: Predicate) -> Predicate {
    pred.negate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str) -> Token {
        Token::new(0, text)
    }

    #[test]
    fn literals_respect_case_mode() {
        assert!(eq("м").matches(&tok("м")));
        assert!(!eq("м").matches(&tok("М")));
        assert!(caseless("М").matches(&tok("м")));
        assert!(caseless("ул").matches(&tok("Ул")));
    }

    #[test]
    fn normalized_reads_analyzer_output() {
        let token = tok("часа").with_normalized("час");
        assert!(normalized("час").matches(&token));
        assert!(!normalized("часа").matches(&token));
        assert!(dictionary(["час", "минута"]).matches(&token));
    }

    #[test]
    fn numeric_range_rejects_non_numbers() {
        let hours = and([gte(0), lte(23)]);
        assert!(hours.matches(&tok("15")));
        assert!(hours.matches(&tok("0")));
        assert!(!hours.matches(&tok("99")));
        assert!(!hours.matches(&tok("ч")));
        assert!(!hours.matches(&tok("-1")));
        assert!(!gte(0).matches(&tok("")));
        assert!(between(0, 59).matches(&tok("059")));
    }

    #[test]
    fn membership_and_tags() {
        assert!(in_set([",", ";"]).matches(&tok(",")));
        assert!(in_caseless(["Завтра"]).matches(&tok("ЗАВТРА")));
        let token = tok("Москва").with_tags(["NOUN", "Geox"]);
        assert!(gram("Geox").matches(&token));
        assert!(!gram("VERB").matches(&token));
        assert!(shape(TokenShape::TITLE).matches(&token));
        assert!(!shape(TokenShape::empty()).matches(&token));
    }

    #[test]
    fn regex_must_cover_whole_token() {
        let year = regex(&Regex::new(r"\d{4}").unwrap()).unwrap();
        assert!(year.matches(&tok("2024")));
        assert!(!year.matches(&tok("20245")));
        assert!(!year.matches(&tok("x2024")));

        let short = regex(&Regex::new(r"\d|\d\d").unwrap()).unwrap();
        assert!(short.matches(&tok("1")));
        assert!(short.matches(&tok("12")));
        assert!(!short.matches(&tok("123")));
    }

    #[test]
    fn combinators_compose() {
        let p = eq("a").or(eq("b")).and(not(eq("b")));
        assert!(p.matches(&tok("a")));
        assert!(!p.matches(&tok("b")));
        assert!(and([]).matches(&tok("x")));
        assert!(!or([]).matches(&tok("x")));
        assert!(custom(|t| t.text.len() == 1).matches(&tok("x")));
    }

    #[test]
    fn first_match_reports_winning_branch() {
        let p = or([eq("x"), caseless("Y"), eq("y")]);
        let winner = p.first_match(&tok("y")).unwrap();
        assert!(matches!(winner, Predicate::Caseless(v) if v == "y"));
        assert!(p.first_match(&tok("z")).is_none());
    }
}
