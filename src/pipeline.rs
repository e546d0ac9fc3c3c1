//! Closed-vocabulary phrase matcher.
//!
//! A [`Pipeline`] is compiled once from a fixed set of multi-token phrases
//! into a trie keyed by token text. At match time it walks the trie from a
//! start position and reports the longest phrase found:
//!
//! ```text
//! phrases: ["александровский сад", "академическая", "александровский"]
//!
//! root ─ александровский (#2) ─ сад (#0)
//!      └ академическая (#1)
//!
//! "александровский сад ..." -> #0, 2 tokens (longest wins)
//! ```
//!
//! Duplicate phrases keep the id of their first insertion, so ties are broken
//! by insertion order. Case and lemma normalization belong to the analyzer:
//! phrases must already be in the form the tokens will present.

use std::collections::HashMap;

use crate::error::{GrammarError, Result};
use crate::token::{Token, Tokenizer};

/// Which token text the trie is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineKey {
    /// `Token::normalized` (lemma-aware "morph" pipeline).
    #[default]
    Normalized,
    /// Lowercased `Token::text`.
    Caseless,
}

impl PipelineKey {
    fn of(self, token: &Token) -> String {
        match self {
            PipelineKey::Normalized => token.normalized.clone(),
            PipelineKey::Caseless => token.text.to_lowercase(),
        }
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    terminal: Option<usize>,
}

/// A successful pipeline lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineMatch {
    /// Insertion index of the phrase.
    pub phrase: usize,
    /// Number of tokens consumed.
    pub len: usize,
}

#[derive(Debug)]
pub struct Pipeline {
    root: TrieNode,
    phrases: Vec<Vec<String>>,
    key: PipelineKey,
}

impl Pipeline {
    /// Build from pre-tokenized phrases keyed on normalized forms.
    pub fn new<P, I, S>(phrases: P) -> Result<Self>
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_key(phrases, PipelineKey::Normalized)
    }

    /// Build from pre-tokenized phrases with an explicit key mode.
    ///
    /// In `Caseless` mode phrase parts are lowercased on insertion.
    pub fn with_key<P, I, S>(phrases: P, key: PipelineKey) -> Result<Self>
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut root = TrieNode::default();
        let mut stored = Vec::new();

        for (index, phrase) in phrases.into_iter().enumerate() {
            let parts: Vec<String> = phrase
                .into_iter()
                .map(|s| {
                    let s = s.into();
                    if key == PipelineKey::Caseless { s.to_lowercase() } else { s }
                })
                .collect();
            if parts.is_empty() {
                return Err(GrammarError::EmptyPhrase { index });
            }

            let mut node = &mut root;
            for part in &parts {
                node = node.children.entry(part.clone()).or_default();
            }
            // Earliest insertion keeps priority.
            node.terminal.get_or_insert(index);
            stored.push(parts);
        }

        if stored.is_empty() {
            return Err(GrammarError::EmptyPipeline);
        }

        Ok(Pipeline { root, phrases: stored, key })
    }

    /// Build from plain phrases, splitting each one with `tokenizer` so the
    /// phrase parts line up with how input text will be tokenized.
    pub fn from_text<I, S, T>(phrases: I, tokenizer: &T, key: PipelineKey) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        let split: Vec<Vec<String>> = phrases
            .into_iter()
            .map(|phrase| tokenizer.tokenize(phrase.as_ref()).iter().map(|t| key.of(t)).collect())
            .collect();
        Self::with_key(split, key)
    }

    /// Longest phrase starting at `start`, if any.
    pub fn longest_match(&self, tokens: &[Token], start: usize) -> Option<PipelineMatch> {
        let mut node = &self.root;
        let mut best = None;

        for (offset, token) in tokens.iter().enumerate().skip(start) {
            match node.children.get(&self.key.of(token)) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(phrase) = node.terminal {
                best = Some(PipelineMatch { phrase, len: offset + 1 - start });
            }
        }

        best
    }

    pub fn phrase(&self, id: usize) -> Option<&[String]> {
        self.phrases.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn key(&self) -> PipelineKey {
        self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(words: &[&str]) -> Vec<Token> {
        words.iter().enumerate().map(|(i, w)| Token::new(i, *w)).collect()
    }

    fn stations() -> Pipeline {
        Pipeline::new(vec![
            vec!["александровский", "сад"],
            vec!["академическая"],
            vec!["александровский"],
            vec!["юго", "-", "западная"],
        ])
        .unwrap()
    }

    #[test]
    fn longest_phrase_wins() {
        let p = stations();
        let tokens = stream(&["у", "Александровский", "сад"]);
        let found = p.longest_match(&tokens, 1).unwrap();
        assert_eq!(found, PipelineMatch { phrase: 0, len: 2 });
        assert_eq!(p.phrase(found.phrase), Some(&["александровский".to_string(), "сад".to_string()][..]));
        assert_eq!(p.phrase(p.len()), None);
        assert_eq!(p.key(), PipelineKey::Normalized);

        let tokens = stream(&["Александровский", "парк"]);
        assert_eq!(p.longest_match(&tokens, 0), Some(PipelineMatch { phrase: 2, len: 1 }));
    }

    #[test]
    fn partial_prefix_is_not_a_match() {
        let p = stations();
        let tokens = stream(&["Юго", "-", "Восточная"]);
        assert_eq!(p.longest_match(&tokens, 0), None);
        assert_eq!(p.longest_match(&tokens, 3), None);
    }

    #[test]
    fn duplicates_keep_first_insertion() {
        let p = Pipeline::new(vec![vec!["южная"], vec!["южная"]]).unwrap();
        let tokens = stream(&["Южная"]);
        assert_eq!(p.longest_match(&tokens, 0), Some(PipelineMatch { phrase: 0, len: 1 }));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn caseless_key_reads_raw_text() {
        let p = Pipeline::with_key(vec![vec!["Ясенево"]], PipelineKey::Caseless).unwrap();
        let tokens = vec![Token::new(0, "ЯСЕНЕВО").with_normalized("something-else")];
        assert_eq!(p.longest_match(&tokens, 0).map(|m| m.len), Some(1));
        assert_eq!(p.key(), PipelineKey::Caseless);
        assert_eq!(p.phrase(0), Some(&["ясенево".to_string()][..]));
    }

    #[test]
    fn construction_errors() {
        let empty: Vec<Vec<&str>> = Vec::new();
        assert_eq!(Pipeline::new(empty).unwrap_err(), GrammarError::EmptyPipeline);
        let with_hole: Vec<Vec<&str>> = vec![vec!["a"], vec![]];
        assert_eq!(Pipeline::new(with_hole).unwrap_err(), GrammarError::EmptyPhrase { index: 1 });
    }
}
