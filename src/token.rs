//! Token model.
//!
//! Tokens are produced by an external tokenizer / morphological analyzer and
//! are only ever read by the engine. A token carries:
//!
//! ```text
//! index       ordinal position in the stream (0-based)
//! text        raw slice of the source text ("Щукинская")
//! normalized  normalized form chosen by the analyzer ("щукинская")
//! tags        grammatical / type tags ("NOUN", "INT", ...)
//! range       optional byte range into the source text
//! ```

use std::collections::BTreeSet;

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

/// One lexical unit of input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub normalized: String,
    pub tags: BTreeSet<String>,
    pub range: Option<Range>,
}

impl Token {
    /// Create a token whose normalized form is the lowercased raw text.
    ///
    /// Analyzers that compute lemmas should use [`Token::with_normalized`].
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = text.to_lowercase();
        Token { index, text, normalized, tags: BTreeSet::new(), range: None }
    }

    pub fn with_normalized(mut self, normalized: impl Into<String>) -> Self {
        self.normalized = normalized.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some(Range { start, end });
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Orthographic shape of the raw text.
    pub fn shape(&self) -> TokenShape {
        TokenShape::of(&self.text)
    }
}

bitflags::bitflags! {
    /// Coarse orthographic features of a token's raw text.
    ///
    /// Computed on demand from the text; the analyzer does not have to supply it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenShape: u16 {
        const DIGITS   = 1 << 0;
        const ALPHA    = 1 << 1;
        const PUNCT    = 1 << 2;
        const LOWER    = 1 << 3;
        const UPPER    = 1 << 4;
        const TITLE    = 1 << 5;
        const CYRILLIC = 1 << 6;
        const LATIN    = 1 << 7;
    }
}

impl TokenShape {
    /// Classify `text`.
    ///
    /// `DIGITS`/`ALPHA`/`PUNCT` are only set when *every* character belongs to
    /// the class. `TITLE` means an uppercase first letter followed by lowercase
    /// letters only.
    pub fn of(text: &str) -> Self {
        let mut shape = TokenShape::empty();
        if text.is_empty() {
            return shape;
        }

        if text.chars().all(|c| c.is_ascii_digit()) {
            shape |= TokenShape::DIGITS;
        }
        if text.chars().all(|c| c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace())) {
            shape |= TokenShape::PUNCT;
        }

        if text.chars().all(char::is_alphabetic) {
            shape |= TokenShape::ALPHA;
            if text.chars().all(is_cyrillic) {
                shape |= TokenShape::CYRILLIC;
            }
            if text.chars().all(|c| c.is_ascii_alphabetic()) {
                shape |= TokenShape::LATIN;
            }
            if text.chars().all(char::is_lowercase) {
                shape |= TokenShape::LOWER;
            }
            if text.chars().all(char::is_uppercase) {
                shape |= TokenShape::UPPER;
            }
            let mut chars = text.chars();
            if chars.next().is_some_and(char::is_uppercase) && chars.clone().next().is_some() && chars.all(char::is_lowercase)
            {
                shape |= TokenShape::TITLE;
            }
        }

        shape
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}')
}

/// The external tokenizer / analyzer seam.
///
/// The engine never tokenizes text itself; consumers plug an implementation in
/// here (see `rules::tokenizer::SimpleTokenizer` for a trivial one). Token
/// indices must be consecutive starting at 0.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Render the raw text of `tokens`.
///
/// When both neighbours carry byte ranges the original spacing is respected
/// (adjacent tokens are glued, separated tokens get one space); otherwise
/// tokens are joined with single spaces.
pub fn join_text(tokens: &[Token]) -> String {
    join_by(tokens, |t| &t.text)
}

/// Same as [`join_text`] but over normalized forms.
pub fn join_normalized(tokens: &[Token]) -> String {
    join_by(tokens, |t| &t.normalized)
}

fn join_by(tokens: &[Token], f: impl Fn(&Token) -> &str) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            let glued = matches!((p.range, token.range), (Some(a), Some(b)) if a.end == b.start);
            if !glued {
                out.push(' ');
            }
        }
        out.push_str(f(token));
        prev = Some(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_classifies_common_tokens() {
        assert!(TokenShape::of("15").contains(TokenShape::DIGITS));
        assert!(TokenShape::of(":").contains(TokenShape::PUNCT));
        let station = TokenShape::of("Щукинская");
        assert!(station.contains(TokenShape::ALPHA | TokenShape::CYRILLIC | TokenShape::TITLE));
        assert!(!station.contains(TokenShape::LATIN));
        assert!(TokenShape::of("metro").contains(TokenShape::LATIN | TokenShape::LOWER));
        assert!(!TokenShape::of("M").contains(TokenShape::TITLE));
        assert!(TokenShape::of("").is_empty());
    }

    #[test]
    fn join_respects_byte_ranges() {
        let tokens = vec![
            Token::new(0, "15").with_range(0, 2),
            Token::new(1, ":").with_range(2, 3),
            Token::new(2, "25").with_range(3, 5),
            Token::new(3, "мин").with_range(6, 9),
        ];
        assert_eq!(join_text(&tokens), "15:25 мин");
    }

    #[test]
    fn join_without_ranges_uses_spaces() {
        let tokens = vec![Token::new(0, "Юго"), Token::new(1, "Западная")];
        assert_eq!(join_text(&tokens), "Юго Западная");
        assert_eq!(join_normalized(&tokens), "юго западная");
    }
}
