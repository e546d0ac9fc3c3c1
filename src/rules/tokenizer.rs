use crate::token::{Token, Tokenizer};

/// Splits text into digit runs, letter runs and single symbols.
///
/// ```text
/// "к 15:25, ул. Ленина"  ->  к | 15 | : | 25 | , | ул | . | Ленина
/// ```
///
/// The normalized form is the lowercased text with `ё` folded into `е`.
/// Every token gets exactly one type tag: `INT`, `RU`, `LATIN`, `PUNCT` or
/// `OTHER`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

pub const INT: &str = "INT";
pub const RU: &str = "RU";
pub const LATIN: &str = "LATIN";
pub const PUNCT: &str = "PUNCT";
pub const OTHER: &str = "OTHER";

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        regex!(r"\d+|[^\W\d_]+|\S")
            .find_iter(text)
            .enumerate()
            .map(|(index, m)| {
                let raw = m.as_str();
                Token::new(index, raw)
                    .with_normalized(normalize(raw))
                    .with_tags([token_type(raw)])
                    .with_range(m.start(), m.end())
            })
            .collect()
    }
}

/// Lowercase and fold `ё` into `е`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('ё', "е")
}

fn token_type(text: &str) -> &'static str {
    if text.chars().all(|c| c.is_ascii_digit()) {
        INT
    } else if text.chars().all(|c| matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')) {
        RU
    } else if text.chars().all(|c| c.is_ascii_alphabetic()) {
        LATIN
    } else if text.chars().all(|c| !c.is_alphanumeric()) {
        PUNCT
    } else {
        OTHER
    }
}
