//! # Lexer - Classifying Block Characters
//!
//! This module is the first stage of inline parsing: it breaks a block of
//! text into lexemes using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the block appears in exactly one lexeme. Nothing is skipped,
//! so the scanner can rebuild the block from the lexemes it consumes:
//!
//! ```
//! use inkline_syntax::lexer::lex;
//!
//! let input = "some *bold* text";
//! let reconstructed: String = lex(input).iter().map(|l| l.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Character Classes
//!
//! The lexer knows three classes and nothing else:
//!
//! - **Markup**: one lexeme per character of the markup alphabet
//!   (`*`, `_`, `/`, `-`, `` ` ``). Runs are grouped by the scanner, not here,
//!   so the scanner stays in control of run boundaries.
//! - **Whitespace**: runs of spaces and tabs.
//! - **Text**: runs of everything else, newlines included.

use std::ops::Range;

use logos::Logos;

/// Characters that may form tags.
pub const MARKUP_ALPHABET: [char; 5] = ['*', '_', '/', '-', '`'];

/// Returns `true` if `c` belongs to the markup alphabet.
pub fn is_markup_char(c: char) -> bool {
    MARKUP_ALPHABET.contains(&c)
}

/// Returns `true` for the whitespace characters that decide tag adjacency.
pub fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Lexeme kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    /// Spaces and tabs
    #[regex(r"[ \t]+")]
    Whitespace,

    /// A single markup-alphabet character
    #[token("*")]
    #[token("_")]
    #[token("/")]
    #[token("-")]
    #[token("`")]
    Markup,

    /// Anything that is neither whitespace nor markup
    #[regex(r"[^ \t*_/`-]+")]
    Text,
}

/// A lexeme with its kind, text slice and byte span in the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Lex a block into lexemes.
///
/// Guarantees that all bytes from the input appear in the output.
pub fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut lexer = LexemeKind::lexer(input);

    while let Some(result) = lexer.next() {
        // Logos errors mean an unrecognised byte sequence - treat it as text
        let kind = result.unwrap_or(LexemeKind::Text);
        lexemes.push(Lexeme {
            kind,
            text: lexer.slice(),
            span: lexer.span(),
        });
    }

    lexemes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<(LexemeKind, &str)> {
        lex(input).into_iter().map(|l| (l.kind, l.text)).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        assert_eq!(kinds("hello"), vec![(LexemeKind::Text, "hello")]);
    }

    #[test]
    fn lex_whitespace_run() {
        assert_eq!(kinds("  \t  "), vec![(LexemeKind::Whitespace, "  \t  ")]);
    }

    #[test]
    fn newline_is_text() {
        assert_eq!(kinds("a\nb"), vec![(LexemeKind::Text, "a\nb")]);
    }

    #[test]
    fn each_markup_char_is_its_own_lexeme() {
        assert_eq!(
            kinds("*_/-`"),
            vec![
                (LexemeKind::Markup, "*"),
                (LexemeKind::Markup, "_"),
                (LexemeKind::Markup, "/"),
                (LexemeKind::Markup, "-"),
                (LexemeKind::Markup, "`"),
            ]
        );
    }

    #[test]
    fn lex_mixed_block() {
        assert_eq!(
            kinds("a **b** c"),
            vec![
                (LexemeKind::Text, "a"),
                (LexemeKind::Whitespace, " "),
                (LexemeKind::Markup, "*"),
                (LexemeKind::Markup, "*"),
                (LexemeKind::Text, "b"),
                (LexemeKind::Markup, "*"),
                (LexemeKind::Markup, "*"),
                (LexemeKind::Whitespace, " "),
                (LexemeKind::Text, "c"),
            ]
        );
    }

    #[test]
    fn non_ascii_text_is_grouped() {
        assert_eq!(
            kinds("héllo wörld"),
            vec![
                (LexemeKind::Text, "héllo"),
                (LexemeKind::Whitespace, " "),
                (LexemeKind::Text, "wörld"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "`code` and *bold*\twith /italic/ - and _under_line";
        let reconstructed: String = lex(input).iter().map(|l| l.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "héllo *wörld*";
        for lexeme in lex(input) {
            assert_eq!(lexeme.text, &input[lexeme.span.clone()]);
        }
    }

    #[test]
    fn alphabet_helpers_agree_with_lexer() {
        for c in MARKUP_ALPHABET {
            let text = c.to_string();
            assert!(is_markup_char(c));
            assert_eq!(kinds(&text), vec![(LexemeKind::Markup, text.as_str())]);
        }
        assert!(!is_markup_char('a'));
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(!is_whitespace('\n'));
    }
}
