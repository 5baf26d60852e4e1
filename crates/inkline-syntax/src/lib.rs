//! # inkline-syntax
//!
//! An inline markup parser for a small dialect where runs of `*`, `_`, `/`,
//! `-` and `` ` `` delimit formatted spans. It takes one block of text (no
//! headings, lists or paragraphs inside) and returns a tree of literal text
//! and formatted nodes. Rendering that tree is somebody else's job.
//!
//! ## Architecture Overview
//!
//! ```text
//! Block → Lexer → Lexemes → Scanner → Token groups → Assembler → Nodes
//!         (Logos)           (+ Resolver, RuleTable)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Splits the block into markup characters, whitespace runs and text runs.
//! Every byte lands in exactly one lexeme.
//!
//! ### 2. Scanner ([`scanner`] module)
//!
//! Groups markup characters into runs and decides from their neighbours
//! whether a run can open a tag, close one, or is just text:
//!
//! ```text
//! " *as`df" → [TEXT " "] [OPEN "*"] [TEXT "as`df"]
//! ```
//!
//! ### 3. Resolver ([`resolver`] module)
//!
//! Splits a compound run like `__*` into delimiters the [`RuleTable`] knows,
//! longest and outermost first.
//!
//! ### 4. Assembler ([`assembler`] module)
//!
//! Pairs openers with closers and wraps what lies between. Anything left
//! unpaired is turned back into text, so parsing never fails on bad markup.
//!
//! ## Quick Start
//!
//! ```
//! use inkline_syntax::{Node, RuleTable, parse};
//!
//! let rules = RuleTable::reference();
//! let nodes = parse("some *bold* text", &rules).unwrap();
//!
//! assert_eq!(
//!     nodes,
//!     vec![
//!         Node::text("some "),
//!         Node::formatted("bold", vec![Node::text("bold")]),
//!         Node::text(" text"),
//!     ]
//! );
//! ```
//!
//! ## Errors
//!
//! [`RuleTable::new`] rejects rule sets that would make parses ambiguous,
//! such as a delimiter that both wraps and opens a one-sided tag. [`parse`]
//! only fails on broken internal invariants; see [`ParseError`].

pub mod assembler;
pub mod error;
pub mod lexer;
pub mod resolver;
pub mod rules;
pub mod scanner;
pub mod token;

pub use assembler::assemble;
pub use error::{ParseError, RuleError};
pub use resolver::{resolve, resolve_closing};
pub use rules::{Delimiter, Rule, RuleShape, RuleTable};
pub use scanner::scan;
pub use token::{Node, Token, TokenGroup, TokenKind, outline, to_source};

/// Parses one block into a tree.
pub fn parse(block: &str, rules: &RuleTable) -> Result<Vec<Node>, ParseError> {
    let groups = scan(block, rules)?;
    Ok(assemble(groups, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn parse_outline(block: &str) -> String {
        let nodes = parse(block, &RuleTable::reference()).unwrap();
        outline(&nodes).trim_end().to_string()
    }

    #[test]
    fn snapshot_plain_text() {
        assert_snapshot!(parse_outline("just words"), @r#"TEXT "just words""#);
    }

    #[test]
    fn snapshot_nested_formatting() {
        assert_snapshot!(parse_outline("_*underline bold*_ then `code`"), @r#"
        FORMATTED underline
          FORMATTED bold
            TEXT "underline bold"
        TEXT " then "
        FORMATTED code
          TEXT "code"
        "#);
    }

    #[test]
    fn snapshot_messy_unclosed_constructs() {
        // Half-finished edits: nothing may be lost
        let input = "some *half done /emphasis/ and `unclosed code";
        assert_snapshot!(parse_outline(input), @r#"
        TEXT "some *half done "
        FORMATTED italic
          TEXT "emphasis"
        TEXT " and `unclosed code"
        "#);
    }

    #[test]
    fn roundtrip_preserves_text() {
        let rules = RuleTable::reference();
        let inputs = [
            "plain",
            "*bold*",
            "/italic/ and _underline_",
            "-gone- `code`",
            "**double** stars",
            "*unclosed",
            "closed* only",
            "a * b",
            "snake_case_name",
            "*a _b* c",
        ];

        for input in inputs {
            let nodes = parse(input, &rules).unwrap();
            assert_eq!(
                to_source(&nodes, &rules),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }
}
