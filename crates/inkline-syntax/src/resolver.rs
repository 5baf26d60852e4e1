//! # Tag Candidate Resolver
//!
//! A run such as `__*` can hold several tags at once. The resolver splits a
//! run into delimiters known to the rule table, always taking the longest
//! match at the front first:
//!
//! ```text
//! rules _ __ ___   "___" → ["___"]
//! rules _ __       "___" → ["__", "_"]
//! rules _ __ *     "__*" → ["__", "*"]
//! ```
//!
//! The split is built as a chain (`Split`) from recursive calls and only then
//! flattened, so the outermost-first order falls out of the structure.
//! A position no rule matches contributes one character on its own, which
//! keeps the concatenation of the result equal to the run.

use crate::error::ParseError;
use crate::lexer::is_markup_char;
use crate::rules::{Delimiter, RuleTable};

/// One step of a decomposition: a matched head and the rest of the run.
#[derive(Debug)]
struct Split<'a> {
    head: &'a str,
    tail: Option<Box<Split<'a>>>,
}

impl Split<'_> {
    fn flatten(self) -> Vec<String> {
        let mut out = vec![self.head.to_string()];
        let mut next = self.tail;
        while let Some(split) = next {
            out.push(split.head.to_string());
            next = split.tail;
        }
        out
    }
}

/// Candidate opening delimiters for `run`, outermost first.
pub fn resolve(run: &str, rules: &RuleTable) -> Result<Vec<String>, ParseError> {
    resolve_against(run, rules, Delimiter::Prefix)
}

/// Candidate closing delimiters for `run`, matched against rule suffixes.
pub fn resolve_closing(run: &str, rules: &RuleTable) -> Result<Vec<String>, ParseError> {
    resolve_against(run, rules, Delimiter::Suffix)
}

pub fn resolve_against(
    run: &str,
    rules: &RuleTable,
    side: Delimiter,
) -> Result<Vec<String>, ParseError> {
    check_run(run)?;
    Ok(split(run, rules, side).flatten())
}

fn check_run(run: &str) -> Result<(), ParseError> {
    if run.is_empty() {
        return Err(ParseError::EmptyTagRun);
    }
    match run.char_indices().find(|(_, c)| !is_markup_char(*c)) {
        Some((offset, found)) => Err(ParseError::InvalidTagCharacter {
            run: run.to_string(),
            found,
            offset,
        }),
        None => Ok(()),
    }
}

// `run` is all markup characters, which are ASCII, so byte indices are
// character boundaries.
fn split<'a>(run: &'a str, rules: &RuleTable, side: Delimiter) -> Split<'a> {
    let len = longest_match(run, rules, side).unwrap_or(1);
    let (head, rest) = run.split_at(len);
    let tail = (!rest.is_empty()).then(|| Box::new(split(rest, rules, side)));
    Split { head, tail }
}

/// Length of the longest front slice of `run` that is a `side` delimiter.
pub(crate) fn longest_match(run: &str, rules: &RuleTable, side: Delimiter) -> Option<usize> {
    (1..=run.len())
        .rev()
        .find(|&len| rules.matches(&run[..len], side))
}

/// The front piece of `run`: its longest `side` delimiter, or one character.
pub(crate) fn leading_piece<'a>(run: &'a str, rules: &RuleTable, side: Delimiter) -> &'a str {
    &run[..longest_match(run, rules, side).unwrap_or(1)]
}
