//! # Scanner - Finding Candidate Tags
//!
//! The scanner walks the lexemes of a block with a two-state machine:
//!
//! - `Idle`: collecting literal text.
//! - `Accumulating`: inside a run of markup characters.
//!
//! A run closes on the first non-markup character (or the end of the block)
//! and is classified by what touches it on each side. The block boundary
//! counts as whitespace.
//!
//! | before | after | run is |
//! |--------|-------|--------|
//! | whitespace | whitespace | text |
//! | whitespace | text | opener |
//! | text | whitespace | closer |
//! | text | text | text |
//!
//! Openers and closers go through the [resolver](crate::resolver) and become
//! one token group each. Literal runs merge into the surrounding text.

use crate::error::ParseError;
use crate::lexer::{LexemeKind, lex};
use crate::resolver::{resolve, resolve_closing};
use crate::rules::RuleTable;
use crate::token::{Token, TokenGroup};

/// What sits next to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    Whitespace,
    Text,
    Markup,
}

impl Flank {
    /// `None` is the block boundary.
    fn of(kind: Option<LexemeKind>) -> Self {
        match kind {
            None | Some(LexemeKind::Whitespace) => Flank::Whitespace,
            Some(LexemeKind::Text) => Flank::Text,
            Some(LexemeKind::Markup) => Flank::Markup,
        }
    }
}

/// How a closed run is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRole {
    Literal,
    Open,
    Close,
}

/// A run of markup characters being accumulated.
#[derive(Debug)]
struct TagRun {
    value: String,
    preceding: Flank,
    start: usize,
}

#[derive(Debug)]
enum State {
    Idle,
    Accumulating(TagRun),
}

fn classify(preceding: Flank, following: Flank) -> RunRole {
    match (
        preceding == Flank::Whitespace,
        following == Flank::Whitespace,
    ) {
        (true, true) | (false, false) => RunRole::Literal,
        (true, false) => RunRole::Open,
        (false, true) => RunRole::Close,
    }
}

/// Opens a run at `start`; the lexeme before it must not be markup.
fn start_run(
    previous: Option<LexemeKind>,
    text: &str,
    start: usize,
) -> Result<TagRun, ParseError> {
    let preceding = Flank::of(previous);
    if preceding == Flank::Markup {
        return Err(ParseError::AdjacentTagBufferError { offset: start });
    }
    Ok(TagRun {
        value: text.to_string(),
        preceding,
        start,
    })
}

/// Scans one block into token groups.
///
/// Concatenating the source of every group gives back `block`.
pub fn scan(block: &str, rules: &RuleTable) -> Result<Vec<TokenGroup>, ParseError> {
    let mut out = Output::default();
    let mut state = State::Idle;
    let mut previous: Option<LexemeKind> = None;

    for lexeme in lex(block) {
        state = match (state, lexeme.kind) {
            (State::Idle, LexemeKind::Markup) => {
                State::Accumulating(start_run(previous, lexeme.text, lexeme.span.start)?)
            }
            (State::Idle, _) => {
                out.literal.push_str(lexeme.text);
                State::Idle
            }
            (State::Accumulating(mut run), LexemeKind::Markup) => {
                run.value.push_str(lexeme.text);
                State::Accumulating(run)
            }
            (State::Accumulating(run), kind) => {
                out.close_run(run, Flank::of(Some(kind)), lexeme.text, rules)?;
                State::Idle
            }
        };
        previous = Some(lexeme.kind);
    }

    if let State::Accumulating(run) = state {
        out.close_run(run, Flank::of(None), "", rules)?;
    }

    Ok(out.finish())
}

/// Groups produced so far plus the pending literal text.
#[derive(Debug, Default)]
struct Output {
    groups: Vec<TokenGroup>,
    literal: String,
}

impl Output {
    /// Classifies `run` and appends it; `closing` is the text that ended it.
    fn close_run(
        &mut self,
        run: TagRun,
        following: Flank,
        closing: &str,
        rules: &RuleTable,
    ) -> Result<(), ParseError> {
        if following == Flank::Markup {
            return Err(ParseError::ClosingAdjacentToTagError {
                offset: run.start + run.value.len(),
            });
        }

        let role = classify(run.preceding, following);
        log::trace!("run {:?} at byte {} is {:?}", run.value, run.start, role);

        let candidates: Vec<Token> = match role {
            RunRole::Literal => {
                self.literal.push_str(&run.value);
                self.literal.push_str(closing);
                return Ok(());
            }
            RunRole::Open => resolve(&run.value, rules)?
                .into_iter()
                .map(Token::open)
                .collect(),
            RunRole::Close => resolve_closing(&run.value, rules)?
                .into_iter()
                .map(Token::close)
                .collect(),
        };

        self.flush_literal();
        self.groups.push(TokenGroup::new(candidates));
        self.literal.push_str(closing);
        Ok(())
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            let text = std::mem::take(&mut self.literal);
            self.groups.push(TokenGroup::single(Token::text(text)));
        }
    }

    fn finish(mut self) -> Vec<TokenGroup> {
        self.flush_literal();
        self.groups
    }
}
