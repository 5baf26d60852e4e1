use thiserror::Error;

/// Reasons a set of rules cannot become a [`RuleTable`](crate::RuleTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Rule {name:?} has neither a prefix nor a suffix")]
    EmptyRule { name: String },

    #[error("Rule {name:?} delimiter {delimiter:?} contains non-markup character {found:?}")]
    InvalidDelimiter {
        name: String,
        delimiter: String,
        found: char,
    },

    #[error("Rule {name:?} is declared more than once")]
    DuplicateRule { name: String },

    #[error(
        "Formatting paradox: {sequence:?} is the wrapping tag {wrapping:?} and the one-sided tag {one_sided:?}"
    )]
    RuleConflict {
        sequence: String,
        wrapping: String,
        one_sided: String,
    },

    #[error("Delimiter {sequence:?} is claimed by both {first:?} and {second:?}")]
    AmbiguousDelimiter {
        sequence: String,
        first: String,
        second: String,
    },
}

/// Internal failures while scanning a block.
///
/// Malformed markup never produces one of these; it degrades to text. These
/// signal misuse of the resolver or a broken scanner invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Tag run {run:?} contains non-markup character {found:?} at byte {offset}")]
    InvalidTagCharacter {
        run: String,
        found: char,
        offset: usize,
    },

    #[error("Tag run is empty")]
    EmptyTagRun,

    #[error("Cannot open a tag buffer at byte {offset}: previous character is also a tag")]
    AdjacentTagBufferError { offset: usize },

    #[error("Cannot close a tag buffer at byte {offset}: next character is also a tag")]
    ClosingAdjacentToTagError { offset: usize },
}
