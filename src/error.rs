//! Error taxonomy for tokenization and parsing.
//!
//! The matcher itself never fails (spec: "no match" is always a legal
//! outcome); only `compile` can fail, and it does so with one of these two
//! enums. [`compile`](crate::compile) collapses both to a `String` at the
//! public boundary.

use thiserror::Error;

/// Errors raised while scanning the pattern text into tokens.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("unmatched opening delimiter")]
    UnmatchedOpeningDelimiter,

    #[error("unmatched right parentheses")]
    UnmatchedRightParen,

    #[error("unmatched right braces")]
    UnmatchedRightBrace,

    #[error("unmatched right brackets")]
    UnmatchedRightBracket,

    #[error("unexpected character class")]
    UnexpectedCharacterClass,

    #[error("invalid range")]
    InvalidRange,

    #[error("escape at the end of expression")]
    EscapeAtEnd,

    #[error("number exceeds maximum boundary")]
    NumberOverflow,

    #[error("invalid braces format")]
    InvalidBracesFormat,
}

/// Errors raised while assembling the token stream into a graph.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("invalid suffix operator")]
    InvalidSuffixOperator,

    #[error("invalid braces format")]
    InvalidBracesFormat,

    #[error("unexpected token")]
    UnexpectedToken,
}

pub type LexResult<T> = Result<T, LexError>;
pub type ParseResult<T> = Result<T, ParseError>;
