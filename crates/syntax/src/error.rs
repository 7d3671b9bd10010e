//! Error types for the definition mini-language.

use thiserror::Error;

/// Errors raised while lexing or parsing definition source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyntaxError {
    /// A character outside the language's alphabet.
    #[error("illegal character '{ch}' at offset {offset}")]
    IllegalCharacter { ch: char, offset: usize },

    /// A string literal without a closing quote.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A date literal that does not name a real calendar date.
    #[error("invalid date literal '{text}'")]
    InvalidDate { text: String },

    /// The parser met something other than what the grammar requires.
    #[error("expected {expected}, got {got} at offset {offset}")]
    UnexpectedToken {
        expected: &'static str,
        got: String,
        offset: usize,
    },

    /// Input ended mid-production.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A type annotation names an unknown atomic type.
    #[error("unknown type name '{name}' at offset {offset}")]
    UnknownTypeName { name: String, offset: usize },
}
