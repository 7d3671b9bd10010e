//! Error types for parsing and learning.

use thiserror::Error;

/// Errors raised by the transition parser and its training loop.
#[derive(Debug, Clone, Error)]
pub enum ParserError {
    /// No completed derivation carries probability mass. Fatal for the
    /// current example only; the caller records it and moves on.
    #[error("parse failure: {derivations} derivation(s), Z = {z}")]
    ParseFailure { derivations: usize, z: f64 },

    /// The action catalogue's combinator definitions failed to parse.
    #[error("invalid combinator definition: {0}")]
    Definition(#[from] lambdaqa_syntax::SyntaxError),

    /// A derivation replay did not produce a term.
    #[error("derivation could not be replayed into a logical form")]
    EmptyDerivation,
}
