//! Error types for knowledge-base execution.

use lambdaqa_core::LambdaType;
use thiserror::Error;

/// Errors raised while compiling or executing a query term.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KbError {
    /// The query term leaks free variables.
    #[error("query term is not closed")]
    NotClosed,

    /// The query term's root type is not the atomic truth value.
    #[error("query term has type {got}, expected t")]
    NotBoolean { got: LambdaType },

    /// The term contains a node the query compiler cannot express.
    #[error("cannot compile term fragment '{fragment}' into a query")]
    UnsupportedTerm { fragment: String },

    /// A predicate argument does not resolve to any quantified variable.
    #[error("predicate argument '{name}' (index {index}) is not bound by a quantifier")]
    UnresolvedVariable { name: String, index: i64 },
}
