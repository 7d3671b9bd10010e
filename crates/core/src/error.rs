//! # Error Types
//!
//! Soft, expected conditions (an ill-typed application, a stuck reduction)
//! are *not* errors here: they are represented by the failure sentinel of
//! [`crate::LambdaType`] and propagate as ordinary values. `CoreError` covers
//! the remaining conditions that a call site must handle explicitly: type
//! inference preconditions and evaluation of terms that have no local
//! denotation.

use thiserror::Error;

use crate::types::LambdaType;

/// Errors surfaced by the lambda-calculus engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Placeholder inference requires an atomic argument type.
    #[error("type inference failed: argument type {arg_type} is not atomic")]
    InferenceNonAtomic { arg_type: LambdaType },

    /// Placeholder inference cannot substitute the placeholder itself.
    #[error("type inference failed: argument type is left underspecified")]
    InferenceUnderspecified,

    /// A functor type does not accept the supplied argument type.
    #[error("cannot apply functor of type {functor_type} to argument of type {arg_type}")]
    ApplicationFailure {
        functor_type: LambdaType,
        arg_type: LambdaType,
    },

    /// A term in normal form that still is not a constant denotation.
    #[error("term does not denote a constant value")]
    NotConstant,

    /// A constant function still has unbound argument slots.
    #[error("'{name}' is not fully applied: {remaining} argument(s) unbound")]
    Unsaturated { name: String, remaining: usize },

    /// A builtin was handed a value of the wrong runtime kind.
    #[error("value mismatch in '{builtin}': expected {expected}, got {got}")]
    ValueMismatch {
        builtin: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    /// Arithmetic division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A knowledge-base predicate has no local denotation.
    #[error("predicate '{name}' must be evaluated against a knowledge base")]
    ExternalPredicate { name: String },

    /// An existential quantifier has no local denotation.
    #[error("quantified formula must be evaluated against a knowledge base")]
    ExternalQuantifier,
}
