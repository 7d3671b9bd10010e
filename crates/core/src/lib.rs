//! # Core - Typed Lambda Calculus for Semantic Parsing
//!
//! This crate provides the logical-form intermediate representation shared by
//! the whole workspace:
//!
//! - **Types**: flattened-tuple logical types with a one-shot placeholder
//!   inference step
//! - **Terms**: an owned, tagged term tree with De Bruijn indices,
//!   substitution and call-by-value normalization
//! - **Values**: constant denotations and the builtin function library
//! - **Contexts**: name-to-term libraries handing out independent copies
//!
//! ## Design Philosophy
//!
//! Ill-typed applications are not exceptional: type deduction returns a
//! first-class failure sentinel that the transition parser uses to prune its
//! search space, and a stuck reduction is an ordinary partially-typed term.
//! Errors proper ([`CoreError`]) are reserved for conditions a call site must
//! decide about explicitly.
//!
//! ## Example
//!
//! ```rust
//! use lambdaqa_core::{LambdaTerm, LambdaType, Value};
//!
//! // ((lambda (x:num) (+ x 3)) 2) : num
//! let ctx = lambdaqa_core::NamingContext::std_builtins();
//! let body = LambdaTerm::application(
//!     LambdaTerm::application(ctx.lookup("+").unwrap(), LambdaTerm::variable("x")),
//!     LambdaTerm::literal(Value::Num(3.0)),
//! );
//! let add3 = LambdaTerm::abstraction("x", LambdaType::numeric(), body);
//! let applied = LambdaTerm::application(add3, LambdaTerm::literal(Value::Num(2.0)));
//!
//! assert_eq!(applied.typecheck(), LambdaType::numeric());
//! assert_eq!(applied.value().ret_value().unwrap(), Value::Num(5.0));
//! ```

pub mod context;
pub mod error;
pub mod term;
pub mod types;
pub mod value;

// Re-export key types at crate root for convenience
pub use context::NamingContext;
pub use error::CoreError;
pub use term::{ConstKind, Constant, LambdaTerm, Variable, FREE_INDEX, SLOT_NAME};
pub use types::{AtomTag, LambdaType, TypeSlot};
pub use value::{BuiltinOp, Value};
