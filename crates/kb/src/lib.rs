//! # KB - Knowledge-Base Model and Query Executor
//!
//! The executor contract of the semantic parsing pipeline: given a closed
//! lambda term whose root type is the atomic truth value, answer it against
//! a knowledge base in one of three modes
//!
//! - [`QueryMode::Ask`] - a truth value
//! - [`QueryMode::Select`] - the distinct bindings of answer-marked variables
//! - [`QueryMode::Count`] - how many such bindings exist
//!
//! The backing store is an in-memory triple store over a directed graph,
//! seeded programmatically; compilation walks the normalized term into a
//! union of conjunctive patterns and evaluation backtracks over the stored
//! facts. Nothing else couples the executor to the term representation.
//!
//! ## Example
//!
//! ```rust
//! use lambdaqa_core::NamingContext;
//! use lambdaqa_syntax::TermParser;
//! use lambdaqa_kb::{KbExecutor, KbModel, QueryMode, QueryResult};
//!
//! let mut parser = TermParser::new(NamingContext::kb_builtins());
//! let term = parser
//!     .parse_code("(@exists (x:e) (exists (y:e) (and (P36 x y) (Q142 y))))")
//!     .unwrap()
//!     .unwrap()
//!     .value();
//!
//! let executor = KbExecutor::new(KbModel::toy_geography());
//! match executor.execute(&term, QueryMode::Select).unwrap() {
//!     QueryResult::Bindings(rows) => assert_eq!(rows[0][0].1, "Q90"),
//!     other => panic!("unexpected result {other:?}"),
//! }
//! ```

mod error;
pub mod model;
pub mod query;

pub use error::KbError;
pub use model::KbModel;
pub use query::{compile, CompiledQuery, Constraint, KbExecutor, QueryMode, QueryResult};
