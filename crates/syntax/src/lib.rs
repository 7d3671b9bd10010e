//! # Syntax - The Definition Mini-Language
//!
//! This crate reads the human-authored library of named, reusable lambda
//! terms (combinators) and standalone query terms, in an S-expression
//! concrete syntax:
//!
//! ```text
//! (define JOIN (lambda (P:e=>e=>t Q:e=>t x:e) (exists (y:e) (and (P x y) (Q y)))))
//! ```
//!
//! Function types are written with the right-associative infix arrow
//! (`e=>e=>t`), parenthesized for grouping. Identifiers resolve against a
//! [`lambdaqa_core::NamingContext`], so definitions can build on the builtin
//! library and on each other.
//!
//! ## Example
//!
//! ```rust
//! use lambdaqa_syntax::TermParser;
//!
//! let mut parser = TermParser::with_std_builtins();
//! parser.parse_code("(define SWAP (lambda (P:e=>e=>t x:e y:e) (P y x)))").unwrap();
//! let (name, term) = parser.last_defined().unwrap();
//! assert_eq!(name, "SWAP");
//! assert_eq!(term.typecheck().to_string(), "(e=>e=>t)=>e=>e=>t");
//! ```

mod error;
pub mod lexer;
pub mod parser;

pub use error::SyntaxError;
pub use lexer::{lex, Token, TokenKind};
pub use parser::TermParser;
