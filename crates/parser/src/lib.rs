//! # Parser - Transition-Based Semantic Parsing
//!
//! A CCG-style shift-reduce parser that turns a token sequence into a closed
//! lambda term, guided by type constraints and a learned sparse linear
//! model:
//!
//! - [`Token`]: the input interface to the external lexer and entity linker
//! - [`ActionCatalogue`]: the fixed transition set, with combinators read
//!   from the definition mini-language
//! - [`TransitionParser`]: type-constrained beam search over configurations
//! - [`Derivation`]: replaying a completed parse into a logical form
//! - CRF-style online learning from knowledge-base execution outcomes
//!
//! ## Data Flow
//!
//! ```text
//! tokens ──▶ beam search ──▶ ranked derivations ──▶ term ──▶ value()
//!              ▲    │                                          │
//!        types │    │ features · weights                       ▼
//!              └────┘                                   KB executor
//!                          gradient  ◀──  correctness ◀──── answer
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lambdaqa_parser::{TransitionParser, Token};
//! use lambdaqa_core::NamingContext;
//! use lambdaqa_kb::{KbExecutor, KbModel};
//! use lambdaqa_syntax::TermParser;
//!
//! let context = NamingContext::kb_builtins();
//! let wh = TermParser::new(NamingContext::kb_builtins())
//!     .parse_code("(lambda (P:e=>t) (@exists (x:e) (P x)))")
//!     .unwrap()
//!     .unwrap();
//!
//! let tokens = vec![
//!     Token::new("quelle", "WH", None, Some(wh)),
//!     Token::new("capitale", "NC", Some("P36".into()), context.lookup("P36")),
//!     Token::new("France", "NPP", Some("Q142".into()), context.lookup("Q142")),
//! ];
//!
//! let parser = TransitionParser::new().unwrap();
//! let executor = KbExecutor::new(KbModel::toy_geography());
//! // untrained weights already parse; training teaches the ranking
//! assert!(!parser.best_answer(16, &tokens, &executor).is_empty());
//! ```

pub mod actions;
pub mod beam;
pub mod config;
pub mod derivation;
mod error;
pub mod features;
pub mod learner;
pub mod token;
pub mod weights;

pub use actions::{ActionCatalogue, ActionKind, SRAction};
pub use beam::TransitionParser;
pub use config::{BeamCell, Configuration, StackElement};
pub use derivation::Derivation;
pub use error::ParserError;
pub use learner::{Example, TrainerConfig};
pub use token::Token;
pub use weights::SparseWeightVector;
