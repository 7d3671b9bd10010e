//! Naming contexts: libraries of reusable named terms.
//!
//! A context maps names to prototype terms. Lookups hand out an independent
//! copy, so every use site owns its instance and no two binding sites alias
//! the same combinator. Contexts are created once per session and mutated
//! only by `define`.

use std::collections::HashMap;

use crate::term::{Constant, LambdaTerm};
use crate::types::LambdaType;
use crate::value::BuiltinOp;

/// A flat execution context for function bindings.
#[derive(Debug, Clone, Default)]
pub struct NamingContext {
    bindings: HashMap<String, LambdaTerm>,
    resolve_kb_ids: bool,
}

impl NamingContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard library: arithmetic, boolean connectives and
    /// comparisons.
    pub fn std_builtins() -> Self {
        let mut context = Self::new();
        for op in BuiltinOp::ALL {
            context.define(op.name(), LambdaTerm::Constant(Constant::builtin(op)));
        }
        context
    }

    /// The knowledge-base library: the standard builtins plus the
    /// `assignation` and `count` query wrappers, with dynamic resolution of
    /// `Q…` entity and `P…` property identifiers.
    pub fn kb_builtins() -> Self {
        let mut context = Self::std_builtins();
        context.resolve_kb_ids = true;
        context.define(
            "assignation",
            LambdaTerm::Constant(Constant::external(
                "assignation",
                &[LambdaType::boolean()],
                &LambdaType::entity(),
            )),
        );
        context.define(
            "count",
            LambdaTerm::Constant(Constant::external(
                "count",
                &[LambdaType::boolean()],
                &LambdaType::numeric(),
            )),
        );
        context
    }

    /// Bind a name to a prototype term, replacing any previous binding.
    pub fn define(&mut self, name: impl Into<String>, term: LambdaTerm) {
        self.bindings.insert(name.into(), term);
    }

    /// True when `name` resolves in this context.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || (self.resolve_kb_ids && kb_id_arity(name).is_some())
    }

    /// Resolve a name to an independently owned instance.
    pub fn lookup(&self, name: &str) -> Option<LambdaTerm> {
        if let Some(term) = self.bindings.get(name) {
            return Some(term.copy(0, 0));
        }
        if self.resolve_kb_ids {
            if let Some(arity) = kb_id_arity(name) {
                return Some(LambdaTerm::Constant(Constant::predicate(name, arity)));
            }
        }
        None
    }

    /// The explicitly bound names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(|k| k.as_str())
    }
}

/// Predicate arity of a knowledge-base identifier: `Q…` entity identifiers
/// become unary class predicates, `P…` property identifiers binary
/// predicates. Anything else is not an identifier.
fn kb_id_arity(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let head = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match head {
        'Q' => Some(1),
        'P' => Some(2),
        _ => None,
    }
}
