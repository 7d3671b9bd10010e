//! Logical types as flattened tuples.
//!
//! A type is an ordered sequence of slots. A sequence of length one denotes
//! an atomic value; a longer sequence `(a1, a2, …, an, r)` denotes a curried
//! function from `a1` through `an` to `r`. A higher-order argument occupies a
//! single slot holding a nested sub-sequence.
//!
//! Two sentinel tags close the lattice: `Failure` (bottom, an application
//! that could not be typed) and `Any` (top, a placeholder awaiting
//! inference). `Failure` is a first-class value that propagates through type
//! deduction; nothing here panics.
//!
//! # Example
//!
//! ```rust
//! use lambdaqa_core::types::{AtomTag, LambdaType};
//!
//! // e=>e=>t, a binary predicate over entities
//! let pred = LambdaType::function(
//!     &[LambdaType::entity(), LambdaType::entity()],
//!     &LambdaType::boolean(),
//! );
//! let applied = LambdaType::deduce_application(&pred, &LambdaType::entity());
//! assert_eq!(applied.to_string(), "e=>t");
//! ```

use std::fmt;

use crate::error::CoreError;

/// Atomic type tags.
///
/// The short display names double as the concrete syntax used in binder
/// annotations (`x:e`, `P:e=>t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomTag {
    /// Numeric values (`num`)
    Numeric,
    /// Truth values (`t`)
    Boolean,
    /// Character strings (`s`)
    Str,
    /// Calendar dates (`d`)
    Date,
    /// Knowledge-base entities (`e`)
    Entity,
    /// Bottom: an application that could not be typed
    Failure,
    /// Top: a placeholder awaiting inference
    Any,
}

impl AtomTag {
    /// Resolve a concrete-syntax type name.
    pub fn from_name(name: &str) -> Option<AtomTag> {
        match name {
            "num" => Some(AtomTag::Numeric),
            "t" => Some(AtomTag::Boolean),
            "s" => Some(AtomTag::Str),
            "d" => Some(AtomTag::Date),
            "e" => Some(AtomTag::Entity),
            _ => None,
        }
    }

    /// The concrete-syntax name of this tag.
    pub fn name(&self) -> &'static str {
        match self {
            AtomTag::Numeric => "num",
            AtomTag::Boolean => "t",
            AtomTag::Str => "s",
            AtomTag::Date => "d",
            AtomTag::Entity => "e",
            AtomTag::Failure => "\u{22A5}",
            AtomTag::Any => "\u{22A4}",
        }
    }
}

impl fmt::Display for AtomTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One slot of a type tuple: an atomic tag or a nested higher-order type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSlot {
    /// An atomic tag
    Atom(AtomTag),
    /// A higher-order argument occupying one slot
    Nested(LambdaType),
}

impl TypeSlot {
    /// Promote a slot to a full type.
    ///
    /// An extracted tuple element can be a bare atom; wrapping restores the
    /// tuple form so slots compare against argument types uniformly.
    pub fn add_brackets(self) -> LambdaType {
        match self {
            TypeSlot::Nested(inner) => inner,
            atom => LambdaType { slots: vec![atom] },
        }
    }
}

impl fmt::Display for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSlot::Atom(tag) => write!(f, "{}", tag),
            TypeSlot::Nested(inner) => write!(f, "({})", inner),
        }
    }
}

/// A logical type: an ordered sequence of slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LambdaType {
    /// The slots, argument types first, return type last.
    pub slots: Vec<TypeSlot>,
}

impl LambdaType {
    /// Build a type from raw slots.
    pub fn new(slots: Vec<TypeSlot>) -> Self {
        Self { slots }
    }

    /// A single atomic type.
    pub fn atom(tag: AtomTag) -> Self {
        Self {
            slots: vec![TypeSlot::Atom(tag)],
        }
    }

    /// The atomic numeric type `num`.
    pub fn numeric() -> Self {
        Self::atom(AtomTag::Numeric)
    }

    /// The atomic truth-value type `t`.
    pub fn boolean() -> Self {
        Self::atom(AtomTag::Boolean)
    }

    /// The atomic string type `s`.
    pub fn string() -> Self {
        Self::atom(AtomTag::Str)
    }

    /// The atomic date type `d`.
    pub fn date() -> Self {
        Self::atom(AtomTag::Date)
    }

    /// The atomic entity type `e`.
    pub fn entity() -> Self {
        Self::atom(AtomTag::Entity)
    }

    /// The bottom sentinel.
    pub fn failure() -> Self {
        Self::atom(AtomTag::Failure)
    }

    /// The top sentinel, a placeholder awaiting inference.
    pub fn any() -> Self {
        Self::atom(AtomTag::Any)
    }

    /// Build the flattened type of a function from its argument types and
    /// return type. Atomic arguments contribute their slot directly; a
    /// functional argument is nested into one higher-order slot. The return
    /// type is spliced, keeping curried functions flat.
    pub fn function(args: &[LambdaType], ret: &LambdaType) -> Self {
        let mut slots = Vec::with_capacity(args.len() + ret.slots.len());
        for arg in args {
            slots.push(arg.as_slot());
        }
        slots.extend(ret.slots.iter().cloned());
        Self { slots }
    }

    /// The slot this type occupies inside a larger tuple.
    pub fn as_slot(&self) -> TypeSlot {
        if self.slots.len() == 1 {
            self.slots[0].clone()
        } else {
            TypeSlot::Nested(self.clone())
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True for a single-slot, non-nested type.
    pub fn is_atomic(&self) -> bool {
        matches!(self.slots.as_slice(), [TypeSlot::Atom(_)])
    }

    /// True for the bottom sentinel.
    pub fn is_failure(&self) -> bool {
        matches!(self.slots.as_slice(), [TypeSlot::Atom(AtomTag::Failure)])
    }

    /// True for the atomic truth-value type.
    pub fn is_boolean(&self) -> bool {
        matches!(self.slots.as_slice(), [TypeSlot::Atom(AtomTag::Boolean)])
    }

    /// Canonicalize a singly-nested tuple: `((a, b)) -> (a, b)`.
    ///
    /// Strips exactly one level, keeping the invariant that nested
    /// single-element tuples never accumulate.
    pub fn strip_brackets(self) -> LambdaType {
        if self.slots.len() == 1 {
            if let TypeSlot::Nested(inner) = &self.slots[0] {
                return inner.clone();
            }
        }
        self
    }

    /// Build the curried type of an abstraction from its bound-variable type
    /// and the type of its body.
    pub fn concat(bound: &LambdaType, body: &LambdaType) -> LambdaType {
        let mut slots = Vec::with_capacity(1 + body.slots.len());
        slots.push(bound.as_slot());
        slots.extend(body.slots.iter().cloned());
        LambdaType { slots }
    }

    /// True when at least one slot, at any nesting depth, is the `Any`
    /// placeholder.
    pub fn requires_inference(&self) -> bool {
        self.slots.iter().any(|slot| match slot {
            TypeSlot::Atom(AtomTag::Any) => true,
            TypeSlot::Atom(_) => false,
            TypeSlot::Nested(inner) => inner.requires_inference(),
        })
    }

    /// One-shot placeholder substitution: replace every `Any` occurrence,
    /// including inside nested slots, with the argument type.
    ///
    /// Deliberately not unification. The argument must be atomic and must not
    /// itself be `Any`; anything richer is out of scope for this calculus.
    pub fn infer_placeholder(&self, arg: &LambdaType) -> Result<LambdaType, CoreError> {
        if !arg.is_atomic() {
            return Err(CoreError::InferenceNonAtomic {
                arg_type: arg.clone(),
            });
        }
        if matches!(arg.slots.as_slice(), [TypeSlot::Atom(AtomTag::Any)]) {
            return Err(CoreError::InferenceUnderspecified);
        }
        let mut slots = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            match slot {
                TypeSlot::Atom(AtomTag::Any) => slots.push(arg.slots[0].clone()),
                TypeSlot::Atom(tag) => slots.push(TypeSlot::Atom(*tag)),
                TypeSlot::Nested(inner) => {
                    slots.push(TypeSlot::Nested(inner.infer_placeholder(arg)?))
                }
            }
        }
        Ok(LambdaType { slots })
    }

    /// Modus-ponens deduction with an explicit error on mismatch.
    ///
    /// Runs placeholder inference when the functor mentions `Any`, compares
    /// the canonicalized first slot against the argument type, and returns
    /// the remainder of the functor type stripped of superfluous brackets.
    pub fn try_deduce_application(
        func: &LambdaType,
        arg: &LambdaType,
    ) -> Result<LambdaType, CoreError> {
        let mismatch = || CoreError::ApplicationFailure {
            functor_type: func.clone(),
            arg_type: arg.clone(),
        };
        if func.is_empty() || arg.is_empty() {
            return Err(mismatch());
        }
        let resolved = if func.requires_inference() {
            func.infer_placeholder(arg)?
        } else {
            func.clone()
        };
        let first = resolved.slots[0].clone().add_brackets();
        if first != *arg {
            return Err(mismatch());
        }
        let rest = LambdaType::new(resolved.slots[1..].to_vec()).strip_brackets();
        if rest.is_empty() {
            // the functor type was not functional after all
            return Err(mismatch());
        }
        Ok(rest)
    }

    /// Modus-ponens deduction with the failure sentinel on any mismatch.
    ///
    /// This is the form every parser reduction and every `Application`
    /// typecheck goes through.
    pub fn deduce_application(func: &LambdaType, arg: &LambdaType) -> LambdaType {
        Self::try_deduce_application(func, arg).unwrap_or_else(|_| Self::failure())
    }
}

impl fmt::Display for LambdaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slots.is_empty() {
            return write!(f, "()");
        }
        let parts: Vec<String> = self.slots.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("=>"))
    }
}
