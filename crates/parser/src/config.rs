//! Parser configurations and beam cells.
//!
//! A configuration is the full state of one partial parse: the stack of
//! reduced constituents, the indices of the tokens still in the buffer, and
//! the prefix score of the action sequence that produced it. Beam cells
//! chain configurations backwards to the initial one, so a completed parse
//! can be replayed into a derivation.

use std::fmt;
use std::rc::Rc;

use lambdaqa_core::LambdaType;

/// One reduced constituent on the stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackElement {
    /// Display label: the POS tag of a shifted token, or the label of the
    /// action that built this constituent.
    pub label: String,
    /// Index of the originating head token.
    pub head_idx: usize,
    /// Logical type of the constituent.
    pub logical_type: LambdaType,
}

impl StackElement {
    pub fn new(label: impl Into<String>, head_idx: usize, logical_type: LambdaType) -> Self {
        Self {
            label: label.into(),
            head_idx,
            logical_type,
        }
    }
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.label, self.head_idx)
    }
}

/// The state of one partial parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Reduced constituents, top of stack last.
    pub stack: Vec<StackElement>,
    /// Indices of the tokens not yet consumed, in order.
    pub buffer: Vec<usize>,
    /// Product of the scores of the actions taken so far.
    pub prefix_score: f64,
}

impl Configuration {
    /// The initial configuration: empty stack, full buffer, score one.
    pub fn initial(input_size: usize) -> Self {
        Self {
            stack: Vec::new(),
            buffer: (0..input_size).collect(),
            prefix_score: 1.0,
        }
    }

    /// A configuration is final when the buffer is consumed and exactly one
    /// constituent remains.
    pub fn is_final(&self) -> bool {
        self.buffer.is_empty() && self.stack.len() == 1
    }
}

/// A node of the beam forest.
///
/// Cells are created during search and never mutated; the live beam at a
/// given depth is the set of cells not yet final.
#[derive(Debug, Clone)]
pub struct BeamCell {
    /// The predecessor cell, `None` at the root.
    pub prev: Option<Rc<BeamCell>>,
    /// Index into the action catalogue of the action that produced this
    /// cell, `None` at the root.
    pub action: Option<usize>,
    /// The resulting configuration.
    pub config: Configuration,
}

impl BeamCell {
    /// The root cell of a search.
    pub fn root(config: Configuration) -> Self {
        Self {
            prev: None,
            action: None,
            config,
        }
    }

    /// True for the root of the beam.
    pub fn is_root(&self) -> bool {
        self.prev.is_none() || self.action.is_none()
    }
}
