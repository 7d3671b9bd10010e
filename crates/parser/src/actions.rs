//! The transition catalogue: the fixed set of parser actions.
//!
//! Every action is an operator over stack constituents and their lambda
//! terms. The non-trivial ones own a combinator term taken from the
//! definition mini-language; applying the action wraps the operands in
//! applications of a fresh copy of that combinator. Each action exposes
//! three views of the same operation:
//!
//! - [`SRAction::logical_apply`] builds the resulting lambda term,
//! - [`SRAction::logical_type`] deduces the resulting logical type,
//! - [`SRAction::head`] selects the head token index of the result.
//!
//! The catalogue is built once per parser and never mutated. Its display
//! labels (`U[SWAP]`, `>[JOIN]`, …) double as the discrete output symbols of
//! the scoring model.

use std::collections::HashSet;

use lambdaqa_core::{LambdaTerm, LambdaType, NamingContext};
use lambdaqa_syntax::TermParser;

use crate::error::ParserError;

/// The kind of a parser action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Push the next buffer token onto the stack.
    Shift,
    /// Discard the next buffer token.
    Drop,
    /// Push the next buffer token wrapped in a unary combinator.
    ShiftUnary,
    /// Reduce the top two stack elements, left element as functor side.
    ApplyLeft,
    /// Reduce the top two stack elements, right element as functor side.
    ApplyRight,
    /// Reduce three elements, gobbling the middle coordination marker.
    Coord,
}

impl ActionKind {
    /// One-character tag used in display labels.
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::Shift => "S",
            ActionKind::Drop => "D",
            ActionKind::ShiftUnary => "U",
            ActionKind::ApplyLeft => ">",
            ActionKind::ApplyRight => "<",
            ActionKind::Coord => "C",
        }
    }
}

/// One catalogue action, immutable once constructed.
#[derive(Debug, Clone)]
pub struct SRAction {
    kind: ActionKind,
    macro_name: Option<String>,
    combinator: Option<LambdaTerm>,
    combinator_type: Option<LambdaType>,
    label: String,
}

impl SRAction {
    /// An action without a combinator.
    pub fn plain(kind: ActionKind) -> Self {
        Self {
            kind,
            macro_name: None,
            combinator: None,
            combinator_type: None,
            label: kind.tag().to_string(),
        }
    }

    /// An action owning a named combinator.
    pub fn with_combinator(
        kind: ActionKind,
        macro_name: impl Into<String>,
        combinator: LambdaTerm,
    ) -> Self {
        let macro_name = macro_name.into();
        let combinator_type = combinator.typecheck();
        Self {
            label: format!("{}[{}]", kind.tag(), macro_name),
            kind,
            macro_name: Some(macro_name),
            combinator_type: Some(combinator_type),
            combinator: Some(combinator),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// The display label, also the scoring output symbol.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn macro_name(&self) -> Option<&str> {
        self.macro_name.as_deref()
    }

    pub fn combinator(&self) -> Option<&LambdaTerm> {
        self.combinator.as_ref()
    }

    /// One step of compositional logical-form construction.
    ///
    /// Returns `None` for the kinds that build no term (`Shift`, `Drop`).
    pub fn logical_apply(
        &self,
        lhs: LambdaTerm,
        rhs: Option<LambdaTerm>,
    ) -> Option<LambdaTerm> {
        match self.kind {
            ActionKind::ApplyLeft | ActionKind::Coord => {
                let rhs = rhs?;
                Some(match &self.combinator {
                    Some(c) => LambdaTerm::application(
                        LambdaTerm::application(c.copy(0, 0), lhs),
                        rhs,
                    ),
                    None => LambdaTerm::application(lhs, rhs),
                })
            }
            ActionKind::ApplyRight => {
                let rhs = rhs?;
                Some(match &self.combinator {
                    Some(c) => LambdaTerm::application(
                        LambdaTerm::application(c.copy(0, 0), rhs),
                        lhs,
                    ),
                    None => LambdaTerm::application(rhs, lhs),
                })
            }
            ActionKind::ShiftUnary => self
                .combinator
                .as_ref()
                .map(|c| LambdaTerm::application(c.copy(0, 0), lhs)),
            ActionKind::Shift | ActionKind::Drop => None,
        }
    }

    /// The type of the result of this action over the operand types.
    ///
    /// Failure-typed results mark the action as inadmissible in the
    /// configuration at hand.
    pub fn logical_type(&self, lhs: &LambdaType, rhs: Option<&LambdaType>) -> LambdaType {
        let failure = LambdaType::failure();
        match self.kind {
            ActionKind::ApplyLeft | ActionKind::Coord => {
                let rhs = rhs.unwrap_or(&failure);
                let lhs = match &self.combinator_type {
                    Some(ctype) => LambdaType::deduce_application(ctype, lhs),
                    None => lhs.clone(),
                };
                LambdaType::deduce_application(&lhs, rhs)
            }
            ActionKind::ApplyRight => {
                let rhs = rhs.unwrap_or(&failure);
                let rhs = match &self.combinator_type {
                    Some(ctype) => LambdaType::deduce_application(ctype, rhs),
                    None => rhs.clone(),
                };
                LambdaType::deduce_application(&rhs, lhs)
            }
            ActionKind::ShiftUnary => match &self.combinator_type {
                Some(ctype) => LambdaType::deduce_application(ctype, lhs),
                None => failure,
            },
            ActionKind::Shift | ActionKind::Drop => failure,
        }
    }

    /// The head token index of the result.
    pub fn head(&self, lhs: usize, rhs: Option<usize>, coord: Option<usize>) -> usize {
        match self.kind {
            ActionKind::ApplyRight => rhs.unwrap_or(lhs),
            ActionKind::Coord => coord.unwrap_or(lhs),
            _ => lhs,
        }
    }
}

impl std::fmt::Display for SRAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// The fixed action catalogue of a parser, plus the stack labels recognized
/// as coordination markers.
#[derive(Debug, Clone)]
pub struct ActionCatalogue {
    actions: Vec<SRAction>,
    coordinator_labels: HashSet<String>,
}

impl ActionCatalogue {
    /// The standard catalogue: plain shift/drop/apply actions plus the
    /// SWAP, JOIN, AND and OR combinators of the macro library.
    pub fn standard() -> Result<Self, ParserError> {
        let mut parser = TermParser::new(NamingContext::kb_builtins());
        let mut actions = vec![
            SRAction::plain(ActionKind::Shift),
            SRAction::plain(ActionKind::ApplyLeft),
            SRAction::plain(ActionKind::ApplyRight),
            SRAction::plain(ActionKind::Drop),
        ];

        let define = |parser: &mut TermParser,
                          source: &str,
                          kinds: &[ActionKind]|
         -> Result<Vec<SRAction>, ParserError> {
            parser.parse_code(source)?;
            let (name, term) = parser
                .last_defined()
                .map(|(name, term)| (name.to_string(), term.clone()))
                .expect("definition source defines a macro");
            Ok(kinds
                .iter()
                .map(|kind| SRAction::with_combinator(*kind, name.clone(), term.clone()))
                .collect())
        };

        actions.extend(define(
            &mut parser,
            "(define SWAP (lambda (P:e=>e=>t x:e y:e) (P y x)))",
            &[ActionKind::ShiftUnary],
        )?);
        actions.extend(define(
            &mut parser,
            "(define JOIN (lambda (P:e=>e=>t Q:e=>t x:e) (exists (y:e) (and (P x y) (Q y)))))",
            &[ActionKind::ApplyLeft, ActionKind::ApplyRight],
        )?);
        actions.extend(define(
            &mut parser,
            "(define AND (lambda (P:e=>t Q:e=>t x:e) (and (P x) (Q x))))",
            &[ActionKind::Coord],
        )?);
        actions.extend(define(
            &mut parser,
            "(define OR (lambda (P:e=>t Q:e=>t x:e) (or (P x) (Q x))))",
            &[ActionKind::Coord],
        )?);

        Ok(Self::with_actions(
            actions,
            ["AND", "OR"].map(str::to_string),
        ))
    }

    /// A catalogue over an explicit action set.
    pub fn with_actions(
        actions: Vec<SRAction>,
        coordinator_labels: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            actions,
            coordinator_labels: coordinator_labels.into_iter().collect(),
        }
    }

    /// The actions, in catalogue order.
    pub fn actions(&self) -> &[SRAction] {
        &self.actions
    }

    /// The action at a catalogue index.
    pub fn action(&self, idx: usize) -> &SRAction {
        &self.actions[idx]
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// True when a stack label marks a coordination site.
    pub fn is_coordinator_label(&self, label: &str) -> bool {
        self.coordinator_labels.contains(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdaqa_core::Constant;

    fn entity_restriction() -> LambdaType {
        LambdaType::function(&[LambdaType::entity()], &LambdaType::boolean())
    }

    fn binary_pred() -> LambdaType {
        LambdaType::function(
            &[LambdaType::entity(), LambdaType::entity()],
            &LambdaType::boolean(),
        )
    }

    #[test]
    fn test_standard_catalogue_shape() {
        let catalogue = ActionCatalogue::standard().unwrap();
        let labels: Vec<&str> = catalogue.actions().iter().map(|a| a.label()).collect();
        assert_eq!(
            labels,
            vec!["S", ">", "<", "D", "U[SWAP]", ">[JOIN]", "<[JOIN]", "C[AND]", "C[OR]"]
        );
        assert!(catalogue.is_coordinator_label("AND"));
        assert!(!catalogue.is_coordinator_label("NC"));
    }

    #[test]
    fn test_join_types_reduce_to_entity_restriction() {
        let catalogue = ActionCatalogue::standard().unwrap();
        let join_left = catalogue
            .actions()
            .iter()
            .find(|a| a.label() == ">[JOIN]")
            .unwrap();

        let out = join_left.logical_type(&binary_pred(), Some(&entity_restriction()));
        assert_eq!(out, entity_restriction());

        // the mirror action takes its operands in the reverse order
        let join_right = catalogue
            .actions()
            .iter()
            .find(|a| a.label() == "<[JOIN]")
            .unwrap();
        let out = join_right.logical_type(&entity_restriction(), Some(&binary_pred()));
        assert_eq!(out, entity_restriction());
    }

    #[test]
    fn test_swap_preserves_predicate_type() {
        let catalogue = ActionCatalogue::standard().unwrap();
        let swap = catalogue
            .actions()
            .iter()
            .find(|a| a.label() == "U[SWAP]")
            .unwrap();
        assert_eq!(swap.logical_type(&binary_pred(), None), binary_pred());
    }

    #[test]
    fn test_ill_typed_operands_fail() {
        let catalogue = ActionCatalogue::standard().unwrap();
        let apply_left = catalogue
            .actions()
            .iter()
            .find(|a| a.label() == ">")
            .unwrap();
        // an entity restriction cannot take a binary predicate
        let out = apply_left.logical_type(&entity_restriction(), Some(&binary_pred()));
        assert!(out.is_failure());
    }

    #[test]
    fn test_swap_logical_apply_swaps_arguments() {
        let catalogue = ActionCatalogue::standard().unwrap();
        let swap = catalogue
            .actions()
            .iter()
            .find(|a| a.label() == "U[SWAP]")
            .unwrap();

        let pred = LambdaTerm::Constant(Constant::predicate("P36", 2));
        let swapped = swap.logical_apply(pred, None).unwrap();
        assert_eq!(swapped.typecheck(), binary_pred());
        // normalization pushes the swap inside: the result still awaits its
        // two entity arguments
        let normal = swapped.value();
        assert!(matches!(normal, LambdaTerm::Abstraction { .. }));
    }

    #[test]
    fn test_head_selection() {
        let left = SRAction::plain(ActionKind::ApplyLeft);
        let right = SRAction::plain(ActionKind::ApplyRight);
        assert_eq!(left.head(2, Some(5), None), 2);
        assert_eq!(right.head(2, Some(5), None), 5);

        let coord = SRAction::plain(ActionKind::Coord);
        assert_eq!(coord.head(1, Some(3), Some(2)), 2);
    }
}
