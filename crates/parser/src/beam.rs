//! The transition parser and its beam search.
//!
//! Search explores action sequences over configurations. At every depth,
//! each live cell scores all catalogue actions; an action is *structurally*
//! inadmissible when the configuration cannot support it (empty buffer,
//! short stack, no coordination marker) and *type* inadmissible when the
//! deduced result type is the failure sentinel. Admissible actions score
//! `exp(w · φ(configuration, action))`, inadmissible ones score zero and are
//! never expanded, which keeps ill-typed terms out of the completed beam.
//!
//! Candidates are pooled across the whole beam, ranked by score and cut to
//! the beam width. A configuration with an empty buffer and a single stack
//! element is final; final cells collect into the completed beam and stop
//! expanding. Search ends when no live cell remains.

use std::rc::Rc;

use lambdaqa_core::LambdaType;

use crate::actions::{ActionCatalogue, ActionKind};
use crate::config::{BeamCell, Configuration, StackElement};
use crate::error::ParserError;
use crate::features::extract_symbols;
use crate::token::Token;
use crate::weights::SparseWeightVector;

/// A shift-reduce parser with a fixed action catalogue and a learned
/// scoring model.
#[derive(Debug, Clone)]
pub struct TransitionParser {
    catalogue: ActionCatalogue,
    weights: SparseWeightVector,
}

impl TransitionParser {
    /// A parser over the standard catalogue with zero weights.
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self::with_catalogue(ActionCatalogue::standard()?))
    }

    /// A parser over an explicit catalogue.
    pub fn with_catalogue(catalogue: ActionCatalogue) -> Self {
        Self {
            catalogue,
            weights: SparseWeightVector::new(),
        }
    }

    pub fn catalogue(&self) -> &ActionCatalogue {
        &self.catalogue
    }

    pub fn weights(&self) -> &SparseWeightVector {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut SparseWeightVector {
        &mut self.weights
    }

    /// Replace the scoring model, e.g. with reloaded trained weights.
    pub fn set_weights(&mut self, weights: SparseWeightVector) {
        self.weights = weights;
    }

    /// Execute one action on a configuration.
    ///
    /// The caller guarantees admissibility; `prefix_score` becomes the score
    /// of the resulting configuration.
    pub fn exec_action(
        &self,
        config: &Configuration,
        tokens: &[Token],
        action_idx: usize,
        prefix_score: f64,
    ) -> Configuration {
        let action = self.catalogue.action(action_idx);
        let mut stack = config.stack.clone();
        let mut buffer = config.buffer.clone();

        match action.kind() {
            ActionKind::Shift => {
                let next = buffer.remove(0);
                let token = &tokens[next];
                stack.push(StackElement::new(
                    token.pos_tag(),
                    next,
                    token
                        .logical_type()
                        .cloned()
                        .unwrap_or_else(LambdaType::failure),
                ));
            }
            ActionKind::Drop => {
                buffer.remove(0);
            }
            ActionKind::ShiftUnary => {
                let next = buffer.remove(0);
                let token = &tokens[next];
                let ttype = token
                    .logical_type()
                    .map(|t| action.logical_type(t, None))
                    .unwrap_or_else(LambdaType::failure);
                stack.push(StackElement::new(token.pos_tag(), next, ttype));
            }
            ActionKind::ApplyLeft | ActionKind::ApplyRight => {
                let rhs = stack.pop().expect("admissible reduce has two operands");
                let lhs = stack.pop().expect("admissible reduce has two operands");
                stack.push(StackElement::new(
                    action.label(),
                    action.head(lhs.head_idx, Some(rhs.head_idx), None),
                    action.logical_type(&lhs.logical_type, Some(&rhs.logical_type)),
                ));
            }
            ActionKind::Coord => {
                let rhs = stack.pop().expect("admissible coord has three operands");
                let marker = stack.pop().expect("admissible coord has three operands");
                let lhs = stack.pop().expect("admissible coord has three operands");
                stack.push(StackElement::new(
                    action.label(),
                    action.head(lhs.head_idx, Some(rhs.head_idx), Some(marker.head_idx)),
                    action.logical_type(&lhs.logical_type, Some(&rhs.logical_type)),
                ));
            }
        }

        Configuration {
            stack,
            buffer,
            prefix_score,
        }
    }

    /// Admissibility flags for every catalogue action in a configuration.
    ///
    /// `prev_action` is the catalogue index of the action that produced the
    /// configuration; dropping a token straight after a binary reduction is
    /// not allowed.
    pub fn generate_constraints(
        &self,
        config: &Configuration,
        tokens: &[Token],
        prev_action: Option<usize>,
    ) -> Vec<bool> {
        let stack = &config.stack;
        let next_token = config.buffer.first().map(|&idx| &tokens[idx]);
        let prev_is_binary_apply = prev_action.is_some_and(|idx| {
            matches!(
                self.catalogue.action(idx).kind(),
                ActionKind::ApplyLeft | ActionKind::ApplyRight
            )
        });

        self.catalogue
            .actions()
            .iter()
            .map(|action| match action.kind() {
                ActionKind::Shift => next_token.is_some_and(|t| t.logical_form().is_some()),
                ActionKind::Drop => next_token.is_some() && !prev_is_binary_apply,
                ActionKind::ShiftUnary => next_token.is_some_and(|t| {
                    t.is_predicate()
                        && t.logical_type()
                            .is_some_and(|ttype| !action.logical_type(ttype, None).is_failure())
                }),
                ActionKind::ApplyLeft | ActionKind::ApplyRight => {
                    stack.len() >= 2
                        && !action
                            .logical_type(
                                &stack[stack.len() - 2].logical_type,
                                Some(&stack[stack.len() - 1].logical_type),
                            )
                            .is_failure()
                }
                ActionKind::Coord => {
                    stack.len() >= 3
                        && self
                            .catalogue
                            .is_coordinator_label(&stack[stack.len() - 2].label)
                        && !action
                            .logical_type(
                                &stack[stack.len() - 3].logical_type,
                                Some(&stack[stack.len() - 1].logical_type),
                            )
                            .is_failure()
                }
            })
            .collect()
    }

    /// A strictly positive score for each admissible action, zero for the
    /// inadmissible ones.
    pub fn predict_scores(
        &self,
        config: &Configuration,
        tokens: &[Token],
        prev_action: Option<usize>,
    ) -> Vec<f64> {
        let symbols = extract_symbols(config, tokens);
        let flags = self.generate_constraints(config, tokens, prev_action);
        self.catalogue
            .actions()
            .iter()
            .zip(flags)
            .map(|(action, admissible)| {
                if admissible {
                    self.weights.dot(&symbols, action.label()).exp()
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Beam search over action sequences.
    ///
    /// Returns the completed beam: every final cell reached before the live
    /// beam died out. The parse succeeded when the completed beam is
    /// non-empty and carries probability mass; the learner checks both.
    pub fn predict_beam(&self, beam_width: usize, tokens: &[Token]) -> Vec<Rc<BeamCell>> {
        let mut next_beam = vec![Rc::new(BeamCell::root(Configuration::initial(tokens.len())))];
        let mut completed = Vec::new();

        while !next_beam.is_empty() {
            let this_beam = std::mem::take(&mut next_beam);
            let mut candidates: Vec<(Rc<BeamCell>, usize, f64)> = Vec::new();
            for cell in this_beam {
                let scores = self.predict_scores(&cell.config, tokens, cell.action);
                let prefix = cell.config.prefix_score;
                for (action_idx, score) in scores.into_iter().enumerate() {
                    if score > 0.0 {
                        candidates.push((cell.clone(), action_idx, score * prefix));
                    }
                }
            }
            candidates.sort_by(|a, b| b.2.total_cmp(&a.2));
            candidates.truncate(beam_width);

            for (prev, action_idx, score) in candidates {
                let config = self.exec_action(&prev.config, tokens, action_idx, score);
                let cell = Rc::new(BeamCell {
                    prev: Some(prev),
                    action: Some(action_idx),
                    config,
                });
                if cell.config.is_final() {
                    completed.push(cell);
                } else {
                    next_beam.push(cell);
                }
            }
            log::trace!(
                "beam step: {} live cells, {} completed",
                next_beam.len(),
                completed.len()
            );
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SRAction;
    use lambdaqa_core::NamingContext;
    use lambdaqa_syntax::TermParser;

    fn kb_token(form: &str, pos: &str, macro_name: &str) -> Token {
        let context = NamingContext::kb_builtins();
        Token::new(
            form,
            pos,
            Some(macro_name.to_string()),
            context.lookup(macro_name),
        )
    }

    fn wh_token() -> Token {
        let term = TermParser::new(NamingContext::kb_builtins())
            .parse_code("(lambda (P:e=>t) (@exists (x:e) (P x)))")
            .unwrap()
            .unwrap();
        Token::new("quelle", "WH", None, Some(term))
    }

    /// "quelle capitale France": wh + binary predicate + entity.
    fn capital_question() -> Vec<Token> {
        vec![
            wh_token(),
            kb_token("capitale", "NC", "P36"),
            kb_token("France", "NPP", "Q142"),
        ]
    }

    #[test]
    fn test_beam_completes_on_wellformed_input() {
        let parser = TransitionParser::new().unwrap();
        let completed = parser.predict_beam(16, &capital_question());
        assert!(!completed.is_empty());

        // type-pruning soundness: nothing ill-typed reaches the completed
        // beam
        for cell in &completed {
            assert!(!cell.config.stack[0].logical_type.is_failure());
            assert!(cell.config.is_final());
        }

        // at least one completed derivation is a boolean query
        assert!(completed
            .iter()
            .any(|cell| cell.config.stack[0].logical_type.is_boolean()));
    }

    #[test]
    fn test_beam_is_deterministic() {
        let parser = TransitionParser::new().unwrap();
        let fingerprint = |cells: &[Rc<BeamCell>]| -> Vec<(String, String)> {
            cells
                .iter()
                .map(|cell| {
                    (
                        cell.config.stack[0].logical_type.to_string(),
                        format!("{:.12}", cell.config.prefix_score),
                    )
                })
                .collect()
        };
        let a = parser.predict_beam(8, &capital_question());
        let b = parser.predict_beam(8, &capital_question());
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_untyped_input_yields_empty_completed_beam() {
        let parser = TransitionParser::new().unwrap();
        let tokens = vec![Token::surface("le", "DET"), Token::surface("chat", "NC")];
        let completed = parser.predict_beam(8, &tokens);
        assert!(completed.is_empty());
    }

    #[test]
    fn test_type_constraints_exclude_failing_reduction() {
        let parser = TransitionParser::new().unwrap();
        // two entity restrictions on the stack: plain application of one to
        // the other cannot be typed
        let restriction = LambdaType::function(&[LambdaType::entity()], &LambdaType::boolean());
        let config = Configuration {
            stack: vec![
                StackElement::new("NC", 0, restriction.clone()),
                StackElement::new("NC", 1, restriction),
            ],
            buffer: vec![],
            prefix_score: 1.0,
        };
        let tokens = vec![Token::surface("a", "NC"), Token::surface("b", "NC")];
        let flags = parser.generate_constraints(&config, &tokens, None);

        let idx_apply_left = parser
            .catalogue()
            .actions()
            .iter()
            .position(|a| a.label() == ">")
            .unwrap();
        assert!(!flags[idx_apply_left]);

        // no coordination marker below the top either
        let idx_coord = parser
            .catalogue()
            .actions()
            .iter()
            .position(|a| a.label() == "C[AND]")
            .unwrap();
        assert!(!flags[idx_coord]);
    }

    #[test]
    fn test_drop_blocked_after_binary_apply() {
        let parser = TransitionParser::new().unwrap();
        let config = Configuration {
            stack: vec![StackElement::new(">", 0, LambdaType::boolean())],
            buffer: vec![1],
            prefix_score: 1.0,
        };
        let tokens = vec![Token::surface("a", "NC"), Token::surface("b", "NC")];

        let idx_apply_left = parser
            .catalogue()
            .actions()
            .iter()
            .position(|a| a.label() == ">")
            .unwrap();
        let idx_drop = parser
            .catalogue()
            .actions()
            .iter()
            .position(|a| a.label() == "D")
            .unwrap();

        let after_apply = parser.generate_constraints(&config, &tokens, Some(idx_apply_left));
        assert!(!after_apply[idx_drop]);
        let after_none = parser.generate_constraints(&config, &tokens, None);
        assert!(after_none[idx_drop]);
    }

    #[test]
    fn test_entity_predicate_reduce_to_boolean() {
        // a two-token input and a single JOIN-style combinator taking the
        // entity restriction first: one ApplyLeft reaches a final boolean
        // configuration
        let answer = TermParser::new(NamingContext::kb_builtins())
            .parse_code(
                "(lambda (Q:e=>t P:e=>e=>t) (@exists (x:e) (exists (y:e) (and (P x y) (Q y)))))",
            )
            .unwrap()
            .unwrap();
        let catalogue = ActionCatalogue::with_actions(
            vec![
                SRAction::plain(ActionKind::Shift),
                SRAction::with_combinator(ActionKind::ApplyLeft, "ANSWER", answer),
            ],
            [],
        );
        let parser = TransitionParser::with_catalogue(catalogue);

        let tokens = vec![
            kb_token("France", "NPP", "Q142"),
            kb_token("capitale", "NC", "P36"),
        ];
        let completed = parser.predict_beam(4, &tokens);
        assert_eq!(completed.len(), 1);
        let final_config = &completed[0].config;
        assert_eq!(final_config.stack.len(), 1);
        assert!(final_config.stack[0].logical_type.is_boolean());
    }
}
