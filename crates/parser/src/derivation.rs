//! Derivations: replaying a completed beam cell into a logical form.
//!
//! A derivation is the back-chain from a completed cell to the beam root,
//! reversed into forward order. Each step pairs the configuration an action
//! was taken *from* with the action's catalogue index; the last step carries
//! the final configuration and no action. Replaying the steps over the raw
//! tokens rebuilds the closed lambda term of the parse, and walking them
//! again extracts the feature vector the learner needs.

use std::rc::Rc;

use lambdaqa_core::{LambdaTerm, LambdaType};

use crate::actions::{ActionCatalogue, ActionKind};
use crate::config::{BeamCell, Configuration};
use crate::error::ParserError;
use crate::features::extract_symbols;
use crate::token::Token;
use crate::weights::SparseWeightVector;

/// One completed parse, in forward order.
#[derive(Debug, Clone)]
pub struct Derivation {
    steps: Vec<(Configuration, Option<usize>)>,
    dtype: LambdaType,
}

impl Derivation {
    /// Backtrack a completed cell to the beam root.
    pub fn from_cell(cell: &Rc<BeamCell>) -> Self {
        let dtype = cell
            .config
            .stack
            .last()
            .map(|element| element.logical_type.clone())
            .unwrap_or_else(LambdaType::failure);

        let mut steps = vec![(cell.config.clone(), None)];
        let mut current = cell.clone();
        while let (Some(prev), Some(action)) = (current.prev.clone(), current.action) {
            steps.push((prev.config.clone(), Some(action)));
            current = prev;
        }
        steps.reverse();
        Self { steps, dtype }
    }

    /// The `(configuration, action)` steps, forward order.
    pub fn steps(&self) -> &[(Configuration, Option<usize>)] {
        &self.steps
    }

    /// The logical type of the final constituent.
    pub fn dtype(&self) -> &LambdaType {
        &self.dtype
    }

    /// The prefix score of the final configuration.
    pub fn final_score(&self) -> f64 {
        self.steps
            .last()
            .map(|(config, _)| config.prefix_score)
            .unwrap_or(0.0)
    }

    /// The action labels of this derivation, for inspection and logging.
    pub fn action_labels(&self, catalogue: &ActionCatalogue) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|(_, action)| action.map(|idx| catalogue.action(idx).label().to_string()))
            .collect()
    }

    /// Replay the derivation over the tokens into a single lambda term.
    ///
    /// Mirrors the term-building side of each action: shifts push the
    /// token's attached term, unary shifts wrap it in the combinator,
    /// reductions apply the two operand terms (a coordination additionally
    /// discards the marker term between them).
    pub fn build_term(
        &self,
        catalogue: &ActionCatalogue,
        tokens: &[Token],
    ) -> Result<LambdaTerm, ParserError> {
        let mut idx = 0;
        let mut stack: Vec<LambdaTerm> = Vec::new();

        for (_, action) in &self.steps {
            let Some(action_idx) = action else { break };
            let action = catalogue.action(*action_idx);
            match action.kind() {
                ActionKind::Shift => {
                    let term = tokens[idx]
                        .logical_form()
                        .ok_or(ParserError::EmptyDerivation)?
                        .clone();
                    stack.push(term);
                    idx += 1;
                }
                ActionKind::Drop => idx += 1,
                ActionKind::ShiftUnary => {
                    let term = tokens[idx]
                        .logical_form()
                        .ok_or(ParserError::EmptyDerivation)?
                        .clone();
                    stack.push(
                        action
                            .logical_apply(term, None)
                            .ok_or(ParserError::EmptyDerivation)?,
                    );
                    idx += 1;
                }
                ActionKind::ApplyLeft | ActionKind::ApplyRight => {
                    let top = stack.pop().ok_or(ParserError::EmptyDerivation)?;
                    let subtop = stack.pop().ok_or(ParserError::EmptyDerivation)?;
                    stack.push(
                        action
                            .logical_apply(subtop, Some(top))
                            .ok_or(ParserError::EmptyDerivation)?,
                    );
                }
                ActionKind::Coord => {
                    let top = stack.pop().ok_or(ParserError::EmptyDerivation)?;
                    let _marker = stack.pop().ok_or(ParserError::EmptyDerivation)?;
                    let subtop = stack.pop().ok_or(ParserError::EmptyDerivation)?;
                    stack.push(
                        action
                            .logical_apply(subtop, Some(top))
                            .ok_or(ParserError::EmptyDerivation)?,
                    );
                }
            }
        }
        stack.pop().ok_or(ParserError::EmptyDerivation)
    }

    /// The feature vector of the whole derivation: one observation per
    /// `(configuration, action)` step.
    pub fn featurize(
        &self,
        catalogue: &ActionCatalogue,
        tokens: &[Token],
    ) -> SparseWeightVector {
        let mut phi = SparseWeightVector::new();
        for (config, action) in &self.steps {
            let Some(action_idx) = action else { break };
            let symbols = extract_symbols(config, tokens);
            phi.accumulate(&symbols, catalogue.action(*action_idx).label());
        }
        phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackElement;

    fn chain(configs: Vec<Configuration>, actions: Vec<usize>) -> Rc<BeamCell> {
        let mut cell = Rc::new(BeamCell::root(configs[0].clone()));
        for (config, action) in configs.into_iter().skip(1).zip(actions) {
            cell = Rc::new(BeamCell {
                prev: Some(cell),
                action: Some(action),
                config,
            });
        }
        cell
    }

    #[test]
    fn test_back_chain_reverses_into_forward_order() {
        let c0 = Configuration::initial(1);
        let mut c1 = Configuration::initial(1);
        c1.buffer.clear();
        c1.stack
            .push(StackElement::new("NC", 0, LambdaType::boolean()));
        c1.prefix_score = 0.5;

        let deriv = Derivation::from_cell(&chain(vec![c0.clone(), c1.clone()], vec![0]));
        assert_eq!(deriv.steps().len(), 2);
        assert_eq!(&deriv.steps()[0], &(c0, Some(0)));
        assert_eq!(&deriv.steps()[1], &(c1, None));
        assert!(deriv.dtype().is_boolean());
        assert!((deriv.final_score() - 0.5).abs() < 1e-10);
    }
}
