//! CRF-style online learning over beam outcomes.
//!
//! One update per example: run beam search, normalize the completed
//! derivations into probabilities, classify each as correct or incorrect
//! against the reference answer set, then move the weights toward the
//! features of correct derivations and away from the expectation over all
//! of them. A beam whose probability mass is zero is a parse failure; it
//! aborts the current example only and the epoch loop moves on.
//!
//! Correctness of a derivation is defined operationally: its type is
//! exactly the atomic truth value, and executing its normalized term
//! against the knowledge base returns at least one binding that belongs to
//! the reference answer set.

use std::collections::HashSet;

use lambdaqa_kb::{KbExecutor, QueryMode, QueryResult};
use serde::{Deserialize, Serialize};

use crate::beam::TransitionParser;
use crate::derivation::Derivation;
use crate::error::ParserError;
use crate::token::Token;
use crate::weights::SparseWeightVector;

/// Knobs of the training loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Step size of the gradient update.
    pub learning_rate: f64,
    /// Passes over the training data.
    pub epochs: usize,
    /// Beam width used during search.
    pub beam_width: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 50,
            beam_width: 1,
        }
    }
}

/// One training example: a token sequence and its reference answers.
#[derive(Debug, Clone)]
pub struct Example {
    pub tokens: Vec<Token>,
    pub reference: Vec<String>,
}

impl TransitionParser {
    /// Execute a derivation's term and collect the answer entities.
    ///
    /// Factoid answers are single-variable bindings; executor failures on
    /// malformed candidates mean an empty answer, not an aborted parse.
    pub fn query_answers(
        &self,
        derivation: &Derivation,
        tokens: &[Token],
        executor: &KbExecutor,
    ) -> Vec<String> {
        let Ok(term) = derivation.build_term(self.catalogue(), tokens) else {
            return Vec::new();
        };
        let term = term.value();
        match executor.execute(&term, QueryMode::Select) {
            Ok(QueryResult::Bindings(rows)) => rows
                .into_iter()
                .filter(|row| row.len() == 1)
                .map(|mut row| row.remove(0).1)
                .collect(),
            Ok(_) => Vec::new(),
            Err(err) => {
                log::debug!("candidate query failed: {err}");
                Vec::new()
            }
        }
    }

    /// Answer a question with the best well-typed derivation.
    ///
    /// A failed parse yields an empty answer here; training and evaluation
    /// surface it as an error instead.
    pub fn best_answer(
        &self,
        beam_width: usize,
        tokens: &[Token],
        executor: &KbExecutor,
    ) -> Vec<String> {
        let completed = self.predict_beam(beam_width, tokens);
        let mut derivations: Vec<Derivation> =
            completed.iter().map(Derivation::from_cell).collect();
        derivations.sort_by(|a, b| b.final_score().total_cmp(&a.final_score()));
        for derivation in &derivations {
            if derivation.dtype().is_boolean() {
                return self.query_answers(derivation, tokens, executor);
            }
        }
        Vec::new()
    }

    fn is_correct(
        &self,
        derivation: &Derivation,
        tokens: &[Token],
        refset: &HashSet<&str>,
        executor: &KbExecutor,
    ) -> bool {
        if !derivation.dtype().is_boolean() {
            return false;
        }
        self.query_answers(derivation, tokens, executor)
            .iter()
            .any(|answer| refset.contains(answer.as_str()))
    }

    /// One CRF-style stochastic gradient step on a single example.
    ///
    /// Returns the example's log-likelihood, the sum of `ln(probability)`
    /// over its correct derivations.
    pub fn sgd_train_one(
        &mut self,
        beam_width: usize,
        tokens: &[Token],
        reference: &[String],
        learning_rate: f64,
        executor: &KbExecutor,
    ) -> Result<f64, ParserError> {
        let completed = self.predict_beam(beam_width, tokens);
        let derivations: Vec<Derivation> =
            completed.iter().map(Derivation::from_cell).collect();
        let scores: Vec<f64> = derivations.iter().map(Derivation::final_score).collect();
        let z: f64 = scores.iter().sum();
        if derivations.is_empty() || z == 0.0 {
            return Err(ParserError::ParseFailure {
                derivations: derivations.len(),
                z,
            });
        }
        let probs: Vec<f64> = scores.iter().map(|s| s / z).collect();

        let refset: HashSet<&str> = reference.iter().map(String::as_str).collect();
        let correct: Vec<bool> = derivations
            .iter()
            .map(|d| self.is_correct(d, tokens, &refset, executor))
            .collect();
        let n_correct = correct.iter().filter(|&&c| c).count();

        let mut grad = SparseWeightVector::new();
        let mut grad_neg = SparseWeightVector::new();
        let mut log_likelihood = 0.0;
        for ((derivation, &is_correct), &prob) in
            derivations.iter().zip(&correct).zip(&probs)
        {
            let mut phi = derivation.featurize(self.catalogue(), tokens);
            if is_correct {
                grad += &phi;
                log_likelihood += prob.ln();
            }
            // a nonzero counter-update even when nothing was correct
            phi *= n_correct.max(1) as f64 * prob;
            grad_neg += &phi;
        }

        grad -= &grad_neg;
        grad *= learning_rate;
        *self.weights_mut() += &grad;
        Ok(log_likelihood)
    }

    /// Whether the highest-probability derivation answers correctly.
    pub fn eval_one(
        &self,
        beam_width: usize,
        tokens: &[Token],
        reference: &[String],
        executor: &KbExecutor,
    ) -> Result<bool, ParserError> {
        let completed = self.predict_beam(beam_width, tokens);
        let mut derivations: Vec<Derivation> =
            completed.iter().map(Derivation::from_cell).collect();
        let z: f64 = derivations.iter().map(Derivation::final_score).sum();
        if derivations.is_empty() || z == 0.0 {
            return Err(ParserError::ParseFailure {
                derivations: derivations.len(),
                z,
            });
        }
        derivations.sort_by(|a, b| b.final_score().total_cmp(&a.final_score()));

        let refset: HashSet<&str> = reference.iter().map(String::as_str).collect();
        Ok(self.is_correct(&derivations[0], tokens, &refset, executor))
    }

    /// Train by stochastic gradient ascent over the data set.
    ///
    /// Weights restart from zero. A parse failure skips its example; the
    /// per-epoch log-likelihood history is returned for monitoring.
    pub fn train(
        &mut self,
        data: &[Example],
        config: &TrainerConfig,
        executor: &KbExecutor,
    ) -> Vec<f64> {
        self.set_weights(SparseWeightVector::new());
        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 0..config.epochs {
            let mut log_likelihood = 0.0;
            for example in data {
                match self.sgd_train_one(
                    config.beam_width,
                    &example.tokens,
                    &example.reference,
                    config.learning_rate,
                    executor,
                ) {
                    Ok(ll) => log_likelihood += ll,
                    Err(err) => log::warn!("skipping example: {err}"),
                }
            }
            log::info!("epoch {epoch}: log-likelihood = {log_likelihood}");
            history.push(log_likelihood);
        }
        history
    }

    /// Accuracy of the current model over a data set. Parse failures count
    /// as incorrect.
    pub fn evaluate(&self, data: &[Example], beam_width: usize, executor: &KbExecutor) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let mut correct = 0;
        for example in data {
            match self.eval_one(beam_width, &example.tokens, &example.reference, executor) {
                Ok(true) => correct += 1,
                Ok(false) => {}
                Err(err) => log::warn!("evaluation parse failure: {err}"),
            }
        }
        correct as f64 / data.len() as f64
    }
}
