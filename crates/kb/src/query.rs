//! Query compilation and execution for closed boolean terms.
//!
//! A normalized, closed term of atomic boolean type compiles into a union of
//! conjunctive patterns:
//!
//! - an existential quantifier allocates a fresh query variable and deepens
//!   every binding, mirroring the De Bruijn discipline of the term tree;
//! - a binary predicate emits a `(subject, property, object)` triple
//!   constraint over the query variables its arguments resolve to;
//! - a unary entity predicate pins its variable to that entity;
//! - `and` conjoins branch sets, `or` unions them.
//!
//! The executor answers three query modes against a [`KbModel`]:
//! `Ask` returns a truth value, `Select` the distinct bindings of the
//! answer-marked variables, `Count` how many there are.

use std::collections::{BTreeMap, BTreeSet};

use lambdaqa_core::{BuiltinOp, ConstKind, Constant, LambdaTerm};

use crate::error::KbError;
use crate::model::KbModel;

/// How the executor should answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Truth value of the formula.
    Ask,
    /// Bindings of the answer-marked variables.
    Select,
    /// Number of distinct bindings.
    Count,
}

/// The executor's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Boolean(bool),
    /// One list of `(variable, entity)` pairs per solution.
    Bindings(Vec<Vec<(String, String)>>),
    Count(usize),
}

/// Generator for fresh query-variable names, threaded explicitly through
/// compilation.
#[derive(Debug, Default)]
struct VarGen {
    next: usize,
}

impl VarGen {
    fn fresh(&mut self) -> String {
        let name = format!("?x{}", self.next);
        self.next += 1;
        name
    }
}

/// Query variables in scope, each at its current quantifier depth.
///
/// Depths line up with De Bruijn indices: a term variable with index `d`
/// refers to the query variable whose recorded depth is `d`.
#[derive(Debug, Clone, Default)]
struct DepthBindings {
    vars: Vec<(String, i64)>,
}

impl DepthBindings {
    /// Enter a quantifier: record its variable and deepen everything,
    /// the new variable included.
    fn bind(&mut self, var: String) {
        self.vars.push((var, 0));
        for (_, depth) in self.vars.iter_mut() {
            *depth += 1;
        }
    }

    fn resolve(&self, db_index: i64) -> Option<&str> {
        self.vars
            .iter()
            .find(|(_, depth)| *depth == db_index)
            .map(|(var, _)| var.as_str())
    }
}

/// One atomic constraint of a conjunctive pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `(subject, property, object)` must be a recorded fact.
    Triple {
        subject: String,
        property: String,
        object: String,
    },
    /// The query variable denotes exactly this entity.
    Bind { var: String, entity: String },
}

/// A compiled query: a union of conjunctive branches plus the variables
/// whose bindings answer the question.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub branches: Vec<Vec<Constraint>>,
    pub answer_vars: Vec<String>,
}

/// Compile a closed, atomic-boolean term into a query.
pub fn compile(term: &LambdaTerm) -> Result<CompiledQuery, KbError> {
    if !term.is_closed(0) {
        return Err(KbError::NotClosed);
    }
    let ttype = term.typecheck();
    if !ttype.is_boolean() {
        return Err(KbError::NotBoolean { got: ttype });
    }
    let mut gen = VarGen::default();
    let mut answer_vars = Vec::new();
    let branches = translate(term, DepthBindings::default(), &mut gen, &mut answer_vars)?;
    Ok(CompiledQuery {
        branches,
        answer_vars,
    })
}

fn translate(
    term: &LambdaTerm,
    mut bindings: DepthBindings,
    gen: &mut VarGen,
    answer_vars: &mut Vec<String>,
) -> Result<Vec<Vec<Constraint>>, KbError> {
    match term {
        LambdaTerm::Exists {
            body,
            answer_marked,
            ..
        } => {
            let var = gen.fresh();
            if *answer_marked {
                answer_vars.push(var.clone());
            }
            bindings.bind(var);
            translate(body, bindings, gen, answer_vars)
        }
        LambdaTerm::Constant(c) => translate_constant(c, bindings, gen, answer_vars),
        other => Err(KbError::UnsupportedTerm {
            fragment: other.to_string(),
        }),
    }
}

fn translate_constant(
    c: &Constant,
    bindings: DepthBindings,
    gen: &mut VarGen,
    answer_vars: &mut Vec<String>,
) -> Result<Vec<Vec<Constraint>>, KbError> {
    match c.kind() {
        // each connective argument explores quantifiers on its own copy of
        // the bindings
        ConstKind::Builtin(BuiltinOp::And) => {
            let left = translate(&c.args()[0], bindings.clone(), gen, answer_vars)?;
            let right = translate(&c.args()[1], bindings, gen, answer_vars)?;
            let mut branches = Vec::with_capacity(left.len() * right.len());
            for l in &left {
                for r in &right {
                    let mut branch = l.clone();
                    branch.extend(r.iter().cloned());
                    branches.push(branch);
                }
            }
            Ok(branches)
        }
        ConstKind::Builtin(BuiltinOp::Or) => {
            let mut branches = translate(&c.args()[0], bindings.clone(), gen, answer_vars)?;
            branches.extend(translate(&c.args()[1], bindings, gen, answer_vars)?);
            Ok(branches)
        }
        ConstKind::Predicate => translate_predicate(c, &bindings),
        _ => Err(KbError::UnsupportedTerm {
            fragment: LambdaTerm::Constant(c.clone()).to_string(),
        }),
    }
}

fn translate_predicate(c: &Constant, bindings: &DepthBindings) -> Result<Vec<Vec<Constraint>>, KbError> {
    let name = c.name().unwrap_or_default().to_string();
    let resolve = |arg: &LambdaTerm| -> Result<String, KbError> {
        match arg {
            LambdaTerm::Variable(v) => bindings
                .resolve(v.db_index)
                .map(str::to_string)
                .ok_or(KbError::UnresolvedVariable {
                    name: v.name.clone(),
                    index: v.db_index,
                }),
            other => Err(KbError::UnsupportedTerm {
                fragment: other.to_string(),
            }),
        }
    };
    match c.args() {
        [arg] => Ok(vec![vec![Constraint::Bind {
            var: resolve(arg)?,
            entity: name,
        }]]),
        [subject, object] => Ok(vec![vec![Constraint::Triple {
            subject: resolve(subject)?,
            property: name,
            object: resolve(object)?,
        }]]),
        _ => Err(KbError::UnsupportedTerm {
            fragment: LambdaTerm::Constant(c.clone()).to_string(),
        }),
    }
}

/// Executes compiled queries against a [`KbModel`].
#[derive(Debug, Clone)]
pub struct KbExecutor {
    model: KbModel,
}

impl KbExecutor {
    /// Executor over a model.
    pub fn new(model: KbModel) -> Self {
        Self { model }
    }

    /// The underlying model.
    pub fn model(&self) -> &KbModel {
        &self.model
    }

    /// Execute a closed boolean term.
    ///
    /// The `assignation` and `count` wrappers override the query mode and
    /// are unwrapped before compilation.
    pub fn execute(&self, term: &LambdaTerm, mode: QueryMode) -> Result<QueryResult, KbError> {
        let (term, mode) = unwrap_mode(term, mode);
        let query = compile(term)?;
        let solutions = self.solve(&query);
        Ok(match mode {
            QueryMode::Ask => QueryResult::Boolean(!solutions.is_empty()),
            QueryMode::Select => QueryResult::Bindings(solutions),
            QueryMode::Count => QueryResult::Count(solutions.len()),
        })
    }

    /// Distinct solutions of a compiled query, projected onto its answer
    /// variables (onto every variable when none is marked).
    fn solve(&self, query: &CompiledQuery) -> Vec<Vec<(String, String)>> {
        let mut distinct: BTreeSet<Vec<(String, String)>> = BTreeSet::new();
        for branch in &query.branches {
            // cheap equality pins first, then the joins
            let mut ordered: Vec<&Constraint> = branch.iter().collect();
            ordered.sort_by_key(|c| matches!(c, Constraint::Triple { .. }));

            let mut partials: Vec<BTreeMap<String, String>> = vec![BTreeMap::new()];
            for constraint in ordered {
                let mut extended = Vec::new();
                match constraint {
                    Constraint::Bind { var, entity } => {
                        for mut partial in partials {
                            match partial.get(var).map(|bound| bound == entity) {
                                Some(true) => extended.push(partial),
                                Some(false) => {}
                                None => {
                                    partial.insert(var.clone(), entity.clone());
                                    extended.push(partial);
                                }
                            }
                        }
                    }
                    Constraint::Triple {
                        subject,
                        property,
                        object,
                    } => {
                        for partial in &partials {
                            for (s, p, o) in self.model.triples() {
                                if p != property {
                                    continue;
                                }
                                if let Some(next) = extend_with_triple(
                                    partial,
                                    (subject.as_str(), s),
                                    (object.as_str(), o),
                                ) {
                                    extended.push(next);
                                }
                            }
                        }
                    }
                }
                partials = extended;
                if partials.is_empty() {
                    break;
                }
            }
            for partial in partials {
                distinct.insert(project(&query.answer_vars, &partial));
            }
        }
        distinct.into_iter().collect()
    }
}

/// Try to extend a partial assignment so that the triple's variables match
/// the candidate fact.
fn extend_with_triple(
    partial: &BTreeMap<String, String>,
    (subject_var, subject): (&str, &str),
    (object_var, object): (&str, &str),
) -> Option<BTreeMap<String, String>> {
    let mut next = partial.clone();
    for (var, entity) in [(subject_var, subject), (object_var, object)] {
        match next.get(var).map(|bound| bound.as_str() == entity) {
            Some(true) => {}
            Some(false) => return None,
            None => {
                next.insert(var.to_string(), entity.to_string());
            }
        }
    }
    Some(next)
}

fn project(
    answer_vars: &[String],
    assignment: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    if answer_vars.is_empty() {
        // recovery for queries without an identified focus
        return assignment
            .iter()
            .map(|(var, entity)| (var.clone(), entity.clone()))
            .collect();
    }
    answer_vars
        .iter()
        .filter_map(|var| {
            assignment
                .get(var)
                .map(|entity| (var.clone(), entity.clone()))
        })
        .collect()
}

fn unwrap_mode(term: &LambdaTerm, mode: QueryMode) -> (&LambdaTerm, QueryMode) {
    if let LambdaTerm::Constant(c) = term {
        if matches!(c.kind(), ConstKind::Predicate) && c.arity() == 0 && c.args().len() == 1 {
            match c.name() {
                Some("assignation") => return (&c.args()[0], QueryMode::Select),
                Some("count") => return (&c.args()[0], QueryMode::Count),
                _ => {}
            }
        }
    }
    (term, mode)
}
