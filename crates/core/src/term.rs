//! The lambda-term model: an owned tagged tree with De Bruijn indices.
//!
//! A term is one of five variants. Each node exclusively owns its children;
//! [`LambdaTerm::copy`] produces a fully independent subtree with free
//! indices shifted, so library combinators can be instantiated at several
//! binding sites without aliasing.
//!
//! Variable occurrences carry a binder-counting index instead of relying on
//! their name: the index counts binders crossed from the occurrence up to its
//! binder, which makes substitution position-based and alpha-renaming
//! unnecessary. Occurrences not yet captured carry the [`FREE_INDEX`]
//! sentinel until a binder constructor claims them.
//!
//! Normalization is call-by-value: [`LambdaTerm::value`] fully evaluates an
//! argument before substituting it, and is idempotent. An application whose
//! functor resolves to neither an abstraction nor a constant function is
//! *stuck* and is returned unchanged; stuckness is the representation of a
//! partially-typed expression, not an error.

use std::fmt;

use crate::error::CoreError;
use crate::types::{LambdaType, TypeSlot};
use crate::value::{BuiltinOp, Value};

/// Sentinel index for a variable occurrence not yet captured by a binder.
pub const FREE_INDEX: i64 = 1 << 32;

/// Name of the placeholder variables filling unbound constant-function slots.
pub const SLOT_NAME: &str = "__x__";

/// A variable occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Surface name, kept for display and for construction-time capture.
    pub name: String,
    /// De Bruijn index; [`FREE_INDEX`] until captured.
    pub db_index: i64,
    /// Declared type, the failure sentinel until captured.
    pub ttype: LambdaType,
}

impl Variable {
    /// A fresh, not-yet-captured occurrence.
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_index: FREE_INDEX,
            ttype: LambdaType::failure(),
        }
    }

    /// A captured occurrence with an explicit index and type.
    pub fn bound(name: impl Into<String>, db_index: i64, ttype: LambdaType) -> Self {
        Self {
            name: name.into(),
            db_index,
            ttype,
        }
    }

    /// True when this occurrence is the one bound by `name` at `depth`.
    pub fn is_bound(&self, name: &str, depth: i64) -> bool {
        self.name == name && self.db_index == depth
    }
}

/// What a constant function denotes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstKind {
    /// A literal value, arity zero.
    Literal(Value),
    /// A builtin of the standard library, computed locally.
    Builtin(BuiltinOp),
    /// A knowledge-base predicate, evaluated by the external executor.
    Predicate,
}

/// A constant function: builtins, literals and knowledge-base predicates.
///
/// Emulates an abstraction over several arguments. Unbound slots hold
/// placeholder variables indexed `arity - position`, so the leftmost unbound
/// slot always carries the current arity as its index; `value()` binds slots
/// left to right, decrementing the arity. The denotation becomes available
/// once every slot is bound to another constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    name: Option<String>,
    ttype: LambdaType,
    arity: usize,
    args: Vec<LambdaTerm>,
    kind: ConstKind,
}

impl Constant {
    fn with_signature(
        name: Option<String>,
        argtypes: &[LambdaType],
        ret: &LambdaType,
        kind: ConstKind,
    ) -> Self {
        let n = argtypes.len();
        let args = argtypes
            .iter()
            .enumerate()
            .map(|(idx, t)| {
                LambdaTerm::Variable(Variable::bound(SLOT_NAME, (n - idx) as i64, t.clone()))
            })
            .collect();
        Self {
            name,
            ttype: LambdaType::function(argtypes, ret),
            arity: n,
            args,
            kind,
        }
    }

    /// A literal constant.
    pub fn literal(value: Value) -> Self {
        let ret = value.ttype();
        Self::with_signature(None, &[], &ret, ConstKind::Literal(value))
    }

    /// A builtin of the standard library.
    pub fn builtin(op: BuiltinOp) -> Self {
        let (argtypes, ret) = op.signature();
        Self::with_signature(Some(op.name().to_string()), &argtypes, &ret, ConstKind::Builtin(op))
    }

    /// A knowledge-base predicate over entities, returning a truth value.
    pub fn predicate(name: impl Into<String>, arity: usize) -> Self {
        let argtypes = vec![LambdaType::entity(); arity];
        Self::with_signature(
            Some(name.into()),
            &argtypes,
            &LambdaType::boolean(),
            ConstKind::Predicate,
        )
    }

    /// An externally-evaluated function with an explicit signature, such as
    /// the `assignation` and `count` query wrappers.
    pub fn external(
        name: impl Into<String>,
        argtypes: &[LambdaType],
        ret: &LambdaType,
    ) -> Self {
        Self::with_signature(Some(name.into()), argtypes, ret, ConstKind::Predicate)
    }

    /// Display name; literals have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared signature `(arg1, …, argN, ret)`.
    pub fn ttype(&self) -> &LambdaType {
        &self.ttype
    }

    /// Number of still-unbound argument slots.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The argument slots, bound or placeholder.
    pub fn args(&self) -> &[LambdaTerm] {
        &self.args
    }

    /// What this constant denotes.
    pub fn kind(&self) -> &ConstKind {
        &self.kind
    }

    /// True when every slot is bound to another constant, i.e. the
    /// denotation can be queried.
    pub fn is_constant(&self) -> bool {
        self.args.iter().all(|arg| match arg {
            LambdaTerm::Constant(inner) => inner.is_constant(),
            _ => false,
        })
    }

    /// Substitution inside the argument slots.
    ///
    /// A depth below the current arity resolves a *local* binder: one of this
    /// constant's own placeholder slots gets bound and the arity drops.
    /// Deeper calls resolve a *non-local* binder from an enclosing scope and
    /// leave the arity untouched.
    fn substitute(&mut self, name: &str, replacement: &LambdaTerm, depth: i64) {
        let local = depth < self.arity as i64;
        let depth = depth + self.arity as i64;
        let mut bound_here = 0;
        for slot in self.args.iter_mut() {
            match slot {
                LambdaTerm::Variable(v) => {
                    if v.is_bound(name, depth) {
                        *slot = replacement.copy(depth - 1, 0);
                        bound_here += 1;
                    } else if v.db_index - depth > 0 {
                        v.db_index -= 1;
                    }
                }
                other => other.substitute(name, replacement, depth),
            }
        }
        if local {
            self.arity -= bound_here;
        }
    }

    /// The denotation, once available.
    pub fn ret_value(&self) -> Result<Value, CoreError> {
        match &self.kind {
            ConstKind::Literal(value) => Ok(value.clone()),
            ConstKind::Builtin(op) => {
                if self.arity > 0 {
                    return Err(CoreError::Unsaturated {
                        name: op.name().to_string(),
                        remaining: self.arity,
                    });
                }
                let values = self
                    .args
                    .iter()
                    .map(|arg| arg.ret_value())
                    .collect::<Result<Vec<_>, _>>()?;
                op.apply(&values)
            }
            ConstKind::Predicate => Err(CoreError::ExternalPredicate {
                name: self.name.clone().unwrap_or_default(),
            }),
        }
    }
}

/// A lambda term.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaTerm {
    /// A variable occurrence.
    Variable(Variable),
    /// `(lambda (name:type) body)`, binding exactly one variable.
    Abstraction {
        bound_name: String,
        bound_type: LambdaType,
        body: Box<LambdaTerm>,
    },
    /// `(functor argument)`.
    Application {
        functor: Box<LambdaTerm>,
        argument: Box<LambdaTerm>,
    },
    /// `(exists (name:type) body)`; truth-valued via external execution.
    /// `answer_marked` records the `@exists` form whose bindings answer the
    /// question.
    Exists {
        bound_name: String,
        bound_type: LambdaType,
        body: Box<LambdaTerm>,
        answer_marked: bool,
    },
    /// A constant function.
    Constant(Constant),
}

impl LambdaTerm {
    /// A fresh free variable occurrence.
    pub fn variable(name: impl Into<String>) -> LambdaTerm {
        LambdaTerm::Variable(Variable::free(name))
    }

    /// A literal constant term.
    pub fn literal(value: Value) -> LambdaTerm {
        LambdaTerm::Constant(Constant::literal(value))
    }

    /// Build an abstraction, capturing free occurrences of `bound_name` in
    /// the body with De Bruijn indices.
    pub fn abstraction(
        bound_name: impl Into<String>,
        bound_type: LambdaType,
        mut body: LambdaTerm,
    ) -> LambdaTerm {
        let bound_name = bound_name.into();
        body.bind_var(&bound_name, &bound_type, 1);
        LambdaTerm::Abstraction {
            bound_name,
            bound_type,
            body: Box::new(body),
        }
    }

    /// Build an existential quantifier, capturing free occurrences of
    /// `bound_name` in the body.
    pub fn exists(
        bound_name: impl Into<String>,
        bound_type: LambdaType,
        mut body: LambdaTerm,
        answer_marked: bool,
    ) -> LambdaTerm {
        let bound_name = bound_name.into();
        body.bind_var(&bound_name, &bound_type, 1);
        LambdaTerm::Exists {
            bound_name,
            bound_type,
            body: Box::new(body),
            answer_marked,
        }
    }

    /// Build an application node.
    pub fn application(functor: LambdaTerm, argument: LambdaTerm) -> LambdaTerm {
        LambdaTerm::Application {
            functor: Box::new(functor),
            argument: Box::new(argument),
        }
    }

    /// Statically type the term.
    ///
    /// Total: an ill-typed application yields the failure sentinel, which
    /// then propagates upward through enclosing deductions.
    pub fn typecheck(&self) -> LambdaType {
        match self {
            LambdaTerm::Variable(v) => v.ttype.clone(),
            LambdaTerm::Constant(c) => c.ttype.clone(),
            LambdaTerm::Exists { body, .. } => body.typecheck(),
            LambdaTerm::Abstraction {
                bound_type, body, ..
            } => LambdaType::concat(bound_type, &body.typecheck()),
            LambdaTerm::Application { functor, argument } => {
                LambdaType::deduce_application(&functor.typecheck(), &argument.typecheck())
            }
        }
    }

    /// Deep-copy the term, shifting the index of every variable free at
    /// `depth` by `shift`. Bound occurrences are left untouched.
    pub fn copy(&self, shift: i64, depth: i64) -> LambdaTerm {
        let mut out = self.clone();
        if shift != 0 {
            out.shift_free(shift, depth);
        }
        out
    }

    /// Shift free-variable indices with an explicit work list, keeping the
    /// traversal depth independent of term size.
    fn shift_free(&mut self, shift: i64, depth: i64) {
        let mut work: Vec<(&mut LambdaTerm, i64)> = vec![(self, depth)];
        while let Some((node, d)) = work.pop() {
            match node {
                LambdaTerm::Variable(v) => {
                    if v.db_index - d > 0 {
                        v.db_index += shift;
                    }
                }
                LambdaTerm::Abstraction { body, .. } => work.push((body.as_mut(), d + 1)),
                LambdaTerm::Exists { body, .. } => work.push((body.as_mut(), d + 1)),
                LambdaTerm::Application { functor, argument } => {
                    work.push((functor.as_mut(), d));
                    work.push((argument.as_mut(), d));
                }
                LambdaTerm::Constant(c) => {
                    let inner = d + c.arity as i64;
                    for arg in c.args.iter_mut() {
                        work.push((arg, inner));
                    }
                }
            }
        }
    }

    /// Capture free occurrences of `name`, indexing them against the binder
    /// being introduced `depth` levels above. Construction-time only.
    fn bind_var(&mut self, name: &str, vtype: &LambdaType, depth: i64) {
        match self {
            LambdaTerm::Variable(v) => {
                if v.name == name && v.db_index == FREE_INDEX {
                    v.db_index = depth;
                    v.ttype = vtype.clone();
                }
            }
            LambdaTerm::Abstraction { body, .. } => body.bind_var(name, vtype, depth + 1),
            LambdaTerm::Exists { body, .. } => body.bind_var(name, vtype, depth + 1),
            LambdaTerm::Application { functor, argument } => {
                functor.bind_var(name, vtype, depth);
                argument.bind_var(name, vtype, depth);
            }
            // no external binder can capture inside a constant at
            // construction time
            LambdaTerm::Constant(_) => {}
        }
    }

    /// Replace the occurrences of `name` bound at the applicable depth with
    /// a shifted copy of `replacement`; the binder is being removed, so
    /// deeper free indices decrement by one.
    pub fn substitute(&mut self, name: &str, replacement: &LambdaTerm, depth: i64) {
        match self {
            LambdaTerm::Variable(v) => {
                if v.is_bound(name, depth) {
                    *self = replacement.copy(depth - 1, 0);
                } else if v.db_index - depth > 0 {
                    v.db_index -= 1;
                }
            }
            LambdaTerm::Abstraction { body, .. } => body.substitute(name, replacement, depth + 1),
            LambdaTerm::Exists { body, .. } => body.substitute(name, replacement, depth + 1),
            LambdaTerm::Application { functor, argument } => {
                functor.substitute(name, replacement, depth);
                argument.substitute(name, replacement, depth);
            }
            LambdaTerm::Constant(c) => c.substitute(name, replacement, depth),
        }
    }

    /// One full call-by-value normalization pass. Idempotent.
    pub fn value(self) -> LambdaTerm {
        match self {
            LambdaTerm::Variable(_) => self,
            LambdaTerm::Abstraction {
                bound_name,
                bound_type,
                body,
            } => LambdaTerm::Abstraction {
                bound_name,
                bound_type,
                body: Box::new(body.value()),
            },
            LambdaTerm::Exists {
                bound_name,
                bound_type,
                body,
                answer_marked,
            } => LambdaTerm::Exists {
                bound_name,
                bound_type,
                body: Box::new(body.value()),
                answer_marked,
            },
            LambdaTerm::Constant(mut c) => {
                c.args = c.args.into_iter().map(|arg| arg.value()).collect();
                LambdaTerm::Constant(c)
            }
            LambdaTerm::Application { functor, argument } => {
                let functor = functor.value();
                match functor {
                    LambdaTerm::Abstraction {
                        bound_name, body, ..
                    } => {
                        let arg = argument.value();
                        let mut body = *body;
                        body.substitute(&bound_name, &arg, 1);
                        body.value()
                    }
                    LambdaTerm::Constant(mut c) => {
                        let arg = argument.value();
                        c.substitute(SLOT_NAME, &arg, 0);
                        LambdaTerm::Constant(c).value()
                    }
                    stuck => LambdaTerm::Application {
                        functor: Box::new(stuck),
                        argument: Box::new(argument.value()),
                    },
                }
            }
        }
    }

    /// True when no free variable leaks past `depth`: every occurrence is
    /// bound by a quantifier, and every constant is fully applied.
    /// Lambda-bound terms are never closed.
    pub fn is_closed(&self, depth: i64) -> bool {
        match self {
            LambdaTerm::Variable(v) => v.db_index <= depth,
            LambdaTerm::Abstraction { .. } => false,
            LambdaTerm::Application { functor, argument } => {
                functor.is_closed(depth) && argument.is_closed(depth)
            }
            LambdaTerm::Exists { body, .. } => body.is_closed(depth + 1),
            LambdaTerm::Constant(c) => {
                c.arity == 0 && c.args.iter().all(|arg| arg.is_closed(depth))
            }
        }
    }

    /// True when the term denotes a queryable constant.
    pub fn is_constant(&self) -> bool {
        match self {
            LambdaTerm::Constant(c) => c.is_constant(),
            _ => false,
        }
    }

    /// The constant denotation of the term.
    ///
    /// This is the single extension point where an external effect happens:
    /// builtins compute locally, predicates and quantifiers report that they
    /// need the knowledge-base executor.
    pub fn ret_value(&self) -> Result<Value, CoreError> {
        match self {
            LambdaTerm::Constant(c) => c.ret_value(),
            LambdaTerm::Exists { .. } => Err(CoreError::ExternalQuantifier),
            _ => Err(CoreError::NotConstant),
        }
    }
}

impl fmt::Display for LambdaTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LambdaTerm::Variable(v) => {
                if v.db_index == FREE_INDEX {
                    write!(f, "{}", v.name)
                } else {
                    write!(f, "{}-{}", v.name, v.db_index)
                }
            }
            LambdaTerm::Abstraction {
                bound_name,
                bound_type,
                body,
            } => write!(f, "(lambda ({}:{}) {})", bound_name, bound_type, body),
            LambdaTerm::Application { functor, argument } => {
                write!(f, "({} {})", functor, argument)
            }
            LambdaTerm::Exists {
                bound_name,
                bound_type,
                body,
                answer_marked,
            } => {
                let kw = if *answer_marked { "@exists" } else { "exists" };
                write!(f, "({} ({}:{}) {})", kw, bound_name, bound_type, body)
            }
            LambdaTerm::Constant(c) => {
                if let Ok(value) = c.ret_value() {
                    return write!(f, "{}", value);
                }
                let name = c.name().unwrap_or("?");
                let args: Vec<String> = c.args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AtomTag;

    fn num(n: f64) -> LambdaTerm {
        LambdaTerm::literal(Value::Num(n))
    }

    fn plus() -> LambdaTerm {
        LambdaTerm::Constant(Constant::builtin(BuiltinOp::Add))
    }

    /// (lambda (x:num) (+ x 3))
    fn add3() -> LambdaTerm {
        let body = LambdaTerm::application(
            LambdaTerm::application(plus(), LambdaTerm::variable("x")),
            num(3.0),
        );
        LambdaTerm::abstraction("x", LambdaType::numeric(), body)
    }

    #[test]
    fn test_binding_assigns_indices() {
        let term = add3();
        match &term {
            LambdaTerm::Abstraction { body, .. } => match body.as_ref() {
                LambdaTerm::Application { functor, .. } => match functor.as_ref() {
                    LambdaTerm::Application { argument, .. } => match argument.as_ref() {
                        LambdaTerm::Variable(v) => {
                            assert_eq!(v.db_index, 1);
                            assert_eq!(v.ttype, LambdaType::numeric());
                        }
                        other => panic!("expected variable, got {other}"),
                    },
                    other => panic!("expected application, got {other}"),
                },
                other => panic!("expected application, got {other}"),
            },
            other => panic!("expected abstraction, got {other}"),
        }
    }

    #[test]
    fn test_application_typechecks_to_numeric() {
        let applied = LambdaTerm::application(add3(), num(2.0));
        let ttype = applied.typecheck();
        assert!(ttype.is_atomic());
        assert_eq!(ttype, LambdaType::numeric());
    }

    #[test]
    fn test_beta_reduction_to_constant() {
        // ((lambda (x:num) (+ x 3)) 2.0) normalizes to a saturated + node
        let result = LambdaTerm::application(add3(), num(2.0)).value();
        match &result {
            LambdaTerm::Constant(c) => {
                assert_eq!(c.name(), Some("+"));
                assert_eq!(c.arity(), 0);
                assert!(c.is_constant());
            }
            other => panic!("expected constant, got {other}"),
        }
        assert_eq!(result.ret_value().unwrap(), Value::Num(5.0));
    }

    #[test]
    fn test_normalization_idempotent() {
        let once = LambdaTerm::application(add3(), num(2.0)).value();
        let twice = once.clone().value();
        assert_eq!(once, twice);

        // also on terms that normalize to non-constants
        let stuck = LambdaTerm::application(LambdaTerm::variable("f"), num(1.0));
        let once = stuck.value();
        assert_eq!(once.clone().value(), once);
    }

    #[test]
    fn test_alpha_safety() {
        // consistent renaming of the bound variable changes nothing observable
        let renamed = {
            let body = LambdaTerm::application(
                LambdaTerm::application(plus(), LambdaTerm::variable("y")),
                num(3.0),
            );
            LambdaTerm::abstraction("y", LambdaType::numeric(), body)
        };
        assert_eq!(renamed.typecheck(), add3().typecheck());
        let a = LambdaTerm::application(add3(), num(2.0)).value();
        let b = LambdaTerm::application(renamed, num(2.0)).value();
        assert_eq!(a.ret_value().unwrap(), b.ret_value().unwrap());
    }

    #[test]
    fn test_copy_zero_shift_is_identity() {
        for term in [add3(), LambdaTerm::application(add3(), num(2.0))] {
            for depth in 0..3 {
                assert_eq!(term.copy(0, depth), term);
            }
        }
    }

    #[test]
    fn test_copy_shifts_only_free_occurrences() {
        // (lambda (x:num) (f x)) with f free
        let body = LambdaTerm::application(LambdaTerm::variable("f"), LambdaTerm::variable("x"));
        let mut term = LambdaTerm::abstraction("x", LambdaType::numeric(), body);
        // capture f against an outer binder two levels up
        term.bind_var("f", &LambdaType::function(&[LambdaType::numeric()], &LambdaType::numeric()), 2);

        let shifted = term.copy(5, 0);
        match &shifted {
            LambdaTerm::Abstraction { body, .. } => match body.as_ref() {
                LambdaTerm::Application { functor, argument } => {
                    match (functor.as_ref(), argument.as_ref()) {
                        (LambdaTerm::Variable(free), LambdaTerm::Variable(bound)) => {
                            // f was free at the copy root, x was not
                            assert_eq!(free.db_index, 3 + 5);
                            assert_eq!(bound.db_index, 1);
                        }
                        other => panic!("unexpected shape: {other:?}"),
                    }
                }
                other => panic!("expected application, got {other}"),
            },
            other => panic!("expected abstraction, got {other}"),
        }
    }

    #[test]
    fn test_currying_consistency() {
        // ((+ 2) 3) applied stepwise equals the one-shot saturation
        let stepwise = LambdaTerm::application(LambdaTerm::application(plus(), num(2.0)), num(3.0));
        // (lambda (a:num b:num) (+ a b)) 2 3
        let body = LambdaTerm::application(
            LambdaTerm::application(plus(), LambdaTerm::variable("a")),
            LambdaTerm::variable("b"),
        );
        let inner = LambdaTerm::abstraction("b", LambdaType::numeric(), body);
        let combined = LambdaTerm::abstraction("a", LambdaType::numeric(), inner);
        let wrapped =
            LambdaTerm::application(LambdaTerm::application(combined, num(2.0)), num(3.0));

        assert_eq!(stepwise.typecheck(), wrapped.typecheck());
        assert_eq!(
            stepwise.value().ret_value().unwrap(),
            wrapped.value().ret_value().unwrap()
        );
    }

    #[test]
    fn test_stuck_application_survives() {
        // an unresolved functor normalizes its argument and stays put
        let stuck = LambdaTerm::application(
            LambdaTerm::variable("f"),
            LambdaTerm::application(add3(), num(2.0)),
        );
        match stuck.value() {
            LambdaTerm::Application { functor, argument } => {
                assert!(matches!(*functor, LambdaTerm::Variable(_)));
                assert_eq!(argument.ret_value().unwrap(), Value::Num(5.0));
            }
            other => panic!("expected stuck application, got {other}"),
        }
    }

    #[test]
    fn test_higher_order_substitution_into_quantifier() {
        // ((lambda (P:e=>t) (exists (x:e) (P x))) Q42)
        let p_x = LambdaTerm::application(LambdaTerm::variable("P"), LambdaTerm::variable("x"));
        let ex = LambdaTerm::exists("x", LambdaType::entity(), p_x, false);
        let outer = LambdaTerm::abstraction(
            "P",
            LambdaType::function(&[LambdaType::entity()], &LambdaType::boolean()),
            ex,
        );
        let q42 = LambdaTerm::Constant(Constant::predicate("Q42", 1));
        let applied = LambdaTerm::application(outer, q42);

        assert!(applied.typecheck().is_boolean());
        let normal = applied.value();
        assert!(normal.is_closed(0));
        match &normal {
            LambdaTerm::Exists { body, .. } => match body.as_ref() {
                LambdaTerm::Constant(c) => {
                    assert_eq!(c.name(), Some("Q42"));
                    // the predicate slot was saturated by the quantified
                    // variable during normalization
                    assert_eq!(c.arity(), 0);
                    match &c.args()[0] {
                        LambdaTerm::Variable(v) => assert_eq!(v.db_index, 1),
                        other => panic!("expected variable, got {other}"),
                    }
                }
                other => panic!("expected predicate constant, got {other}"),
            },
            other => panic!("expected quantifier, got {other}"),
        }
    }

    #[test]
    fn test_local_constant_substitution_decrements_arity() {
        let mut pred = Constant::predicate("P31", 2);
        assert_eq!(pred.arity(), 2);
        pred.substitute(SLOT_NAME, &LambdaTerm::literal(Value::Entity("Q5".into())), 0);
        assert_eq!(pred.arity(), 1);
        // leftmost slot got bound
        match &pred.args()[0] {
            LambdaTerm::Constant(c) => assert!(matches!(c.kind(), ConstKind::Literal(_))),
            other => panic!("expected bound slot, got {other}"),
        }
        assert!(matches!(&pred.args()[1], LambdaTerm::Variable(_)));
    }

    #[test]
    fn test_closedness() {
        let applied = LambdaTerm::application(add3(), num(2.0)).value();
        assert!(applied.is_closed(0));

        assert!(!add3().is_closed(0));

        let dangling = LambdaTerm::Variable(Variable::bound("x", 3, LambdaType::entity()));
        assert!(!dangling.is_closed(0));
        assert!(dangling.is_closed(3));
    }

    #[test]
    fn test_typecheck_failure_propagates() {
        // (+ True) is ill-typed and yields the sentinel, not a panic
        let bad = LambdaTerm::application(plus(), LambdaTerm::literal(Value::Bool(true)));
        assert!(bad.typecheck().is_failure());

        let worse = LambdaTerm::application(bad, num(1.0));
        assert!(worse.typecheck().is_failure());
    }

    #[test]
    fn test_display_round_trips_structure() {
        assert_eq!(
            add3().to_string(),
            "(lambda (x:num) ((+(__x__-2,__x__-1) x-1) 3))"
        );
        let applied = LambdaTerm::application(add3(), num(2.0)).value();
        assert_eq!(applied.to_string(), "5");
        assert_eq!(AtomTag::Boolean.to_string(), "t");
    }
}
