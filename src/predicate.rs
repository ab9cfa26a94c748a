//! Lazily-compiled predicate holder
//!
//! A [`Predicate`] owns one boolean [`Expr`] plus a cached compiled form of
//! it. Combining further fragments rewrites the expression tree and discards
//! the compiled closure, which is rebuilt on the next demand. Filter nodes
//! freeze their predicates on first evaluation; a frozen predicate rejects
//! all further structural mutation.

use crate::error::{FilterError, Result};
use crate::expr::{BoolOp, Expr, PredicateFn};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::rc::Rc;

/// Holds a boolean expression and its lazily-compiled executable form
pub struct Predicate<S> {
    expr: Option<Expr<S>>,
    compiled: OnceCell<PredicateFn<S>>,
    frozen: Cell<bool>,
}

impl<S: 'static> Predicate<S> {
    /// Create a predicate from a base expression
    pub fn new(expr: Expr<S>) -> Self {
        Predicate {
            expr: Some(expr),
            compiled: OnceCell::new(),
            frozen: Cell::new(false),
        }
    }

    /// Create a predicate from an infallible test function
    pub fn from_fn(test: impl Fn(&S) -> bool + 'static) -> Self {
        Self::new(Expr::new(test))
    }

    /// The current expression tree
    pub fn expr(&self) -> Option<&Expr<S>> {
        self.expr.as_ref()
    }

    /// Rewrite the held expression as `current ∘ fragment` and invalidate
    /// the compiled form
    pub fn combine(&mut self, op: BoolOp, fragment: Expr<S>) -> Result<()> {
        if self.frozen.get() {
            return Err(FilterError::FrozenState("combine"));
        }
        self.expr = Some(match self.expr.take() {
            Some(current) => current.combine(op, fragment),
            None => fragment,
        });
        self.compiled.take();
        Ok(())
    }

    /// Shorthand for [`Predicate::combine`] with [`BoolOp::And`]
    pub fn and(&mut self, fragment: Expr<S>) -> Result<()> {
        self.combine(BoolOp::And, fragment)
    }

    /// Shorthand for [`Predicate::combine`] with [`BoolOp::Or`]
    pub fn or(&mut self, fragment: Expr<S>) -> Result<()> {
        self.combine(BoolOp::Or, fragment)
    }

    /// The compiled, cached executable function
    ///
    /// Compiled once per expression snapshot; recompiled lazily after any
    /// [`Predicate::combine`].
    pub fn compiled(&self) -> PredicateFn<S> {
        Rc::clone(self.compiled.get_or_init(|| match self.expr.as_ref() {
            Some(expr) => expr.compile(),
            None => Rc::new(|_| Err(FilterError::InvalidArgument("predicate has no expression"))),
        }))
    }

    /// Evaluate the compiled predicate against a subject
    pub fn eval(&self, subject: &S) -> Result<bool> {
        (self.compiled())(subject)
    }

    /// Permanently disallow structural mutation
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    /// Whether the predicate has been frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Diagnostic rendering of the held expression
    pub fn describe(&self) -> String {
        match self.expr.as_ref() {
            Some(expr) => expr.describe(),
            None => "<empty>".to_string(),
        }
    }
}
