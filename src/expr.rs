//! Boolean expression trees over a subject type
//!
//! An [`Expr`] is the composable representation behind every filter in this
//! crate. Combining two expressions merges their tree structure (`And`/`Or`
//! nodes over the original leaves) instead of nesting opaque function calls,
//! so a filter assembled from many fragments still compiles down to a single
//! short-circuiting closure.

use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// Logical operator used when combining expression fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    /// Both sides must match
    And,
    /// Either side may match
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
        }
    }
}

/// The single executable function produced by compiling an expression tree
pub type PredicateFn<S> = Rc<dyn Fn(&S) -> Result<bool>>;

/// A composable boolean expression over subjects of type `S`
pub enum Expr<S> {
    /// A terminal test function
    Leaf {
        /// Short description used by diagnostic dumps
        label: String,
        /// The test itself
        test: PredicateFn<S>,
    },
    /// Logical conjunction of two subtrees
    And(Box<Expr<S>>, Box<Expr<S>>),
    /// Logical disjunction of two subtrees
    Or(Box<Expr<S>>, Box<Expr<S>>),
    /// Logical negation of a subtree
    Not(Box<Expr<S>>),
}

impl<S: 'static> Expr<S> {
    /// Create a leaf from an infallible test function
    pub fn new(test: impl Fn(&S) -> bool + 'static) -> Self {
        Self::named("fn", test)
    }

    /// Create a labelled leaf from an infallible test function
    pub fn named(label: impl Into<String>, test: impl Fn(&S) -> bool + 'static) -> Self {
        Expr::Leaf {
            label: label.into(),
            test: Rc::new(move |s| Ok(test(s))),
        }
    }

    /// Create a leaf from a test that may fail (e.g., one that resolves
    /// referents through a store)
    pub fn fallible(label: impl Into<String>, test: impl Fn(&S) -> Result<bool> + 'static) -> Self {
        Expr::Leaf {
            label: label.into(),
            test: Rc::new(test),
        }
    }

    /// Rewrite this expression as `self ∘ other` under the given operator
    pub fn combine(self, op: BoolOp, other: Expr<S>) -> Self {
        match op {
            BoolOp::And => Expr::And(Box::new(self), Box::new(other)),
            BoolOp::Or => Expr::Or(Box::new(self), Box::new(other)),
        }
    }

    /// Shorthand for [`Expr::combine`] with [`BoolOp::And`]
    pub fn and(self, other: Expr<S>) -> Self {
        self.combine(BoolOp::And, other)
    }

    /// Shorthand for [`Expr::combine`] with [`BoolOp::Or`]
    pub fn or(self, other: Expr<S>) -> Self {
        self.combine(BoolOp::Or, other)
    }

    /// Wrap this expression in a logical negation
    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Produce one short-circuiting closure for the whole tree
    ///
    /// The returned function is self-contained; subsequent mutation of the
    /// source tree does not affect it. Callers that need invalidation
    /// semantics hold the tree and recompile (see [`crate::Predicate`]).
    pub fn compile(&self) -> PredicateFn<S> {
        match self {
            Expr::Leaf { test, .. } => Rc::clone(test),
            Expr::And(lhs, rhs) => {
                let lhs = lhs.compile();
                let rhs = rhs.compile();
                Rc::new(move |s| Ok(lhs(s)? && rhs(s)?))
            }
            Expr::Or(lhs, rhs) => {
                let lhs = lhs.compile();
                let rhs = rhs.compile();
                Rc::new(move |s| Ok(lhs(s)? || rhs(s)?))
            }
            Expr::Not(inner) => {
                let inner = inner.compile();
                Rc::new(move |s| Ok(!inner(s)?))
            }
        }
    }

    /// Render the tree shape for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Expr::Leaf { label, .. } => label.clone(),
            Expr::And(lhs, rhs) => format!("({} AND {})", lhs.describe(), rhs.describe()),
            Expr::Or(lhs, rhs) => format!("({} OR {})", lhs.describe(), rhs.describe()),
            Expr::Not(inner) => format!("NOT {}", inner.describe()),
        }
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Expr::Leaf { .. } => 1,
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => lhs.leaf_count() + rhs.leaf_count(),
            Expr::Not(inner) => inner.leaf_count(),
        }
    }
}

impl<S> Clone for Expr<S> {
    fn clone(&self) -> Self {
        match self {
            Expr::Leaf { label, test } => Expr::Leaf {
                label: label.clone(),
                test: Rc::clone(test),
            },
            Expr::And(lhs, rhs) => Expr::And(lhs.clone(), rhs.clone()),
            Expr::Or(lhs, rhs) => Expr::Or(lhs.clone(), rhs.clone()),
            Expr::Not(inner) => Expr::Not(inner.clone()),
        }
    }
}

impl<S> fmt::Debug for Expr<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf { label, .. } => write!(f, "Leaf({})", label),
            Expr::And(lhs, rhs) => write!(f, "({:?} AND {:?})", lhs, rhs),
            Expr::Or(lhs, rhs) => write!(f, "({:?} OR {:?})", lhs, rhs),
            Expr::Not(inner) => write!(f, "NOT {:?}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_evaluation() {
        let even = Expr::new(|n: &i32| n % 2 == 0);
        let f = even.compile();
        assert!(f(&4).unwrap());
        assert!(!f(&3).unwrap());
    }

    #[test]
    fn test_structural_combination() {
        let even = Expr::named("even", |n: &i32| n % 2 == 0);
        let small = Expr::named("small", |n: &i32| *n < 10);
        let expr = even.and(small.or(Expr::named("neg", |n: &i32| *n < 0)));

        assert_eq!(expr.describe(), "(even AND (small OR neg))");
        assert_eq!(expr.leaf_count(), 3);

        let f = expr.compile();
        assert!(f(&4).unwrap());
        assert!(f(&-2).unwrap());
        assert!(!f(&12).unwrap());
        assert!(!f(&5).unwrap());
    }

    #[test]
    fn test_negation() {
        let expr = Expr::new(|n: &i32| *n > 0).negate();
        let f = expr.compile();
        assert!(f(&-1).unwrap());
        assert!(!f(&1).unwrap());
    }

    #[test]
    fn test_short_circuit() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0u32));
        let calls2 = Rc::clone(&calls);
        let lhs = Expr::new(|n: &i32| *n > 0);
        let rhs = Expr::new(move |_: &i32| {
            calls2.set(calls2.get() + 1);
            true
        });

        let f = lhs.and(rhs).compile();
        assert!(!f(&-1).unwrap());
        assert_eq!(calls.get(), 0, "rhs must not run when lhs is false");
        assert!(f(&1).unwrap());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fallible_leaf_propagates() {
        let expr = Expr::fallible("failing", |_: &i32| Err("store unavailable".into()));
        let f = expr.compile();
        assert!(f(&1).is_err());
    }
}
