//! Key-set membership filter
//!
//! A [`MemberFilter`] matches a subject when a key derived from it belongs to
//! a configured set. The membership test is invertible, and an empty set
//! yields a fixed configurable default rather than undefined behavior.

use crate::error::{FilterError, Result};
use crate::expr::{Expr, PredicateFn};
use ahash::AHashSet;
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

/// Tests set membership of a key derived from each subject
///
/// Match dispatch depends on the number of keys: zero keys always yield the
/// empty-set default (inversion is not applied), one key is a direct equality
/// test, two or more keys use a hashed set.
pub struct MemberFilter<S, K> {
    selector: Rc<dyn Fn(&S) -> K>,
    keys: Vec<K>,
    inverted: bool,
    empty_default: bool,
    compiled: OnceCell<PredicateFn<S>>,
    frozen: Cell<bool>,
}

impl<S: 'static, K: Eq + Hash + Clone + 'static> MemberFilter<S, K> {
    /// Create a filter over an initial set of keys (0, 1, or many)
    pub fn new(selector: impl Fn(&S) -> K + 'static, keys: impl IntoIterator<Item = K>) -> Self {
        let mut deduped: Vec<K> = Vec::new();
        for key in keys {
            if !deduped.contains(&key) {
                deduped.push(key);
            }
        }
        MemberFilter {
            selector: Rc::new(selector),
            keys: deduped,
            inverted: false,
            empty_default: false,
            compiled: OnceCell::new(),
            frozen: Cell::new(false),
        }
    }

    /// Create a filter matching a single key
    pub fn single(selector: impl Fn(&S) -> K + 'static, key: K) -> Self {
        Self::new(selector, [key])
    }

    /// Add a key to the set; a duplicate is a no-op
    pub fn add(&mut self, key: K) -> Result<()> {
        self.ensure_unfrozen("add")?;
        if !self.keys.contains(&key) {
            self.keys.push(key);
            self.compiled.take();
        }
        Ok(())
    }

    /// Remove a key from the set; returns whether it was present
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        self.ensure_unfrozen("remove")?;
        match self.keys.iter().position(|k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                self.compiled.take();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether the membership result is logically negated
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Negate (or un-negate) the membership test
    ///
    /// Inversion applies only while the set is non-empty; an empty set always
    /// yields the empty-set default.
    pub fn set_inverted(&mut self, inverted: bool) -> Result<()> {
        self.ensure_unfrozen("set_inverted")?;
        if self.inverted != inverted {
            self.inverted = inverted;
            self.compiled.take();
        }
        Ok(())
    }

    /// The result returned while the key set is empty
    pub fn empty_default(&self) -> bool {
        self.empty_default
    }

    /// Set the result returned while the key set is empty
    pub fn set_empty_default(&mut self, default: bool) -> Result<()> {
        self.ensure_unfrozen("set_empty_default")?;
        if self.empty_default != default {
            self.empty_default = default;
            self.compiled.take();
        }
        Ok(())
    }

    /// Number of keys in the set
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the key set is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The compiled membership test for the current key set
    pub fn predicate(&self) -> PredicateFn<S> {
        Rc::clone(self.compiled.get_or_init(|| self.compile_snapshot()))
    }

    /// Test a subject against the current key set
    pub fn is_match(&self, subject: &S) -> bool {
        (self.predicate())(subject).unwrap_or(self.empty_default)
    }

    /// Snapshot the current membership test as an expression leaf
    ///
    /// The leaf captures the key set as of this call; later `add`/`remove`
    /// calls do not flow into expressions already handed out.
    pub fn to_expr(&self) -> Expr<S> {
        let label = format!("member-set[{}]", self.keys.len());
        let test = self.compile_snapshot();
        Expr::fallible(label, move |s| test(s))
    }

    /// Permanently disallow mutation of the key set
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    /// Whether the filter has been frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    fn ensure_unfrozen(&self, context: &'static str) -> Result<()> {
        if self.frozen.get() {
            return Err(FilterError::FrozenState(context));
        }
        Ok(())
    }

    fn compile_snapshot(&self) -> PredicateFn<S> {
        let selector = Rc::clone(&self.selector);
        let inverted = self.inverted;
        match self.keys.len() {
            0 => {
                let default = self.empty_default;
                Rc::new(move |_| Ok(default))
            }
            1 => {
                // Direct equality, no hashing machinery
                let key = self.keys[0].clone();
                Rc::new(move |s| Ok((selector(s) == key) != inverted))
            }
            _ => {
                let set: AHashSet<K> = self.keys.iter().cloned().collect();
                Rc::new(move |s| Ok(set.contains(&selector(s)) != inverted))
            }
        }
    }
}
