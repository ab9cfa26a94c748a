//! Collaborator contracts for referent resolution
//!
//! The engine never opens referents itself. It derives a [`ReferentKey`] from
//! each subject and hands it to a [`Resolve`] implementation — typically a
//! drawing database or transaction wrapper — which performs the actual,
//! possibly expensive, lookup.

use crate::error::Result;
use crate::types::Handle;
use std::hash::Hash;

/// An opaque, comparable, stable identifier naming a referent
///
/// Two subjects producing equal keys are guaranteed to share the same cached
/// value. A distinguished null value signals "no referent available" and
/// routes evaluation to the cache's missing-key policy.
pub trait ReferentKey: Eq + Hash + Clone {
    /// Whether this key is the "no referent available" sentinel
    fn is_null(&self) -> bool;
}

impl ReferentKey for Handle {
    fn is_null(&self) -> bool {
        Handle::is_null(self)
    }
}

impl ReferentKey for String {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Eq + Hash + Clone> ReferentKey for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

/// Resolves a referent of type `R` from a key — "open for read"
///
/// Implementations fail with [`crate::FilterError::NotFound`] when no object
/// carries the key and [`crate::FilterError::TypeMismatch`] when the resolved
/// object has an unexpected shape. The engine propagates both unchanged.
pub trait Resolve<K, R> {
    /// Resolve the referent named by `key`
    fn resolve(&self, key: &K) -> Result<R>;
}
