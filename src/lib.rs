//! # cadfilter
//!
//! A relational predicate-caching and expression-composition engine for CAD
//! object models.
//!
//! Evaluating a predicate over a large collection of subjects is often cheap
//! everywhere except one spot: resolving and inspecting the much smaller set
//! of distinct referents those subjects point at (many entities, few layers).
//! This crate memoizes per-referent results, merges predicate fragments into
//! a single compiled evaluator, and lets filters targeting different referent
//! kinds compose into one tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use cadfilter::model::{Drawing, Entity, EntityKind, Layer};
//! use cadfilter::{Expr, KeySelector, ObjectFilter};
//! use std::rc::Rc;
//!
//! let mut drawing = Drawing::new();
//! let mut locked = Layer::new("Locked");
//! locked.lock();
//! let locked = drawing.add_layer(locked)?;
//! let open = drawing.add_layer(Layer::new("Open"))?;
//! drawing.add_entity(Entity::new(EntityKind::Line).on_layer(locked));
//! drawing.add_entity(Entity::new(EntityKind::Circle).on_layer(open));
//! let drawing = Rc::new(drawing);
//!
//! // Match entities whose layer is editable; each layer resolves once.
//! let filter = ObjectFilter::new(
//!     Rc::clone(&drawing),
//!     KeySelector::new("entity.layer", |e: &Entity| e.layer),
//!     Expr::new(|layer: &Layer| !layer.is_locked()),
//! )?;
//!
//! let matches: Vec<bool> = drawing
//!     .entities()
//!     .iter()
//!     .map(|e| filter.is_match(e))
//!     .collect::<cadfilter::Result<_>>()?;
//! assert_eq!(matches, vec![false, true]);
//! # Ok::<(), cadfilter::FilterError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`Expr`] — boolean expression trees that merge structurally and compile
//!   to one short-circuiting closure
//! - [`Predicate`] — lazily-compiled, freezable predicate holder
//! - [`MemberFilter`] — key-set membership test with inversion
//! - [`ReferentCache`] — memoized subject → key → value evaluation
//! - [`ObjectFilter`] — composite filter node with deduped children
//! - [`FilteredView`] / [`WhereBy`] — lazy filtered views over sequences
//!
//! The engine is strictly single-threaded and synchronous; filters confine to
//! one logical thread for their lifetime.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod error;
pub mod event;
pub mod expr;
pub mod filter;
pub mod member;
pub mod model;
pub mod predicate;
pub mod query;
pub mod store;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use cache::ReferentCache;
pub use error::{FilterError, Result};
pub use event::{MapChange, MapChangeKind};
pub use expr::{BoolOp, Expr, PredicateFn};
pub use filter::{KeySelector, ObjectFilter};
pub use member::MemberFilter;
pub use predicate::Predicate;
pub use store::{ReferentKey, Resolve};
pub use types::{Color, Handle};
pub use view::{FilteredView, WhereBy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_drawing_creation() {
        let drawing = model::Drawing::new();
        assert_eq!(drawing.layer_count(), 1);
        assert!(drawing.layer("0").is_some());
    }
}
