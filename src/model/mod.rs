//! Reference object model
//!
//! A minimal in-memory stand-in for a host CAD database: enough structure to
//! exercise the filtering engine end to end without any file I/O. The engine
//! itself never depends on these types beyond the [`crate::Resolve`] seam.

pub mod drawing;
pub mod entity;
pub mod layer;
pub mod linetype;

pub use drawing::Drawing;
pub use entity::{Entity, EntityKind};
pub use layer::{Layer, LayerFlags};
pub use linetype::LineType;
