//! Drawing entity record
//!
//! The filtering engine treats entities as opaque subjects; all it needs are
//! the referent keys they carry. This record keeps exactly that: a handle,
//! a kind tag, and the handles of the layer and line type it references.

use crate::types::{Color, Handle};
use std::fmt;

/// Kind of drawing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Point,
    Line,
    Circle,
    Arc,
    Polyline,
    Text,
    Insert,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "POINT"),
            Self::Line => write!(f, "LINE"),
            Self::Circle => write!(f, "CIRCLE"),
            Self::Arc => write!(f, "ARC"),
            Self::Polyline => write!(f, "POLYLINE"),
            Self::Text => write!(f, "TEXT"),
            Self::Insert => write!(f, "INSERT"),
        }
    }
}

/// A drawing entity — the subject type of the reference model
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique handle
    pub handle: Handle,
    /// Entity kind
    pub kind: EntityKind,
    /// Handle of the owning layer
    pub layer: Handle,
    /// Handle of the referenced line type; NULL means "by layer"
    pub line_type: Handle,
    /// Entity color
    pub color: Color,
}

impl Entity {
    /// Create an entity of the given kind, unplaced on any layer
    pub fn new(kind: EntityKind) -> Self {
        Entity {
            handle: Handle::NULL,
            kind,
            layer: Handle::NULL,
            line_type: Handle::NULL,
            color: Color::ByLayer,
        }
    }

    /// Place the entity on a layer
    pub fn on_layer(mut self, layer: Handle) -> Self {
        self.layer = layer;
        self
    }

    /// Reference an explicit line type instead of "by layer"
    pub fn with_line_type(mut self, line_type: Handle) -> Self {
        self.line_type = line_type;
        self
    }

    /// Override the entity color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Whether the entity takes its line type from its layer
    pub fn line_type_by_layer(&self) -> bool {
        self.line_type.is_null()
    }
}
