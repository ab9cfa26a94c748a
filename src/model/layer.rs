//! Layer table entry

use crate::types::{Color, Handle};
use bitflags::bitflags;

bitflags! {
    /// Layer state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerFlags: u32 {
        /// Layer is frozen
        const FROZEN = 0x1;
        /// Layer is locked
        const LOCKED = 0x4;
        /// Layer is off (invisible)
        const OFF = 0x10;
    }
}

/// A layer table entry
///
/// Layers are the canonical referent in this crate: many entities reference
/// few layers, so per-layer state (locked, frozen, off) is the classic datum
/// worth caching per referent key.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique handle
    pub handle: Handle,
    /// Layer name
    pub name: String,
    /// Layer state flags
    pub flags: LayerFlags,
    /// Layer color
    pub color: Color,
    /// Line type name
    pub line_type: String,
    /// Is this layer plottable?
    pub is_plottable: bool,
}

impl Layer {
    /// Create a new layer with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Layer {
            handle: Handle::NULL,
            name: name.into(),
            flags: LayerFlags::empty(),
            color: Color::WHITE,
            line_type: "Continuous".to_string(),
            is_plottable: true,
        }
    }

    /// Create the standard "0" layer
    pub fn layer_0() -> Self {
        Self::new("0")
    }

    /// Create a layer with a specific color
    pub fn with_color(name: impl Into<String>, color: Color) -> Self {
        Layer {
            color,
            ..Self::new(name)
        }
    }

    /// Whether the layer is locked against editing
    pub fn is_locked(&self) -> bool {
        self.flags.contains(LayerFlags::FROZEN) || self.flags.contains(LayerFlags::LOCKED)
    }

    /// Whether the layer is frozen
    pub fn is_frozen(&self) -> bool {
        self.flags.contains(LayerFlags::FROZEN)
    }

    /// Whether the layer is invisible
    pub fn is_off(&self) -> bool {
        self.flags.contains(LayerFlags::OFF)
    }

    /// Whether entities on the layer are visible
    pub fn is_visible(&self) -> bool {
        !self.is_frozen() && !self.is_off()
    }

    /// Lock the layer
    pub fn lock(&mut self) -> &mut Self {
        self.flags |= LayerFlags::LOCKED;
        self
    }

    /// Freeze the layer
    pub fn freeze(&mut self) -> &mut Self {
        self.flags |= LayerFlags::FROZEN;
        self
    }

    /// Turn the layer off
    pub fn turn_off(&mut self) -> &mut Self {
        self.flags |= LayerFlags::OFF;
        self
    }
}
