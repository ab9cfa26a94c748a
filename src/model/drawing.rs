//! In-memory drawing database
//!
//! The reference store implementation: named tables for layers and line
//! types, a handle index over both, and a flat entity list. A [`Drawing`]
//! implements [`Resolve`] for each referent kind it stores, which is all the
//! filtering engine needs from a host object model.

use crate::error::{FilterError, Result};
use crate::model::{Entity, Layer, LineType};
use crate::store::Resolve;
use crate::types::Handle;
use ahash::AHashMap;
use indexmap::IndexMap;

/// What a handle points at inside the drawing
#[derive(Debug, Clone)]
enum ObjectSlot {
    /// A layer table entry, indexed by its table key
    Layer(String),
    /// A line type table entry, indexed by its table key
    LineType(String),
}

impl ObjectSlot {
    fn type_name(&self) -> &'static str {
        match self {
            ObjectSlot::Layer(_) => "Layer",
            ObjectSlot::LineType(_) => "LineType",
        }
    }
}

/// An in-memory drawing database
#[derive(Debug, Default)]
pub struct Drawing {
    /// Layers stored by name (case-insensitive)
    layers: IndexMap<String, Layer>,
    /// Line types stored by name (case-insensitive)
    line_types: IndexMap<String, LineType>,
    /// Handle index over all table entries
    by_handle: AHashMap<Handle, ObjectSlot>,
    /// Entities in insertion order
    entities: Vec<Entity>,
    /// Next handle to hand out
    next_handle: u64,
}

impl Drawing {
    /// Create an empty drawing with the standard "0" layer and "Continuous"
    /// line type
    pub fn new() -> Self {
        let mut drawing = Drawing {
            layers: IndexMap::new(),
            line_types: IndexMap::new(),
            by_handle: AHashMap::new(),
            entities: Vec::new(),
            next_handle: 0x10,
        };
        // Seeding cannot collide in an empty drawing
        let _ = drawing.add_layer(Layer::layer_0());
        let _ = drawing.add_line_type(LineType::continuous());
        drawing
    }

    fn take_handle(&mut self) -> Handle {
        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Add a layer; assigns a handle when the entry carries none
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<Handle> {
        let key = layer.name.to_uppercase();
        if self.layers.contains_key(&key) {
            return Err(FilterError::Custom(format!(
                "layer '{}' already exists",
                layer.name
            )));
        }
        if layer.handle.is_null() {
            layer.handle = self.take_handle();
        }
        let handle = layer.handle;
        self.by_handle.insert(handle, ObjectSlot::Layer(key.clone()));
        self.layers.insert(key, layer);
        Ok(handle)
    }

    /// Add a line type; assigns a handle when the entry carries none
    pub fn add_line_type(&mut self, mut line_type: LineType) -> Result<Handle> {
        let key = line_type.name.to_uppercase();
        if self.line_types.contains_key(&key) {
            return Err(FilterError::Custom(format!(
                "line type '{}' already exists",
                line_type.name
            )));
        }
        if line_type.handle.is_null() {
            line_type.handle = self.take_handle();
        }
        let handle = line_type.handle;
        self.by_handle
            .insert(handle, ObjectSlot::LineType(key.clone()));
        self.line_types.insert(key, line_type);
        Ok(handle)
    }

    /// Add an entity, assigning it a handle
    pub fn add_entity(&mut self, mut entity: Entity) -> Handle {
        if entity.handle.is_null() {
            entity.handle = self.take_handle();
        }
        let handle = entity.handle;
        self.entities.push(entity);
        handle
    }

    /// Get a layer by name (case-insensitive)
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(&name.to_uppercase())
    }

    /// Get a mutable layer by name (case-insensitive)
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(&name.to_uppercase())
    }

    /// Get a line type by name (case-insensitive)
    pub fn line_type(&self, name: &str) -> Option<&LineType> {
        self.line_types.get(&name.to_uppercase())
    }

    /// All layers in table order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// All entities in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn slot(&self, handle: &Handle) -> Result<&ObjectSlot> {
        self.by_handle
            .get(handle)
            .ok_or(FilterError::NotFound(*handle))
    }
}

impl Resolve<Handle, Layer> for Drawing {
    fn resolve(&self, key: &Handle) -> Result<Layer> {
        match self.slot(key)? {
            ObjectSlot::Layer(name) => match self.layers.get(name) {
                Some(layer) => Ok(layer.clone()),
                None => Err(FilterError::NotFound(*key)),
            },
            other => Err(FilterError::TypeMismatch {
                expected: "Layer",
                actual: other.type_name(),
            }),
        }
    }
}

impl Resolve<Handle, LineType> for Drawing {
    fn resolve(&self, key: &Handle) -> Result<LineType> {
        match self.slot(key)? {
            ObjectSlot::LineType(name) => match self.line_types.get(name) {
                Some(line_type) => Ok(line_type.clone()),
                None => Err(FilterError::NotFound(*key)),
            },
            other => Err(FilterError::TypeMismatch {
                expected: "LineType",
                actual: other.type_name(),
            }),
        }
    }
}
