//! Cache change notification system
//!
//! Observers can subscribe to a referent cache to hear about entries being
//! added, removed, or cleared. Events are constructed and delivered only
//! while at least one subscriber is attached; unobserved caches pay nothing.

use std::cell::RefCell;
use std::fmt;

/// Kind of change applied to a referent cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapChangeKind {
    /// An entry was created on a cache miss
    Added,
    /// A single entry was explicitly invalidated
    Removed,
    /// A bulk predicate invalidation removed one or more entries
    Modified,
    /// The whole cache was cleared
    Cleared,
}

impl fmt::Display for MapChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Removed => write!(f, "Removed"),
            Self::Modified => write!(f, "Modified"),
            Self::Cleared => write!(f, "Cleared"),
        }
    }
}

/// A single cache change event
#[derive(Debug, Clone)]
pub struct MapChange<K> {
    /// What happened
    pub kind: MapChangeKind,
    /// The affected key; `None` for bulk changes
    pub key: Option<K>,
}

impl<K> MapChange<K> {
    /// Create a new change event
    pub fn new(kind: MapChangeKind, key: Option<K>) -> Self {
        Self { kind, key }
    }
}

impl<K: fmt::Display> fmt::Display for MapChange<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{}] key {}", self.kind, key),
            None => write!(f, "[{}]", self.kind),
        }
    }
}

/// Registry of cache change observers
pub struct ObserverSet<K> {
    observers: RefCell<Vec<Box<dyn Fn(&MapChange<K>)>>>,
}

impl<K> ObserverSet<K> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Attach an observer
    pub fn subscribe(&self, observer: impl Fn(&MapChange<K>) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    /// Whether any observer is attached
    pub fn is_observed(&self) -> bool {
        !self.observers.borrow().is_empty()
    }

    /// Deliver an event to every attached observer
    pub fn emit(&self, change: &MapChange<K>) {
        for observer in self.observers.borrow().iter() {
            observer(change);
        }
    }

    /// Number of attached observers
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }
}

impl<K> fmt::Debug for ObserverSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverSet({} observers)", self.len())
    }
}
