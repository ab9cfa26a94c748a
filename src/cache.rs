//! Associative referent cache
//!
//! Maps a subject to a referent-derived value through an intermediate key,
//! memoizing the value once per distinct key. The true cost of evaluating a
//! predicate over many subjects usually lies in resolving a much smaller set
//! of distinct referents (many entities, few layers); this cache guarantees
//! each distinct key is resolved at most once while its entry remains valid.
//!
//! Entries never expire implicitly. They are created on first miss and
//! removed only through the `invalidate*` family.

use crate::error::{FilterError, Result};
use crate::event::{MapChange, MapChangeKind, ObserverSet};
use crate::store::{ReferentKey, Resolve};
use ahash::AHashMap;
use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Strip the module path off a type name for diagnostics
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

type ValueFn<R, V> = Box<dyn Fn(&R) -> Result<V>>;
type FallbackFn<S, V> = Box<dyn Fn(&S) -> Result<V>>;

/// Memoizes subject → key → value evaluation against an external store
///
/// * `S` — the subject under evaluation; never mutated, never owned.
/// * `K` — the referent key derived from each subject.
/// * `R` — the external referent resolved through the store.
/// * `V` — the datum cached per distinct key.
pub struct ReferentCache<S, K: ReferentKey, R, V: Clone> {
    key_fn: Rc<dyn Fn(&S) -> K>,
    value_fn: ValueFn<R, V>,
    store: Rc<dyn Resolve<K, R>>,
    entries: RefCell<AHashMap<K, V>>,
    observers: ObserverSet<K>,
    /// Overridable policy for subjects whose key is the null sentinel
    fallback: RefCell<Option<FallbackFn<S, V>>>,
    activated: Cell<bool>,
    activation_hook: RefCell<Option<Box<dyn Fn()>>>,
}

impl<S, K, R, V> ReferentCache<S, K, R, V>
where
    S: 'static,
    K: ReferentKey + 'static,
    R: 'static,
    V: Clone + 'static,
{
    /// Create a cache from a key extractor, a value extractor, and a store
    pub fn new(
        key_fn: impl Fn(&S) -> K + 'static,
        value_fn: impl Fn(&R) -> Result<V> + 'static,
        store: Rc<dyn Resolve<K, R>>,
    ) -> Self {
        Self::from_parts(Rc::new(key_fn), Box::new(value_fn), store)
    }

    pub(crate) fn from_parts(
        key_fn: Rc<dyn Fn(&S) -> K>,
        value_fn: ValueFn<R, V>,
        store: Rc<dyn Resolve<K, R>>,
    ) -> Self {
        ReferentCache {
            key_fn,
            value_fn,
            store,
            entries: RefCell::new(AHashMap::new()),
            observers: ObserverSet::new(),
            fallback: RefCell::new(None),
            activated: Cell::new(false),
            activation_hook: RefCell::new(None),
        }
    }

    /// Map a subject to its cached value, resolving the referent on miss
    ///
    /// The store is consulted at most once per distinct key while the entry
    /// remains valid. A null key routes to the missing-key fallback, or fails
    /// with [`FilterError::MissingKey`] when none is installed.
    pub fn evaluate(&self, subject: &S) -> Result<V> {
        if !self.activated.replace(true) {
            if let Some(hook) = self.activation_hook.borrow().as_ref() {
                hook();
            }
        }

        let key = (self.key_fn)(subject);
        if key.is_null() {
            return match self.fallback.borrow().as_ref() {
                Some(fallback) => fallback(subject),
                None => Err(FilterError::MissingKey(short_type_name::<R>())),
            };
        }

        if let Some(value) = self.entries.borrow().get(&key) {
            return Ok(value.clone());
        }

        let referent = self.store.resolve(&key)?;
        let value = (self.value_fn)(&referent)?;
        self.entries.borrow_mut().insert(key.clone(), value.clone());
        if self.observers.is_observed() {
            self.observers
                .emit(&MapChange::new(MapChangeKind::Added, Some(key)));
        }
        Ok(value)
    }

    /// Install a policy for subjects that produce the null key
    ///
    /// The fallback derives a substitute value from the subject itself; it is
    /// never cached, since there is no key to cache it under.
    pub fn set_missing_key_fallback(&self, fallback: impl Fn(&S) -> Result<V> + 'static) {
        *self.fallback.borrow_mut() = Some(Box::new(fallback));
    }

    /// Install a one-time diagnostics hook fired on the first `evaluate`
    pub fn set_activation_hook(&self, hook: impl Fn() + 'static) {
        *self.activation_hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Remove one entry; returns whether it was present
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed && self.observers.is_observed() {
            self.observers
                .emit(&MapChange::new(MapChangeKind::Removed, Some(key.clone())));
        }
        removed
    }

    /// Remove all entries
    pub fn invalidate_all(&self) {
        let had_entries = !self.entries.borrow().is_empty();
        self.entries.borrow_mut().clear();
        if had_entries && self.observers.is_observed() {
            self.observers
                .emit(&MapChange::new(MapChangeKind::Cleared, None));
        }
    }

    /// Remove all entries whose key matches; returns how many were removed
    ///
    /// At most one notification is delivered regardless of how many entries
    /// the predicate claimed.
    pub fn invalidate_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        let removed = before - entries.len();
        drop(entries);
        if removed > 0 && self.observers.is_observed() {
            self.observers
                .emit(&MapChange::new(MapChangeKind::Modified, None));
        }
        removed
    }

    /// Whether a value is cached for `key`; never triggers resolution
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Read a cached value without triggering resolution
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Attach a change observer; events fire only while observers exist
    pub fn subscribe(&self, observer: impl Fn(&MapChange<K>) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Whether any change observer is attached
    pub fn is_observed(&self) -> bool {
        self.observers.is_observed()
    }
}

impl<S, K: ReferentKey, R, V: Clone> fmt::Debug for ReferentCache<S, K, R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReferentCache<{} -> {}>({} entries)",
            short_type_name::<S>(),
            short_type_name::<R>(),
            self.entries.borrow().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Store over a fixed key→value table, counting resolutions
    struct CountingStore {
        resolutions: Cell<usize>,
    }

    impl Resolve<String, u32> for CountingStore {
        fn resolve(&self, key: &String) -> Result<u32> {
            self.resolutions.set(self.resolutions.get() + 1);
            match key.as_str() {
                "A" => Ok(10),
                "B" => Ok(20),
                _ => Err(FilterError::Custom(format!("no referent {}", key))),
            }
        }
    }

    fn counting_cache() -> (Rc<CountingStore>, ReferentCache<String, String, u32, u32>) {
        let store = Rc::new(CountingStore {
            resolutions: Cell::new(0),
        });
        let cache = ReferentCache::new(
            |s: &String| s.clone(),
            |r: &u32| Ok(r * 2),
            store.clone() as Rc<dyn Resolve<String, u32>>,
        );
        (store, cache)
    }

    #[test]
    fn test_memoization() {
        let (store, cache) = counting_cache();
        assert_eq!(cache.evaluate(&"A".to_string()).unwrap(), 20);
        assert_eq!(cache.evaluate(&"A".to_string()).unwrap(), 20);
        assert_eq!(cache.evaluate(&"B".to_string()).unwrap(), 40);
        assert_eq!(store.resolutions.get(), 2, "one resolution per distinct key");
    }

    #[test]
    fn test_null_key_without_fallback() {
        let (_, cache) = counting_cache();
        let err = cache.evaluate(&String::new()).unwrap_err();
        assert!(matches!(err, FilterError::MissingKey(_)));
    }

    #[test]
    fn test_null_key_fallback() {
        let (store, cache) = counting_cache();
        cache.set_missing_key_fallback(|_| Ok(99));
        assert_eq!(cache.evaluate(&String::new()).unwrap(), 99);
        assert_eq!(store.resolutions.get(), 0);
        assert!(cache.is_empty(), "fallback values are not cached");
    }

    #[test]
    fn test_invalidate_key() {
        let (store, cache) = counting_cache();
        cache.evaluate(&"A".to_string()).unwrap();
        assert!(cache.invalidate(&"A".to_string()));
        assert!(!cache.invalidate(&"A".to_string()));
        cache.evaluate(&"A".to_string()).unwrap();
        assert_eq!(store.resolutions.get(), 2);
    }

    #[test]
    fn test_invalidate_where() {
        let (_, cache) = counting_cache();
        cache.evaluate(&"A".to_string()).unwrap();
        cache.evaluate(&"B".to_string()).unwrap();
        let removed = cache.invalidate_where(|k| k == "A");
        assert_eq!(removed, 1);
        assert!(!cache.contains_key(&"A".to_string()));
        assert!(cache.contains_key(&"B".to_string()));
    }

    #[test]
    fn test_introspection_does_not_resolve() {
        let (store, cache) = counting_cache();
        assert!(!cache.contains_key(&"A".to_string()));
        assert!(cache.get(&"A".to_string()).is_none());
        assert_eq!(store.resolutions.get(), 0);
    }

    #[test]
    fn test_store_error_propagates() {
        let (_, cache) = counting_cache();
        assert!(cache.evaluate(&"Z".to_string()).is_err());
        assert!(cache.is_empty(), "failed resolutions are not cached");
    }

    #[test]
    fn test_activation_hook_fires_once() {
        let (_, cache) = counting_cache();
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        cache.set_activation_hook(move || sink.set(sink.get() + 1));
        cache.evaluate(&"A".to_string()).unwrap();
        cache.evaluate(&"B".to_string()).unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_change_events() {
        let (_, cache) = counting_cache();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        cache.subscribe(move |c| sink.borrow_mut().push(c.kind));

        cache.evaluate(&"A".to_string()).unwrap();
        cache.invalidate(&"A".to_string());
        cache.evaluate(&"A".to_string()).unwrap();
        cache.evaluate(&"B".to_string()).unwrap();
        cache.invalidate_where(|k| k == "B");
        cache.invalidate_all();

        let events = events.borrow();
        assert_eq!(
            *events,
            vec![
                MapChangeKind::Added,
                MapChangeKind::Removed,
                MapChangeKind::Added,
                MapChangeKind::Added,
                MapChangeKind::Modified,
                MapChangeKind::Cleared,
            ]
        );
    }

    #[test]
    fn test_clear_empty_cache_is_silent() {
        let (_, cache) = counting_cache();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        cache.subscribe(move |c| sink.borrow_mut().push(c.kind));
        cache.invalidate_all();
        assert!(events.borrow().is_empty());
    }
}
