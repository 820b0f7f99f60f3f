//! A table of stores shared between readers.
//!
//! Hand the same [`SharedCache`] to every reader that should see the same
//! entities: the first reader to ask for a name creates its store, every later
//! one reuses it, and the store's own read cache makes repeated `once` reads
//! free. The cache is an ordinary value; it lives as long as whoever built the
//! readers keeps a handle to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::store::EntityStore;

/// A store that several readers may hold at once.
pub type SharedStore = Arc<Mutex<EntityStore>>;

#[derive(Clone, Default)]
pub struct SharedCache {
    stores: Arc<Mutex<HashMap<String, SharedStore>>>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store registered for `name`, creating and registering it with
    /// `create` if there is none. Lookup and registration happen under one
    /// lock, so concurrent callers always end up with the same store.
    pub fn get_or_create(&self, name: &str, create: impl FnOnce() -> EntityStore) -> SharedStore {
        let mut stores = lock(&self.stores);
        if let Some(store) = stores.get(name) {
            return Arc::clone(store);
        }
        debug!("Creating shared store for {name}");
        let store = Arc::new(Mutex::new(create()));
        stores.insert(name.to_string(), Arc::clone(&store));
        store
    }

    pub fn get(&self, name: &str) -> Option<SharedStore> {
        lock(&self.stores).get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.stores).contains_key(name)
    }

    pub fn len(&self) -> usize {
        lock(&self.stores).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.stores).is_empty()
    }

    /// Registered entity names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.stores).keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("names", &self.names())
            .finish()
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
