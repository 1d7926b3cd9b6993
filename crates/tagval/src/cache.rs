//! Read-mostly snapshot cache.
//!
//! Readers load the current snapshot atomically and never take a lock.
//! Writers serialize on a mutex, copy the snapshot, insert and publish the
//! copy in one atomic store. Two writers racing on the same key both publish;
//! values are expected to be deterministic per key, so either one is fine.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

pub struct SnapshotCache<K, V> {
    snapshot: ArcSwap<HashMap<K, V>>,
    write: Mutex<()>,
}

impl<K, V> SnapshotCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
            write: Mutex::new(()),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.snapshot.load().get(key).cloned()
    }

    /// Publish a new snapshot containing every prior entry plus this one
    pub fn save(&self, key: K, value: V) {
        let _guard = self.write.lock();
        let current = self.snapshot.load_full();
        let mut next = HashMap::with_capacity(current.len() + 1);
        next.extend(current.iter().map(|(k, v)| (k.clone(), v.clone())));
        next.insert(key, value);
        self.snapshot.store(Arc::new(next));
    }

    /// Cached value for `key`, computing and saving it on a miss.
    ///
    /// `compute` runs outside the writer lock, so concurrent misses on the
    /// same key may compute it more than once.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, compute: F) -> V
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&Q) -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute(key);
        self.save(key.to_owned(), value.clone());
        value
    }

    /// Like [`get_or_insert_with`](Self::get_or_insert_with); failures are
    /// returned and not cached.
    pub fn get_or_try_insert_with<Q, F, E>(&self, key: &Q, compute: F) -> Result<V, E>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&Q) -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute(key)?;
        self.save(key.to_owned(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for SnapshotCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SnapshotCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("entries", &self.snapshot.load().len())
            .finish()
    }
}
