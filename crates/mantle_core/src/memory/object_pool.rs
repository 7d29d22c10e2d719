//! # Object Pool
//!
//! Type-tag keyed reuse cache for shared objects.
//!
//! The pool never constructs anything. It only hands back objects that
//! were previously put into it, so reuse is always of a whole object.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ids::{Identified, ObjectId, TypeTag};

/// Shared-ownership handle to a pooled object.
///
/// The pool and any caller that checked the object out may hold handles at
/// the same time; the object is destroyed when the last one is dropped.
pub type PooledEntry<T> = Arc<T>;

/// Reuse cache of shared objects, one sequence per [`TypeTag`].
///
/// Retrieval is LIFO: the most recently returned object comes back first.
///
/// # Thread Safety
///
/// One lock per pool, held only while the map or a sequence is mutated.
///
/// # Example
///
/// ```rust,ignore
/// let pool: ObjectPool<Particle> = ObjectPool::new();
///
/// pool.put(tag, Arc::new(particle));
/// let reused = pool.take(tag); // Some(particle)
/// let empty = pool.take(tag);  // None
/// ```
pub struct ObjectPool<T: ?Sized> {
    /// Per-tag sequences, top of stack at the end.
    entries: Mutex<HashMap<TypeTag, Vec<PooledEntry<T>>>>,
    /// Optional cap per tag. `None` = unbounded.
    max_per_tag: Option<usize>,
}

impl<T: ?Sized> ObjectPool<T> {
    /// Creates an unbounded pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates a pool holding at most `max_per_tag` objects per tag.
    ///
    /// Objects put into a full sequence are dropped by the pool.
    #[must_use]
    pub fn with_limit(max_per_tag: Option<usize>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_per_tag,
        }
    }

    /// Returns the configured per-tag cap.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.max_per_tag
    }

    /// Removes and returns the most recently pooled object for `tag`.
    ///
    /// Returns `None` if the tag is unknown or its sequence is empty.
    pub fn take(&self, tag: TypeTag) -> Option<PooledEntry<T>> {
        self.entries.lock().get_mut(&tag)?.pop()
    }

    /// Returns the most recently pooled object for `tag` without removing it.
    #[must_use]
    pub fn peek(&self, tag: TypeTag) -> Option<PooledEntry<T>> {
        self.entries.lock().get(&tag)?.last().cloned()
    }

    /// Appends `object` to the tag's sequence, sharing ownership of it.
    pub fn put(&self, tag: TypeTag, object: PooledEntry<T>) {
        let rejected = {
            let mut entries = self.entries.lock();
            let sequence = entries.entry(tag).or_default();
            if self.max_per_tag.is_some_and(|max| sequence.len() >= max) {
                Some(object)
            } else {
                sequence.push(object);
                None
            }
        };

        // Dropped outside the lock: the last share may run arbitrary Drop code
        if rejected.is_some() {
            tracing::debug!("pool for {} is full, dropping returned object", tag);
        }
    }

    /// Drops the whole sequence for `tag`.
    ///
    /// Objects still held elsewhere survive; the rest are destroyed.
    pub fn clear(&self, tag: TypeTag) {
        let removed = self.entries.lock().remove(&tag);
        if let Some(sequence) = removed {
            tracing::debug!("cleared {} pooled objects for {}", sequence.len(), tag);
        }
    }

    /// Drops every sequence.
    pub fn clear_all(&self) {
        let removed = std::mem::take(&mut *self.entries.lock());
        drop(removed);
    }

    /// Returns the number of pooled objects for `tag`.
    #[must_use]
    pub fn len(&self, tag: TypeTag) -> usize {
        self.entries.lock().get(&tag).map_or(0, Vec::len)
    }

    /// Checks if no object is pooled for `tag`.
    #[must_use]
    pub fn is_empty(&self, tag: TypeTag) -> bool {
        self.len(tag) == 0
    }

    /// Returns the number of pooled objects across all tags.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }
}

impl<T: ?Sized + Identified> ObjectPool<T> {
    /// Removes and returns the pooled object of `tag` whose id is `id`.
    ///
    /// Linear scan; the hole is filled by swapping in the last element, so
    /// the remaining order changes.
    pub fn take_by_id(&self, tag: TypeTag, id: ObjectId) -> Option<PooledEntry<T>> {
        let mut entries = self.entries.lock();
        let sequence = entries.get_mut(&tag)?;
        let index = sequence.iter().position(|entry| entry.object_id() == id)?;
        Some(sequence.swap_remove(index))
    }

    /// Returns the pooled object of `tag` whose id is `id`, leaving it pooled.
    #[must_use]
    pub fn peek_by_id(&self, tag: TypeTag, id: ObjectId) -> Option<PooledEntry<T>> {
        self.entries
            .lock()
            .get(&tag)?
            .iter()
            .find(|entry| entry.object_id() == id)
            .cloned()
    }
}

impl<T: ?Sized> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        let mut map = f.debug_map();
        for (tag, sequence) in entries.iter() {
            map.entry(tag, &sequence.len());
        }
        map.finish()
    }
}
