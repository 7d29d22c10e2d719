//! # Identifier Pool
//!
//! Per-tag recycling allocator for [`ObjectId`]s.
//!
//! Each tag owns a table indexed by id holding an in-use flag. Allocation is
//! first-fit: the lowest free id is handed out, and only when none is free
//! does the table grow by one. Tables never shrink; releasing only flips the
//! flag back.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::types::{ObjectId, TypeTag};
use crate::error::{MantleError, MantleResult};

/// Recycling allocator of small object ids, one table per [`TypeTag`].
///
/// # Thread Safety
///
/// All operations are serialized behind one lock per pool.
/// The lock is never held across caller code.
///
/// # Example
///
/// ```rust,ignore
/// let pool = IdentifierPool::new();
/// let tag = TypeTag::new(1);
///
/// let a = pool.allocate(tag); // #0
/// let b = pool.allocate(tag); // #1
/// pool.release(tag, a);
/// assert_eq!(pool.allocate(tag), a); // lowest free id wins
/// ```
#[derive(Debug, Default)]
pub struct IdentifierPool {
    /// Per-tag table: index = id, value = in use.
    tables: Mutex<HashMap<TypeTag, Vec<bool>>>,
}

impl IdentifierPool {
    /// Creates an empty pool. Tables are created lazily per tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the smallest free id for `tag`.
    ///
    /// Never panics. If the tag's id space is exhausted this returns
    /// [`ObjectId::INVALID`]; use [`IdentifierPool::try_allocate`] to get an
    /// error instead.
    pub fn allocate(&self, tag: TypeTag) -> ObjectId {
        match self.try_allocate(tag) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("{}", err);
                ObjectId::INVALID
            }
        }
    }

    /// Allocates the smallest free id for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`MantleError::IdsExhausted`] when every id below
    /// [`ObjectId::INVALID`] is held.
    pub fn try_allocate(&self, tag: TypeTag) -> MantleResult<ObjectId> {
        let mut tables = self.tables.lock();
        let table = tables.entry(tag).or_default();

        // First fit: reuse the lowest released id
        if let Some(index) = table.iter().position(|in_use| !in_use) {
            table[index] = true;
            return Ok(ObjectId::new(
                u16::try_from(index).map_err(|_| MantleError::IdsExhausted { tag })?,
            ));
        }

        let id = u16::try_from(table.len())
            .ok()
            .filter(|raw| *raw < ObjectId::INVALID.raw())
            .map(ObjectId::new)
            .ok_or(MantleError::IdsExhausted { tag })?;

        table.push(true);
        Ok(id)
    }

    /// Marks `id` free for reuse.
    ///
    /// Releasing an id that is not currently allocated is a caller bug; it
    /// is tolerated and logged, never validated further.
    pub fn release(&self, tag: TypeTag, id: ObjectId) {
        let mut tables = self.tables.lock();
        match tables.get_mut(&tag).and_then(|table| table.get_mut(id.index())) {
            Some(slot) if *slot => *slot = false,
            Some(_) => tracing::warn!("release of free id {} for {}", id, tag),
            None => tracing::warn!("release of unknown id {} for {}", id, tag),
        }
    }

    /// Checks if `id` is currently held for `tag`.
    #[must_use]
    pub fn is_allocated(&self, tag: TypeTag, id: ObjectId) -> bool {
        self.tables
            .lock()
            .get(&tag)
            .and_then(|table| table.get(id.index()).copied())
            .unwrap_or(false)
    }

    /// Returns the number of ids currently held for `tag`.
    #[must_use]
    pub fn in_use(&self, tag: TypeTag) -> usize {
        self.tables
            .lock()
            .get(&tag)
            .map_or(0, |table| table.iter().filter(|in_use| **in_use).count())
    }

    /// Returns the size of the tag's table (held + free ids).
    ///
    /// This only ever grows.
    #[must_use]
    pub fn capacity(&self, tag: TypeTag) -> usize {
        self.tables.lock().get(&tag).map_or(0, Vec::len)
    }
}
