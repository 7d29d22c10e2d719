//! # Identifier Lease
//!
//! Pairs one allocation with exactly one release: the id goes back to its
//! pool when the lease is dropped.

use std::fmt;
use std::sync::Arc;

use super::pool::IdentifierPool;
use super::types::{ObjectId, TypeTag};
use crate::error::MantleResult;

/// An [`ObjectId`] exclusively held until drop.
pub struct IdLease {
    pool: Arc<IdentifierPool>,
    tag: TypeTag,
    id: ObjectId,
}

impl IdLease {
    /// Allocates an id for `tag` from `pool`.
    ///
    /// On exhaustion the lease holds [`ObjectId::INVALID`] and releases
    /// nothing on drop.
    #[must_use]
    pub fn acquire(pool: &Arc<IdentifierPool>, tag: TypeTag) -> Self {
        let id = pool.allocate(tag);
        Self {
            pool: Arc::clone(pool),
            tag,
            id,
        }
    }

    /// Allocates an id for `tag` from `pool`.
    ///
    /// # Errors
    ///
    /// Fails when the tag's id space is exhausted.
    pub fn try_acquire(pool: &Arc<IdentifierPool>, tag: TypeTag) -> MantleResult<Self> {
        let id = pool.try_allocate(tag)?;
        Ok(Self {
            pool: Arc::clone(pool),
            tag,
            id,
        })
    }

    /// The tag the id was allocated under.
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// The leased id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for IdLease {
    fn drop(&mut self) {
        if !self.id.is_invalid() {
            self.pool.release(self.tag, self.id);
        }
    }
}

impl fmt::Debug for IdLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdLease")
            .field("tag", &self.tag)
            .field("id", &self.id)
            .finish()
    }
}
