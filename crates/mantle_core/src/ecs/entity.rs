//! # Entity Management
//!
//! An entity is an identified aggregate of components:
//! - A `(TypeTag, ObjectId)` identity leased from the entity id pool
//! - At most one component per component tag

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::component::Component;
use crate::error::MantleResult;
use crate::ids::{IdLease, Identified, IdentifierPool, ObjectId, TypeTag};
use crate::memory::{ObjectPool, PooledEntry};

/// Pool of reusable entities, searchable by id.
pub type EntityPool = ObjectPool<Entity>;

/// Identified container of components.
///
/// The id is held for the entity's whole lifetime and released on drop.
/// Components are NOT returned to any pool on drop; detach and re-pool them
/// first if they should be reused.
pub struct Entity {
    lease: IdLease,
    components: Mutex<BTreeMap<TypeTag, PooledEntry<dyn Component>>>,
}

impl Entity {
    /// Creates an empty entity of kind `tag`.
    #[must_use]
    pub fn new(ids: &Arc<IdentifierPool>, tag: TypeTag) -> Self {
        Self {
            lease: IdLease::acquire(ids, tag),
            components: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates an empty entity of kind `tag`.
    ///
    /// # Errors
    ///
    /// Fails when no entity id is left for `tag`.
    pub fn try_new(ids: &Arc<IdentifierPool>, tag: TypeTag) -> MantleResult<Self> {
        Ok(Self {
            lease: IdLease::try_acquire(ids, tag)?,
            components: Mutex::new(BTreeMap::new()),
        })
    }

    /// The entity kind.
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.lease.type_tag()
    }

    /// The entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.lease.id()
    }

    /// Attaches `component` under `tag`, replacing any previous one.
    ///
    /// Returns the replaced component; once that handle is dropped the entity
    /// no longer shares ownership of it.
    pub fn attach_component(
        &self,
        tag: TypeTag,
        component: PooledEntry<dyn Component>,
    ) -> Option<PooledEntry<dyn Component>> {
        self.components.lock().insert(tag, component)
    }

    /// Detaches the component under `tag`. No-op if there is none.
    pub fn detach_component(&self, tag: TypeTag) -> Option<PooledEntry<dyn Component>> {
        self.components.lock().remove(&tag)
    }

    /// Returns a new handle to the component under `tag`.
    #[must_use]
    pub fn get_component(&self, tag: TypeTag) -> Option<PooledEntry<dyn Component>> {
        self.components.lock().get(&tag).cloned()
    }

    /// Checks if a component is attached under `tag`.
    #[must_use]
    pub fn has_component(&self, tag: TypeTag) -> bool {
        self.components.lock().contains_key(&tag)
    }

    /// Returns the number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.lock().len()
    }

    /// Returns the attached component tags in ascending order.
    #[must_use]
    pub fn component_tags(&self) -> Vec<TypeTag> {
        self.components.lock().keys().copied().collect()
    }

    /// Detaches every component and returns them.
    pub fn detach_all(&self) -> Vec<(TypeTag, PooledEntry<dyn Component>)> {
        std::mem::take(&mut *self.components.lock())
            .into_iter()
            .collect()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("tag", &self.type_tag())
            .field("id", &self.id())
            .field("components", &self.component_tags())
            .finish()
    }
}

impl Identified for Entity {
    fn type_tag(&self) -> TypeTag {
        self.lease.type_tag()
    }

    fn object_id(&self) -> ObjectId {
        self.lease.id()
    }
}
