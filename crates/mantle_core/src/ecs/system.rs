//! # Systems
//!
//! Systems own behavior. The core only tracks them by tag and lets callers
//! feed them components; what a system does with those is its own business.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::component::Component;
use crate::ids::{ObjectId, TypeTag};
use crate::memory::PooledEntry;

/// Behavior unit registered under one [`TypeTag`].
///
/// Methods take `&self`: systems are shared through `Arc` and guard their
/// own state.
pub trait System: Send + Sync {
    /// The system kind.
    fn type_tag(&self) -> TypeTag;

    /// Whether the system is currently running.
    fn is_enabled(&self) -> bool;

    /// Enables or disables the system.
    fn set_enabled(&self, enabled: bool);

    /// Hands a component to the system.
    fn add_component(&self, tag: TypeTag, component: PooledEntry<dyn Component>);

    /// Asks the system to drop the component `id` of kind `tag`.
    fn remove_component(&self, tag: TypeTag, id: ObjectId);
}

/// Tag and enabled flag most systems need. Starts disabled.
#[derive(Debug)]
pub struct SystemState {
    tag: TypeTag,
    enabled: AtomicBool,
}

impl SystemState {
    /// Creates a disabled state for `tag`.
    #[must_use]
    pub const fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            enabled: AtomicBool::new(false),
        }
    }

    /// The system kind.
    #[inline]
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Whether the system is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Sets the enabled flag.
    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

/// Registry of systems, at most one per [`TypeTag`].
#[derive(Default)]
pub struct SystemRegistry {
    systems: Mutex<HashMap<TypeTag, Arc<dyn System>>>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `system` under its own tag.
    ///
    /// Keeps the existing system if the tag is taken; returns whether the
    /// new one was inserted.
    pub fn add_system(&self, system: Arc<dyn System>) -> bool {
        let tag = system.type_tag();
        let mut systems = self.systems.lock();
        if systems.contains_key(&tag) {
            tracing::debug!("system for {} already registered", tag);
            return false;
        }
        systems.insert(tag, system);
        true
    }

    /// Returns the system registered under `tag`.
    #[must_use]
    pub fn get_system(&self, tag: TypeTag) -> Option<Arc<dyn System>> {
        self.systems.lock().get(&tag).cloned()
    }

    /// Unregisters and returns the system under `tag`.
    pub fn remove_system(&self, tag: TypeTag) -> Option<Arc<dyn System>> {
        self.systems.lock().remove(&tag)
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.lock().len()
    }

    /// Checks if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<TypeTag> = self.systems.lock().keys().copied().collect();
        tags.sort_unstable();
        f.debug_struct("SystemRegistry").field("tags", &tags).finish()
    }
}
