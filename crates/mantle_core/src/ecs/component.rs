//! # Component System
//!
//! Components are application-defined data attached to entities.
//! The core only sees their header: a tag, a leased id and a remove flag.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ids::{IdLease, Identified, IdentifierPool, ObjectId, TypeTag};

/// Identity and bookkeeping shared by every component.
///
/// The id is leased from the component identifier pool and returned when
/// the header is dropped.
#[derive(Debug)]
pub struct ComponentHeader {
    lease: IdLease,
    /// Set to ask systems to drop this component on their next pass.
    remove: AtomicBool,
}

impl ComponentHeader {
    /// Creates a header with a freshly allocated id for `tag`.
    #[must_use]
    pub fn new(ids: &Arc<IdentifierPool>, tag: TypeTag) -> Self {
        Self {
            lease: IdLease::acquire(ids, tag),
            remove: AtomicBool::new(false),
        }
    }

    /// The component kind.
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.lease.type_tag()
    }

    /// The component instance id.
    #[inline]
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.lease.id()
    }

    /// Flags the component for removal from systems.
    #[inline]
    pub fn mark_for_removal(&self) {
        self.remove.store(true, Ordering::Release);
    }

    /// Checks the removal flag.
    #[inline]
    #[must_use]
    pub fn is_marked_for_removal(&self) -> bool {
        self.remove.load(Ordering::Acquire)
    }

    /// Clears the removal flag, e.g. before reusing a pooled component.
    #[inline]
    pub fn clear_removal(&self) {
        self.remove.store(false, Ordering::Release);
    }
}

/// Marker trait for components.
///
/// # Example
///
/// ```rust,ignore
/// struct Health {
///     header: ComponentHeader,
///     points: AtomicU32,
/// }
///
/// impl Component for Health {
///     fn header(&self) -> &ComponentHeader { &self.header }
///     fn as_any(&self) -> &dyn Any { self }
/// }
/// ```
pub trait Component: Any + Send + Sync {
    /// The component's identity.
    fn header(&self) -> &ComponentHeader;

    /// Downcasting hook for code that knows the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl Identified for dyn Component {
    fn type_tag(&self) -> TypeTag {
        self.header().type_tag()
    }

    fn object_id(&self) -> ObjectId {
        self.header().object_id()
    }
}
