//! # Events
//!
//! An event is an application payload behind an [`EventHeader`]:
//! tag, leased id, a *handled* flag and a *repeat* flag.
//!
//! ## Lifecycle
//!
//! ```text
//! Fresh ──> Queued (optional) ──> Dispatching ──> Handled | Unhandled
//!                                                      │
//!                                                      └──> Cached (optional) ──> Fresh
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ids::{IdLease, Identified, IdentifierPool, ObjectId, TypeTag};

/// Identity and dispatch state of an event.
#[derive(Debug)]
pub struct EventHeader {
    lease: IdLease,
    handled: AtomicBool,
    /// Advisory: the producer would like redelivery until handled.
    repeat: AtomicBool,
}

impl EventHeader {
    /// Creates a header with a freshly allocated id for `tag`.
    #[must_use]
    pub fn new(ids: &Arc<IdentifierPool>, tag: TypeTag, repeat: bool) -> Self {
        Self {
            lease: IdLease::acquire(ids, tag),
            handled: AtomicBool::new(false),
            repeat: AtomicBool::new(repeat),
        }
    }

    /// The event kind.
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.lease.type_tag()
    }

    /// The event instance id.
    #[inline]
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.lease.id()
    }

    /// Marks the event consumed.
    #[inline]
    pub fn mark_handled(&self) {
        self.handled.store(true, Ordering::Release);
    }

    /// Checks if a listener consumed the event.
    #[inline]
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::Acquire)
    }

    /// Whether the producer asked for redelivery until handled.
    #[inline]
    #[must_use]
    pub fn repeat(&self) -> bool {
        self.repeat.load(Ordering::Acquire)
    }

    /// Sets the repeat flag.
    #[inline]
    pub fn set_repeat(&self, repeat: bool) {
        self.repeat.store(repeat, Ordering::Release);
    }

    /// Clears the handled flag so the event can go through a new pass.
    ///
    /// Must not be called while the event is being dispatched.
    #[inline]
    pub fn reset(&self) {
        self.handled.store(false, Ordering::Release);
    }
}

/// Trait for event payloads.
///
/// # Example
///
/// ```rust,ignore
/// struct Damage {
///     header: EventHeader,
///     amount: AtomicU32,
/// }
///
/// impl Event for Damage {
///     fn header(&self) -> &EventHeader { &self.header }
///     fn as_any(&self) -> &dyn Any { self }
/// }
/// ```
pub trait Event: Any + Send + Sync {
    /// The event's identity and dispatch state.
    fn header(&self) -> &EventHeader;

    /// Downcasting hook for listeners that know the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl Identified for dyn Event {
    fn type_tag(&self) -> TypeTag {
        self.header().type_tag()
    }

    fn object_id(&self) -> ObjectId {
        self.header().object_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let ids = Arc::new(IdentifierPool::new());
        let header = EventHeader::new(&ids, TypeTag::new(3), true);

        assert!(header.repeat());
        assert!(!header.is_handled());

        header.mark_handled();
        assert!(header.is_handled());

        header.reset();
        header.set_repeat(false);
        assert!(!header.is_handled());
        assert!(!header.repeat());
    }

    #[test]
    fn test_event_ids_recycle() {
        let ids = Arc::new(IdentifierPool::new());
        let tag = TypeTag::new(3);
        let first = EventHeader::new(&ids, tag, false);
        let released = first.object_id();
        drop(first);

        assert_eq!(EventHeader::new(&ids, tag, false).object_id(), released);
    }
}
