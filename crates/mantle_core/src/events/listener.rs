//! # Event Listeners

use std::sync::Arc;

use super::event::Event;
use crate::memory::PooledEntry;

/// Handler for events of the tags it is registered under.
///
/// Called with no core lock held, so it may call back into the channel,
/// including unregistering itself.
pub trait EventListener: Send + Sync {
    /// Handles `event`. Returning `true` consumes it and stops the pass.
    fn on_event(&self, event: &PooledEntry<dyn Event>) -> bool;
}

impl<F> EventListener for F
where
    F: Fn(&PooledEntry<dyn Event>) -> bool + Send + Sync,
{
    fn on_event(&self, event: &PooledEntry<dyn Event>) -> bool {
        self(event)
    }
}

/// Shared listener handle. Registrations are matched by pointer identity.
pub type ListenerHandle = Arc<dyn EventListener>;
