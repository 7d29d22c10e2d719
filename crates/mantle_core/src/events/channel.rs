//! # Event Channel
//!
//! Decoupled delivery of events from producers to listeners.
//!
//! ## Architecture
//!
//! ```text
//!  producer ──enqueue──> ┌──────────────┐
//!                        │  FIFO queue  │──drain_queue──┐
//!                        └──────────────┘               ▼
//!  producer ──dispatch_now─────────────────────> listener walk ──> L0, L1, ... (first `true` wins)
//!                                                       │
//!  acquire_event <──── ┌──────────────┐ <──cache_event──┘
//!                      │ reuse cache  │
//!                      └──────────────┘
//! ```
//!
//! ## Locking
//!
//! Cache, queue and listener table each have their own lock. No lock is
//! held while a listener runs: the walk re-fetches "listener at index i"
//! under a fresh lock on every step, and the drain re-pops the queue head
//! under a fresh lock for every event. Listeners can therefore register,
//! unregister, enqueue or dispatch from inside `on_event` without
//! deadlocking.
//!
//! The price is that a listener removed mid-walk (swap-remove) can cause
//! the listener moved into its slot to be skipped for that pass.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::event::Event;
use super::listener::ListenerHandle;
use crate::ids::{Identified, TypeTag};
use crate::memory::{ObjectPool, PooledEntry};

/// Outcome of one [`EventChannel::drain_queue`] call.
#[derive(Default)]
pub struct DrainReport {
    /// Events popped from the queue.
    pub delivered: usize,
    /// Events a listener consumed (these were cached for reuse).
    pub handled: usize,
    /// Events no listener consumed, in drain order. Dropped with the report.
    pub unhandled: Vec<PooledEntry<dyn Event>>,
}

impl DrainReport {
    /// Checks if nothing was drained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delivered == 0
    }

    /// Yields the unhandled events whose repeat flag is set.
    ///
    /// Nothing is re-queued automatically; feed these back to
    /// [`EventChannel::enqueue`] to get redelivery.
    pub fn into_repeating(self) -> impl Iterator<Item = PooledEntry<dyn Event>> {
        self.unhandled
            .into_iter()
            .filter(|event| event.header().repeat())
    }
}

impl fmt::Debug for DrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrainReport")
            .field("delivered", &self.delivered)
            .field("handled", &self.handled)
            .field("unhandled", &self.unhandled.len())
            .finish()
    }
}

/// Event dispatch engine.
///
/// # Example
///
/// ```rust,ignore
/// let channel = EventChannel::new();
/// channel.register_listener(DAMAGE, Arc::new(|event: &PooledEntry<dyn Event>| {
///     apply_damage(event);
///     true
/// }));
///
/// channel.enqueue(damage_event);
/// let report = channel.drain_queue();
/// for event in report.into_repeating() {
///     channel.enqueue(event);
/// }
/// ```
pub struct EventChannel {
    /// Reuse cache of finished events.
    cache: ObjectPool<dyn Event>,
    /// Deferred delivery queue: push back, pop front.
    queue: Mutex<VecDeque<PooledEntry<dyn Event>>>,
    /// Listeners per tag, in registration order (modulo swap-removes).
    listeners: Mutex<HashMap<TypeTag, Vec<ListenerHandle>>>,
}

impl EventChannel {
    /// Creates a channel with an unbounded reuse cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache_limit(None)
    }

    /// Creates a channel caching at most `max_cached_per_tag` events per tag.
    #[must_use]
    pub fn with_cache_limit(max_cached_per_tag: Option<usize>) -> Self {
        Self {
            cache: ObjectPool::with_limit(max_cached_per_tag),
            queue: Mutex::new(VecDeque::new()),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Reuse cache
    // =========================================================================

    /// Returns `event` to its tag's reuse cache.
    pub fn cache_event(&self, event: PooledEntry<dyn Event>) {
        self.cache.put(event.type_tag(), event);
    }

    /// Pops the most recently cached event of `tag`.
    ///
    /// The returned event has its handled flag cleared.
    pub fn acquire_event(&self, tag: TypeTag) -> Option<PooledEntry<dyn Event>> {
        let event = self.cache.take(tag)?;
        event.header().reset();
        Some(event)
    }

    /// Drops every cached event of `tag`.
    pub fn clear_events(&self, tag: TypeTag) {
        self.cache.clear(tag);
    }

    /// Returns the number of cached events of `tag`.
    #[must_use]
    pub fn cached_count(&self, tag: TypeTag) -> usize {
        self.cache.len(tag)
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Appends `event` to the delivery queue.
    pub fn enqueue(&self, event: PooledEntry<dyn Event>) {
        self.queue.lock().push_back(event);
    }

    /// Returns the number of queued events.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Delivers `event` right away and returns whether it was handled.
    ///
    /// With `cache_after`, the event goes to the reuse cache afterwards
    /// whether or not a listener consumed it.
    pub fn dispatch_now(&self, event: PooledEntry<dyn Event>, cache_after: bool) -> bool {
        let handled = self.deliver(&event);
        if cache_after {
            self.cache_event(event);
        }
        handled
    }

    /// Delivers queued events until the queue is empty.
    ///
    /// Handled events are cached for reuse. Unhandled ones are not
    /// re-queued; they are returned in the report and dropped with it.
    /// Events enqueued by listeners during the drain are delivered too.
    pub fn drain_queue(&self) -> DrainReport {
        let mut report = DrainReport::default();

        while let Some(event) = self.next_queued() {
            report.delivered += 1;
            if self.deliver(&event) {
                report.handled += 1;
                self.cache_event(event);
            } else {
                report.unhandled.push(event);
            }
        }

        if !report.is_empty() {
            tracing::trace!(
                "drained {} events ({} handled)",
                report.delivered,
                report.handled
            );
        }
        report
    }

    /// Pops the queue head under its own short-lived lock.
    fn next_queued(&self) -> Option<PooledEntry<dyn Event>> {
        self.queue.lock().pop_front()
    }

    /// Walks the tag's listeners until one consumes `event`.
    ///
    /// Each step takes and releases the listener lock, so `on_event` runs
    /// unlocked.
    fn deliver(&self, event: &PooledEntry<dyn Event>) -> bool {
        let tag = event.type_tag();
        let mut index = 0;

        while let Some(listener) = self.listener_at(tag, index) {
            if listener.on_event(event) {
                event.header().mark_handled();
                return true;
            }
            index += 1;
        }
        false
    }

    /// Clones the listener at `index` for `tag`, if any.
    fn listener_at(&self, tag: TypeTag, index: usize) -> Option<ListenerHandle> {
        self.listeners.lock().get(&tag)?.get(index).cloned()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Appends `listener` to the tag's listener sequence.
    pub fn register_listener(&self, tag: TypeTag, listener: ListenerHandle) {
        self.listeners.lock().entry(tag).or_default().push(listener);
        tracing::debug!("listener registered for {}", tag);
    }

    /// Removes `listener` (matched by identity) from the tag's sequence.
    ///
    /// Swap-remove: the last listener takes the removed one's slot.
    /// Returns whether the listener was found.
    pub fn unregister_listener(&self, tag: TypeTag, listener: &ListenerHandle) -> bool {
        let removed = {
            let mut listeners = self.listeners.lock();
            listeners.get_mut(&tag).and_then(|sequence| {
                sequence
                    .iter()
                    .position(|registered| Arc::ptr_eq(registered, listener))
                    .map(|index| sequence.swap_remove(index))
            })
        };

        if removed.is_some() {
            tracing::debug!("listener unregistered for {}", tag);
        }
        removed.is_some()
    }

    /// Drops every listener registered for `tag`.
    pub fn clear_listeners(&self, tag: TypeTag) {
        let removed = self.listeners.lock().remove(&tag);
        if removed.is_some() {
            tracing::debug!("listeners cleared for {}", tag);
        }
    }

    /// Returns the number of listeners registered for `tag`.
    #[must_use]
    pub fn listener_count(&self, tag: TypeTag) -> usize {
        self.listeners.lock().get(&tag).map_or(0, Vec::len)
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("cache", &self.cache)
            .field("queued", &self.queue_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::events::event::EventHeader;
    use crate::ids::{IdentifierPool, ObjectId};

    const DAMAGE: TypeTag = TypeTag::new(0);
    const HEAL: TypeTag = TypeTag::new(1);

    struct Damage {
        header: EventHeader,
        amount: u32,
    }

    impl Event for Damage {
        fn header(&self) -> &EventHeader {
            &self.header
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn event(ids: &Arc<IdentifierPool>, tag: TypeTag, repeat: bool) -> PooledEntry<dyn Event> {
        Arc::new(Damage {
            header: EventHeader::new(ids, tag, repeat),
            amount: 1,
        })
    }

    /// Listener recording its name into a shared log.
    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
        consume: bool,
    ) -> ListenerHandle {
        let log = Arc::clone(log);
        Arc::new(move |_: &PooledEntry<dyn Event>| {
            log.lock().push(name);
            consume
        })
    }

    #[test]
    fn test_dispatch_stops_at_first_handler() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        channel.register_listener(DAMAGE, recorder(&log, "l1", false));
        channel.register_listener(DAMAGE, recorder(&log, "l2", true));
        channel.register_listener(DAMAGE, recorder(&log, "l3", true));

        let fired = event(&ids, DAMAGE, false);
        assert!(channel.dispatch_now(Arc::clone(&fired), false));
        assert_eq!(*log.lock(), vec!["l1", "l2"]);
        assert!(fired.header().is_handled());
        assert_eq!(channel.cached_count(DAMAGE), 0);
    }

    #[test]
    fn test_dispatch_caches_even_when_unhandled() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();

        assert!(!channel.dispatch_now(event(&ids, DAMAGE, false), true));
        assert_eq!(channel.cached_count(DAMAGE), 1);
    }

    #[test]
    fn test_listeners_are_per_tag() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        channel.register_listener(HEAL, recorder(&log, "heal", true));

        assert!(!channel.dispatch_now(event(&ids, DAMAGE, false), false));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_queue_is_fifo() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        for _ in 0..3 {
            channel.enqueue(event(&ids, DAMAGE, false));
        }
        assert_eq!(channel.queue_len(), 3);

        let report = channel.drain_queue();
        let order: Vec<ObjectId> = report.unhandled.iter().map(|e| e.object_id()).collect();
        assert_eq!(order, vec![ObjectId::new(0), ObjectId::new(1), ObjectId::new(2)]);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.handled, 0);
        assert_eq!(channel.queue_len(), 0);
        assert_eq!(channel.cached_count(DAMAGE), 0);
    }

    #[test]
    fn test_drain_caches_handled_in_order() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        channel.register_listener(DAMAGE, Arc::new(|_: &PooledEntry<dyn Event>| true));
        for _ in 0..3 {
            channel.enqueue(event(&ids, DAMAGE, false));
        }

        let report = channel.drain_queue();
        assert_eq!(report.handled, 3);
        assert!(report.unhandled.is_empty());

        // Cache is LIFO, so the last drained comes back first
        let ids_back: Vec<ObjectId> = std::iter::from_fn(|| channel.acquire_event(DAMAGE))
            .map(|e| e.object_id())
            .collect();
        assert_eq!(ids_back, vec![ObjectId::new(2), ObjectId::new(1), ObjectId::new(0)]);
    }

    #[test]
    fn test_unhandled_events_are_dropped() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        channel.enqueue(event(&ids, DAMAGE, false));

        drop(channel.drain_queue());
        assert_eq!(ids.in_use(DAMAGE), 0);
    }

    #[test]
    fn test_repeat_is_caller_driven() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        channel.enqueue(event(&ids, DAMAGE, true));
        channel.enqueue(event(&ids, DAMAGE, false));

        let repeating: Vec<_> = channel.drain_queue().into_repeating().collect();
        assert_eq!(repeating.len(), 1);
        assert_eq!(channel.queue_len(), 0);

        for event in repeating {
            channel.enqueue(event);
        }
        channel.register_listener(DAMAGE, Arc::new(|_: &PooledEntry<dyn Event>| true));
        let report = channel.drain_queue();
        assert_eq!(report.handled, 1);
        assert_eq!(channel.cached_count(DAMAGE), 1);
    }

    #[test]
    fn test_acquire_resets_handled() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        channel.register_listener(DAMAGE, Arc::new(|_: &PooledEntry<dyn Event>| true));

        let fired = event(&ids, DAMAGE, false);
        channel.dispatch_now(fired, true);

        let reused = channel.acquire_event(DAMAGE).unwrap();
        assert!(!reused.header().is_handled());
        assert_eq!(reused.as_any().downcast_ref::<Damage>().unwrap().amount, 1);
        assert!(channel.acquire_event(DAMAGE).is_none());
    }

    #[test]
    fn test_swap_remove_unregister() {
        let channel = EventChannel::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l1 = recorder(&log, "l1", false);
        let l2 = recorder(&log, "l2", false);
        let l3 = recorder(&log, "l3", false);
        for listener in [&l1, &l2, &l3] {
            channel.register_listener(DAMAGE, Arc::clone(listener));
        }

        assert!(channel.unregister_listener(DAMAGE, &l1));
        assert!(!channel.unregister_listener(DAMAGE, &l1));
        assert_eq!(channel.listener_count(DAMAGE), 2);

        let ids = Arc::new(IdentifierPool::new());
        channel.dispatch_now(event(&ids, DAMAGE, false), false);
        let mut seen = log.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec!["l2", "l3"]);
    }

    #[test]
    fn test_listener_can_unregister_itself() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = Arc::new(EventChannel::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));
        let listener: ListenerHandle = {
            let channel = Arc::clone(&channel);
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            Arc::new(move |_: &PooledEntry<dyn Event>| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.lock().take() {
                    channel.unregister_listener(DAMAGE, &me);
                }
                true
            })
        };
        *slot.lock() = Some(Arc::clone(&listener));
        channel.register_listener(DAMAGE, listener);

        assert!(channel.dispatch_now(event(&ids, DAMAGE, false), false));
        assert!(!channel.dispatch_now(event(&ids, DAMAGE, false), false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(channel.listener_count(DAMAGE), 0);
    }

    #[test]
    fn test_listener_can_enqueue_during_drain() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = Arc::new(EventChannel::new());
        let chained = Arc::new(AtomicUsize::new(0));

        let listener: ListenerHandle = {
            let channel = Arc::clone(&channel);
            let ids = Arc::clone(&ids);
            let chained = Arc::clone(&chained);
            Arc::new(move |_: &PooledEntry<dyn Event>| {
                if chained.fetch_add(1, Ordering::SeqCst) == 0 {
                    channel.enqueue(event(&ids, HEAL, false));
                }
                true
            })
        };
        channel.register_listener(DAMAGE, Arc::clone(&listener));
        channel.register_listener(HEAL, listener);

        channel.enqueue(event(&ids, DAMAGE, false));
        let report = channel.drain_queue();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.handled, 2);
        assert_eq!(channel.cached_count(HEAL), 1);
    }

    #[test]
    fn test_clear() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::new();
        channel.register_listener(DAMAGE, Arc::new(|_: &PooledEntry<dyn Event>| false));
        channel.cache_event(event(&ids, DAMAGE, false));

        channel.clear_events(DAMAGE);
        channel.clear_listeners(DAMAGE);
        assert_eq!(channel.cached_count(DAMAGE), 0);
        assert_eq!(channel.listener_count(DAMAGE), 0);
        assert!(channel.acquire_event(DAMAGE).is_none());
    }

    #[test]
    fn test_cache_limit() {
        let ids = Arc::new(IdentifierPool::new());
        let channel = EventChannel::with_cache_limit(Some(1));
        channel.cache_event(event(&ids, DAMAGE, false));
        channel.cache_event(event(&ids, DAMAGE, false));

        assert_eq!(channel.cached_count(DAMAGE), 1);
        assert_eq!(ids.in_use(DAMAGE), 1);
    }
}
