//! # Event System
//!
//! Queued and immediate delivery of events to ordered listener chains,
//! with at-most-one-consumer semantics and event recycling.

mod channel;
mod event;
mod listener;

pub use channel::{DrainReport, EventChannel};
pub use event::{Event, EventHeader};
pub use listener::{EventListener, ListenerHandle};
