//! # MANTLE Core Runtime
//!
//! Runtime core of an Entity Component System:
//! - Recyclable per-type-tag object identifiers
//! - Type-tag keyed reuse pools for components, entities and events
//! - Event dispatch with queued and immediate delivery
//!
//! ## Architecture Rules
//!
//! 1. **No lock across caller code** - listeners may call back into the channel
//! 2. **Absent is a value** - lookups return `Option`, never fail loudly
//! 3. **Explicit context** - managers live in an [`EcsContext`], not in globals
//!
//! ## Example
//!
//! ```rust,ignore
//! use mantle_core::{EcsContext, TypeTag};
//!
//! let ctx = EcsContext::new();
//! let entity = ctx.create_entity(TypeTag::new(0));
//! ctx.events().drain_queue();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;
pub mod ecs;
pub mod error;
pub mod events;
pub mod ids;
pub mod memory;

pub use config::{EventConfig, MantleConfig, PoolConfig};
pub use context::EcsContext;
pub use ecs::{Component, ComponentHeader, Entity, EntityPool, System, SystemRegistry, SystemState};
pub use error::{MantleError, MantleResult};
pub use events::{DrainReport, Event, EventChannel, EventHeader, EventListener, ListenerHandle};
pub use ids::{IdLease, Identified, IdentifierPool, ObjectId, TypeTag};
pub use memory::{ObjectPool, PooledEntry};
