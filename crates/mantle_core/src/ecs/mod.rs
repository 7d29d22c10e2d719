//! # Entity Component System
//!
//! Entities, components and systems as seen by the runtime core.
//!
//! ## Design Philosophy
//!
//! - Components and systems are opaque beyond their tag and id
//! - Entity and component ids are leased and recycled per tag
//! - No query engine: callers must already know the tags they want

mod component;
mod entity;
mod system;

pub use component::{Component, ComponentHeader};
pub use entity::{Entity, EntityPool};
pub use system::{System, SystemRegistry, SystemState};
