//! # Memory Management
//!
//! Reuse pools for objects that are expensive to rebuild.
//!
//! ## Design Philosophy
//!
//! - Objects are recycled whole, never partially aliased
//! - Pools only store what callers give back; they never allocate objects
//! - Growth is unbounded unless a per-tag cap is configured

mod object_pool;

pub use object_pool::{ObjectPool, PooledEntry};
