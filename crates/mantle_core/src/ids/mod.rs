//! # Identifiers
//!
//! Type tags, recyclable object ids and the pool that hands them out.

mod lease;
mod pool;
mod types;

pub use lease::IdLease;
pub use pool::IdentifierPool;
pub use types::{Identified, ObjectId, TypeTag};
