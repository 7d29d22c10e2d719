//! # Identifier Types
//!
//! Objects are identified by a pair:
//! - A [`TypeTag`] naming the kind (component kind, entity kind, event kind...)
//! - An [`ObjectId`] naming one instance inside that kind's namespace
//!
//! Neither half is globally unique on its own.

use std::fmt;

/// Narrow numeric key identifying a logical kind.
///
/// Assigned by application code at registration time. The core treats it
/// as an opaque map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TypeTag(u8);

impl TypeTag {
    /// Reserved sentinel for "invalid / unassigned".
    pub const INVALID: Self = Self(u8::MAX - 1);

    /// Creates a type tag from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Checks if this is the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<u8> for TypeTag {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag#{}", self.0)
    }
}

/// Small recyclable identifier of one instance within a [`TypeTag`].
///
/// Uniqueness only holds for the `(TypeTag, ObjectId)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectId(u16);

impl ObjectId {
    /// Reserved sentinel for "invalid". Also the first id that is never issued.
    pub const INVALID: Self = Self(u16::MAX - 1);

    /// Creates an object id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that carries a `(TypeTag, ObjectId)` identity.
///
/// Pools use this to find a specific instance by id.
pub trait Identified {
    /// The kind this object belongs to.
    fn type_tag(&self) -> TypeTag;

    /// The instance id within [`Identified::type_tag`].
    fn object_id(&self) -> ObjectId;
}
