//! Identity types for explosion definitions, generators, and resources

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a compiled explosion definition in the program cache
///
/// Ordinary values are small indices into the cache's vector store and stay
/// stable across reloads of the same tag. Three reserved values live out of
/// band above the index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExplosionId(pub u32);

impl ExplosionId {
    /// Compile failed or tag not found
    pub const INVALID: ExplosionId = ExplosionId(u32::MAX);
    /// Route to the non-custom fallback generator
    pub const STANDARD: ExplosionId = ExplosionId(u32::MAX - 1);
    /// One-shot nested spawn; resolves to the last-compiled entry
    pub const SPAWNER: ExplosionId = ExplosionId(u32::MAX - 2);

    /// Create an ordinary cache-index identifier
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw value
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// True unless this is the INVALID sentinel
    pub fn is_valid(&self) -> bool {
        *self != ExplosionId::INVALID
    }
}

impl fmt::Display for ExplosionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExplosionId::INVALID => write!(f, "explosion:invalid"),
            ExplosionId::STANDARD => write!(f, "explosion:standard"),
            ExplosionId::SPAWNER => write!(f, "explosion:spawner"),
            ExplosionId(n) => write!(f, "explosion:{}", n),
        }
    }
}

/// Identifier of a loaded (possibly nested) explosion generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratorId(pub u32);

impl GeneratorId {
    /// Raw value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generator:{}", self.0)
    }
}

/// Opaque handle to an externally registered shared resource
///
/// Texture regions, color gradients, and nested generators resolve to one of
/// these at compile time; LOADP carries the handle as its operand and STOREP
/// writes it into the instance. Handles are meaningful only to the registry
/// that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    /// The "no resource" value; the pointer accumulator resets to this
    pub const NONE: ResourceHandle = ResourceHandle(0);

    /// Reconstruct a handle from its raw value
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// True if this is the NONE handle
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids() {
        assert!(!ExplosionId::INVALID.is_valid());
        assert!(ExplosionId::STANDARD.is_valid());
        assert!(ExplosionId::new(0).is_valid());
        assert_eq!(format!("{}", ExplosionId::new(3)), "explosion:3");
        assert_eq!(format!("{}", ExplosionId::SPAWNER), "explosion:spawner");
    }

    #[test]
    fn test_handle_none() {
        assert!(ResourceHandle::NONE.is_none());
        assert!(!ResourceHandle::from_raw(7).is_none());
    }
}
