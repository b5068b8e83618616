//! Resource registries consumed during compilation
//!
//! Textures and ground-effect textures are pre-loaded by the engine and
//! looked up by name; color maps are interned from their definition strings
//! on first use. Each registry issues its own opaque handles; a handle is
//! only meaningful to the registry that issued it.

use crate::error::{Error, Result};
use blastfx_core::ResourceHandle;
use indexmap::IndexMap;

/// Handle namespaces, one per issuing registry
///
/// The tag occupies the high byte of every issued handle, so handles from
/// different registries are never numerically equal and a handle can be
/// traced back to the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum HandleSpace {
    Atlas = 1,
    GroundFx = 2,
    ColorMap = 3,
    Generator = 4,
}

impl HandleSpace {
    /// Build the `n`-th handle of this namespace
    pub(crate) fn handle(self, n: u64) -> ResourceHandle {
        ResourceHandle::from_raw(((self as u64) << 56) | n)
    }
}

/// A named texture region registry
///
/// Used for both the projectile atlas and the ground-effect atlas.
#[derive(Debug)]
pub struct TextureAtlas {
    textures: IndexMap<String, ResourceHandle>,
    next: u64,
    space: HandleSpace,
}

impl TextureAtlas {
    /// Create an empty atlas issuing handles in `space`
    pub fn new(space: HandleSpace) -> Self {
        Self {
            textures: IndexMap::new(),
            next: 0,
            space,
        }
    }

    /// Register a texture region, returning its handle
    pub fn register(&mut self, name: impl Into<String>) -> ResourceHandle {
        self.next += 1;
        let handle = self.space.handle(self.next);
        self.textures.insert(name.into(), handle);
        handle
    }

    /// Look up a texture by name
    pub fn texture(&self, name: &str) -> Option<ResourceHandle> {
        self.textures.get(name).copied()
    }
}

/// Color gradients interned by definition string
///
/// A definition string is a whitespace-separated list of RGBA float tuples,
/// at least two of them (the gradient endpoints).
#[derive(Debug, Default)]
pub struct ColorMapBank {
    maps: IndexMap<String, ResourceHandle>,
    next: u64,
}

impl ColorMapBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a gradient from its definition string
    ///
    /// Returns the existing handle when the same string was seen before.
    pub fn load(&mut self, def: &str) -> Result<ResourceHandle> {
        let key = def.trim();
        if let Some(handle) = self.maps.get(key) {
            return Ok(*handle);
        }

        let values: Vec<f32> = key
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::InvalidColorMap(key.to_string()))?;
        if values.len() < 8 || values.len() % 4 != 0 {
            return Err(Error::InvalidColorMap(key.to_string()));
        }

        self.next += 1;
        let handle = HandleSpace::ColorMap.handle(self.next);
        self.maps.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Number of interned gradients
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// True if nothing is interned
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// All compile-time resource registries bundled together
#[derive(Debug)]
pub struct ResourceBank {
    /// Projectile texture atlas
    pub atlas: TextureAtlas,
    /// Ground-effect texture atlas
    pub ground_fx: TextureAtlas,
    /// Color gradient bank
    pub color_maps: ColorMapBank,
}

impl ResourceBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            atlas: TextureAtlas::new(HandleSpace::Atlas),
            ground_fx: TextureAtlas::new(HandleSpace::GroundFx),
            color_maps: ColorMapBank::new(),
        }
    }
}

impl Default for ResourceBank {
    fn default() -> Self {
        Self::new()
    }
}
