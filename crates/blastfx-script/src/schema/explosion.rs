//! Explosion definition schema

use blastfx_core::{SpawnFlags, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Definition of one explosion effect, keyed by tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionDef {
    /// Unique tag referenced by weapons and nested generators
    pub tag: String,
    /// Spawn kinds created by this explosion
    #[serde(default)]
    pub spawns: Vec<SpawnDef>,
    /// Optional ground flash parameters (not a spawn kind)
    #[serde(default)]
    pub groundflash: Option<GroundFlashDef>,
    /// Also run the non-custom fallback composition after custom spawns
    #[serde(default)]
    pub use_default_explosions: bool,
}

/// One spawn kind within an explosion definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnDef {
    /// Name of this spawn kind
    pub name: String,
    /// Target spawnable class; defaults to the spawn name
    #[serde(default)]
    pub class: Option<String>,
    /// Number of instances to spawn
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub ground: bool,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub air: bool,
    #[serde(default)]
    pub underwater: bool,
    #[serde(default)]
    pub unit: bool,
    #[serde(default)]
    pub nounit: bool,
    /// Field name -> expression text
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl SpawnDef {
    /// Class name to instantiate
    pub fn class_name(&self) -> &str {
        self.class.as_deref().unwrap_or(&self.name)
    }

    /// Environment flags gating this spawn kind
    pub fn flags(&self) -> SpawnFlags {
        flags_from_bools(
            self.ground,
            self.water,
            self.air,
            self.underwater,
            self.unit,
            self.nounit,
        )
    }
}

/// Ground flash visual parameters
///
/// Populated directly from the definition at compile time; no bytecode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundFlashDef {
    /// Time to live in frames; zero or negative disables the flash
    pub ttl: i32,
    #[serde(default)]
    pub flash_size: f32,
    #[serde(default)]
    pub flash_alpha: f32,
    #[serde(default)]
    pub circle_growth: f32,
    #[serde(default)]
    pub circle_alpha: f32,
    #[serde(default = "default_flash_color")]
    pub color: Vec3,
    #[serde(default)]
    pub ground: bool,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub air: bool,
    #[serde(default)]
    pub underwater: bool,
    #[serde(default)]
    pub unit: bool,
    #[serde(default)]
    pub nounit: bool,
}

impl GroundFlashDef {
    /// Explicit environment flags from the table
    pub fn flags(&self) -> SpawnFlags {
        flags_from_bools(
            self.ground,
            self.water,
            self.air,
            self.underwater,
            self.unit,
            self.nounit,
        )
    }
}

fn flags_from_bools(
    ground: bool,
    water: bool,
    air: bool,
    underwater: bool,
    unit: bool,
    nounit: bool,
) -> SpawnFlags {
    let mut flags = SpawnFlags::NONE;
    if ground {
        flags |= SpawnFlags::GROUND;
    }
    if water {
        flags |= SpawnFlags::WATER;
    }
    if air {
        flags |= SpawnFlags::AIR;
    }
    if underwater {
        flags |= SpawnFlags::UNDERWATER;
    }
    if unit {
        flags |= SpawnFlags::UNIT;
    }
    if nounit {
        flags |= SpawnFlags::NO_UNIT;
    }
    flags
}

fn default_count() -> u32 {
    1
}

fn default_flash_color() -> Vec3 {
    Vec3::new(1.0, 1.0, 0.8)
}

/// Loaded explosion definitions, keyed by tag
#[derive(Debug, Clone, Default)]
pub struct ExplosionDefs {
    by_tag: IndexMap<String, ExplosionDef>,
}

impl ExplosionDefs {
    /// Create an empty definition table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a definition by tag
    pub fn get(&self, tag: &str) -> Option<&ExplosionDef> {
        self.by_tag.get(tag)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// True if no definitions are loaded
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Iterate over loaded tags
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(String::as_str)
    }

    /// Insert a definition; the tag must not already exist
    pub fn insert(&mut self, def: ExplosionDef) -> crate::Result<()> {
        if self.by_tag.contains_key(&def.tag) {
            return Err(crate::Error::DuplicateDefinition(def.tag.clone()));
        }
        self.by_tag.insert(def.tag.clone(), def);
        Ok(())
    }

    /// Remove a definition by tag
    pub fn remove(&mut self, tag: &str) -> Option<ExplosionDef> {
        self.by_tag.shift_remove(tag)
    }
}
