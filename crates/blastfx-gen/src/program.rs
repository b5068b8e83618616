//! Compiled explosion programs

use blastfx_core::{ClassDesc, GeneratorId, SpawnFlags, Vec3};
use std::sync::Arc;

/// One spawn kind compiled to bytecode
///
/// Immutable after compilation; the opcode stream is read linearly once per
/// spawned instance.
#[derive(Debug, Clone)]
pub struct CompiledSpawn {
    /// Target spawnable class
    pub class: Arc<ClassDesc>,
    /// Compiled opcode stream, terminated by END
    pub code: Vec<u8>,
    /// Number of instances to spawn per explosion
    pub count: u32,
    /// Environment flags gating this spawn kind
    pub flags: SpawnFlags,
    /// Nested generators acquired while compiling; owned by this program
    /// and released when the definition is unloaded
    pub spawn_gens: Vec<GeneratorId>,
}

/// Ground flash parameters captured at compile time
#[derive(Debug, Clone, PartialEq)]
pub struct GroundFlashInfo {
    pub flash_size: f32,
    pub flash_alpha: f32,
    pub circle_growth: f32,
    pub circle_alpha: f32,
    pub ttl: i32,
    pub color: Vec3,
    pub flags: SpawnFlags,
}

/// One compiled explosion definition
#[derive(Debug, Clone)]
pub struct ExplosionData {
    /// Compiled spawn kinds in definition order
    pub spawns: Vec<CompiledSpawn>,
    /// Optional ground flash
    pub ground_flash: Option<GroundFlashInfo>,
    /// Run the non-custom fallback composition after custom spawns
    pub use_default: bool,
}
