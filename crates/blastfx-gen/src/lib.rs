//! Blastfx Gen - explosion generator registry
//!
//! Compiles explosion definitions into reusable bytecode programs and runs
//! them at explosion time:
//! - Alias and class registries resolving definition names to schemas
//! - Resource registries (texture atlases, color maps)
//! - The schema navigator turning per-field expressions into bytecode
//! - The program cache with load/reload/unload semantics
//! - The explosion entry point producing populated spawn instances
//!
//! Compilation runs on a single control thread. Compiled programs are
//! immutable and handed to the interpreter behind `Arc`, so cache mutation
//! can never invalidate an in-flight execution.

mod alias;
mod error;
mod handler;
mod program;
mod resources;
mod spawnable;

pub use alias::{AliasList, ClassRegistry};
pub use error::{Error, Result};
pub use handler::{
    ExplosionGenHandler, ExplosionOutcome, ExplosionParams, LoadedGenerator, SpawnedInstance,
};
pub use program::{CompiledSpawn, ExplosionData, GroundFlashInfo};
pub use resources::{ColorMapBank, HandleSpace, ResourceBank, TextureAtlas};
pub use spawnable::register_builtin;
