//! Blastfx Core - bytecode VM and compiler for explosion effects
//!
//! This crate provides the foundational types for data-driven explosion
//! effects:
//! - A compact opcode stream format and its interpreter
//! - An expression compiler for the single-letter operator mini-language
//! - A reflected schema model for spawnable effect types
//! - Instance buffers populated by offset-addressed stores
//! - Environment-flag classification and a deterministic RNG
//!
//! Compilation happens once per effect definition; interpretation runs once
//! per spawned instance on the explosion hot path and never allocates beyond
//! fixed-size local state.

mod compile;
mod error;
mod flags;
mod identity;
mod instance;
mod interp;
mod math;
mod opcode;
mod rng;
mod schema;

pub use compile::compile_scalar;
pub use error::{Error, Result};
pub use flags::SpawnFlags;
pub use identity::{ExplosionId, GeneratorId, ResourceHandle};
pub use instance::InstanceData;
pub use interp::{execute, SCRATCH_SLOTS};
pub use math::Vec3;
pub use opcode::{CodeStream, Cursor, OpCode};
pub use rng::EffectRng;
pub use schema::{ClassBuilder, ClassDesc, MemberDesc, ResourceKind, ScalarKind, TypeDesc};
