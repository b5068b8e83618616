//! Blastfx Script - RON loader and schema definitions
//!
//! Loads explosion content from RON files:
//! - Explosion definitions (spawn kinds, properties, ground flash)
//! - Class and generator alias tables

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::Loader;
pub use schema::alias::AliasDefs;
pub use schema::explosion::{ExplosionDef, ExplosionDefs, GroundFlashDef, SpawnDef};
