//! RON schema definitions

pub mod alias;
pub mod explosion;
