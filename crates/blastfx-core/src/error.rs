//! Error types for blastfx-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("field type {kind} is not supported by the expression compiler (expression \"{script}\"); only int, float, byte, and bool fields can be compiled")]
    UnsupportedFieldType { kind: &'static str, script: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
