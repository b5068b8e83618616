//! Error types for blastfx-gen

use thiserror::Error;

/// Generator compilation error type
///
/// These surface per field during schema navigation; the loader logs them
/// and skips the offending field, so a single bad property never aborts the
/// rest of a definition.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] blastfx_core::Error),

    #[error("missing {kind} resource \"{name}\"")]
    MissingResource { kind: &'static str, name: String },

    #[error("invalid color map definition \"{0}\": expected at least two RGBA float tuples")]
    InvalidColorMap(String),

    #[error("no generator matches \"{0}\"")]
    UnknownGenerator(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
