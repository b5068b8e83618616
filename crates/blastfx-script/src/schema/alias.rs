//! Class and generator alias tables

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Alias tables mapping human-readable names to concrete class names
///
/// Aliases may chain (an alias pointing at another alias); resolution
/// follows the chain at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasDefs {
    /// Spawnable class aliases
    #[serde(default)]
    pub projectiles: IndexMap<String, String>,
    /// Generator name aliases
    #[serde(default)]
    pub generators: IndexMap<String, String>,
}
