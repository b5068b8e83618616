//! Name resolution: alias chains and the spawnable class registry

use blastfx_core::ClassDesc;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::warn;

/// An alias indirection table
///
/// Aliases may point at other aliases; `resolve` follows the chain, bounded
/// by the table size so a cycle cannot loop forever.
#[derive(Debug, Clone, Default)]
pub struct AliasList {
    aliases: IndexMap<String, String>,
}

impl AliasList {
    /// Create an empty alias list
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a loaded alias table into this list
    pub fn load(&mut self, table: IndexMap<String, String>) {
        self.aliases.extend(table);
    }

    /// Follow the alias chain for `name` to its final target
    pub fn resolve(&self, name: &str) -> String {
        let mut current = name;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => return current.to_string(),
            }
        }
        warn!(name, "alias chain did not terminate, using last name");
        current.to_string()
    }
}

/// Registry of reflected spawnable class descriptions
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<ClassDesc>>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under its own name
    pub fn register(&mut self, class: Arc<ClassDesc>) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Look up a class by its resolved name
    pub fn get(&self, name: &str) -> Option<&Arc<ClassDesc>> {
        self.classes.get(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
