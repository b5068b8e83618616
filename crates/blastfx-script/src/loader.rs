//! RON script loader

use crate::error::Result;
use crate::schema::alias::AliasDefs;
use crate::schema::explosion::{ExplosionDef, ExplosionDefs};
use std::fs;
use std::path::Path;

/// Loader for RON explosion scripts
///
/// A parse error in a file rejects the whole file: no partial definitions
/// from it are registered.
#[derive(Debug, Default)]
pub struct Loader {
    explosions: ExplosionDefs,
    aliases: AliasDefs,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single RON file, sniffing its kind from the filename
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if filename.contains("alias") {
            self.load_aliases_str(&content)
        } else {
            self.load_explosions_str(&content)
        }
    }

    /// Load explosion definitions from a RON string
    pub fn load_explosions_str(&mut self, content: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct ExplosionFile {
            explosions: Vec<ExplosionDef>,
        }

        let file: ExplosionFile = ron::from_str(content)?;
        for def in file.explosions {
            self.explosions.insert(def)?;
        }
        Ok(())
    }

    /// Load alias tables from a RON string, extending existing tables
    pub fn load_aliases_str(&mut self, content: &str) -> Result<()> {
        let defs: AliasDefs = ron::from_str(content)?;
        self.aliases.projectiles.extend(defs.projectiles);
        self.aliases.generators.extend(defs.generators);
        Ok(())
    }

    /// Load all RON files from a directory, recursively
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(crate::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Current definitions (for inspection during loading)
    pub fn explosions(&self) -> &ExplosionDefs {
        &self.explosions
    }

    /// Finish loading and return the definition and alias tables
    pub fn finish(self) -> (ExplosionDefs, AliasDefs) {
        (self.explosions, self.aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explosions() {
        let content = r#"
        (
            explosions: [
                (
                    tag: "small_burst",
                    spawns: [
                        (
                            name: "flame",
                            class: Some("heatcloud"),
                            count: 3,
                            ground: true,
                            properties: {
                                "heat": "d0.3r1",
                                "size": "5",
                            },
                        ),
                    ],
                    groundflash: Some((
                        ttl: 30,
                        flash_size: 20.0,
                        flash_alpha: 0.5,
                    )),
                    use_default_explosions: true,
                ),
                (
                    tag: "splash",
                    spawns: [
                        (name: "bubble", water: true, underwater: true),
                    ],
                ),
            ]
        )
        "#;

        let mut loader = Loader::new();
        loader.load_explosions_str(content).unwrap();
        let (defs, _) = loader.finish();

        assert_eq!(defs.len(), 2);
        let burst = defs.get("small_burst").unwrap();
        assert_eq!(burst.spawns.len(), 1);
        assert_eq!(burst.spawns[0].count, 3);
        assert_eq!(burst.spawns[0].class_name(), "heatcloud");
        assert_eq!(
            burst.spawns[0].properties.get("heat").unwrap(),
            "d0.3r1"
        );
        assert_eq!(burst.groundflash.as_ref().unwrap().ttl, 30);
        assert!(burst.use_default_explosions);

        let splash = defs.get("splash").unwrap();
        assert_eq!(splash.spawns[0].count, 1);
        assert!(!splash.use_default_explosions);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let content = r#"
        (
            explosions: [
                (tag: "dup"),
                (tag: "dup"),
            ]
        )
        "#;

        let mut loader = Loader::new();
        let err = loader.load_explosions_str(content).unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateDefinition(_)));
    }

    #[test]
    fn test_parse_error_rejects_file() {
        let mut loader = Loader::new();
        assert!(loader.load_explosions_str("(explosions: [ (tag: ]").is_err());
        assert!(loader.explosions().is_empty());
    }
}
