//! Registry of allowed mutation classes.
//!
//! The catalog is declarative: an `index.yaml` in the mutation directory
//! lists the classes, and each class points at a plain-text instruction file
//! handed to the decision process when that class is chosen for a rewrite.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One entry in the YAML index file.
#[derive(Debug, Deserialize)]
struct IndexEntry {
    name: String,
    description: String,
    isolated: bool,
}

/// A named category of synthetic defect.
#[derive(Debug, Clone)]
pub struct MutationClass {
    /// Unique key the decision process uses to select this class
    pub name: String,
    /// Human-readable description shown in selection context
    pub description: String,
    /// Plain-text rewrite instructions for this class
    pub instruction_file: PathBuf,
    /// Isolated classes are rewritten from the target line alone; dependent
    /// classes see the whole region as context
    pub isolated: bool,
}

impl MutationClass {
    /// Read this class's instruction text.
    pub fn instructions(&self) -> Result<String> {
        std::fs::read_to_string(&self.instruction_file).with_context(|| {
            format!(
                "failed to read mutation instructions from {}",
                self.instruction_file.display()
            )
        })
    }
}

/// Ordered collection of mutation classes, loaded once per campaign.
#[derive(Debug, Clone, Default)]
pub struct MutationCatalog {
    classes: Vec<MutationClass>,
}

impl MutationCatalog {
    /// Load the catalog from `<dir>/index.yaml`. Instruction files live next
    /// to the index as `<name>.txt`.
    pub fn load(dir: &Path) -> Result<Self> {
        let index_path = dir.join("index.yaml");
        let contents = std::fs::read_to_string(&index_path)
            .with_context(|| format!("failed to read mutation index {}", index_path.display()))?;
        let entries: Vec<IndexEntry> = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse mutation index {}", index_path.display()))?;
        let classes = entries
            .into_iter()
            .map(|entry| {
                let instruction_file = dir.join(format!("{}.txt", entry.name));
                MutationClass {
                    name: entry.name,
                    description: entry.description,
                    instruction_file,
                    isolated: entry.isolated,
                }
            })
            .collect();
        tracing::debug!("loaded mutation catalog from {}", index_path.display());
        Ok(Self { classes })
    }

    /// Build a catalog from already-constructed classes.
    pub fn from_classes(classes: Vec<MutationClass>) -> Self {
        Self { classes }
    }

    /// Look up a class by name.
    ///
    /// A miss returns `None`, never an error: the caller treats the decision
    /// process's selection as invalid and may retry.
    pub fn find_by_name(&self, name: &str) -> Option<&MutationClass> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// The classes in index order.
    pub fn classes(&self) -> &[MutationClass] {
        &self.classes
    }

    /// Number of classes in the catalog.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when the catalog holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Display for MutationCatalog {
    /// Numbered `N. name: description` listing used in selection context.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes.iter().enumerate() {
            writeln!(f, "{}. {}: {}", i + 1, class.name, class.description)?;
        }
        Ok(())
    }
}
