//! # Generator Configuration
//!
//! Every knob the generator exposes lives here. The command line in `main.rs`
//! maps its flags onto [`GeneratorConfig`]; nothing is read from the
//! environment or from config files, so a run is fully determined by its
//! arguments.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::GenerateError;

/// Longest string literal we emit. MSVC rejects literals much above 16 KiB.
pub const MAX_CHUNK_LENGTH: usize = 16_000;

/// Namespace used when none is given on the command line.
pub const DEFAULT_NAMESPACE: &str = "Resources";

/// Order in which discovered files are turned into declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkOrder {
    /// Sort by relative path so output is reproducible across machines.
    #[default]
    Sorted,
    /// Keep whatever order the directory walk produced.
    Filesystem,
}

/// What to do when two files derive the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Abort with an error naming both files.
    #[default]
    Fail,
    /// Keep the later file's declaration and log a warning.
    Overwrite,
}

/// Settings for a single generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorConfig {
    pub max_chunk_length: usize,
    pub order: WalkOrder,
    pub on_collision: CollisionPolicy,
    /// Follow symbolic links during the walk. Off by default: links are skipped.
    pub follow_links: bool,
    pub namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: MAX_CHUNK_LENGTH,
            order: WalkOrder::default(),
            on_collision: CollisionPolicy::default(),
            follow_links: false,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Rejects settings that would produce an unusable header.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.max_chunk_length == 0 {
            return Err(GenerateError::InvalidConfig {
                reason: "max chunk length must be at least 1".to_string(),
            });
        }
        if !is_cpp_identifier(&self.namespace) {
            return Err(GenerateError::InvalidConfig {
                reason: format!("namespace `{}` is not a valid C++ identifier", self.namespace),
            });
        }
        Ok(())
    }

    /// Include guard macro, e.g. `RESOURCES_H` for namespace `Resources`.
    pub fn include_guard(&self) -> String {
        format!("{}_H", self.namespace.to_ascii_uppercase())
    }
}

fn is_cpp_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
