//! Loading option sets from JSON or YAML definitions.
//!
//! Handlers cannot be serialized, so a loaded set has commands that are
//! groupings only until the program attaches handlers.
//!
//! # Example YAML
//!
//! ```yaml
//! usage: "Usage: tool [options...] <command>"
//! options:
//!   - { short: v, long: verbose, summary: Be chatty }
//! commands:
//!   - name: copy
//!     params: "<src> <dst>"
//!     usage: Copy a file
//!     options:
//!       - { long: force, summary: Overwrite the destination }
//!   - name: end
//!     ignore_after: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::OptionSet;

/// Errors that can occur while loading or saving a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension names no supported format.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`DefinitionError`].
pub(crate) type Result<T> = std::result::Result<T, DefinitionError>;

/// Serialization formats a definition can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
}

impl DefinitionFormat {
    /// Picks a format from a file extension (`json`, `yaml`, `yml`).
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](DefinitionError::UnsupportedFormat)
    /// for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(DefinitionError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl OptionSet {
    /// Parses a definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](DefinitionError::JsonError) on malformed input.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parses a definition from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](DefinitionError::YamlError) on malformed input.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Serializes this definition as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](DefinitionError::JsonError) if serialization
    /// fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes this definition as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](DefinitionError::YamlError) if serialization
    /// fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Loads a definition file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](DefinitionError::UnsupportedFormat)
    /// for an unknown extension, [`IoError`](DefinitionError::IoError) if
    /// the file cannot be read, or a parse error from the chosen format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "Loading definition");
        let reader = BufReader::new(std::fs::File::open(path)?);
        let set = match format {
            DefinitionFormat::Json => serde_json::from_reader(reader)?,
            DefinitionFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(set)
    }

    /// Saves this definition, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), for writing.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            DefinitionFormat::Json => serde_json::to_writer_pretty(writer, self)?,
            DefinitionFormat::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }
}
