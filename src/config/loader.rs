//! Configuration loading from disk.
//!
//! Loading never touches a [`ConfigStore`](crate::config::ConfigStore): the
//! caller decides whether to install the result, so a failed read or decode
//! leaves whatever is currently active untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contents did not decode into the expected schema.
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// Reload requested on a store that was built without a source file.
    #[error("no config file specified")]
    NoSourceConfigured,
}

/// Structural decode failure, by format.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Nothing but whitespace, comments or `null`. Usually a file caught
    /// between truncate and write.
    #[error("document is empty")]
    Empty,

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure to serialize a snapshot back to text.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// On-disk syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension. Anything but `.toml` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Decode configuration text in the given format.
///
/// An empty document is an error rather than an all-defaults snapshot.
pub fn decode_config<T: DeserializeOwned>(
    text: &str,
    format: ConfigFormat,
) -> Result<T, DecodeError> {
    if is_blank(text) {
        return Err(DecodeError::Empty);
    }

    let config = match format {
        ConfigFormat::Yaml => {
            let document: serde_yaml::Value = serde_yaml::from_str(text)?;
            if document.is_null() {
                return Err(DecodeError::Empty);
            }
            serde_yaml::from_value(document)?
        }
        ConfigFormat::Toml => toml::from_str(text)?,
    };
    Ok(config)
}

/// Only whitespace and `#` comments, which both formats share.
fn is_blank(text: &str) -> bool {
    text.lines().map(str::trim_start).all(|line| line.is_empty() || line.starts_with('#'))
}

/// Serialize a snapshot in the given format.
pub fn encode_config<T: Serialize>(
    config: &T,
    format: ConfigFormat,
) -> Result<String, EncodeError> {
    let text = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Toml => toml::to_string(config)?,
    };
    Ok(text)
}

/// Read and decode a configuration file.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode_config(&content, ConfigFormat::from_path(path)).map_err(|source| ConfigError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
