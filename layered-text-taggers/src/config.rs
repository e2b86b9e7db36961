//! Resolver configuration via TOML file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{TaggerError, TaggerResult};

/// Settings for a [`LayerResolver`](crate::LayerResolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Layers built by [`LayerResolver::tag_defaults`](crate::LayerResolver::tag_defaults).
    pub default_layers: Vec<String>,
    /// Audit the output layer after every retagger.
    pub check_output_consistency: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_layers: Vec::new(),
            check_output_consistency: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_default_layers<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_layers: layers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> TaggerResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> TaggerResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| TaggerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
