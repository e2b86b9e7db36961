//! Error types for taggers, the registry and the resolver.

use std::path::PathBuf;

use layered_text::LayerError;
use thiserror::Error;

/// Errors raised while registering or running taggers.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// A layer operation failed.
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// A tagger or retagger ran before one of its input layers existed.
    #[error("{component} requires the input layer {layer:?}, which is missing from the text")]
    MissingInputLayer { component: String, layer: String },

    /// A retagger ran before the layer it changes existed.
    #[error("{component} cannot change the layer {layer:?}: the layer is missing from the text")]
    MissingOutputLayer { component: String, layer: String },

    /// A tagger produced a layer with another name than declared.
    #[error("{component} declares the output layer {expected:?} but created {found:?}")]
    OutputLayerMismatch {
        component: String,
        expected: String,
        found: String,
    },

    /// A tagger produced a layer with other attributes than declared.
    #[error("{component} declares the attributes {expected:?} but created {found:?}")]
    OutputAttributesMismatch {
        component: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Retagger registered for a layer nobody creates.
    #[error("cannot add a retagger for the layer {layer:?}: no tagger for creating the layer")]
    NoTaggerForLayer { layer: String },

    /// Retagger in a registry entry that targets another layer.
    #[error("unexpected output layer {found:?} in {component}, expecting {expected:?}")]
    RetaggerLayerMismatch {
        component: String,
        expected: String,
        found: String,
    },

    /// No registry entry creates the layer.
    #[error("no tagger registered for creating the layer {layer:?}")]
    UnknownLayer { layer: String },

    /// The layer dependency graph has a cycle.
    #[error("the layer graph is not acyclic, circular dependency between {layers:?}")]
    DependencyCycle { layers: Vec<String> },

    /// Tagger-specific failure.
    #[error("{component} failed: {reason}")]
    Failed { component: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse resolver configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for tagger operations.
pub type TaggerResult<T> = Result<T, TaggerError>;
