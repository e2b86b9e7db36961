use layered_text::LayerError;
use thiserror::Error;

/// Errors raised while converting layers and texts.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The record describes an invalid layer.
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Layers whose parent or enveloped layer is missing from the record.
    #[error("cannot restore the layers {layers:?}: their dependencies are missing from the text")]
    UnresolvedLayers { layers: Vec<String> },
}

pub type ConvertResult<T> = Result<T, ConvertError>;
