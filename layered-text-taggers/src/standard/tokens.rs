use layered_text::{layer_schema, Annotation, BaseSpan, Layer, Text};
use unicode_segmentation::UnicodeSegmentation;

use crate::{DetachedLayers, Tagger, TaggerResult};

use super::EMPTY;

layer_schema! {
    /// Word tokens at Unicode word boundaries.
    pub struct Tokens {
        layer: "tokens",
        attributes { normalized }
    }
}

/// Splits the text at Unicode word boundaries and keeps every segment that
/// is not whitespace. `normalized` is left unset.
#[derive(Debug, Clone)]
pub struct TokensTagger {
    output_attributes: Vec<String>,
}

impl TokensTagger {
    pub fn new() -> Self {
        Self {
            output_attributes: Tokens::ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for TokensTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for TokensTagger {
    fn name(&self) -> &str {
        "TokensTagger"
    }

    fn output_layer(&self) -> &str {
        Tokens::LAYER
    }

    fn output_attributes(&self) -> &[String] {
        &self.output_attributes
    }

    fn input_layers(&self) -> &[String] {
        EMPTY
    }

    fn build_layer(&self, text: &Text, _layers: &DetachedLayers) -> TaggerResult<Layer> {
        let mut layer = Tokens::builder().build()?;
        for (start, word) in text.text().split_word_bound_indices() {
            if word.chars().all(char::is_whitespace) {
                continue;
            }
            let base_span = BaseSpan::elementary(start, start + word.len())?;
            layer.add_annotation(base_span, Annotation::new())?;
        }
        Ok(layer)
    }
}
