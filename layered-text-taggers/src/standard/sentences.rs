use layered_text::{layer_schema, Annotation, BaseSpan, Layer, Text};
use unicode_segmentation::UnicodeSegmentation;

use crate::{input_layer, DetachedLayers, Tagger, TaggerResult};

use super::{Tokens, EMPTY};

layer_schema! {
    /// Sentences enveloping the tokens they contain.
    pub struct Sentences {
        layer: "sentences",
        attributes {}
    }
}

/// Groups tokens into sentences at Unicode sentence boundaries.
#[derive(Debug, Clone)]
pub struct SentenceTagger {
    input_layers: Vec<String>,
}

impl SentenceTagger {
    pub fn new() -> Self {
        Self {
            input_layers: vec![Tokens::LAYER.to_string()],
        }
    }
}

impl Default for SentenceTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for SentenceTagger {
    fn name(&self) -> &str {
        "SentenceTagger"
    }

    fn output_layer(&self) -> &str {
        Sentences::LAYER
    }

    fn output_attributes(&self) -> &[String] {
        EMPTY
    }

    fn input_layers(&self) -> &[String] {
        &self.input_layers
    }

    fn build_layer(&self, text: &Text, layers: &DetachedLayers) -> TaggerResult<Layer> {
        let tokens = input_layer(text, layers, Tokens::LAYER)?;
        let mut layer = Sentences::builder().enveloping(Tokens::LAYER).build()?;

        let mut remaining = tokens.iter().peekable();
        for (start, sentence) in text.text().split_sentence_bound_indices() {
            let end = start + sentence.len();
            let mut children = Vec::new();
            while let Some(token) = remaining.next_if(|token| token.end() <= end) {
                if token.start() >= start {
                    children.push(token.base_span().clone());
                }
            }
            if children.is_empty() {
                continue;
            }
            layer.add_annotation(BaseSpan::enveloping(children)?, Annotation::new())?;
        }
        Ok(layer)
    }
}
