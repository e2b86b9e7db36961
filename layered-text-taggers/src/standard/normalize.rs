use layered_text::{Layer, Text};

use crate::{DetachedLayers, Retagger, TaggerResult};

use super::{Tokens, EMPTY};

/// Fills `tokens.normalized` with the lower-cased token text.
#[derive(Debug, Clone)]
pub struct NormalizationRetagger {
    attributes: Vec<String>,
}

impl NormalizationRetagger {
    pub fn new() -> Self {
        Self {
            attributes: Tokens::ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for NormalizationRetagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Retagger for NormalizationRetagger {
    fn name(&self) -> &str {
        "NormalizationRetagger"
    }

    fn output_layer(&self) -> &str {
        Tokens::LAYER
    }

    fn output_attributes(&self) -> &[String] {
        &self.attributes
    }

    fn input_layers(&self) -> &[String] {
        EMPTY
    }

    fn change_layer(
        &self,
        text: &Text,
        _layers: &DetachedLayers,
        layer: &mut Layer,
    ) -> TaggerResult<()> {
        let source = text.text();
        layer.for_each_span_mut(|mut span| {
            let normalized = span.span().enclosing_text(source).map(str::to_lowercase);
            span.set_attribute("normalized", normalized)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use layered_text::Value;

    use super::*;
    use crate::standard::TokensTagger;
    use crate::Tagger;

    #[test]
    fn test_lowercases_tokens() {
        let mut text = Text::new("Kass JOOKSIS");
        TokensTagger::new().tag(&mut text).unwrap();
        NormalizationRetagger::new().retag(&mut text, true).unwrap();

        let normalized: Vec<&Value> = text
            .get_layer("tokens")
            .unwrap()
            .iter()
            .filter_map(|span| Tokens::normalized(span.annotation()?))
            .collect();
        assert_eq!(normalized, [&Value::from("kass"), &Value::from("jooksis")]);
    }

    #[test]
    fn test_changes_a_detached_layer() {
        let text = Text::new("Kass JOOKSIS");
        let mut tokens = TokensTagger::new()
            .make_layer(&text, &DetachedLayers::new())
            .unwrap();
        NormalizationRetagger::new()
            .change_layer(&text, &DetachedLayers::new(), &mut tokens)
            .unwrap();
        assert_eq!(tokens[1].get("normalized"), Some(&Value::from("jooksis")));
    }

    #[test]
    fn test_requires_the_tokens_layer() {
        let mut text = Text::new("Kass");
        let error = NormalizationRetagger::new().retag(&mut text, true).unwrap_err();
        assert_eq!(
            error.to_string(),
            "NormalizationRetagger cannot change the layer \"tokens\": the layer is missing from the text"
        );
    }
}
