//! Plain records mirroring layers and texts.

use std::collections::BTreeMap;

use layered_text::{Annotation, Layer, RawSpan, Span, Text, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConvertError, ConvertResult};

/// Serializable form of a [`Layer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub attributes: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub enveloping: Option<String>,
    #[serde(default)]
    pub ambiguous: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_values: BTreeMap<String, Value>,
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
    pub spans: Vec<SpanRecord>,
}

/// One span: its raw position and its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub base_span: RawSpan,
    pub annotations: Vec<Annotation>,
}

/// Serializable form of a [`Text`]. Layers come after the layers they
/// depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
}

pub fn layer_to_record(layer: &Layer) -> LayerRecord {
    LayerRecord {
        name: layer.name().to_string(),
        attributes: layer.attributes().to_vec(),
        parent: layer.parent().map(str::to_string),
        enveloping: layer.enveloping().map(str::to_string),
        ambiguous: layer.ambiguous(),
        default_values: layer.default_values().clone(),
        meta: layer.meta().clone(),
        spans: layer
            .iter()
            .map(|span| SpanRecord {
                base_span: span.base_span().raw(),
                annotations: span.annotations().to_vec(),
            })
            .collect(),
    }
}

/// Rebuilds a detached layer, validating every span against the schema.
pub fn record_to_layer(record: LayerRecord) -> ConvertResult<Layer> {
    let mut builder = Layer::builder(record.name)
        .attributes(record.attributes)
        .ambiguous(record.ambiguous);
    if let Some(parent) = record.parent {
        builder = builder.parent(parent);
    }
    if let Some(enveloping) = record.enveloping {
        builder = builder.enveloping(enveloping);
    }
    for (attribute, value) in record.default_values {
        builder = builder.default_value(attribute, value);
    }
    for (key, value) in record.meta {
        builder = builder.meta(key, value);
    }

    let mut layer = builder.build()?;
    for span in record.spans {
        let span = span
            .annotations
            .into_iter()
            .fold(Span::new(span.base_span.to_base_span()?), Span::with_annotation);
        layer.add_span(span)?;
    }
    Ok(layer)
}

pub fn text_to_record(text: &Text) -> TextRecord {
    TextRecord {
        text: text.text().to_string(),
        meta: text.meta().clone(),
        layers: text.sorted_layers().into_iter().map(layer_to_record).collect(),
    }
}

/// Rebuilds a text with all its layers. Records may come in any order;
/// a layer is attached once the layer it depends on is attached.
pub fn record_to_text(record: TextRecord) -> ConvertResult<Text> {
    let mut text = Text::new(record.text);
    *text.meta_mut() = record.meta;

    let mut pending = record.layers;
    while !pending.is_empty() {
        let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|layer| {
            layer
                .parent
                .as_deref()
                .or(layer.enveloping.as_deref())
                .map_or(true, |dependency| text.contains_layer(dependency))
        });
        if ready.is_empty() {
            return Err(ConvertError::UnresolvedLayers {
                layers: waiting.into_iter().map(|layer| layer.name).collect(),
            });
        }
        for layer in ready {
            debug!(layer = %layer.name, spans = layer.spans.len(), "restoring layer");
            text.add_layer(record_to_layer(layer)?)?;
        }
        pending = waiting;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use layered_text::BaseSpan;

    use super::*;

    #[test]
    fn test_record_keeps_schema_and_spans() {
        let mut layer = Layer::builder("morph")
            .attributes(["lemma", "pos"])
            .parent("words")
            .ambiguous(true)
            .default_value("pos", "S")
            .meta("source", "manual")
            .build()
            .unwrap();
        let position = BaseSpan::elementary(0, 4).unwrap();
        layer
            .add_annotation(position.clone(), Annotation::from([("lemma", "kass")]))
            .unwrap();
        layer
            .add_annotation(position, Annotation::from([("lemma", "kass"), ("pos", "V")]))
            .unwrap();

        let record = layer_to_record(&layer);
        assert_eq!(record.parent.as_deref(), Some("words"));
        assert_eq!(record.spans.len(), 1);
        assert_eq!(record.spans[0].annotations.len(), 2);
        assert_eq!(record.spans[0].base_span, RawSpan::Elementary(0, 4));

        let restored = record_to_layer(record).unwrap();
        assert_eq!(restored.diff(&layer), None);
        assert_eq!(restored.meta().get("source"), Some(&Value::from("manual")));
    }

    #[test]
    fn test_record_spans_are_validated() {
        let record = LayerRecord {
            name: "words".to_string(),
            attributes: vec!["normalized".to_string()],
            parent: None,
            enveloping: None,
            ambiguous: false,
            default_values: BTreeMap::new(),
            meta: BTreeMap::new(),
            spans: vec![SpanRecord {
                base_span: RawSpan::Elementary(0, 4),
                annotations: vec![
                    Annotation::from([("normalized", "kass")]),
                    Annotation::from([("normalized", "kas")]),
                ],
            }],
        };
        let error = record_to_layer(record).unwrap_err();
        assert!(matches!(
            error,
            ConvertError::Layer(layered_text::LayerError::TooManyAnnotations { count: 2, .. })
        ));
    }

    #[test]
    fn test_missing_dependency_is_reported() {
        let record = TextRecord {
            text: "Kass".to_string(),
            meta: BTreeMap::new(),
            layers: vec![LayerRecord {
                name: "morph".to_string(),
                attributes: Vec::new(),
                parent: Some("words".to_string()),
                enveloping: None,
                ambiguous: true,
                default_values: BTreeMap::new(),
                meta: BTreeMap::new(),
                spans: Vec::new(),
            }],
        };
        let error = record_to_text(record).unwrap_err();
        assert_eq!(
            error.to_string(),
            "cannot restore the layers [\"morph\"]: their dependencies are missing from the text"
        );
    }
}
