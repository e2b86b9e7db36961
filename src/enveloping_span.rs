//! Borrowed views over the spans of enveloping layers.

use crate::{BaseSpan, EnvelopingBaseSpan, Layer, LayerError, LayerResult, Span, Value};

/// View of a span whose base span envelops spans of another layer.
///
/// Obtained from the owning layer with [`Layer::enveloping_span`] or
/// [`Layer::enveloping_spans`].
#[derive(Debug, Clone, Copy)]
pub struct EnvelopingSpan<'a> {
    layer: &'a str,
    enveloped: &'a str,
    span: &'a Span,
    base_span: &'a EnvelopingBaseSpan,
}

impl<'a> EnvelopingSpan<'a> {
    pub(crate) fn new(layer: &'a Layer, span: &'a Span) -> Option<Self> {
        let enveloped = layer.enveloping()?;
        span.base_span().as_enveloping().map(|base_span| Self {
            layer: layer.name(),
            enveloped,
            span,
            base_span,
        })
    }

    /// Name of the layer holding the constituents.
    pub fn enveloped_layer(&self) -> &'a str {
        self.enveloped
    }

    pub fn span(&self) -> &'a Span {
        self.span
    }

    pub fn base_span(&self) -> &'a EnvelopingBaseSpan {
        self.base_span
    }

    /// Base spans of the constituents.
    pub fn children(&self) -> &'a [BaseSpan] {
        self.base_span.spans()
    }

    pub fn len(&self) -> usize {
        self.base_span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base_span.is_empty()
    }

    pub fn get(&self, attribute: &str) -> Option<&'a Value> {
        self.span.get(attribute)
    }

    /// Constituent spans looked up in the enveloped layer.
    ///
    /// `enveloped` must be the layer named by the owning layer's
    /// `enveloping`. Positions found on the first lookup are cached on the span and
    /// revalidated on every later access, so a constituent removed from the
    /// enveloped layer is reported as [`LayerError::MissingEnvelopedSpan`].
    pub fn spans<'l>(&self, enveloped: &'l Layer) -> LayerResult<Vec<&'l Span>> {
        if enveloped.name() != self.enveloped {
            return Err(LayerError::WrongEnvelopedLayer {
                layer: self.layer.to_string(),
                expected: self.enveloped.to_string(),
                found: enveloped.name().to_string(),
            });
        }
        let children = self.children();

        if let Some(indices) = self.span.constituents.get() {
            let cached: Option<Vec<&'l Span>> = children
                .iter()
                .zip(indices)
                .map(|(child, &index)| {
                    enveloped
                        .spans()
                        .get(index)
                        .filter(|span| span.base_span() == child)
                })
                .collect();
            if let Some(spans) = cached.filter(|spans| spans.len() == children.len()) {
                return Ok(spans);
            }
        }

        let mut indices = Vec::with_capacity(children.len());
        for child in children {
            match enveloped.position_of(child) {
                Some(index) => indices.push(index),
                None => {
                    return Err(LayerError::MissingEnvelopedSpan {
                        enveloped: enveloped.name().to_string(),
                        position: child.raw(),
                    })
                }
            }
        }
        let spans = indices.iter().map(|&index| &enveloped.spans()[index]).collect();
        // A stale cache stays in place; the lookup above is repeated then.
        let _ = self.span.constituents.set(indices);
        Ok(spans)
    }

    /// Text fragments of the elementary spans enveloped by this span.
    pub fn text<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        self.span.text(text)
    }
}
