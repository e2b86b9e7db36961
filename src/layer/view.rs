use std::ops::{Bound, RangeBounds};

use crate::{Layer, LayerError, LayerResult, LayerSchema, Span, Value};

static NULL: Value = Value::Null;

/// A non-mutating selection of spans of one layer.
///
/// Views share the layer's schema and base, so a view of a parent-derived
/// layer is still commensurable with the layers its source is.
#[derive(Debug, Clone)]
pub struct LayerView<'a> {
    layer: &'a Layer,
    indices: Vec<usize>,
}

impl<'a> LayerView<'a> {
    pub(crate) fn new(layer: &'a Layer, indices: Vec<usize>) -> Self {
        Self { layer, indices }
    }

    pub fn layer(&self) -> &'a Layer {
        self.layer
    }

    pub fn name(&self) -> &'a str {
        self.layer.name()
    }

    pub fn schema(&self) -> &'a LayerSchema {
        self.layer.schema()
    }

    pub fn base(&self) -> &'a str {
        self.layer.base()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn span(&self, index: usize) -> Option<&'a Span> {
        let layer = self.layer;
        self.indices.get(index).map(|&i| &layer.spans()[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Span> + '_ {
        let layer = self.layer;
        self.indices.iter().map(move |&i| &layer.spans()[i])
    }

    /// Sub-view by position; out-of-range bounds are clamped.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> LayerView<'a> {
        let len = self.indices.len();
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        }
        .min(len);
        let indices = if start < end {
            self.indices[start..end].to_vec()
        } else {
            Vec::new()
        };
        LayerView::new(self.layer, indices)
    }

    pub fn indices(&self, indices: &[usize]) -> LayerResult<LayerView<'a>> {
        let selected = indices
            .iter()
            .map(|&index| {
                self.indices
                    .get(index)
                    .copied()
                    .ok_or_else(|| LayerError::IndexOutOfRange {
                        layer: self.name().to_string(),
                        index,
                        len: self.indices.len(),
                    })
            })
            .collect::<LayerResult<Vec<_>>>()?;
        Ok(LayerView::new(self.layer, selected))
    }

    /// Keeps the spans whose flag is set. A mask of the wrong length is
    /// applied up to the shorter of the two lengths.
    pub fn mask(&self, mask: &[bool]) -> LayerView<'a> {
        if mask.len() != self.indices.len() {
            tracing::warn!(
                layer = self.name(),
                mask_len = mask.len(),
                span_count = self.indices.len(),
                "mask length does not match the number of spans"
            );
        }
        let indices = self
            .indices
            .iter()
            .zip(mask)
            .filter(|(_, &keep)| keep)
            .map(|(&index, _)| index)
            .collect();
        LayerView::new(self.layer, indices)
    }

    pub fn filter<F>(&self, mut predicate: F) -> LayerView<'a>
    where
        F: FnMut(&Span) -> bool,
    {
        let layer = self.layer;
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&index| predicate(&layer.spans()[index]))
            .collect();
        LayerView::new(layer, indices)
    }

    /// Values of the given attributes for every span and annotation.
    pub fn attribute_list(&self, attributes: &[&str]) -> LayerResult<AttributeList<'a>> {
        if attributes.is_empty() {
            return Err(LayerError::NoAttributes {
                layer: self.name().to_string(),
            });
        }
        let schema = self.schema();
        for attribute in attributes {
            schema.check_attribute(attribute)?;
        }

        let rows = self
            .iter()
            .map(|span| {
                span.annotations()
                    .iter()
                    .map(|annotation| {
                        attributes
                            .iter()
                            .map(|attribute| annotation.get(attribute).unwrap_or(&NULL))
                            .collect::<Vec<&'a Value>>()
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Ok(AttributeList {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            ambiguous: schema.ambiguous(),
            rows,
        })
    }

    /// Detached copy of the selected spans.
    pub fn to_layer(&self) -> Layer {
        let mut layer = Layer::from_schema(self.layer.schema().clone(), self.layer.meta().clone());
        layer.set_base(self.layer.base().to_string());
        for span in self.iter() {
            if layer.contains(span.base_span()) {
                continue;
            }
            let mut copy = Span::new(span.base_span().clone());
            *copy.annotations_mut() = span.annotations().to_vec();
            layer.insert_span(copy);
        }
        layer
    }
}

/// Attribute values of a layer as nested rows: one row per span, one entry
/// per annotation, one value per selected attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeList<'a> {
    attributes: Vec<String>,
    ambiguous: bool,
    rows: Vec<Vec<Vec<&'a Value>>>,
}

impl<'a> AttributeList<'a> {
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Vec<&'a Value>>] {
        &self.rows
    }

    /// Values of one attribute, per span and annotation.
    pub fn column(&self, attribute: &str) -> Option<Vec<Vec<&'a Value>>> {
        let position = self.attributes.iter().position(|a| a == attribute)?;
        Some(
            self.rows
                .iter()
                .map(|annotations| {
                    annotations
                        .iter()
                        .map(|values| values[position])
                        .collect::<Vec<_>>()
                })
                .collect(),
        )
    }

    /// Values of the first annotation of every span.
    pub fn first_values(&self) -> Vec<&[&'a Value]> {
        self.rows
            .iter()
            .filter_map(|annotations| annotations.first().map(Vec::as_slice))
            .collect()
    }
}
