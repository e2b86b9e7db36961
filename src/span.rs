//! Spans: a base span plus its annotations.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::OnceCell;

use crate::{Annotation, BaseSpan, LayerError, LayerResult, LayerSchema, Value};

/// A positioned annotation unit.
///
/// A span on an unambiguous layer holds exactly one annotation, a span on an
/// ambiguous layer holds one or more distinct annotations.
#[derive(Clone)]
pub struct Span {
    base_span: BaseSpan,
    annotations: Vec<Annotation>,
    /// Indices of the constituents in the enveloped layer.
    pub(crate) constituents: OnceCell<Vec<usize>>,
}

impl Span {
    pub fn new(base_span: impl Into<BaseSpan>) -> Self {
        Self {
            base_span: base_span.into(),
            annotations: Vec::new(),
            constituents: OnceCell::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn base_span(&self) -> &BaseSpan {
        &self.base_span
    }

    pub fn start(&self) -> usize {
        self.base_span.start()
    }

    pub fn end(&self) -> usize {
        self.base_span.end()
    }

    pub fn level(&self) -> usize {
        self.base_span.level()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The first annotation; the only one on unambiguous layers.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotations.first()
    }

    /// Value of `attribute` in the first annotation.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.annotation().and_then(|annotation| annotation.get(attribute))
    }

    /// Values of `attribute` across all annotations.
    pub fn values(&self, attribute: &str) -> Vec<&Value> {
        self.annotations
            .iter()
            .filter_map(|annotation| annotation.get(attribute))
            .collect()
    }

    pub fn is_enveloping(&self) -> bool {
        self.base_span.is_enveloping()
    }

    /// Text fragments covered by the span, one per elementary span.
    pub fn text<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        self.base_span
            .flatten()
            .map(|piece| text.get(piece.start()..piece.end()))
            .collect()
    }

    /// Text from the span's start to its end, gaps included.
    pub fn enclosing_text<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.start()..self.end())
    }

    pub(crate) fn take_annotations(self) -> Vec<Annotation> {
        self.annotations
    }

    /// Adds an already conformed annotation. Returns its index.
    pub(crate) fn push_annotation(
        &mut self,
        schema: &LayerSchema,
        annotation: Annotation,
    ) -> LayerResult<usize> {
        if let Some(index) = self.annotations.iter().position(|a| *a == annotation) {
            return Ok(index);
        }
        if !schema.ambiguous() && !self.annotations.is_empty() {
            return Err(LayerError::AlreadyAnnotated {
                layer: schema.name().to_string(),
                position: self.base_span.raw(),
            });
        }
        self.annotations.push(annotation);
        Ok(self.annotations.len() - 1)
    }

    /// Drops annotations equal to an earlier one.
    pub(crate) fn dedup_annotations(&mut self) {
        let mut unique: Vec<Annotation> = Vec::with_capacity(self.annotations.len());
        for annotation in self.annotations.drain(..) {
            if !unique.contains(&annotation) {
                unique.push(annotation);
            }
        }
        self.annotations = unique;
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        &mut self.annotations
    }

    pub(crate) fn same_annotations(&self, other: &Span) -> bool {
        self.annotations.len() == other.annotations.len()
            && self
                .annotations
                .iter()
                .all(|annotation| other.annotations.contains(annotation))
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.base_span == other.base_span && self.same_annotations(other)
    }
}

impl Hash for Span {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_span.hash(state);
    }
}

/// Positional; spans at one position with different annotations are unordered.
impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.base_span.cmp(&other.base_span) {
            Ordering::Equal if !self.same_annotations(other) => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("base_span", &self.base_span.raw())
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Mutable access to one span of a layer.
///
/// Every write goes through the layer's schema, so the span keeps the
/// layer's attributes and ambiguity rule.
pub struct SpanMut<'a> {
    schema: &'a LayerSchema,
    span: &'a mut Span,
}

impl<'a> SpanMut<'a> {
    pub(crate) fn new(schema: &'a LayerSchema, span: &'a mut Span) -> Self {
        Self { schema, span }
    }

    pub fn span(&self) -> &Span {
        self.span
    }

    pub fn base_span(&self) -> &BaseSpan {
        &self.span.base_span
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.span.annotations
    }

    /// Adds an annotation; identical annotations are not duplicated.
    pub fn add_annotation(&mut self, annotation: impl Into<Annotation>) -> LayerResult<&Annotation> {
        let annotation = self.schema.conform(annotation.into())?;
        let index = self.span.push_annotation(self.schema, annotation)?;
        Ok(&self.span.annotations[index])
    }

    /// Writes `value` to `attribute` of every annotation of the span.
    pub fn set_attribute(&mut self, attribute: &str, value: impl Into<Value>) -> LayerResult<()> {
        let value = value.into();
        self.schema.check_value(attribute, &value)?;
        for annotation in &mut self.span.annotations {
            annotation.set(attribute, value.clone());
        }
        self.span.dedup_annotations();
        Ok(())
    }

    /// Writes `value` to `attribute` of a single annotation.
    pub fn set_annotation_attribute(
        &mut self,
        index: usize,
        attribute: &str,
        value: impl Into<Value>,
    ) -> LayerResult<()> {
        let schema = self.schema;
        let value = value.into();
        schema.check_value(attribute, &value)?;
        let len = self.span.annotations.len();
        let annotation = self
            .span
            .annotations
            .get_mut(index)
            .ok_or_else(|| LayerError::IndexOutOfRange {
                layer: schema.name().to_string(),
                index,
                len,
            })?;
        annotation.set(attribute, value);
        self.span.dedup_annotations();
        Ok(())
    }

    /// Removes one annotation. The last annotation of a span cannot be removed.
    pub fn remove_annotation(&mut self, index: usize) -> LayerResult<Annotation> {
        let len = self.span.annotations.len();
        if index >= len {
            return Err(LayerError::IndexOutOfRange {
                layer: self.schema.name().to_string(),
                index,
                len,
            });
        }
        if len == 1 {
            return Err(LayerError::MissingAnnotations {
                layer: self.schema.name().to_string(),
                position: self.span.base_span.raw(),
            });
        }
        Ok(self.span.annotations.remove(index))
    }

    /// Replaces all annotations at once.
    pub fn replace_annotations<I>(&mut self, annotations: I) -> LayerResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Annotation>,
    {
        let mut replacement = Span::new(self.span.base_span.clone());
        for annotation in annotations {
            let annotation = self.schema.conform(annotation.into())?;
            replacement.push_annotation(self.schema, annotation)?;
        }
        if replacement.annotations.is_empty() {
            return Err(LayerError::MissingAnnotations {
                layer: self.schema.name().to_string(),
                position: self.span.base_span.raw(),
            });
        }
        self.span.annotations = replacement.annotations;
        Ok(())
    }
}
