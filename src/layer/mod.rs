//! Layers: named, schema-bearing, ordered collections of spans.

mod display;
mod schema;
mod view;

pub use display::LayerDisplay;
pub use schema::{LayerBuilder, LayerRelation, LayerSchema};
pub use view::{AttributeList, LayerView};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::{Index, RangeBounds};

use tracing::debug;

use crate::{
    Annotation, BaseSpan, EnvelopingSpan, LayerError, LayerResult, Span, SpanMut, Text, Value,
};

/// A named collection of spans sharing one schema.
///
/// Spans are kept sorted by base span and at most one span exists per base
/// span. Ambiguity lives inside spans: an ambiguous layer stores several
/// annotations on one span instead of several spans at one position.
///
/// A clone is detached: it does not inherit the layers depending on the
/// original, so only an explicit [`Layer::freeze`] keeps it frozen.
#[derive(Debug)]
pub struct Layer {
    schema: LayerSchema,
    /// Name of the root of the parent chain.
    base: String,
    meta: BTreeMap<String, Value>,
    spans: Vec<Span>,
    positions: HashMap<BaseSpan, usize>,
    frozen: bool,
    dependents: BTreeSet<String>,
}

impl Layer {
    pub fn builder(name: impl Into<String>) -> LayerBuilder {
        LayerBuilder::new(name)
    }

    pub(crate) fn from_schema(schema: LayerSchema, meta: BTreeMap<String, Value>) -> Self {
        let base = schema
            .parent()
            .unwrap_or_else(|| schema.name())
            .to_string();
        Self {
            schema,
            base,
            meta,
            spans: Vec::new(),
            positions: HashMap::new(),
            frozen: false,
            dependents: BTreeSet::new(),
        }
    }

    pub fn schema(&self) -> &LayerSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn attributes(&self) -> &[String] {
        self.schema.attributes()
    }

    pub fn parent(&self) -> Option<&str> {
        self.schema.parent()
    }

    pub fn enveloping(&self) -> Option<&str> {
        self.schema.enveloping()
    }

    pub fn relation(&self) -> &LayerRelation {
        self.schema.relation()
    }

    pub fn ambiguous(&self) -> bool {
        self.schema.ambiguous()
    }

    pub fn default_values(&self) -> &BTreeMap<String, Value> {
        self.schema.default_values()
    }

    /// Name of the layer at the root of the parent chain.
    ///
    /// Layers with the same base are commensurable: their spans share base
    /// spans.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub(crate) fn set_base(&mut self, base: String) {
        self.base = base;
    }

    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.meta
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn span(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    pub fn start(&self) -> Option<usize> {
        self.spans.first().map(Span::start)
    }

    pub fn end(&self) -> Option<usize> {
        self.spans.iter().map(Span::end).max()
    }

    pub fn get(&self, base_span: &BaseSpan) -> Option<&Span> {
        self.position_of(base_span).map(|index| &self.spans[index])
    }

    pub fn contains(&self, base_span: &BaseSpan) -> bool {
        self.positions.contains_key(base_span)
    }

    pub fn position_of(&self, base_span: &BaseSpan) -> Option<usize> {
        self.positions.get(base_span).copied()
    }

    /// Spans matching `base_span`, reducing it first when it is of a higher
    /// level than the spans of this layer.
    pub fn get_reduced(&self, base_span: &BaseSpan) -> LayerResult<Vec<&Span>> {
        let level = match self.spans.first() {
            Some(span) => span.level(),
            None => return Ok(Vec::new()),
        };
        base_span
            .reduce(level)?
            .into_iter()
            .map(|reduced| {
                self.get(reduced).ok_or_else(|| LayerError::SpanNotFound {
                    layer: self.name().to_string(),
                    position: reduced.raw(),
                })
            })
            .collect()
    }

    /// Span at `base_span` viewed as an envelope. `None` unless this layer is
    /// enveloping and has a span there.
    pub fn enveloping_span(&self, base_span: &BaseSpan) -> Option<EnvelopingSpan<'_>> {
        self.get(base_span)
            .and_then(|span| EnvelopingSpan::new(self, span))
    }

    pub fn enveloping_spans(&self) -> impl Iterator<Item = EnvelopingSpan<'_>> + '_ {
        self.spans
            .iter()
            .filter_map(move |span| EnvelopingSpan::new(self, span))
    }

    /// Text fragments of all spans, in order.
    pub fn text<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        let mut fragments = Vec::new();
        for span in &self.spans {
            fragments.extend(span.text(text)?);
        }
        Some(fragments)
    }

    /// Frozen layers reject mutation. A layer is frozen while other layers
    /// of its text depend on it.
    pub fn is_frozen(&self) -> bool {
        self.frozen || !self.dependents.is_empty()
    }

    pub fn freeze(&mut self) {
        debug!(layer = self.name(), "froze layer");
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) -> LayerResult<()> {
        if !self.dependents.is_empty() {
            return Err(LayerError::LayerHasDependents {
                layer: self.name().to_string(),
                dependents: self.dependents.iter().cloned().collect(),
            });
        }
        debug!(layer = self.name(), "unfroze layer");
        self.frozen = false;
        Ok(())
    }

    /// Names of the attached layers that use this one as parent or enveloped layer.
    pub fn dependents(&self) -> impl Iterator<Item = &str> + '_ {
        self.dependents.iter().map(String::as_str)
    }

    pub(crate) fn add_dependent(&mut self, name: &str) {
        self.dependents.insert(name.to_string());
    }

    pub(crate) fn remove_dependent(&mut self, name: &str) {
        self.dependents.remove(name);
    }

    pub(crate) fn clear_dependents(&mut self) {
        self.dependents.clear();
    }

    /// Copy that keeps the dependents, for cloning a whole text.
    pub(crate) fn attached_copy(&self) -> Self {
        Self {
            dependents: self.dependents.clone(),
            ..self.clone()
        }
    }

    fn ensure_mutable(&self) -> LayerResult<()> {
        if self.is_frozen() {
            return Err(LayerError::FrozenLayer {
                layer: self.name().to_string(),
            });
        }
        Ok(())
    }

    /// Adds a complete span.
    ///
    /// On an ambiguous layer the annotations are merged into the span already
    /// at that position, if any. On an unambiguous layer an occupied position
    /// is an error unless the span there is identical.
    pub fn add_span(&mut self, span: Span) -> LayerResult<&Span> {
        self.ensure_mutable()?;
        self.schema.check_base_span(span.base_span())?;
        let count = span.annotations().len();
        if count == 0 {
            return Err(LayerError::MissingAnnotations {
                layer: self.name().to_string(),
                position: span.base_span().raw(),
            });
        }
        if !self.ambiguous() && count > 1 {
            return Err(LayerError::TooManyAnnotations {
                layer: self.name().to_string(),
                position: span.base_span().raw(),
                count,
            });
        }

        let base_span = span.base_span().clone();
        let annotations = span
            .take_annotations()
            .into_iter()
            .map(|annotation| self.schema.conform(annotation))
            .collect::<LayerResult<Vec<_>>>()?;

        let index = match self.position_of(&base_span) {
            Some(index) if self.ambiguous() => {
                for annotation in annotations {
                    self.spans[index].push_annotation(&self.schema, annotation)?;
                }
                index
            }
            Some(index) => {
                if self.spans[index].annotations() != annotations.as_slice() {
                    return Err(LayerError::DuplicatePosition {
                        layer: self.name().to_string(),
                        position: base_span.raw(),
                    });
                }
                index
            }
            None => {
                let mut span = Span::new(base_span);
                *span.annotations_mut() = annotations;
                span.dedup_annotations();
                self.insert_span(span)
            }
        };
        Ok(&self.spans[index])
    }

    /// Adds one annotation at `base_span`, creating the span if needed.
    pub fn add_annotation(
        &mut self,
        base_span: impl Into<BaseSpan>,
        annotation: impl Into<Annotation>,
    ) -> LayerResult<&Annotation> {
        let base_span = base_span.into();
        self.ensure_mutable()?;
        self.schema.check_base_span(&base_span)?;
        let annotation = self.schema.conform(annotation.into())?;

        let index = match self.position_of(&base_span) {
            Some(index) => index,
            None => self.insert_span(Span::new(base_span)),
        };
        let position = self.spans[index].push_annotation(&self.schema, annotation)?;
        Ok(&self.spans[index].annotations()[position])
    }

    pub fn remove_span(&mut self, base_span: &BaseSpan) -> LayerResult<Span> {
        self.ensure_mutable()?;
        let index = self
            .position_of(base_span)
            .ok_or_else(|| LayerError::SpanNotFound {
                layer: self.name().to_string(),
                position: base_span.raw(),
            })?;
        let span = self.spans.remove(index);
        self.positions.remove(base_span);
        self.reindex_from(index);
        Ok(span)
    }

    /// Keeps only the spans for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F) -> LayerResult<()>
    where
        F: FnMut(&Span) -> bool,
    {
        self.ensure_mutable()?;
        self.spans.retain(|span| keep(span));
        self.positions.clear();
        self.reindex_from(0);
        Ok(())
    }

    pub fn span_mut(&mut self, base_span: &BaseSpan) -> LayerResult<SpanMut<'_>> {
        self.ensure_mutable()?;
        match self.positions.get(base_span) {
            Some(&index) => Ok(SpanMut::new(&self.schema, &mut self.spans[index])),
            None => Err(LayerError::SpanNotFound {
                layer: self.name().to_string(),
                position: base_span.raw(),
            }),
        }
    }

    /// Visits every span mutably, in order.
    pub fn for_each_span_mut<F>(&mut self, mut f: F) -> LayerResult<()>
    where
        F: FnMut(SpanMut<'_>) -> LayerResult<()>,
    {
        self.ensure_mutable()?;
        for span in self.spans.iter_mut() {
            f(SpanMut::new(&self.schema, span))?;
        }
        Ok(())
    }

    /// Replaces the attribute list. Attributes that are dropped disappear
    /// from every annotation, new ones get their default value.
    pub fn set_attributes<I, S>(&mut self, attributes: I) -> LayerResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_mutable()?;
        self.schema
            .set_attributes(attributes.into_iter().map(Into::into).collect())?;
        let schema = &self.schema;
        for span in self.spans.iter_mut() {
            for annotation in span.annotations_mut().iter_mut() {
                annotation.retain_names(|name| schema.has_attribute(name));
                for attribute in schema.attributes() {
                    if !annotation.contains(attribute) {
                        annotation.set(attribute.clone(), schema.default_value(attribute));
                    }
                }
            }
            span.dedup_annotations();
        }
        Ok(())
    }

    /// Verifies the structural invariants of the layer.
    pub fn check_span_consistency(&self) -> LayerResult<()> {
        let inconsistent = |reason: String| LayerError::Inconsistent {
            layer: self.name().to_string(),
            reason,
        };

        for (index, span) in self.spans.iter().enumerate() {
            let position = span.base_span().raw();
            if index > 0 && self.spans[index - 1].base_span() >= span.base_span() {
                return Err(inconsistent(format!(
                    "spans are not sorted or repeat the base span {}",
                    position
                )));
            }
            self.schema.check_base_span(span.base_span())?;

            let count = span.annotations().len();
            if count == 0 {
                return Err(LayerError::MissingAnnotations {
                    layer: self.name().to_string(),
                    position,
                });
            }
            if !self.ambiguous() && count > 1 {
                return Err(LayerError::TooManyAnnotations {
                    layer: self.name().to_string(),
                    position,
                    count,
                });
            }

            for (i, annotation) in span.annotations().iter().enumerate() {
                let extra: Vec<&str> = annotation
                    .names()
                    .filter(|name| !self.schema.has_attribute(name))
                    .collect();
                let missing: Vec<&str> = self
                    .attributes()
                    .iter()
                    .map(String::as_str)
                    .filter(|name| !annotation.contains(name))
                    .collect();
                if !extra.is_empty() || !missing.is_empty() {
                    return Err(inconsistent(format!(
                        "annotation attributes of {} differ from the layer attributes: extra {:?}, missing {:?}",
                        position, extra, missing
                    )));
                }
                if span.annotations()[..i].contains(annotation) {
                    return Err(inconsistent(format!(
                        "the span {} has duplicate annotations",
                        position
                    )));
                }
            }

            if self.positions.get(span.base_span()) != Some(&index) {
                return Err(inconsistent(format!(
                    "position index is out of sync at {}",
                    position
                )));
            }
        }

        if self.positions.len() != self.spans.len() {
            return Err(inconsistent(format!(
                "position index has {} entries for {} spans",
                self.positions.len(),
                self.spans.len()
            )));
        }
        Ok(())
    }

    /// Read-only view over all spans.
    pub fn view(&self) -> LayerView<'_> {
        LayerView::new(self, (0..self.spans.len()).collect())
    }

    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> LayerView<'_> {
        self.view().slice(range)
    }

    pub fn indices(&self, indices: &[usize]) -> LayerResult<LayerView<'_>> {
        self.view().indices(indices)
    }

    pub fn mask(&self, mask: &[bool]) -> LayerView<'_> {
        self.view().mask(mask)
    }

    pub fn filter<F>(&self, predicate: F) -> LayerView<'_>
    where
        F: FnMut(&Span) -> bool,
    {
        self.view().filter(predicate)
    }

    /// Spans at the given base spans.
    pub fn select(&self, base_spans: &[BaseSpan]) -> LayerResult<LayerView<'_>> {
        let indices = base_spans
            .iter()
            .map(|base_span| {
                self.position_of(base_span)
                    .ok_or_else(|| LayerError::SpanNotFound {
                        layer: self.name().to_string(),
                        position: base_span.raw(),
                    })
            })
            .collect::<LayerResult<Vec<_>>>()?;
        Ok(LayerView::new(self, indices))
    }

    pub fn attribute_list(&self, attributes: &[&str]) -> LayerResult<AttributeList<'_>> {
        self.view().attribute_list(attributes)
    }

    /// Describes the first difference to `other`, if any.
    pub fn diff(&self, other: &Layer) -> Option<String> {
        let name = self.name();
        if name != other.name() {
            return Some(format!(
                "Layer names are different: {} != {}",
                name,
                other.name()
            ));
        }
        if self.parent() != other.parent() {
            return Some(format!(
                "{} layer parent differs: {:?} != {:?}",
                name,
                self.parent(),
                other.parent()
            ));
        }
        if self.enveloping() != other.enveloping() {
            return Some(format!(
                "{} layer enveloping differs: {:?} != {:?}",
                name,
                self.enveloping(),
                other.enveloping()
            ));
        }
        if self.attributes() != other.attributes() {
            return Some(format!(
                "{} layer attributes differ: {:?} != {:?}",
                name,
                self.attributes(),
                other.attributes()
            ));
        }
        if self.ambiguous() != other.ambiguous() {
            return Some(format!(
                "{} layer ambiguous differs: {} != {}",
                name,
                self.ambiguous(),
                other.ambiguous()
            ));
        }
        if self.default_values() != other.default_values() {
            return Some(format!("{} layer default values differ", name));
        }
        if self.meta != other.meta {
            return Some(format!("{} layer meta differs", name));
        }
        if self.len() != other.len() {
            return Some(format!(
                "{} layer has {} spans, the other has {}",
                name,
                self.len(),
                other.len()
            ));
        }
        self.spans
            .iter()
            .zip(other.spans.iter())
            .find(|(left, right)| left != right)
            .map(|(left, right)| {
                format!(
                    "{} layer spans differ at {} and {}",
                    name,
                    left.base_span(),
                    right.base_span()
                )
            })
    }

    pub fn display<'a>(&self, text: &'a Text) -> LayerDisplay<'a> {
        LayerDisplay::new(text).with(self)
    }

    fn insert_span(&mut self, span: Span) -> usize {
        let index = match self.spans.last() {
            None => 0,
            Some(last) if last.base_span() < span.base_span() => self.spans.len(),
            Some(_) => self
                .spans
                .partition_point(|existing| existing.base_span() < span.base_span()),
        };
        self.positions.insert(span.base_span().clone(), index);
        self.spans.insert(index, span);
        self.reindex_from(index + 1);
        index
    }

    fn reindex_from(&mut self, from: usize) {
        for (index, span) in self.spans.iter().enumerate().skip(from) {
            match self.positions.get_mut(span.base_span()) {
                Some(slot) => *slot = index,
                None => {
                    self.positions.insert(span.base_span().clone(), index);
                }
            }
        }
    }
}

impl Clone for Layer {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            base: self.base.clone(),
            meta: self.meta.clone(),
            spans: self.spans.clone(),
            positions: self.positions.clone(),
            frozen: self.frozen,
            dependents: BTreeSet::new(),
        }
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_none()
    }
}

impl Index<usize> for Layer {
    type Output = Span;

    fn index(&self, index: usize) -> &Span {
        &self.spans[index]
    }
}

impl<'a> IntoIterator for &'a Layer {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
