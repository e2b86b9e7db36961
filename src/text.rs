//! The text container.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
    AttributeIndex, BaseSpan, Layer, LayerDisplay, LayerError, LayerResult, Span, Value,
};

/// Raw text plus the layers attached to it.
///
/// The container owns the cross-layer bookkeeping: a layer can only be
/// attached after the layer it depends on, and a layer stays frozen while
/// another attached layer depends on it.
#[derive(Debug)]
pub struct Text {
    text: String,
    meta: BTreeMap<String, Value>,
    layers: BTreeMap<String, Layer>,
    attach_order: Vec<String>,
    attribute_index: AttributeIndex,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: BTreeMap::new(),
            layers: BTreeMap::new(),
            attach_order: Vec::new(),
            attribute_index: AttributeIndex::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.meta
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Like [`Text::layer`] but a missing layer is an error.
    pub fn get_layer(&self, name: &str) -> LayerResult<&Layer> {
        self.layers
            .get(name)
            .ok_or_else(|| LayerError::MissingLayer(name.to_string()))
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Layer names in attach order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attach_order
            .iter()
            .map(String::as_str)
            .filter(move |name| self.layers.contains_key(*name))
    }

    /// Layers in attach order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.attach_order
            .iter()
            .filter_map(move |name| self.layers.get(name))
    }

    pub fn attribute_index(&self) -> &AttributeIndex {
        &self.attribute_index
    }

    /// Attaches a layer.
    ///
    /// The layer name must be new and its parent or enveloped layer must be
    /// attached already. The dependency becomes frozen.
    pub fn add_layer(&mut self, mut layer: Layer) -> LayerResult<()> {
        let name = layer.name().to_string();
        if self.layers.contains_key(&name) {
            return Err(LayerError::LayerExists(name));
        }

        let base = match layer.relation().dependency() {
            Some(dependency) => match self.layers.get(dependency) {
                Some(dependency_layer) if layer.parent().is_some() => {
                    dependency_layer.base().to_string()
                }
                Some(_) => name.clone(),
                None => {
                    return Err(LayerError::MissingDependency {
                        layer: name,
                        dependency: dependency.to_string(),
                    })
                }
            },
            None => name.clone(),
        };
        self.check_bounds(&layer)?;

        layer.set_base(base);
        layer.clear_dependents();
        if let Some(dependency) = layer.relation().dependency() {
            if let Some(dependency_layer) = self.layers.get_mut(dependency) {
                dependency_layer.add_dependent(&name);
            }
        }

        debug!(layer = %name, spans = layer.len(), base = layer.base(), "attached layer");
        self.layers.insert(name.clone(), layer);
        self.attach_order.push(name);
        self.rebuild_attribute_index();
        Ok(())
    }

    /// Detaches a layer and returns it.
    ///
    /// A layer other layers depend on can only be removed together with its
    /// dependents, which requires `cascading`.
    pub fn pop_layer(&mut self, name: &str, cascading: bool) -> LayerResult<Layer> {
        let layer = self.get_layer(name)?;
        let dependents: Vec<String> = layer.dependents().map(str::to_string).collect();
        if !dependents.is_empty() {
            if !cascading {
                return Err(LayerError::LayerHasDependents {
                    layer: name.to_string(),
                    dependents,
                });
            }
            for dependent in dependents {
                self.pop_layer(&dependent, true)?;
            }
        }

        let mut layer = self
            .layers
            .remove(name)
            .ok_or_else(|| LayerError::MissingLayer(name.to_string()))?;
        if let Some(dependency) = layer.relation().dependency() {
            if let Some(dependency_layer) = self.layers.get_mut(dependency) {
                dependency_layer.remove_dependent(name);
            }
        }
        self.attach_order.retain(|attached| attached != name);
        self.rebuild_attribute_index();
        layer.clear_dependents();
        debug!(layer = name, cascading, "detached layer");
        Ok(layer)
    }

    /// Swaps an attached layer for a new one with the same name. Returns the
    /// old layer.
    pub fn replace_layer(&mut self, layer: Layer) -> LayerResult<Layer> {
        let name = layer.name().to_string();
        let old = self.pop_layer(&name, false)?;
        if let Err(error) = self.add_layer(layer) {
            self.add_layer(old)?;
            return Err(error);
        }
        Ok(old)
    }

    pub fn unfreeze_layer(&mut self, name: &str) -> LayerResult<()> {
        self.layers
            .get_mut(name)
            .ok_or_else(|| LayerError::MissingLayer(name.to_string()))?
            .unfreeze()
    }

    /// Runs `f` with mutable access to one layer and read access to the rest
    /// of the text.
    ///
    /// The layer is detached for the duration of the call, so `f` does not
    /// see it through the text. If `f` leaves a span outside the text, the
    /// layer is restored to its previous state.
    pub fn with_layer_mut<F, R>(&mut self, name: &str, f: F) -> LayerResult<R>
    where
        F: FnOnce(&Text, &mut Layer) -> R,
    {
        let layer = self.get_layer(name)?;
        if layer.is_frozen() {
            return Err(LayerError::FrozenLayer {
                layer: name.to_string(),
            });
        }
        let mut layer = self
            .layers
            .remove(name)
            .ok_or_else(|| LayerError::MissingLayer(name.to_string()))?;
        let previous = layer.clone();

        let result = f(self, &mut layer);

        let outcome = match self.check_bounds(&layer) {
            Ok(()) => {
                self.layers.insert(name.to_string(), layer);
                Ok(result)
            }
            Err(error) => {
                self.layers.insert(name.to_string(), previous);
                Err(error)
            }
        };
        self.rebuild_attribute_index();
        outcome
    }

    /// Layers ordered so that every layer follows the layer it depends on.
    /// Independent layers are ordered by name.
    pub fn sorted_layers(&self) -> Vec<&Layer> {
        let mut placed: BTreeSet<&str> = BTreeSet::new();
        let mut remaining: Vec<&Layer> = self.layers.values().collect();
        let mut sorted = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|layer| {
                layer
                    .relation()
                    .dependency()
                    .map_or(true, |dependency| {
                        placed.contains(dependency) || !self.layers.contains_key(dependency)
                    })
            });
            // a dependency cycle cannot be attached, so some layer is always ready
            let index = ready.unwrap_or(0);
            let layer = remaining.remove(index);
            placed.insert(layer.name());
            sorted.push(layer);
        }
        sorted
    }

    /// Values of `attribute` for the span of `layer` at `base_span`, looked
    /// up in whichever commensurable layer declares the attribute.
    pub fn resolve_attribute(
        &self,
        layer: &str,
        base_span: &BaseSpan,
        attribute: &str,
    ) -> LayerResult<Vec<&Value>> {
        self.get_layer(layer)?;
        let owner = self
            .attribute_index
            .resolving_layer(layer, attribute)
            .ok_or_else(|| LayerError::UnresolvedAttribute {
                layer: layer.to_string(),
                attribute: attribute.to_string(),
            })?;
        let span = self
            .get_layer(owner)?
            .get(base_span)
            .ok_or_else(|| LayerError::SpanNotFound {
                layer: owner.to_string(),
                position: base_span.raw(),
            })?;
        Ok(span.values(attribute))
    }

    /// Span of the parent layer at the same position.
    pub fn parent_span(&self, layer: &str, base_span: &BaseSpan) -> LayerResult<&Span> {
        let parent = self
            .get_layer(layer)?
            .parent()
            .ok_or_else(|| LayerError::WrongRelation {
                layer: layer.to_string(),
                relation: "parent-derived",
            })?;
        self.get_layer(parent)?
            .get(base_span)
            .ok_or_else(|| LayerError::SpanNotFound {
                layer: parent.to_string(),
                position: base_span.raw(),
            })
    }

    /// Constituents of the span of an enveloping `layer` at `base_span`.
    pub fn enveloped_spans(&self, layer: &str, base_span: &BaseSpan) -> LayerResult<Vec<&Span>> {
        let envelope = self.get_layer(layer)?;
        let enveloped = envelope
            .enveloping()
            .ok_or_else(|| LayerError::WrongRelation {
                layer: layer.to_string(),
                relation: "enveloping",
            })?;
        let span = envelope
            .enveloping_span(base_span)
            .ok_or_else(|| LayerError::SpanNotFound {
                layer: layer.to_string(),
                position: base_span.raw(),
            })?;
        span.spans(self.get_layer(enveloped)?)
    }

    /// Describes the first difference to `other`, if any.
    pub fn diff(&self, other: &Text) -> Option<String> {
        if self.text != other.text {
            return Some("Texts differ".to_string());
        }
        let names: BTreeSet<&String> = self.layers.keys().collect();
        let other_names: BTreeSet<&String> = other.layers.keys().collect();
        if names != other_names {
            return Some(format!(
                "Layer names differ: {:?} != {:?}",
                names, other_names
            ));
        }
        if self.meta != other.meta {
            return Some("Meta differs".to_string());
        }
        self.layers
            .iter()
            .find_map(|(name, layer)| other.layers.get(name).and_then(|o| layer.diff(o)))
    }

    pub fn display(&self) -> LayerDisplay<'_> {
        LayerDisplay::new(self)
    }

    fn check_bounds(&self, layer: &Layer) -> LayerResult<()> {
        let text_len = self.text.len();
        match layer.iter().find(|span| span.end() > text_len) {
            Some(span) => Err(LayerError::SpanOutOfBounds {
                layer: layer.name().to_string(),
                position: span.base_span().raw(),
                text_len,
            }),
            None => Ok(()),
        }
    }

    fn rebuild_attribute_index(&mut self) {
        let layers = &self.layers;
        self.attribute_index =
            AttributeIndex::build(self.attach_order.iter().filter_map(|name| layers.get(name)));
    }
}

impl Clone for Text {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            meta: self.meta.clone(),
            layers: self
                .layers
                .iter()
                .map(|(name, layer)| (name.clone(), layer.attached_copy()))
                .collect(),
            attach_order: self.attach_order.clone(),
            attribute_index: self.attribute_index.clone(),
        }
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_none()
    }
}
