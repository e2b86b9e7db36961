//! The tagger and retagger contracts.

use std::collections::BTreeMap;
use std::fmt;

use layered_text::{Layer, Text, Value};
use serde::Serialize;
use tracing::debug;

use crate::{TaggerError, TaggerResult};

/// Layers handed to a component next to the text, keyed by name. They are
/// read before the layers attached to the text.
pub type DetachedLayers = BTreeMap<String, Layer>;

/// Input layer `name`, taken from `layers` if present and from `text`
/// otherwise.
pub fn input_layer<'a>(
    text: &'a Text,
    layers: &'a DetachedLayers,
    name: &str,
) -> TaggerResult<&'a Layer> {
    match layers.get(name) {
        Some(layer) => Ok(layer),
        None => Ok(text.get_layer(name)?),
    }
}

fn has_input(text: &Text, layers: &DetachedLayers, name: &str) -> bool {
    layers.contains_key(name) || text.contains_layer(name)
}

/// Creates one layer from a text and the layers it reads, attached or
/// detached.
pub trait Tagger {
    /// Component name used in logs and error messages.
    fn name(&self) -> &str;

    fn output_layer(&self) -> &str;

    fn output_attributes(&self) -> &[String];

    fn input_layers(&self) -> &[String];

    /// Settings that affect the output, for [`Tagger::parameters`].
    fn configuration(&self) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    /// Builds the output layer. Every input layer is guaranteed to be in
    /// `layers` or attached to `text`; read them with [`input_layer`].
    fn build_layer(&self, text: &Text, layers: &DetachedLayers) -> TaggerResult<Layer>;

    /// Builds the output layer and checks it against the declaration.
    fn make_layer(&self, text: &Text, layers: &DetachedLayers) -> TaggerResult<Layer> {
        for input in self.input_layers() {
            if !has_input(text, layers, input) {
                return Err(TaggerError::MissingInputLayer {
                    component: self.name().to_string(),
                    layer: input.clone(),
                });
            }
        }

        let layer = self.build_layer(text, layers)?;
        if layer.name() != self.output_layer() {
            return Err(TaggerError::OutputLayerMismatch {
                component: self.name().to_string(),
                expected: self.output_layer().to_string(),
                found: layer.name().to_string(),
            });
        }
        if layer.attributes() != self.output_attributes() {
            return Err(TaggerError::OutputAttributesMismatch {
                component: self.name().to_string(),
                expected: self.output_attributes().to_vec(),
                found: layer.attributes().to_vec(),
            });
        }
        Ok(layer)
    }

    /// Builds the output layer and attaches it to `text`.
    fn tag(&self, text: &mut Text) -> TaggerResult<()> {
        let layer = self.make_layer(text, &DetachedLayers::new())?;
        debug!(tagger = self.name(), layer = layer.name(), spans = layer.len(), "tagged");
        text.add_layer(layer)?;
        Ok(())
    }

    fn parameters(&self) -> ComponentParameters {
        ComponentParameters {
            name: self.name().to_string(),
            layer: self.output_layer().to_string(),
            attributes: self.output_attributes().to_vec(),
            depends_on: self.input_layers().to_vec(),
            configuration: self.configuration(),
            is_retagger: false,
        }
    }
}

/// Changes an existing layer in place.
pub trait Retagger {
    fn name(&self) -> &str;

    fn output_layer(&self) -> &str;

    fn output_attributes(&self) -> &[String];

    /// Layers read by the retagger. May include the output layer itself.
    fn input_layers(&self) -> &[String];

    fn configuration(&self) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    /// Applies the change. Other input layers are read with
    /// [`input_layer`]. During [`Retagger::retag`] `layers` is empty and
    /// `layer` is detached from `text`.
    fn change_layer(
        &self,
        text: &Text,
        layers: &DetachedLayers,
        layer: &mut Layer,
    ) -> TaggerResult<()>;

    /// Changes the output layer of `text`, optionally auditing it afterwards
    /// with [`Layer::check_span_consistency`].
    fn retag(&self, text: &mut Text, check_output_consistency: bool) -> TaggerResult<()> {
        let output = self.output_layer();
        if !text.contains_layer(output) {
            return Err(TaggerError::MissingOutputLayer {
                component: self.name().to_string(),
                layer: output.to_string(),
            });
        }
        for input in self.input_layers() {
            if input != output && !text.contains_layer(input) {
                return Err(TaggerError::MissingInputLayer {
                    component: self.name().to_string(),
                    layer: input.clone(),
                });
            }
        }

        let layers = DetachedLayers::new();
        text.with_layer_mut(output, |text, layer| self.change_layer(text, &layers, layer))??;
        if check_output_consistency {
            text.get_layer(output)?.check_span_consistency()?;
        }
        debug!(retagger = self.name(), layer = output, "retagged");
        Ok(())
    }

    fn parameters(&self) -> ComponentParameters {
        ComponentParameters {
            name: self.name().to_string(),
            layer: self.output_layer().to_string(),
            attributes: self.output_attributes().to_vec(),
            depends_on: self.input_layers().to_vec(),
            configuration: self.configuration(),
            is_retagger: true,
        }
    }
}

/// Description of a registered component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentParameters {
    pub name: String,
    pub layer: String,
    pub attributes: Vec<String>,
    pub depends_on: Vec<String>,
    pub configuration: BTreeMap<String, Value>,
    pub is_retagger: bool,
}

impl fmt::Display for ComponentParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} -> {} {:?} depends on {:?}",
            self.name,
            if self.is_retagger { " (retagger)" } else { "" },
            self.layer,
            self.attributes,
            self.depends_on
        )?;
        for (key, value) in &self.configuration {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Either kind of registry component.
pub enum Component {
    Tagger(Box<dyn Tagger>),
    Retagger(Box<dyn Retagger>),
}

impl Component {
    pub fn tagger<T: Tagger + 'static>(tagger: T) -> Self {
        Component::Tagger(Box::new(tagger))
    }

    pub fn retagger<R: Retagger + 'static>(retagger: R) -> Self {
        Component::Retagger(Box::new(retagger))
    }

    pub fn output_layer(&self) -> &str {
        match self {
            Component::Tagger(tagger) => tagger.output_layer(),
            Component::Retagger(retagger) => retagger.output_layer(),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Tagger(tagger) => f.debug_tuple("Tagger").field(&tagger.name()).finish(),
            Component::Retagger(retagger) => {
                f.debug_tuple("Retagger").field(&retagger.name()).finish()
            }
        }
    }
}
