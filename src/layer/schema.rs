use std::collections::{BTreeMap, HashSet};

use crate::{Annotation, BaseSpan, Layer, LayerError, LayerResult, Value};

/// Names that cannot be used for layers.
const RESERVED_LAYER_NAMES: &[&str] = &[
    "text", "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// How a layer relates to the other layers of a text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerRelation {
    /// Spans are placed directly on the text.
    Independent,
    /// Every span shares its base span with a span of the named layer.
    Parent(String),
    /// Every span envelops a sequence of spans of the named layer.
    Enveloping(String),
}

impl LayerRelation {
    /// The layer this relation depends on.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            LayerRelation::Independent => None,
            LayerRelation::Parent(name) | LayerRelation::Enveloping(name) => Some(name),
        }
    }
}

/// Declared shape of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSchema {
    name: String,
    attributes: Vec<String>,
    relation: LayerRelation,
    ambiguous: bool,
    default_values: BTreeMap<String, Value>,
}

impl LayerSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    pub fn relation(&self) -> &LayerRelation {
        &self.relation
    }

    pub fn parent(&self) -> Option<&str> {
        match &self.relation {
            LayerRelation::Parent(name) => Some(name),
            _ => None,
        }
    }

    pub fn enveloping(&self) -> Option<&str> {
        match &self.relation {
            LayerRelation::Enveloping(name) => Some(name),
            _ => None,
        }
    }

    pub fn ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn default_values(&self) -> &BTreeMap<String, Value> {
        &self.default_values
    }

    /// Value used for a declared attribute that an annotation leaves out.
    pub fn default_value(&self, attribute: &str) -> Value {
        self.default_values
            .get(attribute)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn check_attribute(&self, attribute: &str) -> LayerResult<()> {
        if self.has_attribute(attribute) {
            Ok(())
        } else {
            Err(LayerError::UnknownAttribute {
                layer: self.name.clone(),
                attribute: attribute.to_string(),
            })
        }
    }

    pub(crate) fn check_value(&self, attribute: &str, value: &Value) -> LayerResult<()> {
        self.check_attribute(attribute)?;
        if value.is_finite() {
            Ok(())
        } else {
            Err(LayerError::NonFiniteValue {
                layer: self.name.clone(),
                attribute: attribute.to_string(),
            })
        }
    }

    /// Rejects undeclared attributes and non-finite values, then fills the
    /// missing attributes with defaults.
    pub(crate) fn conform(&self, mut annotation: Annotation) -> LayerResult<Annotation> {
        for (attribute, value) in annotation.iter() {
            self.check_value(attribute, value)?;
        }
        for attribute in &self.attributes {
            if !annotation.contains(attribute) {
                annotation.set(attribute.clone(), self.default_value(attribute));
            }
        }
        Ok(annotation)
    }

    pub(crate) fn check_base_span(&self, base_span: &BaseSpan) -> LayerResult<()> {
        let enveloping = self.enveloping().is_some();
        if enveloping == base_span.is_enveloping() {
            return Ok(());
        }
        Err(LayerError::WrongSpanKind {
            layer: self.name.clone(),
            expected: if enveloping { "enveloping" } else { "elementary" },
            position: base_span.raw(),
        })
    }

    /// Replaces the attribute list; defaults of dropped attributes are discarded.
    pub(crate) fn set_attributes(&mut self, attributes: Vec<String>) -> LayerResult<()> {
        validate_attributes(&self.name, &attributes)?;
        self.default_values
            .retain(|name, _| attributes.iter().any(|a| a == name));
        self.attributes = attributes;
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn validate_attributes(layer: &str, attributes: &[String]) -> LayerResult<()> {
    let mut seen = HashSet::new();
    for attribute in attributes {
        if !is_identifier(attribute) {
            return Err(LayerError::InvalidAttributeName {
                layer: layer.to_string(),
                attribute: attribute.clone(),
            });
        }
        if !seen.insert(attribute.as_str()) {
            return Err(LayerError::DuplicateAttribute {
                layer: layer.to_string(),
                attribute: attribute.clone(),
            });
        }
    }
    Ok(())
}

/// Builder for [`Layer`], see [`Layer::builder`].
///
/// ```
/// use layered_text::Layer;
///
/// let words = Layer::builder("words")
///     .attributes(["normalized"])
///     .build()
///     .unwrap();
/// let morph = Layer::builder("morph")
///     .parent("words")
///     .attributes(["lemma", "pos"])
///     .ambiguous(true)
///     .build()
///     .unwrap();
/// assert_eq!(morph.parent(), Some("words"));
/// assert!(words.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    name: String,
    attributes: Vec<String>,
    parent: Option<String>,
    enveloping: Option<String>,
    ambiguous: bool,
    default_values: BTreeMap<String, Value>,
    meta: BTreeMap<String, Value>,
}

impl LayerBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            parent: None,
            enveloping: None,
            ambiguous: false,
            default_values: BTreeMap::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parent = Some(name.into());
        self
    }

    pub fn enveloping(mut self, name: impl Into<String>) -> Self {
        self.enveloping = Some(name.into());
        self
    }

    pub fn ambiguous(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    pub fn default_value(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(attribute.into(), value.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Validates the declaration without creating a layer.
    pub fn schema(self) -> LayerResult<LayerSchema> {
        self.into_parts().map(|(schema, _)| schema)
    }

    pub fn build(self) -> LayerResult<Layer> {
        let (schema, meta) = self.into_parts()?;
        Ok(Layer::from_schema(schema, meta))
    }

    fn into_parts(self) -> LayerResult<(LayerSchema, BTreeMap<String, Value>)> {
        if !is_identifier(&self.name) {
            return Err(LayerError::InvalidLayerName(self.name));
        }
        if RESERVED_LAYER_NAMES.contains(&self.name.as_str()) {
            return Err(LayerError::ReservedLayerName(self.name));
        }
        validate_attributes(&self.name, &self.attributes)?;

        let relation = match (self.parent, self.enveloping) {
            (Some(_), Some(_)) => {
                return Err(LayerError::ParentAndEnveloping { layer: self.name })
            }
            (Some(parent), None) => LayerRelation::Parent(parent),
            (None, Some(enveloped)) => LayerRelation::Enveloping(enveloped),
            (None, None) => LayerRelation::Independent,
        };
        if relation.dependency() == Some(self.name.as_str()) {
            return Err(LayerError::SelfReference { layer: self.name });
        }

        if let Some(attribute) = self
            .default_values
            .keys()
            .find(|name| !self.attributes.contains(*name))
        {
            return Err(LayerError::UnknownAttribute {
                layer: self.name.clone(),
                attribute: attribute.clone(),
            });
        }

        if let Some(attribute) = self
            .default_values
            .iter()
            .find_map(|(name, value)| (!value.is_finite()).then_some(name))
        {
            return Err(LayerError::NonFiniteValue {
                layer: self.name.clone(),
                attribute: attribute.clone(),
            });
        }

        let schema = LayerSchema {
            name: self.name,
            attributes: self.attributes,
            relation,
            ambiguous: self.ambiguous,
            default_values: self.default_values,
        };
        Ok((schema, self.meta))
    }
}
