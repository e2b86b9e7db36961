use std::collections::HashMap;

use crate::Layer;

/// Resolves attribute names across commensurable layers.
///
/// For a layer `L` and attribute `a`, the resolving layer is the first of
/// `L` itself, then the layers of `L`'s parent chain, then the remaining
/// layers with the same base in attach order, that declares `a`.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    entries: HashMap<String, HashMap<String, String>>,
}

impl AttributeIndex {
    /// Builds the index from layers given in attach order.
    pub fn build<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a Layer>,
    {
        let layers: Vec<&Layer> = layers.into_iter().collect();
        let by_name: HashMap<&str, &Layer> =
            layers.iter().map(|layer| (layer.name(), *layer)).collect();

        let mut entries = HashMap::new();
        for layer in &layers {
            let mut candidates: Vec<&Layer> = vec![*layer];
            let mut current = layer.parent();
            while let Some(&parent) = current.and_then(|name| by_name.get(name)) {
                if candidates.iter().any(|c| c.name() == parent.name()) {
                    break;
                }
                candidates.push(parent);
                current = parent.parent();
            }
            for other in &layers {
                if other.base() == layer.base() && !candidates.iter().any(|c| c.name() == other.name()) {
                    candidates.push(*other);
                }
            }

            let mut resolved: HashMap<String, String> = HashMap::new();
            for candidate in candidates {
                for attribute in candidate.attributes() {
                    resolved
                        .entry(attribute.clone())
                        .or_insert_with(|| candidate.name().to_string());
                }
            }
            entries.insert(layer.name().to_string(), resolved);
        }

        Self { entries }
    }

    /// Name of the layer that provides `attribute` for spans of `layer`.
    pub fn resolving_layer(&self, layer: &str, attribute: &str) -> Option<&str> {
        self.entries
            .get(layer)
            .and_then(|attributes| attributes.get(attribute))
            .map(String::as_str)
    }

    /// Attributes reachable from `layer`, sorted.
    pub fn attributes_of(&self, layer: &str) -> Vec<&str> {
        let mut attributes: Vec<&str> = self
            .entries
            .get(layer)
            .map(|attributes| attributes.keys().map(String::as_str).collect())
            .unwrap_or_default();
        attributes.sort_unstable();
        attributes
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
