//! Registry of layer-creating components.

use std::collections::BTreeMap;
use std::fmt;

use layered_text::Text;
use tracing::debug;

use crate::graph::LayerGraph;
use crate::{
    Component, ComponentParameters, Retagger, Tagger, TaggerError, TaggerResult,
};

/// A tagger creating one layer followed by the retaggers that change it.
pub struct RegistryEntry {
    tagger: Box<dyn Tagger>,
    retaggers: Vec<Box<dyn Retagger>>,
}

impl RegistryEntry {
    pub fn new<T: Tagger + 'static>(tagger: T) -> Self {
        Self::from_boxed(Box::new(tagger))
    }

    pub fn from_boxed(tagger: Box<dyn Tagger>) -> Self {
        Self {
            tagger,
            retaggers: Vec::new(),
        }
    }

    pub fn with_retagger<R: Retagger + 'static>(mut self, retagger: R) -> Self {
        self.retaggers.push(Box::new(retagger));
        self
    }

    pub fn layer(&self) -> &str {
        self.tagger.output_layer()
    }

    fn validate(&self) -> TaggerResult<()> {
        let layer = self.layer();
        match self.retaggers.iter().find(|r| r.output_layer() != layer) {
            Some(retagger) => Err(TaggerError::RetaggerLayerMismatch {
                component: retagger.name().to_string(),
                expected: layer.to_string(),
                found: retagger.output_layer().to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl<T: Tagger + 'static> From<T> for RegistryEntry {
    fn from(tagger: T) -> Self {
        RegistryEntry::new(tagger)
    }
}

/// Registered taggers and retaggers, organised as a directed acyclic graph
/// in which edges point from prerequisite layers to dependent layers.
///
/// Every change is checked against the graph; a change that would introduce
/// a cycle is rolled back and reported.
pub struct TaggersRegistry {
    rules: BTreeMap<String, RegistryEntry>,
    graph: LayerGraph,
}

impl TaggersRegistry {
    pub fn new<I>(entries: I) -> TaggerResult<Self>
    where
        I: IntoIterator<Item = RegistryEntry>,
    {
        let mut rules = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            rules.insert(entry.layer().to_string(), entry);
        }
        let graph = build_graph(&rules)?;
        Ok(Self { rules, graph })
    }

    /// Adds a tagger or a retagger.
    pub fn update(&mut self, component: Component) -> TaggerResult<()> {
        match component {
            Component::Tagger(tagger) => self.add_tagger(tagger),
            Component::Retagger(retagger) => self.add_retagger(retagger),
        }
    }

    /// Makes `tagger` the creator of its output layer. Retaggers already
    /// registered for the layer are kept.
    pub fn add_tagger(&mut self, tagger: Box<dyn Tagger>) -> TaggerResult<()> {
        let layer = tagger.output_layer().to_string();
        let previous = match self.rules.get_mut(&layer) {
            Some(entry) => Some(std::mem::replace(&mut entry.tagger, tagger)),
            None => {
                self.rules
                    .insert(layer.clone(), RegistryEntry::from_boxed(tagger));
                None
            }
        };

        if let Err(error) = self.rebuild_graph() {
            match (previous, self.rules.get_mut(&layer)) {
                (Some(previous), Some(entry)) => entry.tagger = previous,
                _ => {
                    self.rules.remove(&layer);
                }
            }
            return Err(error);
        }
        debug!(layer = %layer, "registered tagger");
        Ok(())
    }

    /// Appends `retagger` to the entry of its output layer.
    pub fn add_retagger(&mut self, retagger: Box<dyn Retagger>) -> TaggerResult<()> {
        let layer = retagger.output_layer().to_string();
        let entry = self
            .rules
            .get_mut(&layer)
            .ok_or_else(|| TaggerError::NoTaggerForLayer {
                layer: layer.clone(),
            })?;
        entry.retaggers.push(retagger);

        if let Err(error) = self.rebuild_graph() {
            if let Some(entry) = self.rules.get_mut(&layer) {
                entry.retaggers.pop();
            }
            return Err(error);
        }
        debug!(layer = %layer, "registered retagger");
        Ok(())
    }

    pub fn get_tagger(&self, layer: &str) -> TaggerResult<&dyn Tagger> {
        self.entry(layer).map(|entry| entry.tagger.as_ref())
    }

    pub fn get_retaggers(&self, layer: &str) -> TaggerResult<Vec<&dyn Retagger>> {
        self.entry(layer)
            .map(|entry| entry.retaggers.iter().map(|r| r.as_ref()).collect())
    }

    /// Removes all retaggers of `layer`, keeping its tagger.
    pub fn clear_retaggers(&mut self, layer: &str) -> TaggerResult<()> {
        let entry = self
            .rules
            .get_mut(layer)
            .ok_or_else(|| TaggerError::UnknownLayer {
                layer: layer.to_string(),
            })?;
        entry.retaggers.clear();
        self.rebuild_graph()
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.rules.contains_key(layer)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Creatable layers, every layer after the layers it depends on.
    pub fn list_layers(&self) -> Vec<&str> {
        self.graph
            .sorted()
            .filter(|layer| self.rules.contains_key(*layer))
            .collect()
    }

    /// Parameters of every component, in [`TaggersRegistry::list_layers`]
    /// order with retaggers after their tagger.
    pub fn describe(&self) -> Vec<ComponentParameters> {
        let mut records = Vec::new();
        for layer in self.list_layers() {
            if let Some(entry) = self.rules.get(layer) {
                records.push(entry.tagger.parameters());
                records.extend(entry.retaggers.iter().map(|r| r.parameters()));
            }
        }
        records
    }

    /// Creates `layer` on `text` with its tagger, then runs its retaggers in
    /// registration order.
    pub fn create_layer_for_text(
        &self,
        layer: &str,
        text: &mut Text,
        check_output_consistency: bool,
    ) -> TaggerResult<()> {
        let entry = self.entry(layer)?;
        entry.tagger.tag(text)?;
        for retagger in &entry.retaggers {
            retagger.retag(text, check_output_consistency)?;
        }
        Ok(())
    }

    pub(crate) fn graph(&self) -> &LayerGraph {
        &self.graph
    }

    fn entry(&self, layer: &str) -> TaggerResult<&RegistryEntry> {
        self.rules.get(layer).ok_or_else(|| TaggerError::UnknownLayer {
            layer: layer.to_string(),
        })
    }

    fn rebuild_graph(&mut self) -> TaggerResult<()> {
        self.graph = build_graph(&self.rules)?;
        Ok(())
    }
}

fn build_graph(rules: &BTreeMap<String, RegistryEntry>) -> TaggerResult<LayerGraph> {
    LayerGraph::build(rules.iter().flat_map(|(layer, entry)| {
        std::iter::once((layer.as_str(), entry.tagger.input_layers())).chain(
            entry
                .retaggers
                .iter()
                .map(move |retagger| (layer.as_str(), retagger.input_layers())),
        )
    }))
}

impl fmt::Display for TaggersRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaggersRegistry(creatable_layers={:?})", self.list_layers())
    }
}

impl fmt::Debug for TaggersRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
