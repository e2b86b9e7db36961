//! Layer dependency graph over an index arena.

use std::collections::HashMap;

use pathfinding::directed::strongly_connected_components::strongly_connected_component;
use pathfinding::directed::topological_sort::topological_sort_into_groups;
use tracing::warn;

use crate::{TaggerError, TaggerResult};

/// Directed graph with an edge from every input layer to the layer that
/// reads it. Nodes are layer names stored once and referenced by index.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayerGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    /// All nodes, dependencies before dependents, ties by name.
    order: Vec<usize>,
}

impl LayerGraph {
    /// Builds the graph from `(output layer, input layers)` pairs, one pair
    /// per component. Fails if the graph has a cycle.
    pub(crate) fn build<'a, I>(dependencies: I) -> TaggerResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut graph = LayerGraph::default();
        let dependencies: Vec<(&str, &[String])> = dependencies.into_iter().collect();

        for (layer, _) in &dependencies {
            graph.node(layer);
        }
        for (layer, inputs) in &dependencies {
            let target = graph.node(layer);
            for input in inputs.iter() {
                if input == layer {
                    continue;
                }
                if !graph.index.contains_key(input.as_str()) {
                    warn!(
                        layer = *layer,
                        input = input.as_str(),
                        "input layer is missing from the layer graph, it must be attached before resolving"
                    );
                }
                let source = graph.node(input);
                graph.add_edge(source, target);
            }
        }

        let nodes: Vec<usize> = (0..graph.nodes.len()).collect();
        match topological_sort_into_groups(&nodes, |&node| graph.successors[node].clone()) {
            Ok(groups) => {
                for mut group in groups {
                    group.sort_by(|&a, &b| graph.nodes[a].cmp(&graph.nodes[b]));
                    graph.order.extend(group);
                }
            }
            Err((_, remaining)) => {
                let cycle = remaining
                    .iter()
                    .map(|node| strongly_connected_component(node, |&n| graph.successors[n].clone()))
                    .find(|component| component.len() > 1);
                let mut layers: Vec<String> = cycle
                    .unwrap_or(remaining)
                    .into_iter()
                    .map(|n| graph.nodes[n].clone())
                    .collect();
                layers.sort();
                return Err(TaggerError::DependencyCycle { layers });
            }
        }
        Ok(graph)
    }

    fn node(&mut self, name: &str) -> usize {
        if let Some(&index) = self.index.get(name) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), index);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        index
    }

    fn add_edge(&mut self, source: usize, target: usize) {
        if !self.successors[source].contains(&target) {
            self.successors[source].push(target);
            self.predecessors[target].push(source);
        }
    }

    pub(crate) fn contains(&self, layer: &str) -> bool {
        self.index.contains_key(layer)
    }

    /// Layers read by components of `layer`.
    pub(crate) fn predecessors(&self, layer: &str) -> Vec<&str> {
        self.index
            .get(layer)
            .map(|&index| {
                self.predecessors[index]
                    .iter()
                    .map(|&p| self.nodes[p].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All layers, dependencies first.
    pub(crate) fn sorted(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(move |&index| self.nodes[index].as_str())
    }
}
