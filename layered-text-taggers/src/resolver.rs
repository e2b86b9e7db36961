//! Dependency-ordered layer creation.

use layered_text::Text;
use tracing::{debug, info_span};

use crate::{Component, ResolverConfig, TaggerError, TaggerResult, TaggersRegistry};

/// Builds requested layers on a text together with every layer they
/// depend on, using the taggers of a [`TaggersRegistry`].
#[derive(Debug)]
pub struct LayerResolver {
    registry: TaggersRegistry,
    config: ResolverConfig,
}

impl LayerResolver {
    pub fn new(registry: TaggersRegistry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    pub fn with_config(registry: TaggersRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    pub fn taggers(&self) -> &TaggersRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn default_layers(&self) -> &[String] {
        &self.config.default_layers
    }

    pub fn update(&mut self, component: Component) -> TaggerResult<()> {
        self.registry.update(component)
    }

    pub fn clear_retaggers(&mut self, layer: &str) -> TaggerResult<()> {
        self.registry.clear_retaggers(layer)
    }

    pub fn list_layers(&self) -> Vec<&str> {
        self.registry.list_layers()
    }

    /// Makes sure `layer` is attached to `text`, first creating the layers
    /// it depends on. Layers already attached are left untouched.
    ///
    /// A failure leaves the prerequisites built so far attached.
    pub fn apply(&self, text: &mut Text, layer: &str) -> TaggerResult<()> {
        if text.contains_layer(layer) {
            return Ok(());
        }
        if !self.registry.contains(layer) {
            return Err(TaggerError::UnknownLayer {
                layer: layer.to_string(),
            });
        }

        let _span = info_span!("apply", layer).entered();
        for predecessor in self.registry.graph().predecessors(layer) {
            self.apply(text, predecessor)?;
        }
        self.registry
            .create_layer_for_text(layer, text, self.config.check_output_consistency)?;
        debug!(layer, "created layer");
        Ok(())
    }

    /// Applies every configured default layer.
    pub fn tag_defaults(&self, text: &mut Text) -> TaggerResult<()> {
        for layer in &self.config.default_layers {
            self.apply(text, layer)?;
        }
        Ok(())
    }
}
