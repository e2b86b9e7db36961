#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Taggers, a registry of them and a resolver that builds layers in
//! dependency order.
//!
//! A [`Tagger`] creates one layer of a [`Text`](layered_text::Text) from the
//! layers it reads. A [`Retagger`] changes a layer that already exists. The
//! [`TaggersRegistry`] maps every creatable layer to its tagger followed by
//! its retaggers and keeps the layer dependency graph acyclic.
//! [`LayerResolver::apply`] walks that graph to build a layer together with
//! everything it needs.
//!
//! ```
//! use layered_text::Text;
//! use layered_text_taggers::{standard, LayerResolver, TaggersRegistry};
//!
//! let registry = TaggersRegistry::new(standard::standard_entries())?;
//! assert_eq!(registry.list_layers(), ["tokens", "sentences"]);
//!
//! let resolver = LayerResolver::new(registry);
//! let mut text = Text::new("Kass jooksis.");
//! resolver.apply(&mut text, "sentences")?;
//! assert!(text.contains_layer("tokens"));
//! # Ok::<(), layered_text_taggers::TaggerError>(())
//! ```

mod config;
mod error;
mod graph;
mod registry;
mod resolver;
pub mod standard;
mod tagger;

pub use config::ResolverConfig;
pub use error::{TaggerError, TaggerResult};
pub use registry::{RegistryEntry, TaggersRegistry};
pub use resolver::LayerResolver;
pub use tagger::{input_layer, Component, ComponentParameters, DetachedLayers, Retagger, Tagger};
