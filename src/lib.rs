#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Layered span-based annotation of text.
//!
//! A [`Text`] holds a raw string plus named [`Layer`]s. Every layer is an
//! ordered collection of [`Span`]s, and every span is a [`BaseSpan`] (where)
//! plus one or more [`Annotation`]s (what).
//!
//! ## Layers
//!
//! - **Independent** layers place spans directly on the text.
//! - **Parent-derived** layers annotate exactly the positions of their
//!   parent layer, e.g. morphological analyses on top of words.
//! - **Enveloping** layers group consecutive spans of another layer, e.g.
//!   sentences over words. Their base spans nest.
//!
//! Ambiguous layers keep several annotations per span; unambiguous layers
//! keep exactly one.
//!
//! ## Usage
//!
//! ```
//! use layered_text::{Annotation, BaseSpan, Layer, Text};
//!
//! let mut text = Text::new("Kass jooksis.");
//!
//! let mut words = Layer::builder("words").attributes(["normalized"]).build()?;
//! words.add_annotation(BaseSpan::elementary(0, 4)?, Annotation::from([("normalized", "kass")]))?;
//! words.add_annotation(BaseSpan::elementary(5, 12)?, Annotation::from([("normalized", "jooksis")]))?;
//! text.add_layer(words)?;
//!
//! let mut sentences = Layer::builder("sentences").enveloping("words").build()?;
//! sentences.add_annotation(
//!     BaseSpan::enveloping([BaseSpan::elementary(0, 4)?, BaseSpan::elementary(5, 12)?])?,
//!     Annotation::new(),
//! )?;
//! text.add_layer(sentences)?;
//!
//! let sentence = &text.get_layer("sentences")?[0];
//! assert_eq!(sentence.text(text.text()), Some(vec!["Kass", "jooksis"]));
//! # Ok::<(), layered_text::LayerError>(())
//! ```
//!
//! ## Modules
//!
//! - [`BaseSpan`] - positional identity, elementary or enveloping
//! - [`Span`], [`SpanMut`], [`EnvelopingSpan`] - annotated positions
//! - [`Layer`], [`LayerView`] - span collections and read-only selections
//! - [`Text`], [`AttributeIndex`] - the container and cross-layer lookups

mod annotation;
mod attribute_index;
mod base_span;
mod enveloping_span;
mod error;
mod layer;
mod macros;
mod span;
mod text;
mod value;

pub use annotation::Annotation;
pub use attribute_index::AttributeIndex;
pub use base_span::{BaseSpan, ElementaryBaseSpan, EnvelopingBaseSpan, RawSpan};
pub use enveloping_span::EnvelopingSpan;
pub use error::{LayerError, LayerResult};
pub use layer::{
    AttributeList, Layer, LayerBuilder, LayerDisplay, LayerRelation, LayerSchema, LayerView,
};
pub use span::{Span, SpanMut};
pub use text::Text;
pub use value::Value;

#[cfg(test)]
mod tests {
    mod base_span_properties;
    mod enveloping;
    mod layer;
    mod scenarios;
    mod text;
}
