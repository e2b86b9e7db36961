//! Reference taggers over Unicode text segmentation.
//!
//! ```
//! use layered_text::Text;
//! use layered_text_taggers::standard::{NormalizationRetagger, SentenceTagger, TokensTagger};
//! use layered_text_taggers::{LayerResolver, RegistryEntry, TaggersRegistry};
//!
//! let registry = TaggersRegistry::new([
//!     RegistryEntry::new(TokensTagger::new()).with_retagger(NormalizationRetagger::new()),
//!     RegistryEntry::new(SentenceTagger::new()),
//! ])
//! .unwrap();
//! let resolver = LayerResolver::new(registry);
//!
//! let mut text = Text::new("Kass jooksis. Koer haukus.");
//! resolver.apply(&mut text, "sentences").unwrap();
//! assert_eq!(text.get_layer("sentences").unwrap().len(), 2);
//! ```

mod normalize;
mod sentences;
mod tokens;

pub use normalize::NormalizationRetagger;
pub use sentences::{SentenceTagger, Sentences};
pub use tokens::{Tokens, TokensTagger};

const EMPTY: &[String] = &[];

/// The registry entries for all reference taggers.
pub fn standard_entries() -> Vec<crate::RegistryEntry> {
    vec![
        crate::RegistryEntry::new(TokensTagger::new())
            .with_retagger(NormalizationRetagger::new()),
        crate::RegistryEntry::new(SentenceTagger::new()),
    ]
}
