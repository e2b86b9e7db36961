/// Declares a zero-sized handle for a layer with a fixed attribute list.
///
/// The handle carries the layer name, the attribute names, a builder
/// preloaded with both, and one accessor per attribute so callers read
/// annotations without repeating string keys.
///
/// ```
/// use layered_text::{layer_schema, Annotation, Value};
///
/// layer_schema! {
///     /// Morphological analyses.
///     pub struct Morph {
///         layer: "morph",
///         attributes { lemma, pos }
///     }
/// }
///
/// let layer = Morph::builder().ambiguous(true).build().unwrap();
/// assert_eq!(layer.attributes(), ["lemma", "pos"]);
///
/// let annotation = Annotation::from([("lemma", "kass"), ("pos", "S")]);
/// assert_eq!(Morph::pos(&annotation), Some(&Value::from("S")));
/// ```
#[macro_export]
macro_rules! layer_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            layer: $layer:literal,
            attributes { $($attr:ident),* $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $name;

        #[allow(dead_code)]
        impl $name {
            pub const LAYER: &'static str = $layer;
            pub const ATTRIBUTES: &'static [&'static str] = &[$(stringify!($attr)),*];

            pub fn builder() -> $crate::LayerBuilder {
                $crate::Layer::builder(Self::LAYER).attributes(Self::ATTRIBUTES.iter().copied())
            }

            $(
                pub fn $attr(annotation: &$crate::Annotation) -> Option<&$crate::Value> {
                    annotation.get(stringify!($attr))
                }
            )*
        }
    };
}
