#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Interchange form of `layered-text` layers and texts.
//!
//! A layer becomes a [`LayerRecord`] holding its schema and its spans, each
//! span a raw base span plus its annotations. Enveloping base spans are
//! nested arrays, so `[[0, 4], [5, 12]]` envelopes two words.
//!
//! ```
//! use layered_text::{Annotation, BaseSpan, Layer};
//! use layered_text_convert::{layer_from_json, layer_to_json};
//!
//! let mut words = Layer::builder("words").attributes(["normalized"]).build()?;
//! words.add_annotation(BaseSpan::elementary(0, 4)?, Annotation::from([("normalized", "kass")]))?;
//!
//! let json = layer_to_json(&words)?;
//! assert_eq!(
//!     json,
//!     r#"{"name":"words","attributes":["normalized"],"parent":null,"enveloping":null,"ambiguous":false,"meta":{},"spans":[{"base_span":[0,4],"annotations":[{"normalized":"kass"}]}]}"#
//! );
//! assert_eq!(layer_from_json(&json)?, words);
//! # Ok::<(), layered_text_convert::ConvertError>(())
//! ```

mod error;
mod json;
mod records;

pub use error::{ConvertError, ConvertResult};
pub use json::{
    layer_from_json, layer_to_json, layer_to_json_pretty, text_from_json, text_to_json,
    text_to_json_pretty,
};
pub use records::{
    layer_to_record, record_to_layer, record_to_text, text_to_record, LayerRecord, SpanRecord,
    TextRecord,
};
