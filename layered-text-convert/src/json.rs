//! JSON import and export.

use layered_text::{Layer, Text};

use crate::records::{layer_to_record, record_to_layer, record_to_text, text_to_record};
use crate::ConvertResult;

pub fn layer_to_json(layer: &Layer) -> ConvertResult<String> {
    Ok(serde_json::to_string(&layer_to_record(layer))?)
}

pub fn layer_to_json_pretty(layer: &Layer) -> ConvertResult<String> {
    Ok(serde_json::to_string_pretty(&layer_to_record(layer))?)
}

pub fn layer_from_json(json: &str) -> ConvertResult<Layer> {
    record_to_layer(serde_json::from_str(json)?)
}

pub fn text_to_json(text: &Text) -> ConvertResult<String> {
    Ok(serde_json::to_string(&text_to_record(text))?)
}

pub fn text_to_json_pretty(text: &Text) -> ConvertResult<String> {
    Ok(serde_json::to_string_pretty(&text_to_record(text))?)
}

pub fn text_from_json(json: &str) -> ConvertResult<Text> {
    record_to_text(serde_json::from_str(json)?)
}
