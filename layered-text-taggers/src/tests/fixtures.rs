use std::cell::RefCell;
use std::rc::Rc;

use layered_text::{Annotation, BaseSpan, Layer, Text, Value};

use crate::{DetachedLayers, Retagger, Tagger, TaggerError, TaggerResult};

/// Component names in the order they ran.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Creates an independent layer with one span over the whole text.
pub struct MockTagger {
    name: String,
    layer: String,
    inputs: Vec<String>,
    attributes: Vec<String>,
    fail: bool,
    log: CallLog,
}

impl MockTagger {
    pub fn new(layer: &str, inputs: &[&str], log: &CallLog) -> Self {
        Self {
            name: format!("{}_tagger", layer),
            layer: layer.to_string(),
            inputs: strings(inputs),
            attributes: strings(&["value"]),
            fail: false,
            log: Rc::clone(log),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Tagger for MockTagger {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_layer(&self) -> &str {
        &self.layer
    }

    fn output_attributes(&self) -> &[String] {
        &self.attributes
    }

    fn input_layers(&self) -> &[String] {
        &self.inputs
    }

    fn build_layer(&self, text: &Text, _layers: &DetachedLayers) -> TaggerResult<Layer> {
        self.log.borrow_mut().push(self.name.clone());
        if self.fail {
            return Err(TaggerError::Failed {
                component: self.name.clone(),
                reason: "no model".to_string(),
            });
        }
        let mut layer = Layer::builder(self.layer.as_str())
            .attributes(self.attributes.iter().cloned())
            .build()?;
        layer.add_annotation(
            BaseSpan::elementary(0, text.text().len())?,
            Annotation::from([("value", Value::from(0))]),
        )?;
        Ok(layer)
    }
}

/// Increments `value` on every span of its layer.
pub struct MockRetagger {
    name: String,
    layer: String,
    inputs: Vec<String>,
    attributes: Vec<String>,
    log: CallLog,
}

impl MockRetagger {
    pub fn new(name: &str, layer: &str, inputs: &[&str], log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            layer: layer.to_string(),
            inputs: strings(inputs),
            attributes: strings(&["value"]),
            log: Rc::clone(log),
        }
    }
}

impl Retagger for MockRetagger {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_layer(&self) -> &str {
        &self.layer
    }

    fn output_attributes(&self) -> &[String] {
        &self.attributes
    }

    fn input_layers(&self) -> &[String] {
        &self.inputs
    }

    fn change_layer(
        &self,
        _text: &Text,
        _layers: &DetachedLayers,
        layer: &mut Layer,
    ) -> TaggerResult<()> {
        self.log.borrow_mut().push(self.name.clone());
        layer.for_each_span_mut(|mut span| {
            let value = span.span().get("value").and_then(Value::as_int).unwrap_or(0);
            span.set_attribute("value", value + 1)
        })?;
        Ok(())
    }
}
