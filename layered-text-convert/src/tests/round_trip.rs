use std::collections::BTreeMap;

use layered_text::{Annotation, BaseSpan, Layer, Text, Value};

use crate::{
    layer_from_json, layer_to_json_pretty, record_to_text, text_from_json, text_to_json,
    text_to_record,
};

fn elem(start: usize, end: usize) -> BaseSpan {
    BaseSpan::elementary(start, end).unwrap()
}

fn words() -> Layer {
    let mut words = Layer::builder("words")
        .attributes(["normalized"])
        .build()
        .unwrap();
    for (start, end, surface) in [(0, 4, "kass"), (5, 12, "jooksis"), (12, 13, ".")] {
        words
            .add_annotation(elem(start, end), Annotation::from([("normalized", surface)]))
            .unwrap();
    }
    words
}

fn morph() -> Layer {
    let mut morph = Layer::builder("morph")
        .parent("words")
        .attributes(["lemma", "pos", "form", "score"])
        .ambiguous(true)
        .build()
        .unwrap();
    morph
        .add_annotation(
            elem(0, 4),
            Annotation::new()
                .with("lemma", "kass")
                .with("pos", "S")
                .with("form", vec!["sg", "n"])
                .with("score", 0.75),
        )
        .unwrap();
    morph
        .add_annotation(
            elem(0, 4),
            Annotation::new()
                .with("lemma", "kass")
                .with("pos", "V")
                .with("form", Value::Null)
                .with("score", 0.25),
        )
        .unwrap();
    let mut record = BTreeMap::new();
    record.insert("stem".to_string(), Value::from("joks"));
    record.insert("compound".to_string(), Value::from(false));
    morph
        .add_annotation(
            elem(5, 12),
            Annotation::new()
                .with("lemma", "jooksma")
                .with("pos", "V")
                .with("form", record)
                .with("score", 1),
        )
        .unwrap();
    morph
}

fn sentences() -> Layer {
    let mut sentences = Layer::builder("sentences").enveloping("words").build().unwrap();
    sentences
        .add_annotation(
            BaseSpan::enveloping([elem(0, 4), elem(5, 12), elem(12, 13)]).unwrap(),
            Annotation::new(),
        )
        .unwrap();
    sentences
}

fn document() -> Text {
    let mut text = Text::new("Kass jooksis.");
    text.meta_mut()
        .insert("source".to_string(), Value::from("test"));
    text.add_layer(words()).unwrap();
    text.add_layer(morph()).unwrap();
    text.add_layer(sentences()).unwrap();
    text
}

#[test]
fn test_text_round_trip() {
    let text = document();
    let json = text_to_json(&text).unwrap();
    let restored = text_from_json(&json).unwrap();

    assert_eq!(restored.diff(&text), None);
    assert!(restored.get_layer("words").unwrap().is_frozen());
    assert_eq!(
        restored.get_layer("morph").unwrap()[0].annotations().len(),
        2
    );
}

#[test]
fn test_layers_are_written_dependencies_first() {
    let record = text_to_record(&document());
    let names: Vec<&str> = record.layers.iter().map(|layer| layer.name.as_str()).collect();
    assert_eq!(names, ["words", "morph", "sentences"]);

    let mut shuffled = record.clone();
    shuffled.layers.reverse();
    let restored = record_to_text(shuffled).unwrap();
    assert_eq!(restored.diff(&document()), None);
}

#[test]
fn test_enveloping_layer_json() {
    let json = layer_to_json_pretty(&sentences()).unwrap();
    insta::assert_snapshot!(json, @r###"
{
  "name": "sentences",
  "attributes": [],
  "parent": null,
  "enveloping": "words",
  "ambiguous": false,
  "meta": {},
  "spans": [
    {
      "base_span": [
        [
          0,
          4
        ],
        [
          5,
          12
        ],
        [
          12,
          13
        ]
      ],
      "annotations": [
        {}
      ]
    }
  ]
}
"###);
    assert_eq!(layer_from_json(&json).unwrap(), sentences());
}

#[test]
fn test_invalid_input_is_rejected() {
    let error = layer_from_json(
        r#"{"name":"words","attributes":[],"spans":[{"base_span":[4,0],"annotations":[{}]}]}"#,
    )
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "invalid base span: start 4 is greater than end 0"
    );

    let error = text_from_json("{\"text\": 3}").unwrap_err();
    assert!(error.to_string().starts_with("invalid JSON"));
}
