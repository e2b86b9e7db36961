use crate::{Annotation, BaseSpan, Layer, LayerError, Text, Value};

fn elem(start: usize, end: usize) -> BaseSpan {
    BaseSpan::elementary(start, end).unwrap()
}

/// Words, clauses over words and a paragraph over clauses.
fn nested_text() -> Text {
    let mut text = Text::new("Kass jooksis ja koer haukus.");

    let mut words = Layer::builder("words").build().unwrap();
    for (start, end) in [(0, 4), (5, 12), (13, 15), (16, 20), (21, 27), (27, 28)] {
        words.add_annotation(elem(start, end), Annotation::new()).unwrap();
    }
    text.add_layer(words).unwrap();

    let mut clauses = Layer::builder("clauses")
        .enveloping("words")
        .attributes(["kind"])
        .build()
        .unwrap();
    let first = BaseSpan::enveloping([elem(0, 4), elem(5, 12)]).unwrap();
    let second = BaseSpan::enveloping([elem(16, 20), elem(21, 27)]).unwrap();
    clauses
        .add_annotation(first.clone(), Annotation::from([("kind", "main")]))
        .unwrap();
    clauses
        .add_annotation(second.clone(), Annotation::from([("kind", "coordinate")]))
        .unwrap();
    text.add_layer(clauses).unwrap();

    let mut paragraphs = Layer::builder("paragraphs")
        .enveloping("clauses")
        .build()
        .unwrap();
    paragraphs
        .add_annotation(BaseSpan::enveloping([first, second]).unwrap(), Annotation::new())
        .unwrap();
    text.add_layer(paragraphs).unwrap();

    text
}

#[test]
fn test_enveloping_spans_expose_their_constituents() {
    let text = nested_text();
    let clauses = text.get_layer("clauses").unwrap();
    let words = text.get_layer("words").unwrap();

    let first = clauses.enveloping_spans().next().unwrap();
    assert_eq!(first.enveloped_layer(), "words");
    assert_eq!(first.len(), 2);
    assert_eq!(first.get("kind"), Some(&Value::from("main")));
    assert_eq!(first.text(text.text()), Some(vec!["Kass", "jooksis"]));

    let constituents = first.spans(words).unwrap();
    assert_eq!(constituents[1].base_span(), &elem(5, 12));
}

#[test]
fn test_constituents_come_from_the_enveloped_layer_only() {
    let mut text = nested_text();
    let mut morph = Layer::builder("morph")
        .parent("words")
        .attributes(["lemma"])
        .build()
        .unwrap();
    for (start, end, lemma) in [(0, 4, "kass"), (5, 12, "jooksma")] {
        morph
            .add_annotation(elem(start, end), Annotation::from([("lemma", lemma)]))
            .unwrap();
    }
    text.add_layer(morph).unwrap();

    let clauses = text.get_layer("clauses").unwrap();
    let first = clauses.enveloping_spans().next().unwrap();
    assert_eq!(
        first.spans(text.get_layer("morph").unwrap()).unwrap_err(),
        LayerError::WrongEnvelopedLayer {
            layer: "clauses".into(),
            expected: "words".into(),
            found: "morph".into(),
        }
    );
    assert_eq!(first.spans(text.get_layer("words").unwrap()).unwrap().len(), 2);

    let words = text.get_layer("words").unwrap();
    assert!(words.enveloping_span(&elem(0, 4)).is_none());
    assert_eq!(words.enveloping_spans().count(), 0);
}

#[test]
fn test_nested_envelopes_flatten_to_words() {
    let text = nested_text();
    let paragraph = &text.get_layer("paragraphs").unwrap()[0];
    assert_eq!(paragraph.level(), 2);
    assert_eq!(
        paragraph.text(text.text()),
        Some(vec!["Kass", "jooksis", "koer", "haukus"])
    );
    assert_eq!(
        paragraph.enclosing_text(text.text()),
        Some("Kass jooksis ja koer haukus")
    );

    let clauses = text
        .enveloped_spans("paragraphs", paragraph.base_span())
        .unwrap();
    let kinds: Vec<&Value> = clauses.iter().filter_map(|clause| clause.get("kind")).collect();
    assert_eq!(kinds, vec![&Value::from("main"), &Value::from("coordinate")]);

    let words = text
        .get_layer("words")
        .unwrap()
        .get_reduced(paragraph.base_span())
        .unwrap();
    assert_eq!(words.len(), 4);
}

#[test]
fn test_enveloping_layer_has_own_base() {
    let text = nested_text();
    assert_eq!(text.get_layer("clauses").unwrap().base(), "clauses");
    assert_eq!(text.get_layer("paragraphs").unwrap().base(), "paragraphs");
    assert!(text.get_layer("clauses").unwrap().is_frozen());
    text.get_layer("paragraphs")
        .unwrap()
        .check_span_consistency()
        .unwrap();
}
