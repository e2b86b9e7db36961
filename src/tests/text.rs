use crate::{Annotation, BaseSpan, Layer, LayerError, RawSpan, Text, Value};

fn elem(start: usize, end: usize) -> BaseSpan {
    BaseSpan::elementary(start, end).unwrap()
}

const WORDS: [(usize, usize, &str); 3] = [(0, 4, "Kass"), (5, 12, "jooksis"), (12, 13, ".")];

fn words() -> Layer {
    let mut words = Layer::builder("words")
        .attributes(["normalized"])
        .build()
        .unwrap();
    for (start, end, surface) in WORDS {
        words
            .add_annotation(
                elem(start, end),
                Annotation::from([("normalized", surface.to_lowercase())]),
            )
            .unwrap();
    }
    words
}

fn morph() -> Layer {
    let mut morph = Layer::builder("morph")
        .parent("words")
        .attributes(["lemma", "normalized"])
        .ambiguous(true)
        .build()
        .unwrap();
    morph
        .add_annotation(elem(0, 4), Annotation::from([("lemma", "kass")]))
        .unwrap();
    morph
        .add_annotation(elem(5, 12), Annotation::from([("lemma", "jooksma")]))
        .unwrap();
    morph
}

fn syntax() -> Layer {
    let mut syntax = Layer::builder("syntax")
        .parent("morph")
        .attributes(["deprel"])
        .build()
        .unwrap();
    syntax
        .add_annotation(elem(0, 4), Annotation::from([("deprel", "nsubj")]))
        .unwrap();
    syntax
}

fn sentences() -> Layer {
    let mut sentences = Layer::builder("sentences")
        .enveloping("words")
        .build()
        .unwrap();
    sentences
        .add_annotation(
            BaseSpan::enveloping(WORDS.iter().map(|&(start, end, _)| elem(start, end))).unwrap(),
            Annotation::new(),
        )
        .unwrap();
    sentences
}

fn annotated() -> Text {
    let mut text = Text::new("Kass jooksis.");
    text.add_layer(words()).unwrap();
    text.add_layer(morph()).unwrap();
    text.add_layer(syntax()).unwrap();
    text.add_layer(sentences()).unwrap();
    text
}

// ============ Attaching ============

#[test]
fn test_add_layer_checks_names_and_dependencies() {
    let mut text = Text::new("Kass jooksis.");
    assert_eq!(
        text.add_layer(morph()).unwrap_err(),
        LayerError::MissingDependency {
            layer: "morph".into(),
            dependency: "words".into()
        }
    );

    text.add_layer(words()).unwrap();
    assert_eq!(
        text.add_layer(words()).unwrap_err(),
        LayerError::LayerExists("words".into())
    );

    let mut long = Layer::builder("long").build().unwrap();
    long.add_annotation(elem(10, 20), Annotation::new()).unwrap();
    assert_eq!(
        text.add_layer(long).unwrap_err(),
        LayerError::SpanOutOfBounds {
            layer: "long".into(),
            position: RawSpan::Elementary(10, 20),
            text_len: 13
        }
    );
    assert_eq!(text.layer_names().collect::<Vec<_>>(), vec!["words"]);
}

#[test]
fn test_base_follows_parent_chain() {
    let text = annotated();
    assert_eq!(text.get_layer("words").unwrap().base(), "words");
    assert_eq!(text.get_layer("morph").unwrap().base(), "words");
    assert_eq!(text.get_layer("syntax").unwrap().base(), "words");
    assert_eq!(text.get_layer("sentences").unwrap().base(), "sentences");
}

#[test]
fn test_dependencies_are_frozen() {
    let mut text = annotated();
    let words = text.get_layer("words").unwrap();
    assert!(words.is_frozen());
    assert_eq!(
        words.dependents().collect::<Vec<_>>(),
        vec!["morph", "sentences"]
    );
    assert!(!text.get_layer("syntax").unwrap().is_frozen());

    assert!(matches!(
        text.unfreeze_layer("words"),
        Err(LayerError::LayerHasDependents { .. })
    ));
    assert_eq!(
        text.with_layer_mut("words", |_, _| ()).unwrap_err(),
        LayerError::FrozenLayer {
            layer: "words".into()
        }
    );
}

#[test]
fn test_cloned_layer_is_detached() {
    let text = annotated();
    let mut copy = text.get_layer("words").unwrap().clone();
    assert!(!copy.is_frozen());
    assert_eq!(copy.dependents().count(), 0);
    copy.unfreeze().unwrap();
    copy.add_annotation(elem(14, 18), Annotation::from([("normalized", "koer")]))
        .unwrap();
    assert_eq!(copy.len(), 4);
    assert_eq!(text.get_layer("words").unwrap().len(), 3);

    let copy = text.clone();
    assert!(copy.get_layer("words").unwrap().is_frozen());
    assert_eq!(copy.diff(&text), None);
}

// ============ Detaching ============

#[test]
fn test_pop_layer_requires_cascading_for_dependents() {
    let mut text = annotated();
    assert!(matches!(
        text.pop_layer("words", false),
        Err(LayerError::LayerHasDependents { dependents, .. }) if dependents == ["morph", "sentences"]
    ));

    let syntax = text.pop_layer("syntax", false).unwrap();
    assert_eq!(syntax.name(), "syntax");
    assert!(!text.get_layer("morph").unwrap().is_frozen());

    text.pop_layer("words", true).unwrap();
    assert_eq!(text.layer_names().count(), 0);
    assert!(matches!(
        text.pop_layer("words", true),
        Err(LayerError::MissingLayer(_))
    ));
}

#[test]
fn test_replace_layer_swaps_leaf_layers() {
    let mut text = annotated();
    let mut replacement = syntax();
    replacement
        .span_mut(&elem(0, 4))
        .unwrap()
        .set_attribute("deprel", "root")
        .unwrap();

    let old = text.replace_layer(replacement).unwrap();
    assert_eq!(old[0].get("deprel"), Some(&Value::from("nsubj")));
    assert_eq!(
        text.get_layer("syntax").unwrap()[0].get("deprel"),
        Some(&Value::from("root"))
    );
    assert!(text.get_layer("morph").unwrap().is_frozen());

    assert!(matches!(
        text.replace_layer(words()),
        Err(LayerError::LayerHasDependents { .. })
    ));
}

#[test]
fn test_with_layer_mut_gives_read_access_to_the_rest() {
    let mut text = annotated();
    let added = text
        .with_layer_mut("syntax", |text, syntax| {
            let words = text.get_layer("words")?;
            for span in words.iter().skip(1) {
                syntax.add_annotation(span.base_span(), Annotation::from([("deprel", "dep")]))?;
            }
            Ok::<usize, LayerError>(syntax.len())
        })
        .unwrap()
        .unwrap();
    assert_eq!(added, 3);
    assert_eq!(text.get_layer("syntax").unwrap().len(), 3);

    let result = text.with_layer_mut("syntax", |_, syntax| {
        syntax.add_annotation(elem(13, 20), Annotation::new())
            .map(|_| ())
    });
    assert!(matches!(result, Err(LayerError::SpanOutOfBounds { .. })));
    assert_eq!(text.get_layer("syntax").unwrap().len(), 3);
}

// ============ Ordering and lookups ============

#[test]
fn test_sorted_layers_put_dependencies_first() {
    let mut text = Text::new("Kass jooksis.");
    text.add_layer(words()).unwrap();
    text.add_layer(sentences()).unwrap();
    text.add_layer(morph()).unwrap();
    text.add_layer(syntax()).unwrap();
    text.add_layer(Layer::builder("a_notes").build().unwrap()).unwrap();

    let names: Vec<&str> = text.sorted_layers().into_iter().map(Layer::name).collect();
    assert_eq!(names, vec!["a_notes", "words", "morph", "sentences", "syntax"]);
}

#[test]
fn test_attributes_resolve_through_commensurable_layers() {
    let text = annotated();
    let kass = elem(0, 4);

    assert_eq!(
        text.resolve_attribute("syntax", &kass, "lemma").unwrap(),
        vec![&Value::from("kass")]
    );
    // morph declares its own "normalized", which shadows the parent's
    assert_eq!(
        text.resolve_attribute("morph", &kass, "normalized").unwrap(),
        vec![&Value::Null]
    );
    assert_eq!(
        text.resolve_attribute("words", &kass, "deprel").unwrap(),
        vec![&Value::from("nsubj")]
    );
    assert_eq!(
        text.attribute_index().resolving_layer("syntax", "normalized"),
        Some("morph")
    );
    assert!(matches!(
        text.resolve_attribute("sentences", &kass, "lemma"),
        Err(LayerError::UnresolvedAttribute { .. })
    ));
    assert!(matches!(
        text.resolve_attribute("words", &elem(5, 12), "deprel"),
        Err(LayerError::SpanNotFound { .. })
    ));
}

#[test]
fn test_parent_and_enveloped_spans() {
    let text = annotated();
    let parent = text.parent_span("syntax", &elem(0, 4)).unwrap();
    assert_eq!(parent.get("lemma"), Some(&Value::from("kass")));
    assert!(matches!(
        text.parent_span("words", &elem(0, 4)),
        Err(LayerError::WrongRelation { .. })
    ));

    let sentence = text.get_layer("sentences").unwrap()[0].base_span().clone();
    let spans = text.enveloped_spans("sentences", &sentence).unwrap();
    let surface: Vec<&str> = spans
        .iter()
        .filter_map(|span| span.enclosing_text(text.text()))
        .collect();
    assert_eq!(surface, vec!["Kass", "jooksis", "."]);
}

#[test]
fn test_text_diff() {
    let text = annotated();
    assert_eq!(text.diff(&annotated()), None);
    assert_eq!(text, annotated());

    let mut other = annotated();
    other.pop_layer("syntax", false).unwrap();
    assert!(text.diff(&other).unwrap().starts_with("Layer names differ"));

    let mut other = annotated();
    other.meta_mut().insert("source".into(), Value::from("test"));
    assert_eq!(text.diff(&other), Some("Meta differs".to_string()));
}
