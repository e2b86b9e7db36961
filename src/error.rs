//! Error types for the layered annotation model.
//!
//! Every violation is a programmer or data error: nothing here is retried or
//! downgraded, the error is returned to the caller as soon as it is detected.

use thiserror::Error;

use crate::RawSpan;

/// Errors raised by base spans, layers and texts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    /// An elementary base span with `start > end`.
    #[error("invalid base span: start {start} is greater than end {end}")]
    InvalidBaseSpan { start: usize, end: usize },

    /// An enveloping base span without children.
    #[error("enveloping base span must contain at least one span")]
    EmptyEnvelope,

    /// Children of an enveloping base span are not in increasing order.
    #[error("enveloping base span children are not sorted: {previous} is followed by {next}")]
    UnsortedEnvelope { previous: RawSpan, next: RawSpan },

    /// Children of an enveloping base span overlap.
    #[error("enveloping base span children overlap: {previous} and {next}")]
    OverlappingEnvelope { previous: RawSpan, next: RawSpan },

    /// Children of an enveloping base span have different levels.
    #[error("enveloping base span children have mixed levels: expected {expected}, found {found}")]
    MixedLevels { expected: usize, found: usize },

    /// A base span was reduced to a level above its own.
    #[error("cannot reduce base span {position} of level {level} to level {requested}")]
    LevelMismatch {
        position: RawSpan,
        level: usize,
        requested: usize,
    },

    /// Layer name is not an identifier.
    #[error("layer name must be a valid identifier, got {0:?}")]
    InvalidLayerName(String),

    /// Layer name is reserved.
    #[error("layer name {0:?} is reserved")]
    ReservedLayerName(String),

    /// Attribute name is not an identifier.
    #[error("layer {layer:?}: attribute name must be a valid identifier, got {attribute:?}")]
    InvalidAttributeName { layer: String, attribute: String },

    /// Attribute declared twice.
    #[error("layer {layer:?}: repetitive attribute name {attribute:?}")]
    DuplicateAttribute { layer: String, attribute: String },

    /// A layer declared with both `parent` and `enveloping`.
    #[error("layer {layer:?} can't be derived AND enveloping")]
    ParentAndEnveloping { layer: String },

    /// A layer declared as its own parent or enveloped layer.
    #[error("layer {layer:?} cannot depend on itself")]
    SelfReference { layer: String },

    /// Attribute is not declared by the layer.
    #[error("layer {layer:?} has no attribute {attribute:?}")]
    UnknownAttribute { layer: String, attribute: String },

    /// NaN or infinite float in an attribute value.
    #[error("layer {layer:?}: attribute {attribute:?} holds a non-finite float")]
    NonFiniteValue { layer: String, attribute: String },

    /// Span without annotations.
    #[error("layer {layer:?}: the span {position} has no annotations")]
    MissingAnnotations { layer: String, position: RawSpan },

    /// Span of an unambiguous layer with more than one annotation.
    #[error("layer {layer:?} is not ambiguous but the span {position} has {count} annotations")]
    TooManyAnnotations {
        layer: String,
        position: RawSpan,
        count: usize,
    },

    /// Second, different annotation for a span of an unambiguous layer.
    #[error("layer {layer:?} is not ambiguous and the span {position} already has a different annotation")]
    AlreadyAnnotated { layer: String, position: RawSpan },

    /// Second span at an occupied position of an unambiguous layer.
    #[error("layer {layer:?} already has a span with the base span {position}")]
    DuplicatePosition { layer: String, position: RawSpan },

    /// Elementary base span given to an enveloping layer or vice versa.
    #[error("layer {layer:?} requires {expected} base spans, got {position}")]
    WrongSpanKind {
        layer: String,
        expected: &'static str,
        position: RawSpan,
    },

    /// No span at the given position.
    #[error("layer {layer:?} has no span at {position}")]
    SpanNotFound { layer: String, position: RawSpan },

    /// A constituent of an enveloping span is missing from the enveloped layer.
    #[error("enveloped layer {enveloped:?} has no span at {position}")]
    MissingEnvelopedSpan { enveloped: String, position: RawSpan },

    /// Span index out of range.
    #[error("layer {layer:?}: index {index} out of range for {len} spans")]
    IndexOutOfRange {
        layer: String,
        index: usize,
        len: usize,
    },

    /// Attribute projection without attributes.
    #[error("layer {layer:?}: no attributes selected")]
    NoAttributes { layer: String },

    /// Mutation of a frozen layer.
    #[error("layer {layer:?} is frozen")]
    FrozenLayer { layer: String },

    /// Operation refused while other layers depend on this one.
    #[error("layer {layer:?} is still required by {dependents:?}")]
    LayerHasDependents {
        layer: String,
        dependents: Vec<String>,
    },

    /// A layer with the same name is already attached.
    #[error("text already has a layer named {0:?}")]
    LayerExists(String),

    /// No layer with the given name is attached.
    #[error("text has no layer named {0:?}")]
    MissingLayer(String),

    /// Parent or enveloped layer missing from the text.
    #[error("can't add layer {layer:?} before adding the layer it depends on: {dependency:?}")]
    MissingDependency { layer: String, dependency: String },

    /// The layer has no parent or is not enveloping.
    #[error("layer {layer:?} is not {relation}")]
    WrongRelation {
        layer: String,
        relation: &'static str,
    },

    /// Constituents looked up in a layer other than the enveloped one.
    #[error("layer {layer:?} envelops {expected:?}, not {found:?}")]
    WrongEnvelopedLayer {
        layer: String,
        expected: String,
        found: String,
    },

    /// A span reaching past the end of the text.
    #[error("layer {layer:?}: span {position} ends beyond the text length {text_len}")]
    SpanOutOfBounds {
        layer: String,
        position: RawSpan,
        text_len: usize,
    },

    /// No layer commensurable with `layer` declares `attribute`.
    #[error("unable to resolve attribute {attribute:?} for layer {layer:?}")]
    UnresolvedAttribute { layer: String, attribute: String },

    /// Layer failed its self-audit.
    #[error("layer {layer:?} is inconsistent: {reason}")]
    Inconsistent { layer: String, reason: String },
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;
