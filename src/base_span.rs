//! Positional identity of annotated text fragments.
//!
//! A [`BaseSpan`] says *where* something is, never *what* it is. Two spans on
//! different layers that cover the same fragment compare equal through their
//! base spans, which is how layers are joined.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LayerError, LayerResult};

/// Contiguous byte range `[start, end)` of the raw text. Level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementaryBaseSpan {
    start: usize,
    end: usize,
}

impl ElementaryBaseSpan {
    pub fn new(start: usize, end: usize) -> LayerResult<Self> {
        if start > end {
            return Err(LayerError::InvalidBaseSpan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn raw(&self) -> RawSpan {
        RawSpan::Elementary(self.start, self.end)
    }
}

/// Ordered, non-overlapping sequence of base spans of one common level.
///
/// The level of an enveloping base span is one more than the level of its
/// children; `start` and `end` are taken from the first and last child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvelopingBaseSpan {
    spans: Vec<BaseSpan>,
    start: usize,
    end: usize,
    level: usize,
}

impl EnvelopingBaseSpan {
    pub fn new<I, S>(spans: I) -> LayerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<BaseSpan>,
    {
        let spans: Vec<BaseSpan> = spans.into_iter().map(Into::into).collect();
        let (first, last) = match (spans.first(), spans.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(LayerError::EmptyEnvelope),
        };

        let child_level = first.level();
        for pair in spans.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.level() != child_level {
                return Err(LayerError::MixedLevels {
                    expected: child_level,
                    found: next.level(),
                });
            }
            if previous >= next {
                return Err(LayerError::UnsortedEnvelope {
                    previous: previous.raw(),
                    next: next.raw(),
                });
            }
            if previous.end() > next.start() {
                return Err(LayerError::OverlappingEnvelope {
                    previous: previous.raw(),
                    next: next.raw(),
                });
            }
        }

        Ok(Self {
            start: first.start(),
            end: last.end(),
            level: child_level + 1,
            spans,
        })
    }

    pub fn spans(&self) -> &[BaseSpan] {
        &self.spans
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn raw(&self) -> RawSpan {
        RawSpan::Enveloping(self.spans.iter().map(BaseSpan::raw).collect())
    }
}

/// Either an elementary or an enveloping base span.
///
/// Ordering is by `(start, end)` first and structure second, which makes it
/// total and consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseSpan {
    Elementary(ElementaryBaseSpan),
    Enveloping(EnvelopingBaseSpan),
}

impl BaseSpan {
    pub fn elementary(start: usize, end: usize) -> LayerResult<Self> {
        ElementaryBaseSpan::new(start, end).map(BaseSpan::Elementary)
    }

    pub fn enveloping<I, S>(spans: I) -> LayerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<BaseSpan>,
    {
        EnvelopingBaseSpan::new(spans).map(BaseSpan::Enveloping)
    }

    pub fn start(&self) -> usize {
        match self {
            BaseSpan::Elementary(span) => span.start,
            BaseSpan::Enveloping(span) => span.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            BaseSpan::Elementary(span) => span.end,
            BaseSpan::Enveloping(span) => span.end,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            BaseSpan::Elementary(_) => 0,
            BaseSpan::Enveloping(span) => span.level,
        }
    }

    pub fn is_enveloping(&self) -> bool {
        matches!(self, BaseSpan::Enveloping(_))
    }

    pub fn as_enveloping(&self) -> Option<&EnvelopingBaseSpan> {
        match self {
            BaseSpan::Enveloping(span) => Some(span),
            BaseSpan::Elementary(_) => None,
        }
    }

    /// Elementary spans covered by this span, in text order.
    ///
    /// Nesting is erased: flattening a two-level span yields the same
    /// sequence as the equivalent one-level span.
    pub fn flatten(&self) -> Box<dyn Iterator<Item = ElementaryBaseSpan> + '_> {
        match self {
            BaseSpan::Elementary(span) => Box::new(std::iter::once(*span)),
            BaseSpan::Enveloping(span) => {
                Box::new(span.spans.iter().flat_map(|child| child.flatten()))
            }
        }
    }

    /// Descendants of this span at the given level.
    pub fn reduce(&self, level: usize) -> LayerResult<Vec<&BaseSpan>> {
        let mut reduced = Vec::new();
        self.reduce_into(level, &mut reduced)?;
        Ok(reduced)
    }

    fn reduce_into<'a>(&'a self, level: usize, out: &mut Vec<&'a BaseSpan>) -> LayerResult<()> {
        match self {
            _ if self.level() == level => out.push(self),
            BaseSpan::Enveloping(span) if span.level > level => {
                for child in &span.spans {
                    child.reduce_into(level, out)?;
                }
            }
            _ => {
                return Err(LayerError::LevelMismatch {
                    position: self.raw(),
                    level: self.level(),
                    requested: level,
                })
            }
        }
        Ok(())
    }

    pub fn raw(&self) -> RawSpan {
        match self {
            BaseSpan::Elementary(span) => span.raw(),
            BaseSpan::Enveloping(span) => span.raw(),
        }
    }
}

impl Ord for BaseSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start(), self.end())
            .cmp(&(other.start(), other.end()))
            .then_with(|| match (self, other) {
                (BaseSpan::Elementary(_), BaseSpan::Elementary(_)) => Ordering::Equal,
                (BaseSpan::Elementary(_), BaseSpan::Enveloping(_)) => Ordering::Less,
                (BaseSpan::Enveloping(_), BaseSpan::Elementary(_)) => Ordering::Greater,
                (BaseSpan::Enveloping(left), BaseSpan::Enveloping(right)) => {
                    left.spans.iter().cmp(right.spans.iter())
                }
            })
    }
}

impl PartialOrd for BaseSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<ElementaryBaseSpan> for BaseSpan {
    fn from(span: ElementaryBaseSpan) -> Self {
        BaseSpan::Elementary(span)
    }
}

impl From<EnvelopingBaseSpan> for BaseSpan {
    fn from(span: EnvelopingBaseSpan) -> Self {
        BaseSpan::Enveloping(span)
    }
}

impl From<&BaseSpan> for BaseSpan {
    fn from(span: &BaseSpan) -> Self {
        span.clone()
    }
}

impl TryFrom<(usize, usize)> for BaseSpan {
    type Error = LayerError;

    fn try_from((start, end): (usize, usize)) -> LayerResult<Self> {
        BaseSpan::elementary(start, end)
    }
}

impl TryFrom<RawSpan> for BaseSpan {
    type Error = LayerError;

    fn try_from(raw: RawSpan) -> LayerResult<Self> {
        raw.to_base_span()
    }
}

impl fmt::Display for BaseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw(), f)
    }
}

/// Plain nested form of a base span: a `(start, end)` pair or a list of
/// nested raw spans. This is what gets serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSpan {
    Elementary(usize, usize),
    Enveloping(Vec<RawSpan>),
}

impl RawSpan {
    pub fn to_base_span(&self) -> LayerResult<BaseSpan> {
        match self {
            RawSpan::Elementary(start, end) => BaseSpan::elementary(*start, *end),
            RawSpan::Enveloping(spans) => {
                let children = spans
                    .iter()
                    .map(RawSpan::to_base_span)
                    .collect::<LayerResult<Vec<_>>>()?;
                BaseSpan::enveloping(children)
            }
        }
    }
}

impl fmt::Display for RawSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawSpan::Elementary(start, end) => write!(f, "({}, {})", start, end),
            RawSpan::Enveloping(spans) => {
                f.write_str("[")?;
                for (i, span) in spans.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", span)?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn elem(start: usize, end: usize) -> BaseSpan {
        BaseSpan::elementary(start, end).unwrap()
    }

    #[test]
    fn test_elementary_rejects_reversed_range() {
        assert_eq!(
            BaseSpan::elementary(5, 3),
            Err(LayerError::InvalidBaseSpan { start: 5, end: 3 })
        );
        assert!(BaseSpan::elementary(3, 3).is_ok());
    }

    #[test]
    fn test_enveloping_bounds_and_level() {
        let span = BaseSpan::enveloping([elem(0, 4), elem(5, 13)]).unwrap();
        assert_eq!(span.start(), 0);
        assert_eq!(span.end(), 13);
        assert_eq!(span.level(), 1);

        let flattened: Vec<_> = span.flatten().map(|s| (s.start(), s.end())).collect();
        assert_eq!(flattened, vec![(0, 4), (5, 13)]);
    }

    #[test]
    fn test_enveloping_validation() {
        assert_eq!(
            BaseSpan::enveloping(Vec::<BaseSpan>::new()),
            Err(LayerError::EmptyEnvelope)
        );
        assert!(matches!(
            BaseSpan::enveloping([elem(5, 13), elem(0, 4)]),
            Err(LayerError::UnsortedEnvelope { .. })
        ));
        assert!(matches!(
            BaseSpan::enveloping([elem(0, 6), elem(5, 13)]),
            Err(LayerError::OverlappingEnvelope { .. })
        ));
        assert!(matches!(
            BaseSpan::enveloping([elem(0, 4), elem(4, 4), elem(4, 4)]),
            Err(LayerError::UnsortedEnvelope { .. })
        ));

        let inner = BaseSpan::enveloping([elem(6, 8)]).unwrap();
        assert_eq!(
            BaseSpan::enveloping([elem(0, 4), inner]),
            Err(LayerError::MixedLevels {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn test_flatten_erases_nesting() {
        let nested = BaseSpan::enveloping([
            BaseSpan::enveloping([elem(0, 2), elem(3, 5)]).unwrap(),
            BaseSpan::enveloping([elem(6, 9)]).unwrap(),
        ])
        .unwrap();
        let flat = BaseSpan::enveloping([elem(0, 2), elem(3, 5), elem(6, 9)]).unwrap();

        assert_eq!(nested.level(), 2);
        assert!(nested.flatten().eq(flat.flatten()));
        assert_ne!(nested, flat);
    }

    #[test]
    fn test_reduce() {
        let nested = BaseSpan::enveloping([
            BaseSpan::enveloping([elem(0, 2), elem(3, 5)]).unwrap(),
            BaseSpan::enveloping([elem(6, 9)]).unwrap(),
        ])
        .unwrap();

        let words: Vec<RawSpan> = nested.reduce(0).unwrap().into_iter().map(BaseSpan::raw).collect();
        assert_eq!(
            words,
            vec![
                RawSpan::Elementary(0, 2),
                RawSpan::Elementary(3, 5),
                RawSpan::Elementary(6, 9)
            ]
        );
        assert_eq!(nested.reduce(1).unwrap().len(), 2);
        assert_eq!(nested.reduce(2).unwrap(), vec![&nested]);
        assert!(matches!(
            elem(0, 2).reduce(1),
            Err(LayerError::LevelMismatch { requested: 1, .. })
        ));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let left = BaseSpan::enveloping([elem(0, 4), elem(5, 13)]).unwrap();
        let right = RawSpan::Enveloping(vec![RawSpan::Elementary(0, 4), RawSpan::Elementary(5, 13)])
            .to_base_span()
            .unwrap();
        assert_eq!(left, right);

        let mut set = HashSet::new();
        set.insert(left);
        assert!(set.contains(&right));
        assert!(!set.contains(&elem(0, 13)));
    }

    #[test]
    fn test_ordering() {
        let mut spans = vec![
            BaseSpan::enveloping([elem(0, 4), elem(5, 13)]).unwrap(),
            elem(5, 13),
            elem(0, 13),
            elem(0, 4),
        ];
        spans.sort();
        let raw: Vec<String> = spans.iter().map(ToString::to_string).collect();
        assert_eq!(raw, vec!["(0, 4)", "(0, 13)", "[(0, 4), (5, 13)]", "(5, 13)"]);
    }

    #[test]
    fn test_raw_span_json_shape() {
        let span = BaseSpan::enveloping([elem(0, 4), elem(5, 13)]).unwrap();
        let json = serde_json::to_string(&span.raw()).unwrap();
        assert_eq!(json, "[[0,4],[5,13]]");

        let parsed: RawSpan = serde_json::from_str(&json).unwrap();
        assert_eq!(BaseSpan::try_from(parsed).unwrap(), span);
    }
}
