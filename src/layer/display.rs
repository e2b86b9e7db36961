use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::{Layer, Span, Text};

/// One rendered row below the text.
struct IncludedSpan {
    start: usize,
    end: usize,
    label: String,
}

/// Renders spans of one or more layers under the text they annotate.
///
/// ```text
/// Kass jooksis.
/// ╰──╯ words[normalized="kass"]
///      ╰─────╯ words[normalized="jooksis"]
/// ╰──────────╯ phrases[kind="S"]
/// ```
pub struct LayerDisplay<'a> {
    text: &'a Text,
    include_spans: Vec<IncludedSpan>,
}

impl<'a> std::fmt::Display for LayerDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = self.text.text();
        // newlines would break the column layout
        let opening_line: String = raw
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        f.write_str(&opening_line)?;

        for included in self.include_spans.iter() {
            f.write_char('\n')?;

            let start_char_idx = display_width(&opening_line, included.start);
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = display_width(&opening_line, included.end).max(start_char_idx);
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            write!(f, " {}", included.label)?;
        }

        Ok(())
    }
}

/// Column of byte offset `offset`, falling back to the offset itself when it
/// is not a char boundary.
fn display_width(line: &str, offset: usize) -> usize {
    line.get(..offset)
        .map(UnicodeWidthStr::width)
        .unwrap_or(offset)
}

impl<'a> LayerDisplay<'a> {
    pub fn new(text: &'a Text) -> Self {
        LayerDisplay {
            text,
            include_spans: Vec::new(),
        }
    }

    /// Adds one row per annotation of every span of `layer`.
    pub fn include(&mut self, layer: &Layer) {
        for span in layer.iter() {
            for annotation in span.annotations() {
                let values: Vec<String> = layer
                    .attributes()
                    .iter()
                    .filter_map(|name| annotation.get(name).map(|value| format!("{}={}", name, value)))
                    .collect();
                let label = if values.is_empty() {
                    layer.name().to_string()
                } else {
                    format!("{}[{}]", layer.name(), values.join(", "))
                };
                self.push(span, label);
            }
        }
    }

    /// Takes self
    pub fn with(mut self, layer: &Layer) -> Self {
        self.include(layer);
        self
    }

    fn push(&mut self, span: &Span, label: String) {
        self.include_spans.push(IncludedSpan {
            start: span.start(),
            end: span.end(),
            label,
        });
    }
}
