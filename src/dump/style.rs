// Styled-run line accumulator.
//
// Rendering produces a sequence of {text, style} spans; only the terminal
// renderer knows the escape codes, so the codec never concatenates them.

/// Rendering style of one span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    /// Highlighted (diff) content.
    Emphasis,
}

/// ANSI SGR sequence that clears all attributes.
pub const SGR_RESET: &str = "\x1b[0m";

/// ANSI SGR sequence for highlighted content (reset + bold).
pub const SGR_EMPHASIS: &str = "\x1b[0;1m";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    text: String,
    style: Style,
}

/// One rendered display line as a run of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    spans: Vec<Span>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, merging into the previous span when the style matches.
    pub fn push_str(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.style == style
        {
            last.text.push_str(text);
            return;
        }
        self.spans.push(Span {
            text: text.to_string(),
            style,
        });
    }

    pub fn push_char(&mut self, c: char, style: Style) {
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf), style);
    }

    /// Append every span of `other`.
    pub fn append(&mut self, other: StyledLine) {
        for span in other.spans {
            self.push_str(&span.text, span.style);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Concatenate span text with no escape codes.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            out.push_str(&span.text);
        }
        out
    }

    /// Render with ANSI SGR codes around emphasized runs.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        let mut current = Style::Plain;
        for span in &self.spans {
            if span.style != current {
                out.push_str(match span.style {
                    Style::Plain => SGR_RESET,
                    Style::Emphasis => SGR_EMPHASIS,
                });
                current = span.style;
            }
            out.push_str(&span.text);
        }
        if current == Style::Emphasis {
            out.push_str(SGR_RESET);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
