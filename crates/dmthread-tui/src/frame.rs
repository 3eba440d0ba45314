//! Chat-oriented text frame: rows of styled spans with a plain-text
//! snapshot helper for lightweight regression tests.

/// Semantic role for rendered text. The terminal painter maps roles to
/// colors; tests compare the role stream directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Primary,
    Muted,
    Accent,
    BubbleIn,
    BubbleOut,
    Separator,
}

/// A run of characters sharing one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub role: TextRole,
}

impl Span {
    #[must_use]
    pub fn new(role: TextRole, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// One frame row. Spans are laid out left to right; positioning is done
/// with explicit padding spans so the painter stays a dumb character loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub fn plain(role: TextRole, text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::new(role, text)],
        }
    }

    #[must_use]
    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Display width in characters.
    #[must_use]
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// Concatenated text, without styling.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A rendered screen: fixed width, top-to-bottom rows. Rows longer than
/// the width are clipped at paint/snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    lines: Vec<Line>,
}

impl Frame {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn push_blank(&mut self) {
        self.lines.push(Line::default());
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn row_text(&self, y: usize) -> String {
        self.lines
            .get(y)
            .map(|line| line.text().chars().take(self.width).collect())
            .unwrap_or_default()
    }

    /// Text-only snapshot for regression tests.
    #[must_use]
    pub fn snapshot(&self) -> String {
        (0..self.lines.len())
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pad `text` on both sides to center it within `width` characters.
#[must_use]
pub fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_owned();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Pad `text` on the left so its last character lands at column `width`.
#[must_use]
pub fn right_align(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_owned();
    }
    format!("{}{}", " ".repeat(width - len), text)
}
