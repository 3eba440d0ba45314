//! Terminal thread surface: lays thread nodes out as frame lines.
//!
//! Incoming rows sit on the left behind a two-column avatar gutter,
//! outgoing rows are right-aligned, separators and the load-more control
//! are centered. Scrolling is row-based; offset 0 is the oldest line.

use dmthread_core::model::AttachmentKind;
use dmthread_core::render::{
    AvatarSource, Direction, HeaderSpec, Row, ThreadNode, ThreadSurface,
};

use crate::frame::{center, right_align, Line, Span, TextRole};

/// Rows of slack before the jump-to-latest affordance appears.
pub const JUMP_THRESHOLD_ROWS: usize = 4;

/// Label on the trailing window-expansion control.
pub const LOAD_MORE_LABEL: &str = "다음 메시지 불러오기";

/// Columns reserved for the peer avatar gutter.
const AVATAR_GUTTER: usize = 2;

fn media_label(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Photo => "사진",
        AttachmentKind::Video => "동영상",
        AttachmentKind::Audio => "음성 메시지",
    }
}

pub(crate) fn avatar_glyph(source: &AvatarSource) -> char {
    match source {
        AvatarSource::Uri(_) => '@',
        AvatarSource::Fallback { initial } => *initial,
    }
}

/// The terminal implementation of the pipeline's display surface. Nodes
/// are flattened to lines as they arrive; a re-render clears and rebuilds.
#[derive(Debug)]
pub struct TerminalSurface {
    width: usize,
    lines: Vec<Line>,
    scroll: usize,
    header: Option<HeaderSpec>,
}

impl TerminalSurface {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(AVATAR_GUTTER + 1),
            lines: Vec::new(),
            scroll: 0,
            header: None,
        }
    }

    #[must_use]
    pub fn header(&self) -> Option<&HeaderSpec> {
        self.header.as_ref()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(AVATAR_GUTTER + 1);
    }

    /// Largest valid scroll offset for a viewport of `height` rows.
    #[must_use]
    pub fn max_scroll(&self, height: usize) -> usize {
        self.lines.len().saturating_sub(height)
    }

    /// The slice of lines visible through a viewport of `height` rows.
    #[must_use]
    pub fn visible_lines(&self, height: usize) -> &[Line] {
        let start = self.scroll.min(self.lines.len());
        let end = (start + height).min(self.lines.len());
        &self.lines[start..end]
    }

    pub fn scroll_by(&mut self, delta: isize, height: usize) {
        let max = self.max_scroll(height);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn jump_to_latest(&mut self, height: usize) {
        self.scroll = self.max_scroll(height);
    }

    /// Within the slack band near the newest line. Outside it the view
    /// offers a jump-to-latest affordance.
    #[must_use]
    pub fn is_near_latest(&self, height: usize) -> bool {
        self.max_scroll(height) - self.scroll.min(self.max_scroll(height))
            <= JUMP_THRESHOLD_ROWS
    }

    // -----------------------------------------------------------------------
    // Node layout
    // -----------------------------------------------------------------------

    fn push_node(&mut self, node: ThreadNode) {
        match node {
            ThreadNode::DaySeparator { label } => {
                let rule = format!("── {label} ──");
                self.lines.push(Line::plain(
                    TextRole::Separator,
                    center(&rule, self.width),
                ));
            }
            ThreadNode::Spacer => self.lines.push(Line::default()),
            ThreadNode::LoadMore => {
                let control = format!("[ {LOAD_MORE_LABEL} ]");
                self.lines
                    .push(Line::plain(TextRole::Accent, center(&control, self.width)));
            }
            ThreadNode::Row(row) => self.push_row(row),
        }
    }

    fn push_row(&mut self, row: Row) {
        let bubble_role = match row.direction {
            Direction::In => TextRole::BubbleIn,
            Direction::Out => TextRole::BubbleOut,
        };

        let mut body: Vec<(TextRole, String)> = Vec::new();
        if let Some(reply) = row.reply {
            body.push((TextRole::Muted, format!("┌ {}: {}", reply.label, reply.text)));
        }
        for media in row.media {
            body.push((
                TextRole::Accent,
                format!("[{}] {}", media_label(media.kind), media.uri),
            ));
        }
        if let Some(card) = row.share {
            let mut head = format!("[{}]", card.kind.label());
            if let Some(owner) = card.owner {
                head.push(' ');
                head.push_str(&owner);
            }
            body.push((TextRole::Accent, head));
            body.push((bubble_role, card.body));
            body.push((TextRole::Muted, card.href));
        }
        if let Some(bubble) = row.bubble {
            body.push((bubble_role, bubble.text));
        }
        if let Some(pill) = row.reaction {
            let mut text = pill.emojis.join("");
            if let Some(count) = pill.count {
                text.push_str(&format!(" {count}"));
            }
            body.push((TextRole::Muted, text));
        }

        match row.direction {
            Direction::In => {
                // Avatar glyph on the first body line only; the gutter
                // keeps its width either way.
                let mut gutter_glyph = None;
                if let Some(slot) = row.avatar {
                    if !slot.hidden {
                        gutter_glyph = Some(avatar_glyph(&slot.source));
                    }
                }
                for (idx, (role, text)) in body.into_iter().enumerate() {
                    let gutter = match (idx, gutter_glyph) {
                        (0, Some(glyph)) => format!("{glyph} "),
                        _ => " ".repeat(AVATAR_GUTTER),
                    };
                    self.lines.push(Line::from_spans(vec![
                        Span::new(TextRole::Muted, gutter),
                        Span::new(role, text),
                    ]));
                }
            }
            Direction::Out => {
                for (role, text) in body {
                    self.lines
                        .push(Line::plain(role, right_align(&text, self.width)));
                }
            }
        }
    }
}

impl ThreadSurface for TerminalSurface {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append(&mut self, fragment: Vec<ThreadNode>) {
        for node in fragment {
            self.push_node(node);
        }
    }

    fn scroll_offset(&self) -> usize {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll = offset;
    }

    fn set_header(&mut self, header: HeaderSpec) {
        self.header = Some(header);
    }
}
