//! Interactive view model: key routing, the tick-driven render pump, and
//! frame composition (header, thread viewport, hint footer).

use dmthread_core::conversation::{Conversation, ConversationOptions};
use dmthread_core::model::RawMessage;
use dmthread_core::render::Progress;

use crate::frame::{Frame, Line, Span, TextRole};
use crate::thread_view::{avatar_glyph, TerminalSurface};

/// Header name/status plus the rule under them.
const HEADER_ROWS: usize = 2;
/// Hint line at the bottom.
const FOOTER_ROWS: usize = 1;

/// Canonical key set consumed by the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    PageUp,
    PageDown,
}

/// Input stream events produced by the terminal loop. `Tick` is the
/// cooperative yield point: each one pumps the active render task once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize { width: usize, height: usize },
    Tick,
}

pub struct App {
    conversation: Conversation,
    surface: TerminalSurface,
    width: usize,
    height: usize,
    quitting: bool,
}

impl App {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            conversation: Conversation::new(),
            surface: TerminalSurface::new(width),
            width,
            height,
            quitting: false,
        }
    }

    /// Load a conversation into the view. Rendering proceeds batch by
    /// batch on subsequent ticks.
    pub fn open(&mut self, raw: Vec<RawMessage>, options: ConversationOptions) {
        self.conversation
            .set_conversation(raw, options, &mut self.surface);
    }

    #[must_use]
    pub fn quitting(&self) -> bool {
        self.quitting
    }

    #[must_use]
    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    fn thread_height(&self) -> usize {
        self.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS).max(1)
    }

    /// Route one input event. Returns whether the screen needs repainting.
    pub fn update(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::Resize { width, height } => {
                self.width = width.max(1);
                self.height = height.max(1);
                self.surface.set_width(self.width);
                true
            }
            InputEvent::Tick => {
                if !self.conversation.is_rendering() {
                    return false;
                }
                self.conversation.pump(&mut self.surface) != Progress::Cancelled
            }
        }
    }

    fn on_key(&mut self, key: Key) -> bool {
        let height = self.thread_height();
        match key {
            Key::Char('q') | Key::Escape => {
                self.quitting = true;
                true
            }
            Key::Up | Key::Char('k') => {
                self.surface.scroll_by(-1, height);
                true
            }
            Key::Down | Key::Char('j') => {
                self.surface.scroll_by(1, height);
                true
            }
            Key::PageUp => {
                self.surface.scroll_by(-(height as isize), height);
                true
            }
            Key::PageDown => {
                self.surface.scroll_by(height as isize, height);
                true
            }
            Key::Char('G') => {
                self.surface.jump_to_latest(height);
                true
            }
            Key::Enter | Key::Char('n') => {
                if self.conversation.window().has_next() {
                    self.conversation.load_next(&mut self.surface);
                    true
                } else {
                    false
                }
            }
            Key::Char(_) => false,
        }
    }

    /// Compose the full screen: header, thread viewport, hint footer.
    #[must_use]
    pub fn render(&self) -> Frame {
        let mut frame = Frame::new(self.width);

        if let Some(header) = self.surface.header() {
            let mut spans = vec![
                Span::new(TextRole::Muted, format!("{} ", avatar_glyph(&header.avatar))),
                Span::new(TextRole::Accent, header.name.clone()),
            ];
            if !header.status.is_empty() {
                spans.push(Span::new(TextRole::Muted, format!("  {}", header.status)));
            }
            frame.push(Line::from_spans(spans));
        } else {
            frame.push_blank();
        }
        frame.push(Line::plain(TextRole::Separator, "─".repeat(self.width)));

        let height = self.thread_height();
        for line in self.surface.visible_lines(height) {
            frame.push(line.clone());
        }
        for _ in self.surface.visible_lines(height).len()..height {
            frame.push_blank();
        }

        frame.push(Line::plain(TextRole::Muted, self.footer_hint(height)));
        frame
    }

    fn footer_hint(&self, height: usize) -> String {
        let mut hints = vec!["↑/↓ 스크롤".to_owned()];
        if self.conversation.window().has_next() {
            hints.push(format!("Enter {}", crate::thread_view::LOAD_MORE_LABEL));
        }
        if !self.surface.is_near_latest(height) {
            hints.push("G 최신으로".to_owned());
        }
        hints.push("q 종료".to_owned());
        hints.join("  ")
    }
}

#[cfg(test)]
mod tests {
    use dmthread_core::conversation::ConversationOptions;
    use dmthread_core::model::RawMessage;
    use dmthread_core::render::ThreadSurface;

    use super::{App, InputEvent, Key};

    const BASE_TS: i64 = 1_700_000_000_000;

    fn raw_batch(count: usize) -> Vec<RawMessage> {
        (0..count)
            .map(|i| RawMessage::text_record("other", BASE_TS + i as i64 * 1000, &format!("m{i}")))
            .collect()
    }

    fn options() -> ConversationOptions {
        ConversationOptions {
            me: Some("me".to_owned()),
            other: Some("설빈".to_owned()),
            header_status: Some("온라인".to_owned()),
            ..ConversationOptions::default()
        }
    }

    fn open_and_settle(app: &mut App, count: usize, options: ConversationOptions) {
        app.open(raw_batch(count), options);
        while app.update(InputEvent::Tick) {}
    }

    #[test]
    fn frame_carries_header_name_and_status() {
        let mut app = App::new(40, 12);
        open_and_settle(&mut app, 2, options());
        let snapshot = app.render().snapshot();
        assert!(snapshot.contains("설빈"));
        assert!(snapshot.contains("온라인"));
    }

    #[test]
    fn ticks_pump_until_render_settles() {
        let mut app = App::new(40, 12);
        let mut opts = options();
        opts.batch_size = Some(1);
        app.open(raw_batch(3), opts);

        assert!(app.update(InputEvent::Tick));
        assert!(app.update(InputEvent::Tick));
        assert!(app.update(InputEvent::Tick));
        // Render settled; further ticks are no-ops.
        assert!(!app.update(InputEvent::Tick));
        assert!(app.render().snapshot().contains("m2"));
    }

    #[test]
    fn enter_expands_the_window() {
        let mut app = App::new(40, 12);
        let mut opts = options();
        opts.initial_render = Some(2);
        opts.load_step = Some(2);
        open_and_settle(&mut app, 4, opts);
        assert!(app.render().snapshot().contains("불러오기"));

        assert!(app.update(InputEvent::Key(Key::Enter)));
        while app.update(InputEvent::Tick) {}
        let snapshot = app.render().snapshot();
        assert!(snapshot.contains("m3"));

        // Window exhausted; Enter no longer does anything.
        assert!(!app.update(InputEvent::Key(Key::Enter)));
    }

    #[test]
    fn scroll_keys_move_the_viewport() {
        let mut app = App::new(40, 8);
        open_and_settle(&mut app, 30, options());
        let before = app.surface().scroll_offset();
        assert!(app.update(InputEvent::Key(Key::Down)));
        assert!(app.surface().scroll_offset() > before);
        assert!(app.update(InputEvent::Key(Key::Char('G'))));
        let max = app.surface().scroll_offset();
        assert!(app.update(InputEvent::Key(Key::PageUp)));
        assert!(app.surface().scroll_offset() < max);
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut app = App::new(40, 12);
        assert!(app.update(InputEvent::Key(Key::Char('q'))));
        assert!(app.quitting());
    }

    #[test]
    fn resize_updates_frame_width() {
        let mut app = App::new(40, 12);
        open_and_settle(&mut app, 1, options());
        assert!(app.update(InputEvent::Resize {
            width: 60,
            height: 20,
        }));
        assert_eq!(app.render().width(), 60);
    }
}
