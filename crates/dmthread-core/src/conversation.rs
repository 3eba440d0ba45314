//! Conversation controller: owns identity state and the render window,
//! drives normalization and the windowed render task.

use crate::model::{CanonicalMessage, RawMessage};
use crate::normalize;
use crate::render::{
    AvatarSource, HeaderSpec, Progress, RenderTask, ThreadSurface, DEFAULT_BATCH_SIZE,
};

/// Messages materialized on the first render of a conversation.
pub const DEFAULT_INITIAL_RENDER: usize = 600;

/// Window growth per load-more action.
pub const DEFAULT_LOAD_STEP: usize = 600;

/// Per-call configuration. Every field is optional: omitted identity fields
/// retain their previous values, omitted tuning fields fall back to the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct ConversationOptions {
    pub me: Option<String>,
    pub other: Option<String>,
    pub other_avatar: Option<String>,
    pub me_avatar: Option<String>,
    pub header_name: Option<String>,
    pub header_status: Option<String>,
    pub initial_render: Option<usize>,
    pub load_step: Option<usize>,
    pub batch_size: Option<usize>,
}

/// Display identity, held explicitly by the controller rather than in
/// process-wide state. Options override fields only when provided.
#[derive(Debug, Clone)]
struct Identity {
    me: String,
    other: String,
    other_avatar: Option<String>,
    me_avatar: Option<String>,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            me: "나".to_owned(),
            other: "상대".to_owned(),
            other_avatar: None,
            me_avatar: None,
        }
    }
}

/// Visible prefix of the filtered sequence. `end` is exclusive and only
/// grows, via load-more, until it reaches `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderWindow {
    pub total: usize,
    pub end: usize,
}

impl RenderWindow {
    #[must_use]
    pub fn has_next(self) -> bool {
        self.end < self.total
    }
}

/// Scroll policy applied when the active render completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollPolicy {
    /// First render of a conversation starts at the oldest message.
    ResetToTop,
    /// Load-more re-renders restore the offset captured before they began.
    Restore(usize),
}

struct ActiveRender {
    task: RenderTask,
    scroll: ScrollPolicy,
}

/// The controller. One instance per conversation view; a new
/// `set_conversation` call supersedes (and cancels) any in-flight render.
#[derive(Default)]
pub struct Conversation {
    identity: Identity,
    filtered: Vec<CanonicalMessage>,
    window: RenderWindow,
    load_step: usize,
    batch_size: usize,
    active: Option<ActiveRender>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a conversation: merge options over retained identity, set the
    /// header, normalize/sort/filter, reset the window, and start the
    /// render task for the initial prefix. Call [`Conversation::pump`] once
    /// per display refresh until it reports completion.
    pub fn set_conversation(
        &mut self,
        raw: Vec<RawMessage>,
        options: ConversationOptions,
        surface: &mut dyn ThreadSurface,
    ) {
        self.apply_identity(&options);

        let header_name = options
            .header_name
            .clone()
            .unwrap_or_else(|| self.identity.other.clone());
        let header_status = options.header_status.clone().unwrap_or_default();
        surface.set_header(HeaderSpec {
            name: header_name,
            status: header_status,
            avatar: self.peer_avatar(),
        });

        self.filtered = normalize::build_conversation(raw, &self.identity.me);
        let total = self.filtered.len();
        let initial = options.initial_render.unwrap_or(DEFAULT_INITIAL_RENDER);
        self.load_step = options.load_step.unwrap_or(DEFAULT_LOAD_STEP);
        self.batch_size = options.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        self.window = RenderWindow {
            total,
            end: total.min(initial),
        };

        self.begin_render(ScrollPolicy::ResetToTop);
    }

    /// Expand the visible window by one load step and re-render, keeping
    /// the surface's scroll offset where it was when the action fired.
    /// No-op when the window is already exhausted.
    pub fn load_next(&mut self, surface: &mut dyn ThreadSurface) {
        if !self.window.has_next() {
            return;
        }
        let keep = surface.scroll_offset();
        self.window.end = self.window.total.min(self.window.end + self.load_step);
        self.begin_render(ScrollPolicy::Restore(keep));
    }

    /// Drive the active render task by one batch. The host calls this once
    /// per display-refresh opportunity; in between, the surface stays
    /// responsive. Applies the scroll policy on completion.
    pub fn pump(&mut self, surface: &mut dyn ThreadSurface) -> Progress {
        let Some(active) = self.active.as_mut() else {
            return Progress::Complete;
        };
        match active.task.step(surface) {
            Progress::Pending => Progress::Pending,
            Progress::Cancelled => {
                self.active = None;
                Progress::Cancelled
            }
            Progress::Complete => {
                match active.scroll {
                    ScrollPolicy::ResetToTop => surface.set_scroll_offset(0),
                    ScrollPolicy::Restore(offset) => surface.set_scroll_offset(offset),
                }
                self.active = None;
                Progress::Complete
            }
        }
    }

    /// Whether a render task is still in flight.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn window(&self) -> RenderWindow {
        self.window
    }

    /// The filtered, sorted canonical sequence behind the current view.
    #[must_use]
    pub fn messages(&self) -> &[CanonicalMessage] {
        &self.filtered
    }

    fn apply_identity(&mut self, options: &ConversationOptions) {
        if let Some(me) = &options.me {
            self.identity.me = me.clone();
        }
        if let Some(other) = &options.other {
            self.identity.other = other.clone();
        }
        if let Some(avatar) = &options.other_avatar {
            self.identity.other_avatar = Some(avatar.clone());
        }
        if let Some(avatar) = &options.me_avatar {
            self.identity.me_avatar = Some(avatar.clone());
        }
    }

    fn peer_avatar(&self) -> AvatarSource {
        AvatarSource::for_identity(self.identity.other_avatar.as_deref(), &self.identity.other)
    }

    /// Cancel any in-flight render and start a task for the current window.
    fn begin_render(&mut self, scroll: ScrollPolicy) {
        if let Some(active) = self.active.take() {
            active.task.token().cancel();
        }
        let visible = self.filtered[..self.window.end].to_vec();
        let task = RenderTask::new(
            visible,
            self.peer_avatar(),
            self.batch_size,
            self.window.has_next(),
        );
        self.active = Some(ActiveRender { task, scroll });
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversation, ConversationOptions, DEFAULT_INITIAL_RENDER};
    use crate::model::RawMessage;
    use crate::render::tests::RecordingSurface;
    use crate::render::{Progress, ThreadNode};

    const BASE_TS: i64 = 1_700_000_000_000;

    fn raw_batch(count: usize) -> Vec<RawMessage> {
        (0..count)
            .map(|i| RawMessage::text_record("me", BASE_TS + i as i64 * 1000, &format!("m{i}")))
            .collect()
    }

    fn options() -> ConversationOptions {
        ConversationOptions {
            me: Some("설빈".to_owned()),
            other: Some("이규민".to_owned()),
            header_name: Some("이규민".to_owned()),
            header_status: Some("최근 활동: 3시간 전".to_owned()),
            ..ConversationOptions::default()
        }
    }

    fn pump_to_completion(conv: &mut Conversation, surface: &mut RecordingSurface) {
        while conv.pump(surface) == Progress::Pending {}
    }

    fn row_count(surface: &RecordingSurface) -> usize {
        surface
            .nodes
            .iter()
            .filter(|n| matches!(n, ThreadNode::Row(_)))
            .count()
    }

    #[test]
    fn noise_is_filtered_end_to_end() {
        let raw = vec![
            RawMessage::text_record("me", 1000, "hi"),
            RawMessage::text_record("other", 61_000, "liked a message"),
            RawMessage::text_record("other", 91_000, "hello"),
        ];
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        let mut opts = options();
        opts.me = Some("me".to_owned());
        conv.set_conversation(raw, opts, &mut surface);
        pump_to_completion(&mut conv, &mut surface);

        assert_eq!(conv.messages().len(), 2);
        assert_eq!(row_count(&surface), 2);
    }

    #[test]
    fn windowing_renders_prefix_then_grows_to_total() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        let mut opts = options();
        opts.initial_render = Some(600);
        opts.load_step = Some(600);
        conv.set_conversation(raw_batch(1000), opts, &mut surface);
        pump_to_completion(&mut conv, &mut surface);

        assert_eq!(row_count(&surface), 600);
        assert!(matches!(surface.nodes.last(), Some(ThreadNode::LoadMore)));
        assert_eq!(conv.window().end, 600);

        // Simulate the user having scrolled down before loading more.
        surface.scroll = 420;
        conv.load_next(&mut surface);
        pump_to_completion(&mut conv, &mut surface);

        assert_eq!(row_count(&surface), 1000);
        assert!(!surface
            .nodes
            .iter()
            .any(|n| matches!(n, ThreadNode::LoadMore)));
        assert_eq!(conv.window().end, 1000);
        // Scroll offset preserved across the re-render.
        assert_eq!(surface.scroll, 420);
    }

    #[test]
    fn first_render_resets_scroll_to_top() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        surface.scroll = 99;
        conv.set_conversation(raw_batch(5), options(), &mut surface);
        pump_to_completion(&mut conv, &mut surface);
        assert_eq!(surface.scroll, 0);
    }

    #[test]
    fn default_initial_render_caps_the_window() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        conv.set_conversation(raw_batch(700), options(), &mut surface);
        assert_eq!(conv.window().end, DEFAULT_INITIAL_RENDER);
        assert_eq!(conv.window().total, 700);
    }

    #[test]
    fn header_reflects_options_and_identity() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        conv.set_conversation(raw_batch(1), options(), &mut surface);
        pump_to_completion(&mut conv, &mut surface);

        let Some(header) = surface.header.as_ref() else {
            panic!("header must be set");
        };
        assert_eq!(header.name, "이규민");
        assert_eq!(header.status, "최근 활동: 3시간 전");
    }

    #[test]
    fn identity_persists_across_calls_when_options_are_omitted() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        conv.set_conversation(raw_batch(1), options(), &mut surface);
        pump_to_completion(&mut conv, &mut surface);

        // Second load without identity options: header name falls back to
        // the retained peer identity.
        conv.set_conversation(raw_batch(1), ConversationOptions::default(), &mut surface);
        pump_to_completion(&mut conv, &mut surface);
        let Some(header) = surface.header.as_ref() else {
            panic!("header must be set");
        };
        assert_eq!(header.name, "이규민");
    }

    #[test]
    fn superseding_call_cancels_the_inflight_render() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        let mut opts = options();
        opts.batch_size = Some(10);
        conv.set_conversation(raw_batch(50), opts.clone(), &mut surface);
        assert_eq!(conv.pump(&mut surface), Progress::Pending);
        assert!(conv.is_rendering());

        // New conversation before the old render finished.
        conv.set_conversation(raw_batch(3), opts, &mut surface);
        pump_to_completion(&mut conv, &mut surface);
        assert_eq!(row_count(&surface), 3);
        assert!(!conv.is_rendering());
    }

    #[test]
    fn load_next_is_a_noop_when_exhausted() {
        let mut conv = Conversation::new();
        let mut surface = RecordingSurface::default();
        conv.set_conversation(raw_batch(3), options(), &mut surface);
        pump_to_completion(&mut conv, &mut surface);
        conv.load_next(&mut surface);
        assert!(!conv.is_rendering());
    }
}
