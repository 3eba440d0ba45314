//! Thread node model, the display-surface contract, and the batched
//! windowed render task.
//!
//! Rendering is an explicit cooperative task: each [`RenderTask::step`]
//! builds one bounded batch of nodes off-surface, appends it, and returns.
//! The host calls `step` once per display-refresh opportunity, so a large
//! conversation never blocks the surface. A shared [`CancelToken`] lets a
//! superseding conversation load stop an in-flight render at the next
//! batch boundary without touching the surface again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::grouping;
use crate::model::{AttachmentKind, CanonicalMessage, GroupFlags, Sender};
use crate::noise;
use crate::share::{self, ShareKind};

/// Messages materialized per step.
pub const DEFAULT_BATCH_SIZE: usize = 120;

/// Reply label when the export carries none.
pub const DEFAULT_REPLY_LABEL: &str = "회원님이 보낸 답장";

/// Canonical display glyph for all heart-variant reactions.
pub const CANONICAL_HEART: &str = "❤️";

/// At most this many distinct reaction emoji are shown on a pill.
pub const MAX_PILL_EMOJI: usize = 2;

// ---------------------------------------------------------------------------
// Node model
// ---------------------------------------------------------------------------

/// Row direction: `Out` for the configured self, `In` for the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    #[must_use]
    pub fn from_sender(sender: Sender) -> Self {
        match sender {
            Sender::Myself => Self::Out,
            Sender::Peer => Self::In,
        }
    }
}

/// Where an avatar image comes from. When no usable URI exists the surface
/// draws a generated placeholder from the identity's initial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    Uri(String),
    Fallback { initial: char },
}

impl AvatarSource {
    /// Prefer a configured URI; otherwise generate from the identity seed.
    #[must_use]
    pub fn for_identity(uri: Option<&str>, seed: &str) -> Self {
        match uri {
            Some(u) if !u.trim().is_empty() => Self::Uri(u.to_owned()),
            _ => Self::Fallback {
                initial: fallback_initial(seed),
            },
        }
    }

    /// The placeholder used when an avatar URI fails to load at display time.
    #[must_use]
    pub fn fallback_for(seed: &str) -> Self {
        Self::Fallback {
            initial: fallback_initial(seed),
        }
    }
}

/// Uppercased first character of the seed, `'U'` for empty seeds.
#[must_use]
pub fn fallback_initial(seed: &str) -> char {
    seed.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('U')
}

/// Header slots of the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub name: String,
    pub status: String,
    pub avatar: AvatarSource,
}

/// One renderable unit appended to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadNode {
    DaySeparator { label: String },
    Row(Row),
    /// Breathing room after a group boundary; grouped rows sit flush.
    Spacer,
    /// Trailing control that expands the visible window.
    LoadMore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub direction: Direction,
    /// Peer rows always get a slot; `hidden` reserves the space without the
    /// image when the next row visually merges into this group.
    pub avatar: Option<AvatarSlot>,
    pub reply: Option<ReplyPreview>,
    pub media: Vec<MediaNode>,
    pub share: Option<ShareCard>,
    pub bubble: Option<Bubble>,
    pub reaction: Option<ReactionPill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarSlot {
    pub source: AvatarSource,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPreview {
    pub label: String,
    pub text: String,
}

/// A media bubble, wrapped by the surface as a link to the raw URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaNode {
    pub kind: AttachmentKind,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCard {
    pub kind: ShareKind,
    pub owner: Option<String>,
    /// Share text when present, else the unwrapped display link, else the
    /// raw link.
    pub body: String,
    /// Normalized raw link the whole card points at.
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub text: String,
    pub tight_top: bool,
    pub tight_bottom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionPill {
    pub emojis: Vec<String>,
    /// Shown only when the maximum reaction count exceeds one.
    pub count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Surface contract
// ---------------------------------------------------------------------------

/// What the pipeline requires from its host: a clearable node sink with a
/// scroll offset and header slots. Implemented by the terminal front end;
/// tests use a recording surface.
pub trait ThreadSurface {
    fn clear(&mut self);
    fn append(&mut self, fragment: Vec<ThreadNode>);
    fn scroll_offset(&self) -> usize;
    fn set_scroll_offset(&mut self, offset: usize);
    fn set_header(&mut self, header: HeaderSpec);
}

// ---------------------------------------------------------------------------
// Render task
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared between a task and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one render step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A batch was appended; more remain.
    Pending,
    /// The visible window is fully materialized.
    Complete,
    /// The task was superseded; the surface was not touched.
    Cancelled,
}

/// Batched materialization of the visible message prefix onto a surface.
///
/// The first step clears the surface; every step appends exactly one batch.
/// `N` messages at batch size `B` complete in `max(1, ceil(N/B))` steps.
#[derive(Debug)]
pub struct RenderTask {
    messages: Vec<CanonicalMessage>,
    peer_avatar: AvatarSource,
    batch_size: usize,
    has_next: bool,
    cursor: usize,
    last_day: Option<NaiveDate>,
    started: bool,
    done: bool,
    token: CancelToken,
}

impl RenderTask {
    #[must_use]
    pub fn new(
        messages: Vec<CanonicalMessage>,
        peer_avatar: AvatarSource,
        batch_size: usize,
        has_next: bool,
    ) -> Self {
        Self {
            messages,
            peer_avatar,
            batch_size: batch_size.max(1),
            has_next,
            cursor: 0,
            last_day: None,
            started: false,
            done: false,
            token: CancelToken::new(),
        }
    }

    /// Handle for cancelling this task from its owner.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Materialize the next batch. Appends batches in strict sequential
    /// order; never touches the surface once cancelled or complete.
    pub fn step(&mut self, surface: &mut dyn ThreadSurface) -> Progress {
        if self.token.is_cancelled() {
            return Progress::Cancelled;
        }
        if self.done {
            return Progress::Complete;
        }
        if !self.started {
            surface.clear();
            self.started = true;
        }

        let end = (self.cursor + self.batch_size).min(self.messages.len());
        let mut fragment = Vec::with_capacity((end - self.cursor).saturating_mul(2));
        for idx in self.cursor..end {
            self.push_message(&mut fragment, idx);
        }
        self.cursor = end;

        let final_batch = end == self.messages.len();
        if final_batch && self.has_next {
            fragment.push(ThreadNode::LoadMore);
        }
        surface.append(fragment);

        if final_batch {
            self.done = true;
            Progress::Complete
        } else {
            Progress::Pending
        }
    }

    fn push_message(&mut self, fragment: &mut Vec<ThreadNode>, idx: usize) {
        let msg = &self.messages[idx];

        // Day separator whenever the local calendar day changes across the
        // whole render pass, including from the very first message.
        if let Some(day) = grouping::local_date(msg.ts) {
            if self.last_day != Some(day) {
                fragment.push(ThreadNode::DaySeparator {
                    label: grouping::day_label(day),
                });
            }
            self.last_day = Some(day);
        }

        let flags = grouping::group_flags(&self.messages, idx);
        let direction = Direction::from_sender(msg.sender);

        let avatar = (direction == Direction::In).then(|| AvatarSlot {
            source: self.peer_avatar.clone(),
            hidden: flags.same_next,
        });

        let reply = msg.reply.as_ref().map(|r| ReplyPreview {
            label: r
                .from_label
                .clone()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| DEFAULT_REPLY_LABEL.to_owned()),
            text: r.text.clone().unwrap_or_default(),
        });

        let media = msg
            .attachments
            .iter()
            .map(|a| MediaNode {
                kind: a.kind,
                uri: a.uri.clone(),
            })
            .collect();

        let share = msg.share.as_ref().map(build_share_card);
        let bubble = build_bubble(msg, flags);
        let reaction = build_reaction_pill(msg);

        fragment.push(ThreadNode::Row(Row {
            direction,
            avatar,
            reply,
            media,
            share,
            bubble,
            reaction,
        }));

        if !flags.same_next {
            fragment.push(ThreadNode::Spacer);
        }
    }
}

fn build_share_card(share: &crate::model::Share) -> ShareCard {
    let href = share::normalize_link(&share.link);
    let display = share::unwrap_redirect(&href);
    let kind = ShareKind::classify(&href);
    let owner = share
        .owner
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned);
    let text = share.text.as_deref().map(str::trim).unwrap_or_default();
    let body = if !text.is_empty() {
        text.to_owned()
    } else if !display.is_empty() {
        display
    } else {
        href.clone()
    };
    ShareCard {
        kind,
        owner,
        body,
        href,
    }
}

/// Text bubble, unless the text is empty, a placeholder caption shadowed by
/// real media, or still classifiable as noise.
fn build_bubble(msg: &CanonicalMessage, flags: GroupFlags) -> Option<Bubble> {
    let text = msg.text.as_deref().unwrap_or_default();
    if text.is_empty() {
        return None;
    }
    let has_rich = msg.has_rich_content();
    if has_rich && noise::is_generic_attachment_text(text) {
        return None;
    }
    if noise::is_noise_view(Some(text), has_rich) {
        return None;
    }
    Some(Bubble {
        text: text.to_owned(),
        tight_top: flags.same_prev,
        tight_bottom: flags.same_next,
    })
}

/// Collapse all heart-variant glyphs, with or without a variation selector,
/// into the canonical display heart.
#[must_use]
pub fn normalize_reaction_emoji(emoji: &str) -> String {
    const HEART_VARIANTS: [&str; 14] = [
        "♥",
        "❤",
        "🖤",
        "💙",
        "💚",
        "💛",
        "💜",
        "🤍",
        "🤎",
        "🩵",
        "🩶",
        "🩷",
        "♥\u{fe0f}",
        "❤\u{fe0f}",
    ];
    if HEART_VARIANTS.contains(&emoji) {
        CANONICAL_HEART.to_owned()
    } else {
        emoji.to_owned()
    }
}

fn build_reaction_pill(msg: &CanonicalMessage) -> Option<ReactionPill> {
    if msg.reactions.is_empty() {
        return None;
    }

    let mut emojis: Vec<String> = Vec::with_capacity(MAX_PILL_EMOJI);
    for reaction in &msg.reactions {
        if reaction.emoji.is_empty() {
            continue;
        }
        let normalized = normalize_reaction_emoji(&reaction.emoji);
        if !emojis.contains(&normalized) {
            emojis.push(normalized);
        }
        if emojis.len() == MAX_PILL_EMOJI {
            break;
        }
    }
    if emojis.is_empty() {
        emojis.push(CANONICAL_HEART.to_owned());
    }

    let max_count = msg
        .reactions
        .iter()
        .map(|r| r.count.unwrap_or(1))
        .fold(1, u32::max);

    Some(ReactionPill {
        emojis,
        count: (max_count > 1).then_some(max_count),
    })
}
