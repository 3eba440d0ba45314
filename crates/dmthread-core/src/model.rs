//! Message data model: raw export records and the canonical message shape.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Who authored a message, resolved against the configured self identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Myself,
    Peer,
}

/// Media kind carried by an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Photo,
    Video,
    Audio,
}

impl AttachmentKind {
    /// Parse an export-side kind string. Unknown kinds map to `None` and are
    /// dropped at the normalization boundary.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw export shape (untrusted, permissive)
// ---------------------------------------------------------------------------

/// One record of the raw export feed. Every field beyond the sender and
/// timestamp is optional; unknown fields are preserved in `extra` so nothing
/// the export carries is lost across normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub ts: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply: Option<RawReply>,
    #[serde(default)]
    pub attachments: Option<Vec<RawAttachment>>,
    #[serde(default)]
    pub share: Option<RawShare>,
    #[serde(default)]
    pub reactions: Option<Vec<RawReaction>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawMessage {
    /// Plain text record, used by the demo conversation and tests.
    #[must_use]
    pub fn text_record(sender: &str, ts: i64, text: &str) -> Self {
        Self {
            sender: sender.to_owned(),
            ts,
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReply {
    #[serde(default, rename = "fromLabel")]
    pub from_label: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttachment {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShare {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReaction {
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Canonical shape (immutable once produced)
// ---------------------------------------------------------------------------

/// A normalized message: repaired text, resolved sender, coerced media.
/// The timestamp (milliseconds) is the sole ordering key.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMessage {
    pub sender: Sender,
    pub ts: i64,
    pub text: Option<String>,
    pub reply: Option<Reply>,
    pub attachments: Vec<Attachment>,
    pub share: Option<Share>,
    pub reactions: Vec<Reaction>,
    /// Unrecognized export fields, carried through untouched.
    pub extra: Map<String, Value>,
}

impl CanonicalMessage {
    /// Rich content means real media or a shared link; it shields a message
    /// from noise classification and from placeholder-caption suppression.
    #[must_use]
    pub fn has_rich_content(&self) -> bool {
        !self.attachments.is_empty() || self.share.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub from_label: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub uri: String,
}

/// A shared link. Presence of a `Share` implies a non-empty link; shares
/// without one are dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub link: String,
    pub text: Option<String>,
    pub owner: Option<String>,
}

/// One reaction entry. The emoji may be empty for malformed entries; the
/// renderer substitutes the canonical heart when nothing usable remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub count: Option<u32>,
}

/// Per-message adjacency flags over the filtered, sorted sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFlags {
    pub same_prev: bool,
    pub same_next: bool,
}
