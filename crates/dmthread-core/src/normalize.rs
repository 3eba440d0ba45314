//! The single normalization boundary: raw export records in, a noise-free,
//! stably sorted canonical sequence out.

use crate::model::{
    Attachment, AttachmentKind, CanonicalMessage, RawMessage, Reaction, Reply, Sender, Share,
};
use crate::mojibake;
use crate::noise;

/// Resolve the sender against the configured self identity. The export uses
/// either the literal `"me"` or the display name.
#[must_use]
pub fn resolve_sender(raw_sender: &str, me: &str) -> Sender {
    if raw_sender == "me" || raw_sender == me {
        Sender::Myself
    } else {
        Sender::Peer
    }
}

/// Coerce one raw record to the canonical shape. Nothing is rejected:
/// missing fields become empty defaults, text fields are repaired, and
/// attachments with an unknown kind or no URI are dropped here so the
/// renderer never sees them.
#[must_use]
pub fn normalize_message(raw: RawMessage, me: &str) -> CanonicalMessage {
    let sender = resolve_sender(&raw.sender, me);
    let text = mojibake::repair_opt(raw.text);

    let reply = raw.reply.map(|r| Reply {
        from_label: mojibake::repair_opt(r.from_label),
        text: mojibake::repair_opt(r.text),
    });

    let attachments = raw
        .attachments
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| {
            let kind = AttachmentKind::from_raw(a.kind.as_deref()?)?;
            let uri = a.uri.filter(|uri| !uri.is_empty())?;
            Some(Attachment { kind, uri })
        })
        .collect();

    let share = raw.share.and_then(|s| {
        let link = s.link.filter(|link| !link.is_empty())?;
        Some(Share {
            link,
            text: mojibake::repair_opt(s.text),
            owner: mojibake::repair_opt(s.owner),
        })
    });

    let reactions = raw
        .reactions
        .unwrap_or_default()
        .into_iter()
        .map(|r| Reaction {
            emoji: r.emoji.unwrap_or_default(),
            count: r.count,
        })
        .collect();

    CanonicalMessage {
        sender,
        ts: raw.ts,
        text,
        reply,
        attachments,
        share,
        reactions,
        extra: raw.extra,
    }
}

/// Normalize a whole batch and sort ascending by timestamp. The sort is
/// stable: equal timestamps keep their input order.
#[must_use]
pub fn normalize_messages(raw: Vec<RawMessage>, me: &str) -> Vec<CanonicalMessage> {
    let mut out: Vec<CanonicalMessage> = raw
        .into_iter()
        .map(|m| normalize_message(m, me))
        .collect();
    out.sort_by_key(|m| m.ts);
    out
}

/// Full pipeline for a conversation load: drop noise records, then
/// normalize and sort the survivors. Noise is classified on the raw shape
/// so removed records can never influence grouping adjacency downstream.
#[must_use]
pub fn build_conversation(raw: Vec<RawMessage>, me: &str) -> Vec<CanonicalMessage> {
    let kept: Vec<RawMessage> = raw.into_iter().filter(|m| !noise::is_noise(m)).collect();
    normalize_messages(kept, me)
}
