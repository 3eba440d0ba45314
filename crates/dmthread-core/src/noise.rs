//! Classification of system/event noise that must not render as bubbles:
//! reaction events, unsend notices, and bare attachment placeholders.

use std::sync::OnceLock;

use regex::Regex;

use crate::mojibake;
use crate::model::RawMessage;

static REACTED_EVENT: OnceLock<Option<Regex>> = OnceLock::new();

/// "Reacted … to … message", tolerating emoji and whitespace between the
/// anchor words ("Reacted 😡 to your message" etc).
fn reacted_event() -> Option<&'static Regex> {
    REACTED_EVENT
        .get_or_init(|| Regex::new(r"(?is)\breacted\b.{0,40}\bto\b.{0,60}\bmessage\b").ok())
        .as_ref()
}

/// True for placeholder captions like "Sent an attachment" / "사진을 보냈습니다",
/// with or without a leading name, and for the bare labels 사진/동영상.
///
/// Used twice: to suppress placeholder captions on messages that already
/// carry real media, and to classify media-less placeholders as noise.
#[must_use]
pub fn is_generic_attachment_text(text: &str) -> bool {
    let s = text.trim();
    if s.is_empty() {
        return false;
    }

    if s.contains("첨부 파일") && s.contains("보냈") {
        return true;
    }
    if s.contains("사진") && s.contains("보냈") {
        return true;
    }
    if s.contains("동영상") && s.contains("보냈") {
        return true;
    }

    let low = s.to_lowercase();
    if low.contains("sent an attachment") {
        return true;
    }
    if low.contains("sent a photo") {
        return true;
    }
    if low.contains("sent a video") {
        return true;
    }

    s == "동영상" || s == "사진"
}

/// Noise decision over a content view, shared by the raw-side classifier
/// and the renderer's defensive re-check on canonical messages.
///
/// `text` is expected to be already repaired.
#[must_use]
pub fn is_noise_view(text: Option<&str>, has_rich: bool) -> bool {
    let text = text.map(str::trim).unwrap_or_default();
    // Empty-text messages are handled by the renderer, not suppressed here.
    if text.is_empty() {
        return false;
    }
    // Real media or a shared link always renders.
    if has_rich {
        return false;
    }

    if reacted_event().is_some_and(|re| re.is_match(text)) {
        return true;
    }

    let low = text.to_lowercase();
    if low.contains("liked a message") || low.contains("unsent a message") {
        return true;
    }
    if text.contains("메시지에 반응")
        || text.contains("메시지에 좋아요")
        || text.contains("메시지를 취소")
    {
        return true;
    }

    is_generic_attachment_text(text)
}

/// Raw-side classifier: repairs the text first, then applies
/// [`is_noise_view`] with the raw record's rich-content state.
#[must_use]
pub fn is_noise(message: &RawMessage) -> bool {
    let repaired = message.text.as_deref().map(mojibake::repair);
    let has_rich = message
        .attachments
        .as_ref()
        .is_some_and(|atts| !atts.is_empty())
        || message
            .share
            .as_ref()
            .and_then(|s| s.link.as_deref())
            .is_some_and(|link| !link.is_empty());
    is_noise_view(repaired.as_deref(), has_rich)
}

#[cfg(test)]
mod tests {
    use super::{is_generic_attachment_text, is_noise, is_noise_view};
    use crate::model::{RawAttachment, RawMessage, RawShare};

    #[test]
    fn reacted_event_with_emoji_between_anchors() {
        assert!(is_noise_view(Some("Reacted 😡 to your message"), false));
        assert!(is_noise_view(Some("reacted ❤️ to your message"), false));
        assert!(!is_noise_view(Some("I reacted badly, sorry"), false));
    }

    #[test]
    fn event_phrases_are_noise() {
        assert!(is_noise_view(Some("Liked a message"), false));
        assert!(is_noise_view(Some("Unsent a message"), false));
        assert!(is_noise_view(Some("규민님이 메시지에 반응했습니다"), false));
        assert!(is_noise_view(Some("메시지를 취소했습니다"), false));
    }

    #[test]
    fn empty_text_is_never_noise() {
        assert!(!is_noise_view(None, false));
        assert!(!is_noise_view(Some("   "), false));
    }

    #[test]
    fn rich_content_shields_any_text() {
        assert!(!is_noise_view(Some("Liked a message"), true));

        let with_media = RawMessage {
            sender: "other".to_owned(),
            ts: 1,
            text: Some("Sent a photo".to_owned()),
            attachments: Some(vec![RawAttachment {
                kind: Some("photo".to_owned()),
                uri: Some("media/1.jpg".to_owned()),
            }]),
            ..RawMessage::default()
        };
        assert!(!is_noise(&with_media));

        let with_share = RawMessage {
            sender: "other".to_owned(),
            ts: 1,
            text: Some("Liked a message".to_owned()),
            share: Some(RawShare {
                link: Some("https://www.instagram.com/p/ABC/".to_owned()),
                ..RawShare::default()
            }),
            ..RawMessage::default()
        };
        assert!(!is_noise(&with_share));
    }

    #[test]
    fn generic_attachment_placeholders() {
        assert!(is_generic_attachment_text("Sent an attachment"));
        assert!(is_generic_attachment_text("규민님이 사진을 보냈습니다."));
        assert!(is_generic_attachment_text("동영상"));
        assert!(is_generic_attachment_text("사진"));
        assert!(!is_generic_attachment_text("사진 찍으러 가자"));
        assert!(!is_generic_attachment_text("photo"));
    }

    #[test]
    fn placeholder_without_media_is_noise() {
        let msg = RawMessage::text_record("other", 1, "Sent a video");
        assert!(is_noise(&msg));
    }

    #[test]
    fn mojibake_event_text_is_repaired_before_classification() {
        // "메시지에 반응" mis-decoded as Latin-1.
        let garbled = "ë©\u{94}ì\u{8b}\u{9c}ì§\u{80}ì\u{97}\u{90} ë°\u{98}ì\u{9d}\u{91}";
        let msg = RawMessage::text_record("other", 1, garbled);
        assert!(is_noise(&msg));
    }
}
