//! Shared-link normalization: scheme repair, redirect unwrapping, and
//! post/reel/story classification.

use url::Url;

/// Host used by the platform's outbound-link redirect wrapper.
const REDIRECT_HOST: &str = "l.instagram.com";

/// Trim the link and give scheme-less `www.` links an `https://` prefix.
/// Anything else passes through unchanged; empty input stays empty.
#[must_use]
pub fn normalize_link(link: &str) -> String {
    let s = link.trim();
    if s.starts_with("www.") {
        format!("https://{s}")
    } else {
        s.to_owned()
    }
}

/// Unwrap a redirect-wrapped link (`l.instagram.com/?u=<encoded>`) to its
/// percent-decoded destination. Any parse failure or absence of the pattern
/// returns the input unchanged; this never fails.
#[must_use]
pub fn unwrap_redirect(link: &str) -> String {
    let Ok(parsed) = Url::parse(link) else {
        return link.to_owned();
    };
    if parsed.host_str() == Some(REDIRECT_HOST) {
        if let Some((_, dest)) = parsed.query_pairs().find(|(key, _)| key == "u") {
            if !dest.is_empty() {
                return dest.into_owned();
            }
        }
    }
    link.to_owned()
}

/// What a shared link points at, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Post,
    Reel,
    Story,
    Link,
}

impl ShareKind {
    /// Display label for the share card header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Post => "게시물",
            Self::Reel => "릴스",
            Self::Story => "스토리",
            Self::Link => "링크",
        }
    }

    /// Classify a link by known path segments, checked against the
    /// normalized, redirect-unwrapped form. Reel wins over post wins over
    /// story; anything else is a plain link.
    #[must_use]
    pub fn classify(link: &str) -> Self {
        let unwrapped = unwrap_redirect(&normalize_link(link));
        if unwrapped.contains("/reel/") {
            Self::Reel
        } else if unwrapped.contains("/p/") {
            Self::Post
        } else if unwrapped.contains("/stories/") {
            Self::Story
        } else {
            Self::Link
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_link, unwrap_redirect, ShareKind};

    #[test]
    fn bare_www_links_gain_a_scheme() {
        assert_eq!(
            normalize_link("  www.instagram.com/p/ABC/ "),
            "https://www.instagram.com/p/ABC/"
        );
        assert_eq!(normalize_link("https://example.com"), "https://example.com");
        assert_eq!(normalize_link(""), "");
    }

    #[test]
    fn redirect_wrapper_unwraps_to_u_parameter() {
        let wrapped = "https://l.instagram.com/?u=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&e=xyz";
        assert_eq!(unwrap_redirect(wrapped), "https://example.com/a?b=1");
    }

    #[test]
    fn non_redirect_links_pass_through() {
        let link = "https://www.instagram.com/reel/ABC123/";
        assert_eq!(unwrap_redirect(link), link);
        assert_eq!(unwrap_redirect("not a url"), "not a url");
    }

    #[test]
    fn classification_by_path_segment() {
        assert_eq!(
            ShareKind::classify("https://www.instagram.com/reel/ABC123/"),
            ShareKind::Reel
        );
        assert_eq!(
            ShareKind::classify("www.instagram.com/p/XYZ/"),
            ShareKind::Post
        );
        assert_eq!(
            ShareKind::classify("https://www.instagram.com/stories/name/123/"),
            ShareKind::Story
        );
        assert_eq!(ShareKind::classify("https://example.com"), ShareKind::Link);
    }

    #[test]
    fn wrapped_links_classify_by_destination() {
        let wrapped = "https://l.instagram.com/?u=https%3A%2F%2Fwww.instagram.com%2Freel%2FABC%2F";
        assert_eq!(ShareKind::classify(wrapped), ShareKind::Reel);
    }

    #[test]
    fn share_kind_labels() {
        assert_eq!(ShareKind::Reel.label(), "릴스");
        assert_eq!(ShareKind::Link.label(), "링크");
    }
}
