//! Repair for text whose UTF-8 bytes were decoded as a single-byte encoding.
//!
//! Instagram exports are prone to this: multi-byte UTF-8 sequences read as
//! Latin-1 turn Korean text into runs of `ì`, `ë`, `ê` and C1 controls. The
//! repair reinterprets each code unit's low byte as a raw byte and decodes
//! the byte string as UTF-8 again.
//!
//! The detector is deliberately an isolated `&str -> bool` probe so a
//! stricter strategy can replace it without touching callers.

/// Marker characters typical of UTF-8 bytes misread as Latin-1: lead bytes
/// of 2-4 byte sequences, the replacement character, and C1 controls.
#[must_use]
pub fn looks_misdecoded(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c, 'Ã' | 'Â' | 'ì' | 'ë' | 'ê' | 'ð' | '\u{fffd}')
            || ('\u{80}'..='\u{9f}').contains(&c)
    })
}

/// Repair likely mojibake. Text that fails the probe is returned untouched,
/// which keeps the function a fixed point on already-correct strings. A
/// repair that would produce an empty string falls back to the original.
/// Total: decoding uses lossy substitution and never fails.
#[must_use]
pub fn repair(text: &str) -> String {
    if !looks_misdecoded(text) {
        return text.to_owned();
    }
    let bytes: Vec<u8> = text.chars().map(|c| (c as u32 & 0xff) as u8).collect();
    let fixed = String::from_utf8_lossy(&bytes);
    if fixed.is_empty() {
        text.to_owned()
    } else {
        fixed.into_owned()
    }
}

/// `Option`-lifting helper for the many optional text fields of the model.
#[must_use]
pub fn repair_opt(text: Option<String>) -> Option<String> {
    text.map(|t| repair(&t))
}

#[cfg(test)]
mod tests {
    use super::{looks_misdecoded, repair};

    // "설빈" encoded as UTF-8 and re-read as Latin-1.
    const MOJIBAKE_SEOLBIN: &str = "ì\u{84}¤ë¹\u{88}";

    #[test]
    fn correct_korean_text_is_a_fixed_point() {
        let samples = ["설빈", "안녕하세요!", "새로고침하면 끝!", "hello world"];
        for sample in samples {
            assert_eq!(repair(sample), sample);
        }
    }

    #[test]
    fn misdecoded_korean_round_trips_back() {
        assert_eq!(repair(MOJIBAKE_SEOLBIN), "설빈");
    }

    #[test]
    fn repair_is_idempotent() {
        let once = repair(MOJIBAKE_SEOLBIN);
        assert_eq!(repair(&once), once);
    }

    #[test]
    fn probe_flags_c1_controls() {
        assert!(looks_misdecoded("ab\u{90}cd"));
        assert!(!looks_misdecoded("plain ascii"));
    }

    #[test]
    fn unrepairable_input_degrades_to_original() {
        // Bytes that form no valid UTF-8 sequence decode to replacement
        // characters rather than an error.
        let garbled = "Ã\u{80}Ã";
        let fixed = repair(garbled);
        assert!(!fixed.is_empty());
    }
}
