//! Text preparation for TTS — strip answer-format residue before synthesis.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Compiled regexes — allocated once, reused across calls.
static RE_CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?").unwrap());
static RE_BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}]").unwrap());
static RE_ANSWER_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""answer"\s*:"#).unwrap());
static RE_LOW_CONFIDENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Confidence: low").unwrap());
static RE_ESCAPED_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\n").unwrap());

/// Remove code fences, braces, the `"answer":` label, a `Confidence: low`
/// marker and literal `\n` sequences, then trim.
///
/// Repeats until nothing changes, so `clean_text_for_tts(clean_text_for_tts(x))`
/// equals `clean_text_for_tts(x)` even when a removal joins the pieces of a
/// new match.
pub fn clean_text_for_tts(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let mut c = RE_CODE_FENCE.replace_all(text, "").into_owned();
    c = RE_BRACES.replace_all(&c, "").into_owned();
    c = RE_ANSWER_LABEL.replace_all(&c, "").into_owned();
    c = RE_LOW_CONFIDENCE.replace_all(&c, "").into_owned();
    c = RE_ESCAPED_NEWLINE.replace_all(&c, "").into_owned();
    c.trim().to_string()
}

/// True when the text has something a voice could say.
pub fn is_speakable(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_code_fences() {
        assert_eq!(clean_text_for_tts("```json\nhello\n```"), "hello");
    }

    #[test]
    fn strips_braces_and_label() {
        assert_eq!(
            clean_text_for_tts(r#"{"answer": "I love chess."}"#),
            r#""I love chess.""#
        );
    }

    #[test]
    fn strips_low_confidence_marker() {
        assert_eq!(
            clean_text_for_tts("Not sure. Confidence: low"),
            "Not sure."
        );
    }

    #[test]
    fn strips_escaped_newlines() {
        assert_eq!(clean_text_for_tts(r"first\nsecond"), "firstsecond");
    }

    #[test]
    fn real_newlines_survive() {
        assert_eq!(clean_text_for_tts("first\nsecond"), "first\nsecond");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(
            clean_text_for_tts("Hello, how are you today?"),
            "Hello, how are you today?"
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_text_for_tts(""), "");
        assert_eq!(clean_text_for_tts("{}```"), "");
    }

    #[test]
    fn idempotent_on_spliced_matches() {
        // removing the label splices a new fence together
        let inputs = [
            r#"`"answer":``hi"#,
            r#""ans{wer":"#,
            r"\{n",
            "Confidence: {low",
            "  ``` {\"answer\": \"x\"} ```  ",
        ];
        for input in inputs {
            let once = clean_text_for_tts(input);
            assert_eq!(clean_text_for_tts(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn speakable_requires_alphanumerics() {
        assert!(is_speakable("ok"));
        assert!(!is_speakable(" ... "));
    }
}
