//! Rewrite output sanitization.
//!
//! Chat models sometimes append meta-commentary to a rewrite ("Note: ...",
//! or a line restating the formality level). This strips the common shapes
//! of it without touching text that doesn't contain the trigger phrases.

/// Everything from the first occurrence of this marker onward is dropped.
const NOTE_MARKER: &str = "Note:";

/// Lines containing any of these (case-insensitive) are dropped, but only
/// when the text contains at least one of them.
const META_PHRASES: [&str; 2] = ["original text", "formality level"];

/// Sanitize a raw completion from the upstream rewriter.
///
/// 1. Trim surrounding whitespace.
/// 2. Cut at the first `Note:` marker and trim again.
/// 3. If any meta phrase appears, drop each line that mentions one, rejoin
///    with `\n` and trim.
pub fn sanitize_rewrite(raw: &str) -> String {
    let mut out = raw.trim();

    if let Some(idx) = out.find(NOTE_MARKER) {
        out = out[..idx].trim();
    }

    if !mentions_meta(out) {
        return out.to_string();
    }

    out.split('\n')
        .filter(|line| !mentions_meta(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn mentions_meta(text: &str) -> bool {
    let lower = text.to_lowercase();
    META_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_marker_truncates() {
        assert_eq!(
            sanitize_rewrite("Hello.\nNote: this is formal.\n"),
            "Hello."
        );
    }

    #[test]
    fn test_note_marker_mid_line() {
        assert_eq!(
            sanitize_rewrite("Good morning. Note: tone adjusted"),
            "Good morning."
        );
    }

    #[test]
    fn test_meta_line_removed_others_kept() {
        let raw = "Dear team,\nHere is the original text restated.\nBest regards";
        assert_eq!(sanitize_rewrite(raw), "Dear team,\nBest regards");
    }

    #[test]
    fn test_meta_phrase_case_insensitive() {
        let raw = "Formality Level: 90/100\nGood evening.";
        assert_eq!(sanitize_rewrite(raw), "Good evening.");
    }

    #[test]
    fn test_clean_text_untouched_apart_from_trim() {
        let raw = "  Line one\n\n  Line two  \n";
        assert_eq!(sanitize_rewrite(raw), "Line one\n\n  Line two");
    }

    #[test]
    fn test_blank_lines_preserved_when_filtering() {
        let raw = "First\n\nThe formality level is high.\nLast";
        assert_eq!(sanitize_rewrite(raw), "First\n\nLast");
    }

    #[test]
    fn test_note_then_meta_filter() {
        let raw = "As per the original text:\nHi there.\nNote: casual";
        assert_eq!(sanitize_rewrite(raw), "Hi there.");
    }

    #[test]
    fn test_note_marker_is_case_sensitive() {
        assert_eq!(sanitize_rewrite("note: keep me"), "note: keep me");
    }

    #[test]
    fn test_everything_filtered_yields_empty() {
        assert_eq!(sanitize_rewrite("Note: only commentary"), "");
    }
}
