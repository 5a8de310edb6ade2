//! Rewrite instruction construction.

/// Describe the requested formality on the 0-100 scale.
pub fn tone_description(tone: i64) -> String {
    format!(
        "with a formality level of {tone}/100, where 0 is very casual/friendly/humanlike \
         and 100 is very formal"
    )
}

/// Build the single-turn instruction sent upstream.
pub fn build_prompt(text: &str, tone: i64) -> String {
    format!(
        "Rewrite the following text {}:\n\n{text}\n\n\
         IMPORTANT: Return ONLY the rewritten text. Do not include ANY explanations, \
         introductions, notes about formality levels, or commentary. Do not mention the \
         formality level in your response. Just return the rewritten text by itself.",
        tone_description(tone)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_description_mentions_scale() {
        let d = tone_description(90);
        assert!(d.contains("90/100"));
        assert!(d.contains("0 is very casual"));
        assert!(d.contains("100 is very formal"));
    }

    #[test]
    fn test_prompt_contains_literal_text() {
        let p = build_prompt("hey what's up\nsecond line", 10);
        assert!(p.starts_with("Rewrite the following text with a formality level of 10/100"));
        assert!(p.contains("\n\nhey what's up\nsecond line\n\n"));
        assert!(p.contains("Return ONLY the rewritten text"));
    }
}
