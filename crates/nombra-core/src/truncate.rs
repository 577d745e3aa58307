//! Bounding extracted text before it is sent for title generation.

/// Marker inserted between the kept head and tail of over-long content.
pub const TRUNCATION_SUFFIX: &str = "... [content truncated]";

/// Default upper bound on the content sent to the language model.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 3000;

/// Shorten `content` to at most `max_length` characters, keeping its start
/// and its end.
///
/// Openings (title, parties) and endings (dates, signatures, totals) carry
/// most of the information a title needs, so the middle is what gets
/// dropped: the result is `head + suffix + tail` where head and tail each
/// get half of `max_length - len(suffix)`.
///
/// When that budget leaves less than one character per side, the result is
/// just the first `max_length` characters with no suffix.
///
/// Lengths are counted in `char`s so multi-byte text is never split inside
/// a code point.
pub fn truncate_content(content: &str, max_length: usize, suffix: &str) -> String {
    let total = content.chars().count();
    if total <= max_length {
        return content.to_string();
    }

    let half = max_length.saturating_sub(suffix.chars().count()) / 2;
    if half == 0 {
        return content.chars().take(max_length).collect();
    }

    let head: String = content.chars().take(half).collect();
    let tail: String = content.chars().skip(total - half).collect();

    let mut out = String::with_capacity(head.len() + suffix.len() + tail.len());
    out.push_str(&head);
    out.push_str(suffix);
    out.push_str(&tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_unchanged() {
        let text = "Invoice 42 from ACME Corp";
        assert_eq!(truncate_content(text, 100, TRUNCATION_SUFFIX), text);
        assert_eq!(truncate_content(text, text.len(), TRUNCATION_SUFFIX), text);
        assert_eq!(truncate_content("", 0, TRUNCATION_SUFFIX), "");
    }

    #[test]
    fn keeps_head_and_tail() {
        let text = format!("{}{}{}", "A".repeat(50), "m".repeat(500), "Z".repeat(50));
        let out = truncate_content(&text, 100, "[..]");

        // budget = 96, 48 chars each side
        assert_eq!(out.chars().count(), 100);
        assert!(out.starts_with(&"A".repeat(48)));
        assert!(out.ends_with(&"Z".repeat(48)));
        assert_eq!(out.matches("[..]").count(), 1);
        assert!(!out.contains('m'));
    }

    #[test]
    fn odd_budget_stays_within_limit() {
        let text = "x".repeat(1000);
        // budget = 101 - 4 = 97, 48 per side, 100 total
        let out = truncate_content(&text, 101, "[..]");
        assert_eq!(out.chars().count(), 100);
        assert_eq!(out.matches("[..]").count(), 1);
    }

    #[test]
    fn default_suffix_with_default_limit() {
        let text = "word ".repeat(2000);
        let out = truncate_content(&text, DEFAULT_MAX_CONTENT_LENGTH, TRUNCATION_SUFFIX);
        assert!(out.chars().count() <= DEFAULT_MAX_CONTENT_LENGTH);
        assert_eq!(out.matches(TRUNCATION_SUFFIX).count(), 1);
    }

    #[test]
    fn tiny_budget_keeps_only_the_head() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(4);
        // suffix longer than the limit: no room for head and tail
        let out = truncate_content(&text, 10, TRUNCATION_SUFFIX);
        assert_eq!(out, "abcdefghij");

        // budget of one char cannot be split in two
        let out = truncate_content(&text, 5, "1234");
        assert_eq!(out, "abcde");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let text = "Zürich Lohnabrechnung ".repeat(20);
        let out = truncate_content(&text, 40, "…");
        assert_eq!(out.chars().count(), 39);
        assert!(out.starts_with("Zürich Lohn"));
    }
}
