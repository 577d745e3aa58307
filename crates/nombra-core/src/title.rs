use once_cell::sync::Lazy;
use regex::Regex;

/// Longest file stem (without extension) a generated title may produce.
pub const MAX_FILENAME_LENGTH: usize = 120;

/// Name used when a title sanitizes down to nothing.
pub const FALLBACK_FILENAME: &str = "untitled-document";

/// Characters that are rejected by at least one common filesystem.
pub const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Straight and typographic quotes models like to wrap their answers in.
const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Normalize a raw model answer into a display title.
///
/// - strips surrounding quotes and whitespace
/// - folds newlines into spaces
/// - splits glued words ("FooBar" → "Foo Bar")
/// - puts exactly one space on each side of a hyphen
/// - collapses whitespace runs and trims
///
/// Applying it to its own output is a no-op.
pub fn clean_title(raw: &str) -> String {
    static CAMEL_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").unwrap());
    static DASH_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());
    static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let title = raw.trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c));
    let title = title.replace("\r\n", " ").replace('\n', " ");

    // Both substitutions must run before the collapse below, which would
    // otherwise be undone by the spaces they insert.
    let title = CAMEL_CASE.replace_all(&title, "$1 $2");
    let title = DASH_SPACING.replace_all(&title, " - ");
    let title = WHITESPACE_RUN.replace_all(&title, " ");

    title.trim().to_string()
}

/// Turn a clean title into a filesystem-safe file stem, capped at
/// [`MAX_FILENAME_LENGTH`] characters.
///
/// Never returns an empty string: [`FALLBACK_FILENAME`] stands in when
/// nothing usable is left.
pub fn sanitize_filename(title: &str) -> String {
    sanitize_filename_with_limit(title, MAX_FILENAME_LENGTH)
}

/// [`sanitize_filename`] with an explicit length budget in characters.
pub fn sanitize_filename_with_limit(title: &str, limit: usize) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect();
    let trimmed = stripped.trim();

    let capped = if trimmed.chars().count() > limit {
        // Hard cut; drop whitespace the cut may have exposed at the end.
        let cut: String = trimmed.chars().take(limit).collect();
        cut.trim_end().to_string()
    } else {
        trimmed.to_string()
    };

    if capped.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    capped
}
