use once_cell::sync::Lazy;
use regex::Regex;

static RE_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static RE_SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[/?[a-zA-Z][^\[\]]*\]").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const ELLIPSIS: char = '\u{2026}';

/// Reduce an entry's raw HTML description to a bounded plain-text summary.
///
/// Images are dropped outright, then editor shortcodes (`[gallery]`,
/// `[/caption]` and friends, which render as noise in plain text), then any
/// remaining tags. Whitespace runs collapse to single spaces and the result
/// is cut to `max_len` characters with one trailing ellipsis, which is not
/// counted against the limit; the cut is exact, so re-sanitizing a truncated
/// summary yields the same string.
///
/// This is pattern matching, not a markup parser. Pathological input can
/// leave artifacts behind, which is accepted.
pub fn sanitize(raw: &str, max_len: usize) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // Re-scan until stable: stripping one token must not reveal another.
    let mut text = raw.to_string();
    loop {
        let pass = RE_IMG.replace_all(&text, "");
        let pass = RE_SHORTCODE.replace_all(&pass, "");
        let pass = RE_TAG.replace_all(&pass, "").into_owned();
        if pass == text {
            break;
        }
        text = pass;
    }

    let text = RE_WS.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push(ELLIPSIS);
    out
}
