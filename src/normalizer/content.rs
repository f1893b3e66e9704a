//! Description cleanup: markup removal and length bounding.

use html_escape::decode_html_entities;

/// Longest description kept, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Appended to descriptions cut at [`MAX_DESCRIPTION_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

/// Strip markup, collapse whitespace and bound the length of a description.
pub fn sanitize(html: &str) -> String {
    let text = strip_tags(html);
    let text = decode_html_entities(&text);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(collapsed)
}

/// Remove tags and comments. Tags become a space so that `a<br>b` keeps its
/// word boundary; whitespace is collapsed afterwards anyway.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let end = if tail.starts_with("<!--") {
            tail.find("-->").map(|i| i + 3)
        } else if looks_like_tag(tail) {
            tail.find('>').map(|i| i + 1)
        } else {
            // A lone '<' in text, e.g. "a < b".
            out.push('<');
            rest = &tail[1..];
            continue;
        };

        match end {
            Some(end) => {
                out.push(' ');
                rest = &tail[end..];
            }
            // Unterminated tag: drop the remainder.
            None => {
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn looks_like_tag(tail: &str) -> bool {
    matches!(
        tail[1..].chars().next(),
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?'
    )
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].trim_end().to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        assert_eq!(sanitize("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_tags_keep_word_boundaries() {
        assert_eq!(sanitize("one<br/>two<br>three"), "one two three");
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(sanitize("  a \n\n\t b   c  "), "a b c");
    }

    #[test]
    fn test_decodes_entities_after_stripping() {
        assert_eq!(sanitize("Fish &amp; chips"), "Fish & chips");
        // Escaped markup is text, not a tag.
        assert_eq!(sanitize("&lt;script&gt;"), "<script>");
    }

    #[test]
    fn test_removes_comments() {
        assert_eq!(sanitize("before<!-- a > b -->after"), "before after");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(sanitize("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn test_unterminated_tag_is_dropped() {
        assert_eq!(sanitize("text <img src=\"x"), "text");
    }

    #[test]
    fn test_short_text_is_not_truncated() {
        let text = "a".repeat(MAX_DESCRIPTION_CHARS);
        assert_eq!(sanitize(&text), text);
    }

    #[test]
    fn test_long_html_is_truncated_without_markup() {
        let mut html = String::new();
        while html.len() < 1500 {
            html.push_str("<p>lorem <b>ipsum</b> dolor sit amet, consectetur</p>");
        }
        assert!(html.len() >= 1500);

        let clean = sanitize(&html);
        assert!(clean.ends_with(TRUNCATION_MARKER));
        let body = clean.trim_end_matches(TRUNCATION_MARKER);
        assert!(body.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(!clean.contains('<'));
        assert!(!clean.contains('>'));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_DESCRIPTION_CHARS + 10);
        let clean = sanitize(&text);
        assert_eq!(
            clean.chars().count(),
            MAX_DESCRIPTION_CHARS + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
