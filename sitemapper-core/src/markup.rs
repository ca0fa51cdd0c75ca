use std::borrow::Cow;

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    escape_with(s, "&apos;")
}

/// Escape text and attribute values for HTML output.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    escape_with(s, "&#39;")
}

fn escape_with<'a>(s: &'a str, apos: &str) -> Cow<'a, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', apos),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Fish & Chips"), "Fish &amp; Chips");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }
}
