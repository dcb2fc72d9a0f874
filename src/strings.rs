//! String utilities (spec component 1)
//!
//! Locale-independent whitespace trimming and literal substring
//! replacement, plus the XML-entity escaping rules the sanitizer and
//! jsonifier rely on.

/// Removes leading and trailing runs of Unicode whitespace
///
/// Equivalent to `str::trim`, spelled out explicitly since the original
/// `gc_strip` is locale-independent and operates on a fixed whitespace
/// class (space, tab, CR, LF, form feed, and other Unicode whitespace).
pub fn trim(s: &str) -> &str {
    s.trim_matches(char::is_whitespace)
}

/// Replaces every non-overlapping occurrence of `needle` with `repl`, left to right
///
/// Purely literal — `needle` is never interpreted as a pattern.
pub fn replace_all(s: &str, needle: &str, repl: &str) -> String {
    if needle.is_empty() {
        return s.to_owned();
    }
    s.replace(needle, repl)
}

/// Escapes `&`, `<` and `>` for safe inclusion in XML/HTML text content
///
/// `&` must be substituted first so that the entities introduced for
/// `<`/`>` are not themselves re-escaped.
pub fn xml_escape_text(s: &str) -> String {
    let s = replace_all(s, "&", "&amp;");
    let s = replace_all(&s, "<", "&lt;");
    replace_all(&s, ">", "&gt;")
}

/// Strips a single pair of surrounding `<` `>` angle brackets, if present
///
/// `Message-ID`/`In-Reply-To` header values are conventionally wrapped in
/// angle brackets (`<id@host>`); this crate stores and serializes the bare
/// id, unlike the raw header text `mailparse` hands back.
pub fn strip_angle_brackets(s: &str) -> String {
    trim(s).trim_start_matches('<').trim_end_matches('>').to_owned()
}

/// Escapes an attribute value, additionally escaping the enclosing quote character
///
/// `quote` is the character the attribute value will be wrapped in when
/// serialized (`"` or `'`); any other value escapes only `&`, `<` and `>`.
pub fn xml_escape_attr(quote: char, s: &str) -> String {
    let escaped = xml_escape_text(s);
    match quote {
        '"' => replace_all(&escaped, "\"", "&quot;"),
        '\'' => replace_all(&escaped, "'", "&apos;"),
        _ => escaped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_all_unicode_whitespace() {
        assert_eq!(trim("\t\r\n hello \x0c\n"), "hello");
        assert_eq!(trim(""), "");
        assert_eq!(trim("   "), "");
    }

    #[test]
    fn replace_all_is_literal_and_non_overlapping() {
        assert_eq!(replace_all("aaaa", "aa", "b"), "bb");
        assert_eq!(replace_all("a.b.c", ".", "-"), "a-b-c");
        assert_eq!(replace_all("no match", "xyz", "q"), "no match");
    }

    #[test]
    fn xml_escape_text_preserves_round_trippable_entities() {
        assert_eq!(
            xml_escape_text("<a href=\"x\">A&B</a>"),
            "&lt;a href=\"x\"&gt;A&amp;B&lt;/a&gt;"
        );
    }

    #[test]
    fn xml_escape_attr_escapes_matching_quote_only() {
        assert_eq!(xml_escape_attr('"', "a\"b'c"), "a&quot;b'c");
        assert_eq!(xml_escape_attr('\'', "a\"b'c"), "a\"b&apos;c");
        assert_eq!(xml_escape_attr(' ', "a\"b'c"), "a\"b'c");
    }

    #[test]
    fn ampersand_is_escaped_before_derived_entities() {
        // Regression: escaping `<` before `&` would double-escape the
        // ampersand introduced by `&lt;`.
        assert_eq!(xml_escape_text("<"), "&lt;");
    }

    #[test]
    fn strip_angle_brackets_removes_one_surrounding_pair() {
        assert_eq!(strip_angle_brackets("<id@host>"), "id@host");
        assert_eq!(strip_angle_brackets("  <id@host>  "), "id@host");
        assert_eq!(strip_angle_brackets("id@host"), "id@host");
    }
}
