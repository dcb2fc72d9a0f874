//! The per-leaf filter chain (spec §4.4)
//!
//! Each function here is one link of the chain the collector wires up for a
//! text leaf: charset transcoding, whitespace stripping, CRLF normalization,
//! HTML-escaping with linkification and citation coloring, mbox `From `
//! escaping, and RFC 1896 `text/enriched`/`text/rtf` conversion to HTML.
//! Every function is a pure `&str -> String` transform; the collector
//! decides which to chain together for a given part.

use std::sync::LazyLock;

use regex::Regex;

use crate::strings;

/// Citation color used for `>`-quoted lines, matching the original's
/// `CITATION_COLOUR` (`0xFF0000`, i.e. red)
pub const CITATION_COLOUR: u32 = 0xFF0000;

/// Decodes `bytes` using `charset`, falling back to UTF-8 if the label is
/// unknown or absent
///
/// Uses `encoding_rs`'s lossy replacement-character decoding rather than
/// failing outright — a mislabeled or corrupt charset should degrade the
/// rendered text, not the whole message.
pub fn transcode(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Strips leading/trailing whitespace from a whole buffer
pub fn strip(s: &str) -> String {
    strings::trim(s).to_owned()
}

/// Normalizes `CRLF` and lone `CR` line endings to `LF`
pub fn normalize_crlf(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

/// Prefixes any line beginning with (optionally already-escaped) `From ` with `>`
///
/// Protects plain-text bodies from being misinterpreted as mbox message
/// separators if ever written back out to an mbox-format file.
pub fn escape_mbox_from(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for line in s.split_inclusive('\n') {
        if line.trim_start_matches('>').starts_with("From ") {
            out.push('>');
        }
        out.push_str(line);
    }
    out
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:https?|ftp)://[^\s<>"]+"#).expect("valid regex literal"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex literal")
});

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = 0u32;
    for c in s.chars() {
        if c == ' ' {
            run += 1;
            if run == 1 {
                out.push(' ');
            } else {
                out.push_str("&nbsp;");
            }
        } else {
            run = 0;
            out.push(c);
        }
    }
    out
}

fn linkify(s: &str) -> String {
    let with_mailto = EMAIL_RE.replace_all(s, |caps: &regex::Captures<'_>| {
        format!(r#"<a href="mailto:{0}">{0}</a>"#, &caps[0])
    });
    URL_RE
        .replace_all(&with_mailto, |caps: &regex::Captures<'_>| {
            format!(r#"<a href="{0}">{0}</a>"#, &caps[0])
        })
        .into_owned()
}

/// Converts plain text into HTML: newlines to `<br>`, runs of spaces to
/// `&nbsp;`, bare URLs/email addresses to anchors, and `>`-quoted lines
/// wrapped in a citation-colored `<span>`
pub fn html_escape_filter(text: &str) -> String {
    let mut out = String::new();
    for line in text.split('\n') {
        let escaped = strings::xml_escape_text(line);
        let rendered = linkify(&collapse_spaces(&escaped));
        if line.trim_start().starts_with('>') {
            out.push_str(&format!(
                r#"<span style="color:#{CITATION_COLOUR:06x}">{rendered}</span>"#
            ));
        } else {
            out.push_str(&rendered);
        }
        out.push_str("<br>\n");
    }
    out
}

/// Converts RFC 1896 `text/enriched` (or its `text/rtf` legacy variant) to HTML
///
/// `richtext` selects the legacy `text/rtf` dialect, where single newlines
/// are significant line breaks rather than collapsing into a space.
pub fn enriched_to_html(text: &str, richtext: bool) -> String {
    let mut out = String::from("<p>");
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' if chars.peek() == Some(&'<') => {
                chars.next();
                out.push('<');
            }
            '<' => {
                let mut token = String::new();
                for nc in chars.by_ref() {
                    if nc == '>' {
                        break;
                    }
                    token.push(nc);
                }
                match token.to_ascii_lowercase().as_str() {
                    "bold" => out.push_str("<b>"),
                    "/bold" => out.push_str("</b>"),
                    "italic" => out.push_str("<i>"),
                    "/italic" => out.push_str("</i>"),
                    "fixed" => out.push_str("<tt>"),
                    "/fixed" => out.push_str("</tt>"),
                    "excerpt" => out.push_str("<blockquote>"),
                    "/excerpt" => out.push_str("</blockquote>"),
                    "nl" => out.push_str("<br>\n"),
                    _ => {}
                }
            }
            '\n' if !richtext && chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("</p>\n<p>");
            }
            '\n' if !richtext => out.push(' '),
            '\n' => out.push_str("<br>\n"),
            other => out.push_str(&strings::xml_escape_text(&other.to_string())),
        }
    }
    out.push_str("</p>");
    out
}
