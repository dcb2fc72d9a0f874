//! Content-type helpers shared by the collector, extractor and jsonifier
//!
//! `mailparse` exposes the parsed `type/subtype` as a [`mailparse::ParsedContentType`];
//! everything here works off its already-lowercased `mimetype` string, which
//! this crate treats as the canonical `content_type` of [`crate::models::CollectedPart`].

/// Returns `true` if `content_type` is of the form `text/*`
pub fn is_text(content_type: &str) -> bool {
    content_type
        .split_once('/')
        .is_some_and(|(top, _)| top.eq_ignore_ascii_case("text"))
}

/// Returns the subtype portion of a `type/subtype` string, lowercased
pub fn subtype(content_type: &str) -> &str {
    content_type.split_once('/').map_or("", |(_, sub)| sub)
}

/// Returns `true` if `content_type` is `text/plain`
pub fn is_text_plain(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("text/plain")
}

/// Returns `true` if `content_type` is `text/html`, `text/enriched` or `text/rtf`
pub fn is_html_candidate(content_type: &str) -> bool {
    is_text(content_type)
        && matches!(
            subtype(content_type).to_ascii_lowercase().as_str(),
            "html" | "enriched" | "rtf"
        )
}

/// Returns `true` if `content_type` is `text/enriched` or `text/rtf`
pub fn is_enriched_or_rtf(content_type: &str) -> bool {
    is_text(content_type)
        && matches!(
            subtype(content_type).to_ascii_lowercase().as_str(),
            "enriched" | "rtf"
        )
}

/// Returns `true` if `content_type` is `text/rtf`
pub fn is_rtf(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("text/rtf")
}

/// Returns `true` if `content_type` is `message/rfc822`
pub fn is_rfc822(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("message/rfc822")
}

/// Returns `true` if `content_type` is `message/partial`
pub fn is_partial(content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("message/partial")
}

/// Guesses a filename extension from a lowercased content type
///
/// Falls back to `txt` for anything not in the table, mirroring
/// `guess_content_type_extension` in the original `jmime` collector.
pub fn guess_extension(content_type: &str) -> &'static str {
    match content_type.to_ascii_lowercase().as_str() {
        "text/plain" => "txt",
        "text/html" => "html",
        "text/rtf" => "rtf",
        "text/enriched" => "etf",
        "text/calendar" => "ics",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/pjpeg" => "pjpg",
        "image/gif" => "gif",
        "image/png" | "image/x-png" => "png",
        "image/bmp" => "bmp",
        _ => "txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_text_subtypes() {
        assert!(is_text_plain("text/plain"));
        assert!(!is_text_plain("text/html"));
        assert!(is_html_candidate("text/html"));
        assert!(is_html_candidate("text/enriched"));
        assert!(is_html_candidate("text/rtf"));
        assert!(!is_html_candidate("text/plain"));
        assert!(is_enriched_or_rtf("text/rtf"));
        assert!(is_rtf("text/rtf"));
        assert!(!is_rtf("text/enriched"));
    }

    #[test]
    fn guesses_known_extensions() {
        assert_eq!(guess_extension("application/pdf"), "txt");
        assert_eq!(guess_extension("image/jpeg"), "jpg");
        assert_eq!(guess_extension("IMAGE/PNG"), "png");
        assert_eq!(guess_extension("image/x-png"), "png");
        assert_eq!(guess_extension("text/calendar"), "ics");
    }

    #[test]
    fn recognizes_submessage_kinds() {
        assert!(is_rfc822("message/rfc822"));
        assert!(is_partial("message/partial"));
        assert!(!is_rfc822("message/partial"));
    }
}
