//! Part collector (spec component 4, §4.4)
//!
//! Walks a `mailparse::ParsedMail` tree depth-first, classifying every leaf
//! into a text body, an HTML-family body, an alternative body, an inline, or
//! an attachment, running the text/HTML filter chain of [`crate::filters`]
//! along the way. `message/rfc822` parts are re-parsed and descended into,
//! bounded by [`RECURSION_LIMIT`]; `message/partial` parts are recognized
//! and skipped entirely (no reassembly).
//!
//! This traversal has its own `foreach`, independent of
//! [`crate::extractor`]'s — sharing one between the two was the source of a
//! since-fixed bug in the part ids the extractor resolved against.

use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

use crate::content_type;
use crate::errors::AppError;
use crate::filters;
use crate::models::{CollectedPart, PartCollectorState};
use crate::strings;

/// Maximum embedded-message nesting depth; deeper `message/rfc822` parts are
/// logged and dropped rather than descended into
pub const RECURSION_LIMIT: u32 = 30;

/// Collects every leaf part of `root` into a [`PartCollectorState`]
pub fn collect(root: &ParsedMail<'_>) -> PartCollectorState {
    let mut state = PartCollectorState::default();
    walk(root, &mut state);
    state
}

/// Lowercases a parsed `Content-Disposition` down to its bare disposition
/// token (`"inline"`, `"attachment"`, `"form-data"`, or whatever extension
/// value was observed) — never the full header with its parameters.
fn disposition_string(disposition: &mailparse::ParsedContentDisposition) -> Option<String> {
    match &disposition.disposition {
        DispositionType::Inline => Some("inline".to_owned()),
        DispositionType::Attachment => Some("attachment".to_owned()),
        DispositionType::FormData => Some("form-data".to_owned()),
        DispositionType::Extension(other) if !other.is_empty() => {
            Some(other.to_ascii_lowercase())
        }
        DispositionType::Extension(_) => None,
    }
}

fn content_id_of(part: &ParsedMail<'_>) -> Option<String> {
    part.headers
        .get_first_value("Content-ID")
        .map(|v| strings::strip_angle_brackets(&v))
}

fn resolve_filename(part: &ParsedMail<'_>, disposition: &mailparse::ParsedContentDisposition) -> Option<String> {
    disposition
        .params
        .get("filename")
        .cloned()
        .or_else(|| part.ctype.params.get("name").cloned())
}

fn walk(part: &ParsedMail<'_>, state: &mut PartCollectorState) {
    let content_type = part.ctype.mimetype.to_ascii_lowercase();

    if content_type::is_partial(&content_type) {
        return;
    }

    if content_type::is_rfc822(&content_type) && part.subparts.is_empty() {
        if state.recursion_depth >= RECURSION_LIMIT {
            tracing::warn!("{}", AppError::Recursion("message/rfc822"));
            return;
        }
        state.recursion_depth += 1;
        match part.get_body_raw() {
            Ok(raw) => match mailparse::parse_mail(&raw) {
                Ok(embedded) => walk(&embedded, state),
                Err(err) => tracing::warn!(%err, "failed to parse embedded message/rfc822 body"),
            },
            Err(err) => tracing::warn!(%err, "failed to read embedded message/rfc822 body"),
        }
        state.recursion_depth -= 1;
        return;
    }

    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            walk(sub, state);
        }
        return;
    }

    collect_part(part, state);
    state.next_part_id += 1;
}

fn collect_part(part: &ParsedMail<'_>, state: &mut PartCollectorState) {
    let content_type = part.ctype.mimetype.to_ascii_lowercase();
    let disposition = part.get_content_disposition();
    let filename = resolve_filename(part, &disposition);
    let content_id = content_id_of(part);
    // `get_content_disposition` defaults to `Inline` when the header is
    // absent; only surface a disposition string when the header was
    // actually present, per spec.md §3 ("if the header was present").
    let header_present = part.headers.get_first_value("Content-Disposition").is_some();
    let disposition_value = header_present
        .then(|| disposition_string(&disposition))
        .flatten();
    let is_attachment_disposition = matches!(disposition.disposition, DispositionType::Attachment);

    if content_type::is_text(&content_type) && !is_attachment_disposition {
        collect_text_part(part, &content_type, filename, content_id, disposition_value, state);
    } else {
        let content = match part.get_body_raw() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%err, %content_type, "failed to read attachment body");
                return;
            }
        };
        let collected = CollectedPart {
            part_id: state.next_part_id,
            content_type,
            content,
            filename,
            content_id,
            disposition: disposition_value,
        };
        if collected.is_inline_disposition() {
            state.inlines.push(collected);
        } else {
            state.attachments.push(collected);
        }
    }
}

fn collect_text_part(
    part: &ParsedMail<'_>,
    content_type: &str,
    filename: Option<String>,
    content_id: Option<String>,
    disposition: Option<String>,
    state: &mut PartCollectorState,
) {
    let raw = match part.get_body_raw() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%err, %content_type, "failed to read text part body");
            return;
        }
    };
    let charset = part.ctype.charset.as_str();
    let charset = if charset.is_empty() { None } else { Some(charset) };
    let mut text = filters::transcode(&raw, charset);

    let is_new_text = state.text_body.is_none() && content_type::is_text_plain(content_type);
    let is_new_html = state.html_body.is_none() && content_type::is_html_candidate(content_type);

    if is_new_text {
        text = filters::strip(&text);
        text = filters::normalize_crlf(&text);
        text = filters::html_escape_filter(&text);
    }
    if is_new_text || is_new_html {
        text = filters::escape_mbox_from(&text);
    }
    if is_new_html && content_type::is_enriched_or_rtf(content_type) {
        text = filters::enriched_to_html(&text, content_type::is_rtf(content_type));
    }

    if text.is_empty() {
        return;
    }

    let collected = CollectedPart {
        part_id: state.next_part_id,
        content_type: content_type.to_owned(),
        content: text.into_bytes(),
        filename,
        content_id,
        disposition,
    };

    if is_new_text {
        state.text_body = Some(collected);
    } else if is_new_html {
        state.html_body = Some(collected);
    } else {
        state.alternative_bodies.push(collected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParsedMail<'_> {
        mailparse::parse_mail(raw.as_bytes()).expect("valid RFC 5322 message")
    }

    #[test]
    fn classifies_plain_text_as_text_body() {
        let raw = "Content-Type: text/plain\r\n\r\nhello world\r\n";
        let state = collect(&parse(raw));
        assert!(state.text_body.is_some());
        assert!(state.html_body.is_none());
    }

    #[test]
    fn second_text_plain_part_becomes_alternative() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n\r\n",
            "--b\r\nContent-Type: text/plain\r\n\r\nfirst\r\n",
            "--b\r\nContent-Type: text/plain\r\n\r\nsecond\r\n",
            "--b--\r\n"
        );
        let state = collect(&parse(raw));
        assert!(state.text_body.is_some());
        assert_eq!(state.alternative_bodies.len(), 1);
    }

    #[test]
    fn attachment_disposition_overrides_text_body_slot() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n\r\n",
            "--b\r\nContent-Type: text/plain\r\nContent-Disposition: attachment; filename=\"note.txt\"\r\n\r\nhi\r\n",
            "--b--\r\n"
        );
        let state = collect(&parse(raw));
        assert!(state.text_body.is_none());
        assert_eq!(state.attachments.len(), 1);
        assert_eq!(state.attachments[0].filename.as_deref(), Some("note.txt"));
        assert_eq!(state.attachments[0].disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn disposition_is_bare_token_not_full_header() {
        let raw = concat!(
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: ATTACHMENT; filename=\"report.pdf\"\r\n\r\nbytes\r\n"
        );
        let state = collect(&parse(raw));
        assert_eq!(state.attachments[0].disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn missing_disposition_header_yields_none() {
        let raw = "Content-Type: application/pdf\r\n\r\nbytes\r\n";
        let state = collect(&parse(raw));
        assert_eq!(state.attachments[0].disposition, None);
    }

    #[test]
    fn message_partial_is_skipped_entirely() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n\r\n",
            "--b\r\nContent-Type: message/partial; id=\"x\"; number=1; total=2\r\n\r\nsomething\r\n",
            "--b\r\nContent-Type: text/plain\r\n\r\nhi\r\n",
            "--b--\r\n"
        );
        let state = collect(&parse(raw));
        assert!(state.text_body.is_some());
        assert!(state.attachments.is_empty());
        assert!(state.alternative_bodies.is_empty());
    }

    #[test]
    fn descends_into_embedded_rfc822_message() {
        let embedded = "Content-Type: text/plain\r\n\r\ninner body\r\n";
        let raw = format!(
            "Content-Type: message/rfc822\r\n\r\n{embedded}"
        );
        let state = collect(&parse(&raw));
        assert!(state.text_body.is_some());
    }

    #[test]
    fn content_id_angle_brackets_are_stripped() {
        let raw = concat!(
            "Content-Type: image/png\r\nContent-Disposition: inline\r\nContent-ID: <abc123>\r\n\r\nfakebytes\r\n"
        );
        let state = collect(&parse(raw));
        assert_eq!(state.inlines[0].content_id.as_deref(), Some("abc123"));
    }

    /// Builds `depth` levels of nested `message/rfc822` wrapping a
    /// `text/plain` leaf, innermost first.
    fn nest_rfc822(depth: u32) -> String {
        let mut body = "Content-Type: text/plain\r\n\r\ninnermost\r\n".to_owned();
        for _ in 0..depth {
            body = format!("Content-Type: message/rfc822\r\n\r\n{body}");
        }
        body
    }

    #[test]
    fn recursion_cap_aborts_subtree_beyond_limit_without_stack_exhaustion() {
        // One more level of message/rfc822 nesting than RECURSION_LIMIT permits.
        let raw = nest_rfc822(RECURSION_LIMIT + 1);
        let state = collect(&parse(&raw));
        // The innermost text/plain leaf sits past the cap and is never reached.
        assert!(state.text_body.is_none());
    }

    #[test]
    fn nesting_at_exactly_the_limit_still_descends() {
        let raw = nest_rfc822(RECURSION_LIMIT);
        let state = collect(&parse(&raw));
        assert!(state.text_body.is_some());
    }
}
