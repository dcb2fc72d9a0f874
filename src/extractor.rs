//! Part extractor (spec component 5, §4.5)
//!
//! Walks a `mailparse::ParsedMail` tree to recover the raw decoded bytes of
//! one specific leaf, identified by its positional part id and expected
//! content type. Deliberately does not share a traversal with
//! [`crate::collector`] — see spec §9's pinned fix: an earlier revision
//! called into the collector's own `foreach`, which resolved part ids
//! against the collector's body/attachment classification rather than a
//! plain depth-first leaf count, and silently extracted the wrong part
//! whenever a body leaf was skipped ahead of an attachment.

use mailparse::ParsedMail;

use crate::collector::RECURSION_LIMIT;
use crate::content_type;
use crate::errors::AppError;
use crate::models::PartExtractorState;

/// Extracts the decoded bytes of the `part_id`th leaf of `root`, if its
/// content type matches `content_type` (case-insensitively)
pub fn extract(root: &ParsedMail<'_>, part_id: usize, content_type: &str) -> Option<Vec<u8>> {
    let mut state = PartExtractorState::new(part_id, content_type.to_ascii_lowercase());
    walk(root, &mut state);
    state.result
}

fn walk(part: &ParsedMail<'_>, state: &mut PartExtractorState) {
    if state.result.is_some() {
        return;
    }

    let part_content_type = part.ctype.mimetype.to_ascii_lowercase();

    if content_type::is_partial(&part_content_type) {
        return;
    }

    if content_type::is_rfc822(&part_content_type) && part.subparts.is_empty() {
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

    if state.next_part_id == state.target_part_id
        && part_content_type.eq_ignore_ascii_case(&state.target_content_type)
    {
        match part.get_body_raw() {
            Ok(bytes) => state.result = Some(bytes),
            Err(err) => tracing::warn!(%err, "failed to read requested part body"),
        }
    }
    state.next_part_id += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParsedMail<'_> {
        mailparse::parse_mail(raw.as_bytes()).expect("valid RFC 5322 message")
    }

    #[test]
    fn extracts_matching_leaf_by_position_and_type() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=b\r\n\r\n",
            "--b\r\nContent-Type: text/plain\r\n\r\nfirst\r\n",
            "--b\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n",
            "--b--\r\n"
        );
        let msg = parse(raw);
        let got = extract(&msg, 1, "image/png").expect("part present");
        assert_eq!(got, b"PNGDATA");
    }

    #[test]
    fn content_type_mismatch_yields_none() {
        let raw = "Content-Type: text/plain\r\n\r\nhello\r\n";
        let msg = parse(raw);
        assert!(extract(&msg, 0, "text/html").is_none());
    }

    #[test]
    fn out_of_range_part_id_yields_none() {
        let raw = "Content-Type: text/plain\r\n\r\nhello\r\n";
        let msg = parse(raw);
        assert!(extract(&msg, 5, "text/plain").is_none());
    }
}
