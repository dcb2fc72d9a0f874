//! RFC 5322 / MIME message renderer
//!
//! Turns a single email message file into a JSON document describing its
//! headers, a sanitized HTML rendering of its body, a plain-text preview,
//! and its attachments — plus a companion call to fetch the raw bytes of
//! one specific MIME part.
//!
//! ```no_run
//! jmime::init();
//! if let Some(json) = jmime::get_json("message.eml", true) {
//!     println!("{json}");
//! }
//! jmime::shutdown();
//! ```
//!
//! # Modules
//!
//! | Module | Responsibility |
//! |---|---|
//! | [`strings`] | Locale-independent trim/replace/XML-escape helpers |
//! | [`html_tree`] | HTML5 parsing (`html5ever`) and the node accessors the rest of the crate walks |
//! | [`textize`] | Collapses an HTML tree into a plain-text preview |
//! | [`sanitize`] | Allow-list HTML serializer, with `cid:` inlining |
//! | [`filters`] | Charset transcoding, whitespace/CRLF normalization, HTML-escape/linkify, enriched/RTF-to-HTML |
//! | [`addresses`] | Address-list flattening over RFC 5322 groups |
//! | [`content_type`] | Shared `type/subtype` classification and extension guessing |
//! | [`models`] | The data carried between the collector/extractor and the jsonifier |
//! | [`collector`] | Depth-first MIME walk producing bodies, inlines and attachments |
//! | [`extractor`] | Depth-first MIME walk extracting one part's raw bytes |
//! | [`jsonify`] | Builds the final JSON document |
//! | [`errors`] | Internal error type; never crosses the public API |

pub mod addresses;
pub mod collector;
pub mod content_type;
pub mod errors;
pub mod extractor;
pub mod filters;
pub mod html_tree;
pub mod jsonify;
pub mod models;
pub mod sanitize;
pub mod strings;
pub mod textize;

use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Prepares the library for use
///
/// Idempotent: a second call before [`shutdown`] is a no-op. Does not use
/// thread-local or first-call initialization — callers are expected to call
/// this once, explicitly, before [`get_json`]/[`get_part_data`].
pub fn init() {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        tracing::debug!("jmime initialized");
    } else {
        tracing::debug!("jmime already initialized, ignoring");
    }
}

/// Releases any state acquired by [`init`]
///
/// Idempotent: calling this before [`init`], or more than once, is a no-op.
pub fn shutdown() {
    if INITIALIZED
        .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        tracing::debug!("jmime shut down");
    } else {
        tracing::debug!("jmime not initialized, ignoring shutdown");
    }
}

fn read_message(path: &str) -> errors::AppResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

fn parse_message(bytes: &[u8]) -> errors::AppResult<mailparse::ParsedMail<'_>> {
    mailparse::parse_mail(bytes).map_err(|err| errors::AppError::Parse(err.to_string()))
}

fn log_and_discard<T>(result: errors::AppResult<T>) -> Option<T> {
    result
        .inspect_err(|err| tracing::warn!(%err, "jmime operation failed"))
        .ok()
}

/// Renders the message at `path` as a JSON document
///
/// `include_content` gates whether bodies and attachments are collected and
/// rendered (a header-only call is cheaper). Returns `None` on any failure —
/// unreadable file, unparseable message — after logging the cause; this
/// function never panics and never returns `Err` to its caller.
pub fn get_json(path: &str, include_content: bool) -> Option<String> {
    let bytes = log_and_discard(read_message(path))?;
    let message = log_and_discard(parse_message(&bytes))?;
    Some(jsonify::to_json(&message, include_content))
}

/// Fetches the raw decoded bytes of one MIME part
///
/// `part_id` is the same positional, depth-first leaf index used by
/// [`get_json`]'s `attachments[].partId`. `content_type` must match the
/// part's `type/subtype` (case-insensitively) or `None` is returned.
pub fn get_part_data(path: &str, part_id: usize, content_type: &str) -> Option<Vec<u8>> {
    let bytes = log_and_discard(read_message(path))?;
    let message = log_and_discard(parse_message(&bytes))?;
    extractor::extract(&message, part_id, content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_shutdown_are_idempotent() {
        init();
        init();
        shutdown();
        shutdown();
    }

    #[test]
    fn get_json_returns_none_for_missing_file() {
        assert!(get_json("/nonexistent/path/to/message.eml", true).is_none());
    }

    #[test]
    fn get_part_data_returns_none_for_missing_file() {
        assert!(get_part_data("/nonexistent/path/to/message.eml", 0, "text/plain").is_none());
    }
}
