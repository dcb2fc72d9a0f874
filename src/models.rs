//! Shared data model: collected MIME parts, addresses, traversal state
//!
//! These types carry no behaviour of their own; [`crate::collector`] and
//! [`crate::extractor`] populate them while walking a `mailparse::ParsedMail`
//! tree, and [`crate::jsonify`] reads them back out. Every field is owned —
//! there is no manual `free_*` counterpart to the original C structs, since
//! Rust's drop glue retires every buffer when its owner goes out of scope.

use serde::Serialize;

/// One leaf MIME part gathered by the collector or extractor
#[derive(Debug, Clone)]
pub struct CollectedPart {
    /// Positional index assigned during the depth-first walk, starting at 0
    pub part_id: usize,
    /// Lowercased `type/subtype`, e.g. `"text/plain"` or `"image/png"`
    pub content_type: String,
    /// Decoded (not re-encoded) body bytes
    pub content: Vec<u8>,
    /// Filename from `Content-Disposition` or, failing that, `Content-Type`'s `name` parameter
    pub filename: Option<String>,
    /// `Content-ID` header value, with surrounding angle brackets stripped
    pub content_id: Option<String>,
    /// Lowercased `Content-Disposition` token (`"attachment"`, `"inline"`, ...), if the header was present
    pub disposition: Option<String>,
}

impl CollectedPart {
    /// `true` if `Content-Disposition` names this part as `inline` (case-insensitive)
    pub fn is_inline_disposition(&self) -> bool {
        self.disposition
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("inline"))
    }
}

/// Accumulator threaded through the collector's tree walk
///
/// `text_body` and `html_body` hold at most one part each (the first leaf of
/// their respective kind encountered); anything that would have qualified as
/// a second `text/html`-family body lands in `alternative_bodies` instead.
#[derive(Debug, Default)]
pub struct PartCollectorState {
    pub text_body: Option<CollectedPart>,
    pub html_body: Option<CollectedPart>,
    pub alternative_bodies: Vec<CollectedPart>,
    pub inlines: Vec<CollectedPart>,
    pub attachments: Vec<CollectedPart>,
    /// Positional part counter, incremented once per leaf visited
    pub next_part_id: usize,
    /// Current embedded-message nesting depth, checked against the recursion cap
    pub recursion_depth: u32,
}

/// Accumulator threaded through the extractor's tree walk
///
/// Mirrors the collector's traversal shape but stops as soon as the target
/// part has been found and extracted.
#[derive(Debug)]
pub struct PartExtractorState {
    pub target_part_id: usize,
    pub target_content_type: String,
    pub next_part_id: usize,
    pub recursion_depth: u32,
    pub result: Option<Vec<u8>>,
}

impl PartExtractorState {
    pub fn new(target_part_id: usize, target_content_type: String) -> Self {
        Self {
            target_part_id,
            target_content_type,
            next_part_id: 0,
            recursion_depth: 0,
            result: None,
        }
    }
}

/// A single flattened mailbox address (never a group)
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
}
