//! Text extractor (spec component 2): "textize"
//!
//! Pure, total, depth-first walk of an HTML parse tree producing
//! whitespace-collapsed plain text. Has no failure mode and performs no I/O.

use markup5ever_rcdom::{Handle, NodeData};

use crate::strings;

/// Converts an HTML tree rooted at `node` into whitespace-collapsed plain text
///
/// - Text nodes yield their text verbatim.
/// - `<script>`/`<style>` elements yield nothing (their contents are never
///   considered prose).
/// - Every other element recurses over its children, trimming each child's
///   yield and joining non-empty results with a single space.
/// - Anything else (document, comment, doctype, processing instruction)
///   yields nothing.
pub fn textize(node: &Handle) -> String {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().to_string(),
        NodeData::Element { name, .. }
            if !name.local.eq_ignore_ascii_case("script") && !name.local.eq_ignore_ascii_case("style") =>
        {
            let mut out = String::new();
            for child in node.children.borrow().iter() {
                let text = textize(child);
                let trimmed = strings::trim(&text);
                if !out.is_empty() && !trimmed.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
            out
        }
        _ => String::new(),
    }
}
