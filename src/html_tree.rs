//! HTML tree abstraction (spec component, §6 "HTML tree abstraction")
//!
//! Parses message bodies with `html5ever` into a `markup5ever_rcdom::RcDom`.
//! [`textize`](crate::textize) and [`sanitize`](crate::sanitize) walk the
//! resulting tree directly; this module only supplies the handful of
//! accessors the original Gumbo-based tree exposed that `markup5ever_rcdom`
//! models slightly differently (document doctype, normalized tag name,
//! attribute list).

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parses HTML bytes (already UTF-8 at this point in the pipeline) into a DOM
///
/// `html5ever` never fails to parse — malformed markup degrades to the
/// closest-matching valid tree, matching Gumbo's permissive behavior.
pub fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .expect("in-memory string reads never fail")
}

/// Doctype information extracted from a document's children
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

/// Finds the `<!DOCTYPE ...>` child of a document node, if present
pub fn doctype_of(document: &Handle) -> Option<Doctype> {
    for child in document.children.borrow().iter() {
        if let NodeData::Doctype {
            name,
            public_id,
            system_id,
        } = &child.data
        {
            return Some(Doctype {
                name: name.to_string(),
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            });
        }
    }
    None
}

/// Returns the document's `<html>` element, falling back to the document
/// node itself if no element child is present
///
/// Mirrors Gumbo's `GumboOutput::root`, which [`crate::textize::textize`]
/// and size/preview computation in [`crate::jsonify`] are written against —
/// `markup5ever_rcdom`'s document node holds the doctype and `<html>` as
/// siblings rather than exposing the element directly.
pub fn root_element(dom: &RcDom) -> Handle {
    dom.document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .unwrap_or_else(|| dom.document.clone())
}

/// Returns `true` if a text node's contents are entirely Unicode whitespace
///
/// `markup5ever_rcdom` has no distinct "whitespace node" kind (unlike
/// Gumbo's `GUMBO_NODE_WHITESPACE`); this is the equivalent test applied to
/// a `NodeData::Text` node's contents.
pub fn is_whitespace_text(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_fragment_with_doctype() {
        let dom = parse("<!DOCTYPE html><html><body><p>hi</p></body></html>");
        let doctype = doctype_of(&dom.document).expect("doctype present");
        assert_eq!(doctype.name, "html");
    }

    #[test]
    fn detects_whitespace_only_text() {
        assert!(is_whitespace_text("   \n\t"));
        assert!(!is_whitespace_text("   x"));
        assert!(!is_whitespace_text(""));
    }
}
