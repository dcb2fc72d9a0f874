//! HTML sanitizer (spec component 3)
//!
//! Allow-list serializer: walks an HTML tree and re-emits only permitted
//! tags/attributes, rewriting `cid:` URIs to inlined `data:` URIs, dropping
//! everything else silently. Never touches a filesystem or network resource.

use base64::Engine;
use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::LazyLock;

use crate::{html_tree, strings};

const MAX_CID_SIZE: usize = 65_536;
const MIN_DATA_URI_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAAAAACwAAAAAAQABAAA=";

const PERMITTED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "b", "bdo", "body", "big", "blockquote", "br",
    "button", "caption", "center", "cite", "code", "col", "colgroup", "dd", "del", "dfn", "dir",
    "div", "dl", "dt", "em", "fieldset", "font", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "input", "ins", "kbd", "label", "legend", "li", "map", "menu", "ol", "optgroup",
    "option", "p", "pre", "q", "s", "samp", "select", "small", "span", "style", "strike",
    "strong", "sub", "sup", "table", "tbody", "td", "textarea", "tfoot", "th", "thead", "u",
    "tr", "tt", "ul", "var",
];

const PERMITTED_ATTRIBUTES: &[&str] = &[
    "href", "src", "action", "style", "color", "bgcolor", "width", "height", "colspan",
    "rowspan", "cellspacing", "cellpadding", "border", "align", "valign", "dir", "type",
];

const PROTOCOL_ATTRIBUTES: &[&str] = &["href", "src", "action"];

const PERMITTED_PROTOCOLS: &[&str] = &[
    "ftp", "http", "https", "cid", "data", "irc", "mailto", "news", "gopher", "nntp", "telnet",
    "webcal", "xmpp", "callto", "feed",
];

const EMPTY_TAGS: &[&str] = &["area", "br", "col", "hr", "img", "input"];
const SPECIAL_HANDLING: &[&str] = &["html", "body"];
const NO_ENTITY_SUB: &[&str] = &["style"];

static PROTOCOL_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i):|(&#0*58)|(&#x70)|(&#x0*3a)|(%|&#37;)3a").expect("valid regex literal")
});

fn in_list(list: &[&str], needle: &str) -> bool {
    list.iter().any(|t| t.eq_ignore_ascii_case(needle))
}

/// A `Content-ID`-addressable inline image available for `cid:` resolution
///
/// Built by the collector from the parts it has already gathered into
/// `inlines`; the sanitizer never reads a MIME tree itself.
pub struct InlineImage<'a> {
    pub content_id: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

fn find_inline<'a>(inlines: &'a [InlineImage<'a>], content_id: &str) -> Option<&'a InlineImage<'a>> {
    inlines
        .iter()
        .find(|img| img.content_id.eq_ignore_ascii_case(content_id))
}

fn build_doctype(doctype: &html_tree::Doctype) -> String {
    let mut out = format!("<!DOCTYPE {}", doctype.name);
    if !doctype.public_id.is_empty() {
        out.push_str(&format!(
            " PUBLIC \"{}\" \"{}\"",
            doctype.public_id, doctype.system_id
        ));
    }
    out.push_str(">\n");
    out
}

fn resolve_protocol_value(value: &str, inlines: &[InlineImage<'_>]) -> Option<String> {
    let scheme = PROTOCOL_SEPARATOR
        .splitn(value, 2)
        .next()
        .unwrap_or(value)
        .trim();
    if !in_list(PERMITTED_PROTOCOLS, scheme) {
        return None;
    }
    if scheme.eq_ignore_ascii_case("cid") {
        let content_id = value
            .get(scheme.len()..)
            .map(|rest| rest.trim_start_matches(':'))
            .unwrap_or("");
        return Some(match find_inline(inlines, content_id) {
            Some(img) if img.data.len() < MAX_CID_SIZE => format!(
                "data:{};base64,{}",
                img.content_type,
                base64::engine::general_purpose::STANDARD.encode(img.data)
            ),
            _ => MIN_DATA_URI_IMAGE.to_owned(),
        });
    }
    Some(value.to_owned())
}

fn build_attribute(name: &str, value: &str, inlines: &[InlineImage<'_>]) -> String {
    if !in_list(PERMITTED_ATTRIBUTES, name) {
        return String::new();
    }
    let trimmed = strings::trim(value);
    let resolved = if in_list(PROTOCOL_ATTRIBUTES, name) {
        match resolve_protocol_value(trimmed, inlines) {
            Some(v) => v,
            None => return String::new(),
        }
    } else {
        trimmed.to_owned()
    };
    format!(" {name}=\"{}\"", strings::xml_escape_attr('"', &resolved))
}

/// Sanitizes an HTML tree rooted at `node`, returning a serialized string
///
/// `node` is typically a `markup5ever_rcdom::RcDom::document` (which also
/// emits the leading doctype) or an element subtree.
pub fn sanitize(node: &Handle, inlines: &[InlineImage<'_>]) -> String {
    match &node.data {
        NodeData::Document => {
            let mut out = String::new();
            if let Some(doctype) = html_tree::doctype_of(node) {
                out.push_str(&build_doctype(&doctype));
            }
            out.push_str(&sanitize_contents(node, false, inlines));
            out
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_ascii_lowercase();
            let need_special_handling = in_list(SPECIAL_HANDLING, &tag);
            let tag_permitted = in_list(PERMITTED_TAGS, &tag);
            if !need_special_handling && !tag_permitted {
                return String::new();
            }
            let is_empty_tag = in_list(EMPTY_TAGS, &tag);
            let no_entity_substitution = in_list(NO_ENTITY_SUB, &tag);

            let mut attr_str = String::new();
            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.to_ascii_lowercase();
                attr_str.push_str(&build_attribute(&attr_name, &attr.value, inlines));
            }
            if tag == "a" || tag == "form" {
                attr_str.push_str(" target=\"_blank\"");
            }
            if tag == "form" {
                attr_str.push_str(
                    " onSubmit=\"return confirm('This form submits to an external URL. Are you sure you want to proceed?');\"",
                );
            }

            let contents = sanitize_contents(node, no_entity_substitution, inlines);
            if is_empty_tag {
                format!("<{tag}{attr_str}/>")
            } else if need_special_handling {
                format!("\n<{tag}{attr_str}>{}\n</{tag}>\n", strings::trim(&contents))
            } else {
                format!("<{tag}{attr_str}>{contents}</{tag}>")
            }
        }
        _ => String::new(),
    }
}

fn sanitize_contents(node: &Handle, no_entity_substitution: bool, inlines: &[InlineImage<'_>]) -> String {
    let mut out = String::new();
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                out.push_str(&render_text(&contents.borrow(), no_entity_substitution));
            }
            NodeData::Element { .. } => out.push_str(&sanitize(child, inlines)),
            NodeData::Comment { .. } => {}
            _ => tracing::warn!("unknown html node kind encountered while sanitizing"),
        }
    }
    out
}

fn render_text(text: &StrTendril, no_entity_substitution: bool) -> String {
    let text: &str = text;
    if html_tree::is_whitespace_text(text) || no_entity_substitution {
        text.to_owned()
    } else {
        strings::xml_escape_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_str(html: &str, inlines: &[InlineImage<'_>]) -> String {
        let dom = html_tree::parse(html);
        sanitize(&dom.document, inlines)
    }

    #[test]
    fn drops_disallowed_tags_and_scripts() {
        let out = sanitize_str(
            "<html><body><script>alert(1)</script><p onclick=\"x\">hi</p></body></html>",
            &[],
        );
        assert!(!out.contains("script"));
        assert!(!out.contains("onclick"));
        assert!(out.contains("<p>hi</p>"));
    }

    #[test]
    fn rejects_javascript_protocol_in_href() {
        let out = sanitize_str(r#"<html><body><a href="javascript:alert(1)">x</a></body></html>"#, &[]);
        assert!(!out.contains("javascript"));
    }

    #[test]
    fn keeps_permitted_http_href_and_adds_target_blank() {
        let out = sanitize_str(r#"<html><body><a href="https://example.com">x</a></body></html>"#, &[]);
        assert!(out.contains(r#"href="https://example.com""#));
        assert!(out.contains(r#"target="_blank""#));
    }

    #[test]
    fn inlines_known_cid_as_data_uri() {
        let inlines = vec![InlineImage {
            content_id: "abc123",
            content_type: "image/png",
            data: b"\x89PNG\r\n",
        }];
        let out = sanitize_str(r#"<html><body><img src="cid:abc123"></body></html>"#, &inlines);
        assert!(out.contains("data:image/png;base64,"));
    }

    #[test]
    fn falls_back_to_placeholder_for_unknown_cid() {
        let out = sanitize_str(r#"<html><body><img src="cid:missing"></body></html>"#, &[]);
        assert!(out.contains(MIN_DATA_URI_IMAGE));
    }

    #[test]
    fn escapes_text_but_not_inside_style() {
        let out = sanitize_str(
            "<html><body><style>a>b{}</style><p>A&lt;B</p></body></html>",
            &[],
        );
        assert!(out.contains("a>b{}"));
        assert!(out.contains("A&amp;lt;B"));
    }

    #[test]
    fn wraps_html_and_body_with_special_handling() {
        let out = sanitize_str("<html><body>hi</body></html>", &[]);
        assert!(out.starts_with('\n'));
        assert!(out.trim_end().ends_with("</html>"));
    }
}
