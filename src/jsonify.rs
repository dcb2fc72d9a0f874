//! Jsonifier (spec component 6, §4.6)
//!
//! Builds the final JSON document: headers flattened to plain
//! name/address pairs, and — when `include_content` is requested — the
//! collector's output rendered as sanitized HTML bodies with plain-text
//! previews, plus an `attachments` array covering attachments, inlines and
//! alternative bodies in that order.

use mailparse::{MailHeaderMap, ParsedMail};
use serde::Serialize;

use crate::models::{Address, CollectedPart};
use crate::sanitize::InlineImage;
use crate::{addresses, collector, content_type, html_tree, sanitize, strings, textize};

/// Plain-text preview length cap, in characters, matching the original's
/// `MAX_HTML_PREVIEW_LENGTH`
const MAX_HTML_PREVIEW_LENGTH: usize = 512;

#[derive(Debug, Serialize)]
struct MessageJson {
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    #[serde(rename = "replyTo", skip_serializing_if = "Vec::is_empty")]
    reply_to: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "inReplyTo", skip_serializing_if = "Option::is_none")]
    in_reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    references: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<BodyJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<BodyJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentJson>,
}

#[derive(Debug, Serialize)]
struct BodyJson {
    #[serde(rename = "type")]
    content_type: String,
    size: usize,
    preview: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AttachmentJson {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(rename = "partId")]
    part_id: usize,
    filename: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<String>,
}

/// Which of the collector's three sequences a part came from — governs the
/// synthesized-filename prefix when the part has no filename of its own
#[derive(Clone, Copy)]
enum PartSource {
    Attachment,
    Inline,
    Alternative,
}

fn header(message: &ParsedMail<'_>, name: &str) -> Option<String> {
    message.headers.get_first_value(name)
}

fn synthesize_filename(part: &CollectedPart, source: PartSource) -> String {
    if let Some(name) = &part.filename {
        return name.clone();
    }
    let ext = content_type::guess_extension(&part.content_type);
    let (prefix, fallback) = match source {
        PartSource::Attachment => ("_attachment_", "_unnamed_attachment"),
        PartSource::Inline => ("_inline_", "_unnamed_inline_content"),
        PartSource::Alternative => ("_alt_", "_unnamed_alt_content"),
    };
    match part.content_id.as_deref() {
        Some(cid) if !cid.is_empty() => format!("{prefix}{cid}.{ext}"),
        _ => format!("{fallback}.{ext}"),
    }
}

fn attachment_json(part: &CollectedPart, source: PartSource, with_disposition: bool) -> AttachmentJson {
    AttachmentJson {
        content_type: part.content_type.clone(),
        part_id: part.part_id,
        filename: synthesize_filename(part, source),
        size: part.content.len(),
        disposition: with_disposition.then(|| {
            part.disposition
                .clone()
                .unwrap_or_else(|| "attachment".to_owned())
        }),
    }
}

fn render_body(part: &CollectedPart, inlines: &[InlineImage<'_>]) -> BodyJson {
    let markup = String::from_utf8_lossy(&part.content).into_owned();
    let dom = html_tree::parse(&markup);
    let root = html_tree::root_element(&dom);
    let preview: String = textize::textize(&root).chars().take(MAX_HTML_PREVIEW_LENGTH).collect();
    let content = sanitize::sanitize(&dom.document, inlines);
    BodyJson {
        content_type: part.content_type.clone(),
        size: part.content.len(),
        preview,
        content,
    }
}

/// Builds the JSON document for `message`
///
/// `include_content` gates the entire body/attachment-collection pass: when
/// `false`, only headers are rendered and `text`/`html`/`attachments` are
/// omitted.
pub fn to_json(message: &ParsedMail<'_>, include_content: bool) -> String {
    let message_id = header(message, "Message-ID").map(|v| strings::strip_angle_brackets(&v));
    let from = addresses::first(header(message, "From").as_deref());
    let reply_to = addresses::parse_and_flatten(header(message, "Reply-To").as_deref());
    let to = addresses::parse_and_flatten(header(message, "To").as_deref());
    let cc = addresses::parse_and_flatten(header(message, "Cc").as_deref());
    let bcc = addresses::parse_and_flatten(header(message, "Bcc").as_deref());
    let subject = header(message, "Subject");
    let date = header(message, "Date");
    let in_reply_to = header(message, "In-Reply-To").map(|v| strings::strip_angle_brackets(&v));
    let references = header(message, "References");

    let (text, html, attachments) = if include_content {
        let state = collector::collect(message);

        let inline_images: Vec<InlineImage<'_>> = state
            .inlines
            .iter()
            .filter_map(|part| {
                part.content_id.as_deref().map(|cid| InlineImage {
                    content_id: cid,
                    content_type: part.content_type.as_str(),
                    data: part.content.as_slice(),
                })
            })
            .collect();

        let text = state.text_body.as_ref().map(|part| render_body(part, &[]));
        let html = state
            .html_body
            .as_ref()
            .map(|part| render_body(part, &inline_images));

        let mut attachments = Vec::with_capacity(
            state.attachments.len() + state.inlines.len() + state.alternative_bodies.len(),
        );
        attachments.extend(
            state
                .attachments
                .iter()
                .map(|p| attachment_json(p, PartSource::Attachment, true)),
        );
        attachments.extend(
            state
                .inlines
                .iter()
                .map(|p| attachment_json(p, PartSource::Inline, true)),
        );
        attachments.extend(
            state
                .alternative_bodies
                .iter()
                .map(|p| attachment_json(p, PartSource::Alternative, false)),
        );

        (text, html, attachments)
    } else {
        (None, None, Vec::new())
    };

    let message_json = MessageJson {
        message_id,
        from,
        reply_to,
        to,
        cc,
        bcc,
        subject,
        date,
        in_reply_to,
        references,
        text,
        html,
        attachments,
    };

    serde_json::to_string(&message_json).unwrap_or_else(|err| {
        tracing::error!(%err, "failed to serialize message JSON");
        String::from("{}")
    })
}
