// Block list serialization: HTML document, plain text and JSON.
//
// Every function is pure and re-sorts by `position` first, so callers may pass
// blocks in any array order.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::html::{escape, format_usd, strip_tags};
use crate::types::{
    sorted_by_position, Block, BlockContent, CtaContent, ImageContent, PricingContent,
    SignatureContent, TestimonialContent, VideoContent,
};
use crate::video::VideoEmbed;

const DOCUMENT_STYLES: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #1f2937; max-width: 860px; margin: 0 auto; padding: 40px 20px; }
    .proposal-block { margin-bottom: 32px; }
    .proposal-block img { max-width: 100%; height: auto; border-radius: 8px; }
    .caption { font-size: 14px; color: #6b7280; text-align: center; margin-top: 8px; }
    .pricing-table { width: 100%; border-collapse: collapse; margin: 16px 0; }
    .pricing-table th, .pricing-table td { padding: 12px; text-align: left; border-bottom: 1px solid #e5e7eb; }
    .pricing-table th { background: #f9fafb; font-weight: 600; }
    .pricing-table tfoot td { font-weight: 700; border-top: 2px solid #1f2937; }
    .video-wrapper { position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden; }
    .video-wrapper iframe { position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0; }
    .testimonial-block blockquote { font-size: 18px; font-style: italic; border-left: 4px solid #667eea; margin: 0; padding-left: 20px; }
    .testimonial-author { display: flex; align-items: center; gap: 12px; margin-top: 16px; }
    .testimonial-author img { width: 48px; height: 48px; border-radius: 50%; object-fit: cover; }
    .testimonial-role { font-size: 14px; color: #6b7280; }
    .cta-button { display: inline-block; padding: 14px 32px; background: #ffffff; color: #667eea; border-radius: 8px; font-weight: 600; text-decoration: none; }
    .signature-line { border-bottom: 1px solid #1f2937; width: 260px; height: 48px; }
    .signature-block img { max-height: 80px; }
    @media print {
      body { padding: 0; }
      .proposal-block { page-break-inside: avoid; }
      .video-wrapper { display: none; }
    }
"#;

const CTA_GRADIENT_STYLE: &str = "background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); \
     color: #ffffff; padding: 40px; border-radius: 12px; text-align: center;";

const DEFAULT_BUTTON_TEXT: &str = "Get Started";
const SIGNER_PLACEHOLDER: &str = "_________________";

/// All three output formats of one block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedProposal {
    pub html: String,
    pub json: String,
    pub plain_text: String,
}

/// Persisted block JSON that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed block JSON: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

// ── HTML ───────────────────────────────────────────────────────────

/// Render blocks into a standalone HTML document.
pub fn to_html(blocks: &[Block]) -> String {
    let body = sorted_by_position(blocks)
        .into_iter()
        .map(block_to_html)
        .collect::<Vec<_>>()
        .join("\n");
    debug!(blocks = blocks.len(), "rendered block html");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>Proposal</title>\n  <style>{DOCUMENT_STYLES}  </style>\n</head>\n<body>\n{body}\n</body>\n</html>"
    )
}

/// HTML fragment for a single block. Unknown block types render as "".
pub fn block_to_html(block: &Block) -> String {
    match &block.content {
        BlockContent::Text(text) => {
            format!("<div class=\"proposal-block text-block\">{}</div>", text.html)
        }
        BlockContent::Image(image) => image_html(image),
        BlockContent::Pricing(pricing) => pricing_html(pricing),
        BlockContent::Video(video) => video_html(video),
        BlockContent::Testimonial(testimonial) => testimonial_html(testimonial),
        BlockContent::Cta(cta) => cta_html(cta),
        BlockContent::Signature(signature) => signature_html(signature),
        BlockContent::Unknown { .. } => String::new(),
    }
}

fn caption_html(caption: &Option<String>) -> String {
    match caption.as_deref().filter(|caption| !caption.trim().is_empty()) {
        Some(caption) => format!("<p class=\"caption\">{}</p>", escape(caption)),
        None => String::new(),
    }
}

fn image_html(image: &ImageContent) -> String {
    format!(
        "<div class=\"proposal-block image-block\"><img src=\"{}\" alt=\"{}\" />{}</div>",
        escape(&image.url),
        escape(image.alt.as_deref().unwrap_or("")),
        caption_html(&image.caption)
    )
}

fn pricing_html(pricing: &PricingContent) -> String {
    let title = pricing
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .map(|title| format!("<h3>{}</h3>", escape(title)))
        .unwrap_or_default();

    let rows = pricing
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&item.name),
                item.quantity,
                format_usd(item.price),
                format_usd(item.line_total())
            )
        })
        .collect::<String>();

    format!(
        "<div class=\"proposal-block pricing-block\">{title}<table class=\"pricing-table\">\
         <thead><tr><th>Item</th><th>Quantity</th><th>Price</th><th>Total</th></tr></thead>\
         <tbody>{rows}</tbody>\
         <tfoot><tr><td colspan=\"3\">Total</td><td>{}</td></tr></tfoot>\
         </table></div>",
        format_usd(pricing.grand_total())
    )
}

fn video_html(video: &VideoContent) -> String {
    let player = match VideoEmbed::detect(&video.url) {
        Some(embed) => format!(
            "<div class=\"video-wrapper\"><iframe src=\"{}\" title=\"{} video\" \
             allow=\"autoplay; fullscreen; picture-in-picture\" allowfullscreen></iframe></div>",
            escape(&embed.embed_url()),
            embed.provider.name()
        ),
        None => format!(
            "<video controls style=\"width: 100%;\"><source src=\"{}\" />\
             Your browser does not support the video tag.</video>",
            escape(&video.url)
        ),
    };
    format!(
        "<div class=\"proposal-block video-block\">{player}{}</div>",
        caption_html(&video.caption)
    )
}

fn testimonial_html(testimonial: &TestimonialContent) -> String {
    let avatar = testimonial
        .avatar
        .as_deref()
        .filter(|avatar| !avatar.trim().is_empty())
        .map(|avatar| {
            format!("<img src=\"{}\" alt=\"{}\" />", escape(avatar), escape(&testimonial.author))
        })
        .unwrap_or_default();
    let details = [&testimonial.role, &testimonial.company]
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<div class=\"testimonial-role\">{}</div>", escape(line)))
        .collect::<String>();

    format!(
        "<div class=\"proposal-block testimonial-block\"><blockquote>\"{}\"</blockquote>\
         <div class=\"testimonial-author\">{avatar}<div><strong>{}</strong>{details}</div></div></div>",
        escape(&testimonial.quote),
        escape(&testimonial.author)
    )
}

fn cta_html(cta: &CtaContent) -> String {
    let description = cta
        .description
        .as_deref()
        .filter(|description| !description.trim().is_empty())
        .map(|description| format!("<p>{}</p>", escape(description)))
        .unwrap_or_default();
    let url = cta.button_url.as_deref().filter(|url| !url.trim().is_empty()).unwrap_or("#");
    let label = if cta.button_text.trim().is_empty() {
        DEFAULT_BUTTON_TEXT
    } else {
        cta.button_text.as_str()
    };

    format!(
        "<div class=\"proposal-block cta-block\" style=\"{CTA_GRADIENT_STYLE}\"><h2>{}</h2>\
         {description}<a href=\"{}\" class=\"cta-button\">{}</a></div>",
        escape(&cta.title),
        escape(url),
        escape(label)
    )
}

fn signature_html(signature: &SignatureContent) -> String {
    let mark = match signature.signature.as_deref().filter(|image| !image.trim().is_empty()) {
        Some(image) => format!("<img src=\"{}\" alt=\"Signature\" />", escape(image)),
        None => "<div class=\"signature-line\"></div>".to_string(),
    };
    let name = if signature.name.trim().is_empty() {
        SIGNER_PLACEHOLDER.to_string()
    } else {
        escape(&signature.name)
    };
    let title = signature
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .map(|title| format!("<p>{}</p>", escape(title)))
        .unwrap_or_default();
    let date = signature
        .date
        .as_deref()
        .filter(|date| !date.trim().is_empty())
        .map(|date| format!("<p>Date: {}</p>", escape(date)))
        .unwrap_or_default();

    format!(
        "<div class=\"proposal-block signature-block\">{mark}<p><strong>{name}</strong></p>{title}{date}</div>"
    )
}

// ── Plain text ─────────────────────────────────────────────────────

/// Render blocks as plain text, one paragraph per non-empty block.
pub fn to_plain_text(blocks: &[Block]) -> String {
    sorted_by_position(blocks)
        .into_iter()
        .map(block_to_plain_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Plain-text form of a single block. Unknown block types render as "".
pub fn block_to_plain_text(block: &Block) -> String {
    match &block.content {
        BlockContent::Text(text) => strip_tags(&text.html),
        BlockContent::Image(image) => {
            let label = image
                .caption
                .as_deref()
                .or(image.alt.as_deref())
                .filter(|label| !label.trim().is_empty());
            match label {
                Some(label) => format!("[Image: {label}]"),
                None => "[Image]".to_string(),
            }
        }
        BlockContent::Pricing(pricing) => {
            let mut lines = vec![pricing.title.clone().unwrap_or_else(|| "Pricing".to_string())];
            for item in &pricing.items {
                lines.push(format!(
                    "{} - {} x {} = {}",
                    item.name,
                    item.quantity,
                    format_usd(item.price),
                    format_usd(item.line_total())
                ));
            }
            lines.push(format!("Total: {}", format_usd(pricing.grand_total())));
            lines.join("\n")
        }
        BlockContent::Video(video) => match &video.caption {
            Some(caption) if !caption.trim().is_empty() => {
                format!("[Video: {}]\n{caption}", video.url)
            }
            _ => format!("[Video: {}]", video.url),
        },
        BlockContent::Testimonial(testimonial) => {
            let attribution = std::iter::once(testimonial.author.as_str())
                .chain(testimonial.role.as_deref())
                .chain(testimonial.company.as_deref())
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            format!("\"{}\"\n- {attribution}", testimonial.quote)
        }
        BlockContent::Cta(cta) => format!(
            "{}\n{}\n{}: {}",
            cta.title,
            cta.description.as_deref().unwrap_or(""),
            cta.button_text,
            cta.button_url.as_deref().unwrap_or("")
        ),
        BlockContent::Signature(signature) => {
            let mut lines = vec![format!("Signature: {}", signature.name)];
            if let Some(title) = signature.title.as_deref().filter(|t| !t.trim().is_empty()) {
                lines.push(format!("Title: {title}"));
            }
            if let Some(date) = signature.date.as_deref().filter(|d| !d.trim().is_empty()) {
                lines.push(format!("Date: {date}"));
            }
            lines.join("\n")
        }
        BlockContent::Unknown { .. } => String::new(),
    }
}

// ── JSON ───────────────────────────────────────────────────────────

/// Pretty-printed (2-space) JSON of the exact block array.
pub fn to_json(blocks: &[Block]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(blocks)
}

/// Decode persisted blocks, keeping "corrupt" distinguishable from "empty".
pub fn from_json(json: &str) -> Result<Vec<Block>, ParseFailure> {
    serde_json::from_str(json).map_err(|error| {
        warn!(%error, "failed to parse block JSON");
        ParseFailure { reason: error.to_string() }
    })
}

/// Legacy behavior: malformed input degrades to an empty block list.
pub fn from_json_or_empty(json: &str) -> Vec<Block> {
    from_json(json).unwrap_or_default()
}

pub fn serialize_all(blocks: &[Block]) -> serde_json::Result<SerializedProposal> {
    Ok(SerializedProposal {
        html: to_html(blocks),
        json: to_json(blocks)?,
        plain_text: to_plain_text(blocks),
    })
}
