// Block and proposal validation plus plain-string sanitization.
//
// Validation problems are returned as data and accumulated; nothing here
// fails fast or returns `Err`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::html::sanitize_rich_text;
use crate::types::{
    sorted_by_position, Block, BlockContent, CtaContent, ImageContent, PricingContent,
    PricingItem, SignatureContent, TestimonialContent, TextContent, VideoContent,
    MAX_TITLE_CHARS,
};
use crate::video::VideoEmbed;

/// Block id used for errors about the proposal itself rather than a block.
pub const PROPOSAL_FIELD_OWNER: &str = "proposal";

/// A single field-level problem, keyed so the UI can render it inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub block_id: String,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(block_id: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { block_id: block_id.to_string(), field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Absolute URL with a scheme and a host. `data:` URIs are accepted as well
/// since uploaded images (signatures, avatars) arrive encoded that way.
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => url.has_host() || url.scheme() == "data",
        Err(_) => false,
    }
}

/// Absolute URL with a scheme and a host. Links leave the document, so
/// unlike [`is_valid_url`] no `data:` URIs.
pub fn is_valid_link(value: &str) -> bool {
    Url::parse(value.trim()).is_ok_and(|url| url.has_host())
}

/// Known provider link, or any well-formed URL. Unknown hosts render through
/// a plain `<video>` element.
pub fn is_valid_video_url(value: &str) -> bool {
    VideoEmbed::detect(value).is_some() || is_valid_link(value)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !is_blank(value))
}

/// All field errors for one block. An empty list means the block is valid.
pub fn validate_block(block: &Block) -> Vec<ValidationError> {
    let id = block.id.as_str();
    let mut errors = Vec::new();

    match &block.content {
        BlockContent::Text(TextContent { html }) => {
            if is_blank(html) {
                errors.push(ValidationError::new(id, "html", "Text content is required"));
            }
        }
        BlockContent::Image(ImageContent { url, .. }) => {
            if is_blank(url) {
                errors.push(ValidationError::new(id, "url", "Image URL is required"));
            } else if !is_valid_url(url) {
                errors.push(ValidationError::new(id, "url", "Invalid image URL"));
            }
        }
        BlockContent::Pricing(PricingContent { items, .. }) => {
            if items.is_empty() {
                errors.push(ValidationError::new(
                    id,
                    "items",
                    "At least one pricing item is required",
                ));
            }
            for (index, item) in items.iter().enumerate() {
                validate_pricing_item(id, index, item, &mut errors);
            }
        }
        BlockContent::Video(VideoContent { url, .. }) => {
            if is_blank(url) {
                errors.push(ValidationError::new(id, "url", "Video URL is required"));
            } else if !is_valid_video_url(url) {
                errors.push(ValidationError::new(
                    id,
                    "url",
                    "Invalid video URL. Supported: YouTube, Vimeo, Loom",
                ));
            }
        }
        BlockContent::Testimonial(TestimonialContent { quote, author, avatar, .. }) => {
            if is_blank(quote) {
                errors.push(ValidationError::new(id, "quote", "Quote is required"));
            }
            if is_blank(author) {
                errors.push(ValidationError::new(id, "author", "Author name is required"));
            }
            if present(avatar).is_some_and(|avatar| !is_valid_url(avatar)) {
                errors.push(ValidationError::new(id, "avatar", "Invalid avatar URL"));
            }
        }
        BlockContent::Cta(CtaContent { title, button_text, button_url, .. }) => {
            if is_blank(title) {
                errors.push(ValidationError::new(id, "title", "CTA title is required"));
            }
            if is_blank(button_text) {
                errors.push(ValidationError::new(id, "buttonText", "Button text is required"));
            }
            if present(button_url).is_some_and(|url| !is_valid_link(url)) {
                errors.push(ValidationError::new(id, "buttonUrl", "Invalid button URL"));
            }
        }
        BlockContent::Signature(SignatureContent { name, signature, .. }) => {
            if is_blank(name) {
                errors.push(ValidationError::new(id, "name", "Signer name is required"));
            }
            if present(signature).is_some_and(|image| !is_valid_url(image)) {
                errors.push(ValidationError::new(id, "signature", "Invalid signature image"));
            }
        }
        // Written by a newer editor; nothing to check against.
        BlockContent::Unknown { .. } => {}
    }

    errors
}

fn validate_pricing_item(
    block_id: &str,
    index: usize,
    item: &PricingItem,
    errors: &mut Vec<ValidationError>,
) {
    if is_blank(&item.name) {
        errors.push(ValidationError::new(
            block_id,
            format!("items[{index}].name"),
            format!("Item {} name is required", index + 1),
        ));
    }
    if !(item.quantity.is_finite() && item.quantity > 0.0) {
        errors.push(ValidationError::new(
            block_id,
            format!("items[{index}].quantity"),
            format!("Item {} quantity must be greater than 0", index + 1),
        ));
    }
    if !(item.price.is_finite() && item.price >= 0.0) {
        errors.push(ValidationError::new(
            block_id,
            format!("items[{index}].price"),
            format!("Item {} price cannot be negative", index + 1),
        ));
    }
}

/// Title rules: required, non-blank, at most [`MAX_TITLE_CHARS`] characters.
pub fn validate_proposal_metadata(title: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if is_blank(title) {
        errors.push(ValidationError::new(PROPOSAL_FIELD_OWNER, "title", "Title is required"));
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.push(ValidationError::new(
            PROPOSAL_FIELD_OWNER,
            "title",
            format!("Title must be {MAX_TITLE_CHARS} characters or less"),
        ));
    }
    errors
}

/// The single gate before a proposal may be sent: metadata errors followed by
/// every block's errors in render order.
pub fn can_send_proposal(title: &str, blocks: &[Block]) -> ValidationResult {
    let mut errors = validate_proposal_metadata(title);
    for block in sorted_by_position(blocks) {
        errors.extend(validate_block(block));
    }
    ValidationResult { is_valid: errors.is_empty(), errors }
}

// ── Sanitization ───────────────────────────────────────────────────

fn unsafe_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)javascript:").expect("javascript uri pattern should compile"),
                Regex::new(r"(?i)\bon\w+\s*=").expect("event handler pattern should compile"),
            ]
        })
        .as_slice()
}

/// Strip `javascript:` and `on<word>=` fragments, then trim.
///
/// Repeats until stable so nested fragments such as `javajavascript:script:`
/// cannot reassemble.
pub fn strip_unsafe(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let mut next = current.clone();
        for pattern in unsafe_patterns() {
            next = pattern.replace_all(&next, "").into_owned();
        }
        if next == current {
            return next.trim().to_string();
        }
        current = next;
    }
}

fn strip_optional(value: &Option<String>) -> Option<String> {
    value.as_deref().map(strip_unsafe)
}

/// Sanitized copy of a block payload.
///
/// Plain string fields go through [`strip_unsafe`]. Rich text (`text.html`)
/// goes through the allowlist sanitizer instead, since it reaches rendered
/// output unescaped.
pub fn sanitize_content(content: &BlockContent) -> BlockContent {
    match content {
        BlockContent::Text(text) => {
            let html = sanitize_rich_text(&text.html);
            if html != text.html {
                tracing::warn!("dropped unsafe markup from rich-text block");
            }
            BlockContent::Text(TextContent { html })
        }
        BlockContent::Image(image) => BlockContent::Image(ImageContent {
            url: strip_unsafe(&image.url),
            alt: strip_optional(&image.alt),
            caption: strip_optional(&image.caption),
        }),
        BlockContent::Pricing(pricing) => BlockContent::Pricing(PricingContent {
            items: pricing
                .items
                .iter()
                .map(|item| PricingItem { name: strip_unsafe(&item.name), ..item.clone() })
                .collect(),
            title: strip_optional(&pricing.title),
        }),
        BlockContent::Video(video) => BlockContent::Video(VideoContent {
            url: strip_unsafe(&video.url),
            caption: strip_optional(&video.caption),
        }),
        BlockContent::Testimonial(testimonial) => BlockContent::Testimonial(TestimonialContent {
            quote: strip_unsafe(&testimonial.quote),
            author: strip_unsafe(&testimonial.author),
            avatar: strip_optional(&testimonial.avatar),
            role: strip_optional(&testimonial.role),
            company: strip_optional(&testimonial.company),
        }),
        BlockContent::Cta(cta) => BlockContent::Cta(CtaContent {
            title: strip_unsafe(&cta.title),
            button_text: strip_unsafe(&cta.button_text),
            description: strip_optional(&cta.description),
            button_url: strip_optional(&cta.button_url),
        }),
        BlockContent::Signature(signature) => BlockContent::Signature(SignatureContent {
            name: strip_unsafe(&signature.name),
            signature: strip_optional(&signature.signature),
            title: strip_optional(&signature.title),
            date: strip_optional(&signature.date),
        }),
        unknown @ BlockContent::Unknown { .. } => unknown.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;

    fn block(content: BlockContent) -> Block {
        Block::with_id("b1", content, 0)
    }

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|error| error.field.as_str()).collect()
    }

    #[test]
    fn url_validity_requires_scheme_and_host() {
        assert!(is_valid_url("https://example.com/logo.png"));
        assert!(is_valid_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_valid_url("example.com/logo.png"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url(""));
        assert!(is_valid_link("https://example.com/accept"));
        assert!(!is_valid_link("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn empty_text_block_is_invalid() {
        let errors = validate_block(&block(BlockContent::Text(TextContent { html: "  ".into() })));
        assert_eq!(fields(&errors), vec!["html"]);
        assert_eq!(errors[0].block_id, "b1");
    }

    #[test]
    fn image_url_must_be_present_and_valid() {
        let missing = validate_block(&block(BlockContent::empty(BlockType::Image)));
        assert_eq!(missing[0].message, "Image URL is required");

        let invalid = validate_block(&block(BlockContent::Image(ImageContent {
            url: "nope".into(),
            ..ImageContent::default()
        })));
        assert_eq!(invalid[0].message, "Invalid image URL");
    }

    #[test]
    fn pricing_collects_every_item_error() {
        let content = BlockContent::Pricing(PricingContent {
            items: vec![
                PricingItem::new("", -1.0, -5.0),
                PricingItem::new("Ok", 1.0, 10.0),
                PricingItem::new("Free", 0.0, 0.0),
            ],
            title: None,
        });
        let errors = validate_block(&block(content));
        assert_eq!(
            fields(&errors),
            vec!["items[0].name", "items[0].quantity", "items[0].price", "items[2].quantity"]
        );
    }

    #[test]
    fn pricing_without_items_is_invalid() {
        let errors = validate_block(&block(BlockContent::empty(BlockType::Pricing)));
        assert_eq!(fields(&errors), vec!["items"]);
    }

    #[test]
    fn pricing_rejects_non_finite_numbers() {
        let content = BlockContent::Pricing(PricingContent {
            items: vec![PricingItem::new("x", f64::NAN, f64::INFINITY)],
            title: None,
        });
        let errors = validate_block(&block(content));
        assert_eq!(fields(&errors), vec!["items[0].quantity", "items[0].price"]);
    }

    #[test]
    fn video_accepts_providers_and_generic_urls() {
        for url in [
            "https://www.youtube.com/watch?v=abc123",
            "https://vimeo.com/76979871",
            "https://www.loom.com/share/abc",
            "https://cdn.example.com/demo.mp4",
        ] {
            let content = BlockContent::Video(VideoContent { url: url.into(), caption: None });
            assert!(validate_block(&block(content)).is_empty(), "{url} should be accepted");
        }

        let bad = BlockContent::Video(VideoContent { url: "watch this".into(), caption: None });
        let errors = validate_block(&block(bad));
        assert!(errors[0].message.contains("Supported: YouTube, Vimeo, Loom"));
    }

    #[test]
    fn testimonial_checks_required_fields_and_avatar() {
        let content = BlockContent::Testimonial(TestimonialContent {
            avatar: Some("avatar.png".into()),
            ..TestimonialContent::default()
        });
        assert_eq!(fields(&validate_block(&block(content))), vec!["quote", "author", "avatar"]);

        let blank_avatar = BlockContent::Testimonial(TestimonialContent {
            quote: "Great".into(),
            author: "Ann".into(),
            avatar: Some(String::new()),
            ..TestimonialContent::default()
        });
        assert!(validate_block(&block(blank_avatar)).is_empty());
    }

    #[test]
    fn cta_button_url_is_optional_but_checked() {
        let ok = BlockContent::Cta(CtaContent {
            title: "Go".into(),
            button_text: "Start".into(),
            ..CtaContent::default()
        });
        assert!(validate_block(&block(ok)).is_empty());

        let bad = BlockContent::Cta(CtaContent {
            title: "Go".into(),
            button_text: "".into(),
            button_url: Some("www.example".into()),
            description: None,
        });
        assert_eq!(fields(&validate_block(&block(bad))), vec!["buttonText", "buttonUrl"]);

        let data_uri = BlockContent::Cta(CtaContent {
            title: "Go".into(),
            button_text: "Start".into(),
            button_url: Some("data:text/html;base64,PGgxPkhpPC9oMT4=".into()),
            description: None,
        });
        assert_eq!(fields(&validate_block(&block(data_uri))), vec!["buttonUrl"]);
    }

    #[test]
    fn signature_requires_name() {
        let errors = validate_block(&block(BlockContent::Signature(SignatureContent {
            signature: Some("data:image/png;base64,AAAA".into()),
            ..SignatureContent::default()
        })));
        assert_eq!(fields(&errors), vec!["name"]);
    }

    #[test]
    fn unknown_blocks_have_no_rules() {
        let content =
            BlockContent::Unknown { kind: "chart".into(), content: serde_json::json!({}) };
        assert!(validate_block(&block(content)).is_empty());
    }

    #[test]
    fn title_rules() {
        assert_eq!(validate_proposal_metadata("")[0].message, "Title is required");
        assert_eq!(validate_proposal_metadata("   ").len(), 1);
        assert!(validate_proposal_metadata(&"a".repeat(200)).is_empty());
        let too_long = validate_proposal_metadata(&"a".repeat(201));
        assert_eq!(too_long[0].field, "title");
        assert_eq!(too_long[0].block_id, PROPOSAL_FIELD_OWNER);
    }

    #[test]
    fn send_gate_unions_metadata_and_block_errors() {
        let result = can_send_proposal("", &[]);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "title");

        let text = block(BlockContent::Text(TextContent { html: "hi".into() }));
        assert!(can_send_proposal("Valid Title", &[text]).is_valid);

        let bad = block(BlockContent::empty(BlockType::Cta));
        let result = can_send_proposal("", &[bad]);
        assert_eq!(fields(&result.errors), vec!["title", "title", "buttonText"]);
    }

    #[test]
    fn strip_unsafe_removes_patterns_case_insensitively() {
        assert_eq!(strip_unsafe("  JavaScript:alert(1) "), "alert(1)");
        assert_eq!(strip_unsafe(r#"x" onClick="steal()"#), r#"x" "steal()"#);
        assert_eq!(strip_unsafe("javajavascript:script:go"), "go");
        assert_eq!(strip_unsafe("Conference room"), "Conference room");
    }

    #[test]
    fn sanitize_image_url() {
        let content = BlockContent::Image(ImageContent {
            url: "javascript:alert(1)".into(),
            alt: Some(" logo ".into()),
            caption: None,
        });
        let BlockContent::Image(clean) = sanitize_content(&content) else {
            panic!("variant must be preserved");
        };
        assert!(!clean.url.contains("javascript:"));
        assert_eq!(clean.alt.as_deref(), Some("logo"));
    }

    #[test]
    fn sanitize_pricing_keeps_numbers() {
        let content = BlockContent::Pricing(PricingContent {
            items: vec![PricingItem::new("<b onmouseover=x>Setup</b>", 2.0, 99.5)],
            title: Some("Fees".into()),
        });
        let BlockContent::Pricing(clean) = sanitize_content(&content) else {
            panic!("variant must be preserved");
        };
        assert_eq!(clean.items[0].name, "<b x>Setup</b>");
        assert_eq!(clean.items[0].quantity, 2.0);
        assert_eq!(clean.items[0].price, 99.5);
    }

    #[test]
    fn sanitize_text_uses_allowlist_sanitizer() {
        let content = BlockContent::Text(TextContent {
            html: r#"<p onclick="x()">Hello</p><script>bad()</script>"#.into(),
        });
        assert_eq!(
            sanitize_content(&content),
            BlockContent::Text(TextContent { html: "<p>Hello</p>".into() })
        );
    }
}
