// Section-document renderer: header, the five named sections and footer,
// styled from `BrandingParams`.
//
// The body fragment is always cut out of the full document so preview and
// export never drift apart.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::branding::{BrandingParams, LogoLayout, LogoPosition, LOGO_MAX_WIDTH_PX};
use crate::html::{escape, format_currency};
use crate::types::{SectionDocument, SectionKind};

const DEFAULT_CURRENCY: &str = "USD";

/// Render `doc` as a standalone HTML document.
pub fn generate_proposal_html(doc: &SectionDocument, branding: &BrandingParams) -> String {
    let mut body = String::new();
    body.push_str(&render_header(doc, branding));

    let mut rendered = 0usize;
    for kind in SectionKind::RENDER_ORDER {
        if let Some(section) = render_section(doc, kind) {
            body.push_str(&section);
            rendered += 1;
        }
    }

    if branding.show_footer {
        body.push_str(&render_footer(doc, branding));
    }
    debug!(sections = rendered, title = %doc.title, "rendered section document");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(&doc.title),
        stylesheet(branding)
    )
}

/// The inner content of `<body>` from [`generate_proposal_html`].
pub fn generate_proposal_body(doc: &SectionDocument, branding: &BrandingParams) -> String {
    let document = generate_proposal_html(doc, branding);
    body_inner(&document).to_string()
}

fn body_inner(document: &str) -> &str {
    let start = document.find("<body>").map(|index| index + "<body>".len());
    let end = document.rfind("</body>");
    match (start, end) {
        (Some(start), Some(end)) if start <= end => document[start..end].trim(),
        _ => document,
    }
}

// ── Styles ─────────────────────────────────────────────────────────

pub(crate) fn stylesheet(branding: &BrandingParams) -> String {
    let defaults = BrandingParams::default();
    let mut css = format!(
        "body {{ font-family: {font}; font-size: {size}px; line-height: {line}; color: {text}; \
         max-width: 820px; margin: 0 auto; padding: 40px; }}\n\
         h1, h2, h3 {{ color: {heading}; }}\n\
         h1 {{ font-size: 2.2em; margin: 0.4em 0; }}\n\
         h2 {{ font-size: 1.5em; border-bottom: 2px solid {primary}; padding-bottom: 6px; margin-top: 1.6em; }}\n\
         .proposal-header {{ margin-bottom: 32px; }}\n\
         .proposal-meta {{ color: {secondary}; }}\n\
         .proposal-meta p {{ margin: 4px 0; }}\n\
         .proposal-section {{ margin-bottom: 28px; }}\n\
         .investment-summary {{ width: 100%; border-collapse: collapse; margin-top: 16px; }}\n\
         .investment-summary td {{ padding: 12px; border-top: 2px solid {primary}; font-weight: 600; }}\n\
         .investment-summary td.amount {{ text-align: right; color: {primary}; }}\n\
         .proposal-footer {{ margin-top: 48px; padding-top: 16px; border-top: 1px solid {secondary}; \
         color: {secondary}; font-size: 0.85em; text-align: center; }}\n\
         @page {{ size: A4; margin: {margins}; }}\n\
         @media print {{\n\
         \x20 body {{ padding: 0; max-width: none; }}\n\
         \x20 .proposal-section {{ page-break-inside: avoid; }}\n\
         \x20 h1, h2, h3 {{ page-break-after: avoid; }}\n\
         }}\n",
        font = css_font_family(&branding.font_family, &defaults.font_family),
        size = branding.font_size_base,
        line = branding.line_height,
        text = css_color(&branding.text_color, &defaults.text_color),
        heading = css_color(&branding.heading_color, &defaults.heading_color),
        primary = css_color(&branding.primary_color, &defaults.primary_color),
        secondary = css_color(&branding.secondary_color, &defaults.secondary_color),
        margins = branding.margins.css(),
    );
    if branding.show_page_numbers {
        css.push_str(
            "@page { @bottom-center { content: \"Page \" counter(page) \" of \" counter(pages); } }\n",
        );
    }
    css
}

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:#[0-9a-fA-F]{3,8}|[a-zA-Z]+|(?:rgb|hsl)a?\([0-9.,%/\s]+\))$")
            .expect("color pattern should compile")
    })
}

/// Hex, named, `rgb()` or `hsl()` colors pass through. Anything else falls
/// back to the default color.
fn css_color<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if color_pattern().is_match(value) {
        value
    } else {
        warn!(color = value, "ignoring invalid branding color");
        fallback
    }
}

/// Font stack with every character that could end the declaration, the rule
/// or the `<style>` element removed.
fn css_font_family(value: &str, fallback: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|&ch| !matches!(ch, '<' | '>' | '{' | '}' | ';' | '\\') && !ch.is_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

// ── Header ─────────────────────────────────────────────────────────

fn render_header(doc: &SectionDocument, branding: &BrandingParams) -> String {
    let title = render_title(&doc.title, branding);
    if !branding.show_header {
        return format!("<header class=\"proposal-header\">{title}</header>\n");
    }

    let mut meta = format!("<p>Prepared for: <strong>{}</strong>", escape(&doc.client_name));
    if let Some(company) = present(&doc.client_company) {
        meta.push_str(&format!(", {}", escape(company)));
    }
    meta.push_str("</p>");
    if let Some(author) = present(&doc.prepared_by) {
        meta.push_str(&format!("<p>Prepared by: {}</p>", escape(author)));
    }
    if let Some(date) = doc.date {
        meta.push_str(&format!("<p>Date: {}</p>", date.format("%B %-d, %Y")));
    }

    format!(
        "<header class=\"proposal-header\">{}{title}<div class=\"proposal-meta\">{meta}</div></header>\n",
        render_logo_block(branding)
    )
}

/// The `<h1>` title, flanked by logos when they sit next to it.
pub fn render_title(title: &str, branding: &BrandingParams) -> String {
    let heading = format!("<h1>{}</h1>", escape(title));
    if !branding.show_header || branding.logo_position != LogoPosition::NextToTitle {
        return heading;
    }

    let height = branding.logo_size.beside_title_height_px();
    let (company, client) = branding.logos();
    if company.is_none() && client.is_none() {
        return heading;
    }
    let company = company.map(|src| logo_img(src, "Company logo", height, "")).unwrap_or_default();
    let client = client.map(|src| logo_img(src, "Client logo", height, "")).unwrap_or_default();
    format!(
        "<div class=\"title-row\" style=\"display: flex; align-items: center; \
         justify-content: space-between; gap: 20px;\">{company}{heading}{client}</div>"
    )
}

/// Standalone logo block above the title. Empty when there are no logos,
/// the header is hidden, or logos sit next to the title.
pub fn render_logo_block(branding: &BrandingParams) -> String {
    if !branding.show_header || branding.logo_position == LogoPosition::NextToTitle {
        return String::new();
    }
    let (company, client) = branding.logos();
    if company.is_none() && client.is_none() {
        return String::new();
    }

    let align = branding.logo_position.alignment();
    let justify = branding.logo_position.justify();
    let height = branding.logo_size.standalone_height_px();
    let img = |src: &str, alt: &str, extra: &str| logo_img(src, alt, height, extra);

    let inner = match (branding.logo_layout, company, client) {
        (LogoLayout::SideBySide, Some(company), Some(client)) => format!(
            "<div style=\"display: flex; justify-content: {justify}; align-items: center; gap: 24px;\">{}{}</div>",
            img(company, "Company logo", ""),
            img(client, "Client logo", "")
        ),
        (LogoLayout::OppositeSides, Some(company), Some(client)) => format!(
            "<div style=\"display: flex; justify-content: space-between; align-items: center;\">{}{}</div>",
            img(company, "Company logo", ""),
            img(client, "Client logo", "")
        ),
        (LogoLayout::Stacked, company, client) => {
            let logos = company
                .map(|src| img(src, "Company logo", ""))
                .into_iter()
                .chain(client.map(|src| img(src, "Client logo", "")))
                .collect::<String>();
            format!(
                "<div style=\"display: flex; flex-direction: column; align-items: {justify}; gap: 12px;\">{logos}</div>"
            )
        }
        (_, company, client) => {
            let spacer = if company.is_some() && client.is_some() { " margin-right: 20px;" } else { "" };
            let company = company.map(|src| img(src, "Company logo", spacer)).unwrap_or_default();
            let client = client.map(|src| img(src, "Client logo", "")).unwrap_or_default();
            format!("{company}{client}")
        }
    };

    format!("<div class=\"logo-block\" style=\"text-align: {align}; margin-bottom: 24px;\">{inner}</div>")
}

fn logo_img(src: &str, alt: &str, max_height: u32, extra_style: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{alt}\" style=\"max-height: {max_height}px; \
         max-width: {LOGO_MAX_WIDTH_PX}px; object-fit: contain;{extra_style}\" />",
        escape(src)
    )
}

// ── Sections ───────────────────────────────────────────────────────

/// One named section, or `None` when it has nothing to show.
fn render_section(doc: &SectionDocument, kind: SectionKind) -> Option<String> {
    let content = doc.section(kind);
    let summary = match kind {
        SectionKind::PricingBreakdown => doc.total_value.map(|total| {
            let currency = present(&doc.currency).unwrap_or(DEFAULT_CURRENCY);
            format!(
                "<table class=\"investment-summary\"><tr><td>Total Investment</td>\
                 <td class=\"amount\">{}</td></tr></table>",
                escape(&format_currency(total, currency))
            )
        }),
        _ => None,
    };
    if content.is_none() && summary.is_none() {
        return None;
    }

    Some(format!(
        "<section class=\"proposal-section\" id=\"{}\"><h2>{}</h2>{}{}</section>\n",
        kind.key().replace('_', "-"),
        escape(kind.heading()),
        content.unwrap_or(""),
        summary.unwrap_or_default()
    ))
}

// ── Footer ─────────────────────────────────────────────────────────

fn render_footer(doc: &SectionDocument, branding: &BrandingParams) -> String {
    let mut footer = String::from("<footer class=\"proposal-footer\">");
    if let Some(sender) = present(&branding.company_name).or(present(&doc.prepared_by)) {
        footer.push_str(&format!("<p>{}</p>", escape(sender)));
    }
    footer.push_str(&format!(
        "<p>This proposal is confidential and intended for {}.</p></footer>\n",
        escape(&doc.client_name)
    ));
    footer
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
