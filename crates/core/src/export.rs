// Export targets for section documents: in-app preview, standalone HTML,
// print (PDF collaborator request) and Word-compatible HTML.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::branding::BrandingParams;
use crate::html::escape;
use crate::render::{generate_proposal_body, generate_proposal_html, stylesheet};
use crate::types::SectionDocument;

const FALLBACK_FILE_STEM: &str = "proposal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    #[default]
    Preview,
    Html,
    Print,
    Word,
}

impl ExportTarget {
    pub const ALL: [ExportTarget; 4] =
        [ExportTarget::Preview, ExportTarget::Html, ExportTarget::Print, ExportTarget::Word];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportTarget::Preview => "preview",
            ExportTarget::Html => "html",
            ExportTarget::Print => "print",
            ExportTarget::Word => "word",
        }
    }

    /// File extension of the artifact the target ultimately produces.
    pub fn extension(self) -> &'static str {
        match self {
            ExportTarget::Preview | ExportTarget::Html => "html",
            ExportTarget::Print => "pdf",
            ExportTarget::Word => "doc",
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export target `{0}` (expected preview, html, print or word)")]
pub struct UnknownTarget(pub String);

impl FromStr for ExportTarget {
    type Err = UnknownTarget;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownTarget(value.to_string()))
    }
}

// ── PDF collaborator contract ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfMargins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

/// Page setup handed to the HTML-to-PDF rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    pub format: String,
    pub margin: PdfMargins,
    pub print_background: bool,
    pub display_header_footer: bool,
}

impl PdfOptions {
    pub fn from_branding(branding: &BrandingParams) -> Self {
        let margins = branding.margins;
        Self {
            format: "A4".to_string(),
            margin: PdfMargins {
                top: format!("{}mm", margins.top),
                right: format!("{}mm", margins.right),
                bottom: format!("{}mm", margins.bottom),
                left: format!("{}mm", margins.left),
            },
            print_background: true,
            display_header_footer: branding.show_page_numbers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    pub file_name: String,
    pub html: String,
    pub options: PdfOptions,
}

// ── Export ─────────────────────────────────────────────────────────

/// A rendered export, ready to write or hand to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Export {
    #[serde(rename_all = "camelCase")]
    Document { target: ExportTarget, file_name: String, html: String },
    Print(PdfRequest),
}

impl Export {
    pub fn file_name(&self) -> &str {
        match self {
            Export::Document { file_name, .. } => file_name,
            Export::Print(request) => &request.file_name,
        }
    }
}

pub fn export(doc: &SectionDocument, branding: &BrandingParams, target: ExportTarget) -> Export {
    let file_name = file_name(&doc.title, target);
    debug!(%target, %file_name, "exporting section document");
    match target {
        ExportTarget::Preview => Export::Document {
            target,
            file_name,
            html: generate_proposal_body(doc, branding),
        },
        ExportTarget::Html => Export::Document {
            target,
            file_name,
            html: generate_proposal_html(doc, branding),
        },
        ExportTarget::Print => Export::Print(PdfRequest {
            file_name,
            html: generate_proposal_html(doc, branding),
            options: PdfOptions::from_branding(branding),
        }),
        ExportTarget::Word => Export::Document {
            target,
            file_name,
            html: word_document(doc, branding),
        },
    }
}

/// Word-compatible HTML for the HTML-to-DOCX converter.
pub fn word_document(doc: &SectionDocument, branding: &BrandingParams) -> String {
    format!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">\n\
         <head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View>\
         <w:Zoom>100</w:Zoom></w:WordDocument></xml><![endif]-->\n\
         <style>\n@page WordSection1 {{ size: 21cm 29.7cm; margin: {}; }}\n\
         div.WordSection1 {{ page: WordSection1; }}\n{}</style>\n</head>\n\
         <body>\n<div class=\"WordSection1\">\n{}\n</div>\n</body>\n</html>\n",
        escape(&doc.title),
        branding.margins.css(),
        stylesheet(branding),
        generate_proposal_body(doc, branding)
    )
}

/// `<slug>.<ext>` from the document title.
pub fn file_name(title: &str, target: ExportTarget) -> String {
    let stem = slugify(title);
    let stem = if stem.is_empty() { FALLBACK_FILE_STEM.to_string() } else { stem };
    format!("{stem}.{}", target.extension())
}

fn slugify(title: &str) -> String {
    let raw: String = title
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    raw.split('-').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branding::PageMargins;
    use crate::types::SectionKind;

    fn doc() -> SectionDocument {
        SectionDocument::new("Website Redesign: Phase 2", "Acme")
            .with_section(SectionKind::ExecutiveSummary, "<p>Summary</p>")
    }

    #[test]
    fn targets_parse_case_insensitively() {
        assert_eq!("WORD".parse::<ExportTarget>(), Ok(ExportTarget::Word));
        assert_eq!(" print ".parse::<ExportTarget>(), Ok(ExportTarget::Print));
        assert!("docx".parse::<ExportTarget>().is_err());
    }

    #[test]
    fn file_names_are_slugged_titles() {
        assert_eq!(file_name("Website Redesign: Phase 2", ExportTarget::Print), "website-redesign-phase-2.pdf");
        assert_eq!(file_name("  ***  ", ExportTarget::Word), "proposal.doc");
    }

    #[test]
    fn preview_is_the_body_of_the_html_export() {
        let branding = BrandingParams::default();
        let Export::Document { html: preview, .. } = export(&doc(), &branding, ExportTarget::Preview)
        else {
            panic!("preview should be a document");
        };
        let Export::Document { html: full, .. } = export(&doc(), &branding, ExportTarget::Html) else {
            panic!("html should be a document");
        };
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(!preview.contains("<!DOCTYPE"));
        assert!(full.contains(&preview));
    }

    #[test]
    fn print_carries_pdf_options_from_branding() {
        let branding = BrandingParams {
            margins: PageMargins { top: 25.0, right: 15.0, bottom: 25.0, left: 15.0 },
            show_page_numbers: false,
            ..BrandingParams::default()
        };
        let Export::Print(request) = export(&doc(), &branding, ExportTarget::Print) else {
            panic!("print should produce a pdf request");
        };
        assert_eq!(request.options.format, "A4");
        assert_eq!(request.options.margin.top, "25mm");
        assert_eq!(request.options.margin.left, "15mm");
        assert!(!request.options.display_header_footer);
        assert!(request.html.contains("@page { size: A4; margin: 25mm 15mm 25mm 15mm; }"));
        assert_eq!(request.file_name, "website-redesign-phase-2.pdf");
    }

    #[test]
    fn pdf_request_serializes_camel_case() {
        let request = PdfRequest {
            file_name: "p.pdf".into(),
            html: String::new(),
            options: PdfOptions::from_branding(&BrandingParams::default()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fileName"], "p.pdf");
        assert_eq!(json["options"]["printBackground"], true);
        assert_eq!(json["options"]["displayHeaderFooter"], true);
    }

    #[test]
    fn word_export_wraps_body_in_office_section() {
        let exported = export(&doc(), &BrandingParams::default(), ExportTarget::Word);
        assert_eq!(exported.file_name(), "website-redesign-phase-2.doc");
        let Export::Document { html, .. } = exported else {
            panic!("word should be a document");
        };
        assert!(html.contains("xmlns:w=\"urn:schemas-microsoft-com:office:word\""));
        assert!(html.contains("<div class=\"WordSection1\">"));
        assert!(html.contains("<h2>Executive Summary</h2><p>Summary</p>"));
    }
}
