// Core domain types shared by the editor, validator, serializer and renderer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Maximum proposal title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

// ── Blocks ─────────────────────────────────────────────────────────

/// The closed set of block kinds the engine knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Text,
    Image,
    Pricing,
    Video,
    Testimonial,
    Cta,
    Signature,
}

impl BlockType {
    pub const ALL: [BlockType; 7] = [
        BlockType::Text,
        BlockType::Image,
        BlockType::Pricing,
        BlockType::Video,
        BlockType::Testimonial,
        BlockType::Cta,
        BlockType::Signature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Pricing => "pricing",
            BlockType::Video => "video",
            BlockType::Testimonial => "testimonial",
            BlockType::Cta => "cta",
            BlockType::Signature => "signature",
        }
    }

    /// Parse a wire tag. Returns `None` for tags this engine does not know.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    /// Rich-text HTML produced by the editor.
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingItem {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl PricingItem {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self { name: name.into(), quantity, price }
    }

    /// Line total in full precision; rounding happens only when formatting.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.price
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingContent {
    pub items: Vec<PricingItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PricingContent {
    pub fn grand_total(&self) -> f64 {
        self.items.iter().map(PricingItem::line_total).fold(0.0, |total, line| total + line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialContent {
    pub quote: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaContent {
    pub title: String,
    pub button_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignatureContent {
    pub name: String,
    /// Image reference (URL or data URI) of the drawn signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Type-dependent block payload.
///
/// `Unknown` keeps blocks written by a newer editor intact: the raw type tag
/// and content survive a JSON round trip and render as empty output.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(TextContent),
    Image(ImageContent),
    Pricing(PricingContent),
    Video(VideoContent),
    Testimonial(TestimonialContent),
    Cta(CtaContent),
    Signature(SignatureContent),
    Unknown { kind: String, content: Value },
}

impl BlockContent {
    /// Known block type, or `None` for `Unknown`.
    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            BlockContent::Text(_) => Some(BlockType::Text),
            BlockContent::Image(_) => Some(BlockType::Image),
            BlockContent::Pricing(_) => Some(BlockType::Pricing),
            BlockContent::Video(_) => Some(BlockType::Video),
            BlockContent::Testimonial(_) => Some(BlockType::Testimonial),
            BlockContent::Cta(_) => Some(BlockType::Cta),
            BlockContent::Signature(_) => Some(BlockType::Signature),
            BlockContent::Unknown { .. } => None,
        }
    }

    /// The wire tag written to the `type` field.
    pub fn type_tag(&self) -> &str {
        match self {
            BlockContent::Unknown { kind, .. } => kind,
            known => known.block_type().map(BlockType::as_str).unwrap_or_default(),
        }
    }

    /// Decode a content payload for the given wire tag.
    pub fn from_parts(kind: &str, content: Value) -> Result<Self, BlockError> {
        let Some(block_type) = BlockType::parse(kind) else {
            return Ok(BlockContent::Unknown { kind: kind.to_string(), content });
        };
        // A missing payload decodes as an empty one so validation can report fields.
        let content = if content.is_null() { Value::Object(Default::default()) } else { content };

        Ok(match block_type {
            BlockType::Text => BlockContent::Text(decode(block_type, content)?),
            BlockType::Image => BlockContent::Image(decode(block_type, content)?),
            BlockType::Pricing => BlockContent::Pricing(decode(block_type, content)?),
            BlockType::Video => BlockContent::Video(decode(block_type, content)?),
            BlockType::Testimonial => BlockContent::Testimonial(decode(block_type, content)?),
            BlockType::Cta => BlockContent::Cta(decode(block_type, content)?),
            BlockType::Signature => BlockContent::Signature(decode(block_type, content)?),
        })
    }

    /// Empty payload for a freshly inserted block of `block_type`.
    pub fn empty(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => BlockContent::Text(TextContent::default()),
            BlockType::Image => BlockContent::Image(ImageContent::default()),
            BlockType::Pricing => BlockContent::Pricing(PricingContent::default()),
            BlockType::Video => BlockContent::Video(VideoContent::default()),
            BlockType::Testimonial => BlockContent::Testimonial(TestimonialContent::default()),
            BlockType::Cta => BlockContent::Cta(CtaContent::default()),
            BlockType::Signature => BlockContent::Signature(SignatureContent::default()),
        }
    }
}

fn decode<T: DeserializeOwned>(block_type: BlockType, content: Value) -> Result<T, BlockError> {
    serde_json::from_value(content)
        .map_err(|source| BlockError::InvalidContent { kind: block_type, source })
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("invalid content for `{kind}` block: {source}")]
    InvalidContent {
        kind: BlockType,
        #[source]
        source: serde_json::Error,
    },
}

/// A single typed content unit of a proposal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub content: BlockContent,
    /// Render order; dense and zero-based after every editor mutation.
    pub position: usize,
}

impl Block {
    /// Create a block with a fresh unique id.
    pub fn new(content: BlockContent, position: usize) -> Self {
        Self { id: Uuid::new_v4().to_string(), content, position }
    }

    pub fn with_id(id: impl Into<String>, content: BlockContent, position: usize) -> Self {
        Self { id: id.into(), content, position }
    }

    pub fn block_type(&self) -> Option<BlockType> {
        self.content.block_type()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Block", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.content.type_tag())?;
        match &self.content {
            BlockContent::Text(content) => state.serialize_field("content", content)?,
            BlockContent::Image(content) => state.serialize_field("content", content)?,
            BlockContent::Pricing(content) => state.serialize_field("content", content)?,
            BlockContent::Video(content) => state.serialize_field("content", content)?,
            BlockContent::Testimonial(content) => state.serialize_field("content", content)?,
            BlockContent::Cta(content) => state.serialize_field("content", content)?,
            BlockContent::Signature(content) => state.serialize_field("content", content)?,
            BlockContent::Unknown { content, .. } => state.serialize_field("content", content)?,
        }
        state.serialize_field("position", &self.position)?;
        state.end()
    }
}

#[derive(Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    position: usize,
}

impl TryFrom<RawBlock> for Block {
    type Error = BlockError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        Ok(Block {
            id: raw.id,
            content: BlockContent::from_parts(&raw.kind, raw.content)?,
            position: raw.position,
        })
    }
}

/// Blocks in render order. Stable, so equal positions keep their array order.
pub fn sorted_by_position(blocks: &[Block]) -> Vec<&Block> {
    let mut sorted: Vec<&Block> = blocks.iter().collect();
    sorted.sort_by_key(|block| block.position);
    sorted
}

// ── Proposals ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
}

/// Block-editor proposal: the aggregate root owning its blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Imported files without a timestamp are stamped on load.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            blocks: Vec::new(),
            updated_at: Utc::now(),
            status: ProposalStatus::Draft,
        }
    }
}

// ── Section documents ──────────────────────────────────────────────

/// The named sections rendered by the section-document renderer, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    ExecutiveSummary,
    ScopeOfWork,
    PricingBreakdown,
    Timeline,
    Terms,
}

impl SectionKind {
    /// Fixed render sequence between the header and the footer.
    pub const RENDER_ORDER: [SectionKind; 5] = [
        SectionKind::ExecutiveSummary,
        SectionKind::ScopeOfWork,
        SectionKind::PricingBreakdown,
        SectionKind::Timeline,
        SectionKind::Terms,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::ExecutiveSummary => "executive_summary",
            SectionKind::ScopeOfWork => "scope_of_work",
            SectionKind::PricingBreakdown => "pricing_breakdown",
            SectionKind::Timeline => "timeline",
            SectionKind::Terms => "terms",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::ExecutiveSummary => "Executive Summary",
            SectionKind::ScopeOfWork => "Scope of Work",
            SectionKind::PricingBreakdown => "Investment",
            SectionKind::Timeline => "Project Timeline",
            SectionKind::Terms => "Terms & Conditions",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::RENDER_ORDER.into_iter().find(|kind| kind.key() == key)
    }
}

/// Flat, named-section proposal used by the generation and export flow.
///
/// Section values are HTML fragments inserted verbatim. Keys outside
/// [`SectionKind`] are preserved but never rendered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionDocument {
    pub title: String,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub sections: BTreeMap<String, String>,
}

impl SectionDocument {
    pub fn new(title: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self { title: title.into(), client_name: client_name.into(), ..Self::default() }
    }

    pub fn with_section(mut self, kind: SectionKind, html: impl Into<String>) -> Self {
        self.sections.insert(kind.key().to_string(), html.into());
        self
    }

    /// Section content when present and not blank.
    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections
            .get(kind.key())
            .map(String::as_str)
            .filter(|html| !html.trim().is_empty())
    }
}
