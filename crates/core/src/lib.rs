// proposify-core: proposal block model, editor operations, validation,
// serialization and branded section-document rendering.

pub mod branding;
pub mod editor;
pub mod export;
pub mod html;
pub mod render;
pub mod serializer;
pub mod types;
pub mod validation;
pub mod video;

pub use branding::{BrandingOverrides, BrandingParams};
pub use editor::{EditorState, History};
pub use export::{export, Export, ExportTarget, PdfOptions, PdfRequest};
pub use render::{generate_proposal_body, generate_proposal_html};
pub use serializer::{from_json, to_html, to_json, to_plain_text, ParseFailure, SerializedProposal};
pub use types::{Block, BlockContent, BlockType, Proposal, ProposalStatus, SectionDocument, SectionKind};
pub use validation::{can_send_proposal, sanitize_content, validate_block, ValidationResult};
