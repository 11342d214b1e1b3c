// CLI subcommand dispatch.

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;

use proposify_core::serializer;
use proposify_core::types::{Proposal, SectionDocument};

use crate::exit_code::ExitCode;

pub mod branding;
pub mod export;
pub mod render;
pub mod validate;

#[derive(Subcommand)]
pub enum Command {
    /// Serialize a proposal's blocks to HTML, plain text or JSON
    Render(render::RenderArgs),
    /// Check whether a proposal is ready to send
    Validate(validate::ValidateArgs),
    /// Render a section document for preview, HTML, print or Word
    Export(export::ExportArgs),
    /// Show the effective branding parameters
    Branding(branding::BrandingArgs),
}

impl Command {
    /// Whether the command asked for JSON output explicitly.
    pub fn json_flag(&self) -> bool {
        match self {
            Command::Render(_) | Command::Export(_) => false,
            Command::Validate(args) => args.json,
            Command::Branding(args) => args.json,
        }
    }
}

pub fn run(cmd: Command) -> anyhow::Result<ExitCode> {
    match cmd {
        Command::Render(args) => render::run(args),
        Command::Validate(args) => validate::run(args),
        Command::Export(args) => export::run(args),
        Command::Branding(args) => branding::run(args),
    }
}

/// Read a proposal file: either a full proposal object or a bare block array
/// as persisted by the editor. Bare arrays take their title from the file name.
pub fn read_proposal(path: &Path) -> anyhow::Result<Proposal> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if contents.trim_start().starts_with('[') {
        let blocks = serializer::from_json(&contents)
            .with_context(|| format!("failed to parse blocks in {}", path.display()))?;
        let title = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
        let mut proposal = Proposal::new(title);
        proposal.blocks = blocks;
        return Ok(proposal);
    }

    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse proposal {}", path.display()))
}

pub fn read_section_document(path: &Path) -> anyhow::Result<SectionDocument> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse section document {}", path.display()))
}
