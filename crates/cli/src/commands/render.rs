// `proposify render` — serialize a proposal's blocks.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::info;

use proposify_core::serializer;
use proposify_core::types::Block;
use proposify_core::validation::sanitize_content;

use crate::exit_code::ExitCode;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Html,
    Text,
    Json,
    /// All three formats in one JSON object.
    All,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Proposal JSON file (full proposal or bare block array).
    pub input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = RenderFormat::Html)]
    pub format: RenderFormat,

    /// Write to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Skip content sanitization before rendering.
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<ExitCode> {
    let proposal = super::read_proposal(&args.input)?;
    let blocks = if args.raw { proposal.blocks } else { sanitized(&proposal.blocks) };
    let rendered = render(&blocks, args.format)?;
    info!(blocks = blocks.len(), format = ?args.format, "rendered proposal");

    output::emit_document(args.out.as_deref(), &rendered)?;
    Ok(ExitCode::Success)
}

fn sanitized(blocks: &[Block]) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| Block { content: sanitize_content(&block.content), ..block.clone() })
        .collect()
}

fn render(blocks: &[Block], format: RenderFormat) -> anyhow::Result<String> {
    Ok(match format {
        RenderFormat::Html => serializer::to_html(blocks),
        RenderFormat::Text => serializer::to_plain_text(blocks),
        RenderFormat::Json => serializer::to_json(blocks).context("failed to serialize blocks")?,
        RenderFormat::All => {
            let bundle = serializer::serialize_all(blocks).context("failed to serialize blocks")?;
            serde_json::to_string_pretty(&bundle)?
        }
    })
}
