// `proposify export` — render a section document for one export target.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use proposify_core::export::{self as exporter, Export, ExportTarget};

use crate::config;
use crate::exit_code::ExitCode;
use crate::output;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Section document JSON file.
    pub input: PathBuf,

    /// Export target: preview, html, print or word.
    #[arg(long, default_value_t = ExportTarget::Html)]
    pub target: ExportTarget,

    /// Per-document branding overrides (TOML).
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// User config file (defaults to ~/.proposify/config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> anyhow::Result<ExitCode> {
    let doc = super::read_section_document(&args.input)?;
    let branding = config::resolve_branding(args.config.as_deref(), args.overrides.as_deref())
        .context("failed to resolve branding")?;

    let exported = exporter::export(&doc, &branding, args.target);
    info!(
        export_target = %args.target,
        file_name = exported.file_name(),
        "exported section document"
    );

    let contents = match &exported {
        Export::Document { html, .. } => html.clone(),
        Export::Print(request) => {
            serde_json::to_string_pretty(request).context("failed to serialize print request")?
        }
    };
    output::emit_document(args.out.as_deref(), &contents)?;
    Ok(ExitCode::Success)
}
