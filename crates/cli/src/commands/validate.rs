// `proposify validate` — run the send gate over a proposal.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use proposify_core::validation::{can_send_proposal, ValidationResult};

use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Proposal JSON file (full proposal or bare block array).
    pub input: PathBuf,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);
    let proposal = super::read_proposal(&args.input)?;
    let result = can_send_proposal(&proposal.title, &proposal.blocks);
    debug!(errors = result.errors.len(), "validated proposal");

    output::print_output(format, &result, format_human)?;
    Ok(if result.is_valid { ExitCode::Success } else { ExitCode::InvalidDocument })
}

fn format_human(result: &ValidationResult) -> String {
    if result.is_valid {
        return "Ready to send: no problems found".to_string();
    }

    let mut lines = vec![format!("Not ready to send: {} problem(s)", result.errors.len())];
    for error in &result.errors {
        lines.push(format!("  {:<12} {:<18} {}", error.block_id, error.field, error.message));
    }
    lines.join("\n")
}
