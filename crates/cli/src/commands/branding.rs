// `proposify branding` — show the effective branding parameters.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use proposify_core::branding::BrandingParams;

use crate::config;
use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct BrandingArgs {
    /// Per-document branding overrides (TOML).
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// User config file (defaults to ~/.proposify/config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Persist the `--overrides` file into the user config.
    #[arg(long, requires = "overrides")]
    pub save: bool,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BrandingArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);
    if args.save {
        if let Some(path) = args.overrides.as_deref() {
            let overrides = config::load_overrides(path)?;
            let written = config::save_branding(args.config.as_deref(), &overrides)?;
            info!(path = %written.display(), "saved branding preferences");
        }
    }
    let branding = config::resolve_branding(args.config.as_deref(), args.overrides.as_deref())?;
    output::print_output(format, &branding, format_human)?;
    Ok(ExitCode::Success)
}

fn format_human(branding: &BrandingParams) -> String {
    let flag = |on: bool| if on { "on" } else { "off" };
    let (company_logo, client_logo) = branding.logos();
    let logo = |logo: Option<&str>| if logo.is_some() { "set" } else { "none" };

    [
        format!("colors      primary {}  secondary {}", branding.primary_color, branding.secondary_color),
        format!("            text {}  heading {}", branding.text_color, branding.heading_color),
        format!(
            "typography  {} at {}px, line height {}",
            branding.font_family, branding.font_size_base, branding.line_height
        ),
        format!("margins     {}", branding.margins.css()),
        format!(
            "logos       {:?} / {:?} / {:?} (company {}, client {})",
            branding.logo_position,
            branding.logo_size,
            branding.logo_layout,
            logo(company_logo),
            logo(client_logo)
        ),
        format!(
            "layout      header {}  footer {}  page numbers {}",
            flag(branding.show_header),
            flag(branding.show_footer),
            flag(branding.show_page_numbers)
        ),
    ]
    .join("\n")
}
