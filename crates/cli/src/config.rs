// Per-user configuration for the CLI.
//
// User config: `~/.proposify/config.toml`
// Per-document branding overrides: any TOML file passed with `--overrides`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use proposify_core::branding::{BrandingOverrides, BrandingParams};

/// Root directory for proposify user state: `~/.proposify/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".proposify"))
}

/// Path to the user config file: `~/.proposify/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

// ── User config ────────────────────────────────────────────────────

/// User configuration at `~/.proposify/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Saved branding preferences layered over the built-in defaults.
    pub branding: BrandingOverrides,
}

impl UserConfig {
    /// Load from `~/.proposify/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// An explicitly requested file must load; the implicit one may be absent.
    pub fn load_explicit_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Read a per-document overrides file: a bare table of branding keys.
pub fn load_overrides(path: &Path) -> Result<BrandingOverrides, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

/// Layer `overrides` onto the saved user branding and write it back, to
/// `config` when given or `~/.proposify/config.toml` otherwise. A missing
/// file starts from empty preferences. Returns the path written.
pub fn save_branding(
    config: Option<&Path>,
    overrides: &BrandingOverrides,
) -> Result<PathBuf, ConfigError> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => global_config_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            ))
        })?,
    };
    let mut user = if path.exists() { UserConfig::load_from(&path)? } else { UserConfig::default() };
    user.branding = user.branding.layered(overrides);
    user.save_to(&path)?;
    Ok(path)
}

/// Effective branding: defaults, then the user config, then the document file.
pub fn resolve_branding(
    config: Option<&Path>,
    overrides: Option<&Path>,
) -> Result<BrandingParams, ConfigError> {
    let user = UserConfig::load_explicit_or_default(config)?;
    let document = match overrides {
        Some(path) => load_overrides(path)?,
        None => BrandingOverrides::default(),
    };
    Ok(BrandingParams::resolve(&user.branding, &document))
}

// ── Errors ─────────────────────────────────────────────────────────

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
