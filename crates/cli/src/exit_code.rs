// Consistent exit codes for the proposify CLI.
//
//   0 = success
//   1 = general error
//   2 = usage/argument error
//   3 = document is malformed or fails validation
//   4 = configuration error

use std::process;

use proposify_core::serializer::ParseFailure;

use crate::config::ConfigError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    InvalidDocument = 3,
    Config = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Config;
            }
            if cause.downcast_ref::<ParseFailure>().is_some()
                || cause.downcast_ref::<serde_json::Error>().is_some()
            {
                return Self::InvalidDocument;
            }
        }
        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Error.code(), 1);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::InvalidDocument.code(), 3);
        assert_eq!(ExitCode::Config.code(), 4);
    }

    #[test]
    fn parse_failure_in_chain_is_invalid_document() {
        let err = Err::<(), _>(ParseFailure { reason: "expected value".into() })
            .context("failed to read proposal.json")
            .unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidDocument);
    }

    #[test]
    fn json_errors_are_invalid_document() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = anyhow::Error::new(json_err).context("failed to parse sections.json");
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidDocument);
    }

    #[test]
    fn config_errors_map_to_config() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = anyhow::Error::new(ConfigError::Io(io));
        assert_eq!(ExitCode::from_error(&err), ExitCode::Config);
    }

    #[test]
    fn from_error_generic_is_error() {
        let err = anyhow::anyhow!("something went wrong");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Error);
    }
}
