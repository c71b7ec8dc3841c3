//! Command implementations.
//!
//! peercheck has a single command; this module holds the context it runs in.

use camino::Utf8PathBuf;
use peercheck_core::error::{PeerCheckError, PeerCheckResult};

pub mod check;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;

/// Shared context for the check command
pub struct CommandContext {
    /// Project root
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a context for `cwd`, or the current directory
    pub fn new(cwd: Option<Utf8PathBuf>) -> PeerCheckResult<Self> {
        let cwd = match cwd {
            Some(cwd) => cwd,
            None => {
                let current = std::env::current_dir()
                    .map_err(|e| PeerCheckError::io("Failed to get current directory".to_string(), e))?;
                Utf8PathBuf::try_from(current).map_err(|e| PeerCheckError::ConfigValidation {
                    field: "cwd".to_string(),
                    reason: format!("current directory is not valid UTF-8: {}", e),
                })?
            },
        };

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
        })
    }
}
