//! Hand-off to an external transfer tool after a local build.
//!
//! The output directory is the working directory of the transfer, and `.`
//! is the source argument, so the remote ends up mirroring the output root:
//!
//! ```text
//! (cd output && rsync -av --exclude=.git --delete . user@host:/var/www/site)
//! ```

use crate::config::PublishConfig;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("no remote configured: set publish.remote in config.toml")]
    NoRemote,
    #[error("cannot run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Build the transfer command without running it.
pub fn transfer_command(output_dir: &Path, config: &PublishConfig) -> Result<Command, RemoteError> {
    let remote = config.remote.as_deref().ok_or(RemoteError::NoRemote)?;
    let mut command = Command::new(&config.command);
    command
        .args(&config.args)
        .arg(".")
        .arg(remote)
        .current_dir(output_dir);
    Ok(command)
}

/// Run the transfer and wait for it. Output is inherited from this process.
pub fn sync(output_dir: &Path, config: &PublishConfig) -> Result<(), RemoteError> {
    let mut command = transfer_command(output_dir, config)?;
    tracing::info!(command = %config.command, remote = ?config.remote, "publishing");
    let status = command.status().map_err(|source| RemoteError::Spawn {
        command: config.command.clone(),
        source,
    })?;
    if !status.success() {
        return Err(RemoteError::Failed {
            command: config.command.clone(),
            status,
        });
    }
    Ok(())
}
