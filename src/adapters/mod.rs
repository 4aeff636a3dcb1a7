//! Transport interfaces for reaching the book library.
//!
//! A transport can run one shell command and pull one file down to a local
//! path. `SshTransport` talks to a remote server through the system `ssh`
//! binary; `LocalTransport` runs against the local machine, which is handy
//! for libraries mounted over NFS/SMB.

pub mod local;
pub mod ssh;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalTransport;
pub use ssh::{Credentials, SshTransport};

/// Captured result of a shell command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output (lossily decoded)
    pub stdout: String,

    /// Standard error (lossily decoded)
    pub stderr: String,

    /// Whether the command exited with status 0
    pub success: bool,
}

impl CommandOutput {
    /// Build from a finished child process
    pub fn from_process(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        }
    }
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to {host}: {message}")]
    Connect { host: String, message: String },

    #[error("Command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },

    #[error("Failed to download {remote}: {message}")]
    Download { remote: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A session that can run commands and fetch files
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Where the transport points (host name, or "localhost")
    fn target(&self) -> &str;

    /// Verify the session can be opened (authentication, reachability)
    async fn connect(&self) -> Result<(), TransportError>;

    /// Execute a single shell command and capture its output streams
    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError>;

    /// Copy one file from the library side to `local_path`
    async fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), TransportError>;
}

/// Quote a value for a POSIX shell double-quoted context.
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
