//! Local transport: commands run through `sh -c`, files are plain copies.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

use super::{CommandOutput, Transport, TransportError};

/// Transport for a library reachable on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn name(&self) -> &str {
        "local"
    }

    fn target(&self) -> &str {
        "localhost"
    }

    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError> {
        debug!(command = %command, "local exec");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TransportError::Spawn {
                program: "sh".to_string(),
                source,
            })?;

        Ok(CommandOutput::from_process(output))
    }

    async fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), TransportError> {
        fs::copy(remote_path, local_path)
            .await
            .map_err(|e| TransportError::Download {
                remote: remote_path.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
