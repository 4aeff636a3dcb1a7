//! SSH transport using the system `ssh` client.
//!
//! Subprocess mode: every operation spawns `ssh user@host <command>`.
//! Downloads stream `cat <path>` from the remote side straight into the
//! local file, so no separate scp/sftp channel is needed.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::debug;

use super::{shell_quote, CommandOutput, Transport, TransportError};

/// How to authenticate against the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Private key file (`ssh -i`)
    Key(PathBuf),

    /// Password, fed through `sshpass -e`
    Password(String),

    /// Whatever the ssh agent or default key files provide
    Agent,
}

impl Credentials {
    /// Pick credentials the way the config layer exposes them:
    /// key path wins over password, and neither means agent.
    pub fn resolve(key_path: Option<PathBuf>, password: Option<String>) -> Self {
        match (key_path, password) {
            (Some(key), _) => Credentials::Key(key),
            (None, Some(password)) if !password.is_empty() => Credentials::Password(password),
            _ => Credentials::Agent,
        }
    }

    /// Short label for status output (never includes secrets)
    pub fn describe(&self) -> String {
        match self {
            Credentials::Key(path) => format!("key {}", path.display()),
            Credentials::Password(_) => "password".to_string(),
            Credentials::Agent => "agent/default keys".to_string(),
        }
    }
}

/// SSH transport using subprocess mode
pub struct SshTransport {
    host: String,
    user: String,
    port: u16,
    credentials: Credentials,
    command_timeout: Duration,
}

impl SshTransport {
    /// Create a transport for `user@host:port`
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        port: u16,
        credentials: Credentials,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            port,
            credentials,
            command_timeout: Duration::from_secs(300),
        }
    }

    /// Override the per-command timeout
    pub fn with_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Program name actually spawned (for error messages)
    fn program(&self) -> &'static str {
        match self.credentials {
            Credentials::Password(_) => "sshpass",
            _ => "ssh",
        }
    }

    /// Build the base `ssh` invocation for a remote command
    fn command(&self, remote_command: &str) -> Command {
        let mut cmd = match &self.credentials {
            Credentials::Password(password) => {
                let mut cmd = Command::new("sshpass");
                cmd.arg("-e").arg("ssh").env("SSHPASS", password);
                cmd
            }
            _ => Command::new("ssh"),
        };

        cmd.args(self.ssh_args())
            .arg(self.destination())
            .arg(remote_command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Options shared by every invocation (without program or destination)
    fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ];

        match &self.credentials {
            Credentials::Key(path) => {
                args.push("-i".to_string());
                args.push(path.display().to_string());
                args.push("-o".to_string());
                args.push("BatchMode=yes".to_string());
            }
            Credentials::Agent => {
                args.push("-o".to_string());
                args.push("BatchMode=yes".to_string());
            }
            Credentials::Password(_) => {
                args.push("-o".to_string());
                args.push("PubkeyAuthentication=no".to_string());
            }
        }

        args
    }

    async fn run(&self, remote_command: &str) -> Result<CommandOutput, TransportError> {
        debug!(host = %self.host, command = %remote_command, "ssh exec");

        let child = self
            .command(remote_command)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program().to_string(),
                source,
            })?;

        let output = timeout(self.command_timeout, child.wait_with_output())
            .await
            .map_err(|_| TransportError::Timeout {
                command: remote_command.to_string(),
                seconds: self.command_timeout.as_secs(),
            })??;

        Ok(CommandOutput::from_process(output))
    }
}

#[async_trait]
impl Transport for SshTransport {
    fn name(&self) -> &str {
        "ssh"
    }

    fn target(&self) -> &str {
        &self.host
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let output = self.run("true").await.map_err(|e| match e {
            TransportError::Spawn { .. } => e,
            other => TransportError::Connect {
                host: self.host.clone(),
                message: other.to_string(),
            },
        })?;

        if !output.success {
            let message = output.stderr.trim();
            return Err(TransportError::Connect {
                host: self.host.clone(),
                message: if message.is_empty() {
                    "ssh exited with a non-zero status".to_string()
                } else {
                    message.to_string()
                },
            });
        }

        Ok(())
    }

    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.run(command).await
    }

    async fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), TransportError> {
        let remote_command = format!("cat {}", shell_quote(remote_path));
        debug!(host = %self.host, remote = %remote_path, local = %local_path.display(), "ssh download");

        let transfer = async {
            let mut child = self
                .command(&remote_command)
                .spawn()
                .map_err(|source| TransportError::Spawn {
                    program: self.program().to_string(),
                    source,
                })?;

            stream_to_file(&mut child, local_path).await
        };

        let (status, stderr) = timeout(self.command_timeout, transfer)
            .await
            .map_err(|_| TransportError::Timeout {
                command: remote_command.clone(),
                seconds: self.command_timeout.as_secs(),
            })??;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(TransportError::Download {
                remote: remote_path.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Copy a child's stdout into `local_path` while draining its stderr.
///
/// Both pipes are read together so a chatty stderr cannot fill its buffer
/// and stall the child before stdout reaches EOF.
async fn stream_to_file(
    child: &mut Child,
    local_path: &Path,
) -> Result<(ExitStatus, Vec<u8>), TransportError> {
    let (mut stdout, mut stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            return Err(std::io::Error::other("child output streams were not captured").into());
        }
    };

    let mut file = fs::File::create(local_path).await?;
    let mut errors = Vec::new();
    let (copied, drained) = tokio::join!(
        tokio::io::copy(&mut stdout, &mut file),
        stderr.read_to_end(&mut errors),
    );
    copied?;
    drained?;
    file.flush().await?;

    let status = child.wait().await?;
    Ok((status, errors))
}
