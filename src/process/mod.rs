//! External command execution
//!
//! Every external tool (podman, minikube, limactl, kubectl, kustomize, make)
//! is called through the [`CommandRunner`] trait so deploy and cache logic
//! never touch process spawning directly.

#[cfg(test)]
pub(crate) mod fake;

use crate::error::{DrctlError, DrctlResult};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Input fed to a child process
#[derive(Debug, Clone)]
pub enum Stdin {
    /// Write these bytes and close stdin
    Bytes(Vec<u8>),
    /// Stream this file into stdin
    File(PathBuf),
}

/// An external command line
#[derive(Debug, Clone)]
pub struct Cmd {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Stdin>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, stdin: Stdin) -> Self {
        self.stdin = Some(stdin);
        self
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CmdOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    /// Return stdout if the command succeeded, otherwise a structured error
    pub fn check(self, cmd: &Cmd) -> DrctlResult<Vec<u8>> {
        match self.code {
            Some(0) => Ok(self.stdout),
            Some(code) => Err(DrctlError::Command {
                command: cmd.to_string(),
                code,
                stderr: String::from_utf8_lossy(&self.stderr).trim().to_string(),
                stdout: String::from_utf8_lossy(&self.stdout).trim().to_string(),
            }),
            None => Err(DrctlError::ProcessSignaled {
                command: cmd.to_string(),
            }),
        }
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, capturing stdout and stderr.
    ///
    /// Fails only when the command could not be started; a non-zero exit is
    /// reported in the returned [`CmdOutput`].
    async fn output(&self, cmd: &Cmd) -> DrctlResult<CmdOutput>;

    /// Run a command and fail unless it exits with 0
    async fn run(&self, cmd: &Cmd) -> DrctlResult<Vec<u8>> {
        self.output(cmd).await?.check(cmd)
    }
}

/// Runs commands as local child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn output(&self, cmd: &Cmd) -> DrctlResult<CmdOutput> {
        debug!("Running {}", cmd);

        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match &cmd.stdin {
            None => command
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| DrctlError::command_failed(cmd.to_string(), e))?,
            Some(Stdin::File(path)) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    DrctlError::io(format!("opening {} for {}", path.display(), cmd.program), e)
                })?;
                command
                    .stdin(Stdio::from(file))
                    .output()
                    .await
                    .map_err(|e| DrctlError::command_failed(cmd.to_string(), e))?
            }
            Some(Stdin::Bytes(bytes)) => {
                let mut child = command
                    .stdin(Stdio::piped())
                    .spawn()
                    .map_err(|e| DrctlError::command_failed(cmd.to_string(), e))?;

                // Feed stdin concurrently so a chatty child cannot block on a full pipe.
                let writer = child.stdin.take().map(|mut stdin| {
                    let bytes = bytes.clone();
                    tokio::spawn(async move {
                        let result = stdin.write_all(&bytes).await;
                        drop(stdin);
                        result
                    })
                });

                let output = child
                    .wait_with_output()
                    .await
                    .map_err(|e| DrctlError::command_failed(cmd.to_string(), e))?;

                if let Some(writer) = writer {
                    match writer.await {
                        Ok(Ok(())) => {}
                        // The child may exit without reading all input; its exit code tells the story.
                        Ok(Err(e)) => debug!("Writing stdin of {} failed: {}", cmd.program, e),
                        Err(e) => return Err(DrctlError::Internal(e.to_string())),
                    }
                }

                output
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", cmd.program, stderr.trim());
        }

        Ok(CmdOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_display() {
        let cmd = Cmd::new("kubectl").args(["apply", "--filename=-"]);
        assert_eq!(cmd.to_string(), "kubectl apply --filename=-");
    }

    #[test]
    fn check_nonzero_exit() {
        let cmd = Cmd::new("false");
        let output = CmdOutput {
            code: Some(1),
            stdout: b"out\n".to_vec(),
            stderr: b"bad things\n".to_vec(),
        };
        match output.check(&cmd).unwrap_err() {
            DrctlError::Command {
                command,
                code,
                stderr,
                stdout,
            } => {
                assert_eq!(command, "false");
                assert_eq!(code, 1);
                assert_eq!(stderr, "bad things");
                assert_eq!(stdout, "out");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_signaled() {
        let output = CmdOutput {
            code: None,
            ..Default::default()
        };
        assert!(matches!(
            output.check(&Cmd::new("sleep")),
            Err(DrctlError::ProcessSignaled { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_captures_output() {
        let out = ProcessRunner::new()
            .run(&Cmd::new("sh").args(["-c", "echo hello"]))
            .await
            .unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_feeds_stdin() {
        let out = ProcessRunner::new()
            .run(&Cmd::new("cat").stdin(Stdin::Bytes(b"manifest".to_vec())))
            .await
            .unwrap();
        assert_eq!(out, b"manifest");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_streams_file_to_stdin() {
        let temp = tempfile::TempDir::new().unwrap();
        let tar = temp.path().join("image.tar");
        std::fs::write(&tar, b"tar bytes").unwrap();

        let out = ProcessRunner::new()
            .run(&Cmd::new("cat").stdin(Stdin::File(tar)))
            .await
            .unwrap();
        assert_eq!(out, b"tar bytes");
    }

    #[tokio::test]
    async fn process_runner_missing_binary() {
        let err = ProcessRunner::new()
            .output(&Cmd::new("drctl-no-such-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, DrctlError::CommandFailed { .. }));
        assert!(err.exit_code().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_reports_exit_code() {
        let err = ProcessRunner::new()
            .run(&Cmd::new("sh").args(["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.to_string().contains("oops"));
    }
}
