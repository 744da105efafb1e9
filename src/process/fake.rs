//! Scripted command runner for unit tests

use super::{Cmd, CmdOutput, CommandRunner};
use crate::error::{DrctlError, DrctlResult};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

enum Response {
    Exit {
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    Missing,
}

struct Rule {
    pattern: String,
    response: Response,
}

/// Records every command and answers from rules matched on the command line.
///
/// The first rule whose pattern is a substring of the command line wins;
/// commands matching no rule succeed with empty output.
#[derive(Default)]
pub(crate) struct FakeRunner {
    calls: Mutex<Vec<Cmd>>,
    rules: Mutex<Vec<Rule>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long in every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stdout(self, pattern: &str, stdout: &[u8]) -> Self {
        self.push(
            pattern,
            Response::Exit {
                code: 0,
                stdout: stdout.to_vec(),
                stderr: Vec::new(),
            },
        )
    }

    pub fn fail(self, pattern: &str, code: i32, stderr: &str) -> Self {
        self.push(
            pattern,
            Response::Exit {
                code,
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            },
        )
    }

    pub fn missing(self, pattern: &str) -> Self {
        self.push(pattern, Response::Missing)
    }

    fn push(self, pattern: &str, response: Response) -> Self {
        self.rules.lock().unwrap().push(Rule {
            pattern: pattern.to_string(),
            response,
        });
        self
    }

    /// All commands run so far
    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines run so far
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    /// Number of commands whose command line contains `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(pattern)).count()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn output(&self, cmd: &Cmd) -> DrctlResult<CmdOutput> {
        self.calls.lock().unwrap().push(cmd.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let line = cmd.to_string();
        let rules = self.rules.lock().unwrap();
        match rules.iter().find(|r| line.contains(&r.pattern)) {
            Some(Rule {
                response:
                    Response::Exit {
                        code,
                        stdout,
                        stderr,
                    },
                ..
            }) => Ok(CmdOutput {
                code: Some(*code),
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            }),
            Some(Rule {
                response: Response::Missing,
                ..
            }) => Err(DrctlError::command_failed(
                line.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )),
            None => Ok(CmdOutput {
                code: Some(0),
                ..Default::default()
            }),
        }
    }
}
