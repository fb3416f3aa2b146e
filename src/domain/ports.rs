use super::outcome::EngineState;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// How a spawned command's stdio is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Capture stdout and stderr into the returned `CommandOutput`.
    #[default]
    Capture,
    /// Let the child write straight to the parent's stderr. Only the exit
    /// status comes back.
    Inherit,
}

/// A fully-formed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub io: IoMode,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            io: IoMode::Capture,
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

    pub fn io(mut self, io: IoMode) -> Self {
        self.io = io;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Executes one external command. Never retries.
///
/// Returns `Err` only when the process could not be launched; a non-zero
/// exit is reported through `CommandOutput::status`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Answers the node's liveness query with the current block height.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn block_height(&self) -> Result<u64>;
    fn endpoint(&self) -> &str;
}

pub type CommandRunnerBox = Box<dyn CommandRunner>;
pub type LivenessProbeBox = Box<dyn LivenessProbe>;

/// Receives every orchestrator state transition. Purely observational.
pub trait ProgressSink: Send + Sync {
    fn transition(&self, state: EngineState);
}

/// Discards all transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressSink for Silent {
    fn transition(&self, _state: EngineState) {}
}
