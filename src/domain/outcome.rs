use super::amount::TokenAmount;
use std::fmt;

/// Result of a single step attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Recoverable; the retry executor will try again.
    Failure(String),
    /// The command runner raised an error. Retried like `Failure`, logged apart.
    Throw(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

/// The ordered funding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Impersonate,
    ApproveAllowance,
    TransferBalance,
}

impl StepKind {
    pub const ORDER: [StepKind; 3] = [
        StepKind::Impersonate,
        StepKind::ApproveAllowance,
        StepKind::TransferBalance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Impersonate => "impersonate",
            StepKind::ApproveAllowance => "approve",
            StepKind::TransferBalance => "transfer",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orchestrator lifecycle. `Converged` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Probing,
    Running(StepKind),
    Validating,
    Converged,
    Failed,
}

impl EngineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Converged | EngineState::Failed)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => f.write_str("idle"),
            EngineState::Probing => f.write_str("waiting for node"),
            EngineState::Running(step) => write!(f, "running {}", step),
            EngineState::Validating => f.write_str("validating"),
            EngineState::Converged => f.write_str("converged"),
            EngineState::Failed => f.write_str("failed"),
        }
    }
}

/// Final readings of a converged run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceReport {
    pub allowance: TokenAmount,
    pub balance: TokenAmount,
}
