use crate::domain::amount::TokenAmount;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum FundingError {
    #[error("failed to launch `{program}`: {source}")]
    #[diagnostic(code(funder::launch), help("is the command-line client installed and on PATH?"))]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {status}: {stderr}")]
    #[diagnostic(code(funder::command_failed))]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("could not parse {what} from `{raw}`")]
    #[diagnostic(code(funder::parse))]
    Parse { what: &'static str, raw: String },

    #[error("liveness probe failed: {0}")]
    #[diagnostic(code(funder::probe))]
    Probe(String),

    #[error("node at {url} did not become ready after {attempts} attempts")]
    #[diagnostic(code(funder::not_ready))]
    NodeNotReady { url: String, attempts: u32 },

    #[error("step `{step}` failed after {attempts} attempts")]
    #[diagnostic(code(funder::retry_exhausted))]
    RetryExhausted { step: String, attempts: u32 },

    #[error("allowance {allowance} is below floor {floor} (balance {balance})")]
    #[diagnostic(code(funder::allowance_below_floor))]
    AllowanceBelowFloor {
        allowance: TokenAmount,
        floor: TokenAmount,
        balance: TokenAmount,
    },

    #[error("balance {balance} does not match target {target} (allowance {allowance})")]
    #[diagnostic(code(funder::balance_mismatch))]
    BalanceMismatch {
        balance: TokenAmount,
        target: TokenAmount,
        allowance: TokenAmount,
    },

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(funder::config))]
    Config(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(funder::io))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(funder::json))]
    Json(#[from] serde_json::Error),
}

impl FundingError {
    /// Fatal errors end the run. Everything else is a transient attempt
    /// failure that the retry executor may absorb.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FundingError::RetryExhausted { .. }
                | FundingError::NodeNotReady { .. }
                | FundingError::AllowanceBelowFloor { .. }
                | FundingError::BalanceMismatch { .. }
                | FundingError::Config(_)
        )
    }
}

impl From<reqwest::Error> for FundingError {
    fn from(err: reqwest::Error) -> Self {
        FundingError::Probe(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FundingError>;
