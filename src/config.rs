//! Run configuration.
//!
//! Every value is fixed for the lifetime of a run; the engine borrows the
//! config and never mutates it.

use crate::domain::address::{Accounts, Address};
use crate::domain::target::TargetState;
use crate::error::{FundingError, Result};
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_PROGRAM: &str = "cast";
pub const DEFAULT_PROBE_METHOD: &str = "chain_blockHeight";
pub const DEFAULT_IMPERSONATE_METHOD: &str = "anvil_impersonateAccount";

/// Where the node lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub rpc_url: String,
    /// Token contract whose balance and allowance are converged.
    pub token: Address,
    /// Command-line client used for reads and writes.
    pub program: String,
    pub impersonate_method: String,
    /// Stream write commands' output to stderr instead of capturing it.
    pub stream_writes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per step before the run is aborted.
    pub max_retries: u32,
    /// Pause after every state-mutating command.
    pub settle_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            settle_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub probe_method: String,
    /// Per-request timeout for the liveness call.
    pub timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval: Duration::from_millis(1000),
            probe_method: DEFAULT_PROBE_METHOD.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Everything a funding run needs.
#[derive(Debug, Clone)]
pub struct FundingConfig {
    pub node: NodeConfig,
    pub accounts: Accounts,
    pub target: TargetState,
    pub retry: RetryPolicy,
    pub readiness: ReadinessPolicy,
}

impl FundingConfig {
    /// Rejects configurations that could never converge.
    pub fn validate(self) -> Result<Self> {
        if self.retry.max_retries == 0 {
            return Err(FundingError::Config(
                "max retries must be at least 1".to_string(),
            ));
        }
        if self.readiness.max_attempts == 0 {
            return Err(FundingError::Config(
                "readiness attempts must be at least 1".to_string(),
            ));
        }
        if self.accounts.whale == self.accounts.funding_wallet {
            return Err(FundingError::Config(
                "whale and funding wallet are the same account".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::TokenAmount;

    fn address(last: u8) -> Address {
        format!("0x{:040x}", last).parse().unwrap()
    }

    fn config() -> FundingConfig {
        FundingConfig {
            node: NodeConfig {
                rpc_url: DEFAULT_RPC_URL.to_string(),
                token: address(9),
                program: DEFAULT_PROGRAM.to_string(),
                impersonate_method: DEFAULT_IMPERSONATE_METHOD.to_string(),
                stream_writes: false,
            },
            accounts: Accounts {
                whale: address(1),
                funding_wallet: address(2),
                spender: address(3),
            },
            target: TargetState::new(TokenAmount::new(10), TokenAmount::new(5)),
            retry: RetryPolicy::default(),
            readiness: ReadinessPolicy::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.settle_delay, Duration::from_secs(2));
        assert_eq!(ReadinessPolicy::default().probe_method, "chain_blockHeight");
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let mut cfg = config();
        cfg.retry.max_retries = 0;
        assert!(matches!(cfg.validate(), Err(FundingError::Config(_))));

        let mut cfg = config();
        cfg.readiness.max_attempts = 0;
        assert!(matches!(cfg.validate(), Err(FundingError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_self_funding() {
        let mut cfg = config();
        cfg.accounts.funding_wallet = cfg.accounts.whale.clone();
        assert!(matches!(cfg.validate(), Err(FundingError::Config(_))));
    }
}
