use crate::application::orchestrator::FundingEngine;
use crate::config::{
    DEFAULT_IMPERSONATE_METHOD, DEFAULT_PROBE_METHOD, DEFAULT_PROGRAM, DEFAULT_RPC_URL,
    FundingConfig, NodeConfig, ReadinessPolicy, RetryPolicy,
};
use crate::domain::address::{Accounts, Address};
use crate::domain::amount::TokenAmount;
use crate::domain::target::TargetState;
use crate::error::Result;
use crate::infrastructure::http_probe::HttpProbe;
use crate::infrastructure::in_memory::InMemoryNode;
use crate::infrastructure::process::ProcessRunner;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::info;

/// Balance handed to the whale when rehearsing against the in-memory node.
const SIMULATED_WHALE_BALANCE: TokenAmount = TokenAmount::new(u128::MAX / 2);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Converge the funding wallet to the target balance and allowance
    Fund(FundArgs),
    /// Print the funding wallet's live balance and allowance as JSON
    Status(TargetArgs),
}

/// Node, accounts and target shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// JSON-RPC endpoint of the test node
    #[arg(long, env = "FUNDER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Token contract address
    #[arg(long, env = "FUNDER_TOKEN")]
    pub token: Address,

    /// Pre-funded account tokens are drawn from
    #[arg(long, env = "FUNDER_WHALE")]
    pub whale: Address,

    /// Wallet to converge
    #[arg(long = "wallet", env = "FUNDER_WALLET")]
    pub funding_wallet: Address,

    /// Contract allowed to spend from the wallet
    #[arg(long, env = "FUNDER_SPENDER")]
    pub spender: Address,

    /// Minimum allowance granted to the spender
    #[arg(long, env = "FUNDER_ALLOWANCE_FLOOR")]
    pub allowance_floor: TokenAmount,

    /// Exact balance the wallet must hold
    #[arg(long, env = "FUNDER_BALANCE_TARGET")]
    pub balance_target: TokenAmount,

    /// Command-line client used to talk to the node
    #[arg(long = "cast", env = "FUNDER_CAST", default_value = DEFAULT_PROGRAM)]
    pub program: String,

    /// RPC method that enables impersonation
    #[arg(long, env = "FUNDER_IMPERSONATE_METHOD", default_value = DEFAULT_IMPERSONATE_METHOD)]
    pub impersonate_method: String,

    /// Rehearse against an in-process ledger instead of a real node
    #[arg(long)]
    pub simulated: bool,

    /// Starting wallet balance for --simulated runs
    #[arg(long, requires = "simulated")]
    pub simulated_balance: Option<TokenAmount>,
}

#[derive(Args, Debug, Clone)]
pub struct FundArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Attempts per step before giving up
    #[arg(long, env = "FUNDER_MAX_RETRIES", default_value_t = 5)]
    pub max_retries: u32,

    /// Pause after each state-mutating command, in milliseconds
    #[arg(long, env = "FUNDER_SETTLE_MS", default_value_t = 2000)]
    pub settle_ms: u64,

    /// Liveness probes before the node is declared dead
    #[arg(long, env = "FUNDER_READY_ATTEMPTS", default_value_t = 30)]
    pub ready_attempts: u32,

    /// Pause between liveness probes, in milliseconds
    #[arg(long, env = "FUNDER_POLL_MS", default_value_t = 1000)]
    pub poll_ms: u64,

    /// JSON-RPC method used as the liveness query
    #[arg(long, env = "FUNDER_PROBE_METHOD", default_value = DEFAULT_PROBE_METHOD)]
    pub probe_method: String,

    /// Show a spinner with the engine's current state on stderr
    #[arg(long)]
    pub progress: bool,

    /// Stream the node client's output for write commands to stderr
    #[arg(long, env = "FUNDER_STREAM_WRITES")]
    pub stream_writes: bool,
}

impl TargetArgs {
    /// Builds a validated config with the given retry and readiness policies.
    pub fn to_config(
        &self,
        retry: RetryPolicy,
        readiness: ReadinessPolicy,
    ) -> Result<FundingConfig> {
        FundingConfig {
            node: NodeConfig {
                rpc_url: self.rpc_url.clone(),
                token: self.token.clone(),
                program: self.program.clone(),
                impersonate_method: self.impersonate_method.clone(),
                stream_writes: false,
            },
            accounts: Accounts {
                whale: self.whale.clone(),
                funding_wallet: self.funding_wallet.clone(),
                spender: self.spender.clone(),
            },
            target: TargetState::new(self.allowance_floor, self.balance_target),
            retry,
            readiness,
        }
        .validate()
    }

    /// Wires the engine to a real node, or to a seeded in-memory node when
    /// `--simulated` is set.
    pub async fn engine(&self, config: &FundingConfig) -> Result<FundingEngine> {
        if self.simulated {
            let node = InMemoryNode::new(config.node.token.clone())
                .with_impersonate_method(config.node.impersonate_method.clone());
            node.unlock(&config.accounts.funding_wallet).await;
            node.set_balance(&config.accounts.whale, SIMULATED_WHALE_BALANCE)
                .await;
            if let Some(balance) = self.simulated_balance {
                node.set_balance(&config.accounts.funding_wallet, balance)
                    .await;
            }
            info!("using simulated in-memory node");
            return Ok(FundingEngine::new(
                Box::new(node.clone()),
                Box::new(node),
            ));
        }

        let probe = HttpProbe::new(
            config.node.rpc_url.clone(),
            config.readiness.probe_method.clone(),
            config.readiness.timeout,
        )?;
        Ok(FundingEngine::new(
            Box::new(ProcessRunner::new()),
            Box::new(probe),
        ))
    }
}

impl FundArgs {
    pub fn to_config(&self) -> Result<FundingConfig> {
        let retry = RetryPolicy {
            max_retries: self.max_retries,
            settle_delay: Duration::from_millis(self.settle_ms),
        };
        let readiness = ReadinessPolicy {
            max_attempts: self.ready_attempts,
            poll_interval: Duration::from_millis(self.poll_ms),
            probe_method: self.probe_method.clone(),
            ..ReadinessPolicy::default()
        };
        let mut config = self.target.to_config(retry, readiness)?;
        config.node.stream_writes = self.stream_writes;
        Ok(config)
    }
}
