#![allow(dead_code)]

use funder::application::orchestrator::FundingEngine;
use funder::config::{
    DEFAULT_IMPERSONATE_METHOD, DEFAULT_PROGRAM, FundingConfig, NodeConfig, ReadinessPolicy,
    RetryPolicy,
};
use funder::domain::address::{Accounts, Address};
use funder::domain::amount::TokenAmount;
use funder::domain::outcome::EngineState;
use funder::domain::ports::ProgressSink;
use funder::domain::target::TargetState;
use funder::infrastructure::in_memory::InMemoryNode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ALLOWANCE_FLOOR: u128 = 999_999_999_999_999_111_119_999_999_999_999_999;
pub const BALANCE_TARGET: u128 = 10_000_000_000_000_000_000_000;
pub const WHALE_BALANCE: u128 = u128::MAX / 2;

pub const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
pub const WHALE: &str = "0x0000000000000000000000000000000000000001";
pub const WALLET: &str = "0x0000000000000000000000000000000000000002";
pub const SPENDER: &str = "0x0000000000000000000000000000000000000003";

pub fn addr(raw: &str) -> Address {
    raw.parse().expect("valid test address")
}

pub fn config(max_retries: u32) -> FundingConfig {
    FundingConfig {
        node: NodeConfig {
            rpc_url: "in-memory".to_string(),
            token: addr(TOKEN),
            program: DEFAULT_PROGRAM.to_string(),
            impersonate_method: DEFAULT_IMPERSONATE_METHOD.to_string(),
            stream_writes: false,
        },
        accounts: Accounts {
            whale: addr(WHALE),
            funding_wallet: addr(WALLET),
            spender: addr(SPENDER),
        },
        target: TargetState::new(
            TokenAmount::new(ALLOWANCE_FLOOR),
            TokenAmount::new(BALANCE_TARGET),
        ),
        retry: RetryPolicy {
            max_retries,
            settle_delay: Duration::ZERO,
        },
        readiness: ReadinessPolicy {
            max_attempts: 3,
            poll_interval: Duration::from_millis(1),
            ..ReadinessPolicy::default()
        },
    }
}

/// A node where the wallet is unlocked, the whale is funded but not yet
/// impersonated, and the wallet holds `wallet_balance`.
pub async fn node(wallet_balance: u128) -> InMemoryNode {
    let node = InMemoryNode::new(addr(TOKEN));
    node.unlock(&addr(WALLET)).await;
    node.set_balance(&addr(WHALE), TokenAmount::new(WHALE_BALANCE))
        .await;
    node.set_balance(&addr(WALLET), TokenAmount::new(wallet_balance))
        .await;
    node
}

#[derive(Clone, Default)]
pub struct RecordingProgress {
    states: Arc<Mutex<Vec<EngineState>>>,
}

impl RecordingProgress {
    pub fn states(&self) -> Vec<EngineState> {
        self.states.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn transition(&self, state: EngineState) {
        self.states.lock().unwrap().push(state);
    }
}

pub fn engine(node: &InMemoryNode, progress: &RecordingProgress) -> FundingEngine {
    FundingEngine::new(Box::new(node.clone()), Box::new(node.clone()))
        .with_progress(Box::new(progress.clone()))
}
