use super::node::NodeClient;
use crate::config::RetryPolicy;
use crate::domain::address::Accounts;
use crate::domain::outcome::{StepKind, StepOutcome};
use crate::domain::ports::CommandSpec;
use crate::domain::target::TargetState;
use crate::error::Result;
use tracing::info;

/// The three funding steps, each a single retryable attempt.
pub struct FundingSteps<'a> {
    pub(crate) client: NodeClient<'a>,
    pub(crate) accounts: &'a Accounts,
    pub(crate) target: &'a TargetState,
    pub(crate) retry: &'a RetryPolicy,
}

impl<'a> FundingSteps<'a> {
    pub fn new(
        client: NodeClient<'a>,
        accounts: &'a Accounts,
        target: &'a TargetState,
        retry: &'a RetryPolicy,
    ) -> Self {
        Self {
            client,
            accounts,
            target,
            retry,
        }
    }

    pub fn client(&self) -> &NodeClient<'a> {
        &self.client
    }

    pub async fn run(&self, kind: StepKind) -> Result<StepOutcome> {
        match kind {
            StepKind::Impersonate => self.impersonate().await,
            StepKind::ApproveAllowance => self.approve_allowance().await,
            StepKind::TransferBalance => self.transfer_balance().await,
        }
    }

    /// Lets the node accept sends from the whale without its key.
    pub async fn impersonate(&self) -> Result<StepOutcome> {
        let spec = self.client.impersonate_command(&self.accounts.whale);
        self.write(&spec).await
    }

    /// Grants the spender at least the allowance floor.
    ///
    /// Skipped when the live allowance already meets the floor, since
    /// re-approving with the floor would lower a larger allowance.
    pub async fn approve_allowance(&self) -> Result<StepOutcome> {
        let allowance = self
            .client
            .allowance(&self.accounts.funding_wallet, &self.accounts.spender)
            .await?;
        if allowance >= self.target.allowance_floor {
            info!(%allowance, floor = %self.target.allowance_floor, "allowance already meets floor");
            return Ok(StepOutcome::Success);
        }

        let spec = self.client.approve_command(
            &self.accounts.funding_wallet,
            &self.accounts.spender,
            self.target.allowance_floor,
        );
        self.write(&spec).await
    }

    pub async fn transfer_balance(&self) -> Result<StepOutcome> {
        self.reconcile().await
    }

    /// Runs a state-mutating command. A zero exit is followed by the settle
    /// delay before reporting success.
    pub(crate) async fn write(&self, spec: &CommandSpec) -> Result<StepOutcome> {
        let output = self.client.execute(spec).await?;
        if !output.is_success() {
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                format!("exit status {}: {}", output.status, stderr)
            };
            return Ok(StepOutcome::Failure(reason));
        }
        self.settle().await;
        Ok(StepOutcome::Success)
    }

    async fn settle(&self) {
        if !self.retry.settle_delay.is_zero() {
            tokio::time::sleep(self.retry.settle_delay).await;
        }
    }
}
