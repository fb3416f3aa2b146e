use super::retry::with_retry;
use super::steps::FundingSteps;
use crate::domain::outcome::StepOutcome;
use crate::error::Result;
use std::cmp::Ordering;
use tracing::{info, warn};

impl FundingSteps<'_> {
    /// Moves the funding wallet's balance to exactly the target.
    ///
    /// A deficit is topped up from the whale; a surplus is sent back to the
    /// whale under its own retry budget and the balance is re-read before
    /// success is reported. At the target this performs no transfer.
    pub async fn reconcile(&self) -> Result<StepOutcome> {
        let wallet = &self.accounts.funding_wallet;
        let whale = &self.accounts.whale;
        let target = self.target.balance_target;
        let balance = self.client.balance_of(wallet).await?;

        match balance.cmp(&target) {
            Ordering::Equal => {
                info!(%balance, "balance already at target");
                Ok(StepOutcome::Success)
            }
            Ordering::Less => {
                let deficit = target.checked_sub(balance).unwrap_or_default();
                info!(%balance, %target, amount = %deficit, "topping up from whale");
                let spec = self.client.transfer_command(whale, wallet, deficit);
                self.write(&spec).await
            }
            Ordering::Greater => {
                let surplus = balance.checked_sub(target).unwrap_or_default();
                warn!(%balance, %target, amount = %surplus, "wallet over-funded, clawing back surplus");
                let spec = self.client.transfer_command(wallet, whale, surplus);
                with_retry("claw-back", self.retry.max_retries, || self.write(&spec)).await?;

                let after = self.client.balance_of(wallet).await?;
                if after == target {
                    Ok(StepOutcome::Success)
                } else {
                    Ok(StepOutcome::Failure(format!(
                        "balance is {} after claw-back, expected {}",
                        after, target
                    )))
                }
            }
        }
    }
}
