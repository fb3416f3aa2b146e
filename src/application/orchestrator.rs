use super::node::NodeClient;
use super::readiness::wait_until_ready;
use super::retry::with_retry;
use super::steps::FundingSteps;
use crate::config::FundingConfig;
use crate::domain::outcome::{ConvergenceReport, EngineState, StepKind};
use crate::domain::ports::{CommandRunnerBox, LivenessProbeBox, ProgressSink, Silent};
use crate::domain::target::LedgerSnapshot;
use crate::error::{FundingError, Result};
use tracing::{error, info};

/// Drives a node toward a `FundingConfig`'s target state.
///
/// `FundingEngine` owns the ports it talks to the node through; the
/// configuration is passed to each run and never stored, so one engine holds
/// no state between runs.
pub struct FundingEngine {
    runner: CommandRunnerBox,
    probe: LivenessProbeBox,
    progress: Box<dyn ProgressSink>,
}

impl FundingEngine {
    /// Creates a new `FundingEngine` with no progress reporting.
    ///
    /// # Arguments
    ///
    /// * `runner` - Executes node commands.
    /// * `probe` - Answers the liveness query used to gate the run.
    pub fn new(runner: CommandRunnerBox, probe: LivenessProbeBox) -> Self {
        Self {
            runner,
            probe,
            progress: Box::new(Silent),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the whole funding sequence and validates the result.
    ///
    /// Any error returned here is fatal; the engine ends in `Failed`.
    pub async fn converge(&self, config: &FundingConfig) -> Result<ConvergenceReport> {
        self.progress.transition(EngineState::Idle);
        match self.drive(config).await {
            Ok(report) => {
                self.progress.transition(EngineState::Converged);
                info!(
                    balance = %report.balance,
                    allowance = %report.allowance,
                    "funding converged"
                );
                Ok(report)
            }
            Err(e) => {
                self.progress.transition(EngineState::Failed);
                error!(error = %e, "funding failed");
                Err(e)
            }
        }
    }

    /// Reads the live balance and allowance without changing anything.
    pub async fn snapshot(&self, config: &FundingConfig) -> Result<LedgerSnapshot> {
        let client = NodeClient::new(self.runner.as_ref(), &config.node);
        let accounts = &config.accounts;
        let allowance = client
            .allowance(&accounts.funding_wallet, &accounts.spender)
            .await?;
        let balance = client.balance_of(&accounts.funding_wallet).await?;
        Ok(LedgerSnapshot::observe(&config.target, allowance, balance))
    }

    async fn drive(&self, config: &FundingConfig) -> Result<ConvergenceReport> {
        self.progress.transition(EngineState::Probing);
        let readiness = &config.readiness;
        if !wait_until_ready(
            self.probe.as_ref(),
            readiness.max_attempts,
            readiness.poll_interval,
        )
        .await
        {
            return Err(FundingError::NodeNotReady {
                url: self.probe.endpoint().to_string(),
                attempts: readiness.max_attempts,
            });
        }

        let steps = FundingSteps::new(
            NodeClient::new(self.runner.as_ref(), &config.node),
            &config.accounts,
            &config.target,
            &config.retry,
        );

        // Each step's budget is spent once; exhaustion aborts before later steps.
        for kind in StepKind::ORDER {
            self.progress.transition(EngineState::Running(kind));
            info!(step = %kind, "running step");
            with_retry(kind.name(), config.retry.max_retries, || steps.run(kind)).await?;
        }

        self.progress.transition(EngineState::Validating);
        self.validate(config, steps.client()).await
    }

    /// Re-reads both values from the node; step results are not trusted
    /// because a zero exit says nothing about on-chain state.
    async fn validate(
        &self,
        config: &FundingConfig,
        client: &NodeClient<'_>,
    ) -> Result<ConvergenceReport> {
        let accounts = &config.accounts;
        let target = &config.target;
        let allowance = client
            .allowance(&accounts.funding_wallet, &accounts.spender)
            .await?;
        let balance = client.balance_of(&accounts.funding_wallet).await?;

        if allowance < target.allowance_floor {
            return Err(FundingError::AllowanceBelowFloor {
                allowance,
                floor: target.allowance_floor,
                balance,
            });
        }
        if balance != target.balance_target {
            return Err(FundingError::BalanceMismatch {
                balance,
                target: target.balance_target,
                allowance,
            });
        }

        Ok(ConvergenceReport { allowance, balance })
    }
}
