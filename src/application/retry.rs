use crate::domain::outcome::StepOutcome;
use crate::error::{FundingError, Result};
use std::future::Future;
use tracing::{debug, error, warn};

/// Runs `attempt` until it reports success, at most `max_retries` times.
///
/// An `Err` from `attempt` counts as a thrown attempt and is retried, unless
/// the error is already fatal, in which case it is returned untouched.
/// Exhausting the budget yields `FundingError::RetryExhausted`.
pub async fn with_retry<F, Fut>(step: &str, max_retries: u32, mut attempt: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<StepOutcome>>,
{
    for n in 1..=max_retries {
        let outcome = match attempt().await {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => StepOutcome::Throw(e.to_string()),
        };

        match outcome {
            StepOutcome::Success => {
                debug!(step, attempt = n, "step succeeded");
                return Ok(());
            }
            StepOutcome::Failure(reason) => {
                warn!(step, attempt = n, max_retries, %reason, "step failed");
            }
            StepOutcome::Throw(reason) => {
                error!(step, attempt = n, max_retries, %reason, "step raised an error");
            }
        }
    }

    Err(FundingError::RetryExhausted {
        step: step.to_string(),
        attempts: max_retries,
    })
}
