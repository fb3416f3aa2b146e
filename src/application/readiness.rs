use crate::domain::ports::LivenessProbe;
use std::time::Duration;
use tracing::{debug, info};

/// Polls `probe` until it reports a positive block height.
///
/// Returns `false` once `max_attempts` probes have failed. There is no
/// sleep after the final attempt.
pub async fn wait_until_ready(
    probe: &dyn LivenessProbe,
    max_attempts: u32,
    poll_interval: Duration,
) -> bool {
    for attempt in 1..=max_attempts {
        match probe.block_height().await {
            Ok(height) if height > 0 => {
                info!(endpoint = probe.endpoint(), height, attempt, "node is ready");
                return true;
            }
            Ok(height) => {
                debug!(endpoint = probe.endpoint(), height, attempt, "node has no blocks yet");
            }
            Err(e) => {
                debug!(endpoint = probe.endpoint(), attempt, error = %e, "liveness probe failed");
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(poll_interval).await;
        }
    }
    false
}
