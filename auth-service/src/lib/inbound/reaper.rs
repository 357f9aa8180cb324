use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::access::ports::AuthServicePort;

/// Start the periodic expired-token reaper.
///
/// Each tick deletes tokens whose window ended more than `grace` ago. The
/// lag keeps tokens issued by a process with a slightly fast clock alive
/// until every reader agrees they have expired.
///
/// # Arguments
/// * `service` - Service whose store is reaped
/// * `interval` - Time between passes
/// * `grace` - How far the cutoff trails the current time
pub fn spawn_reaper<S>(
    service: Arc<S>,
    interval: Duration,
    grace: chrono::Duration,
) -> JoinHandle<()>
where
    S: AuthServicePort,
{
    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            grace_secs = grace.num_seconds(),
            "Token reaper started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            reap_once(service.as_ref(), grace).await;
        }
    })
}

/// Run a single reap pass; failures are logged and left for the next tick.
///
/// # Returns
/// Number of tokens deleted, or None if the pass failed
pub async fn reap_once<S>(service: &S, grace: chrono::Duration) -> Option<u64>
where
    S: AuthServicePort + ?Sized,
{
    let cutoff = Utc::now() - grace;

    match service.reap_expired(cutoff).await {
        Ok(deleted) => {
            tracing::debug!(deleted, cutoff = %cutoff, "Reaped expired tokens");
            Some(deleted)
        }
        Err(e) => {
            tracing::error!(error = %e, "Token reap failed");
            None
        }
    }
}
