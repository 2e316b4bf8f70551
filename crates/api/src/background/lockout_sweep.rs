//! Periodic cleanup of the login-attempt store.
//!
//! Expired blocks are also lifted lazily on the next login check; the sweep
//! bounds memory by dropping counters and blocks nobody revisits.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::security::LoginAttemptStore;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(
    store: Arc<dyn LoginAttemptStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Login attempt sweep started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Login attempt sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let stats = store.sweep().await;
                if stats.attempts_removed > 0 || stats.blocks_removed > 0 {
                    tracing::info!(
                        attempts_removed = stats.attempts_removed,
                        blocks_removed = stats.blocks_removed,
                        "Login attempt sweep: purged stale entries"
                    );
                } else {
                    tracing::debug!("Login attempt sweep: nothing to purge");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futurist_core::lockout::LockoutPolicy;

    use super::*;
    use crate::security::InMemoryAttemptStore;

    #[tokio::test]
    async fn stops_when_cancelled() {
        let store: Arc<dyn LoginAttemptStore> =
            Arc::new(InMemoryAttemptStore::new(LockoutPolicy::default()));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(store, Duration::from_millis(10), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep should stop promptly")
            .expect("sweep task should not panic");
    }
}
