//! Storage seam for the account-lockout tracker.
//!
//! Handlers only see the [`LoginAttemptStore`] trait. The in-process
//! implementation wraps the pure `LockoutTable` from `futurist_core` behind a
//! mutex; its state is lost on restart and is not shared between server
//! instances.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::Utc;
use futurist_core::lockout::{
    BlockStatus, BlockedIp, FailureOutcome, LockoutPolicy, LockoutTable, SweepStats,
};
use tokio::sync::Mutex;

/// Tracks failed logins per `(ip, email)` and blocks offending IPs.
#[async_trait]
pub trait LoginAttemptStore: Send + Sync + 'static {
    /// Whether `ip` may attempt a login for `email` right now.
    async fn check(&self, ip: IpAddr, email: &str) -> BlockStatus;

    /// Count a failed login, blocking the IP once the threshold is reached.
    async fn record_failure(&self, ip: IpAddr, email: &str) -> FailureOutcome;

    /// Clear the counter after a successful login.
    async fn record_success(&self, ip: IpAddr, email: &str);

    /// Current failure count for a pair.
    async fn failed_attempts(&self, ip: IpAddr, email: &str) -> u32;

    /// Drop expired counters and blocks.
    async fn sweep(&self) -> SweepStats;

    /// IPs currently blocked.
    async fn blocked_ips(&self) -> Vec<BlockedIp>;

    /// Lift a block. Returns `true` if the IP was blocked.
    async fn unblock(&self, ip: IpAddr) -> bool;

    /// Block an IP immediately.
    async fn block(&self, ip: IpAddr);
}

/// Process-local [`LoginAttemptStore`].
#[derive(Debug)]
pub struct InMemoryAttemptStore {
    table: Mutex<LockoutTable>,
}

impl InMemoryAttemptStore {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            table: Mutex::new(LockoutTable::new(policy)),
        }
    }
}

#[async_trait]
impl LoginAttemptStore for InMemoryAttemptStore {
    async fn check(&self, ip: IpAddr, email: &str) -> BlockStatus {
        self.table.lock().await.check(ip, email, Utc::now())
    }

    async fn record_failure(&self, ip: IpAddr, email: &str) -> FailureOutcome {
        self.table.lock().await.record_failure(ip, email, Utc::now())
    }

    async fn record_success(&self, ip: IpAddr, email: &str) {
        self.table.lock().await.record_success(ip, email);
    }

    async fn failed_attempts(&self, ip: IpAddr, email: &str) -> u32 {
        self.table.lock().await.failed_attempts(ip, email)
    }

    async fn sweep(&self) -> SweepStats {
        self.table.lock().await.sweep(Utc::now())
    }

    async fn blocked_ips(&self) -> Vec<BlockedIp> {
        self.table.lock().await.blocked_ips(Utc::now())
    }

    async fn unblock(&self, ip: IpAddr) -> bool {
        self.table.lock().await.unblock(ip)
    }

    async fn block(&self, ip: IpAddr) {
        self.table.lock().await.block(ip, Utc::now());
    }
}
