//! Failed-login tracking and temporary IP blocks.
//!
//! [`LockoutTable`] is the pure state machine behind the login-attempt store.
//! Per IP it moves `Open -> Blocked -> Open`: failures are counted per
//! `(ip, email)` pair inside a sliding attempt window, and once a pair reaches
//! `max_attempts` the whole IP is blocked for `block_duration`. Every method
//! takes `now` explicitly so the transitions are deterministic under test.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use chrono::Duration;

use crate::types::Timestamp;
use crate::validation::normalize_email;

/// Default number of failures before an IP is blocked.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default window (minutes) in which failures accumulate.
pub const DEFAULT_ATTEMPT_WINDOW_MINS: i64 = 15;

/// Default block duration (minutes).
pub const DEFAULT_BLOCK_DURATION_MINS: i64 = 15;

/// Demo accounts that are never counted nor blocked.
pub const DEFAULT_EXEMPT_EMAILS: &[&str] =
    &["user@demo.com", "business@demo.com", "admin@demo.com"];

/// Thresholds and allow-list for the lockout state machine.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub attempt_window: Duration,
    pub block_duration: Duration,
    pub exempt_emails: HashSet<String>,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_window: Duration::minutes(DEFAULT_ATTEMPT_WINDOW_MINS),
            block_duration: Duration::minutes(DEFAULT_BLOCK_DURATION_MINS),
            exempt_emails: DEFAULT_EXEMPT_EMAILS
                .iter()
                .map(|e| normalize_email(e))
                .collect(),
        }
    }
}

impl LockoutPolicy {
    pub fn is_exempt(&self, email: &str) -> bool {
        self.exempt_emails.contains(&normalize_email(email))
    }
}

/// Failure counter for one `(ip, email)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptEntry {
    pub failed_count: u32,
    pub first_attempt: Timestamp,
    pub last_attempt: Timestamp,
}

/// Result of checking whether a login may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Open,
    Blocked { remaining: Duration },
}

impl BlockStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, BlockStatus::Blocked { .. })
    }
}

/// What recording a failure did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The email is on the allow-list; nothing was recorded.
    Exempt,
    /// The failure was counted and the IP stays open.
    Counted { failed_count: u32, remaining_attempts: u32 },
    /// This failure reached the threshold and blocked the IP.
    BlockTriggered { block_duration: Duration },
}

/// A currently blocked IP, as reported to moderators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedIp {
    pub ip: IpAddr,
    pub blocked_at: Timestamp,
    pub remaining: Duration,
}

/// Entries removed by a [`LockoutTable::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub attempts_removed: usize,
    pub blocks_removed: usize,
}

#[derive(Debug)]
pub struct LockoutTable {
    policy: LockoutPolicy,
    attempts: HashMap<(IpAddr, String), AttemptEntry>,
    blocks: HashMap<IpAddr, Timestamp>,
}

impl LockoutTable {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            attempts: HashMap::new(),
            blocks: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Whether `ip` may attempt a login for `email` at `now`.
    ///
    /// Expired blocks are removed on the way (Blocked -> Open).
    pub fn check(&mut self, ip: IpAddr, email: &str, now: Timestamp) -> BlockStatus {
        if self.policy.is_exempt(email) {
            return BlockStatus::Open;
        }
        let Some(&blocked_at) = self.blocks.get(&ip) else {
            return BlockStatus::Open;
        };
        let elapsed = now - blocked_at;
        if elapsed >= self.policy.block_duration {
            self.blocks.remove(&ip);
            return BlockStatus::Open;
        }
        BlockStatus::Blocked {
            remaining: self.policy.block_duration - elapsed,
        }
    }

    /// Count a failed login for `(ip, email)`.
    pub fn record_failure(&mut self, ip: IpAddr, email: &str, now: Timestamp) -> FailureOutcome {
        if self.policy.is_exempt(email) {
            return FailureOutcome::Exempt;
        }

        let key = (ip, normalize_email(email));
        let window = self.policy.attempt_window;
        let entry = self.attempts.entry(key.clone()).or_insert(AttemptEntry {
            failed_count: 0,
            first_attempt: now,
            last_attempt: now,
        });

        if now - entry.first_attempt > window {
            entry.failed_count = 0;
            entry.first_attempt = now;
        }
        entry.failed_count += 1;
        entry.last_attempt = now;

        let failed_count = entry.failed_count;
        if failed_count >= self.policy.max_attempts {
            self.attempts.remove(&key);
            self.blocks.insert(ip, now);
            return FailureOutcome::BlockTriggered {
                block_duration: self.policy.block_duration,
            };
        }

        FailureOutcome::Counted {
            failed_count,
            remaining_attempts: self.policy.max_attempts - failed_count,
        }
    }

    /// Clear the counter for `(ip, email)` after a successful login.
    pub fn record_success(&mut self, ip: IpAddr, email: &str) {
        self.attempts.remove(&(ip, normalize_email(email)));
    }

    /// Current failure count for `(ip, email)` (0 when untracked).
    pub fn failed_attempts(&self, ip: IpAddr, email: &str) -> u32 {
        self.attempts
            .get(&(ip, normalize_email(email)))
            .map_or(0, |e| e.failed_count)
    }

    /// Drop stale counters and expired blocks.
    pub fn sweep(&mut self, now: Timestamp) -> SweepStats {
        let window = self.policy.attempt_window;
        let block_duration = self.policy.block_duration;

        let attempts_before = self.attempts.len();
        self.attempts.retain(|_, e| now - e.last_attempt <= window);

        let blocks_before = self.blocks.len();
        self.blocks.retain(|_, at| now - *at < block_duration);

        SweepStats {
            attempts_removed: attempts_before - self.attempts.len(),
            blocks_removed: blocks_before - self.blocks.len(),
        }
    }

    /// IPs blocked at `now`, most recently blocked first.
    pub fn blocked_ips(&self, now: Timestamp) -> Vec<BlockedIp> {
        let mut out: Vec<BlockedIp> = self
            .blocks
            .iter()
            .filter_map(|(ip, at)| {
                let elapsed = now - *at;
                (elapsed < self.policy.block_duration).then(|| BlockedIp {
                    ip: *ip,
                    blocked_at: *at,
                    remaining: self.policy.block_duration - elapsed,
                })
            })
            .collect();
        out.sort_by(|a, b| b.blocked_at.cmp(&a.blocked_at));
        out
    }

    /// Lift a block manually. Returns `true` if the IP was blocked.
    pub fn unblock(&mut self, ip: IpAddr) -> bool {
        self.attempts.retain(|(entry_ip, _), _| *entry_ip != ip);
        self.blocks.remove(&ip).is_some()
    }

    /// Block `ip` as of `at`, bypassing the counter.
    pub fn block(&mut self, ip: IpAddr, at: Timestamp) {
        self.blocks.insert(ip, at);
    }
}
