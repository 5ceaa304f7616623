use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;
use tokio::sync::RwLock;
use tracing::warn;

use crate::database::utils::get_timestamp;

/// Tracks failed logins per source IP and answers "is this address allowed
/// to attempt a login right now?".
///
/// Two layers:
///   - statically blocked networks from the `[security]` config section
///   - a sliding-window failure ledger: once an IP accumulates
///     `max_failures` failed logins inside `window_secs`, further attempts
///     are denied until enough old failures age out of the window
///
/// Thresholds are fixed at startup; a SIGHUP reload does not rethread them.
#[derive(Clone, Debug)]
pub struct LoginGuard {
    inner: Arc<LoginGuardInner>,
}

#[derive(Debug)]
struct LoginGuardInner {
    /// Unix timestamps of failed attempts, newest last
    failures: RwLock<HashMap<IpAddr, Vec<i64>>>,
    blocked_networks: RwLock<Vec<IpNet>>,
    max_failures: usize,
    window_secs: i64,
}

impl LoginGuard {
    pub fn new(max_failures: usize, window_secs: i64) -> Self {
        Self {
            inner: Arc::new(LoginGuardInner {
                failures: RwLock::new(HashMap::new()),
                blocked_networks: RwLock::new(Vec::new()),
                max_failures,
                window_secs,
            }),
        }
    }

    /// Add a statically blocked network
    pub async fn block_network(&self, net: IpNet) {
        let mut blocked = self.inner.blocked_networks.write().await;
        blocked.push(net);
    }

    /// Check whether this address is currently denied login attempts
    pub async fn is_blocked(&self, ip: IpAddr) -> bool {
        let blocked = self.inner.blocked_networks.read().await;
        if blocked.iter().any(|net| net.contains(&ip)) {
            return true;
        }
        drop(blocked);

        self.is_rate_blocked_at(ip, get_timestamp()).await
    }

    /// Record a failed login attempt for this address
    pub async fn record_failure(&self, ip: IpAddr) {
        self.record_failure_at(ip, get_timestamp()).await;
    }

    /// Forget all failures for this address (called on successful login)
    pub async fn clear_failures(&self, ip: IpAddr) {
        let mut failures = self.inner.failures.write().await;
        failures.remove(&ip);
    }

    /// Drop every failure that has aged out of the window, and every
    /// address left with none.  Lazy pruning in `record_failure` only
    /// touches addresses that keep failing; this sweeps the rest.
    pub async fn prune(&self) {
        let cutoff = get_timestamp() - self.inner.window_secs;
        let mut failures = self.inner.failures.write().await;
        failures.retain(|_, timestamps| {
            timestamps.retain(|&t| t >= cutoff);
            !timestamps.is_empty()
        });
    }

    /// Get current guard statistics
    pub async fn stats(&self) -> LoginGuardStats {
        let now = get_timestamp();
        let cutoff = now - self.inner.window_secs;

        let failures = self.inner.failures.read().await;
        let blocked_now = failures
            .values()
            .filter(|ts| ts.iter().filter(|&&t| t >= cutoff).count() >= self.inner.max_failures)
            .count();

        LoginGuardStats {
            tracked_ips: failures.len(),
            blocked_now,
            blocked_networks: self.inner.blocked_networks.read().await.len(),
        }
    }

    async fn is_rate_blocked_at(&self, ip: IpAddr, now: i64) -> bool {
        let cutoff = now - self.inner.window_secs;
        let failures = self.inner.failures.read().await;

        match failures.get(&ip) {
            Some(timestamps) => {
                timestamps.iter().filter(|&&t| t >= cutoff).count() >= self.inner.max_failures
            }
            None => false,
        }
    }

    async fn record_failure_at(&self, ip: IpAddr, now: i64) {
        let cutoff = now - self.inner.window_secs;
        let mut failures = self.inner.failures.write().await;

        let timestamps = failures.entry(ip).or_default();
        timestamps.retain(|&t| t >= cutoff);
        timestamps.push(now);

        if timestamps.len() >= self.inner.max_failures {
            warn!(
                "IP {} reached {} failed logins inside {}s window; denying further attempts",
                ip,
                timestamps.len(),
                self.inner.window_secs
            );
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginGuardStats {
    pub tracked_ips: usize,
    pub blocked_now: usize,
    pub blocked_networks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn failures_below_threshold_do_not_block() {
        let guard = LoginGuard::new(5, 3600);
        let addr = ip("203.0.113.7");

        for _ in 0..4 {
            guard.record_failure(addr).await;
        }
        assert!(!guard.is_blocked(addr).await);

        guard.record_failure(addr).await;
        assert!(guard.is_blocked(addr).await);
    }

    #[tokio::test]
    async fn success_clears_the_ledger() {
        let guard = LoginGuard::new(3, 3600);
        let addr = ip("203.0.113.8");

        for _ in 0..3 {
            guard.record_failure(addr).await;
        }
        assert!(guard.is_blocked(addr).await);

        guard.clear_failures(addr).await;
        assert!(!guard.is_blocked(addr).await);
    }

    #[tokio::test]
    async fn old_failures_age_out_of_the_window() {
        let guard = LoginGuard::new(3, 3600);
        let addr = ip("203.0.113.9");
        let now = get_timestamp();

        // Three failures an hour and a bit ago, outside the window.
        for _ in 0..3 {
            guard.record_failure_at(addr, now - 4000).await;
        }
        assert!(!guard.is_rate_blocked_at(addr, now).await);

        // Fresh failures still count.
        for _ in 0..3 {
            guard.record_failure_at(addr, now).await;
        }
        assert!(guard.is_rate_blocked_at(addr, now).await);
    }

    #[tokio::test]
    async fn prune_drops_aged_out_addresses() {
        let guard = LoginGuard::new(3, 3600);
        let now = get_timestamp();

        guard.record_failure_at(ip("203.0.113.10"), now - 4000).await;
        guard.record_failure_at(ip("203.0.113.11"), now).await;
        assert_eq!(guard.stats().await.tracked_ips, 2);

        guard.prune().await;

        let stats = guard.stats().await;
        assert_eq!(stats.tracked_ips, 1);
    }

    #[tokio::test]
    async fn blocked_networks_deny_immediately() {
        let guard = LoginGuard::new(5, 3600);
        guard.block_network("10.0.0.0/8".parse().unwrap()).await;

        assert!(guard.is_blocked(ip("10.1.2.3")).await);
        assert!(!guard.is_blocked(ip("192.0.2.1")).await);
    }

    #[tokio::test]
    async fn failures_are_tracked_per_ip() {
        let guard = LoginGuard::new(2, 3600);

        guard.record_failure(ip("198.51.100.1")).await;
        guard.record_failure(ip("198.51.100.1")).await;
        guard.record_failure(ip("198.51.100.2")).await;

        assert!(guard.is_blocked(ip("198.51.100.1")).await);
        assert!(!guard.is_blocked(ip("198.51.100.2")).await);

        let stats = guard.stats().await;
        assert_eq!(stats.tracked_ips, 2);
        assert_eq!(stats.blocked_now, 1);
    }
}
