// Engine counters — running tallies of rendered decisions.
//
// Lock-free so the hot path never contends; relaxed ordering is enough
// for operator-facing counts.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::models::Action;

#[derive(Default)]
pub struct EngineStats {
    evaluations: AtomicU64,
    allowed: AtomicU64,
    warned: AtomicU64,
    reviewed: AtomicU64,
    blocked: AtomicU64,
    /// Evaluations that hit the fail-open path
    failures: AtomicU64,
}

/// Point-in-time copy of the counters, for display or serialization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    pub evaluations: u64,
    pub allowed: u64,
    pub warned: u64,
    pub reviewed: u64,
    pub blocked: u64,
    pub failures: u64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, action: Action) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let counter = match action {
            Action::Allow => &self.allowed,
            Action::Warn => &self.warned,
            Action::Review => &self.reviewed,
            Action::Block => &self.blocked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            warned: self.warned.load(Ordering::Relaxed),
            reviewed: self.reviewed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_action() {
        let stats = EngineStats::new();
        stats.record(Action::Allow);
        stats.record(Action::Allow);
        stats.record(Action::Block);
        let snap = stats.snapshot();
        assert_eq!(snap.evaluations, 3);
        assert_eq!(snap.allowed, 2);
        assert_eq!(snap.blocked, 1);
        assert_eq!(snap.failures, 0);
    }
}
