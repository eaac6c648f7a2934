use model::execution::result::{ExecutionResult, FailureKind};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    statements_ok: AtomicU64,
    statements_failed: AtomicU64,
    connection_failures: AtomicU64,
    phases_completed: AtomicU64,
    phases_failed: AtomicU64,
}

/// Run-wide counters, cheap to clone and safe to update from any worker.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub statements_ok: u64,
    pub statements_failed: u64,
    pub connection_failures: u64,
    pub phases_completed: u64,
    pub phases_failed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn record_result(&self, result: &ExecutionResult) {
        if result.is_ok() {
            self.inner.statements_ok.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.inner.statements_failed.fetch_add(1, Ordering::Relaxed);
        if result
            .error()
            .is_some_and(|err| err.kind == FailureKind::Connection)
        {
            self.inner
                .connection_failures
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_phase(&self, failed: bool) {
        let counter = if failed {
            &self.inner.phases_failed
        } else {
            &self.inner.phases_completed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            statements_ok: self.inner.statements_ok.load(Ordering::Relaxed),
            statements_failed: self.inner.statements_failed.load(Ordering::Relaxed),
            connection_failures: self.inner.connection_failures.load(Ordering::Relaxed),
            phases_completed: self.inner.phases_completed.load(Ordering::Relaxed),
            phases_failed: self.inner.phases_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
