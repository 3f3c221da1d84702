//! Load run metrics.

use serde::Serialize;
use std::collections::VecDeque;

/// Metrics collected over one random-transfer load run.
#[derive(Debug, Clone)]
pub struct TransferMetrics {
    /// Total transfers attempted.
    pub total_transfers: u64,
    /// Transfers that committed.
    pub committed_transfers: u64,
    /// Transfers that surfaced an error.
    pub failed_transfers: u64,
    /// Latency samples (ms).
    latency_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    max_samples: usize,
}

/// Flattened summary for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_transfers: u64,
    pub committed_transfers: u64,
    pub failed_transfers: u64,
    pub success_rate: f64,
    pub average_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p99_latency_ms: u64,
}

impl TransferMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            total_transfers: 0,
            committed_transfers: 0,
            failed_transfers: 0,
            latency_samples: VecDeque::with_capacity(10000),
            max_samples: 10000,
        }
    }

    /// Record a committed transfer.
    pub fn record_success(&mut self, latency_ms: u64) {
        self.total_transfers += 1;
        self.committed_transfers += 1;

        if self.latency_samples.len() >= self.max_samples {
            self.latency_samples.pop_front();
        }
        self.latency_samples.push_back(latency_ms);
    }

    /// Record a failed transfer.
    pub fn record_failure(&mut self) {
        self.total_transfers += 1;
        self.failed_transfers += 1;
    }

    /// Get average latency in ms.
    pub fn average_latency_ms(&self) -> u64 {
        if self.latency_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.latency_samples.iter().sum();
        sum / self.latency_samples.len() as u64
    }

    /// Get percentile latency.
    fn percentile_latency(&self, percentile: usize) -> u64 {
        if self.latency_samples.is_empty() {
            return 0;
        }

        let mut sorted: Vec<_> = self.latency_samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        sorted[idx]
    }

    /// Get success rate.
    pub fn success_rate(&self) -> f64 {
        if self.total_transfers == 0 {
            return 0.0;
        }

        self.committed_transfers as f64 / self.total_transfers as f64
    }

    /// Flatten into a reportable summary.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_transfers: self.total_transfers,
            committed_transfers: self.committed_transfers,
            failed_transfers: self.failed_transfers,
            success_rate: self.success_rate(),
            average_latency_ms: self.average_latency_ms(),
            p50_latency_ms: self.percentile_latency(50),
            p99_latency_ms: self.percentile_latency(99),
        }
    }
}

impl Default for TransferMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let mut metrics = TransferMetrics::new();

        metrics.record_success(100);
        metrics.record_success(200);
        metrics.record_success(150);
        metrics.record_failure();

        assert_eq!(metrics.total_transfers, 4);
        assert_eq!(metrics.committed_transfers, 3);
        assert_eq!(metrics.failed_transfers, 1);
        assert_eq!(metrics.average_latency_ms(), 150);
        assert_eq!(metrics.success_rate(), 0.75);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = TransferMetrics::new();
        let summary = metrics.summary();

        assert_eq!(summary.total_transfers, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.p99_latency_ms, 0);
    }
}
