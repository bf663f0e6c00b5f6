//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for history reads.
//!
//! # Metrics
//!
//! - `lino_history_reads_total` - History queries served
//! - `lino_history_buckets_fetched_total` - Buckets fetched from the source
//! - `lino_history_fetch_failures_total` - Bucket fetches that failed
//! - `lino_history_records_returned` - Histogram of records per query

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// History queries served
    pub reads_total: IntCounter,

    /// Buckets fetched
    pub buckets_fetched: IntCounter,

    /// Failed bucket fetches
    pub fetch_failures: IntCounter,

    /// Records returned per query
    pub records_returned: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let reads_total = IntCounter::new("lino_history_reads_total", "History queries served")?;
        registry.register(Box::new(reads_total.clone()))?;

        let buckets_fetched = IntCounter::new(
            "lino_history_buckets_fetched_total",
            "Buckets fetched from the source",
        )?;
        registry.register(Box::new(buckets_fetched.clone()))?;

        let fetch_failures = IntCounter::new(
            "lino_history_fetch_failures_total",
            "Bucket fetches that failed",
        )?;
        registry.register(Box::new(fetch_failures.clone()))?;

        let records_returned = Histogram::with_opts(
            HistogramOpts::new(
                "lino_history_records_returned",
                "Histogram of records per query",
            )
            .buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]),
        )?;
        registry.register(Box::new(records_returned.clone()))?;

        Ok(Self {
            reads_total,
            buckets_fetched,
            fetch_failures,
            records_returned,
            registry,
        })
    }

    /// Record a history query
    pub fn record_read(&self) {
        self.reads_total.inc();
    }

    /// Record a successful bucket fetch
    pub fn record_bucket_fetched(&self) {
        self.buckets_fetched.inc();
    }

    /// Record a failed bucket fetch
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.inc();
    }

    /// Record the size of a query result
    pub fn record_records_returned(&self, count: usize) {
        self.records_returned.observe(count as f64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
