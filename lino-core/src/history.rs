//! Balance history pagination
//!
//! An account's history is stored in fixed-size buckets of
//! [`BUCKET_CAPACITY`] records. Bucket `k` holds global indices
//! `[100k, 100k + 99]`; only the highest bucket may be partially filled.
//!
//! [`LedgerHistoryReader`] merges buckets into a single most-recent-first
//! stream. Every call is a self-contained backward walk with a
//! `(slot, index)` cursor that starts at the newest requested record:
//!
//! ```text
//!  slot 2 (partial)      slot 1               slot 0
//! [200 .. 249] <-start  [100 .. 199]         [0 .. 99]
//!   249, 248, ... 200 -> 199, 198, ... 100 -> 99, ... 0
//! ```
//!
//! A failed bucket fetch aborts the whole call; no partial results are
//! returned.

use crate::config::HistoryConfig;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::types::{
    bucket_slot, index_in_bucket, AccountKey, BalanceHistoryBucket, BalanceHistoryDetail,
    BUCKET_CAPACITY,
};
use std::sync::Arc;

/// Read access to an account's ledger
pub trait LedgerSource {
    /// Total number of history records for the account
    fn num_of_tx(&self, account: &AccountKey) -> Result<i64>;

    /// Fetch one bucket by slot
    fn fetch_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket>;
}

impl<T: LedgerSource + ?Sized> LedgerSource for &T {
    fn num_of_tx(&self, account: &AccountKey) -> Result<i64> {
        (**self).num_of_tx(account)
    }

    fn fetch_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
        (**self).fetch_bucket(account, slot)
    }
}

impl<T: LedgerSource + ?Sized> LedgerSource for Arc<T> {
    fn num_of_tx(&self, account: &AccountKey) -> Result<i64> {
        (**self).num_of_tx(account)
    }

    fn fetch_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
        (**self).fetch_bucket(account, slot)
    }
}

/// Most-recent-first history reader
pub struct LedgerHistoryReader<S> {
    source: S,
    max_recent: i64,
    metrics: Option<Metrics>,
}

impl<S: LedgerSource> LedgerHistoryReader<S> {
    /// Create reader with default limits
    pub fn new(source: S) -> Self {
        Self::with_config(source, &HistoryConfig::default())
    }

    /// Create reader with explicit limits
    pub fn with_config(source: S, config: &HistoryConfig) -> Self {
        Self {
            source,
            max_recent: config.max_recent,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Total number of history records for the account
    pub fn num_of_tx(&self, account: &AccountKey) -> Result<i64> {
        self.source.num_of_tx(account)
    }

    /// Every record, newest first
    pub fn get_all(&self, account: &AccountKey) -> Result<Vec<BalanceHistoryDetail>> {
        let num_of_tx = self.source.num_of_tx(account)?;
        self.walk_back(account, num_of_tx - 1, None)
    }

    /// The `n` newest records, newest first.
    ///
    /// Returns fewer than `n` records when the account has fewer.
    pub fn get_recent(&self, account: &AccountKey, n: i64) -> Result<Vec<BalanceHistoryDetail>> {
        if n <= 0 || n > self.max_recent {
            return Err(Error::InvalidArgument(format!(
                "recent count {} outside [1, {}]",
                n, self.max_recent
            )));
        }

        let num_of_tx = self.source.num_of_tx(account)?;
        self.walk_back(account, num_of_tx - 1, Some(n))
    }

    /// Records at one-based positions `from..=to`, newest first.
    ///
    /// `to` is clamped to the record count; a `from` past the record count
    /// is rejected.
    pub fn get_range(
        &self,
        account: &AccountKey,
        from: i64,
        to: i64,
    ) -> Result<Vec<BalanceHistoryDetail>> {
        if from < 0 || to < 0 || from > to {
            return Err(Error::InvalidArgument(format!(
                "invalid range [{}, {}]",
                from, to
            )));
        }

        let num_of_tx = self.source.num_of_tx(account)?;
        if from > num_of_tx {
            return Err(Error::InvalidArgument(format!(
                "range start {} past record count {}",
                from, num_of_tx
            )));
        }
        let to = to.min(num_of_tx);

        self.walk_back(account, to - 1, Some(to - from + 1))
    }

    /// Walk backward from `start` (a zero-based global index) across buckets,
    /// collecting at most `limit` records.
    fn walk_back(
        &self,
        account: &AccountKey,
        start: i64,
        limit: Option<i64>,
    ) -> Result<Vec<BalanceHistoryDetail>> {
        if let Some(metrics) = &self.metrics {
            metrics.record_read();
        }

        let wanted = match limit {
            Some(limit) => limit.min(start + 1),
            None => start + 1,
        };
        if start < 0 || wanted <= 0 {
            return Ok(Vec::new());
        }

        let wanted = wanted as usize;
        let mut records = Vec::with_capacity(wanted.min(BUCKET_CAPACITY as usize * 4));
        let mut slot = bucket_slot(start);
        let mut first_index = Some(index_in_bucket(start));

        while slot >= 0 && records.len() < wanted {
            let bucket = self.fetch(account, slot)?;

            let last = bucket.details.len() as i64 - 1;
            let top = match first_index.take() {
                Some(index) => index.min(last),
                None => last,
            };

            if top >= 0 {
                let take = wanted - records.len();
                records.extend(
                    bucket.details[..=top as usize]
                        .iter()
                        .rev()
                        .take(take)
                        .cloned(),
                );
            }

            slot -= 1;
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_records_returned(records.len());
        }

        Ok(records)
    }

    fn fetch(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
        match self.source.fetch_bucket(account, slot) {
            Ok(bucket) => {
                tracing::debug!(
                    account = %account,
                    slot,
                    records = bucket.len(),
                    "Bucket fetched"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_bucket_fetched();
                }
                Ok(bucket)
            }
            Err(err) => {
                tracing::warn!(
                    account = %account,
                    slot,
                    error = %err,
                    "Bucket fetch failed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_fetch_failure();
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use crate::types::DetailType;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory source; each record's `created_at` is its global index.
    struct MemorySource {
        num_of_tx: i64,
        buckets: HashMap<i64, BalanceHistoryBucket>,
        missing_slot: Option<i64>,
        fetched: RefCell<Vec<i64>>,
    }

    impl MemorySource {
        fn with_records(num_of_tx: i64) -> Self {
            let mut buckets: HashMap<i64, BalanceHistoryBucket> = HashMap::new();
            for index in 0..num_of_tx {
                buckets
                    .entry(bucket_slot(index))
                    .or_default()
                    .details
                    .push(detail(index));
            }
            Self {
                num_of_tx,
                buckets,
                missing_slot: None,
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl LedgerSource for MemorySource {
        fn num_of_tx(&self, _account: &AccountKey) -> Result<i64> {
            Ok(self.num_of_tx)
        }

        fn fetch_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
            self.fetched.borrow_mut().push(slot);
            if self.missing_slot == Some(slot) {
                return Err(Error::NotFound(format!("{} bucket {}", account, slot)));
            }
            self.buckets
                .get(&slot)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("{} bucket {}", account, slot)))
        }
    }

    fn detail(index: i64) -> BalanceHistoryDetail {
        BalanceHistoryDetail {
            detail_type: DetailType::TransferIn,
            from: AccountKey::new("sender"),
            to: AccountKey::new("me"),
            amount: Coin::from_i64(100_000),
            balance: Coin::from_i64(100_000 * (index + 1)),
            created_at: index,
            memo: format!("tx {}", index),
        }
    }

    fn indices(records: &[BalanceHistoryDetail]) -> Vec<i64> {
        records.iter().map(|r| r.created_at).collect()
    }

    fn me() -> AccountKey {
        AccountKey::new("me")
    }

    #[test]
    fn test_get_all_spans_buckets_newest_first() {
        let source = MemorySource::with_records(250);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_all(&me()).unwrap();
        assert_eq!(records.len(), 250);
        assert_eq!(indices(&records), (0..250).rev().collect::<Vec<_>>());
        assert_eq!(*source.fetched.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_get_all_empty_account() {
        let source = MemorySource::with_records(0);
        let reader = LedgerHistoryReader::new(&source);

        assert!(reader.get_all(&me()).unwrap().is_empty());
        assert!(source.fetched.borrow().is_empty());
    }

    #[test]
    fn test_get_all_exact_bucket_boundary() {
        let source = MemorySource::with_records(200);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_all(&me()).unwrap();
        assert_eq!(indices(&records), (0..200).rev().collect::<Vec<_>>());
        assert_eq!(*source.fetched.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_get_recent_clamps_to_available() {
        let source = MemorySource::with_records(116);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_recent(&me(), 120).unwrap();
        assert_eq!(indices(&records), (0..116).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_get_recent_stops_early() {
        let source = MemorySource::with_records(250);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_recent(&me(), 10).unwrap();
        assert_eq!(indices(&records), (240..250).rev().collect::<Vec<_>>());
        assert_eq!(*source.fetched.borrow(), vec![2]);

        let records = reader.get_recent(&me(), 60).unwrap();
        assert_eq!(indices(&records), (190..250).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_get_recent_rejects_bad_count() {
        let source = MemorySource::with_records(10);
        let reader = LedgerHistoryReader::with_config(&source, &HistoryConfig { max_recent: 50 });

        assert!(matches!(reader.get_recent(&me(), 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(reader.get_recent(&me(), -3), Err(Error::InvalidArgument(_))));
        assert!(matches!(reader.get_recent(&me(), 51), Err(Error::InvalidArgument(_))));
        assert_eq!(reader.get_recent(&me(), 50).unwrap().len(), 10);
    }

    #[test]
    fn test_get_range_across_buckets() {
        let source = MemorySource::with_records(116);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_range(&me(), 65, 115).unwrap();
        assert_eq!(records.len(), 51);
        assert_eq!(records.first().unwrap().created_at, 114);
        assert_eq!(records.last().unwrap().created_at, 64);
        assert_eq!(indices(&records), (64..=114).rev().collect::<Vec<_>>());
        assert_eq!(*source.fetched.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_get_range_clamps_to() {
        let source = MemorySource::with_records(116);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_range(&me(), 100, 500).unwrap();
        assert_eq!(indices(&records), (99..116).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_get_range_from_zero_stops_at_oldest() {
        let source = MemorySource::with_records(30);
        let reader = LedgerHistoryReader::new(&source);

        let records = reader.get_range(&me(), 0, 10).unwrap();
        assert_eq!(indices(&records), (0..10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_get_range_rejects_bad_arguments() {
        let source = MemorySource::with_records(116);
        let reader = LedgerHistoryReader::new(&source);

        for (from, to) in [(20, 10), (-1, 10), (1, -1), (117, 200)] {
            assert!(
                matches!(reader.get_range(&me(), from, to), Err(Error::InvalidArgument(_))),
                "accepted [{}, {}]",
                from,
                to
            );
        }
        assert!(source.fetched.borrow().is_empty());
    }

    #[test]
    fn test_fetch_failure_aborts() {
        let mut source = MemorySource::with_records(250);
        source.missing_slot = Some(1);
        let reader = LedgerHistoryReader::new(&source);

        assert!(matches!(reader.get_all(&me()), Err(Error::NotFound(_))));
        assert_eq!(*source.fetched.borrow(), vec![2, 1]);

        // Still served when the walk never reaches the missing bucket.
        assert_eq!(reader.get_recent(&me(), 50).unwrap().len(), 50);
    }

    #[test]
    fn test_metrics_recorded() {
        let mut source = MemorySource::with_records(150);
        source.missing_slot = Some(0);
        let metrics = Metrics::new().unwrap();
        let reader = LedgerHistoryReader::new(&source).with_metrics(metrics.clone());

        reader.get_recent(&me(), 20).unwrap();
        assert!(reader.get_all(&me()).is_err());

        assert_eq!(metrics.reads_total.get(), 2);
        assert_eq!(metrics.buckets_fetched.get(), 2);
        assert_eq!(metrics.fetch_failures.get(), 1);
    }
}
