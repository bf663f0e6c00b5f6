//! Local ledger mirror using RocksDB
//!
//! # Column Families
//!
//! - `account` - Account banks and balance history buckets, keyed as
//!   described in [`crate::query`]
//!
//! Values are the same JSON documents the chain serves, so a [`Storage`]
//! can stand in for the node behind [`LedgerClient`](crate::query::LedgerClient).

use crate::{
    error::{Error, Result},
    query::{balance_history_key, bank_key, KvQuery, ACCOUNT_STORE},
    types::{bucket_slot, AccountBank, AccountKey, BalanceHistoryBucket, BalanceHistoryDetail},
    Config,
};
use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::sync::Arc;

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
    // Serializes read-modify-write appends.
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            ACCOUNT_STORE,
            Self::cf_options_account(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB ledger mirror");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn cf_options_account() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    /// Put account bank
    pub fn put_account_bank(&self, account: &AccountKey, bank: &AccountBank) -> Result<()> {
        let cf = self.cf_handle(ACCOUNT_STORE)?;
        self.db
            .put_cf(cf, bank_key(account), serde_json::to_vec(bank)?)?;
        Ok(())
    }

    /// Put one history bucket
    pub fn put_bucket(
        &self,
        account: &AccountKey,
        slot: i64,
        bucket: &BalanceHistoryBucket,
    ) -> Result<()> {
        let cf = self.cf_handle(ACCOUNT_STORE)?;
        self.db.put_cf(
            cf,
            balance_history_key(account, slot),
            serde_json::to_vec(bucket)?,
        )?;
        Ok(())
    }

    /// Append a history record to the newest bucket and bump the record
    /// count (atomic). Returns the record's zero-based global index.
    pub fn append_detail(&self, account: &AccountKey, detail: BalanceHistoryDetail) -> Result<i64> {
        let _guard = self.write_lock.lock();
        let cf = self.cf_handle(ACCOUNT_STORE)?;

        let mut bank: AccountBank = match self.db.get_cf(cf, bank_key(account))? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => AccountBank::default(),
        };

        let index = bank.num_of_tx;
        let slot = bucket_slot(index);
        let bucket_key = balance_history_key(account, slot);

        let mut bucket: BalanceHistoryBucket = match self.db.get_cf(cf, &bucket_key)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => BalanceHistoryBucket::default(),
        };
        if bucket.is_full() {
            return Err(Error::Storage(format!(
                "bucket {} of {} is full at record {}",
                slot, account, index
            )));
        }

        bank.saving = detail.balance.clone();
        bank.num_of_tx += 1;
        bucket.details.push(detail);

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, &bucket_key, serde_json::to_vec(&bucket)?);
        batch.put_cf(cf, bank_key(account), serde_json::to_vec(&bank)?);
        self.db.write(batch)?;

        tracing::debug!(account = %account, index, slot, "History record appended");

        Ok(index)
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl KvQuery for Storage {
    fn query(&self, key: &[u8], store: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle(store)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    fn query_subspace(&self, prefix: &[u8], store: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf_handle(store)?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        let mut pairs = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            pairs.push((key.to_vec(), value.to_vec()));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use crate::history::LedgerHistoryReader;
    use crate::query::LedgerClient;
    use crate::types::DetailType;
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (config, temp_dir)
    }

    fn detail(index: i64) -> BalanceHistoryDetail {
        BalanceHistoryDetail {
            detail_type: DetailType::TransferIn,
            from: AccountKey::new("faucet"),
            to: AccountKey::new("alice"),
            amount: Coin::from_i64(100_000),
            balance: Coin::from_i64(100_000 * (index + 1)),
            created_at: 1_530_000_000 + index,
            memo: format!("payment {}", index),
        }
    }

    #[test]
    fn test_storage_open() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        assert!(storage.db.cf_handle(ACCOUNT_STORE).is_some());
        storage.close().unwrap();
    }

    #[test]
    fn test_unknown_store() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        assert!(matches!(storage.query(b"k", "validator"), Err(Error::Storage(_))));
    }

    #[test]
    fn test_append_fills_buckets() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        let alice = AccountKey::new("alice");

        for index in 0..250 {
            assert_eq!(storage.append_detail(&alice, detail(index)).unwrap(), index);
        }

        let client = LedgerClient::new(storage);
        let bank = client.get_account_bank(&alice).unwrap();
        assert_eq!(bank.num_of_tx, 250);
        assert_eq!(bank.saving.to_lno(), "250");

        let buckets = client.get_all_buckets(&alice).unwrap();
        let sizes: Vec<usize> = buckets.iter().map(|(_, b)| b.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(buckets[2].1.details[0].memo, "payment 200");
    }

    #[test]
    fn test_reader_over_storage() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        let alice = AccountKey::new("alice");

        for index in 0..116 {
            storage.append_detail(&alice, detail(index)).unwrap();
        }

        let reader = LedgerHistoryReader::new(LedgerClient::new(storage));

        let recent = reader.get_recent(&alice, 120).unwrap();
        assert_eq!(recent.len(), 116);
        assert_eq!(recent[0].memo, "payment 115");
        assert_eq!(recent[115].memo, "payment 0");

        let range = reader.get_range(&alice, 65, 115).unwrap();
        assert_eq!(range.len(), 51);
        assert_eq!(range[0].memo, "payment 114");
        assert_eq!(range[50].memo, "payment 64");
    }

    #[test]
    fn test_full_bucket_rejected() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        let alice = AccountKey::new("alice");

        let bucket = BalanceHistoryBucket {
            details: (0..100).map(detail).collect(),
        };
        storage.put_bucket(&alice, 0, &bucket).unwrap();

        assert!(matches!(
            storage.append_detail(&alice, detail(0)),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let (config, _temp) = test_config();
        let alice = AccountKey::new("alice");

        let storage = Storage::open(&config).unwrap();
        storage.append_detail(&alice, detail(0)).unwrap();
        storage.close().unwrap();

        let client = LedgerClient::new(Storage::open(&config).unwrap());
        assert_eq!(client.get_account_bank(&alice).unwrap().num_of_tx, 1);
    }
}
