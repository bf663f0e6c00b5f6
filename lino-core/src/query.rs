//! Key-value query layer
//!
//! The chain node is an opaque read oracle: [`KvQuery`] exposes a point
//! read and a prefix scan over raw bytes. [`LedgerClient`] derives keys,
//! decodes the JSON documents and serves a [`LedgerSource`] on top.
//!
//! # Key layout (store `account`)
//!
//! - bank: `0x01 || account`
//! - balance history bucket `k`: `0x05 || account || "/" || decimal(k)`

use crate::error::{Error, Result};
use crate::history::LedgerSource;
use crate::types::{AccountBank, AccountKey, BalanceHistoryBucket};
use serde::de::DeserializeOwned;

/// Store holding account state
pub const ACCOUNT_STORE: &str = "account";

/// Substore prefix for account banks
pub const BANK_SUBSTORE: &[u8] = &[0x01];

/// Substore prefix for balance history buckets
pub const BALANCE_HISTORY_SUBSTORE: &[u8] = &[0x05];

/// Separator between account and bucket slot
pub const KEY_SEPARATOR: u8 = b'/';

/// Raw key-value read access
pub trait KvQuery {
    /// Point read; `None` if the key is absent
    fn query(&self, key: &[u8], store: &str) -> Result<Option<Vec<u8>>>;

    /// All pairs whose key starts with `prefix`, in key order
    fn query_subspace(&self, prefix: &[u8], store: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// Key of an account bank
pub fn bank_key(account: &AccountKey) -> Vec<u8> {
    let mut key = BANK_SUBSTORE.to_vec();
    key.extend_from_slice(account.as_str().as_bytes());
    key
}

/// Prefix shared by all of an account's history buckets
pub fn balance_history_prefix(account: &AccountKey) -> Vec<u8> {
    let mut key = BALANCE_HISTORY_SUBSTORE.to_vec();
    key.extend_from_slice(account.as_str().as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

/// Key of one history bucket
pub fn balance_history_key(account: &AccountKey, slot: i64) -> Vec<u8> {
    let mut key = balance_history_prefix(account);
    key.extend_from_slice(slot.to_string().as_bytes());
    key
}

/// Typed ledger reads over a [`KvQuery`] transport
#[derive(Debug, Clone)]
pub struct LedgerClient<Q> {
    transport: Q,
}

impl<Q: KvQuery> LedgerClient<Q> {
    /// Create client
    pub fn new(transport: Q) -> Self {
        Self { transport }
    }

    /// Underlying transport
    pub fn transport(&self) -> &Q {
        &self.transport
    }

    /// Balance summary of an account
    pub fn get_account_bank(&self, account: &AccountKey) -> Result<AccountBank> {
        self.get(&bank_key(account), || format!("bank of {}", account))
    }

    /// One history bucket
    pub fn get_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
        if slot < 0 {
            return Err(Error::InvalidArgument(format!("negative bucket slot {}", slot)));
        }
        self.get(&balance_history_key(account, slot), || {
            format!("balance history of {} bucket {}", account, slot)
        })
    }

    /// Every stored bucket of an account, ordered by slot
    pub fn get_all_buckets(&self, account: &AccountKey) -> Result<Vec<(i64, BalanceHistoryBucket)>> {
        let prefix = balance_history_prefix(account);
        let pairs = self.transport.query_subspace(&prefix, ACCOUNT_STORE)?;

        let mut buckets = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let slot = std::str::from_utf8(&key[prefix.len()..])
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| Error::Storage(format!("malformed history key {:?}", key)))?;
            buckets.push((slot, serde_json::from_slice(&value)?));
        }

        // Keys sort as text, so "10" precedes "2".
        buckets.sort_by_key(|(slot, _)| *slot);
        Ok(buckets)
    }

    fn get<T: DeserializeOwned>(&self, key: &[u8], what: impl FnOnce() -> String) -> Result<T> {
        let bytes = self
            .transport
            .query(key, ACCOUNT_STORE)?
            .ok_or_else(|| Error::NotFound(what()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl<Q: KvQuery> LedgerSource for LedgerClient<Q> {
    fn num_of_tx(&self, account: &AccountKey) -> Result<i64> {
        Ok(self.get_account_bank(account)?.num_of_tx)
    }

    fn fetch_bucket(&self, account: &AccountKey, slot: i64) -> Result<BalanceHistoryBucket> {
        self.get_bucket(account, slot)
    }
}
