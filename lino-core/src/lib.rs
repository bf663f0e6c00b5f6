//! Lino Client Core
//!
//! Monetary value model and balance history reader for the Lino chain.
//!
//! # Architecture
//!
//! - **SafeInt**: Arbitrary precision integer with a 255-bit ceiling
//! - **Coin**: Fixed-point LNO amount with exact decimal conversion
//! - **LedgerHistoryReader**: Merges 100-record buckets into one
//!   most-recent-first stream
//! - **LedgerClient / Storage**: Key-value reads from the chain or a local
//!   RocksDB mirror
//!
//! # Invariants
//!
//! - No SafeInt value ever exceeds 255 bits of magnitude
//! - `Coin::from_lno(c.to_lno()) == c` for every in-range coin
//! - History is returned in strict reverse insertion order

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod safe_int;
pub mod coin;
pub mod types;
pub mod history;
pub mod query;
pub mod storage;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use safe_int::SafeInt;
pub use coin::Coin;
pub use types::{AccountBank, AccountKey, BalanceHistoryBucket, BalanceHistoryDetail, DetailType};
pub use history::{LedgerHistoryReader, LedgerSource};
pub use query::{KvQuery, LedgerClient};
pub use storage::Storage;
pub use config::Config;
