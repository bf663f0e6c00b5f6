//! Ledger record types
//!
//! These mirror the JSON documents the chain returns for account queries.

use crate::coin::Coin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records per balance history bucket
pub const BUCKET_CAPACITY: i64 = 100;

/// Account name on chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    /// Create new account key
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailType {
    /// Incoming transfer
    TransferIn,
    /// Incoming donation
    DonationIn,
    /// Content reward claimed
    ClaimReward,
    /// Validator inflation payout
    ValidatorInflation,
    /// Developer inflation payout
    DeveloperInflation,
    /// Infrastructure inflation payout
    InfraInflation,
    /// Vote deposit returned
    VoteReturnCoin,
    /// Delegation returned
    DelegationReturnCoin,
    /// Validator deposit returned
    ValidatorReturnCoin,
    /// Developer deposit returned
    DeveloperReturnCoin,
    /// Infrastructure deposit returned
    InfraReturnCoin,
    /// Proposal deposit returned
    ProposalReturnCoin,
    /// Genesis allocation
    GenesisCoin,
    /// Outgoing transfer
    TransferOut,
    /// Outgoing donation
    DonationOut,
    /// Delegation to a voter
    Delegate,
    /// Voter deposit
    VoterDeposit,
    /// Validator deposit
    ValidatorDeposit,
    /// Developer deposit
    DeveloperDeposit,
    /// Infrastructure deposit
    InfraDeposit,
    /// Proposal deposit
    ProposalDeposit,
}

impl DetailType {
    /// True for types that add to the balance
    pub fn is_income(&self) -> bool {
        !matches!(
            self,
            DetailType::TransferOut
                | DetailType::DonationOut
                | DetailType::Delegate
                | DetailType::VoterDeposit
                | DetailType::ValidatorDeposit
                | DetailType::DeveloperDeposit
                | DetailType::InfraDeposit
                | DetailType::ProposalDeposit
        )
    }
}

/// One balance change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceHistoryDetail {
    /// Kind of change
    pub detail_type: DetailType,

    /// Counterparty paying in (empty for system payouts)
    pub from: AccountKey,

    /// Counterparty receiving
    pub to: AccountKey,

    /// Amount moved
    pub amount: Coin,

    /// Saving balance after the change
    pub balance: Coin,

    /// Unix seconds
    pub created_at: i64,

    /// Free text
    #[serde(default)]
    pub memo: String,
}

impl BalanceHistoryDetail {
    /// Creation time as UTC, if the timestamp is in range
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// Fixed-capacity chronological page of an account's history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceHistoryBucket {
    /// Records in insertion order
    #[serde(default)]
    pub details: Vec<BalanceHistoryDetail>,
}

impl BalanceHistoryBucket {
    /// Number of records held
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// True if no records are held
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// True once the bucket holds [`BUCKET_CAPACITY`] records
    pub fn is_full(&self) -> bool {
        self.details.len() as i64 >= BUCKET_CAPACITY
    }
}

/// Bucket slot holding a zero-based global index
pub fn bucket_slot(global_index: i64) -> i64 {
    global_index / BUCKET_CAPACITY
}

/// Position of a global index inside its bucket
pub fn index_in_bucket(global_index: i64) -> i64 {
    global_index % BUCKET_CAPACITY
}

/// Account balance summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBank {
    /// Spendable balance
    pub saving: Coin,

    /// Total number of balance history records
    #[serde(rename = "number_of_transaction")]
    pub num_of_tx: i64,

    /// Total number of reward records
    #[serde(rename = "number_of_reward", default)]
    pub num_of_reward: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_addressing() {
        assert_eq!(bucket_slot(0), 0);
        assert_eq!(bucket_slot(99), 0);
        assert_eq!(bucket_slot(100), 1);
        assert_eq!(bucket_slot(249), 2);
        assert_eq!(index_in_bucket(249), 49);
        assert_eq!(index_in_bucket(100), 0);
    }

    #[test]
    fn test_detail_type_direction() {
        assert!(DetailType::TransferIn.is_income());
        assert!(DetailType::GenesisCoin.is_income());
        assert!(!DetailType::TransferOut.is_income());
        assert!(!DetailType::ProposalDeposit.is_income());
    }

    #[test]
    fn test_account_bank_json() {
        let json = r#"{"saving":{"amount":"500000"},"number_of_transaction":116}"#;
        let bank: AccountBank = serde_json::from_str(json).unwrap();
        assert_eq!(bank.num_of_tx, 116);
        assert_eq!(bank.num_of_reward, 0);
        assert_eq!(bank.saving.to_lno(), "5");
    }

    #[test]
    fn test_detail_json() {
        let detail = BalanceHistoryDetail {
            detail_type: DetailType::TransferIn,
            from: AccountKey::new("alice"),
            to: AccountKey::new("bob"),
            amount: Coin::from_i64(150_000),
            balance: Coin::from_i64(1_150_000),
            created_at: 1_530_000_000,
            memo: "rent".to_string(),
        };

        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains(r#""detail_type":"transfer_in""#));
        assert!(json.contains(r#""from":"alice""#));

        let back: BalanceHistoryDetail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, detail);
        assert_eq!(back.created_at_utc().unwrap().timestamp(), 1_530_000_000);
    }
}
