//! RipLimit account and ledger entry models for bidding-currency tracking

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user RipLimit account, split into freely usable and reserved buckets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RipLimitAccount {
    pub user_id: Uuid,
    pub available_balance: Decimal,
    /// Currency held against open bids or won-but-unpaid auctions
    pub blocked_balance: Decimal,
    pub has_unpaid_auctions: bool,
    /// Admin-set; gates further bidding
    pub is_blocked: bool,
    pub updated_at: NaiveDateTime,
}

impl RipLimitAccount {
    /// Create an empty account for a user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            available_balance: Decimal::ZERO,
            blocked_balance: Decimal::ZERO,
            has_unpaid_auctions: false,
            is_blocked: false,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Total currency in the account across both buckets
    pub fn total(&self) -> Decimal {
        self.available_balance + self.blocked_balance
    }

    /// Whether the account may place further bids
    pub fn can_bid(&self) -> bool {
        !self.is_blocked && !self.has_unpaid_auctions
    }

    /// Invariant checked after every ledger operation
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.available_balance < Decimal::ZERO {
            return Err(format!(
                "available balance is negative: {}",
                self.available_balance
            ));
        }
        if self.blocked_balance < Decimal::ZERO {
            return Err(format!(
                "blocked balance is negative: {}",
                self.blocked_balance
            ));
        }
        Ok(())
    }
}

/// Ledger entry types for currency movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Hold,
    Release,
    Adjustment,
    WonSettlement,
    Refund,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Release => "release",
            Self::Adjustment => "adjustment",
            Self::WonSettlement => "won_settlement",
            Self::Refund => "refund",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hold" => Some(Self::Hold),
            "release" => Some(Self::Release),
            "adjustment" => Some(Self::Adjustment),
            "won_settlement" => Some(Self::WonSettlement),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

/// Ledger entry recording a single currency movement with before/after
/// snapshots of both buckets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub auction_id: Option<Uuid>,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub available_before: Decimal,
    pub available_after: Decimal,
    pub blocked_before: Decimal,
    pub blocked_after: Decimal,
    /// Mandatory for admin adjustments
    pub reason: Option<String>,
    /// Acting admin, when the movement was not system-initiated
    pub actor: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

/// Aggregate RipLimit figures for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RipLimitStats {
    pub total_accounts: u64,
    pub total_available: Decimal,
    pub total_blocked: Decimal,
    pub blocked_accounts: u64,
    pub accounts_with_unpaid: u64,
}
