use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bid model representing a single accepted bid on an auction.
///
/// A bid is immutable once accepted; it is never edited, only superseded
/// by a later higher bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Uuid,
    pub auction_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub is_auto_bid: bool,
    /// Hidden ceiling for proxy bidding on the holder's behalf
    pub max_auto_bid_amount: Option<Decimal>,
    pub created_at: NaiveDateTime,
}

impl Bid {
    /// Create a new Bid
    pub fn new(
        auction_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        is_auto_bid: bool,
        max_auto_bid_amount: Option<Decimal>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            auction_id,
            user_id,
            amount,
            is_auto_bid,
            max_auto_bid_amount,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Validate that the bid amounts are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("Bid amount must be greater than zero".to_string());
        }
        if let Some(ceiling) = self.max_auto_bid_amount {
            if ceiling < self.amount {
                return Err("Auto-bid ceiling must not be below the bid amount".to_string());
            }
        }
        Ok(())
    }

    /// Remaining proxy headroom above the given price, if this bid carries
    /// an auto-bid ceiling
    pub fn ceiling_above(&self, price: Decimal) -> Option<Decimal> {
        match self.max_auto_bid_amount {
            Some(ceiling) if self.is_auto_bid && ceiling > price => Some(ceiling),
            _ => None,
        }
    }
}
