use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
    Cancelled,
}

impl AuctionStatus {
    /// Convert from stored string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(AuctionStatus::Scheduled),
            "active" => Ok(AuctionStatus::Active),
            "ended" => Ok(AuctionStatus::Ended),
            "cancelled" => Ok(AuctionStatus::Cancelled),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    /// Convert to stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Scheduled => "scheduled",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }
}

impl From<String> for AuctionStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(AuctionStatus::Scheduled)
    }
}

impl From<AuctionStatus> for String {
    fn from(status: AuctionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Auction model representing a time-boxed competitive sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: Uuid,
    pub slug: String,
    pub seller_id: Uuid,
    pub shop_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starting_price: Decimal,
    /// Monotonically non-decreasing once bidding starts
    pub current_price: Decimal,
    /// Hidden minimum for a binding sale
    pub reserve_price: Option<Decimal>,
    /// Minimum delta between consecutive bids
    pub bid_increment: Decimal,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String, // Stored as TEXT, use AuctionStatus enum for type safety
    pub total_bids: i64,
    pub watchers: i64,
    pub featured: bool,
    pub featured_priority: i32,
    pub created_at: NaiveDateTime,
}

impl Auction {
    /// Create a new Auction. Status depends on whether the start time has
    /// already passed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        slug: String,
        seller_id: Uuid,
        shop_id: Uuid,
        title: String,
        description: Option<String>,
        starting_price: Decimal,
        reserve_price: Option<Decimal>,
        bid_increment: Decimal,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let status = if start_time <= now {
            AuctionStatus::Active
        } else {
            AuctionStatus::Scheduled
        };

        Self {
            id: Uuid::new_v4(),
            slug,
            seller_id,
            shop_id,
            title,
            description,
            starting_price,
            current_price: starting_price,
            reserve_price,
            bid_increment,
            start_time,
            end_time,
            status: status.as_str().to_string(),
            total_bids: 0,
            watchers: 0,
            featured: false,
            featured_priority: 0,
            created_at: now,
        }
    }

    /// Get status as an enum
    pub fn status_enum(&self) -> AuctionStatus {
        AuctionStatus::from_str(&self.status).unwrap_or(AuctionStatus::Scheduled)
    }

    /// Check if auction is currently accepting bids
    pub fn is_active(&self) -> bool {
        self.status_enum() == AuctionStatus::Active
    }

    /// Smallest bid the acceptance rules will admit
    pub fn minimum_next_bid(&self) -> Decimal {
        self.current_price + self.bid_increment
    }

    /// A sale is only binding once the reserve (if any) is met
    pub fn reserve_met(&self) -> bool {
        match self.reserve_price {
            Some(reserve) => self.current_price >= reserve,
            None => true,
        }
    }

    /// Validate commercial and temporal attributes at creation time
    pub fn validate(&self) -> Result<(), String> {
        if self.slug.trim().is_empty() {
            return Err("Slug must not be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Title must not be empty".to_string());
        }
        if self.starting_price <= Decimal::ZERO {
            return Err("Starting price must be positive".to_string());
        }
        if self.bid_increment <= Decimal::ZERO {
            return Err("Bid increment must be positive".to_string());
        }
        if self.end_time <= self.start_time {
            return Err("End time must be after start time".to_string());
        }
        if let Some(reserve) = self.reserve_price {
            if reserve < self.starting_price {
                return Err("Reserve price must not be below the starting price".to_string());
            }
        }
        if self.current_price < self.starting_price {
            return Err("Current price must not be below the starting price".to_string());
        }
        Ok(())
    }
}
