//! Domain models for the RipMarket backend.
//!
//! This module contains the core entities of the auction marketplace:
//! auctions, bids, RipLimit accounts and their ledger, and the category
//! graph.

pub mod auction;
pub mod balance;
pub mod bid;
pub mod category;

// Re-export all models for convenient access
pub use auction::{Auction, AuctionStatus};
pub use balance::{LedgerEntry, LedgerEntryType, RipLimitAccount, RipLimitStats};
pub use bid::Bid;
pub use category::Category;
