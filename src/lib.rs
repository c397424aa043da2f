//! RipMarket Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repositories::*;
use services::*;
use std::sync::Arc;

/// Application state containing all repositories and services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auction_repo: Arc<AuctionRepository>,
    pub bid_repo: Arc<BidRepository>,
    pub balance_repo: Arc<BalanceRepository>,
    pub category_repo: Arc<CategoryRepository>,
    pub watchlist_repo: Arc<WatchlistRepository>,
    pub audit: Arc<AuditTrailService>,
    pub auction_locks: Arc<AuctionLocks>,
    pub auction_service: Arc<AuctionService>,
    pub bidding_service: Arc<BiddingService>,
    pub ledger_service: Arc<LedgerService>,
    pub category_service: Arc<CategoryService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let audit = Arc::new(AuditTrailService::new(config.audit_log_dir.clone())?);

        let auction_repo = Arc::new(AuctionRepository::new());
        let bid_repo = Arc::new(BidRepository::new());
        let balance_repo = Arc::new(BalanceRepository::new());
        let category_repo = Arc::new(CategoryRepository::new());
        let watchlist_repo = Arc::new(WatchlistRepository::new());

        // Bid acceptance and lifecycle closes serialize on the same
        // per-auction locks.
        let auction_locks = Arc::new(AuctionLocks::new());

        let auction_service = Arc::new(AuctionService::new(
            auction_repo.clone(),
            bid_repo.clone(),
            balance_repo.clone(),
            watchlist_repo.clone(),
            audit.clone(),
            auction_locks.clone(),
        ));
        let bidding_service = Arc::new(BiddingService::new(
            auction_repo.clone(),
            bid_repo.clone(),
            balance_repo.clone(),
            audit.clone(),
            auction_locks.clone(),
        ));
        let ledger_service = Arc::new(LedgerService::new(balance_repo.clone(), audit.clone()));
        let category_service = Arc::new(CategoryService::new(category_repo.clone()));

        Ok(Self {
            config: Arc::new(config),
            auction_repo,
            bid_repo,
            balance_repo,
            category_repo,
            watchlist_repo,
            audit,
            auction_locks,
            auction_service,
            bidding_service,
            ledger_service,
            category_service,
        })
    }
}
