pub mod auction_repository;
pub mod balance_repository;
pub mod bid_repository;
pub mod category_repository;
pub mod watchlist_repository;

// Re-export all repositories for convenient access
pub use auction_repository::{
    AuctionFilter, AuctionRepository, AuctionSort, Page, PageRequest,
};
pub use balance_repository::{AccountFilter, BalanceRepository, OutbidRelease};
pub use bid_repository::BidRepository;
pub use category_repository::CategoryRepository;
pub use watchlist_repository::WatchlistRepository;
