pub mod audit;
pub mod auctions;
pub mod bidding;
pub mod categories;
pub mod ledger;
pub mod lifecycle;

pub use audit::AuditTrailService;
pub use auctions::{AuctionService, BulkAction, BulkOutcome, CreateAuction, UpdateAuction};
pub use bidding::{AuctionLocks, BidRequest, BiddingService};
pub use categories::CategoryService;
pub use ledger::LedgerService;
pub use lifecycle::LifecycleSweeper;
