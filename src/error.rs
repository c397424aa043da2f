use rust_decimal::Decimal;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authorization errors (non-owner mutation, non-admin ledger access)
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// A bid was rejected by the acceptance rules
    #[error("Bid rejected: {0}")]
    BidRejected(#[from] BidRejection),

    /// State-conflict errors (cancel with bids, duplicate slug, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ledger bookkeeping violation; fatal-grade, never user input
    #[error("Ledger inconsistency: {0}")]
    LedgerInconsistency(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// UUID parsing errors
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Forbidden(_) => 403,
            AppError::Validation(_) | AppError::InvalidUuid(_) => 400,
            AppError::BidRejected(_) | AppError::Conflict(_) => 409,
            AppError::Config(_) | AppError::LedgerInconsistency(_) => 500,
            _ => 500,
        }
    }
}

/// Reasons a bid can be rejected by the acceptance algorithm.
///
/// None of these are retried automatically; the caller must resubmit
/// with corrected parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidRejection {
    /// Auction is not accepting bids (scheduled, ended, cancelled, or past end time)
    #[error("auction is not active")]
    AuctionNotActive,

    /// Bidder is the auction's seller
    #[error("sellers cannot bid on their own auctions")]
    SelfBid,

    /// Bid does not clear the current price plus the increment
    #[error("bid too low: minimum acceptable bid is {minimum}")]
    BidTooLow { minimum: Decimal },

    /// Bidder cannot cover the deposit hold
    #[error("insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    /// Bidder's account is admin-blocked or carries unpaid wins
    #[error("account is not eligible to bid")]
    BidderSuspended,
}

/// Store-level error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record (slug collisions and the like)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Available balance cannot cover the requested hold or debit
    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    /// Blocked balance would go negative; indicates a bookkeeping bug
    #[error("Ledger inconsistency: {0}")]
    LedgerInconsistency(String),

    /// Business rule violation (cancel with bids, ...)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Duplicate(msg) => AppError::Conflict(format!("Duplicate: {}", msg)),
            StoreError::InvalidInput(msg) => AppError::Validation(msg),
            StoreError::InsufficientBalance {
                available,
                required,
            } => AppError::BidRejected(BidRejection::InsufficientBalance {
                available,
                required,
            }),
            StoreError::LedgerInconsistency(msg) => AppError::LedgerInconsistency(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}
