use crate::error::{AppError, AppResult};
use crate::models::{Auction, Bid, LedgerEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub event_type: String, // "bid_placed", "auction_cancelled", "balance_adjusted", etc.
    pub auction_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub details: serde_json::Value,
}

/// Audit trail service for logging all important actions
pub struct AuditTrailService {
    #[allow(dead_code)]
    log_file: PathBuf,
    file_handle: Arc<Mutex<std::fs::File>>,
}

impl AuditTrailService {
    /// Create a new audit trail service
    pub fn new(log_directory: PathBuf) -> AppResult<Self> {
        // Ensure directory exists
        std::fs::create_dir_all(&log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create log directory: {}", e)))?;

        // Create log file with date
        let date = chrono::Utc::now().format("%Y-%m-%d");
        let log_file = log_directory.join(format!("audit_{}.log", date));

        // Open file in append mode
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| AppError::Message(format!("Failed to open audit log file: {}", e)))?;

        info!("Audit trail initialized: {:?}", log_file);

        Ok(Self {
            log_file,
            file_handle: Arc::new(Mutex::new(file)),
        })
    }

    /// Log an audit entry
    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let json = serde_json::to_string(&entry).map_err(AppError::Serialization)?;

        let mut file = self.file_handle.lock().await;
        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write audit log: {}", e)))?;

        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Log bid acceptance
    pub async fn log_bid_placed(&self, bid: &Bid, current_price: Decimal) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "bid_placed".to_string(),
            auction_id: Some(bid.auction_id),
            user_id: Some(bid.user_id),
            details: serde_json::json!({
                "bid_id": bid.id.to_string(),
                "amount": bid.amount.to_string(),
                "is_auto_bid": bid.is_auto_bid,
                "current_price": current_price.to_string(),
            }),
        };

        self.log(entry).await
    }

    /// Log an auction lifecycle transition
    pub async fn log_auction_transition(
        &self,
        auction: &Auction,
        from: &str,
        actor: Option<Uuid>,
    ) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "auction_transition".to_string(),
            auction_id: Some(auction.id),
            user_id: actor,
            details: serde_json::json!({
                "slug": auction.slug,
                "from": from,
                "to": auction.status,
                "current_price": auction.current_price.to_string(),
                "total_bids": auction.total_bids,
            }),
        };

        self.log(entry).await
    }

    /// Log an admin balance adjustment as an irreversible ledger event with
    /// actor and before/after snapshots
    pub async fn log_balance_adjusted(&self, entry: &LedgerEntry) -> AppResult<()> {
        let log_entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "balance_adjusted".to_string(),
            auction_id: entry.auction_id,
            user_id: Some(entry.user_id),
            details: serde_json::json!({
                "entry_id": entry.id.to_string(),
                "amount": entry.amount.to_string(),
                "available_before": entry.available_before.to_string(),
                "available_after": entry.available_after.to_string(),
                "reason": entry.reason,
                "actor": entry.actor.map(|a| a.to_string()),
            }),
        };

        self.log(log_entry).await
    }
}
