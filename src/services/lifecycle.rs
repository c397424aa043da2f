//! Background sweeper for time-based auction transitions

use crate::services::auctions::AuctionService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

/// Periodically promotes scheduled auctions whose start time has passed and
/// ends active auctions past their end time (with settlement)
pub struct LifecycleSweeper {
    auction_service: Arc<AuctionService>,
    sweep_interval: Duration,
}

impl LifecycleSweeper {
    pub fn new(auction_service: Arc<AuctionService>) -> Self {
        Self {
            auction_service,
            sweep_interval: Duration::from_secs(5),
        }
    }

    /// Set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Start sweeping; runs until the task is dropped
    pub async fn start(self) {
        let mut interval = time::interval(self.sweep_interval);
        info!("Lifecycle sweeper started, sweeping every {:?}", self.sweep_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.auction_service.sweep().await {
                error!("Error in lifecycle sweep: {}", e);
            }
        }
    }
}
