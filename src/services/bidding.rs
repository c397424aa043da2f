//! Bid acceptance engine.
//!
//! Acceptance for a given auction is serialized through a per-auction lock;
//! different auctions proceed in parallel. All balance movements of one
//! acceptance happen as a single atomic unit in the balance repository.

use crate::error::{AppError, AppResult, BidRejection};
use crate::models::{AuctionStatus, Bid};
use crate::repositories::{
    AuctionRepository, BalanceRepository, BidRepository, OutbidRelease,
};
use crate::services::audit::AuditTrailService;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound on system counter-bids triggered by one submission. The loop
/// is bounded by the distinct ceiling holders anyway; this cap protects
/// against adversarial inputs.
const MAX_AUTO_BID_ROUNDS: usize = 32;

/// Parameters of a bid submission
#[derive(Debug, Clone)]
pub struct BidRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub is_auto_bid: bool,
    pub max_auto_bid_amount: Option<Decimal>,
}

/// Registry of per-auction serialization locks.
///
/// Bid acceptance and the lifecycle steps that settle holds (end, cancel,
/// the sweeper's close) all acquire the same auction's lock, so a close can
/// never interleave with an in-flight acceptance and strand its hold.
#[derive(Default)]
pub struct AuctionLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AuctionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, auction_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(auction_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Service for placing bids
pub struct BiddingService {
    auction_repo: Arc<AuctionRepository>,
    bid_repo: Arc<BidRepository>,
    balance_repo: Arc<BalanceRepository>,
    audit: Arc<AuditTrailService>,
    locks: Arc<AuctionLocks>,
}

impl BiddingService {
    pub fn new(
        auction_repo: Arc<AuctionRepository>,
        bid_repo: Arc<BidRepository>,
        balance_repo: Arc<BalanceRepository>,
        audit: Arc<AuditTrailService>,
        locks: Arc<AuctionLocks>,
    ) -> Self {
        Self {
            auction_repo,
            bid_repo,
            balance_repo,
            audit,
            locks,
        }
    }

    /// Place a bid on an auction.
    ///
    /// Returns the caller's accepted bid; any auto-bid counter sequence it
    /// triggers runs before the call returns, so the auction state the
    /// caller refetches already reflects it.
    pub async fn place_bid(&self, auction_id: Uuid, request: BidRequest) -> AppResult<Bid> {
        info!(
            "Placing bid: auction={}, user={}, amount={}, auto={}",
            auction_id, request.user_id, request.amount, request.is_auto_bid
        );

        let _guard = self.locks.acquire(auction_id).await;

        let accepted = self.accept(auction_id, &request).await?;

        if let Err(e) = self.run_auto_bids(auction_id).await {
            // The submitted bid already stands; a failed counter-bid only
            // ends the proxy sequence.
            warn!("Auto-bid sequence stopped for auction {}: {}", auction_id, e);
        }

        Ok(accepted)
    }

    /// Evaluate one bid against the acceptance rules and, on success, apply
    /// the balance movements and auction mutation. Caller holds the
    /// per-auction lock.
    async fn accept(&self, auction_id: Uuid, request: &BidRequest) -> AppResult<Bid> {
        let auction = self
            .auction_repo
            .find_by_id(auction_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("auction {}", auction_id)))?;

        let now = chrono::Utc::now().naive_utc();

        // A bid racing the sweeper may arrive while the record still says
        // scheduled; the automatic transition applies here too.
        let auction = if auction.status_enum() == AuctionStatus::Scheduled
            && auction.start_time <= now
        {
            self.auction_repo
                .update(auction_id, |a| {
                    if a.status_enum() == AuctionStatus::Scheduled {
                        a.status = AuctionStatus::Active.as_str().to_string();
                    }
                    Ok(())
                })
                .await?
        } else {
            auction
        };

        if !auction.is_active() || now > auction.end_time {
            return Err(BidRejection::AuctionNotActive.into());
        }

        if request.user_id == auction.seller_id {
            return Err(BidRejection::SelfBid.into());
        }

        let account = self.balance_repo.get_or_create(request.user_id).await;
        if !account.can_bid() {
            return Err(BidRejection::BidderSuspended.into());
        }

        let minimum = auction.minimum_next_bid();
        if request.amount < minimum {
            return Err(BidRejection::BidTooLow { minimum }.into());
        }

        let bid = Bid::new(
            auction_id,
            request.user_id,
            request.amount,
            request.is_auto_bid,
            request.max_auto_bid_amount,
        );
        bid.validate().map_err(AppError::Validation)?;

        // The standing highest bidder either raises their own hold or gets
        // released as outbid; both movements share one atomic unit with the
        // new hold.
        let previous = self.bid_repo.highest(auction_id).await;
        let (prior_hold, outbid) = match &previous {
            Some(prev) if prev.user_id == request.user_id => (prev.amount, None),
            Some(prev) => (
                Decimal::ZERO,
                Some(OutbidRelease {
                    user_id: prev.user_id,
                    amount: prev.amount,
                }),
            ),
            None => (Decimal::ZERO, None),
        };

        self.balance_repo
            .apply_bid_hold(request.user_id, request.amount, prior_hold, outbid, auction_id)
            .await?;

        let updated = self
            .auction_repo
            .update(auction_id, |a| {
                // currentPrice is monotonically non-decreasing by the
                // increment check above
                a.current_price = request.amount;
                a.total_bids += 1;
                Ok(())
            })
            .await?;

        let bid = self.bid_repo.append(bid).await;

        if let Err(e) = self.audit.log_bid_placed(&bid, updated.current_price).await {
            warn!("Failed to audit bid {}: {}", bid.id, e);
        }
        info!(
            "Bid accepted: auction={}, bid={}, price={}",
            auction_id, bid.id, updated.current_price
        );

        Ok(bid)
    }

    /// Proxy bidding: while the displaced highest bid carries a live ceiling,
    /// counter on the holder's behalf with the smallest admissible amount.
    async fn run_auto_bids(&self, auction_id: Uuid) -> AppResult<()> {
        for _ in 0..MAX_AUTO_BID_ROUNDS {
            let auction = self
                .auction_repo
                .find_by_id(auction_id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("auction {}", auction_id)))?;

            let bids = self.bid_repo.all_for_auction(auction_id).await;
            let Some((highest, rest)) = bids.split_last() else {
                return Ok(());
            };

            // Most recently displaced bid of another user; earlier entries
            // by the same user are older amounts of the same contender.
            let displaced = rest
                .iter()
                .rev()
                .find(|b| b.user_id != highest.user_id);
            let Some(displaced) = displaced else {
                return Ok(());
            };
            let Some(ceiling) = displaced.ceiling_above(auction.current_price) else {
                return Ok(());
            };

            let counter = ceiling.min(auction.minimum_next_bid());
            if counter < auction.minimum_next_bid() {
                // Ceiling cannot cover a full increment; the sequence ends.
                return Ok(());
            }

            let request = BidRequest {
                user_id: displaced.user_id,
                amount: counter,
                is_auto_bid: true,
                max_auto_bid_amount: Some(ceiling),
            };
            match self.accept(auction_id, &request).await {
                Ok(_) => continue,
                Err(AppError::BidRejected(reason)) => {
                    info!(
                        "Auto-bid for user {} on auction {} not placed: {}",
                        displaced.user_id, auction_id, reason
                    );
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        warn!(
            "Auto-bid round cap reached for auction {}; sequence truncated",
            auction_id
        );
        Ok(())
    }
}
