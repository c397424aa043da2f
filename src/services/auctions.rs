//! Auction CRUD, lifecycle transitions, derived views, and bulk actions

use crate::auth::Actor;
use crate::error::{AppError, AppResult};
use crate::models::{Auction, AuctionStatus, Bid};
use crate::repositories::{
    AuctionFilter, AuctionRepository, BalanceRepository, BidRepository, Page, PageRequest,
    WatchlistRepository,
};
use crate::services::audit::AuditTrailService;
use crate::services::bidding::AuctionLocks;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Fields accepted when creating an auction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuction {
    pub slug: String,
    pub shop_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starting_price: Decimal,
    pub reserve_price: Option<Decimal>,
    pub bid_increment: Decimal,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuction {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub reserve_price: Option<Decimal>,
    pub bid_increment: Option<Decimal>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

/// Bulk lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Start,
    End,
    Cancel,
    Feature,
    Unfeature,
    Delete,
    Update,
}

/// Per-id outcome of a bulk action; callers must handle partial success
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub successful_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
    pub errors: HashMap<Uuid, String>,
}

/// Service for managing auctions
pub struct AuctionService {
    auction_repo: Arc<AuctionRepository>,
    bid_repo: Arc<BidRepository>,
    balance_repo: Arc<BalanceRepository>,
    watchlist_repo: Arc<WatchlistRepository>,
    audit: Arc<AuditTrailService>,
    locks: Arc<AuctionLocks>,
}

impl AuctionService {
    pub fn new(
        auction_repo: Arc<AuctionRepository>,
        bid_repo: Arc<BidRepository>,
        balance_repo: Arc<BalanceRepository>,
        watchlist_repo: Arc<WatchlistRepository>,
        audit: Arc<AuditTrailService>,
        locks: Arc<AuctionLocks>,
    ) -> Self {
        Self {
            auction_repo,
            bid_repo,
            balance_repo,
            watchlist_repo,
            audit,
            locks,
        }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    pub async fn create(&self, actor: Actor, input: CreateAuction) -> AppResult<Auction> {
        let auction = Auction::new(
            input.slug,
            actor.user_id,
            input.shop_id,
            input.title,
            input.description,
            input.starting_price,
            input.reserve_price,
            input.bid_increment,
            input.start_time,
            input.end_time,
        );
        auction.validate().map_err(AppError::Validation)?;

        let auction = self.auction_repo.insert(auction).await?;
        info!("Auction created: {} ({})", auction.slug, auction.id);
        Ok(auction)
    }

    /// Resolve by id or slug; a missing auction is an error, not a null
    pub async fn get(&self, key: &str) -> AppResult<Auction> {
        let found = match Uuid::parse_str(key) {
            Ok(id) => self.auction_repo.find_by_id(id).await,
            Err(_) => self.auction_repo.find_by_slug(key).await,
        };
        found.ok_or_else(|| AppError::NotFound(format!("auction '{}'", key)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Auction> {
        self.auction_repo
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("auction {}", id)))
    }

    pub async fn update(
        &self,
        actor: Actor,
        id: Uuid,
        input: UpdateAuction,
    ) -> AppResult<Auction> {
        let auction = self.get_by_id(id).await?;
        actor.require_owner_or_admin(auction.seller_id)?;

        let has_bids = auction.total_bids > 0;
        let commercial_change =
            input.bid_increment.is_some() || input.start_time.is_some() || input.end_time.is_some();
        if has_bids && commercial_change {
            return Err(AppError::Conflict(
                "commercial terms cannot change once bids exist".into(),
            ));
        }

        let mut updated = self
            .auction_repo
            .update(id, |a| {
                if let Some(title) = &input.title {
                    a.title = title.clone();
                }
                if let Some(description) = &input.description {
                    a.description = Some(description.clone());
                }
                if let Some(reserve) = input.reserve_price {
                    a.reserve_price = Some(reserve);
                }
                if let Some(increment) = input.bid_increment {
                    a.bid_increment = increment;
                }
                if let Some(start) = input.start_time {
                    a.start_time = start;
                }
                if let Some(end) = input.end_time {
                    a.end_time = end;
                }
                Ok(())
            })
            .await?;

        // Slug rename re-checks uniqueness atomically with the index
        if let Some(slug) = &input.slug {
            if *slug != updated.slug {
                updated = self.auction_repo.rename_slug(id, slug).await?;
            }
        }

        updated.validate().map_err(AppError::Validation)?;
        Ok(updated)
    }

    /// Delete fails while bids exist (same guard as cancel)
    pub async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let auction = self.get_by_id(id).await?;
        actor.require_owner_or_admin(auction.seller_id)?;

        if self.bid_repo.has_bids(id).await {
            return Err(AppError::Conflict(
                "auction has bids and cannot be deleted".into(),
            ));
        }

        self.auction_repo.delete(id).await?;
        self.watchlist_repo.remove_auction(id).await;
        info!("Auction deleted: {}", id);
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Explicit start of a scheduled auction
    pub async fn start(&self, actor: Actor, id: Uuid) -> AppResult<Auction> {
        let auction = self.get_by_id(id).await?;
        actor.require_owner_or_admin(auction.seller_id)?;
        self.transition(id, AuctionStatus::Scheduled, AuctionStatus::Active, Some(actor.user_id))
            .await
    }

    /// Explicit early close; settles the winner like a timed-out end
    pub async fn end(&self, actor: Actor, id: Uuid) -> AppResult<Auction> {
        let auction = self.get_by_id(id).await?;
        actor.require_owner_or_admin(auction.seller_id)?;
        self.end_and_settle(id, Some(actor.user_id)).await
    }

    /// Close an active auction under its serialization lock so no bid can
    /// interleave between the settlement read and the status change.
    /// Settlement runs first: if it fails the auction stays active and the
    /// next sweep retries it, so the hold is never stranded on an ended
    /// auction.
    async fn end_and_settle(&self, id: Uuid, actor: Option<Uuid>) -> AppResult<Auction> {
        let _guard = self.locks.acquire(id).await;

        let auction = self.get_by_id(id).await?;
        if auction.status_enum() != AuctionStatus::Active {
            return Err(AppError::Conflict(format!(
                "auction is {}, expected active",
                auction.status
            )));
        }

        self.settle(&auction).await?;
        self.transition(id, AuctionStatus::Active, AuctionStatus::Ended, actor)
            .await
    }

    /// Cancellation is a hard precondition failure once bids exist:
    /// refunding a bid-bearing auction needs a workflow not modeled here.
    pub async fn cancel(&self, actor: Actor, id: Uuid) -> AppResult<Auction> {
        let auction = self.get_by_id(id).await?;
        actor.require_owner_or_admin(auction.seller_id)?;

        // Re-read under the auction lock: the bid count must not move
        // between the check and the status change.
        let _guard = self.locks.acquire(id).await;
        let auction = self.get_by_id(id).await?;

        if auction.total_bids > 0 {
            return Err(AppError::Conflict(
                "auction has bids and cannot be cancelled".into(),
            ));
        }

        let from = auction.status.clone();
        let cancelled = self
            .auction_repo
            .update(id, |a| {
                if a.status_enum().is_terminal() {
                    return Err(crate::error::StoreError::Conflict(format!(
                        "auction is already {}",
                        a.status
                    )));
                }
                a.status = AuctionStatus::Cancelled.as_str().to_string();
                Ok(())
            })
            .await?;

        if let Err(e) = self
            .audit
            .log_auction_transition(&cancelled, &from, Some(actor.user_id))
            .await
        {
            warn!("Failed to audit cancellation of {}: {}", id, e);
        }
        info!("Auction cancelled: {}", id);
        Ok(cancelled)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: AuctionStatus,
        to: AuctionStatus,
        actor: Option<Uuid>,
    ) -> AppResult<Auction> {
        let updated = self
            .auction_repo
            .update(id, |a| {
                if a.status_enum() != from {
                    return Err(crate::error::StoreError::Conflict(format!(
                        "auction is {}, expected {}",
                        a.status,
                        from.as_str()
                    )));
                }
                a.status = to.as_str().to_string();
                Ok(())
            })
            .await?;

        if let Err(e) = self
            .audit
            .log_auction_transition(&updated, from.as_str(), actor)
            .await
        {
            warn!("Failed to audit transition of {}: {}", id, e);
        }
        Ok(updated)
    }

    /// Post-end settlement: the winner's hold must not leak. Reserve met:
    /// hold stays blocked and the account is gated until payment. Reserve
    /// unmet: the hold is refunded.
    async fn settle(&self, auction: &Auction) -> AppResult<()> {
        let Some(winning) = self.bid_repo.highest(auction.id).await else {
            return Ok(());
        };

        if auction.reserve_met() {
            self.balance_repo
                .settle_won(winning.user_id, winning.amount, auction.id)
                .await?;
            info!(
                "Auction {} won by {} at {} (reserve met)",
                auction.id, winning.user_id, winning.amount
            );
        } else {
            self.balance_repo
                .refund_hold(winning.user_id, winning.amount, auction.id)
                .await?;
            info!(
                "Auction {} ended below reserve; hold of {} refunded to {}",
                auction.id, winning.amount, winning.user_id
            );
        }
        Ok(())
    }

    /// Time-based transitions, called by the background sweeper
    pub async fn sweep(&self) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();

        for auction in self
            .auction_repo
            .find_by_status(AuctionStatus::Scheduled)
            .await
        {
            if auction.start_time <= now {
                // A racing bid may have promoted it already; a failed
                // transition is fine.
                let _ = self
                    .transition(auction.id, AuctionStatus::Scheduled, AuctionStatus::Active, None)
                    .await;
            }
        }

        for auction in self
            .auction_repo
            .find_by_status(AuctionStatus::Active)
            .await
        {
            if auction.end_time <= now {
                // One auction failing to close must not hold up the rest
                // of the tick; it stays active and the next tick retries.
                if let Err(e) = self.end_and_settle(auction.id, None).await {
                    warn!("Sweeper could not end auction {}: {}", auction.id, e);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Featuring & watchlist
    // =========================================================================

    pub async fn set_featured(
        &self,
        actor: Actor,
        id: Uuid,
        featured: bool,
        priority: i32,
    ) -> AppResult<Auction> {
        actor.require_admin()?;
        let updated = self
            .auction_repo
            .update(id, |a| {
                a.featured = featured;
                a.featured_priority = if featured { priority } else { 0 };
                Ok(())
            })
            .await?;
        Ok(updated)
    }

    /// Toggle the auction on the user's watchlist; returns whether the user
    /// is watching afterwards
    pub async fn toggle_watch(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        // Ensure the auction exists first
        self.get_by_id(id).await?;
        let watching = self.watchlist_repo.toggle(user_id, id).await;
        let delta = if watching { 1 } else { -1 };
        self.auction_repo
            .update(id, |a| {
                a.watchers = (a.watchers + delta).max(0);
                Ok(())
            })
            .await?;
        Ok(watching)
    }

    pub async fn get_watchlist(&self, user_id: Uuid) -> AppResult<Vec<Auction>> {
        let ids = self.watchlist_repo.watched_by(user_id).await;
        Ok(self.auction_repo.find_by_ids(&ids).await)
    }

    // =========================================================================
    // Listings & derived views
    // =========================================================================

    pub async fn list(&self, filter: &AuctionFilter, page: &PageRequest) -> Page<Auction> {
        self.auction_repo.list(filter, page).await
    }

    /// Batch fetch; an empty request short-circuits without touching the
    /// store, distinguishing "nothing requested" from "nothing found"
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Vec<Auction> {
        if ids.is_empty() {
            return Vec::new();
        }
        self.auction_repo.find_by_ids(ids).await
    }

    pub async fn get_live(&self, limit: usize) -> Vec<Auction> {
        let filter = AuctionFilter {
            status: Some(AuctionStatus::Active),
            sort: crate::repositories::AuctionSort::EndingSoon,
            ..Default::default()
        };
        self.auction_repo
            .list(&filter, &PageRequest { limit, start_after: None })
            .await
            .items
    }

    pub async fn get_featured(&self, limit: usize) -> Vec<Auction> {
        let filter = AuctionFilter {
            status: Some(AuctionStatus::Active),
            featured: Some(true),
            ..Default::default()
        };
        let mut items = self
            .auction_repo
            .list(&filter, &PageRequest { limit, start_after: None })
            .await
            .items;
        items.sort_by(|a, b| b.featured_priority.cmp(&a.featured_priority));
        items
    }

    /// Featured first, then soonest-ending live auctions
    pub async fn get_homepage(&self, limit: usize) -> Vec<Auction> {
        let mut items = self.get_featured(limit).await;
        if items.len() < limit {
            let live = self.get_live(limit).await;
            for auction in live {
                if items.len() >= limit {
                    break;
                }
                if !items.iter().any(|a| a.id == auction.id) {
                    items.push(auction);
                }
            }
        }
        items
    }

    /// Active auctions from the same shop, the auction itself excluded
    pub async fn get_similar(&self, id: Uuid, limit: usize) -> AppResult<Vec<Auction>> {
        let auction = self.get_by_id(id).await?;
        let filter = AuctionFilter {
            status: Some(AuctionStatus::Active),
            shop_id: Some(auction.shop_id),
            ..Default::default()
        };
        let items = self
            .auction_repo
            .list(
                &filter,
                &PageRequest {
                    limit: limit + 1,
                    start_after: None,
                },
            )
            .await
            .items;
        Ok(items.into_iter().filter(|a| a.id != id).take(limit).collect())
    }

    pub async fn get_seller_auctions(&self, seller_id: Uuid, page: &PageRequest) -> Page<Auction> {
        let filter = AuctionFilter {
            seller_id: Some(seller_id),
            ..Default::default()
        };
        self.auction_repo.list(&filter, page).await
    }

    pub async fn get_bids(
        &self,
        auction_id: Uuid,
        page: &PageRequest,
        oldest_first: bool,
    ) -> AppResult<Page<Bid>> {
        self.get_by_id(auction_id).await?;
        Ok(self.bid_repo.find_by_auction(auction_id, page, oldest_first).await)
    }

    pub async fn get_my_bids(&self, user_id: Uuid) -> Vec<Bid> {
        self.bid_repo.find_by_user(user_id).await
    }

    /// Ended auctions where the user holds the winning bid and the reserve
    /// was met
    pub async fn get_won_auctions(&self, user_id: Uuid) -> Vec<Auction> {
        let ended = self.auction_repo.find_by_status(AuctionStatus::Ended).await;
        let mut won = Vec::new();
        for auction in ended {
            if !auction.reserve_met() {
                continue;
            }
            if let Some(highest) = self.bid_repo.highest(auction.id).await {
                if highest.user_id == user_id {
                    won.push(auction);
                }
            }
        }
        won
    }

    // =========================================================================
    // Bulk actions
    // =========================================================================

    /// Apply a single-item operation across an id list. Partial failure is
    /// reported per id rather than all-or-nothing.
    pub async fn bulk(
        &self,
        actor: Actor,
        action: BulkAction,
        ids: &[Uuid],
        updates: Option<UpdateAuction>,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            let result: AppResult<()> = match action {
                BulkAction::Start => self.start(actor, id).await.map(|_| ()),
                BulkAction::End => self.end(actor, id).await.map(|_| ()),
                BulkAction::Cancel => self.cancel(actor, id).await.map(|_| ()),
                BulkAction::Feature => self.set_featured(actor, id, true, 0).await.map(|_| ()),
                BulkAction::Unfeature => self.set_featured(actor, id, false, 0).await.map(|_| ()),
                BulkAction::Delete => self.delete(actor, id).await,
                BulkAction::Update => match &updates {
                    Some(updates) => self.update(actor, id, updates.clone()).await.map(|_| ()),
                    None => Err(AppError::Validation(
                        "bulk update requires an updates payload".into(),
                    )),
                },
            };
            match result {
                Ok(()) => outcome.successful_ids.push(id),
                Err(e) => {
                    outcome.failed_ids.push(id);
                    outcome.errors.insert(id, e.to_string());
                }
            }
        }
        outcome
    }
}
