//! Repository for accepted bids.
//!
//! Bids are append-only: the per-auction vector is ordered by acceptance
//! time, so the last element is always the standing highest bid.

use crate::models::Bid;
use crate::repositories::auction_repository::{paginate, Page, PageRequest};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct BidRepository {
    by_auction: RwLock<HashMap<Uuid, Vec<Bid>>>,
}

impl Default for BidRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BidRepository {
    pub fn new() -> Self {
        Self {
            by_auction: RwLock::new(HashMap::new()),
        }
    }

    /// Append an accepted bid in acceptance order
    pub async fn append(&self, bid: Bid) -> Bid {
        let mut map = self.by_auction.write().await;
        map.entry(bid.auction_id).or_default().push(bid.clone());
        bid
    }

    /// The standing highest bid, if any
    pub async fn highest(&self, auction_id: Uuid) -> Option<Bid> {
        self.by_auction
            .read()
            .await
            .get(&auction_id)
            .and_then(|bids| bids.last())
            .cloned()
    }

    pub async fn has_bids(&self, auction_id: Uuid) -> bool {
        self.by_auction
            .read()
            .await
            .get(&auction_id)
            .map(|bids| !bids.is_empty())
            .unwrap_or(false)
    }

    pub async fn count_for_auction(&self, auction_id: Uuid) -> usize {
        self.by_auction
            .read()
            .await
            .get(&auction_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Paginated bid history for an auction; newest first unless
    /// `oldest_first` is set
    pub async fn find_by_auction(
        &self,
        auction_id: Uuid,
        page: &PageRequest,
        oldest_first: bool,
    ) -> Page<Bid> {
        let map = self.by_auction.read().await;
        let mut bids: Vec<Bid> = map.get(&auction_id).cloned().unwrap_or_default();
        if !oldest_first {
            bids.reverse();
        }
        paginate(bids, page)
    }

    /// All bids a user has placed, newest first
    pub async fn find_by_user(&self, user_id: Uuid) -> Vec<Bid> {
        let map = self.by_auction.read().await;
        let mut bids: Vec<Bid> = map
            .values()
            .flatten()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bids
    }

    /// Full acceptance-ordered history for an auction
    pub async fn all_for_auction(&self, auction_id: Uuid) -> Vec<Bid> {
        self.by_auction
            .read()
            .await
            .get(&auction_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_highest_is_last_accepted() {
        tokio_test::block_on(async {
            let repo = BidRepository::new();
            let auction_id = Uuid::new_v4();
            let first = Bid::new(
                auction_id,
                Uuid::new_v4(),
                Decimal::new(1100, 0),
                false,
                None,
            );
            let second = Bid::new(
                auction_id,
                Uuid::new_v4(),
                Decimal::new(1200, 0),
                false,
                None,
            );
            repo.append(first).await;
            repo.append(second.clone()).await;

            assert_eq!(repo.highest(auction_id).await.unwrap().id, second.id);
            assert_eq!(repo.count_for_auction(auction_id).await, 2);
            assert!(repo.has_bids(auction_id).await);
            assert!(!repo.has_bids(Uuid::new_v4()).await);
        });
    }
}
