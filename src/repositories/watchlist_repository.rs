//! Repository for per-user auction watchlists

use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct WatchlistRepository {
    by_user: RwLock<HashMap<Uuid, HashSet<Uuid>>>,
}

impl Default for WatchlistRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistRepository {
    pub fn new() -> Self {
        Self {
            by_user: RwLock::new(HashMap::new()),
        }
    }

    /// Toggle an auction on the user's watchlist; returns whether the user
    /// is watching after the call
    pub async fn toggle(&self, user_id: Uuid, auction_id: Uuid) -> bool {
        let mut map = self.by_user.write().await;
        let set = map.entry(user_id).or_default();
        if set.remove(&auction_id) {
            false
        } else {
            set.insert(auction_id);
            true
        }
    }

    pub async fn is_watching(&self, user_id: Uuid, auction_id: Uuid) -> bool {
        self.by_user
            .read()
            .await
            .get(&user_id)
            .map(|set| set.contains(&auction_id))
            .unwrap_or(false)
    }

    pub async fn watched_by(&self, user_id: Uuid) -> Vec<Uuid> {
        self.by_user
            .read()
            .await
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop an auction from every watchlist (auction deleted)
    pub async fn remove_auction(&self, auction_id: Uuid) {
        let mut map = self.by_user.write().await;
        for set in map.values_mut() {
            set.remove(&auction_id);
        }
    }
}
