//! Repository for auction records and list queries

use crate::error::StoreError;
use crate::models::{Auction, AuctionStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sort key for auction listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuctionSort {
    #[default]
    Newest,
    EndingSoon,
    PriceHigh,
    PriceLow,
}

impl AuctionSort {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(Self::Newest),
            "ending_soon" | "endingSoon" => Some(Self::EndingSoon),
            "price_high" | "priceHigh" => Some(Self::PriceHigh),
            "price_low" | "priceLow" => Some(Self::PriceLow),
            _ => None,
        }
    }
}

/// Filters for auction listings
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub shop_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    /// Case-insensitive substring match against the title
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub sort: AuctionSort,
    /// Reverse the sort direction
    pub descending: bool,
}

/// Cursor-based page request
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: usize,
    /// Id of the last item of the previous page
    pub start_after: Option<Uuid>,
}

impl PageRequest {
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            20
        } else {
            self.limit.min(100)
        }
    }
}

/// One page of results plus the cursor for the next
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
}

struct Inner {
    auctions: HashMap<Uuid, Auction>,
    slugs: HashMap<String, Uuid>,
}

/// In-memory auction repository. A single writer lock over the map makes
/// each operation atomic.
pub struct AuctionRepository {
    inner: RwLock<Inner>,
}

impl Default for AuctionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                auctions: HashMap::new(),
                slugs: HashMap::new(),
            }),
        }
    }

    /// Insert a new auction; the slug must be unique
    pub async fn insert(&self, auction: Auction) -> Result<Auction, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.slugs.contains_key(&auction.slug) {
            return Err(StoreError::Duplicate(format!("slug '{}'", auction.slug)));
        }
        inner.slugs.insert(auction.slug.clone(), auction.id);
        inner.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Auction> {
        self.inner.read().await.auctions.get(&id).cloned()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<Auction> {
        let inner = self.inner.read().await;
        inner
            .slugs
            .get(slug)
            .and_then(|id| inner.auctions.get(id))
            .cloned()
    }

    /// Batch fetch; unknown ids are skipped
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Vec<Auction> {
        let inner = self.inner.read().await;
        ids.iter()
            .filter_map(|id| inner.auctions.get(id))
            .cloned()
            .collect()
    }

    /// Apply a mutation to one auction under the write lock.
    ///
    /// The closure sees the current record and may reject the change; slug
    /// renames must go through [`rename_slug`] so the index stays consistent.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Result<Auction, StoreError>
    where
        F: FnOnce(&mut Auction) -> Result<(), StoreError>,
    {
        let mut inner = self.inner.write().await;
        let auction = inner
            .auctions
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("auction {}", id)))?;
        f(auction)?;
        Ok(auction.clone())
    }

    /// Rename the slug with a uniqueness re-check, atomically with the
    /// index update
    pub async fn rename_slug(&self, id: Uuid, new_slug: &str) -> Result<Auction, StoreError> {
        if new_slug.trim().is_empty() {
            return Err(StoreError::InvalidInput("slug must not be empty".into()));
        }
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.slugs.get(new_slug) {
            if *existing != id {
                return Err(StoreError::Duplicate(format!("slug '{}'", new_slug)));
            }
        }
        let auction = inner
            .auctions
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("auction {}", id)))?;
        let old_slug = std::mem::replace(&mut auction.slug, new_slug.to_string());
        let updated = auction.clone();
        inner.slugs.remove(&old_slug);
        inner.slugs.insert(new_slug.to_string(), id);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let auction = inner
            .auctions
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("auction {}", id)))?;
        inner.slugs.remove(&auction.slug);
        Ok(())
    }

    /// List auctions with filters, sort, and cursor pagination.
    ///
    /// The cursor is the id of the last item of the previous page; sorting
    /// is made stable by tie-breaking on id so a cursor always resolves to
    /// one position.
    pub async fn list(&self, filter: &AuctionFilter, page: &PageRequest) -> Page<Auction> {
        let inner = self.inner.read().await;
        let mut matched: Vec<&Auction> = inner
            .auctions
            .values()
            .filter(|a| {
                if let Some(status) = filter.status {
                    if a.status_enum() != status {
                        return false;
                    }
                }
                if let Some(shop_id) = filter.shop_id {
                    if a.shop_id != shop_id {
                        return false;
                    }
                }
                if let Some(seller_id) = filter.seller_id {
                    if a.seller_id != seller_id {
                        return false;
                    }
                }
                if let Some(featured) = filter.featured {
                    if a.featured != featured {
                        return false;
                    }
                }
                if let Some(search) = &filter.search {
                    if !a.title.to_lowercase().contains(&search.to_lowercase()) {
                        return false;
                    }
                }
                true
            })
            .collect();

        matched.sort_by(|a, b| {
            let ord = match filter.sort {
                AuctionSort::Newest => b.created_at.cmp(&a.created_at),
                AuctionSort::EndingSoon => a.end_time.cmp(&b.end_time),
                AuctionSort::PriceHigh => b.current_price.cmp(&a.current_price),
                AuctionSort::PriceLow => a.current_price.cmp(&b.current_price),
            };
            let ord = if filter.descending { ord.reverse() } else { ord };
            ord.then_with(|| a.id.cmp(&b.id))
        });

        paginate(matched.into_iter().cloned().collect(), page)
    }

    /// All auctions currently in the given status (used by the sweeper)
    pub async fn find_by_status(&self, status: AuctionStatus) -> Vec<Auction> {
        self.inner
            .read()
            .await
            .auctions
            .values()
            .filter(|a| a.status_enum() == status)
            .cloned()
            .collect()
    }
}

/// Cut one cursor page out of an already-sorted vector
pub fn paginate<T: HasId>(items: Vec<T>, page: &PageRequest) -> Page<T> {
    let limit = page.effective_limit();
    let start = match page.start_after {
        Some(cursor) => items
            .iter()
            .position(|a| a.id() == cursor)
            .map(|pos| pos + 1)
            .unwrap_or(0),
        None => 0,
    };

    let remaining = items.len().saturating_sub(start);
    let has_more = remaining > limit;
    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
    let next_cursor = if has_more {
        items.last().map(|a| a.id())
    } else {
        None
    };

    Page {
        items,
        next_cursor,
        has_more,
    }
}

/// Records addressable by a cursor
pub trait HasId {
    fn id(&self) -> Uuid;
}

impl HasId for Auction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasId for crate::models::Bid {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn auction(slug: &str) -> Auction {
        let now = chrono::Utc::now().naive_utc();
        Auction::new(
            slug.to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            format!("Auction {}", slug),
            None,
            Decimal::new(1000, 0),
            None,
            Decimal::new(100, 0),
            now,
            now + Duration::hours(1),
        )
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        tokio_test::block_on(async {
            let repo = AuctionRepository::new();
            repo.insert(auction("one-of-a-kind")).await.unwrap();
            let err = repo.insert(auction("one-of-a-kind")).await.unwrap_err();
            assert!(matches!(err, StoreError::Duplicate(_)));
        });
    }

    #[test]
    fn test_rename_slug_rechecks_uniqueness() {
        tokio_test::block_on(async {
            let repo = AuctionRepository::new();
            let a = repo.insert(auction("first")).await.unwrap();
            repo.insert(auction("second")).await.unwrap();

            assert!(matches!(
                repo.rename_slug(a.id, "second").await.unwrap_err(),
                StoreError::Duplicate(_)
            ));

            let renamed = repo.rename_slug(a.id, "third").await.unwrap();
            assert_eq!(renamed.slug, "third");
            assert!(repo.find_by_slug("first").await.is_none());
            assert!(repo.find_by_slug("third").await.is_some());
        });
    }

    #[test]
    fn test_cursor_pagination_walks_all_items() {
        tokio_test::block_on(async {
            let repo = AuctionRepository::new();
            for i in 0..7 {
                repo.insert(auction(&format!("item-{}", i))).await.unwrap();
            }

            let filter = AuctionFilter::default();
            let mut seen = Vec::new();
            let mut cursor = None;
            loop {
                let page = repo
                    .list(
                        &filter,
                        &PageRequest {
                            limit: 3,
                            start_after: cursor,
                        },
                    )
                    .await;
                seen.extend(page.items.iter().map(|a| a.id));
                if !page.has_more {
                    break;
                }
                cursor = page.next_cursor;
            }
            assert_eq!(seen.len(), 7);
        });
    }
}
