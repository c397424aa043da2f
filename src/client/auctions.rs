//! Typed client for the auction endpoints.

use crate::api::auctions::{
    BatchBody, BulkBody, BulkResponse, FeatureBody, PlaceBidBody, WatchResponse,
};
use crate::client::http::{ApiClient, ClientPage, ClientResult};
use crate::models::{Auction, Bid};
use crate::services::{BulkAction, BulkOutcome, CreateAuction, UpdateAuction};
use rust_decimal::Decimal;
use tracing::warn;
use url::form_urlencoded;
use uuid::Uuid;

/// Optional filters for `list`. Everything is serialized into the
/// query string; `None` fields are omitted.
#[derive(Debug, Default, Clone)]
pub struct ListAuctions {
    pub status: Option<String>,
    pub shop_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<usize>,
    pub start_after: Option<Uuid>,
}

impl ListAuctions {
    /// Values go through form encoding; a search term with spaces or `&`
    /// must not break the query.
    fn query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(v) = &self.status {
            query.append_pair("status", v);
        }
        if let Some(v) = self.shop_id {
            query.append_pair("shopId", &v.to_string());
        }
        if let Some(v) = self.seller_id {
            query.append_pair("sellerId", &v.to_string());
        }
        if let Some(v) = &self.search {
            query.append_pair("search", v);
        }
        if let Some(v) = self.featured {
            query.append_pair("featured", if v { "true" } else { "false" });
        }
        if let Some(v) = &self.sort {
            query.append_pair("sort", v);
        }
        if let Some(v) = &self.sort_order {
            query.append_pair("sortOrder", v);
        }
        if let Some(v) = self.limit {
            query.append_pair("limit", &v.to_string());
        }
        if let Some(v) = self.start_after {
            query.append_pair("startAfter", &v.to_string());
        }
        let encoded = query.finish();
        if encoded.is_empty() {
            String::new()
        } else {
            format!("?{}", encoded)
        }
    }
}

/// Paging and ordering options for bid history.
#[derive(Debug, Default, Clone)]
pub struct ListBids {
    pub limit: Option<usize>,
    pub start_after: Option<Uuid>,
    pub sort_order: Option<String>,
}

impl ListBids {
    fn query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(v) = self.limit {
            query.append_pair("limit", &v.to_string());
        }
        if let Some(v) = self.start_after {
            query.append_pair("startAfter", &v.to_string());
        }
        if let Some(v) = &self.sort_order {
            query.append_pair("sortOrder", v);
        }
        let encoded = query.finish();
        if encoded.is_empty() {
            String::new()
        } else {
            format!("?{}", encoded)
        }
    }
}

/// Client over the `/auctions` endpoint group.
#[derive(Debug, Clone)]
pub struct AuctionsClient {
    api: ApiClient,
}

impl AuctionsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List auctions; the returned page carries the cursor for the next one.
    pub async fn list(&self, filters: &ListAuctions) -> ClientResult<ClientPage<Auction>> {
        self.api
            .get_paginated(&format!("/auctions{}", filters.query_string()))
            .await
    }

    /// Fetch one auction by id or slug.
    pub async fn get(&self, key: &str) -> ClientResult<Auction> {
        self.api.get(&format!("/auctions/{}", key)).await
    }

    pub async fn create(&self, input: &CreateAuction) -> ClientResult<Auction> {
        self.api.post("/auctions", input).await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateAuction) -> ClientResult<Auction> {
        self.api.put(&format!("/auctions/{}", id), input).await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.api.delete(&format!("/auctions/{}", id)).await
    }

    pub async fn place_bid(
        &self,
        auction_id: Uuid,
        amount: Decimal,
        max_auto_bid_amount: Option<Decimal>,
    ) -> ClientResult<Bid> {
        let body = PlaceBidBody {
            amount,
            is_auto_bid: max_auto_bid_amount.is_some(),
            max_auto_bid_amount,
        };
        self.api
            .post(&format!("/auctions/{}/bid", auction_id), &body)
            .await
    }

    /// Paginated bid history, newest first unless `sort_order` is `asc`.
    pub async fn get_bids(
        &self,
        auction_id: Uuid,
        options: &ListBids,
    ) -> ClientResult<ClientPage<Bid>> {
        self.api
            .get_paginated(&format!(
                "/auctions/{}/bids{}",
                auction_id,
                options.query_string()
            ))
            .await
    }

    pub async fn toggle_watch(&self, auction_id: Uuid) -> ClientResult<bool> {
        let response: WatchResponse = self
            .api
            .post_empty(&format!("/auctions/{}/watch", auction_id))
            .await?;
        Ok(response.watching)
    }

    pub async fn bulk(
        &self,
        action: BulkAction,
        ids: Vec<Uuid>,
        updates: Option<UpdateAuction>,
    ) -> ClientResult<BulkOutcome> {
        let body = BulkBody {
            action,
            ids,
            updates,
        };
        let response: BulkResponse = self.api.post("/auctions/bulk", &body).await?;
        Ok(response.results)
    }

    /// Batch lookup by id. An empty or absent id list never hits the
    /// network; callers routinely pass through whatever a cart or
    /// watchlist page produced.
    pub async fn get_by_ids(&self, ids: Option<&[Uuid]>) -> ClientResult<Vec<Auction>> {
        let ids = match ids {
            Some(ids) if !ids.is_empty() => ids.to_vec(),
            _ => return Ok(Vec::new()),
        };
        let body = BatchBody { ids: Some(ids) };
        self.api.post("/auctions/batch", &body).await
    }

    /// Featured rail for the storefront. Failures degrade to an empty
    /// list so the page renders without the rail.
    pub async fn get_featured(&self, limit: usize) -> Vec<Auction> {
        match self
            .api
            .get(&format!("/auctions/featured?limit={}", limit))
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!("Featured auctions fetch failed, returning empty: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_live(&self, limit: usize) -> ClientResult<Vec<Auction>> {
        self.api
            .get(&format!("/auctions/live?limit={}", limit))
            .await
    }

    pub async fn get_homepage(&self, limit: usize) -> ClientResult<Vec<Auction>> {
        self.api
            .get(&format!("/auctions/homepage?limit={}", limit))
            .await
    }

    pub async fn get_similar(&self, auction_id: Uuid, limit: usize) -> ClientResult<Vec<Auction>> {
        self.api
            .get(&format!("/auctions/{}/similar?limit={}", auction_id, limit))
            .await
    }

    pub async fn get_seller_auctions(&self, seller_id: Uuid) -> ClientResult<ClientPage<Auction>> {
        self.api
            .get_paginated(&format!("/sellers/{}/auctions", seller_id))
            .await
    }

    pub async fn get_my_bids(&self) -> ClientResult<Vec<Bid>> {
        self.api.get("/users/me/bids").await
    }

    pub async fn get_watchlist(&self) -> ClientResult<Vec<Auction>> {
        self.api.get("/users/me/watchlist").await
    }

    pub async fn get_won_auctions(&self) -> ClientResult<Vec<Auction>> {
        self.api.get("/users/me/won").await
    }

    pub async fn set_featured(
        &self,
        auction_id: Uuid,
        featured: bool,
        priority: i32,
    ) -> ClientResult<Auction> {
        let body = FeatureBody { featured, priority };
        self.api
            .post(&format!("/auctions/{}/feature", auction_id), &body)
            .await
    }
}
