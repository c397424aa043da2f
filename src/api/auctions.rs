//! Handlers for the `/auctions` endpoint group

use crate::api::envelope::{ApiResponse, HandlerResult, Pagination};
use crate::auth::Actor;
use crate::error::AppError;
use crate::models::{Auction, AuctionStatus, Bid};
use crate::repositories::{AuctionFilter, AuctionSort, Page, PageRequest};
use crate::services::auctions::{BulkAction, BulkOutcome, CreateAuction, UpdateAuction};
use crate::services::bidding::BidRequest;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for auction listings
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
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

impl ListQuery {
    fn filter(&self) -> Result<AuctionFilter, AppError> {
        let status = match &self.status {
            Some(s) => Some(AuctionStatus::from_str(s).map_err(AppError::Validation)?),
            None => None,
        };
        Ok(AuctionFilter {
            status,
            shop_id: self.shop_id,
            seller_id: self.seller_id,
            search: self.search.clone(),
            featured: self.featured,
            sort: self
                .sort
                .as_deref()
                .and_then(AuctionSort::from_str)
                .unwrap_or_default(),
            descending: self.sort_order.as_deref() == Some("desc"),
        })
    }

    fn page(&self) -> PageRequest {
        PageRequest {
            limit: self.limit.unwrap_or(0),
            start_after: self.start_after,
        }
    }
}

fn paginated<T>(page: Page<T>) -> ApiResponse<Vec<T>> {
    let pagination = Pagination {
        next_cursor: page.next_cursor,
        has_more: page.has_more,
        total: None,
        page: None,
        page_size: None,
    };
    ApiResponse::ok_paginated(page.items, pagination)
}

/// GET /auctions
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<Auction>> {
    let filter = query.filter()?;
    let page = state.auction_service.list(&filter, &query.page()).await;
    Ok(paginated(page))
}

/// GET /auctions/{id or slug}
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> HandlerResult<Auction> {
    let auction = state.auction_service.get(&key).await?;
    Ok(ApiResponse::ok(auction))
}

/// POST /auctions
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateAuction>,
) -> HandlerResult<Auction> {
    let auction = state.auction_service.create(actor, input).await?;
    Ok(ApiResponse::ok(auction))
}

/// PUT /auctions/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAuction>,
) -> HandlerResult<Auction> {
    let auction = state.auction_service.update(actor, id, input).await?;
    Ok(ApiResponse::ok(auction))
}

/// DELETE /auctions/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> HandlerResult<()> {
    state.auction_service.delete(actor, id).await?;
    Ok(ApiResponse::ok(()))
}

/// Body for POST /auctions/{id}/bid
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidBody {
    pub amount: Decimal,
    #[serde(default)]
    pub is_auto_bid: bool,
    pub max_auto_bid_amount: Option<Decimal>,
}

/// POST /auctions/{id}/bid
pub async fn place_bid(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<PlaceBidBody>,
) -> HandlerResult<Bid> {
    let request = BidRequest {
        user_id: actor.user_id,
        amount: body.amount,
        is_auto_bid: body.is_auto_bid,
        max_auto_bid_amount: body.max_auto_bid_amount,
    };
    let bid = state.bidding_service.place_bid(id, request).await?;
    Ok(ApiResponse::ok(bid))
}

/// Query parameters for bid history
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BidsQuery {
    pub limit: Option<usize>,
    pub start_after: Option<Uuid>,
    pub sort_order: Option<String>,
}

/// GET /auctions/{id}/bids
pub async fn bids(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<BidsQuery>,
) -> HandlerResult<Vec<Bid>> {
    let page = PageRequest {
        limit: query.limit.unwrap_or(0),
        start_after: query.start_after,
    };
    let oldest_first = query.sort_order.as_deref() == Some("asc");
    let bids = state.auction_service.get_bids(id, &page, oldest_first).await?;
    Ok(paginated(bids))
}

/// Response for POST /auctions/{id}/watch
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchResponse {
    pub watching: bool,
}

/// POST /auctions/{id}/watch
pub async fn toggle_watch(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> HandlerResult<WatchResponse> {
    let watching = state.auction_service.toggle_watch(actor.user_id, id).await?;
    Ok(ApiResponse::ok(WatchResponse { watching }))
}

/// Body for POST /auctions/bulk
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkBody {
    pub action: BulkAction,
    pub ids: Vec<Uuid>,
    pub updates: Option<UpdateAuction>,
}

/// Bulk results wrapper (`data.results` on the wire)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
    pub results: BulkOutcome,
}

/// POST /auctions/bulk
pub async fn bulk(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<BulkBody>,
) -> HandlerResult<BulkResponse> {
    let results = state
        .auction_service
        .bulk(actor, body.action, &body.ids, body.updates)
        .await;
    Ok(ApiResponse::ok(BulkResponse { results }))
}

/// Body for POST /auctions/batch
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchBody {
    pub ids: Option<Vec<Uuid>>,
}

/// POST /auctions/batch
pub async fn batch(
    State(state): State<AppState>,
    Json(body): Json<BatchBody>,
) -> HandlerResult<Vec<Auction>> {
    let ids = body.ids.unwrap_or_default();
    let auctions = state.auction_service.get_by_ids(&ids).await;
    Ok(ApiResponse::ok(auctions))
}

/// Query parameter for capped view endpoints
#[derive(Debug, Deserialize, Default)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// GET /auctions/featured
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<Auction>> {
    let items = state
        .auction_service
        .get_featured(query.limit.unwrap_or(20))
        .await;
    Ok(ApiResponse::ok(items))
}

/// GET /auctions/live
pub async fn live(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<Auction>> {
    let items = state.auction_service.get_live(query.limit.unwrap_or(20)).await;
    Ok(ApiResponse::ok(items))
}

/// GET /auctions/homepage
pub async fn homepage(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<Auction>> {
    let items = state
        .auction_service
        .get_homepage(query.limit.unwrap_or(20))
        .await;
    Ok(ApiResponse::ok(items))
}

/// GET /auctions/{id}/similar
pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<Auction>> {
    let items = state
        .auction_service
        .get_similar(id, query.limit.unwrap_or(8))
        .await?;
    Ok(ApiResponse::ok(items))
}

/// GET /sellers/{id}/auctions
pub async fn seller_auctions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<Auction>> {
    let page = state
        .auction_service
        .get_seller_auctions(id, &query.page())
        .await;
    Ok(paginated(page))
}

/// GET /users/me/bids
pub async fn my_bids(State(state): State<AppState>, actor: Actor) -> HandlerResult<Vec<Bid>> {
    let bids = state.auction_service.get_my_bids(actor.user_id).await;
    Ok(ApiResponse::ok(bids))
}

/// GET /users/me/watchlist
pub async fn watchlist(State(state): State<AppState>, actor: Actor) -> HandlerResult<Vec<Auction>> {
    let items = state.auction_service.get_watchlist(actor.user_id).await?;
    Ok(ApiResponse::ok(items))
}

/// GET /users/me/won
pub async fn won(State(state): State<AppState>, actor: Actor) -> HandlerResult<Vec<Auction>> {
    let items = state.auction_service.get_won_auctions(actor.user_id).await;
    Ok(ApiResponse::ok(items))
}

/// Body for POST /auctions/{id}/feature
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBody {
    pub featured: bool,
    #[serde(default)]
    pub priority: i32,
}

/// POST /auctions/{id}/feature
pub async fn set_featured(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<FeatureBody>,
) -> HandlerResult<Auction> {
    let auction = state
        .auction_service
        .set_featured(actor, id, body.featured, body.priority)
        .await?;
    Ok(ApiResponse::ok(auction))
}
