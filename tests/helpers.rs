//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::Duration;
use ripmarket_backend::auth::{Actor, Role};
use ripmarket_backend::models::{Auction, Bid};
use ripmarket_backend::services::{BidRequest, CreateAuction};
use ripmarket_backend::{AppConfig, AppResult, AppState};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Build an isolated application state with a throwaway audit log directory.
pub fn test_state() -> AppState {
    let config = AppConfig {
        audit_log_dir: std::env::temp_dir().join(format!("ripmarket-test-{}", Uuid::new_v4())),
        ..AppConfig::default()
    };
    AppState::new(config).expect("test state should initialize")
}

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

pub fn seller() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Seller)
}

pub fn buyer() -> Actor {
    Actor::new(Uuid::new_v4(), Role::User)
}

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Credit a user's available balance through an admin adjustment.
pub async fn seed_balance(state: &AppState, user_id: Uuid, amount: i64) {
    state
        .balance_repo
        .adjust(user_id, dec(amount), "test seed", Uuid::new_v4())
        .await
        .expect("seeding balance should succeed");
}

/// Create an auction that started a minute ago and runs for an hour.
pub async fn create_active_auction(
    state: &AppState,
    seller: Actor,
    starting_price: i64,
    bid_increment: i64,
    reserve_price: Option<i64>,
) -> Auction {
    let now = chrono::Utc::now().naive_utc();
    let input = CreateAuction {
        slug: format!("lot-{}", Uuid::new_v4()),
        shop_id: Uuid::new_v4(),
        title: "Test Lot".to_string(),
        description: None,
        starting_price: dec(starting_price),
        reserve_price: reserve_price.map(dec),
        bid_increment: dec(bid_increment),
        start_time: now - Duration::minutes(1),
        end_time: now + Duration::hours(1),
    };
    state
        .auction_service
        .create(seller, input)
        .await
        .expect("auction creation should succeed")
}

/// Create an auction that opens an hour from now.
pub async fn create_scheduled_auction(
    state: &AppState,
    seller: Actor,
    starting_price: i64,
    bid_increment: i64,
) -> Auction {
    let now = chrono::Utc::now().naive_utc();
    let input = CreateAuction {
        slug: format!("lot-{}", Uuid::new_v4()),
        shop_id: Uuid::new_v4(),
        title: "Scheduled Lot".to_string(),
        description: None,
        starting_price: dec(starting_price),
        reserve_price: None,
        bid_increment: dec(bid_increment),
        start_time: now + Duration::hours(1),
        end_time: now + Duration::hours(2),
    };
    state
        .auction_service
        .create(seller, input)
        .await
        .expect("auction creation should succeed")
}

/// Place a plain (non-proxy) bid.
pub async fn place_bid(
    state: &AppState,
    auction_id: Uuid,
    user_id: Uuid,
    amount: i64,
) -> AppResult<Bid> {
    state
        .bidding_service
        .place_bid(
            auction_id,
            BidRequest {
                user_id,
                amount: dec(amount),
                is_auto_bid: false,
                max_auto_bid_amount: None,
            },
        )
        .await
}

/// Place a bid carrying a proxy ceiling.
pub async fn place_auto_bid(
    state: &AppState,
    auction_id: Uuid,
    user_id: Uuid,
    amount: i64,
    ceiling: i64,
) -> AppResult<Bid> {
    state
        .bidding_service
        .place_bid(
            auction_id,
            BidRequest {
                user_id,
                amount: dec(amount),
                is_auto_bid: true,
                max_auto_bid_amount: Some(dec(ceiling)),
            },
        )
        .await
}
