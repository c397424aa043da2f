//! Handlers for the `/admin/riplimit` endpoint group

use crate::api::envelope::{ApiResponse, HandlerResult, Pagination};
use crate::auth::Actor;
use crate::models::{LedgerEntry, RipLimitAccount, RipLimitStats};
use crate::repositories::AccountFilter;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GET /admin/riplimit/stats
pub async fn stats(State(state): State<AppState>, actor: Actor) -> HandlerResult<RipLimitStats> {
    let stats = state.ledger_service.stats(actor).await?;
    Ok(ApiResponse::ok(stats))
}

/// Query parameters for the account listing
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub has_unpaid: Option<bool>,
    pub is_blocked: Option<bool>,
}

/// GET /admin/riplimit/users
pub async fn list_users(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<UsersQuery>,
) -> HandlerResult<Vec<RipLimitAccount>> {
    let filter = AccountFilter {
        has_unpaid: query.has_unpaid,
        is_blocked: query.is_blocked,
    };
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(20);
    let (accounts, total) = state
        .ledger_service
        .list_accounts(actor, &filter, page, page_size)
        .await?;

    let pagination = Pagination {
        next_cursor: None,
        has_more: page * page_size < total,
        total: Some(total),
        page: Some(page),
        page_size: Some(page_size),
    };
    Ok(ApiResponse::ok_paginated(accounts, pagination))
}

/// GET /admin/riplimit/users/{userId}
pub async fn get_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Uuid>,
) -> HandlerResult<RipLimitAccount> {
    let account = state.ledger_service.get_account(actor, user_id).await?;
    Ok(ApiResponse::ok(account))
}

/// Body for POST /admin/riplimit/users/{userId}/adjust
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBody {
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

/// POST /admin/riplimit/users/{userId}/adjust
pub async fn adjust(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AdjustBody>,
) -> HandlerResult<RipLimitAccount> {
    let (account, _entry) = state
        .ledger_service
        .adjust(actor, user_id, body.amount, &body.reason)
        .await?;
    Ok(ApiResponse::ok(account))
}

/// Body for POST /admin/riplimit/users/{userId}/block
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBody {
    pub blocked: bool,
}

/// POST /admin/riplimit/users/{userId}/block
pub async fn set_blocked(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Uuid>,
    Json(body): Json<BlockBody>,
) -> HandlerResult<RipLimitAccount> {
    let account = state
        .ledger_service
        .set_blocked(actor, user_id, body.blocked)
        .await?;
    Ok(ApiResponse::ok(account))
}

/// Query parameter for the ledger history
#[derive(Debug, Deserialize, Default)]
pub struct EntriesQuery {
    pub limit: Option<usize>,
}

/// GET /admin/riplimit/users/{userId}/entries
pub async fn entries(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Uuid>,
    Query(query): Query<EntriesQuery>,
) -> HandlerResult<Vec<LedgerEntry>> {
    let entries = state
        .ledger_service
        .entries(actor, user_id, query.limit.unwrap_or(50))
        .await?;
    Ok(ApiResponse::ok(entries))
}
