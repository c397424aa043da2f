//! Handlers for the `/categories` endpoint group

use crate::api::envelope::{ApiResponse, HandlerResult};
use crate::auth::Actor;
use crate::models::Category;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body for POST /categories
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryBody {
    pub slug: String,
    pub name: String,
}

/// POST /categories
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateCategoryBody>,
) -> HandlerResult<Category> {
    let category = state
        .category_service
        .create(actor, body.slug, body.name)
        .await?;
    Ok(ApiResponse::ok(category))
}

/// GET /categories/{slug}
pub async fn get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> HandlerResult<Category> {
    let category = state.category_service.get(&slug).await?;
    Ok(ApiResponse::ok(category))
}

/// Body for the parent edge mutations
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentBody {
    pub parent_id: Uuid,
}

/// POST /categories/{slug}/add-parent
pub async fn add_parent(
    State(state): State<AppState>,
    actor: Actor,
    Path(slug): Path<String>,
    Json(body): Json<ParentBody>,
) -> HandlerResult<Category> {
    let category = state
        .category_service
        .add_parent(actor, &slug, body.parent_id)
        .await?;
    Ok(ApiResponse::ok(category))
}

/// POST /categories/{slug}/remove-parent
pub async fn remove_parent(
    State(state): State<AppState>,
    actor: Actor,
    Path(slug): Path<String>,
    Json(body): Json<ParentBody>,
) -> HandlerResult<Category> {
    let category = state
        .category_service
        .remove_parent(actor, &slug, body.parent_id)
        .await?;
    Ok(ApiResponse::ok(category))
}

/// GET /categories/{slug}/parents
pub async fn parents(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> HandlerResult<Vec<Category>> {
    let parents = state.category_service.parents(&slug).await?;
    Ok(ApiResponse::ok(parents))
}

/// GET /categories/{slug}/children
pub async fn children(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> HandlerResult<Vec<Category>> {
    let children = state.category_service.children(&slug).await?;
    Ok(ApiResponse::ok(children))
}

/// GET /categories/{slug}/hierarchy
pub async fn hierarchy(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> HandlerResult<Vec<Category>> {
    let ancestors = state.category_service.hierarchy(&slug).await?;
    Ok(ApiResponse::ok(ancestors))
}
