mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::*;
use http_body_util::BodyExt;
use ripmarket_backend::api;
use ripmarket_backend::auth::Actor;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> (ripmarket_backend::AppState, Router) {
    let state = test_state();
    let router = api::router(state.clone());
    (state, router)
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request builds")
}

fn get_as(path: &str, actor: Actor) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-user-id", actor.user_id.to_string())
        .header("x-user-role", actor.role.as_str())
        .body(Body::empty())
        .expect("request builds")
}

fn post_as(path: &str, actor: Actor, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("x-user-id", actor.user_id.to_string())
        .header("x-user-role", actor.role.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

// ============================================================================
// Envelope & status codes
// ============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let (_state, router) = app();
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}

#[tokio::test]
async fn test_missing_auction_is_404_with_error_envelope() {
    let (_state, router) = app();
    let response = router
        .oneshot(get(&format!("/auctions/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_mutation_without_identity_is_403() {
    let (state, router) = app();
    let auction = create_active_auction(&state, seller(), 1000, 100, None).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/auctions/{}/bid", auction.id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "amount": "1100" }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_endpoints_reject_plain_users() {
    let (_state, router) = app();
    let response = router
        .oneshot(get_as("/admin/riplimit/stats", buyer()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Bid flow over HTTP
// ============================================================================

#[tokio::test]
async fn test_bid_round_trip_over_http() {
    let (state, router) = app();
    let auction = create_active_auction(&state, seller(), 1000, 100, None).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;

    let response = router
        .clone()
        .oneshot(post_as(
            &format!("/auctions/{}/bid", auction.id),
            alice,
            json!({ "amount": "1100" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["amount"], json!("1100"));

    // A too-low follow-up maps to 409 with the rejection reason
    let response = router
        .oneshot(post_as(
            &format!("/auctions/{}/bid", auction.id),
            alice,
            json!({ "amount": "1150" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_listing_carries_pagination_block() {
    let (state, router) = app();
    let owner = seller();
    for _ in 0..3 {
        create_active_auction(&state, owner, 1000, 100, None).await;
    }

    let response = router.oneshot(get("/auctions?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["hasMore"], json!(true));
    assert!(body["pagination"]["nextCursor"].is_string());
}

#[tokio::test]
async fn test_static_routes_win_over_slug_lookup() {
    let (state, router) = app();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;
    state
        .auction_service
        .set_featured(admin(), auction.id, true, 1)
        .await
        .unwrap();

    // "featured" must never be treated as a slug
    let response = router.oneshot(get("/auctions/featured")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Categories over HTTP
// ============================================================================

#[tokio::test]
async fn test_category_graph_over_http() {
    let (_state, router) = app();
    let root = admin();

    let response = router
        .clone()
        .oneshot(post_as(
            "/categories",
            root,
            json!({ "slug": "audio", "name": "Audio" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let audio_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router
        .clone()
        .oneshot(post_as(
            "/categories",
            root,
            json!({ "slug": "amps", "name": "Amplifiers" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(post_as(
            "/categories/amps/add-parent",
            root,
            json!({ "parentId": audio_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get("/categories/amps/hierarchy"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["slug"], json!("audio"));
}
