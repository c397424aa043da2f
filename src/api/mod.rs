//! HTTP surface: JSON-over-HTTP routes with a uniform response envelope.

pub mod actor;
pub mod auctions;
pub mod categories;
pub mod envelope;
pub mod health;
pub mod riplimit;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Builds the full application router. Static segments are registered
/// before the `:key` catch-all so `/auctions/featured` never resolves
/// as a slug lookup.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Auction listing and views
        .route("/auctions", get(auctions::list).post(auctions::create))
        .route("/auctions/featured", get(auctions::featured))
        .route("/auctions/live", get(auctions::live))
        .route("/auctions/homepage", get(auctions::homepage))
        .route("/auctions/bulk", post(auctions::bulk))
        .route("/auctions/batch", post(auctions::batch))
        .route(
            "/auctions/:key",
            get(auctions::get)
                .put(auctions::update)
                .delete(auctions::delete),
        )
        .route("/auctions/:id/bid", post(auctions::place_bid))
        .route("/auctions/:id/bids", get(auctions::bids))
        .route("/auctions/:id/watch", post(auctions::toggle_watch))
        .route("/auctions/:id/similar", get(auctions::similar))
        .route("/auctions/:id/feature", post(auctions::set_featured))
        .route("/sellers/:id/auctions", get(auctions::seller_auctions))
        // Per-user views
        .route("/users/me/bids", get(auctions::my_bids))
        .route("/users/me/watchlist", get(auctions::watchlist))
        .route("/users/me/won", get(auctions::won))
        // RipLimit administration
        .route("/admin/riplimit/stats", get(riplimit::stats))
        .route("/admin/riplimit/users", get(riplimit::list_users))
        .route("/admin/riplimit/users/:id", get(riplimit::get_user))
        .route("/admin/riplimit/users/:id/adjust", post(riplimit::adjust))
        .route("/admin/riplimit/users/:id/block", post(riplimit::set_blocked))
        .route("/admin/riplimit/users/:id/entries", get(riplimit::entries))
        // Category graph
        .route("/categories", post(categories::create))
        .route("/categories/:slug", get(categories::get))
        .route("/categories/:slug/add-parent", post(categories::add_parent))
        .route(
            "/categories/:slug/remove-parent",
            post(categories::remove_parent),
        )
        .route("/categories/:slug/parents", get(categories::parents))
        .route("/categories/:slug/children", get(categories::children))
        .route("/categories/:slug/hierarchy", get(categories::hierarchy))
        .with_state(state)
}
