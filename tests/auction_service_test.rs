mod helpers;

use helpers::*;
use ripmarket_backend::error::AppError;
use ripmarket_backend::models::AuctionStatus;
use ripmarket_backend::services::{BulkAction, UpdateAuction};
use uuid::Uuid;

// ============================================================================
// CRUD & guards
// ============================================================================

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let state = test_state();
    let owner = seller();
    let first = create_active_auction(&state, owner, 1000, 100, None).await;

    let mut input = ripmarket_backend::services::CreateAuction {
        slug: first.slug.clone(),
        shop_id: Uuid::new_v4(),
        title: "Duplicate".to_string(),
        description: None,
        starting_price: dec(500),
        reserve_price: None,
        bid_increment: dec(50),
        start_time: first.start_time,
        end_time: first.end_time,
    };
    let err = state
        .auction_service
        .create(owner, input.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    input.slug = format!("lot-{}", Uuid::new_v4());
    assert!(state.auction_service.create(owner, input).await.is_ok());
}

#[tokio::test]
async fn test_update_rejects_commercial_changes_once_bids_exist() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();

    let err = state
        .auction_service
        .update(
            owner,
            auction.id,
            UpdateAuction {
                bid_increment: Some(dec(500)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Cosmetic changes are still fine
    let updated = state
        .auction_service
        .update(
            owner,
            auction.id,
            UpdateAuction {
                title: Some("Renamed Lot".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed Lot");
}

#[tokio::test]
async fn test_update_requires_owner_or_admin() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;

    let stranger = buyer();
    let err = state
        .auction_service
        .update(
            stranger,
            auction.id,
            UpdateAuction {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    assert!(state
        .auction_service
        .update(
            admin(),
            auction.id,
            UpdateAuction {
                title: Some("Admin rename".to_string()),
                ..Default::default()
            },
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn test_slug_rename_keeps_index_consistent() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;
    let other = create_active_auction(&state, owner, 1000, 100, None).await;

    // Renaming onto another auction's slug fails
    let err = state
        .auction_service
        .update(
            owner,
            auction.id,
            UpdateAuction {
                slug: Some(other.slug.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A fresh slug resolves, and the old one stops resolving
    let updated = state
        .auction_service
        .update(
            owner,
            auction.id,
            UpdateAuction {
                slug: Some("fresh-slug".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.slug, "fresh-slug");
    assert!(state.auction_service.get("fresh-slug").await.is_ok());
    assert!(state.auction_service.get(&auction.slug).await.is_err());
}

#[tokio::test]
async fn test_delete_and_cancel_fail_once_bids_exist() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();

    let err = state
        .auction_service
        .delete(owner, auction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = state
        .auction_service
        .cancel(owner, auction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Still present and active
    let auction = state.auction_service.get_by_id(auction.id).await.unwrap();
    assert_eq!(auction.status_enum(), AuctionStatus::Active);
}

#[tokio::test]
async fn test_cancel_without_bids_succeeds() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;

    let cancelled = state
        .auction_service
        .cancel(owner, auction.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status_enum(), AuctionStatus::Cancelled);

    // Terminal states accept no further transitions
    let err = state
        .auction_service
        .cancel(owner, auction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// ============================================================================
// Lifecycle & settlement
// ============================================================================

#[tokio::test]
async fn test_end_with_reserve_met_gates_the_winner() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, Some(1100)).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1200)
        .await
        .unwrap();

    let ended = state.auction_service.end(owner, auction.id).await.unwrap();
    assert_eq!(ended.status_enum(), AuctionStatus::Ended);

    // The hold stays blocked and the account is gated until payment
    let account = state.balance_repo.find(alice.user_id).await.unwrap();
    assert_eq!(account.blocked_balance, dec(1200));
    assert!(account.has_unpaid_auctions);

    let won = state.auction_service.get_won_auctions(alice.user_id).await;
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].id, auction.id);
}

#[tokio::test]
async fn test_end_below_reserve_refunds_the_hold() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, Some(5000)).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();

    state.auction_service.end(owner, auction.id).await.unwrap();

    let account = state.balance_repo.find(alice.user_id).await.unwrap();
    assert_eq!(account.available_balance, dec(5000));
    assert_eq!(account.blocked_balance, dec(0));
    assert!(!account.has_unpaid_auctions);

    assert!(state
        .auction_service
        .get_won_auctions(alice.user_id)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_end_queues_behind_in_flight_bid_acceptance() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;

    // Simulate an acceptance in progress by holding the auction's lock
    let guard = state.auction_locks.acquire(auction.id).await;

    let service = state.auction_service.clone();
    let id = auction.id;
    let root = admin();
    let pending = tokio::spawn(async move { service.end(root, id).await });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!pending.is_finished(), "close must wait for the bid path");

    drop(guard);
    let ended = pending.await.unwrap().unwrap();
    assert_eq!(ended.status_enum(), AuctionStatus::Ended);
}

#[tokio::test]
async fn test_cancel_queues_behind_in_flight_bid_acceptance() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, None).await;

    let guard = state.auction_locks.acquire(auction.id).await;

    let service = state.auction_service.clone();
    let id = auction.id;
    let pending = tokio::spawn(async move { service.cancel(owner, id).await });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    drop(guard);
    let cancelled = pending.await.unwrap().unwrap();
    assert_eq!(cancelled.status_enum(), AuctionStatus::Cancelled);
}

#[tokio::test]
async fn test_failed_settlement_leaves_auction_active_for_retry() {
    let state = test_state();
    let owner = seller();
    let auction = create_active_auction(&state, owner, 1000, 100, Some(5000)).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();

    // Drain the hold behind the engine's back so the refund cannot cover
    state
        .balance_repo
        .release(alice.user_id, dec(1100), auction.id)
        .await
        .unwrap();

    let err = state
        .auction_service
        .end(admin(), auction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LedgerInconsistency(_)));

    // Not transitioned: the close is retryable once the books are fixed
    let auction_now = state.auction_service.get_by_id(auction.id).await.unwrap();
    assert_eq!(auction_now.status_enum(), AuctionStatus::Active);

    state
        .balance_repo
        .hold(alice.user_id, dec(1100), auction.id)
        .await
        .unwrap();
    let ended = state
        .auction_service
        .end(admin(), auction.id)
        .await
        .unwrap();
    assert_eq!(ended.status_enum(), AuctionStatus::Ended);
}

#[tokio::test]
async fn test_sweep_continues_past_a_failing_auction() {
    let state = test_state();
    let owner = seller();
    let broken = create_active_auction(&state, owner, 1000, 100, Some(5000)).await;
    let healthy = create_active_auction(&state, owner, 1000, 100, None).await;

    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, broken.id, alice.user_id, 1100)
        .await
        .unwrap();
    state
        .balance_repo
        .release(alice.user_id, dec(1100), broken.id)
        .await
        .unwrap();

    let past = chrono::Utc::now().naive_utc() - chrono::Duration::minutes(1);
    for id in [broken.id, healthy.id] {
        state
            .auction_repo
            .update(id, |a| {
                a.end_time = past;
                Ok(())
            })
            .await
            .unwrap();
    }

    state.auction_service.sweep().await.unwrap();

    // The broken auction stays active for the next tick; the healthy one
    // still closed in the same tick.
    let broken_now = state.auction_service.get_by_id(broken.id).await.unwrap();
    assert_eq!(broken_now.status_enum(), AuctionStatus::Active);
    let healthy_now = state.auction_service.get_by_id(healthy.id).await.unwrap();
    assert_eq!(healthy_now.status_enum(), AuctionStatus::Ended);
}

#[tokio::test]
async fn test_sweep_promotes_and_ends_by_time() {
    let state = test_state();
    let owner = seller();
    let scheduled = create_scheduled_auction(&state, owner, 1000, 100).await;
    let running = create_active_auction(&state, owner, 1000, 100, None).await;

    let now = chrono::Utc::now().naive_utc();
    state
        .auction_repo
        .update(scheduled.id, |a| {
            a.start_time = now - chrono::Duration::minutes(1);
            Ok(())
        })
        .await
        .unwrap();
    state
        .auction_repo
        .update(running.id, |a| {
            a.end_time = now - chrono::Duration::minutes(1);
            Ok(())
        })
        .await
        .unwrap();

    state.auction_service.sweep().await.unwrap();

    let promoted = state.auction_service.get_by_id(scheduled.id).await.unwrap();
    assert_eq!(promoted.status_enum(), AuctionStatus::Active);
    let ended = state.auction_service.get_by_id(running.id).await.unwrap();
    assert_eq!(ended.status_enum(), AuctionStatus::Ended);
}

// ============================================================================
// Watchlist, views, batch & bulk
// ============================================================================

#[tokio::test]
async fn test_watch_toggle_round_trip() {
    let state = test_state();
    let auction = create_active_auction(&state, seller(), 1000, 100, None).await;
    let alice = buyer();

    assert!(state
        .auction_service
        .toggle_watch(alice.user_id, auction.id)
        .await
        .unwrap());
    let watching = state.auction_service.get_watchlist(alice.user_id).await.unwrap();
    assert_eq!(watching.len(), 1);
    assert_eq!(
        state
            .auction_service
            .get_by_id(auction.id)
            .await
            .unwrap()
            .watchers,
        1
    );

    assert!(!state
        .auction_service
        .toggle_watch(alice.user_id, auction.id)
        .await
        .unwrap());
    assert!(state
        .auction_service
        .get_watchlist(alice.user_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_get_by_ids_short_circuits_on_empty() {
    let state = test_state();
    create_active_auction(&state, seller(), 1000, 100, None).await;

    // Empty request means "nothing requested", not "everything"
    assert!(state.auction_service.get_by_ids(&[]).await.is_empty());
}

#[tokio::test]
async fn test_featured_ordering_and_homepage_fill() {
    let state = test_state();
    let owner = seller();
    let a = create_active_auction(&state, owner, 1000, 100, None).await;
    let b = create_active_auction(&state, owner, 1000, 100, None).await;
    let c = create_active_auction(&state, owner, 1000, 100, None).await;

    let root = admin();
    state
        .auction_service
        .set_featured(root, a.id, true, 1)
        .await
        .unwrap();
    state
        .auction_service
        .set_featured(root, b.id, true, 5)
        .await
        .unwrap();

    let featured = state.auction_service.get_featured(10).await;
    assert_eq!(featured.len(), 2);
    assert_eq!(featured[0].id, b.id, "higher priority first");

    // Homepage backfills with live auctions, no duplicates
    let homepage = state.auction_service.get_homepage(10).await;
    assert_eq!(homepage.len(), 3);
    assert!(homepage.iter().any(|x| x.id == c.id));
}

#[tokio::test]
async fn test_bulk_reports_partial_success_per_id() {
    let state = test_state();
    let owner = seller();
    let clean = create_active_auction(&state, owner, 1000, 100, None).await;
    let with_bids = create_active_auction(&state, owner, 1000, 100, None).await;
    let missing = Uuid::new_v4();

    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, with_bids.id, alice.user_id, 1100)
        .await
        .unwrap();

    let ids = [clean.id, with_bids.id, missing];
    let outcome = state
        .auction_service
        .bulk(owner, BulkAction::Cancel, &ids, None)
        .await;

    assert_eq!(outcome.successful_ids, vec![clean.id]);
    assert_eq!(outcome.failed_ids.len(), 2);
    assert_eq!(
        outcome.successful_ids.len() + outcome.failed_ids.len(),
        ids.len()
    );
    assert!(outcome.errors.contains_key(&with_bids.id));
    assert!(outcome.errors.contains_key(&missing));
}
