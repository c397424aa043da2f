mod helpers;

use helpers::*;
use ripmarket_backend::error::AppError;
use ripmarket_backend::models::LedgerEntryType;
use ripmarket_backend::repositories::AccountFilter;
use rust_decimal::Decimal;
use uuid::Uuid;

// ============================================================================
// Admin adjustments
// ============================================================================

#[tokio::test]
async fn test_adjust_requires_admin_role() {
    let state = test_state();
    let target = Uuid::new_v4();

    let err = state
        .ledger_service
        .adjust(buyer(), target, dec(100), "goodwill credit")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let (account, entry) = state
        .ledger_service
        .adjust(admin(), target, dec(100), "goodwill credit")
        .await
        .unwrap();
    assert_eq!(account.available_balance, dec(100));
    assert_eq!(entry.entry_type, LedgerEntryType::Adjustment);
    assert!(entry.actor.is_some());
}

#[tokio::test]
async fn test_adjust_without_reason_is_rejected_before_mutation() {
    let state = test_state();
    let target = Uuid::new_v4();
    seed_balance(&state, target, 1000).await;

    let err = state
        .ledger_service
        .adjust(admin(), target, dec(-100), "")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(
        state.balance_repo.find(target).await.unwrap().available_balance,
        dec(1000)
    );
}

#[tokio::test]
async fn test_adjust_never_drives_available_negative() {
    let state = test_state();
    let target = Uuid::new_v4();
    seed_balance(&state, target, 100).await;

    let err = state
        .ledger_service
        .adjust(admin(), target, dec(-500), "chargeback")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// ============================================================================
// Conservation across a full bidding round
// ============================================================================

#[tokio::test]
async fn test_totals_are_conserved_across_bid_and_outbid() {
    let state = test_state();
    let auction = create_active_auction(&state, seller(), 1000, 100, None).await;
    let alice = buyer();
    let bob = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    seed_balance(&state, bob.user_id, 3000).await;

    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();
    place_bid(&state, auction.id, bob.user_id, 1200)
        .await
        .unwrap();
    place_bid(&state, auction.id, alice.user_id, 1400)
        .await
        .unwrap();

    // Holds move money between buckets, never create or destroy it
    let alice_acct = state.balance_repo.find(alice.user_id).await.unwrap();
    assert_eq!(alice_acct.total(), dec(5000));
    let bob_acct = state.balance_repo.find(bob.user_id).await.unwrap();
    assert_eq!(bob_acct.total(), dec(3000));

    let stats = state.balance_repo.stats().await;
    assert_eq!(stats.total_available + stats.total_blocked, dec(8000));
    assert_eq!(stats.total_blocked, dec(1400));
}

#[tokio::test]
async fn test_ledger_entries_carry_before_after_snapshots() {
    let state = test_state();
    let auction = create_active_auction(&state, seller(), 1000, 100, None).await;
    let alice = buyer();
    seed_balance(&state, alice.user_id, 5000).await;
    place_bid(&state, auction.id, alice.user_id, 1100)
        .await
        .unwrap();

    let entries = state
        .ledger_service
        .entries(admin(), alice.user_id, 50)
        .await
        .unwrap();
    // Seed adjustment plus the hold
    assert_eq!(entries.len(), 2);

    let hold = entries
        .iter()
        .find(|e| e.entry_type == LedgerEntryType::Hold)
        .expect("hold entry present");
    assert_eq!(hold.available_before, dec(5000));
    assert_eq!(hold.available_after, dec(3900));
    assert_eq!(hold.blocked_before, Decimal::ZERO);
    assert_eq!(hold.blocked_after, dec(1100));
    assert_eq!(hold.auction_id, Some(auction.id));
}

// ============================================================================
// Admin views & access control
// ============================================================================

#[tokio::test]
async fn test_ledger_views_are_admin_gated() {
    let state = test_state();
    let alice = buyer();
    seed_balance(&state, alice.user_id, 1000).await;

    assert!(matches!(
        state.ledger_service.stats(buyer()).await.unwrap_err(),
        AppError::Forbidden(_)
    ));
    assert!(matches!(
        state
            .ledger_service
            .get_account(buyer(), alice.user_id)
            .await
            .unwrap_err(),
        AppError::Forbidden(_)
    ));

    // A user may read their own account
    assert!(state
        .ledger_service
        .get_account(alice, alice.user_id)
        .await
        .is_ok());
    assert!(state.ledger_service.stats(admin()).await.is_ok());
}

#[tokio::test]
async fn test_account_listing_filters_and_pages() {
    let state = test_state();
    for _ in 0..3 {
        seed_balance(&state, Uuid::new_v4(), 1000).await;
    }
    let suspended = Uuid::new_v4();
    seed_balance(&state, suspended, 1000).await;
    state
        .ledger_service
        .set_blocked(admin(), suspended, true)
        .await
        .unwrap();

    let (all, total) = state
        .ledger_service
        .list_accounts(admin(), &AccountFilter::default(), 1, 2)
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(all.len(), 2);

    let (blocked, total) = state
        .ledger_service
        .list_accounts(
            admin(),
            &AccountFilter {
                is_blocked: Some(true),
                ..Default::default()
            },
            1,
            20,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(blocked[0].user_id, suspended);
}
