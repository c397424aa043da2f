//! Repository for RipLimit accounts and ledger entries.
//!
//! Every mutation runs under a single writer lock over both the account map
//! and the entry log, so each operation is atomic, including the compound
//! bid movement that touches two accounts. Each movement appends a ledger
//! entry with before/after snapshots of both buckets.

use crate::error::StoreError;
use crate::models::{LedgerEntry, LedgerEntryType, RipLimitAccount, RipLimitStats};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Filters for the admin account listing
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub has_unpaid: Option<bool>,
    pub is_blocked: Option<bool>,
}

/// The displaced highest bidder whose hold is released in the same
/// atomic unit that blocks the new bidder's amount
#[derive(Debug, Clone, Copy)]
pub struct OutbidRelease {
    pub user_id: Uuid,
    pub amount: Decimal,
}

struct Inner {
    accounts: HashMap<Uuid, RipLimitAccount>,
    entries: Vec<LedgerEntry>,
}

pub struct BalanceRepository {
    inner: RwLock<Inner>,
}

impl Default for BalanceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                accounts: HashMap::new(),
                entries: Vec::new(),
            }),
        }
    }

    /// Get or create a user's account
    pub async fn get_or_create(&self, user_id: Uuid) -> RipLimitAccount {
        let mut inner = self.inner.write().await;
        inner
            .accounts
            .entry(user_id)
            .or_insert_with(|| RipLimitAccount::new(user_id))
            .clone()
    }

    pub async fn find(&self, user_id: Uuid) -> Option<RipLimitAccount> {
        self.inner.read().await.accounts.get(&user_id).cloned()
    }

    /// Move `amount` from available to blocked against an open bid
    pub async fn hold(
        &self,
        user_id: Uuid,
        amount: Decimal,
        auction_id: Uuid,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;
        hold_locked(&mut inner, user_id, amount, auction_id)?;
        Ok(inner.accounts[&user_id].clone())
    }

    /// Move `amount` back from blocked to available.
    ///
    /// Fails with a ledger inconsistency if the blocked bucket cannot cover
    /// the release; that is a bookkeeping bug, never clamped.
    pub async fn release(
        &self,
        user_id: Uuid,
        amount: Decimal,
        auction_id: Uuid,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;
        unblock_locked(
            &mut inner,
            user_id,
            amount,
            auction_id,
            LedgerEntryType::Release,
        )?;
        Ok(inner.accounts[&user_id].clone())
    }

    /// Refund a standing hold (reserve not met, auction cancelled by admin
    /// workflow). Same movement as a release, distinct ledger entry type.
    pub async fn refund_hold(
        &self,
        user_id: Uuid,
        amount: Decimal,
        auction_id: Uuid,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;
        unblock_locked(
            &mut inner,
            user_id,
            amount,
            auction_id,
            LedgerEntryType::Refund,
        )?;
        Ok(inner.accounts[&user_id].clone())
    }

    /// Execute the balance movements of one bid acceptance as a single
    /// atomic unit: release the bidder's prior hold on this auction (ceiling
    /// raise), block the new amount, and release the displaced highest
    /// bidder's hold.
    ///
    /// Only the incremental delta over `prior_hold` must be available.
    pub async fn apply_bid_hold(
        &self,
        bidder: Uuid,
        amount: Decimal,
        prior_hold: Decimal,
        outbid: Option<OutbidRelease>,
        auction_id: Uuid,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;

        let account = inner
            .accounts
            .entry(bidder)
            .or_insert_with(|| RipLimitAccount::new(bidder));
        let required = amount - prior_hold;
        if account.available_balance < required {
            return Err(StoreError::InsufficientBalance {
                available: account.available_balance,
                required,
            });
        }

        if prior_hold > Decimal::ZERO {
            unblock_locked(
                &mut inner,
                bidder,
                prior_hold,
                auction_id,
                LedgerEntryType::Release,
            )?;
        }
        hold_locked(&mut inner, bidder, amount, auction_id)?;

        if let Some(outbid) = outbid {
            unblock_locked(
                &mut inner,
                outbid.user_id,
                outbid.amount,
                auction_id,
                LedgerEntryType::Release,
            )?;
        }

        Ok(inner.accounts[&bidder].clone())
    }

    /// Admin adjustment: an explicit signed delta applied to the available
    /// balance. The mandatory reason is checked before any mutation and the
    /// entry records actor and before/after snapshots.
    pub async fn adjust(
        &self,
        user_id: Uuid,
        signed_amount: Decimal,
        reason: &str,
        actor: Uuid,
    ) -> Result<(RipLimitAccount, LedgerEntry), StoreError> {
        if reason.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "adjustment reason is required".into(),
            ));
        }

        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .entry(user_id)
            .or_insert_with(|| RipLimitAccount::new(user_id));

        let after = account.available_balance + signed_amount;
        if after < Decimal::ZERO {
            return Err(StoreError::InvalidInput(format!(
                "adjustment would drive available balance negative ({})",
                after
            )));
        }

        let before = snapshot(account);
        account.available_balance = after;
        account.updated_at = now();
        check(account)?;
        let account = account.clone();

        let entry = push_entry(
            &mut inner,
            &account,
            before,
            LedgerEntryType::Adjustment,
            signed_amount,
            None,
            Some(reason.to_string()),
            Some(actor),
        );

        Ok((account, entry))
    }

    /// Flag a won auction: the winner's hold stays blocked and the account
    /// is gated until payment clears
    pub async fn settle_won(
        &self,
        user_id: Uuid,
        amount: Decimal,
        auction_id: Uuid,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        let before = snapshot(account);
        account.has_unpaid_auctions = true;
        account.updated_at = now();
        let account = account.clone();

        push_entry(
            &mut inner,
            &account,
            before,
            LedgerEntryType::WonSettlement,
            amount,
            Some(auction_id),
            None,
            None,
        );

        Ok(account)
    }

    /// Admin block/unblock toggle
    pub async fn set_blocked(
        &self,
        user_id: Uuid,
        blocked: bool,
    ) -> Result<RipLimitAccount, StoreError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .entry(user_id)
            .or_insert_with(|| RipLimitAccount::new(user_id));
        account.is_blocked = blocked;
        account.updated_at = now();
        Ok(account.clone())
    }

    /// Ledger history for a user, newest first
    pub async fn entries_for_user(&self, user_id: Uuid, limit: usize) -> Vec<LedgerEntry> {
        let inner = self.inner.read().await;
        let mut entries: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        entries
    }

    /// Aggregate figures for the admin dashboard
    pub async fn stats(&self) -> RipLimitStats {
        let inner = self.inner.read().await;
        let mut stats = RipLimitStats {
            total_accounts: 0,
            total_available: Decimal::ZERO,
            total_blocked: Decimal::ZERO,
            blocked_accounts: 0,
            accounts_with_unpaid: 0,
        };
        for account in inner.accounts.values() {
            stats.total_accounts += 1;
            stats.total_available += account.available_balance;
            stats.total_blocked += account.blocked_balance;
            if account.is_blocked {
                stats.blocked_accounts += 1;
            }
            if account.has_unpaid_auctions {
                stats.accounts_with_unpaid += 1;
            }
        }
        stats
    }

    /// Page/pageSize listing for the admin dashboard; returns the page and
    /// the total matching count
    pub async fn list(
        &self,
        filter: &AccountFilter,
        page: usize,
        page_size: usize,
    ) -> (Vec<RipLimitAccount>, usize) {
        let inner = self.inner.read().await;
        let mut matched: Vec<RipLimitAccount> = inner
            .accounts
            .values()
            .filter(|a| {
                if let Some(has_unpaid) = filter.has_unpaid {
                    if a.has_unpaid_auctions != has_unpaid {
                        return false;
                    }
                }
                if let Some(is_blocked) = filter.is_blocked {
                    if a.is_blocked != is_blocked {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let total = matched.len();
        let page = page.max(1);
        let page_size = if page_size == 0 {
            20
        } else {
            page_size.min(100)
        };
        let items = matched
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        (items, total)
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn snapshot(account: &RipLimitAccount) -> (Decimal, Decimal) {
    (account.available_balance, account.blocked_balance)
}

fn check(account: &RipLimitAccount) -> Result<(), StoreError> {
    account
        .check_invariants()
        .map_err(StoreError::LedgerInconsistency)
}

fn hold_locked(
    inner: &mut Inner,
    user_id: Uuid,
    amount: Decimal,
    auction_id: Uuid,
) -> Result<(), StoreError> {
    let account = inner
        .accounts
        .entry(user_id)
        .or_insert_with(|| RipLimitAccount::new(user_id));
    if account.available_balance < amount {
        return Err(StoreError::InsufficientBalance {
            available: account.available_balance,
            required: amount,
        });
    }

    let before = snapshot(account);
    account.available_balance -= amount;
    account.blocked_balance += amount;
    account.updated_at = now();
    check(account)?;
    let account = account.clone();

    push_entry(
        inner,
        &account,
        before,
        LedgerEntryType::Hold,
        amount,
        Some(auction_id),
        None,
        None,
    );
    Ok(())
}

fn unblock_locked(
    inner: &mut Inner,
    user_id: Uuid,
    amount: Decimal,
    auction_id: Uuid,
    entry_type: LedgerEntryType,
) -> Result<(), StoreError> {
    let account = inner
        .accounts
        .get_mut(&user_id)
        .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;
    if account.blocked_balance < amount {
        return Err(StoreError::LedgerInconsistency(format!(
            "release of {} exceeds blocked balance {} for user {}",
            amount, account.blocked_balance, user_id
        )));
    }

    let before = snapshot(account);
    account.blocked_balance -= amount;
    account.available_balance += amount;
    account.updated_at = now();
    check(account)?;
    let account = account.clone();

    push_entry(
        inner,
        &account,
        before,
        entry_type,
        amount,
        Some(auction_id),
        None,
        None,
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn push_entry(
    inner: &mut Inner,
    account: &RipLimitAccount,
    before: (Decimal, Decimal),
    entry_type: LedgerEntryType,
    amount: Decimal,
    auction_id: Option<Uuid>,
    reason: Option<String>,
    actor: Option<Uuid>,
) -> LedgerEntry {
    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        user_id: account.user_id,
        auction_id,
        entry_type,
        amount,
        available_before: before.0,
        available_after: account.available_balance,
        blocked_before: before.1,
        blocked_after: account.blocked_balance,
        reason,
        actor,
        created_at: now(),
    };
    inner.entries.push(entry.clone());
    entry
}
