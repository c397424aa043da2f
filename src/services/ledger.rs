//! RipLimit admin operations: stats, account listing, adjustments,
//! block/unblock

use crate::auth::Actor;
use crate::error::{AppError, AppResult};
use crate::models::{LedgerEntry, RipLimitAccount, RipLimitStats};
use crate::repositories::{AccountFilter, BalanceRepository};
use crate::services::audit::AuditTrailService;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for RipLimit account administration
pub struct LedgerService {
    balance_repo: Arc<BalanceRepository>,
    audit: Arc<AuditTrailService>,
}

impl LedgerService {
    pub fn new(balance_repo: Arc<BalanceRepository>, audit: Arc<AuditTrailService>) -> Self {
        Self {
            balance_repo,
            audit,
        }
    }

    pub async fn stats(&self, actor: Actor) -> AppResult<RipLimitStats> {
        actor.require_admin()?;
        Ok(self.balance_repo.stats().await)
    }

    pub async fn list_accounts(
        &self,
        actor: Actor,
        filter: &AccountFilter,
        page: usize,
        page_size: usize,
    ) -> AppResult<(Vec<RipLimitAccount>, usize)> {
        actor.require_admin()?;
        Ok(self.balance_repo.list(filter, page, page_size).await)
    }

    pub async fn get_account(&self, actor: Actor, user_id: Uuid) -> AppResult<RipLimitAccount> {
        if !actor.is_admin() && actor.user_id != user_id {
            return Err(AppError::Forbidden("not the account owner".into()));
        }
        Ok(self.balance_repo.get_or_create(user_id).await)
    }

    /// Admin adjustment: explicit signed delta with a mandatory
    /// human-readable reason, audit-logged with before/after snapshots.
    /// An audited, irreversible ledger event, not a silent mutation.
    pub async fn adjust(
        &self,
        actor: Actor,
        user_id: Uuid,
        amount: Decimal,
        reason: &str,
    ) -> AppResult<(RipLimitAccount, LedgerEntry)> {
        actor.require_admin()?;
        if reason.trim().is_empty() {
            return Err(AppError::Validation("adjustment reason is required".into()));
        }

        let (account, entry) = self
            .balance_repo
            .adjust(user_id, amount, reason, actor.user_id)
            .await?;

        if let Err(e) = self.audit.log_balance_adjusted(&entry).await {
            warn!("Failed to audit adjustment {}: {}", entry.id, e);
        }
        info!(
            "Balance adjusted: user={}, amount={}, reason={}, by={}",
            user_id, amount, reason, actor.user_id
        );

        Ok((account, entry))
    }

    pub async fn set_blocked(
        &self,
        actor: Actor,
        user_id: Uuid,
        blocked: bool,
    ) -> AppResult<RipLimitAccount> {
        actor.require_admin()?;
        let account = self.balance_repo.set_blocked(user_id, blocked).await?;
        info!(
            "Account {} {} by {}",
            user_id,
            if blocked { "blocked" } else { "unblocked" },
            actor.user_id
        );
        Ok(account)
    }

    pub async fn entries(&self, actor: Actor, user_id: Uuid, limit: usize) -> AppResult<Vec<LedgerEntry>> {
        if !actor.is_admin() && actor.user_id != user_id {
            return Err(AppError::Forbidden("not the account owner".into()));
        }
        Ok(self.balance_repo.entries_for_user(user_id, limit).await)
    }
}
