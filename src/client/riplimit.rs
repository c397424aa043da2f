//! Typed client for the RipLimit admin endpoints.

use crate::api::riplimit::{AdjustBody, BlockBody};
use crate::client::http::{ApiClient, ClientResult};
use crate::models::{LedgerEntry, RipLimitAccount, RipLimitStats};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Client over `/admin/riplimit`. Requests carry whatever identity the
/// underlying [`ApiClient`] was built with; the server enforces the
/// admin requirement.
#[derive(Debug, Clone)]
pub struct RipLimitClient {
    api: ApiClient,
}

impl RipLimitClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> ClientResult<RipLimitStats> {
        self.api.get("/admin/riplimit/stats").await
    }

    pub async fn list_users(
        &self,
        page: usize,
        page_size: usize,
    ) -> ClientResult<Vec<RipLimitAccount>> {
        self.api
            .get(&format!(
                "/admin/riplimit/users?page={}&pageSize={}",
                page, page_size
            ))
            .await
    }

    pub async fn get_user(&self, user_id: Uuid) -> ClientResult<RipLimitAccount> {
        self.api
            .get(&format!("/admin/riplimit/users/{}", user_id))
            .await
    }

    pub async fn adjust(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reason: String,
    ) -> ClientResult<RipLimitAccount> {
        let body = AdjustBody { amount, reason };
        self.api
            .post(&format!("/admin/riplimit/users/{}/adjust", user_id), &body)
            .await
    }

    pub async fn set_blocked(&self, user_id: Uuid, blocked: bool) -> ClientResult<RipLimitAccount> {
        let body = BlockBody { blocked };
        self.api
            .post(&format!("/admin/riplimit/users/{}/block", user_id), &body)
            .await
    }

    pub async fn entries(&self, user_id: Uuid, limit: usize) -> ClientResult<Vec<LedgerEntry>> {
        self.api
            .get(&format!(
                "/admin/riplimit/users/{}/entries?limit={}",
                user_id, limit
            ))
            .await
    }
}
