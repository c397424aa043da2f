//! Shared HTTP plumbing for the typed API clients.

use crate::api::envelope::ApiResponse;
use crate::auth::Role;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Errors surfaced by the SDK layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with `success: false`.
    #[error("api error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("response body was missing its data field")]
    MissingData,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// One page of results together with the envelope's pagination block,
/// so callers can keep walking the cursor.
#[derive(Debug, Clone)]
pub struct ClientPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
    pub total: Option<usize>,
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Thin wrapper over `reqwest::Client` that speaks the response envelope
/// and forwards the acting user's identity headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: Option<Uuid>,
    role: Option<Role>,
}

impl ApiClient {
    /// Fails if the underlying client cannot be constructed; a client
    /// without its request timeout would hang callers silently.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
            role: None,
        })
    }

    /// Returns a client that acts as the given user on every request.
    pub fn as_user(mut self, user_id: Uuid, role: Role) -> Self {
        self.user_id = Some(user_id);
        self.role = Some(role);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(user_id) = self.user_id {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        if let Some(role) = self.role {
            builder = builder.header("x-user-role", role.as_str());
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "unknown server error".to_string());
            warn!("API call failed ({}): {}", status, message);
            return Err(ClientError::Api { status, message });
        }
        envelope.data.ok_or(ClientError::MissingData)
    }

    /// Variant for paginated listings: keeps the envelope's pagination
    /// block instead of discarding it.
    async fn send_paginated<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ClientResult<ClientPage<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let envelope: ApiResponse<Vec<T>> = response.json().await?;
        page_from_envelope(envelope, status)
    }

    /// Variant for endpoints whose data payload is `null` or absent.
    async fn send_no_data(&self, builder: RequestBuilder) -> ClientResult<()> {
        let response = builder.send().await?;
        let status = response.status();
        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "unknown server error".to_string());
            warn!("API call failed ({}): {}", status, message);
            return Err(ClientError::Api { status, message });
        }
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> ClientResult<ClientPage<T>> {
        self.send_paginated(self.request(Method::GET, path)).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send_no_data(self.request(Method::DELETE, path)).await
    }
}

fn page_from_envelope<T>(
    envelope: ApiResponse<Vec<T>>,
    status: StatusCode,
) -> ClientResult<ClientPage<T>> {
    if !envelope.success {
        let message = envelope
            .error
            .unwrap_or_else(|| "unknown server error".to_string());
        warn!("API call failed ({}): {}", status, message);
        return Err(ClientError::Api { status, message });
    }
    let items = envelope.data.ok_or(ClientError::MissingData)?;
    let pagination = envelope.pagination;
    Ok(ClientPage {
        items,
        next_cursor: pagination.as_ref().and_then(|p| p.next_cursor),
        has_more: pagination.as_ref().map(|p| p.has_more).unwrap_or(false),
        total: pagination.as_ref().and_then(|p| p.total),
    })
}
