//! HTTP client for the CRM notification endpoints.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;
use super::models::{DataEnvelope, NotificationListData, SuccessEnvelope, UnreadCountData};
use super::trait_def::NotificationApi;
use crate::notifications::NotificationPage;

/// Client for the notification endpoints of the CRM REST backend.
#[derive(Clone)]
pub struct HttpNotificationApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpNotificationApi {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the CRM API (e.g., "https://crm.example.com/api")
    /// * `auth_token` - Optional bearer token attached to every request
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout_sec: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client setup".to_string(),
                source,
            })?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    /// Get the base URL of the CRM API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn put_mutation(&self, endpoint: &str, path: &str) -> Result<(), ApiError> {
        let response = self.send(endpoint, self.client.put(self.url(path))).await?;
        let envelope: SuccessEnvelope = Self::decode(endpoint, response).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{} was not applied", endpoint)),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list_notifications(
        &self,
        limit: usize,
        offset: usize,
        unread_only: bool,
    ) -> Result<NotificationPage, ApiError> {
        const ENDPOINT: &str = "GET /notifications";
        debug!(
            "Fetching notifications limit={} offset={} unread_only={}",
            limit, offset, unread_only
        );

        let builder = self.client.get(self.url("/notifications")).query(&[
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("unreadOnly", unread_only.to_string()),
        ]);
        let response = self.send(ENDPOINT, builder).await?;
        let envelope: DataEnvelope<NotificationListData> = Self::decode(ENDPOINT, response).await?;
        Ok(envelope.data.into())
    }

    async fn unread_count(&self) -> Result<u64, ApiError> {
        const ENDPOINT: &str = "GET /notifications/unread-count";
        let builder = self.client.get(self.url("/notifications/unread-count"));
        let response = self.send(ENDPOINT, builder).await?;
        let envelope: DataEnvelope<UnreadCountData> = Self::decode(ENDPOINT, response).await?;
        Ok(envelope.data.count)
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", urlencoding::encode(id));
        self.put_mutation("PUT /notifications/:id/read", &path).await
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.put_mutation(
            "PUT /notifications/mark-all-read",
            "/notifications/mark-all-read",
        )
        .await
    }
}
