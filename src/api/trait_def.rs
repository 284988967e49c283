use async_trait::async_trait;

use super::error::ApiError;
use crate::notifications::NotificationPage;

/// Notification endpoints of the CRM backend.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// `GET /notifications?limit=&offset=&unreadOnly=`
    async fn list_notifications(
        &self,
        limit: usize,
        offset: usize,
        unread_only: bool,
    ) -> Result<NotificationPage, ApiError>;

    /// `GET /notifications/unread-count`
    async fn unread_count(&self) -> Result<u64, ApiError>;

    /// `PUT /notifications/{id}/read`
    async fn mark_read(&self, id: &str) -> Result<(), ApiError>;

    /// `PUT /notifications/mark-all-read`
    async fn mark_all_read(&self) -> Result<(), ApiError>;
}
