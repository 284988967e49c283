//! CRM Notification Feed Library
//!
//! Client side core of the CRM notification centre: paginated feed
//! accumulation, optimistic read state, unread badge polling and the REST
//! client for the notification endpoints.

pub mod api;
pub mod badge;
pub mod config;
pub mod feed;
pub mod notifications;
pub mod store;

// Re-export commonly used types for convenience
pub use api::{ApiError, HttpNotificationApi, NotificationApi};
pub use badge::{BadgeHandle, UnreadBadgePoller};
pub use feed::{FeedError, FeedView, NotificationFeed};
pub use notifications::{FeedFilter, MetaFilter, Notification, NotificationType};
pub use store::AppStore;
