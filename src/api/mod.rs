//! REST client for the CRM notification endpoints.

mod client;
mod error;
pub mod models;
mod trait_def;

pub use client::HttpNotificationApi;
pub use error::ApiError;
pub use trait_def::NotificationApi;

#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockNotificationApi;
