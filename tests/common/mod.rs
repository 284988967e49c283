//! Common test infrastructure
//!
//! Spawns a mock CRM backend serving the notification endpoints and builds
//! feeds wired to it. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{feed_for, TestServer, PAGE_SIZE};
//!
//! #[tokio::test]
//! async fn test_first_page() {
//!     let server = TestServer::spawn().await;
//!     let (feed, _store) = feed_for(&server, PAGE_SIZE);
//!
//!     feed.load_first_page().await.unwrap();
//!     assert_eq!(feed.view().items.len(), PAGE_SIZE);
//! }
//! ```

mod constants;
mod fixtures;
mod server;

use std::sync::Arc;

use crm_notification_feed::config::FeedSettings;
use crm_notification_feed::{AppStore, FeedFilter, HttpNotificationApi, NotificationFeed};

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::seed_notifications;
pub use server::TestServer;

/// HTTP client pointed at the test server.
#[allow(dead_code)]
pub fn api_for(server: &TestServer) -> Arc<HttpNotificationApi> {
    Arc::new(
        HttpNotificationApi::new(
            server.base_url.clone(),
            Some(TEST_TOKEN.to_string()),
            REQUEST_TIMEOUT_SEC,
        )
        .expect("Failed to build notification client"),
    )
}

/// Feed over the test server starting from the "all" filter.
#[allow(dead_code)]
pub fn feed_for(server: &TestServer, page_size: usize) -> (Arc<NotificationFeed>, Arc<AppStore>) {
    let store = Arc::new(AppStore::new(FeedFilter::All));
    let settings = FeedSettings {
        page_size,
        ..Default::default()
    };
    let feed = NotificationFeed::new(api_for(server), store.clone(), &settings);
    (Arc::new(feed), store)
}
