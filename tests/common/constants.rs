//! Shared constants for end-to-end tests
//!
//! When the seeded notifications change, update only this file and
//! `fixtures.rs`.

// ============================================================================
// Seeded data
// ============================================================================

/// Number of notifications the test server starts with
pub const SEEDED_TOTAL: usize = 45;

/// Every third seeded notification starts out read
pub const SEEDED_UNREAD: usize = 30;

/// Page size used by most feed tests
pub const PAGE_SIZE: usize = 20;

/// Id of the newest seeded notification, unread with a lead link
pub const NEWEST_ID: &str = "notif-01";

/// Link carried by the newest seeded notification
pub const NEWEST_LINK: &str = "/leads/1";

// ============================================================================
// Client settings
// ============================================================================

/// Bearer token the test server expects
pub const TEST_TOKEN: &str = "test-token";

pub const REQUEST_TIMEOUT_SEC: u64 = 5;

// ============================================================================
// Timeouts
// ============================================================================

/// Timeout for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
