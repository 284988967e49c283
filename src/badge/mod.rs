//! Unread notification badge.

mod poller;

pub use poller::{BadgeHandle, UnreadBadgePoller};
