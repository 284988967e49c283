//! Notification feed controller exposed to the front-end.

mod controller;
mod view;

pub use controller::{FeedError, NotificationFeed};
pub use view::FeedView;
