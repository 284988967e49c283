use crate::notifications::{FeedFilter, Notification};

/// Snapshot of what the notification list shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    /// Accumulated notifications after the type filter.
    pub items: Vec<Notification>,
    pub filter: FeedFilter,
    /// First page pending, nothing to show yet.
    pub is_loading: bool,
    /// Any page in flight.
    pub is_fetching: bool,
    pub has_more: bool,
    /// Server side total for the active meta filter.
    pub total: Option<usize>,
}

impl FeedView {
    /// Everything was loaded, the list shows its end-of-feed message.
    pub fn end_reached(&self) -> bool {
        self.total.is_some() && !self.has_more && !self.is_fetching
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }
}
