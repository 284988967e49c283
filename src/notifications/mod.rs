//! Client side notification feed state

mod accumulator;
mod models;
mod mutations;

pub use accumulator::{
    FeedAccumulator, FetchState, MergeOutcome, NotificationPage, PageRequest, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use models::{apply_type_filter, FeedFilter, MetaFilter, Notification, NotificationType};
pub use mutations::{MutationId, MutationKind, PendingMutation, PendingMutations};

#[cfg(test)]
pub(crate) use models::test_notification;
