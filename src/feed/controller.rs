//! Notification feed as seen by the UI.
//!
//! Wires the accumulator to the notification endpoints: page fetches for the
//! infinite scroll, optimistic read mutations, and the filter switch.

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

use super::view::FeedView;
use crate::api::{ApiError, NotificationApi};
use crate::badge::BadgeHandle;
use crate::config::FeedSettings;
use crate::notifications::{
    apply_type_filter, FeedAccumulator, FeedFilter, FetchState, MergeOutcome, MutationId, MutationKind,
    Notification, PageRequest, PendingMutations,
};
use crate::store::{error_logger, AppStore, FilterAction, ToastAction, ToastKind};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to load notifications: {0}")]
    Load(#[source] ApiError),

    #[error("Failed to mark notification {id} as read: {source}")]
    MarkRead {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to mark all notifications as read: {0}")]
    MarkAllRead(#[source] ApiError),

    #[error("Notification not found: {0}")]
    NotFound(String),
}

impl FeedError {
    /// Whether running the same action again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Load(e) | FeedError::MarkAllRead(e) => e.is_transient(),
            FeedError::MarkRead { source, .. } => source.is_transient(),
            FeedError::NotFound(_) => false,
        }
    }
}

struct FeedState {
    accumulator: FeedAccumulator,
    mutations: PendingMutations,
    filter: FeedFilter,
}

impl FeedState {
    /// Keep optimistic flips visible when a page still reports them unread.
    fn reapply_pending(&mut self) {
        let ids: Vec<String> = self
            .accumulator
            .items()
            .iter()
            .filter(|n| !n.is_read && self.mutations.touches(&n.id))
            .map(|n| n.id.clone())
            .collect();
        for id in ids {
            self.accumulator.mark_read(&id);
        }
    }
}

pub struct NotificationFeed {
    api: Arc<dyn NotificationApi>,
    store: Arc<AppStore>,
    badge: Option<Arc<BadgeHandle>>,
    preview_size: usize,
    state: Mutex<FeedState>,
}

impl NotificationFeed {
    /// Create a feed starting from the filter currently held by `store`.
    pub fn new(api: Arc<dyn NotificationApi>, store: Arc<AppStore>, settings: &FeedSettings) -> Self {
        let filter = store.filter();
        Self {
            api,
            store,
            badge: None,
            preview_size: settings.preview_size,
            state: Mutex::new(FeedState {
                accumulator: FeedAccumulator::new(settings.page_size, filter.meta()),
                mutations: PendingMutations::new(),
                filter,
            }),
        }
    }

    /// Attach the unread badge so read mutations keep it in step.
    pub fn with_badge(mut self, badge: Arc<BadgeHandle>) -> Self {
        self.badge = Some(badge);
        self
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the first page unless it is already loaded or in flight.
    pub async fn load_first_page(&self) -> Result<bool, FeedError> {
        let request = self.state().accumulator.initial_request();
        self.run_request(request).await
    }

    /// Infinite scroll trigger, called when the sentinel becomes visible.
    ///
    /// Returns false when nothing was fetched: a page is already in flight or
    /// the feed is exhausted.
    pub async fn on_sentinel_visible(&self) -> Result<bool, FeedError> {
        let request = self.state().accumulator.request_next_page();
        self.run_request(request).await
    }

    /// Re-issue the page whose fetch failed.
    pub async fn retry(&self) -> Result<bool, FeedError> {
        let request = self.state().accumulator.retry_request();
        self.run_request(request).await
    }

    /// Re-fetch the first page, replacing the list with the server's view.
    pub async fn refresh(&self) -> Result<bool, FeedError> {
        let request = self.state().accumulator.refresh_request();
        self.run_request(request).await
    }

    async fn run_request(&self, request: Option<PageRequest>) -> Result<bool, FeedError> {
        match request {
            Some(request) => self.fetch(request).await.map(|_| true),
            None => Ok(false),
        }
    }

    async fn fetch(&self, request: PageRequest) -> Result<MergeOutcome, FeedError> {
        let result = self
            .api
            .list_notifications(request.limit, request.offset, request.unread_only())
            .await;

        let mut state = self.state();
        match result {
            Ok(page) => {
                let outcome = state.accumulator.merge_page(&request, page);
                if outcome != MergeOutcome::Stale {
                    state.reapply_pending();
                }
                Ok(outcome)
            }
            Err(e) => {
                let current = request.generation == state.accumulator.generation();
                state.accumulator.fail_page(&request);
                drop(state);
                if current {
                    error_logger::report(&self.store, "Failed to load notifications", &e);
                } else {
                    debug!("Ignoring failure of abandoned page request: {}", e);
                }
                Err(FeedError::Load(e))
            }
        }
    }

    /// Switch the active filter.
    ///
    /// A change of meta filter resets the feed and loads the first page of the
    /// new query; a type filter only changes the view. Returns whether the
    /// feed was reset.
    pub async fn set_filter(&self, filter: FeedFilter) -> Result<bool, FeedError> {
        self.store.dispatch_filter(FilterAction::SetFilter(filter));
        let reset = {
            let mut state = self.state();
            state.filter = filter;
            state.accumulator.set_meta_filter(filter.meta())
        };

        if reset {
            info!("Notification filter changed to {}, reloading", filter);
            self.load_first_page().await?;
        }
        Ok(reset)
    }

    /// Optimistically mark one notification read and tell the server.
    ///
    /// The local flag is reverted if the server call fails.
    pub async fn mark_read(&self, id: &str) -> Result<(), FeedError> {
        let mutation = self.begin_mark_read(id);

        let result = self.api.mark_read(id).await;
        self.finish_mutation(mutation, result.is_ok());

        result.map_err(|source| {
            error_logger::report(&self.store, "Failed to mark notification as read", &source);
            FeedError::MarkRead {
                id: id.to_string(),
                source,
            }
        })
    }

    /// Optimistically mark every loaded notification read and tell the server.
    ///
    /// Returns how many entries were flipped locally.
    pub async fn mark_all_read(&self) -> Result<usize, FeedError> {
        let (mutation, flipped) = {
            let mut state = self.state();
            let flipped = state.accumulator.mark_all_read();
            if let Some(badge) = &self.badge {
                badge.adjust_down(flipped.len() as u64);
            }
            let count = flipped.len();
            (state.mutations.begin(MutationKind::MarkAllRead, flipped), count)
        };

        let result = self.api.mark_all_read().await;
        self.finish_mutation(mutation, result.is_ok());

        match result {
            Ok(()) => {
                self.store.dispatch_toast(ToastAction::Show {
                    kind: ToastKind::Success,
                    message: "All notifications marked as read".to_string(),
                });
                Ok(flipped)
            }
            Err(e) => {
                error_logger::report(&self.store, "Failed to mark all notifications as read", &e);
                Err(FeedError::MarkAllRead(e))
            }
        }
    }

    fn begin_mark_read(&self, id: &str) -> MutationId {
        let mut state = self.state();
        let flipped = match state.accumulator.mark_read(id) {
            Some(false) => vec![id.to_string()],
            _ => Vec::new(),
        };
        if let Some(badge) = &self.badge {
            badge.adjust_down(flipped.len() as u64);
        }
        state
            .mutations
            .begin(MutationKind::MarkRead(id.to_string()), flipped)
    }

    fn finish_mutation(&self, mutation: MutationId, succeeded: bool) {
        {
            let mut state = self.state();
            if succeeded {
                state.mutations.confirm(mutation);
            } else if let Some(ids) = state.mutations.fail(mutation) {
                // Ids another pending mutation also marks read stay read
                let ids: Vec<String> = ids
                    .into_iter()
                    .filter(|id| !state.mutations.covers(id))
                    .collect();
                let reverted = state.accumulator.revert_read(&ids);
                debug!("Reverted {} optimistic reads of {}", reverted, mutation);
            }
        }
        // The server count is the source of truth either way
        if let Some(badge) = &self.badge {
            badge.refresh_now();
        }
    }

    /// Handle a click on a list entry: mark it read and return its link.
    ///
    /// A failed read mutation doesn't block navigation, it is already
    /// reported through the toasts.
    pub async fn on_item_click(&self, id: &str) -> Result<Option<String>, FeedError> {
        let (is_read, link) = {
            let state = self.state();
            let notification = state
                .accumulator
                .get(id)
                .ok_or_else(|| FeedError::NotFound(id.to_string()))?;
            (notification.is_read, notification.link.clone())
        };

        if !is_read {
            if let Err(e) = self.mark_read(id).await {
                debug!("Navigating despite failed read mutation: {}", e);
            }
        }
        Ok(link)
    }

    /// Callback of the "mark all as read" button.
    pub async fn on_mark_all_read(&self) -> Result<usize, FeedError> {
        self.mark_all_read().await
    }

    pub fn view(&self) -> FeedView {
        let state = self.state();
        let accumulator = &state.accumulator;
        FeedView {
            items: apply_type_filter(accumulator.items(), state.filter),
            filter: state.filter,
            is_loading: accumulator.is_loading(),
            is_fetching: accumulator.is_fetching(),
            has_more: accumulator.has_more(),
            total: accumulator.total(),
        }
    }

    /// The newest entries for the dropdown preview.
    pub fn preview(&self) -> Vec<Notification> {
        let mut items = self.view().items;
        items.truncate(self.preview_size);
        items
    }

    pub fn filter(&self) -> FeedFilter {
        self.state().filter
    }

    pub fn fetch_state(&self) -> FetchState {
        self.state().accumulator.fetch_state()
    }

    pub fn cursor(&self) -> Vec<usize> {
        self.state().accumulator.cursor().to_vec()
    }

    pub fn pending_mutations(&self) -> usize {
        self.state().mutations.len()
    }

    pub fn badge(&self) -> Option<&Arc<BadgeHandle>> {
        self.badge.as_ref()
    }
}
