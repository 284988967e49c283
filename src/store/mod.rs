//! Application state shared between the feed and its front-end.
//!
//! Each slice is a plain state value with a pure `reduce` function. The
//! [`AppStore`] only serializes access, it is passed around explicitly.

pub mod error_logger;
pub mod filters;
pub mod toast;

use std::sync::{Mutex, MutexGuard};

pub use filters::{FilterAction, FilterState};
pub use toast::{Toast, ToastAction, ToastKind, ToastState};

use crate::notifications::FeedFilter;

#[derive(Debug, Default)]
pub struct AppStore {
    toasts: Mutex<ToastState>,
    filters: Mutex<FilterState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Reducers are pure, a panic elsewhere can't leave a slice half written
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AppStore {
    pub fn new(initial_filter: FeedFilter) -> Self {
        Self {
            toasts: Mutex::new(ToastState::default()),
            filters: Mutex::new(FilterState {
                filter: initial_filter,
            }),
        }
    }

    pub fn dispatch_toast(&self, action: ToastAction) {
        let mut state = lock(&self.toasts);
        *state = toast::reduce(&state, action);
    }

    pub fn dispatch_filter(&self, action: FilterAction) {
        let mut state = lock(&self.filters);
        *state = filters::reduce(&state, action);
    }

    pub fn toasts(&self) -> ToastState {
        lock(&self.toasts).clone()
    }

    pub fn filter(&self) -> FeedFilter {
        lock(&self.filters).filter
    }
}
