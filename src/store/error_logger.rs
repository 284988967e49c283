use std::fmt::Display;
use tracing::error;

use super::toast::{ToastAction, ToastKind};
use super::AppStore;

/// Generic message shown for failed requests; details only go to the log.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again.";

/// Log a failed operation and surface it to the user as an error toast.
pub fn report<E: Display>(store: &AppStore, context: &str, err: &E) {
    error!("{}: {}", context, err);
    store.dispatch_toast(ToastAction::Show {
        kind: ToastKind::Error,
        message: GENERIC_ERROR_MESSAGE.to_string(),
    });
}
