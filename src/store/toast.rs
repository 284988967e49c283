//! Toast messages shown to the user.

/// Number of toasts kept, oldest are dropped first.
pub const MAX_TOASTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastAction {
    Show { kind: ToastKind, message: String },
    Dismiss(u64),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastState {
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

pub fn reduce(state: &ToastState, action: ToastAction) -> ToastState {
    match action {
        ToastAction::Show { kind, message } => {
            let id = state.next_id + 1;
            let mut toasts = state.toasts.clone();
            toasts.push(Toast { id, kind, message });
            if toasts.len() > MAX_TOASTS {
                let overflow = toasts.len() - MAX_TOASTS;
                toasts.drain(..overflow);
            }
            ToastState {
                toasts,
                next_id: id,
            }
        }
        ToastAction::Dismiss(id) => ToastState {
            toasts: state
                .toasts
                .iter()
                .filter(|t| t.id != id)
                .cloned()
                .collect(),
            next_id: state.next_id,
        },
        ToastAction::Clear => ToastState {
            toasts: Vec::new(),
            next_id: state.next_id,
        },
    }
}
