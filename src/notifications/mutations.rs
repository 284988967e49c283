//! Bookkeeping for optimistic read-state mutations.
//!
//! Every local flip is recorded until the server confirms it. A failed
//! mutation hands back the ids that were flipped so the caller can revert them.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MutationId(u64);

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mutation-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    MarkRead(String),
    MarkAllRead,
}

#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: MutationId,
    pub kind: MutationKind,
    /// Ids whose `is_read` flag went from false to true locally.
    pub flipped_ids: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PendingMutations {
    next_id: u64,
    pending: BTreeMap<MutationId, PendingMutation>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, kind: MutationKind, flipped_ids: Vec<String>) -> MutationId {
        self.next_id += 1;
        let id = MutationId(self.next_id);
        self.pending.insert(
            id,
            PendingMutation {
                id,
                kind,
                flipped_ids,
            },
        );
        id
    }

    /// The server accepted the mutation.
    pub fn confirm(&mut self, id: MutationId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// The server rejected the mutation, returns the ids to revert.
    pub fn fail(&mut self, id: MutationId) -> Option<Vec<String>> {
        self.pending.remove(&id).map(|m| m.flipped_ids)
    }

    /// Whether some pending mutation touched `notification_id`.
    pub fn touches(&self, notification_id: &str) -> bool {
        self.pending.values().any(|m| match &m.kind {
            MutationKind::MarkRead(id) => id == notification_id,
            MutationKind::MarkAllRead => m.flipped_ids.iter().any(|id| id == notification_id),
        })
    }

    /// Whether some pending mutation marks `notification_id` read on the
    /// server once it succeeds.
    pub fn covers(&self, notification_id: &str) -> bool {
        self.pending.values().any(|m| match &m.kind {
            MutationKind::MarkRead(id) => id == notification_id,
            MutationKind::MarkAllRead => true,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
