//! Incremental accumulation of paginated notification responses.
//!
//! The accumulator owns the fetch cursor (the list of requested offsets) and
//! the de-duplicated, insertion ordered sequence built from the pages merged
//! so far. It never performs I/O: callers ask it for a [`PageRequest`], run
//! the fetch, then hand the response back through [`FeedAccumulator::merge_page`].

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::models::{MetaFilter, Notification};

/// Page size used by the CRM web client.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound accepted by the notifications endpoint.
pub const MAX_PAGE_SIZE: usize = 100;

/// A single page fetch, tagged with the generation it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    pub meta: MetaFilter,
    pub generation: u64,
}

impl PageRequest {
    pub fn unread_only(&self) -> bool {
        self.meta.unread_only()
    }
}

/// A page as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was applied; `added` counts entries new to the sequence.
    Merged { added: usize },
    /// The page belongs to an abandoned generation and was dropped.
    Stale,
}

/// State of the fetch cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
    /// Everything the server has was merged.
    Exhausted,
}

pub struct FeedAccumulator {
    page_size: usize,
    meta: MetaFilter,
    generation: u64,
    cursor: Vec<usize>,
    loaded_offsets: HashSet<usize>,
    items: Vec<Notification>,
    /// id -> position in `items`
    index: HashMap<String, usize>,
    total: Option<usize>,
    in_flight: Option<PageRequest>,
    /// The last merged page reached the end of the server list.
    exhausted: bool,
}

impl FeedAccumulator {
    pub fn new(page_size: usize, meta: MetaFilter) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            meta,
            generation: 0,
            cursor: vec![0],
            loaded_offsets: HashSet::new(),
            items: Vec::new(),
            index: HashMap::new(),
            total: None,
            in_flight: None,
            exhausted: false,
        }
    }

    /// Drop everything and start over at offset 0 for `meta`.
    ///
    /// Bumps the generation so responses to requests issued before the reset
    /// are discarded on merge.
    pub fn reset(&mut self, meta: MetaFilter) {
        self.meta = meta;
        self.generation += 1;
        self.cursor.clear();
        self.cursor.push(0);
        self.loaded_offsets.clear();
        self.items.clear();
        self.index.clear();
        self.total = None;
        self.in_flight = None;
        self.exhausted = false;
        debug!(
            "Feed reset to {:?}, generation {}",
            self.meta, self.generation
        );
    }

    /// Switch the server side filter, resetting only when it changes.
    pub fn set_meta_filter(&mut self, meta: MetaFilter) -> bool {
        if meta == self.meta {
            return false;
        }
        self.reset(meta);
        true
    }

    /// Request for the first page, if it is neither loaded nor being fetched.
    pub fn initial_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.loaded_offsets.contains(&0) {
            return None;
        }
        Some(self.begin(0))
    }

    /// Append the next offset to the cursor and return the request for it.
    ///
    /// No-op while a fetch is in flight or once everything was loaded.
    pub fn request_next_page(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        let offset = self.cursor.len() * self.page_size;
        self.cursor.push(offset);
        Some(self.begin(offset))
    }

    /// Re-issue the newest cursor offset that never got merged.
    pub fn retry_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let offset = self
            .cursor
            .iter()
            .rev()
            .find(|offset| !self.loaded_offsets.contains(offset))
            .copied()?;
        Some(self.begin(offset))
    }

    /// Re-fetch the first page so new server data replaces the list.
    pub fn refresh_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        Some(self.begin(0))
    }

    fn begin(&mut self, offset: usize) -> PageRequest {
        let request = PageRequest {
            offset,
            limit: self.page_size,
            meta: self.meta,
            generation: self.generation,
        };
        self.in_flight = Some(request);
        request
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        request.generation == self.generation
    }

    /// Apply a fetched page.
    ///
    /// The first page replaces the sequence outright, later pages only append
    /// notifications whose id isn't present yet.
    ///
    /// A page reaching `total`, or an empty page, ends the feed even when
    /// de-duplication left fewer entries than `total`.
    pub fn merge_page(&mut self, request: &PageRequest, page: NotificationPage) -> MergeOutcome {
        if !self.is_current(request) {
            debug!(
                "Discarding stale page at offset {} (generation {} != {})",
                request.offset, request.generation, self.generation
            );
            return MergeOutcome::Stale;
        }

        if request.offset == 0 {
            self.items.clear();
            self.index.clear();
            self.loaded_offsets.clear();
            self.cursor.truncate(1);
        }

        let returned = page.notifications.len();
        let mut added = 0;
        for notification in page.notifications {
            if self.index.contains_key(&notification.id) {
                continue;
            }
            self.index
                .insert(notification.id.clone(), self.items.len());
            self.items.push(notification);
            added += 1;
        }

        self.total = Some(page.total);
        self.exhausted = returned == 0 || request.offset + request.limit >= page.total;
        self.loaded_offsets.insert(request.offset);
        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
        }

        debug!(
            "Merged page at offset {}: {} new, {}/{} accumulated",
            request.offset,
            added,
            self.items.len(),
            page.total
        );
        MergeOutcome::Merged { added }
    }

    /// Release the in-flight marker after a failed fetch.
    ///
    /// The offset stays in the cursor so [`Self::retry_request`] can pick it up.
    pub fn fail_page(&mut self, request: &PageRequest) {
        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
        }
    }

    /// Optimistically flag one entry as read, returning its previous flag.
    pub fn mark_read(&mut self, id: &str) -> Option<bool> {
        let position = *self.index.get(id)?;
        let entry = &mut self.items[position];
        let was_read = entry.is_read;
        entry.is_read = true;
        Some(was_read)
    }

    /// Optimistically flag every entry as read, returning the flipped ids.
    pub fn mark_all_read(&mut self) -> Vec<String> {
        self.items
            .iter_mut()
            .filter(|n| !n.is_read)
            .map(|n| {
                n.is_read = true;
                n.id.clone()
            })
            .collect()
    }

    /// Undo optimistic flips for the entries that are still present.
    pub fn revert_read(&mut self, ids: &[String]) -> usize {
        let mut reverted = 0;
        for id in ids {
            if let Some(&position) = self.index.get(id) {
                self.items[position].is_read = false;
                reverted += 1;
            }
        }
        reverted
    }

    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => !self.exhausted && self.items.len() < total,
            None => false,
        }
    }

    /// True only while the first page is pending and nothing is shown yet.
    pub fn is_loading(&self) -> bool {
        self.loaded_offsets.is_empty()
            && matches!(self.in_flight, Some(PageRequest { offset: 0, .. }))
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn fetch_state(&self) -> FetchState {
        if self.in_flight.is_some() {
            FetchState::Fetching
        } else if self.total.is_some() && !self.has_more() {
            FetchState::Exhausted
        } else {
            FetchState::Idle
        }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn cursor(&self) -> &[usize] {
        &self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn meta_filter(&self) -> MetaFilter {
        self.meta
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }
}
