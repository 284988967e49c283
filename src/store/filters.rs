//! Filter selection of the notifications page.

use crate::notifications::FeedFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub filter: FeedFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    SetFilter(FeedFilter),
}

pub fn reduce(state: &FilterState, action: FilterAction) -> FilterState {
    match action {
        FilterAction::SetFilter(filter) => FilterState { filter },
    }
}
