use crate::types::{RoomId, RoomSummaries};
use async_trait::async_trait;
use std::ops::RangeInclusive;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    NotLoaded,
    /// `total` is the number of rooms the server knows about, not the number
    /// loaded so far.
    Loaded { total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCategory {
    People,
    Group,
    Space,
}

/// Server-side room list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomListFilter {
    All(Vec<RoomListFilter>),
    Any(Vec<RoomListFilter>),
    None,
    Category(RoomCategory),
    Favorite,
    Invite,
    Unread,
    Identifiers(Vec<RoomId>),
    NormalizedMatchRoomName(String),
}

impl RoomListFilter {
    /// Remove every `Category(Space)` leaf, descending into composites.
    ///
    /// Returns `None` when the filter itself is the space category.
    pub fn without_space_filter(&self) -> Option<RoomListFilter> {
        match self {
            RoomListFilter::Category(RoomCategory::Space) => None,
            RoomListFilter::All(filters) => Some(RoomListFilter::All(
                filters.iter().filter_map(Self::without_space_filter).collect(),
            )),
            RoomListFilter::Any(filters) => Some(RoomListFilter::Any(
                filters.iter().filter_map(Self::without_space_filter).collect(),
            )),
            other => Some(other.clone()),
        }
    }
}

/// The sync engine's view of the room list.
#[async_trait]
pub trait RoomListService: Send + Sync {
    /// Rooms loaded so far, in server order.
    fn summaries(&self) -> watch::Receiver<RoomSummaries>;

    fn loading_state(&self) -> watch::Receiver<LoadingState>;

    /// Request the next page of rooms.
    async fn load_more(&self) -> Result<(), anyhow::Error>;

    async fn subscribe_to_visible_rooms(&self, room_ids: Vec<RoomId>) -> Result<(), anyhow::Error>;

    async fn update_visible_range(
        &self,
        range: RangeInclusive<usize>,
        pagination_threshold: usize,
    ) -> Result<(), anyhow::Error>;

    async fn update_filter(&self, filter: RoomListFilter) -> Result<(), anyhow::Error>;
}
