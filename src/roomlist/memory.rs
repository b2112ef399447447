//! In-memory room list service for tests and the inspection tool.

use super::service::{LoadingState, RoomListFilter, RoomListService};
use crate::spaces::SpaceGraphSource;
use crate::types::{RoomId, RoomSummaries, RoomSummary, SpaceSummary};
use async_trait::async_trait;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

#[derive(Debug, Default, Clone)]
pub struct RecordedCalls {
    pub load_more: usize,
    pub visible_room_subscriptions: Vec<Vec<RoomId>>,
    pub visible_ranges: Vec<(RangeInclusive<usize>, usize)>,
    pub filters: Vec<RoomListFilter>,
}

struct Backing {
    rooms: Vec<RoomSummary>,
    loaded: usize,
}

/// Serves a fixed room list page by page and records every request.
pub struct MemoryRoomListService {
    page_size: usize,
    backing: Mutex<Backing>,
    summaries: watch::Sender<RoomSummaries>,
    loading_state: watch::Sender<LoadingState>,
    spaces: watch::Sender<Arc<[SpaceSummary]>>,
    calls: Mutex<RecordedCalls>,
}

impl MemoryRoomListService {
    /// Empty service that has not loaded anything yet.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            backing: Mutex::new(Backing {
                rooms: Vec::new(),
                loaded: 0,
            }),
            summaries: watch::Sender::new(RoomSummaries::from(Vec::new())),
            loading_state: watch::Sender::new(LoadingState::NotLoaded),
            spaces: watch::Sender::new(Arc::from(Vec::new())),
            calls: Mutex::default(),
        }
    }

    /// Every room is already loaded.
    pub fn fully_loaded(rooms: Vec<RoomSummary>) -> Self {
        let service = Self::new(rooms.len().max(1));
        service.set_rooms(rooms);
        service
    }

    /// Only the first page is loaded; the rest arrives through `load_more`.
    pub fn paged(rooms: Vec<RoomSummary>, page_size: usize) -> Self {
        let service = Self::new(page_size);
        {
            let mut backing = service.backing();
            backing.loaded = page_size.min(rooms.len());
            backing.rooms = rooms;
            service.publish(&backing);
        }
        service
    }

    /// Replace the whole room list, keeping everything loaded.
    pub fn set_rooms(&self, rooms: Vec<RoomSummary>) {
        let mut backing = self.backing();
        backing.loaded = rooms.len();
        backing.rooms = rooms;
        self.publish(&backing);
    }

    pub fn set_spaces(&self, spaces: Vec<SpaceSummary>) {
        self.spaces.send_replace(Arc::from(spaces));
    }

    pub fn set_loading_state(&self, state: LoadingState) {
        self.loading_state.send_replace(state);
    }

    pub fn calls(&self) -> RecordedCalls {
        self.lock_calls().clone()
    }

    fn publish(&self, backing: &Backing) {
        let loaded: RoomSummaries = backing.rooms[..backing.loaded].iter().cloned().collect();
        self.summaries.send_replace(loaded);
        self.loading_state.send_replace(LoadingState::Loaded {
            total: backing.rooms.len(),
        });
    }

    fn backing(&self) -> MutexGuard<'_, Backing> {
        self.backing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_calls(&self) -> MutexGuard<'_, RecordedCalls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RoomListService for MemoryRoomListService {
    fn summaries(&self) -> watch::Receiver<RoomSummaries> {
        self.summaries.subscribe()
    }

    fn loading_state(&self) -> watch::Receiver<LoadingState> {
        self.loading_state.subscribe()
    }

    async fn load_more(&self) -> Result<(), anyhow::Error> {
        self.lock_calls().load_more += 1;
        let mut backing = self.backing();
        backing.loaded = (backing.loaded + self.page_size).min(backing.rooms.len());
        self.publish(&backing);
        Ok(())
    }

    async fn subscribe_to_visible_rooms(&self, room_ids: Vec<RoomId>) -> Result<(), anyhow::Error> {
        self.lock_calls().visible_room_subscriptions.push(room_ids);
        Ok(())
    }

    async fn update_visible_range(
        &self,
        range: RangeInclusive<usize>,
        pagination_threshold: usize,
    ) -> Result<(), anyhow::Error> {
        self.lock_calls()
            .visible_ranges
            .push((range, pagination_threshold));
        Ok(())
    }

    async fn update_filter(&self, filter: RoomListFilter) -> Result<(), anyhow::Error> {
        self.lock_calls().filters.push(filter);
        Ok(())
    }
}

#[async_trait]
impl SpaceGraphSource for MemoryRoomListService {
    fn space_summaries(&self) -> watch::Receiver<Arc<[SpaceSummary]>> {
        self.spaces.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms(n: usize) -> Vec<RoomSummary> {
        (0..n).map(|i| RoomSummary::new(format!("!r{i}"))).collect()
    }

    #[tokio::test]
    async fn test_paged_service_loads_page_by_page() {
        let service = MemoryRoomListService::paged(rooms(5), 2);
        let summaries = service.summaries();
        assert_eq!(summaries.borrow().len(), 2);
        assert_eq!(
            *service.loading_state().borrow(),
            LoadingState::Loaded { total: 5 }
        );

        service.load_more().await.unwrap();
        service.load_more().await.unwrap();
        service.load_more().await.unwrap();
        assert_eq!(summaries.borrow().len(), 5);
        assert_eq!(service.calls().load_more, 3);
    }
}
