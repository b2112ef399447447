#![allow(dead_code)]

use roomlist_spaces::roomlist::MemoryRoomListService;
use roomlist_spaces::spaces::SpaceListDataSource;
use roomlist_spaces::store::MemorySelectionStore;
use roomlist_spaces::types::{RoomSummaries, RoomSummary, SelectionPath, SpaceChild, SpaceSummary};
use roomlist_spaces::{PreferenceStore, SpaceAwareRoomList, SpaceNavConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub fn room(id: &str) -> RoomSummary {
    RoomSummary::new(id)
}

pub fn rooms(ids: &[&str]) -> Vec<RoomSummary> {
    ids.iter().map(|id| room(id)).collect()
}

pub fn ids(rooms: &[RoomSummary]) -> Vec<String> {
    rooms.iter().map(|room| room.room_id.to_string()).collect()
}

pub fn path(ids: &[&str]) -> SelectionPath {
    ids.iter().map(|id| id.to_string()).collect()
}

/// `!home` holds `!r1`; `!work` holds `!r2`, `!r4` and the `!eng` space,
/// which holds `!r5`. `!r3` is in no space.
pub fn sample_spaces() -> Vec<SpaceSummary> {
    vec![
        SpaceSummary::new("!home", "Home").with_child(SpaceChild::new("!r1")),
        SpaceSummary::new("!work", "Work")
            .with_child(SpaceChild::new("!r2"))
            .with_child(SpaceChild::new("!r4"))
            .with_child(SpaceChild::new("!eng")),
        SpaceSummary::new("!eng", "Engineering").with_child(SpaceChild::new("!r5")),
    ]
}

pub fn sample_rooms() -> Vec<RoomSummary> {
    rooms(&["!r1", "!r2", "!r3", "!r4", "!r5"])
}

/// The full pipeline wired to in-memory collaborators.
pub struct Harness {
    pub service: Arc<MemoryRoomListService>,
    pub prefs: Arc<PreferenceStore>,
    pub store: Arc<MemorySelectionStore>,
    pub spaces: Arc<SpaceListDataSource>,
    pub room_list: Arc<SpaceAwareRoomList>,
    pub token: CancellationToken,
}

impl Harness {
    pub fn new(
        service: MemoryRoomListService,
        prefs: PreferenceStore,
        store: MemorySelectionStore,
    ) -> Self {
        let service = Arc::new(service);
        let prefs = Arc::new(prefs);
        let store = Arc::new(store);
        let spaces = Arc::new(SpaceListDataSource::new(service.clone(), &prefs));
        let room_list = Arc::new(SpaceAwareRoomList::new(
            service.clone(),
            spaces.clone(),
            store.clone(),
            prefs.clone(),
            SpaceNavConfig::default(),
        ));
        Self {
            service,
            prefs,
            store,
            spaces,
            room_list,
            token: CancellationToken::new(),
        }
    }

    /// Sample rooms and spaces, everything loaded.
    pub fn sample(prefs: PreferenceStore) -> Self {
        let service = MemoryRoomListService::fully_loaded(sample_rooms());
        service.set_spaces(sample_spaces());
        Self::new(service, prefs, MemorySelectionStore::new())
    }

    pub fn launch(&self) {
        self.spaces.launch(self.token.clone());
        self.room_list.launch(self.token.clone());
    }

    /// Wait until the persisted selection has been loaded into the pipeline.
    pub async fn wait_restored(&self) {
        let mut selection = self.room_list.space_selection_hierarchy();
        let restored = tokio::time::timeout(
            Duration::from_secs(30),
            selection.wait_for(Option::is_some),
        )
        .await
        .is_ok_and(|result| result.is_ok());
        assert!(restored, "selection was never restored");
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub async fn wait_for_rooms(rx: &mut watch::Receiver<RoomSummaries>, expected: &[&str]) {
    let matched = tokio::time::timeout(
        Duration::from_secs(30),
        rx.wait_for(|rooms| ids(rooms) == expected),
    )
    .await
    .is_ok_and(|result| result.is_ok());
    assert!(
        matched,
        "timed out waiting for {expected:?}, last value {:?}",
        ids(&rx.borrow())
    );
}
