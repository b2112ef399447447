//! Unread counters per space, and the data source that keeps them current.

use crate::config::SpaceNavConfig;
use crate::debounce::ThrottleLatest;
use crate::filter::SpaceAwareRoomList;
use crate::prefs::{BoolPref, PreferenceStore};
use crate::roomlist::RoomListService;
use crate::spaces::{SpaceHierarchyItem, SpaceList, SpaceListDataSource, resolve_selection};
use crate::types::{RoomId, RoomSummary, SelectionPath};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Aggregated counters over a set of rooms.
///
/// `*_messages` sum the raw per-room counts, `*_chats` count rooms with a
/// non-zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpaceUnreadCounts {
    pub mentioned_messages: u64,
    pub notified_messages: u64,
    pub unread_messages: u64,
    pub mentioned_chats: u64,
    pub notified_chats: u64,
    pub unread_chats: u64,
    pub marked_unread_chats: u64,
    pub invite_count: u64,
}

/// Which per-room counters to trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingMode {
    /// Counters computed locally from decrypted events.
    ClientGenerated,
    /// Counters reported by the homeserver.
    ServerGenerated,
}

impl CountingMode {
    /// (mentions, notifications, unread) of `room` in this mode.
    fn counters(self, room: &RoomSummary) -> (u64, u64, u64) {
        match self {
            CountingMode::ClientGenerated => (
                room.num_unread_mentions,
                room.num_unread_notifications,
                room.num_unread_messages,
            ),
            CountingMode::ServerGenerated => (
                room.highlight_count,
                room.notification_count,
                room.unread_count,
            ),
        }
    }
}

impl SpaceUnreadCounts {
    pub fn add_room(self, room: &RoomSummary, mode: CountingMode) -> Self {
        if room.is_invite() {
            // An invite counts as one unread, notifying message and nothing else.
            return Self {
                notified_messages: self.notified_messages + 1,
                unread_messages: self.unread_messages + 1,
                notified_chats: self.notified_chats + 1,
                unread_chats: self.unread_chats + 1,
                invite_count: self.invite_count + 1,
                ..self
            };
        }
        let (mentions, notifications, unread) = mode.counters(room);
        Self {
            mentioned_messages: self.mentioned_messages + mentions,
            notified_messages: self.notified_messages + notifications,
            unread_messages: self.unread_messages + unread,
            mentioned_chats: self.mentioned_chats + u64::from(mentions > 0),
            notified_chats: self.notified_chats + u64::from(notifications > 0),
            unread_chats: self.unread_chats + u64::from(unread > 0),
            marked_unread_chats: self.marked_unread_chats + u64::from(room.is_marked_unread),
            invite_count: self.invite_count,
        }
    }
}

pub fn aggregate<'a, I>(rooms: I, mode: CountingMode) -> SpaceUnreadCounts
where
    I: IntoIterator<Item = &'a RoomSummary>,
{
    rooms
        .into_iter()
        .fold(SpaceUnreadCounts::default(), |counts, room| {
            counts.add_room(room, mode)
        })
}

/// Counts over the rooms `space` matches.
pub fn compute_space_unread_counts(
    space: &SpaceHierarchyItem,
    rooms: &[RoomSummary],
    mode: CountingMode,
) -> SpaceUnreadCounts {
    aggregate(rooms.iter().filter(|room| space.matches(room)), mode)
}

/// Spaces the navigation UI can currently show.
///
/// With nothing selected these are the roots. Otherwise also the selected
/// space's siblings (itself included) and children, and its parent when that
/// parent is not a root.
pub fn visible_spaces<'a>(
    root: &'a [SpaceHierarchyItem],
    selection: &[String],
) -> Vec<&'a SpaceHierarchyItem> {
    let mut visible: Vec<&SpaceHierarchyItem> = root.iter().collect();
    let Some((_, parent_path)) = selection.split_last() else {
        return visible;
    };
    let parent = resolve_selection(root, parent_path);
    if let Some(parent) = parent {
        visible.extend(parent.child_spaces());
    }
    if let Some(selected) = resolve_selection(root, selection) {
        visible.extend(selected.child_spaces());
    }
    if let Some(parent) = parent {
        if !root.iter().any(|item| std::ptr::eq(item, parent)) {
            visible.push(parent);
        }
    }
    visible
}

/// Keeps unread totals and per-space counts in sync with the room list.
pub struct SpaceUnreadCountsDataSource {
    service: Arc<dyn RoomListService>,
    config: SpaceNavConfig,
    total_unread_counts: watch::Sender<SpaceUnreadCounts>,
    enriched_spaces: watch::Sender<Option<SpaceList>>,
}

struct UnreadInputs {
    rooms: ThrottleLatest<Arc<[RoomSummary]>>,
    spaces: watch::Receiver<Option<SpaceList>>,
    selection: watch::Receiver<Option<SelectionPath>>,
    mode: watch::Receiver<CountingMode>,
    space_nav: watch::Receiver<bool>,
}

impl SpaceUnreadCountsDataSource {
    pub fn new(service: Arc<dyn RoomListService>, config: SpaceNavConfig) -> Self {
        Self {
            service,
            config,
            total_unread_counts: watch::Sender::new(SpaceUnreadCounts::default()),
            enriched_spaces: watch::Sender::new(None),
        }
    }

    pub fn total_unread_counts(&self) -> watch::Receiver<SpaceUnreadCounts> {
        self.total_unread_counts.subscribe()
    }

    /// Root spaces with counts attached to the visible ones. `None` while space
    /// navigation is off or not ready.
    pub fn enriched_spaces(&self) -> watch::Receiver<Option<SpaceList>> {
        self.enriched_spaces.subscribe()
    }

    pub fn launch(
        self: &Arc<Self>,
        token: CancellationToken,
        room_list: &SpaceAwareRoomList,
        spaces: &SpaceListDataSource,
        prefs: &PreferenceStore,
    ) -> JoinHandle<()> {
        let inputs = UnreadInputs {
            rooms: ThrottleLatest::new(
                room_list.unfiltered_room_summaries(),
                self.config.unread_throttle,
            ),
            spaces: spaces.all_spaces(),
            selection: room_list.space_selection_hierarchy(),
            mode: prefs.counting_mode(),
            space_nav: prefs.subscribe(BoolPref::SpaceNav),
        };
        tokio::spawn(Arc::clone(self).run(token, inputs))
    }

    async fn run(self: Arc<Self>, token: CancellationToken, mut inputs: UnreadInputs) {
        let Some(mut rooms) = inputs.rooms.next().await else {
            return;
        };
        let mut subscribed: Vec<RoomId> = Vec::new();

        loop {
            let spaces = inputs.spaces.borrow_and_update().clone();
            let selection = inputs.selection.borrow_and_update().clone();
            let mode = *inputs.mode.borrow_and_update();
            let space_nav = *inputs.space_nav.borrow_and_update();

            let (totals, enriched, visible_ids) = match (space_nav, spaces, selection) {
                (true, Some(spaces), Some(selection)) => {
                    let (enriched, visible_ids) = enrich_visible(&spaces, &selection, &rooms, mode);
                    (aggregate(rooms.iter(), mode), Some(enriched), visible_ids)
                }
                _ => (SpaceUnreadCounts::default(), None, Vec::new()),
            };

            if token.is_cancelled() {
                break;
            }
            self.total_unread_counts.send_replace(totals);
            self.enriched_spaces.send_replace(enriched);
            if visible_ids != subscribed {
                debug!(target: "RoomList/Unread", "Subscribing to {} visible spaces", visible_ids.len());
                if let Err(e) = self
                    .service
                    .subscribe_to_visible_rooms(visible_ids.clone())
                    .await
                {
                    warn!(target: "RoomList/Unread", "Failed to subscribe to visible spaces: {e:?}");
                }
                subscribed = visible_ids;
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = inputs.rooms.next() => match next {
                    Some(next) => rooms = next,
                    None => break,
                },
                changed = inputs.spaces.changed() => if changed.is_err() { break },
                changed = inputs.selection.changed() => if changed.is_err() { break },
                changed = inputs.mode.changed() => if changed.is_err() { break },
                changed = inputs.space_nav.changed() => if changed.is_err() { break },
            }
        }
    }
}

fn enrich_visible(
    spaces: &SpaceList,
    selection: &[String],
    rooms: &[RoomSummary],
    mode: CountingMode,
) -> (SpaceList, Vec<RoomId>) {
    let visible = visible_spaces(spaces, selection);
    let visible_ids: HashSet<String> = visible.iter().map(|item| item.selection_id()).collect();

    let mut space_ids = Vec::new();
    for item in &visible {
        if let Some(space) = item.as_space() {
            if !space_ids.contains(&space.room_id) {
                space_ids.push(space.room_id.clone());
            }
        }
    }

    let get_counts = |item: &SpaceHierarchyItem| {
        visible_ids
            .contains(&item.selection_id())
            .then(|| compute_space_unread_counts(item, rooms, mode))
    };
    let enriched: SpaceList = spaces
        .iter()
        .cloned()
        .map(|item| item.enrich(&get_counts))
        .collect();
    (enriched, space_ids)
}
