//! Space-aware view over the upstream room list.
//!
//! [`SpaceAwareRoomList`] sits between the sync engine's room list and the UI.
//! While space navigation is enabled it restores and persists the selected
//! space, resolves it against the live hierarchy and publishes only the rooms
//! of that space. While disabled it is a passthrough.
//!
//! Every stage is one task over `watch` inputs. A stage recomputes from the
//! latest snapshot of all of its inputs whenever any of them changes, so an
//! emission never mixes old and new values.

use crate::config::SpaceNavConfig;
use crate::debounce::QuiescenceTimer;
use crate::prefs::{BoolPref, PreferenceStore, PseudoSpaceSettings};
use crate::roomlist::{
    EXTENDED_VISIBILITY_RANGE_SIZE, LoadingState, PAGINATION_THRESHOLD, RoomListFilter,
    RoomListService, load_all_incrementally, translate_visible_range,
};
use crate::spaces::{SpaceHierarchyItem, SpaceList, SpaceListDataSource, resolve_selection};
use crate::store::SpaceSelectionStore;
use crate::types::{RoomId, RoomSummaries, RoomSummary, SelectionPath};
use log::{debug, error, info, trace, warn};
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TARGET: &str = "RoomList/SpaceNav";

/// A resolved selection together with the root list it was resolved in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSpace {
    pub item: SpaceHierarchyItem,
    pub root: SpaceList,
}

/// Outcome of resolving the stored selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceResolution {
    pub selected: Option<SelectedSpace>,
    /// `false` only when a selection exists, the hierarchy is ready, and the
    /// selection does not resolve in it.
    pub found: bool,
}

impl SpaceResolution {
    fn unselected() -> Self {
        Self {
            selected: None,
            found: true,
        }
    }
}

/// Resolve `selection` against the current root list.
///
/// While the hierarchy is still loading nothing is selected but the selection
/// counts as found: a space can show up later with a paginating sync.
pub fn resolve_selected_space(
    selection: Option<&[String]>,
    spaces: Option<&SpaceList>,
    settings: &PseudoSpaceSettings,
) -> SpaceResolution {
    let Some(selection) = selection.filter(|s| !s.is_empty()) else {
        return SpaceResolution::unselected();
    };
    let Some(root) =
        spaces.filter(|root| !root.is_empty() || settings.has_space_independent_pseudo_space())
    else {
        return SpaceResolution::unselected();
    };
    match resolve_selection(root, selection) {
        Some(item) => SpaceResolution {
            selected: Some(SelectedSpace {
                item: item.clone(),
                root: Arc::clone(root),
            }),
            found: true,
        },
        None => SpaceResolution {
            selected: None,
            found: false,
        },
    }
}

/// Rooms to show for the current selection.
pub fn filter_rooms(
    selected: Option<&SelectedSpace>,
    rooms: &RoomSummaries,
    allow_all_rooms: bool,
) -> RoomSummaries {
    match selected {
        Some(selected) => selected.item.apply_filter(rooms),
        None if allow_all_rooms => Arc::clone(rooms),
        None => RoomSummaries::from(Vec::new()),
    }
}

pub struct SpaceAwareRoomList {
    service: Arc<dyn RoomListService>,
    spaces: Arc<SpaceListDataSource>,
    store: Arc<dyn SpaceSelectionStore>,
    prefs: Arc<PreferenceStore>,
    config: SpaceNavConfig,
    selection: watch::Sender<Option<SelectionPath>>,
    selected_space: watch::Sender<Option<SelectedSpace>>,
    filtered: watch::Sender<RoomSummaries>,
    subscribe_task: Mutex<Option<JoinHandle<()>>>,
}

impl SpaceAwareRoomList {
    pub fn new(
        service: Arc<dyn RoomListService>,
        spaces: Arc<SpaceListDataSource>,
        store: Arc<dyn SpaceSelectionStore>,
        prefs: Arc<PreferenceStore>,
        config: SpaceNavConfig,
    ) -> Self {
        Self {
            service,
            spaces,
            store,
            prefs,
            config,
            selection: watch::Sender::new(None),
            selected_space: watch::Sender::new(None),
            filtered: watch::Sender::new(RoomSummaries::from(Vec::new())),
            subscribe_task: Mutex::new(None),
        }
    }

    /// Select a space by its path from the root. Last write wins.
    pub fn update_space_selection(&self, selection: SelectionPath) {
        self.selection.send_if_modified(|current| {
            if current.as_ref() == Some(&selection) {
                return false;
            }
            *current = Some(selection);
            true
        });
    }

    /// `None` until the persisted selection has been loaded.
    pub fn space_selection_hierarchy(&self) -> watch::Receiver<Option<SelectionPath>> {
        self.selection.subscribe()
    }

    pub fn filtered_room_summaries(&self) -> watch::Receiver<RoomSummaries> {
        self.filtered.subscribe()
    }

    pub fn unfiltered_room_summaries(&self) -> watch::Receiver<RoomSummaries> {
        self.service.summaries()
    }

    pub fn selected_space(&self) -> watch::Receiver<Option<SelectedSpace>> {
        self.selected_space.subscribe()
    }

    pub fn loading_state(&self) -> watch::Receiver<LoadingState> {
        self.service.loading_state()
    }

    /// Start the pipeline under `parent`. Call once.
    pub fn launch(self: &Arc<Self>, parent: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).watch_space_nav(parent))
    }

    /// Tell the upstream list which part of the (filtered) list is on screen.
    pub async fn update_visible_range(&self, range: RangeInclusive<usize>) {
        let space_nav = self.prefs.get(BoolPref::SpaceNav);
        let (upstream_range, rooms_rx) = if space_nav {
            let filtered = Arc::clone(&*self.filtered.borrow());
            let upstream = Arc::clone(&*self.service.summaries().borrow());
            (
                translate_visible_range(range.clone(), &filtered, &upstream),
                self.filtered.subscribe(),
            )
        } else {
            (range.clone(), self.service.summaries())
        };

        if let Err(e) = self
            .service
            .update_visible_range(upstream_range, PAGINATION_THRESHOLD)
            .await
        {
            warn!(target: TARGET, "Failed to update visible range: {e:?}");
        }
        self.subscribe_to_visible_rooms_if_needed(range, rooms_rx);
    }

    /// Forward a server-side filter. Space categories are dropped while space
    /// navigation is on, since spaces are filtered locally then.
    pub async fn update_filter(&self, filter: RoomListFilter) {
        let filter = if self.prefs.get(BoolPref::SpaceNav) {
            let cleaned = filter.without_space_filter();
            if cleaned.as_ref() != Some(&filter) {
                error!(
                    target: TARGET,
                    "Tried to apply upstream space filter while using space nav, dropped"
                );
            }
            cleaned.unwrap_or(RoomListFilter::None)
        } else {
            filter
        };
        if let Err(e) = self.service.update_filter(filter).await {
            warn!(target: TARGET, "Failed to update room list filter: {e:?}");
        }
    }

    fn subscribe_to_visible_rooms_if_needed(
        &self,
        range: RangeInclusive<usize>,
        rooms_rx: watch::Receiver<RoomSummaries>,
    ) {
        let service = Arc::clone(&self.service);
        let delay = self.config.subscribe_debounce;
        let mut task = self
            .subscribe_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if range.is_empty() {
                return;
            }
            let rooms = Arc::clone(&*rooms_rx.borrow());
            let room_ids = extended_visible_room_ids(&range, &rooms);
            if let Err(e) = service.subscribe_to_visible_rooms(room_ids).await {
                warn!(target: TARGET, "Failed to subscribe to visible rooms: {e:?}");
            }
        }));
    }

    async fn watch_space_nav(self: Arc<Self>, parent: CancellationToken) {
        let mut space_nav_rx = self.prefs.space_nav();
        let mut current: Option<(bool, CancellationToken)> = None;

        loop {
            let enabled = *space_nav_rx.borrow_and_update();
            if current.as_ref().map(|(value, _)| *value) != Some(enabled) {
                if let Some((_, previous)) = current.take() {
                    previous.cancel();
                }
                let scope = parent.child_token();
                debug!(target: TARGET, "Space nav enabled: {enabled}");
                if enabled {
                    self.start_space_nav(&scope).await;
                } else {
                    self.start_passthrough(&scope);
                }
                current = Some((enabled, scope));
            }

            tokio::select! {
                biased;
                _ = parent.cancelled() => break,
                changed = space_nav_rx.changed() => if changed.is_err() { break },
            }
        }
        if let Some((_, scope)) = current {
            scope.cancel();
        }
    }

    fn start_passthrough(self: &Arc<Self>, scope: &CancellationToken) {
        let this = Arc::clone(self);
        let token = scope.clone();
        tokio::spawn(async move {
            let mut rooms_rx = this.service.summaries();
            loop {
                let rooms = Arc::clone(&*rooms_rx.borrow_and_update());
                if token.is_cancelled() {
                    break;
                }
                this.filtered.send_replace(rooms);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    changed = rooms_rx.changed() => if changed.is_err() { break },
                }
            }
        });
    }

    async fn start_space_nav(self: &Arc<Self>, scope: &CancellationToken) {
        // Clear any space filter set on the upstream list before we took over.
        self.update_filter(RoomListFilter::All(Vec::new())).await;

        tokio::spawn(load_all_incrementally(
            Arc::clone(&self.service),
            scope.clone(),
        ));
        tokio::spawn(Arc::clone(self).restore_and_persist_selection(scope.clone()));
        tokio::spawn(Arc::clone(self).resolve_selection_stage(scope.clone()));
        tokio::spawn(Arc::clone(self).rebuild_on_selection_stage(scope.clone()));
        tokio::spawn(Arc::clone(self).filter_stage(scope.clone()));
    }

    async fn restore_and_persist_selection(self: Arc<Self>, token: CancellationToken) {
        let mut selection_rx = self.selection.subscribe();
        let restored = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            restored = self.store.load_initial_space_selection() => restored,
        };
        debug!(target: TARGET, "Restored space selection {restored:?}");
        self.selection.send_replace(Some(restored.clone()));
        selection_rx.borrow_and_update();

        // The restored value is what storage already holds.
        let mut last_persisted = restored;
        let mut timer = QuiescenceTimer::new(self.config.persist_debounce);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = selection_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    timer.arm();
                }
                _ = timer.elapsed() => {
                    let Some(selection) = selection_rx.borrow_and_update().clone() else {
                        continue;
                    };
                    if selection == last_persisted {
                        continue;
                    }
                    trace!(target: TARGET, "Persisting space selection {selection:?}");
                    match self.store.persist_space_selection(&selection).await {
                        Ok(()) => last_persisted = selection,
                        Err(e) => error!(target: TARGET, "Failed to persist space selection: {e}"),
                    }
                }
            }
        }
    }

    async fn resolve_selection_stage(self: Arc<Self>, token: CancellationToken) {
        let mut selection_rx = self.selection.subscribe();
        let mut spaces_rx = self.spaces.all_spaces();
        let mut settings_rx = self.prefs.pseudo_space_settings();

        loop {
            let selection = selection_rx.borrow_and_update().clone();
            let spaces = spaces_rx.borrow_and_update().clone();
            let settings = *settings_rx.borrow_and_update();

            let resolution =
                resolve_selected_space(selection.as_deref(), spaces.as_ref(), &settings);
            if !resolution.found {
                // Kept in storage: the space may still arrive with a later sync.
                info!(target: TARGET, "Selected space not found");
            }
            if token.is_cancelled() {
                break;
            }
            self.selected_space.send_if_modified(|current| {
                if *current == resolution.selected {
                    return false;
                }
                *current = resolution.selected;
                true
            });

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = selection_rx.changed() => if changed.is_err() { break },
                changed = spaces_rx.changed() => if changed.is_err() { break },
                changed = settings_rx.changed() => if changed.is_err() { break },
            }
        }
    }

    /// Rebuild the hierarchy once a new selection settles, to pick up
    /// `m.space.child` changes without watching every room's state.
    async fn rebuild_on_selection_stage(self: Arc<Self>, token: CancellationToken) {
        let mut selection_rx = self.selection.subscribe();
        let mut timer = QuiescenceTimer::new(self.config.rebuild_debounce);
        let mut skipped_first = false;

        let mut on_selection = |selection: &Option<SelectionPath>, timer: &mut QuiescenceTimer| {
            if selection.as_ref().is_none_or(|s| s.is_empty()) {
                return;
            }
            if skipped_first {
                timer.arm();
            } else {
                skipped_first = true;
            }
        };

        on_selection(&selection_rx.borrow_and_update(), &mut timer);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = selection_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    on_selection(&selection_rx.borrow_and_update(), &mut timer);
                }
                _ = timer.elapsed() => {
                    debug!(target: TARGET, "Selection settled, rebuilding space list");
                    self.spaces.force_rebuild_space_filter();
                }
            }
        }
    }

    async fn filter_stage(self: Arc<Self>, token: CancellationToken) {
        let mut selected_rx = self.selected_space.subscribe();
        let mut rooms_rx = self.service.summaries();
        let mut allow_all_rx = self.prefs.pseudo_space_all_rooms();

        loop {
            let selected = selected_rx.borrow_and_update().clone();
            let rooms = Arc::clone(&*rooms_rx.borrow_and_update());
            let allow_all_rooms = *allow_all_rx.borrow_and_update();

            let filtered = filter_rooms(selected.as_ref(), &rooms, allow_all_rooms);
            if token.is_cancelled() {
                break;
            }
            self.filtered.send_replace(filtered);

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = selected_rx.changed() => if changed.is_err() { break },
                changed = rooms_rx.changed() => if changed.is_err() { break },
                changed = allow_all_rx.changed() => if changed.is_err() { break },
            }
        }
    }
}

/// Ids of the rooms in `range`, extended by half the prefetch window.
fn extended_visible_room_ids(range: &RangeInclusive<usize>, rooms: &[RoomSummary]) -> Vec<RoomId> {
    let start = *range.start();
    let end = range
        .end()
        .saturating_add(EXTENDED_VISIBILITY_RANGE_SIZE / 2)
        .min(rooms.len());
    rooms
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .map(|room| room.room_id.clone())
        .collect()
}
