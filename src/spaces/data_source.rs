use super::hierarchy::build_space_hierarchy;
use super::item::SpaceHierarchyItem;
use crate::prefs::{PreferenceStore, PseudoSpaceSettings};
use crate::types::SpaceSummary;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Root level of a built hierarchy.
pub type SpaceList = Arc<[SpaceHierarchyItem]>;

/// Provider of the raw `m.space.child` graph.
#[async_trait]
pub trait SpaceGraphSource: Send + Sync {
    fn space_summaries(&self) -> watch::Receiver<Arc<[SpaceSummary]>>;
}

/// Owns the reactive root space list.
pub struct SpaceListDataSource {
    source: Arc<dyn SpaceGraphSource>,
    settings: watch::Receiver<PseudoSpaceSettings>,
    all_spaces: watch::Sender<Option<SpaceList>>,
    rebuild_trigger: watch::Sender<u64>,
}

impl SpaceListDataSource {
    pub fn new(source: Arc<dyn SpaceGraphSource>, prefs: &PreferenceStore) -> Self {
        Self {
            source,
            settings: prefs.pseudo_space_settings(),
            all_spaces: watch::Sender::new(None),
            rebuild_trigger: watch::Sender::new(0),
        }
    }

    /// `None` until the first build.
    pub fn all_spaces(&self) -> watch::Receiver<Option<SpaceList>> {
        self.all_spaces.subscribe()
    }

    /// Rebuild from the current inputs even if none of them changed.
    pub fn force_rebuild_space_filter(&self) {
        self.rebuild_trigger
            .send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn launch(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(token))
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        let mut spaces_rx = self.source.space_summaries();
        let mut settings_rx = self.settings.clone();
        let mut rebuild_rx = self.rebuild_trigger.subscribe();

        loop {
            let spaces = Arc::clone(&*spaces_rx.borrow_and_update());
            let settings = *settings_rx.borrow_and_update();
            let generation = *rebuild_rx.borrow_and_update();

            let root: SpaceList = build_space_hierarchy(&spaces, &settings).into();
            debug!(
                target: "RoomList/Spaces",
                "Built space list: {} root entries from {} spaces (rebuild #{generation})",
                root.len(),
                spaces.len()
            );
            if token.is_cancelled() {
                break;
            }
            self.all_spaces.send_replace(Some(root));

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = spaces_rx.changed() => if changed.is_err() { break },
                changed = settings_rx.changed() => if changed.is_err() { break },
                _ = rebuild_rx.changed() => {}
            }
        }
    }
}
