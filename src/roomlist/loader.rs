use super::service::{LoadingState, RoomListService};
use log::{debug, trace, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Keep paginating until every room the server knows about is loaded.
///
/// Space filtering and unread counts both need the complete list, and a
/// filtered visible range is not a reliable pagination trigger. One
/// `load_more` is in flight at a time; the next one is driven by the summary
/// count it produces.
pub async fn load_all_incrementally(service: Arc<dyn RoomListService>, token: CancellationToken) {
    let mut state_rx = service.loading_state();
    let mut summaries_rx = service.summaries();
    let mut last_seen: Option<(LoadingState, usize)> = None;

    loop {
        let state = *state_rx.borrow_and_update();
        let loaded = summaries_rx.borrow_and_update().len();

        if last_seen != Some((state, loaded)) {
            last_seen = Some((state, loaded));
            match state {
                LoadingState::Loaded { total } if loaded < total => {
                    trace!(target: "RoomList/Loader", "loadMore: {loaded}/{total}");
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        result = service.load_more() => {
                            if let Err(e) = result {
                                warn!(target: "RoomList/Loader", "load_more failed: {e:?}");
                            }
                        }
                    }
                }
                LoadingState::Loaded { total } => {
                    trace!(target: "RoomList/Loader", "loadMore done at {loaded}/{total}");
                }
                LoadingState::NotLoaded => {}
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            changed = state_rx.changed() => if changed.is_err() { break },
            changed = summaries_rx.changed() => if changed.is_err() { break },
        }
    }
    debug!(target: "RoomList/Loader", "Incremental loader stopped");
}
