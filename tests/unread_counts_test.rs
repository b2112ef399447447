mod common;

use common::*;
use roomlist_spaces::roomlist::MemoryRoomListService;
use roomlist_spaces::spaces::filter_by_unread;
use roomlist_spaces::store::MemorySelectionStore;
use roomlist_spaces::types::{RoomDisplayType, RoomId, RoomSummary};
use roomlist_spaces::{
    BoolPref, PreferenceStore, SpaceNavConfig, SpaceUnreadCounts, SpaceUnreadCountsDataSource,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn counted_rooms() -> Vec<RoomSummary> {
    vec![
        RoomSummary {
            unread_count: 2,
            notification_count: 1,
            ..room("!r1")
        },
        RoomSummary {
            unread_count: 5,
            highlight_count: 1,
            ..room("!r2")
        },
        RoomSummary {
            display_type: RoomDisplayType::Invite,
            ..room("!r3")
        },
        room("!r4"),
        RoomSummary {
            is_marked_unread: true,
            ..room("!r5")
        },
    ]
}

fn harness(prefs: PreferenceStore) -> (Harness, Arc<SpaceUnreadCountsDataSource>) {
    let service = MemoryRoomListService::fully_loaded(counted_rooms());
    service.set_spaces(sample_spaces());
    let harness = Harness::new(service, prefs, MemorySelectionStore::new());
    let unread = Arc::new(SpaceUnreadCountsDataSource::new(
        harness.service.clone(),
        SpaceNavConfig::default(),
    ));
    (harness, unread)
}

#[tokio::test(start_paused = true)]
async fn test_totals_and_visible_root_counts() {
    let (harness, unread) = harness(PreferenceStore::new().with(BoolPref::SpaceNav, true));
    let mut enriched = unread.enriched_spaces();
    harness.launch();
    unread.launch(
        harness.token.clone(),
        &harness.room_list,
        &harness.spaces,
        &harness.prefs,
    );
    harness.wait_restored().await;

    let spaces = enriched
        .wait_for(|spaces| {
            spaces
                .as_ref()
                .is_some_and(|list| list.iter().all(|s| s.unread_counts().is_some()))
        })
        .await
        .unwrap()
        .clone()
        .unwrap();

    let totals = *unread.total_unread_counts().borrow();
    assert_eq!(totals.unread_chats, 3);
    assert_eq!(totals.unread_messages, 8);
    assert_eq!(totals.notified_chats, 2);
    assert_eq!(totals.mentioned_chats, 1);
    assert_eq!(totals.marked_unread_chats, 1);
    assert_eq!(totals.invite_count, 1);

    // Roots sort by name: Home, Work.
    let home = spaces[0].unread_counts().unwrap();
    assert_eq!(home.unread_messages, 2);
    let work = spaces[1].unread_counts().unwrap();
    assert_eq!(work.unread_chats, 1);
    assert_eq!(work.marked_unread_chats, 1);
    // Children of an unselected root are not visible.
    assert!(spaces[1].child_spaces()[0].unread_counts().is_none());

    sleep(Duration::from_millis(10)).await;
    let subscriptions = harness.service.calls().visible_room_subscriptions;
    assert_eq!(
        subscriptions.last(),
        Some(&vec![RoomId::from("!home"), RoomId::from("!work")])
    );
}

#[tokio::test(start_paused = true)]
async fn test_selecting_space_reveals_children_counts() {
    let (harness, unread) = harness(PreferenceStore::new().with(BoolPref::SpaceNav, true));
    let mut enriched = unread.enriched_spaces();
    harness.launch();
    unread.launch(
        harness.token.clone(),
        &harness.room_list,
        &harness.spaces,
        &harness.prefs,
    );
    harness.wait_restored().await;

    harness.room_list.update_space_selection(path(&["s:!work"]));
    let spaces = enriched
        .wait_for(|spaces| {
            spaces
                .as_ref()
                .and_then(|list| list.get(1))
                .and_then(|work| work.child_spaces().first())
                .is_some_and(|eng| eng.unread_counts().is_some())
        })
        .await
        .unwrap()
        .clone()
        .unwrap();

    let eng = spaces[1].child_spaces()[0].unread_counts().unwrap();
    assert_eq!(eng.marked_unread_chats, 1);
    assert_eq!(eng.unread_chats, 0);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_space_nav_reports_nothing() {
    let (harness, unread) = harness(PreferenceStore::new());
    harness.launch();
    unread.launch(
        harness.token.clone(),
        &harness.room_list,
        &harness.spaces,
        &harness.prefs,
    );

    sleep(Duration::from_secs(1)).await;
    assert!(unread.enriched_spaces().borrow().is_none());
    assert_eq!(*unread.total_unread_counts().borrow(), SpaceUnreadCounts::default());
    assert!(harness.service.calls().visible_room_subscriptions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_room_updates_are_throttled() {
    let (harness, unread) = harness(PreferenceStore::new().with(BoolPref::SpaceNav, true));
    let mut totals = unread.total_unread_counts();
    harness.launch();
    unread.launch(
        harness.token.clone(),
        &harness.room_list,
        &harness.spaces,
        &harness.prefs,
    );
    harness.wait_restored().await;
    let ready = totals.wait_for(|counts| counts.invite_count == 1).await.is_ok();
    assert!(ready);

    sleep(Duration::from_secs(1)).await;
    harness.service.set_rooms(vec![room("!quiet")]);
    sleep(Duration::from_millis(1)).await;
    assert_eq!(totals.borrow().invite_count, 0);

    harness.service.set_rooms(counted_rooms());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(totals.borrow().invite_count, 0);
    sleep(Duration::from_millis(250)).await;
    assert_eq!(totals.borrow().invite_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_unread_pseudo_spaces_can_be_hidden() {
    let prefs = PreferenceStore::new()
        .with(BoolPref::SpaceNav, true)
        .with(BoolPref::PseudoSpaceUnread, true)
        .with(BoolPref::PseudoSpaceHideEmptyUnread, true);
    let service = MemoryRoomListService::fully_loaded(vec![room("!read")]);
    let harness = Harness::new(service, prefs, MemorySelectionStore::new());
    let unread = Arc::new(SpaceUnreadCountsDataSource::new(
        harness.service.clone(),
        SpaceNavConfig::default(),
    ));
    let mut enriched = unread.enriched_spaces();
    harness.launch();
    unread.launch(
        harness.token.clone(),
        &harness.room_list,
        &harness.spaces,
        &harness.prefs,
    );
    harness.wait_restored().await;

    let spaces = enriched
        .wait_for(|spaces| spaces.as_ref().is_some_and(|list| !list.is_empty()))
        .await
        .unwrap()
        .clone()
        .unwrap();
    assert_eq!(spaces[0].selection_id(), "p:unread");

    let hide = harness.prefs.get(BoolPref::PseudoSpaceHideEmptyUnread);
    assert!(filter_by_unread(&spaces, None, hide).is_empty());

    let selection = path(&["p:unread"]);
    assert_eq!(filter_by_unread(&spaces, Some(selection.as_slice()), hide).len(), 1);
}
