//! Observable user preferences that drive space navigation.
//!
//! Every flag is backed by its own `watch` channel. The derived
//! [`PseudoSpaceSettings`] and [`CountingMode`] values are updated in the same
//! call that changes a flag, so a subscriber never sees a stale combination.

use crate::unread::CountingMode;
use log::debug;
use std::collections::HashMap;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolPref {
    SpaceNav,
    ClientGeneratedUnreadCounts,
    PseudoSpaceAllRooms,
    CompactRootSpaces,
    PseudoSpaceHideEmptyUnread,
    PseudoSpaceFavorites,
    PseudoSpaceDms,
    PseudoSpaceGroups,
    PseudoSpaceSpacelessGroups,
    PseudoSpaceSpaceless,
    PseudoSpaceNotifications,
    PseudoSpaceUnread,
}

impl BoolPref {
    pub const ALL: [BoolPref; 12] = [
        BoolPref::SpaceNav,
        BoolPref::ClientGeneratedUnreadCounts,
        BoolPref::PseudoSpaceAllRooms,
        BoolPref::CompactRootSpaces,
        BoolPref::PseudoSpaceHideEmptyUnread,
        BoolPref::PseudoSpaceFavorites,
        BoolPref::PseudoSpaceDms,
        BoolPref::PseudoSpaceGroups,
        BoolPref::PseudoSpaceSpacelessGroups,
        BoolPref::PseudoSpaceSpaceless,
        BoolPref::PseudoSpaceNotifications,
        BoolPref::PseudoSpaceUnread,
    ];

    pub fn default_value(self) -> bool {
        matches!(
            self,
            BoolPref::PseudoSpaceAllRooms | BoolPref::CompactRootSpaces
        )
    }
}

/// Which pseudo spaces to show, plus the counting mode they filter with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PseudoSpaceSettings {
    pub favorites: bool,
    pub dms: bool,
    pub groups: bool,
    pub spaceless_groups: bool,
    pub spaceless: bool,
    pub notifications: bool,
    pub unread: bool,
    pub client_unread_counts: bool,
}

impl PseudoSpaceSettings {
    /// Whether some enabled pseudo space can show rooms without any real
    /// space existing. The spaceless variants only make sense next to spaces.
    pub fn has_space_independent_pseudo_space(&self) -> bool {
        self.favorites || self.dms || self.groups || self.notifications || self.unread
    }
}

pub struct PreferenceStore {
    flags: HashMap<BoolPref, watch::Sender<bool>>,
    pseudo_space_settings: watch::Sender<PseudoSpaceSettings>,
    counting_mode: watch::Sender<CountingMode>,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore {
    pub fn new() -> Self {
        let flags = BoolPref::ALL
            .iter()
            .map(|pref| (*pref, watch::Sender::new(pref.default_value())))
            .collect();
        let mut store = Self {
            flags,
            pseudo_space_settings: watch::Sender::new(PseudoSpaceSettings::default()),
            counting_mode: watch::Sender::new(CountingMode::ServerGenerated),
        };
        store.pseudo_space_settings = watch::Sender::new(store.compute_settings());
        store.counting_mode = watch::Sender::new(store.compute_counting_mode());
        store
    }

    /// Builder-style override used when wiring up a store with known values.
    pub fn with(self, pref: BoolPref, value: bool) -> Self {
        self.set(pref, value);
        self
    }

    pub fn get(&self, pref: BoolPref) -> bool {
        self.flags.get(&pref).is_some_and(|sender| *sender.borrow())
    }

    /// Update a flag. Subscribers are only notified on an actual change.
    pub fn set(&self, pref: BoolPref, value: bool) {
        let Some(sender) = self.flags.get(&pref) else {
            return;
        };
        let changed = sender.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
        if !changed {
            return;
        }
        debug!(target: "Prefs", "{pref:?} = {value}");

        let settings = self.compute_settings();
        self.pseudo_space_settings
            .send_if_modified(|current| replace_if_different(current, settings));
        let mode = self.compute_counting_mode();
        self.counting_mode
            .send_if_modified(|current| replace_if_different(current, mode));
    }

    pub fn subscribe(&self, pref: BoolPref) -> watch::Receiver<bool> {
        match self.flags.get(&pref) {
            Some(sender) => sender.subscribe(),
            None => watch::Sender::new(pref.default_value()).subscribe(),
        }
    }

    pub fn space_nav(&self) -> watch::Receiver<bool> {
        self.subscribe(BoolPref::SpaceNav)
    }

    pub fn pseudo_space_all_rooms(&self) -> watch::Receiver<bool> {
        self.subscribe(BoolPref::PseudoSpaceAllRooms)
    }

    pub fn pseudo_space_settings(&self) -> watch::Receiver<PseudoSpaceSettings> {
        self.pseudo_space_settings.subscribe()
    }

    pub fn counting_mode(&self) -> watch::Receiver<CountingMode> {
        self.counting_mode.subscribe()
    }

    fn compute_settings(&self) -> PseudoSpaceSettings {
        PseudoSpaceSettings {
            favorites: self.get(BoolPref::PseudoSpaceFavorites),
            dms: self.get(BoolPref::PseudoSpaceDms),
            groups: self.get(BoolPref::PseudoSpaceGroups),
            spaceless_groups: self.get(BoolPref::PseudoSpaceSpacelessGroups),
            spaceless: self.get(BoolPref::PseudoSpaceSpaceless),
            notifications: self.get(BoolPref::PseudoSpaceNotifications),
            unread: self.get(BoolPref::PseudoSpaceUnread),
            client_unread_counts: self.get(BoolPref::ClientGeneratedUnreadCounts),
        }
    }

    fn compute_counting_mode(&self) -> CountingMode {
        if self.get(BoolPref::ClientGeneratedUnreadCounts) {
            CountingMode::ClientGenerated
        } else {
            CountingMode::ServerGenerated
        }
    }
}

fn replace_if_different<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        return false;
    }
    *current = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = PreferenceStore::new();
        assert!(!prefs.get(BoolPref::SpaceNav));
        assert!(prefs.get(BoolPref::PseudoSpaceAllRooms));
        assert!(prefs.get(BoolPref::CompactRootSpaces));
        assert_eq!(*prefs.pseudo_space_settings().borrow(), PseudoSpaceSettings::default());
        assert_eq!(*prefs.counting_mode().borrow(), CountingMode::ServerGenerated);
    }

    #[test]
    fn test_set_updates_derived_values() {
        let prefs = PreferenceStore::new();
        let mut settings = prefs.pseudo_space_settings();
        let mut mode = prefs.counting_mode();

        prefs.set(BoolPref::PseudoSpaceFavorites, true);
        assert!(settings.has_changed().unwrap());
        assert!(settings.borrow_and_update().favorites);
        assert!(!mode.has_changed().unwrap());

        prefs.set(BoolPref::ClientGeneratedUnreadCounts, true);
        assert!(settings.borrow_and_update().client_unread_counts);
        assert_eq!(*mode.borrow_and_update(), CountingMode::ClientGenerated);
    }

    #[test]
    fn test_setting_same_value_does_not_notify() {
        let prefs = PreferenceStore::new();
        let mut space_nav = prefs.space_nav();
        prefs.set(BoolPref::SpaceNav, false);
        assert!(!space_nav.has_changed().unwrap());
        prefs.set(BoolPref::SpaceNav, true);
        assert!(space_nav.has_changed().unwrap());
    }

    #[test]
    fn test_space_independent_pseudo_spaces() {
        let spaceless_only = PseudoSpaceSettings {
            spaceless: true,
            spaceless_groups: true,
            ..Default::default()
        };
        assert!(!spaceless_only.has_space_independent_pseudo_space());

        let unread = PseudoSpaceSettings {
            unread: true,
            ..Default::default()
        };
        assert!(unread.has_space_independent_pseudo_space());
    }
}
