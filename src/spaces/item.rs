//! Nodes of the space hierarchy.
//!
//! A node is either a real space backed by a server-side space room, or one of
//! the synthetic pseudo spaces. Every node carries a pure membership predicate
//! that decides whether a room belongs to it.

use crate::types::{RoomId, RoomSummary, RoomSummaries};
use crate::unread::SpaceUnreadCounts;
use std::collections::HashSet;

pub const REAL_SPACE_ID_PREFIX: &str = "s:";
pub const PSEUDO_SPACE_ID_PREFIX: &str = "p:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceHierarchyItem {
    Space(RealSpace),
    Pseudo(PseudoSpace),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealSpace {
    pub room_id: RoomId,
    pub name: String,
    pub order: Option<String>,
    /// Child spaces, sorted. Always `SpaceHierarchyItem::Space` nodes.
    pub spaces: Vec<SpaceHierarchyItem>,
    /// Rooms that are direct, non-space children of this space.
    pub direct_children: HashSet<RoomId>,
    /// Direct children plus every room of every descendant space.
    pub flattened_rooms: HashSet<RoomId>,
    pub unread_counts: Option<SpaceUnreadCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoSpace {
    pub kind: PseudoSpaceKind,
    pub name: String,
    pub unread_counts: Option<SpaceUnreadCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoSpaceKind {
    Favorites,
    Dms,
    Groups,
    /// Group rooms that are not part of any known space.
    SpacelessGroups { excluded_rooms: HashSet<RoomId> },
    /// Rooms that are not part of any known space.
    Spaceless {
        excluded_rooms: HashSet<RoomId>,
        conflicts_with_spaceless_groups: bool,
    },
    Notifications { client_unread_counts: bool },
    Unread { client_unread_counts: bool },
}

impl PseudoSpaceKind {
    pub fn id(&self) -> &'static str {
        match self {
            PseudoSpaceKind::Favorites => "fav",
            PseudoSpaceKind::Dms => "dm",
            PseudoSpaceKind::Groups => "group",
            PseudoSpaceKind::SpacelessGroups { .. } => "spaceless/group",
            PseudoSpaceKind::Spaceless { .. } => "spaceless",
            PseudoSpaceKind::Notifications { .. } => "notif",
            PseudoSpaceKind::Unread { .. } => "unread",
        }
    }

    pub fn matches(&self, room: &RoomSummary) -> bool {
        match self {
            PseudoSpaceKind::Favorites => room.is_favorite,
            PseudoSpaceKind::Dms => room.is_dm,
            PseudoSpaceKind::Groups => !room.is_dm,
            PseudoSpaceKind::SpacelessGroups { excluded_rooms } => {
                !room.is_dm && !excluded_rooms.contains(&room.room_id)
            }
            PseudoSpaceKind::Spaceless { excluded_rooms, .. } => {
                !excluded_rooms.contains(&room.room_id)
            }
            PseudoSpaceKind::Notifications {
                client_unread_counts: true,
            } => {
                room.num_unread_notifications > 0
                    || room.num_unread_mentions > 0
                    || room.is_marked_unread
                    || room.is_invite()
            }
            PseudoSpaceKind::Notifications {
                client_unread_counts: false,
            } => {
                room.notification_count > 0
                    || room.highlight_count > 0
                    || room.num_unread_mentions > 0
                    || room.is_marked_unread
                    || room.is_invite()
            }
            PseudoSpaceKind::Unread {
                client_unread_counts: true,
            } => room.num_unread_messages > 0 || room.is_marked_unread || room.is_invite(),
            PseudoSpaceKind::Unread {
                client_unread_counts: false,
            } => room.unread_count > 0 || room.is_marked_unread || room.is_invite(),
        }
    }
}

impl RealSpace {
    pub fn selection_id(&self) -> String {
        format!("{REAL_SPACE_ID_PREFIX}{}", self.room_id)
    }
}

impl PseudoSpace {
    pub fn new(kind: PseudoSpaceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            unread_counts: None,
        }
    }

    pub fn selection_id(&self) -> String {
        format!("{PSEUDO_SPACE_ID_PREFIX}{}", self.kind.id())
    }
}

impl SpaceHierarchyItem {
    pub fn selection_id(&self) -> String {
        match self {
            SpaceHierarchyItem::Space(space) => space.selection_id(),
            SpaceHierarchyItem::Pseudo(pseudo) => pseudo.selection_id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SpaceHierarchyItem::Space(space) => &space.name,
            SpaceHierarchyItem::Pseudo(pseudo) => &pseudo.name,
        }
    }

    /// Explicit order of a real space. Pseudo spaces never carry one.
    pub fn order(&self) -> Option<&str> {
        match self {
            SpaceHierarchyItem::Space(space) => space.order.as_deref(),
            SpaceHierarchyItem::Pseudo(_) => None,
        }
    }

    /// Child spaces. Pseudo spaces have none.
    pub fn child_spaces(&self) -> &[SpaceHierarchyItem] {
        match self {
            SpaceHierarchyItem::Space(space) => &space.spaces,
            SpaceHierarchyItem::Pseudo(_) => &[],
        }
    }

    pub fn as_space(&self) -> Option<&RealSpace> {
        match self {
            SpaceHierarchyItem::Space(space) => Some(space),
            SpaceHierarchyItem::Pseudo(_) => None,
        }
    }

    pub fn unread_counts(&self) -> Option<&SpaceUnreadCounts> {
        match self {
            SpaceHierarchyItem::Space(space) => space.unread_counts.as_ref(),
            SpaceHierarchyItem::Pseudo(pseudo) => pseudo.unread_counts.as_ref(),
        }
    }

    /// Membership predicate of this node.
    pub fn matches(&self, room: &RoomSummary) -> bool {
        match self {
            SpaceHierarchyItem::Space(space) => space.flattened_rooms.contains(&room.room_id),
            SpaceHierarchyItem::Pseudo(pseudo) => pseudo.kind.matches(room),
        }
    }

    /// Keep the rooms matching this node, in upstream order.
    pub fn apply_filter(&self, rooms: &[RoomSummary]) -> RoomSummaries {
        rooms
            .iter()
            .filter(|room| self.matches(room))
            .cloned()
            .collect()
    }

    /// Whether the node may be hidden from the space bar given its counts.
    pub fn can_hide(&self, counts: &SpaceUnreadCounts) -> bool {
        match self {
            SpaceHierarchyItem::Pseudo(PseudoSpace {
                kind: PseudoSpaceKind::Notifications { .. },
                ..
            }) => counts.marked_unread_chats == 0 && counts.notified_chats == 0,
            SpaceHierarchyItem::Pseudo(PseudoSpace {
                kind: PseudoSpaceKind::Unread { .. },
                ..
            }) => {
                counts.marked_unread_chats == 0
                    && counts.notified_chats == 0
                    && counts.unread_chats == 0
            }
            _ => false,
        }
    }

    /// Attach unread counts to this node and, recursively, to its child spaces.
    ///
    /// `get_counts` sees each node before its own children are enriched.
    pub fn enrich<F>(mut self, get_counts: &F) -> Self
    where
        F: Fn(&SpaceHierarchyItem) -> Option<SpaceUnreadCounts>,
    {
        let counts = get_counts(&self);
        match &mut self {
            SpaceHierarchyItem::Space(space) => {
                space.unread_counts = counts;
                space.spaces = std::mem::take(&mut space.spaces)
                    .into_iter()
                    .map(|child| child.enrich(get_counts))
                    .collect();
            }
            SpaceHierarchyItem::Pseudo(pseudo) => pseudo.unread_counts = counts,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoomDisplayType;

    fn room(id: &str) -> RoomSummary {
        RoomSummary::new(id)
    }

    fn pseudo(kind: PseudoSpaceKind) -> SpaceHierarchyItem {
        SpaceHierarchyItem::Pseudo(PseudoSpace::new(kind, "test"))
    }

    fn real(id: &str, rooms: &[&str], spaces: Vec<SpaceHierarchyItem>) -> SpaceHierarchyItem {
        SpaceHierarchyItem::Space(RealSpace {
            room_id: RoomId::from(id),
            name: id.to_string(),
            order: None,
            spaces,
            direct_children: rooms.iter().map(|r| RoomId::from(*r)).collect(),
            flattened_rooms: rooms.iter().map(|r| RoomId::from(*r)).collect(),
            unread_counts: None,
        })
    }

    #[test]
    fn test_selection_ids_are_prefixed() {
        assert_eq!(real("!s:x", &[], vec![]).selection_id(), "s:!s:x");
        assert_eq!(pseudo(PseudoSpaceKind::Favorites).selection_id(), "p:fav");
        assert_eq!(
            pseudo(PseudoSpaceKind::SpacelessGroups {
                excluded_rooms: HashSet::new()
            })
            .selection_id(),
            "p:spaceless/group"
        );
    }

    #[test]
    fn test_real_space_matches_flattened_rooms_only() {
        let space = real("!s", &["!a", "!b"], vec![]);
        assert!(space.matches(&room("!a")));
        assert!(!space.matches(&room("!c")));

        let rooms = vec![room("!c"), room("!b"), room("!a")];
        let filtered = space.apply_filter(&rooms);
        let ids: Vec<&str> = filtered.iter().map(|r| r.room_id.as_str()).collect();
        assert_eq!(ids, vec!["!b", "!a"]);
    }

    #[test]
    fn test_dm_and_group_pseudo_spaces() {
        let dm = RoomSummary {
            is_dm: true,
            ..room("!dm")
        };
        let group = room("!group");

        assert!(pseudo(PseudoSpaceKind::Dms).matches(&dm));
        assert!(!pseudo(PseudoSpaceKind::Dms).matches(&group));
        assert!(pseudo(PseudoSpaceKind::Groups).matches(&group));
        assert!(!pseudo(PseudoSpaceKind::Groups).matches(&dm));

        let excluded: HashSet<RoomId> = [RoomId::from("!group")].into_iter().collect();
        let spaceless_groups = pseudo(PseudoSpaceKind::SpacelessGroups {
            excluded_rooms: excluded.clone(),
        });
        assert!(!spaceless_groups.matches(&group));
        assert!(!spaceless_groups.matches(&dm));
        assert!(spaceless_groups.matches(&room("!other")));

        let spaceless = pseudo(PseudoSpaceKind::Spaceless {
            excluded_rooms: excluded,
            conflicts_with_spaceless_groups: false,
        });
        assert!(spaceless.matches(&dm));
        assert!(!spaceless.matches(&group));
    }

    #[test]
    fn test_notifications_pseudo_space_respects_counting_mode() {
        let server_notified = RoomSummary {
            notification_count: 1,
            ..room("!server")
        };
        let client_notified = RoomSummary {
            num_unread_notifications: 1,
            ..room("!client")
        };
        let invite = RoomSummary {
            display_type: RoomDisplayType::Invite,
            ..room("!invite")
        };

        let client = pseudo(PseudoSpaceKind::Notifications {
            client_unread_counts: true,
        });
        let server = pseudo(PseudoSpaceKind::Notifications {
            client_unread_counts: false,
        });

        assert!(client.matches(&client_notified));
        assert!(!client.matches(&server_notified));
        assert!(server.matches(&server_notified));
        assert!(!server.matches(&client_notified));
        assert!(client.matches(&invite));
        assert!(server.matches(&invite));
        assert!(!server.matches(&room("!quiet")));
    }

    #[test]
    fn test_unread_pseudo_space_includes_marked_unread() {
        let marked = RoomSummary {
            is_marked_unread: true,
            ..room("!marked")
        };
        let unread = RoomSummary {
            unread_count: 3,
            ..room("!unread")
        };
        let space = pseudo(PseudoSpaceKind::Unread {
            client_unread_counts: false,
        });

        assert!(space.matches(&marked));
        assert!(space.matches(&unread));
        assert!(!space.matches(&room("!read")));
    }

    #[test]
    fn test_can_hide_depends_on_kind() {
        let empty = SpaceUnreadCounts::default();
        let only_unread = SpaceUnreadCounts {
            unread_chats: 1,
            ..Default::default()
        };

        let notif = pseudo(PseudoSpaceKind::Notifications {
            client_unread_counts: false,
        });
        let unread = pseudo(PseudoSpaceKind::Unread {
            client_unread_counts: false,
        });

        assert!(notif.can_hide(&empty));
        assert!(notif.can_hide(&only_unread));
        assert!(unread.can_hide(&empty));
        assert!(!unread.can_hide(&only_unread));
        assert!(!pseudo(PseudoSpaceKind::Favorites).can_hide(&empty));
        assert!(!real("!s", &[], vec![]).can_hide(&empty));
    }

    #[test]
    fn test_enrich_reaches_child_spaces() {
        let tree = real("!parent", &["!a"], vec![real("!child", &["!b"], vec![])]);
        let enriched = tree.enrich(&|item: &SpaceHierarchyItem| {
            (item.selection_id() == "s:!child").then(|| SpaceUnreadCounts {
                unread_chats: 7,
                ..Default::default()
            })
        });

        assert!(enriched.unread_counts().is_none());
        let child = &enriched.child_spaces()[0];
        assert_eq!(child.unread_counts().map(|c| c.unread_chats), Some(7));
    }
}
