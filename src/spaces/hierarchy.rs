//! Builds the immutable space tree from the raw space graph.
//!
//! The tree is rebuilt wholesale on every input change; nothing here patches
//! an existing tree.

use super::item::{PseudoSpace, PseudoSpaceKind, RealSpace, SpaceHierarchyItem};
use super::order::sort_spaces;
use crate::prefs::PseudoSpaceSettings;
use crate::types::{RoomId, SpaceChild, SpaceSummary};
use log::warn;
use std::collections::{HashMap, HashSet};

/// Build the root list: enabled pseudo spaces first, then sorted root spaces.
///
/// A space that is the child of another known space is never a root. Loops in
/// the `m.space.child` graph are cut at the first repeated space.
pub fn build_space_hierarchy(
    spaces: &[SpaceSummary],
    settings: &PseudoSpaceSettings,
) -> Vec<SpaceHierarchyItem> {
    let graph = SpaceGraph::new(spaces);

    let mut roots: Vec<SpaceHierarchyItem> = spaces
        .iter()
        .filter(|space| !graph.child_space_ids.contains(&space.room_id))
        .map(|space| {
            let mut chain = Vec::new();
            graph.build_item(space, space.order.clone(), &mut chain)
        })
        .collect();
    sort_spaces(&mut roots);

    let mut result = build_pseudo_spaces(spaces, settings);
    result.extend(roots);
    result
}

fn build_pseudo_spaces(
    spaces: &[SpaceSummary],
    settings: &PseudoSpaceSettings,
) -> Vec<SpaceHierarchyItem> {
    let mut pseudo = Vec::new();
    if settings.favorites {
        pseudo.push(PseudoSpace::new(PseudoSpaceKind::Favorites, "Favorites"));
    }
    if settings.dms {
        pseudo.push(PseudoSpace::new(PseudoSpaceKind::Dms, "People"));
    }
    if settings.groups {
        pseudo.push(PseudoSpace::new(PseudoSpaceKind::Groups, "Groups"));
    }
    if settings.spaceless || settings.spaceless_groups {
        let excluded_rooms: HashSet<RoomId> = spaces
            .iter()
            .flat_map(|space| space.children.iter().map(|child| child.room_id.clone()))
            .collect();
        if settings.spaceless_groups {
            pseudo.push(PseudoSpace::new(
                PseudoSpaceKind::SpacelessGroups {
                    excluded_rooms: excluded_rooms.clone(),
                },
                "Other groups",
            ));
        }
        if settings.spaceless {
            pseudo.push(PseudoSpace::new(
                PseudoSpaceKind::Spaceless {
                    excluded_rooms,
                    conflicts_with_spaceless_groups: settings.spaceless_groups,
                },
                "Other",
            ));
        }
    }
    if settings.notifications {
        // With a separate unread tab this one only covers notifications.
        let name = if settings.unread { "Notifications" } else { "Unread" };
        pseudo.push(PseudoSpace::new(
            PseudoSpaceKind::Notifications {
                client_unread_counts: settings.client_unread_counts,
            },
            name,
        ));
    }
    if settings.unread {
        pseudo.push(PseudoSpace::new(
            PseudoSpaceKind::Unread {
                client_unread_counts: settings.client_unread_counts,
            },
            "Unread",
        ));
    }
    pseudo.into_iter().map(SpaceHierarchyItem::Pseudo).collect()
}

struct SpaceGraph<'a> {
    /// parent id -> (relation, child space)
    child_spaces: HashMap<&'a RoomId, Vec<(&'a SpaceChild, &'a SpaceSummary)>>,
    /// parent id -> direct children that are not known spaces
    room_children: HashMap<&'a RoomId, Vec<RoomId>>,
    child_space_ids: HashSet<RoomId>,
}

impl<'a> SpaceGraph<'a> {
    fn new(spaces: &'a [SpaceSummary]) -> Self {
        let by_id: HashMap<&RoomId, &SpaceSummary> =
            spaces.iter().map(|space| (&space.room_id, space)).collect();

        let mut child_spaces: HashMap<&RoomId, Vec<(&SpaceChild, &SpaceSummary)>> =
            HashMap::new();
        let mut room_children: HashMap<&RoomId, Vec<RoomId>> = HashMap::new();
        let mut child_space_ids = HashSet::new();

        for parent in spaces {
            for child in &parent.children {
                match by_id.get(&child.room_id) {
                    Some(&child_space) => {
                        child_space_ids.insert(child.room_id.clone());
                        child_spaces
                            .entry(&parent.room_id)
                            .or_default()
                            .push((child, child_space));
                    }
                    None => room_children
                        .entry(&parent.room_id)
                        .or_default()
                        .push(child.room_id.clone()),
                }
            }
        }

        Self {
            child_spaces,
            room_children,
            child_space_ids,
        }
    }

    /// `chain` holds the ids of every space on the way down to `space`.
    fn build_item(
        &self,
        space: &'a SpaceSummary,
        order: Option<String>,
        chain: &mut Vec<&'a RoomId>,
    ) -> SpaceHierarchyItem {
        chain.push(&space.room_id);

        let mut children: Vec<SpaceHierarchyItem> = Vec::new();
        for &(relation, child) in self.child_spaces.get(&space.room_id).into_iter().flatten() {
            if chain.contains(&&child.room_id) {
                warn!(
                    target: "RoomList/Spaces",
                    "Detected space loop: {} -> {}",
                    space.room_id, child.room_id
                );
                continue;
            }
            children.push(self.build_item(child, relation.order.clone(), chain));
        }
        sort_spaces(&mut children);

        chain.pop();

        let direct_children: HashSet<RoomId> = self
            .room_children
            .get(&space.room_id)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let mut flattened_rooms = direct_children.clone();
        for child in &children {
            if let Some(child_space) = child.as_space() {
                flattened_rooms.extend(child_space.flattened_rooms.iter().cloned());
            }
        }

        SpaceHierarchyItem::Space(RealSpace {
            room_id: space.room_id.clone(),
            name: space.display_name().to_string(),
            order,
            spaces: children,
            direct_children,
            flattened_rooms,
            unread_counts: None,
        })
    }
}
