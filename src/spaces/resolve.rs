//! Lookups over a built space hierarchy.
//!
//! Resolution walks one level per path segment, so it costs
//! O(depth * branching). Resolve once per pipeline pass, never per row.

use super::item::{REAL_SPACE_ID_PREFIX, SpaceHierarchyItem};

/// Title shown when no space is selected.
pub const ALL_ROOMS_TITLE: &str = "All rooms";

/// Resolve a selection path to the node it names.
///
/// Returns `None` for an empty path or as soon as one segment has no match.
/// There is no fallback to the deepest resolved ancestor: a partially
/// resolvable path is stale as a whole.
pub fn resolve_selection<'a>(
    root: &'a [SpaceHierarchyItem],
    selection: &[String],
) -> Option<&'a SpaceHierarchyItem> {
    let mut current: Option<&SpaceHierarchyItem> = None;
    let mut level = root;
    for segment in selection {
        let found = level.iter().find(|item| item.selection_id() == *segment)?;
        level = found.child_spaces();
        current = Some(found);
    }
    current
}

/// Whether the selection filters by a real space.
///
/// Only the first segment needs checking: a path below a pseudo space cannot
/// exist.
pub fn is_space_filter_active(selection: &[String]) -> bool {
    selection
        .first()
        .is_some_and(|segment| segment.starts_with(REAL_SPACE_ID_PREFIX))
}

/// Name to display for the current selection.
///
/// `None` when the space list is empty, which means spaces are not in use.
pub fn resolve_space_name(root: &[SpaceHierarchyItem], selection: &[String]) -> Option<String> {
    if root.is_empty() {
        return None;
    }
    Some(
        resolve_selection(root, selection)
            .map(|item| item.name().to_string())
            .unwrap_or_else(|| ALL_ROOMS_TITLE.to_string()),
    )
}

/// Drop pseudo spaces that currently have nothing to show.
///
/// The root selected by the first segment of `selection` is always kept so
/// the user is not pulled out of it.
pub fn filter_by_unread(
    root: &[SpaceHierarchyItem],
    selection: Option<&[String]>,
    hide_empty: bool,
) -> Vec<SpaceHierarchyItem> {
    if !hide_empty {
        return root.to_vec();
    }
    let current = selection.and_then(|s| s.first());
    root.iter()
        .filter(|item| {
            current.is_some_and(|id| *id == item.selection_id())
                || !item
                    .unread_counts()
                    .is_some_and(|counts| item.can_hide(counts))
        })
        .cloned()
        .collect()
}

/// Depth-first list of every node together with all of its parents.
///
/// A space reachable through several parents appears once, listing each
/// distinct parent. Its subtree is only walked the first time.
pub fn flatten_with_parents(
    root: &[SpaceHierarchyItem],
) -> Vec<(&SpaceHierarchyItem, Vec<&SpaceHierarchyItem>)> {
    let mut result = Vec::new();
    collect_with_parents(root, None, &mut result);
    result
}

fn collect_with_parents<'a>(
    level: &'a [SpaceHierarchyItem],
    parent: Option<&'a SpaceHierarchyItem>,
    result: &mut Vec<(&'a SpaceHierarchyItem, Vec<&'a SpaceHierarchyItem>)>,
) {
    for item in level {
        let id = item.selection_id();
        if let Some((_, parents)) = result.iter_mut().find(|(seen, _)| seen.selection_id() == id) {
            if let Some(parent) = parent {
                let parent_id = parent.selection_id();
                if !parents.iter().any(|p| p.selection_id() == parent_id) {
                    parents.push(parent);
                }
            }
            continue;
        }
        result.push((item, parent.into_iter().collect()));
        collect_with_parents(item.child_spaces(), Some(item), result);
    }
}
