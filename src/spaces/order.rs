use super::item::SpaceHierarchyItem;
use std::cmp::Ordering;

/// Ordering of spaces inside one level of the hierarchy.
///
/// Spaces with an explicit order come first, sorted by that order. Spaces
/// without one follow, sorted by lowercase name. Note that this puts a missing
/// order last, unlike the usual `Option` ordering.
pub fn compare_space_order(
    a_order: Option<&str>,
    a_name: &str,
    b_order: Option<&str>,
    b_name: &str,
) -> Ordering {
    let by_order = match (a_order, b_order) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order.then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
}

pub fn compare_spaces(a: &SpaceHierarchyItem, b: &SpaceHierarchyItem) -> Ordering {
    compare_space_order(a.order(), a.name(), b.order(), b.name())
        .then_with(|| a.selection_id().cmp(&b.selection_id()))
}

pub fn sort_spaces(spaces: &mut [SpaceHierarchyItem]) {
    spaces.sort_by(compare_spaces);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::item::RealSpace;
    use crate::types::RoomId;

    fn space(id: &str, name: &str, order: Option<&str>) -> SpaceHierarchyItem {
        SpaceHierarchyItem::Space(RealSpace {
            room_id: RoomId::from(id),
            name: name.to_string(),
            order: order.map(str::to_string),
            spaces: Vec::new(),
            direct_children: Default::default(),
            flattened_rooms: Default::default(),
            unread_counts: None,
        })
    }

    #[test]
    fn test_defined_order_sorts_before_names() {
        let mut spaces = vec![
            space("!a", "A", Some("2")),
            space("!b", "B", Some("1")),
            space("!c", "z", None),
            space("!d", "a", None),
        ];
        sort_spaces(&mut spaces);

        let ids: Vec<String> = spaces.iter().map(|s| s.selection_id()).collect();
        assert_eq!(ids, vec!["s:!b", "s:!a", "s:!d", "s:!c"]);
    }

    #[test]
    fn test_names_compare_case_insensitively() {
        assert_eq!(
            compare_space_order(None, "beta", None, "Alpha"),
            Ordering::Greater
        );
        assert_eq!(
            compare_space_order(None, "Zed", Some("zzz"), "aaa"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_equal_order_falls_back_to_name() {
        let mut spaces = vec![space("!x", "Xylo", Some("5")), space("!y", "alpha", Some("5"))];
        sort_spaces(&mut spaces);
        assert_eq!(spaces[0].name(), "alpha");
    }
}
