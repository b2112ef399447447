//! Maps a window over the filtered list back onto the upstream list.
//!
//! The upstream service paginates and prefetches around the range it is
//! given, so it must see the span of upstream positions covering the rooms the
//! user actually looks at.

use crate::types::RoomSummary;
use log::{error, trace, warn};
use std::ops::RangeInclusive;

/// The canonical empty inclusive range.
pub fn empty_range() -> RangeInclusive<usize> {
    1..=0
}

/// Translate `range` over `filtered` into the upstream index range spanning
/// the same first and last rooms.
///
/// Both lists are snapshots, so a concurrent update cannot change them
/// mid-translation.
pub fn translate_visible_range(
    range: RangeInclusive<usize>,
    filtered: &[RoomSummary],
    upstream: &[RoomSummary],
) -> RangeInclusive<usize> {
    if range.is_empty() {
        return range;
    }
    if filtered.is_empty() {
        return empty_range();
    }
    if upstream.is_empty() {
        error!(
            target: "RoomList/Range",
            "Can't translate room range {range:?}, filtered list has {} entries but upstream is empty",
            filtered.len()
        );
        return empty_range();
    }
    if upstream.len() < filtered.len() {
        warn!(
            target: "RoomList/Range",
            "Filtered list has {} entries but upstream has only {}",
            filtered.len(),
            upstream.len()
        );
    }

    let last_index = filtered.len() - 1;
    let first_room = &filtered[(*range.start()).min(last_index)];
    let last_room = &filtered[(*range.end()).min(last_index)];

    let first = upstream
        .iter()
        .position(|room| room.room_id == first_room.room_id);
    let last = upstream
        .iter()
        .rposition(|room| room.room_id == last_room.room_id);

    let (Some(first), Some(last)) = (first, last) else {
        error!(
            target: "RoomList/Range",
            "Can't find all rooms in upstream room list: {} -> {first:?}, {} -> {last:?}",
            first_room.room_id,
            last_room.room_id
        );
        return range;
    };

    if first > last {
        error!(
            target: "RoomList/Range",
            "Unexpected room order: {} -> {first}, {} -> {last}",
            first_room.room_id,
            last_room.room_id
        );
        return last..=first;
    }

    trace!(
        target: "RoomList/Range",
        "Mapped visible range: {range:?} -> {first}..={last} via [{}, {}], total {}/{}",
        first_room.room_id,
        last_room.room_id,
        filtered.len(),
        upstream.len()
    );
    first..=last
}
