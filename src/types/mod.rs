pub mod room;
pub mod space;

pub use room::{RoomDisplayType, RoomId, RoomSummaries, RoomSummary};
pub use space::{SpaceChild, SpaceSummary};

/// Ordered chain of selection ids describing the navigated space, root to leaf.
///
/// An empty path means nothing is selected. Paths are never validated when
/// stored; they are checked lazily whenever they are resolved against the
/// current hierarchy.
pub type SelectionPath = Vec<String>;
