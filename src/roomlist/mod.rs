//! The upstream room list and the plumbing that talks to it.

pub mod loader;
pub mod memory;
pub mod range;
pub mod service;

pub use loader::load_all_incrementally;
pub use memory::MemoryRoomListService;
pub use range::{empty_range, translate_visible_range};
pub use service::{LoadingState, RoomCategory, RoomListFilter, RoomListService};

pub const PAGE_SIZE: usize = 20;
pub const EXTENDED_VISIBILITY_RANGE_SIZE: usize = 40;
pub const PAGINATION_THRESHOLD: usize = 3 * PAGE_SIZE;
