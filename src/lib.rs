// Leaf types shared by every layer
pub mod types;

pub mod config;
pub mod prefs;
pub mod store;

// Space hierarchy and the upstream room list
pub mod roomlist;
pub mod spaces;

// Reactive pipeline
pub mod debounce;
pub mod filter;
pub mod unread;

pub use config::SpaceNavConfig;
pub use filter::{SelectedSpace, SpaceAwareRoomList};
pub use prefs::{BoolPref, PreferenceStore, PseudoSpaceSettings};
pub use unread::{CountingMode, SpaceUnreadCounts, SpaceUnreadCountsDataSource};
