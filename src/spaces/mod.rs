//! Space hierarchy: model, construction, lookup and the reactive root list.

pub mod data_source;
pub mod hierarchy;
pub mod item;
pub mod order;
pub mod resolve;

pub use data_source::{SpaceGraphSource, SpaceList, SpaceListDataSource};
pub use hierarchy::build_space_hierarchy;
pub use item::{PseudoSpace, PseudoSpaceKind, RealSpace, SpaceHierarchyItem};
pub use resolve::{
    ALL_ROOMS_TITLE, filter_by_unread, flatten_with_parents, is_space_filter_active,
    resolve_selection, resolve_space_name,
};
