//! Room summary records as delivered by the room list service.
//!
//! Summaries are treated as opaque snapshots: a stable identifier, a display
//! type, two sets of unread counters and a few flags used by the pseudo
//! spaces. A fresh list is produced on every upstream change and the order of
//! rooms may change between two lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared, immutable snapshot of a room list.
pub type RoomSummaries = Arc<[RoomSummary]>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How a room is rendered in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomDisplayType {
    #[default]
    Room,
    Invite,
    Knocked,
    Placeholder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub name: Option<String>,
    pub display_type: RoomDisplayType,

    // Client-generated estimates
    pub num_unread_mentions: u64,
    pub num_unread_notifications: u64,
    pub num_unread_messages: u64,

    // Server-reported counts
    pub highlight_count: u64,
    pub notification_count: u64,
    pub unread_count: u64,

    pub is_marked_unread: bool,
    pub is_favorite: bool,
    pub is_dm: bool,
}

impl RoomSummary {
    /// Create an ordinary room with all counters at zero.
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Default::default()
        }
    }

    pub fn is_invite(&self) -> bool {
        self.display_type == RoomDisplayType::Invite
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.room_id.as_str())
    }
}
