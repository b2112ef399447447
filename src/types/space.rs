use super::RoomId;
use serde::{Deserialize, Serialize};

/// A `m.space.child` relation as seen from the parent space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceChild {
    pub room_id: RoomId,
    /// Order of the child inside its parent, if the relation carries one.
    pub order: Option<String>,
}

impl SpaceChild {
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            order: None,
        }
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}

/// Raw space record from the space graph, before the hierarchy is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSummary {
    pub room_id: RoomId,
    pub name: Option<String>,
    /// Root-level order taken from the space's account data.
    pub order: Option<String>,
    pub children: Vec<SpaceChild>,
}

impl SpaceSummary {
    pub fn new(room_id: impl Into<RoomId>, name: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            name: Some(name.into()),
            order: None,
            children: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_child(mut self, child: SpaceChild) -> Self {
        self.children.push(child);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Nameless Space")
    }
}
