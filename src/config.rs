use std::time::Duration;

/// Timing knobs of the space navigation pipeline.
#[derive(Clone, Debug)]
pub struct SpaceNavConfig {
    /// Quiescence window before a selection is written to storage.
    pub persist_debounce: Duration,
    /// Quiescence window before a selection change forces a space list rebuild.
    pub rebuild_debounce: Duration,
    /// Delay before subscribing to the rooms of a visible range.
    pub subscribe_debounce: Duration,
    /// Minimum period between two unread count passes caused by room updates.
    pub unread_throttle: Duration,
}

impl Default for SpaceNavConfig {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(2000),
            rebuild_debounce: Duration::from_millis(500),
            subscribe_debounce: Duration::from_millis(300),
            unread_throttle: Duration::from_millis(300),
        }
    }
}
