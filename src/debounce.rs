//! Timing primitives for the watch-driven pipeline stages.

use std::future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Fires once its input has been quiet for a full window.
///
/// Every `arm` pushes the deadline out again. `elapsed` is cancel-safe, so it
/// can sit in a `select!` next to the input it debounces.
#[derive(Debug)]
pub struct QuiescenceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl QuiescenceTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes when the armed deadline passes; pends forever while disarmed.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}

/// Rate limits a watch receiver without dropping the latest value.
///
/// The current value is yielded immediately; afterwards at most one value per
/// period, always the newest one seen.
pub struct ThrottleLatest<T> {
    rx: watch::Receiver<T>,
    period: Duration,
    next_allowed: Option<Instant>,
    started: bool,
}

impl<T: Clone> ThrottleLatest<T> {
    pub fn new(rx: watch::Receiver<T>, period: Duration) -> Self {
        Self {
            rx,
            period,
            next_allowed: None,
            started: false,
        }
    }

    /// Next throttled value, or `None` once the sender is gone.
    ///
    /// Cancel-safe: dropping the future never loses a change.
    pub async fn next(&mut self) -> Option<T> {
        if self.started {
            if let Some(at) = self.next_allowed {
                sleep_until(at).await;
            }
            self.rx.changed().await.ok()?;
        }
        self.started = true;
        self.next_allowed = Some(Instant::now() + self.period);
        Some(self.rx.borrow_and_update().clone())
    }
}
