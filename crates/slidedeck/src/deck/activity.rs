use std::time::{Duration, Instant};

/// How long the controls stay up after the pointer stops moving.
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(2);

/// A single-shot, re-armable deadline. Arming again replaces the pending
/// deadline; there is never more than one.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn rearm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Visibility of the transient on-screen controls.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    recently_active: bool,
    pointer_over_controls: bool,
    timer: DebounceTimer,
    retired: bool,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(CONTROLS_HIDE_DELAY)
    }
}

impl ActivityTracker {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            recently_active: false,
            pointer_over_controls: false,
            timer: DebounceTimer::new(hide_delay),
            retired: false,
        }
    }

    pub fn controls_visible(&self) -> bool {
        self.recently_active || self.pointer_over_controls
    }

    /// Returns whether visibility changed.
    pub fn on_pointer_moved(&mut self, now: Instant) -> bool {
        if self.retired {
            return false;
        }
        let before = self.controls_visible();
        self.timer.rearm(now);
        self.recently_active = true;
        before != self.controls_visible()
    }

    pub fn on_pointer_enter_controls(&mut self) -> bool {
        self.set_over_controls(true)
    }

    pub fn on_pointer_exit_controls(&mut self) -> bool {
        self.set_over_controls(false)
    }

    fn set_over_controls(&mut self, over: bool) -> bool {
        if self.retired {
            return false;
        }
        let before = self.controls_visible();
        self.pointer_over_controls = over;
        before != self.controls_visible()
    }

    /// Advance the debounce timer. Returns whether visibility changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.retired || !self.timer.fire_if_due(now) {
            return false;
        }
        let before = self.controls_visible();
        self.recently_active = false;
        tracing::trace!(over_controls = self.pointer_over_controls, "pointer idle");
        before != self.controls_visible()
    }

    /// When the host should next call [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.retired {
            None
        } else {
            self.timer.deadline()
        }
    }

    /// Cancel the pending timer and ignore everything afterwards.
    pub fn retire(&mut self) {
        self.timer.cancel();
        self.retired = true;
    }
}
