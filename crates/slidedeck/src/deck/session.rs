use std::time::Instant;

use super::activity::ActivityTracker;
use super::navigation::{NavigationController, StepOutcome};

/// Logical inputs a host translates its raw events into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckInput {
    Next,
    Previous,
    ExitRequested,
    PointerMoved,
    PointerEnteredControls,
    PointerExitedControls,
}

/// A running presentation: navigation plus controls visibility, torn down
/// together.
pub struct DeckSession<C> {
    navigation: NavigationController<C>,
    activity: ActivityTracker,
}

impl<C> DeckSession<C> {
    pub fn new(navigation: NavigationController<C>, activity: ActivityTracker) -> Self {
        Self {
            navigation,
            activity,
        }
    }

    /// Apply one input. Navigation inputs report their outcome.
    pub fn handle(&mut self, input: DeckInput, now: Instant) -> Option<StepOutcome> {
        match input {
            DeckInput::Next => Some(self.navigation.step(1)),
            DeckInput::Previous => Some(self.navigation.step(-1)),
            DeckInput::ExitRequested => {
                self.navigation.request_exit();
                None
            }
            DeckInput::PointerMoved => {
                self.activity.on_pointer_moved(now);
                None
            }
            DeckInput::PointerEnteredControls => {
                self.activity.on_pointer_enter_controls();
                None
            }
            DeckInput::PointerExitedControls => {
                self.activity.on_pointer_exit_controls();
                None
            }
        }
    }

    /// Advance timers. Returns whether the controls' visibility changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.activity.tick(now)
    }

    pub fn controls_visible(&self) -> bool {
        self.activity.controls_visible()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.activity.next_deadline()
    }

    pub fn navigation(&self) -> &NavigationController<C> {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationController<C> {
        &mut self.navigation
    }

    pub fn dispose(&mut self) {
        self.activity.retire();
        self.navigation.dispose();
    }
}

impl<C> Drop for DeckSession<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::deck::navigation::{DeckListener, NavigationOptions};
    use crate::deck::{DeckDirective, RenderContext, Slide, SlideRegistry};

    #[derive(Clone, Default)]
    struct ExitCounter(Rc<Cell<usize>>);

    impl DeckListener<u8> for ExitCounter {
        fn on_exit_requested(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn session(count: u8, exits: &ExitCounter) -> DeckSession<u8> {
        let slides = (0..count).map(|i| Slide::new(move |_| i)).collect();
        let navigation = NavigationController::new(
            SlideRegistry::new(slides).unwrap(),
            RenderContext::default(),
            NavigationOptions::default(),
            Box::new(exits.clone()),
        );
        DeckSession::new(navigation, ActivityTracker::default())
    }

    #[test]
    fn test_inputs_route_to_components() {
        let exits = ExitCounter::default();
        let mut session = session(3, &exits);
        let now = Instant::now();

        assert_eq!(
            session.handle(DeckInput::Next, now),
            Some(StepOutcome::Moved { from: 0, to: 1 })
        );
        assert_eq!(
            session.handle(DeckInput::Previous, now),
            Some(StepOutcome::Moved { from: 1, to: 0 })
        );
        assert_eq!(session.handle(DeckInput::PointerMoved, now), None);
        assert!(session.controls_visible());
        session.handle(DeckInput::PointerEnteredControls, now);
        assert!(!session.tick(now + Duration::from_secs(3)));
        session.handle(DeckInput::PointerExitedControls, now);
        assert!(!session.controls_visible());

        session.handle(DeckInput::ExitRequested, now);
        assert_eq!(exits.0.get(), 1);
    }

    #[test]
    fn test_dispose_cancels_timer_and_callbacks() {
        let exits = ExitCounter::default();
        let mut session = session(2, &exits);
        let now = Instant::now();
        session.handle(DeckInput::PointerMoved, now);
        assert!(session.next_deadline().is_some());

        session.dispose();
        assert_eq!(session.next_deadline(), None);
        assert!(!session.tick(now + Duration::from_secs(10)));
        assert_eq!(session.handle(DeckInput::Next, now), Some(StepOutcome::Ignored));
        session.navigation_mut().set_directive(DeckDirective::Exit);
        session.handle(DeckInput::ExitRequested, now);
        assert_eq!(exits.0.get(), 0);
        assert_eq!(session.navigation().current_index(), 0);
    }
}
