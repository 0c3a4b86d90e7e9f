use super::directive::{DeckDirective, ExitRelay};
use super::precache::PrecacheScheduler;
use super::route::{self, Route, RouteArgs, TransitionDirection};
use super::slide::SlideRegistry;
use super::{RenderContext, Surface};

/// Observer for everything the controller announces to its host.
///
/// One listener per controller, fixed at construction. Callbacks run on the
/// caller's thread, after the state they describe has been committed.
pub trait DeckListener<C> {
    fn on_index_changed(&mut self, _index: usize) {}
    fn on_route_replaced(&mut self, _route: &Route<C>) {}
    fn on_exit_requested(&mut self) {}
}

impl<C> DeckListener<C> for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: usize, to: usize },
    /// Already at the first/last slide in the direction of travel.
    AtBoundary,
    ExitRequested,
    /// Zero delta, or the controller has been disposed.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationOptions {
    pub start_index: usize,
    pub directive: DeckDirective,
    pub precache: PrecacheScheduler,
}

#[derive(Debug, Clone, Copy, Default)]
struct NavigationState {
    current_index: usize,
    last_step_sign: Option<i8>,
}

/// The deck's state machine: current slide, exit evaluation, route changes.
///
/// Precache hooks only ever see a [`RenderContext`], never the controller, so
/// a hook cannot navigate from inside a step.
pub struct NavigationController<C> {
    slides: SlideRegistry<C>,
    state: NavigationState,
    directive: DeckDirective,
    relay: ExitRelay,
    precache: PrecacheScheduler,
    ctx: RenderContext,
    route: Route<C>,
    listener: Box<dyn DeckListener<C>>,
    /// One-shot look-ahead, run after the host's first frame.
    pending_lookahead: Option<usize>,
    disposed: bool,
}

impl<C> NavigationController<C> {
    pub fn new(
        slides: SlideRegistry<C>,
        ctx: RenderContext,
        options: NavigationOptions,
        listener: Box<dyn DeckListener<C>>,
    ) -> Self {
        let start = slides.clamp_index(options.start_index);
        let route = route::resolve(
            start,
            slides.get_clamped(start),
            &ctx,
            RouteArgs::instant(),
            TransitionDirection::Forward,
        );
        tracing::debug!(
            slides = slides.len(),
            start,
            directive = %options.directive,
            "deck controller created"
        );
        Self {
            slides,
            state: NavigationState {
                current_index: start,
                last_step_sign: None,
            },
            directive: options.directive,
            relay: ExitRelay::new(options.directive),
            precache: options.precache,
            ctx,
            route,
            listener,
            pending_lookahead: Some(start + 1),
            disposed: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.slides.clamp_index(self.state.current_index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn route(&self) -> &Route<C> {
        &self.route
    }

    #[cfg(test)]
    pub fn directive(&self) -> DeckDirective {
        self.directive
    }

    #[cfg(test)]
    pub fn last_step_sign(&self) -> Option<i8> {
        self.state.last_step_sign
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Move by `delta` slides with animation.
    pub fn step(&mut self, delta: isize) -> StepOutcome {
        self.step_with(delta, RouteArgs::animated())
    }

    /// Move by `delta` slides. The only operation that changes the index.
    pub fn step_with(&mut self, delta: isize, args: RouteArgs) -> StepOutcome {
        if self.disposed || delta == 0 {
            return StepOutcome::Ignored;
        }

        if self.directive.exits_on(delta) {
            tracing::debug!(delta, directive = %self.directive, "step leaves the deck");
            self.listener.on_exit_requested();
            return StepOutcome::ExitRequested;
        }

        let current = self.current_index();
        let target = current
            .saturating_add_signed(delta)
            .min(self.slides.last_index());
        if target == current {
            tracing::trace!(delta, index = current, "step stopped at boundary");
            return StepOutcome::AtBoundary;
        }

        let neighbour = target as isize;
        self.precache.precache(&self.slides, neighbour - 1, &self.ctx);
        self.precache.precache(&self.slides, neighbour + 1, &self.ctx);

        self.state = NavigationState {
            current_index: target,
            last_step_sign: Some(if delta > 0 { 1 } else { -1 }),
        };
        tracing::debug!(from = current, to = target, "slide changed");

        let direction = TransitionDirection::from_sign(self.state.last_step_sign);
        self.route = route::resolve(
            target,
            self.slides.get_clamped(target),
            &self.ctx,
            args,
            direction,
        );
        self.listener.on_route_replaced(&self.route);
        self.listener.on_index_changed(target);

        StepOutcome::Moved {
            from: current,
            to: target,
        }
    }

    /// Feed the host's current directive. A change into
    /// [`DeckDirective::Exit`] requests exit right away.
    pub fn set_directive(&mut self, directive: DeckDirective) {
        if self.disposed {
            return;
        }
        if directive != self.directive {
            tracing::debug!(from = %self.directive, to = %directive, "deck directive changed");
        }
        self.directive = directive;
        if self.relay.observe(directive) {
            self.listener.on_exit_requested();
        }
    }

    /// Explicit exit request from the host (e.g. the quit key).
    pub fn request_exit(&mut self) {
        if self.disposed {
            return;
        }
        self.listener.on_exit_requested();
    }

    /// Run the deferred look-ahead precache. Only the first call does work.
    pub fn after_first_frame(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(index) = self.pending_lookahead.take() {
            self.precache.precache(&self.slides, index as isize, &self.ctx);
        }
    }

    /// Swap in a rebuilt slide list, e.g. after the deck file changed.
    ///
    /// The index is clamped to the new last slide. This is not a navigation:
    /// the route is replaced without animation and no index change is
    /// announced.
    pub fn replace_slides(&mut self, slides: SlideRegistry<C>) {
        if self.disposed {
            return;
        }
        let previous = self.state.current_index;
        self.slides = slides;
        let index = self.slides.clamp_index(previous);
        if index != previous {
            tracing::debug!(from = previous, to = index, "index clamped to shorter deck");
        }
        self.state.current_index = index;

        let direction = TransitionDirection::from_sign(self.state.last_step_sign);
        self.route = route::resolve(
            index,
            self.slides.get_clamped(index),
            &self.ctx,
            RouteArgs::instant(),
            direction,
        );
        self.listener.on_route_replaced(&self.route);
    }

    /// Takes effect at the next route resolution.
    pub fn set_surface(&mut self, surface: Surface) {
        if self.disposed {
            return;
        }
        self.ctx.surface = surface;
    }

    /// Tear down: drop the pending look-ahead and silence every callback.
    pub fn dispose(&mut self) {
        self.pending_lookahead = None;
        self.disposed = true;
    }
}
