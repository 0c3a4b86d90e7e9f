use std::str::FromStr;
use std::time::{Duration, Instant};

use super::slide::Slide;
use super::{DeckError, RenderContext};
use crate::theme::Theme;

pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Fade,
    SlideHorizontal,
    Zoom,
}

impl TransitionKind {
    /// Parse a transition name. `none` yields `Ok(None)`: no animation.
    pub fn parse_optional(name: &str) -> Result<Option<Self>, DeckError> {
        match name.trim() {
            "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::SlideHorizontal => "slide",
            Self::Zoom => "zoom",
        }
    }
}

impl FromStr for TransitionKind {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fade" => Ok(Self::Fade),
            "slide" => Ok(Self::SlideHorizontal),
            "zoom" => Ok(Self::Zoom),
            other => Err(DeckError::UnknownTransition(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    Forward,
    Backward,
}

impl TransitionDirection {
    /// Direction hint from the sign of the last applied step. No step yet
    /// counts as forward.
    pub fn from_sign(sign: Option<i8>) -> Self {
        match sign {
            Some(s) if s < 0 => Self::Backward,
            _ => Self::Forward,
        }
    }
}

/// A slide's transition descriptor. Builds the animated route for its slide;
/// the resolver never looks inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTransition {
    pub kind: TransitionKind,
    pub duration: Duration,
}

impl SlideTransition {
    pub fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            duration: DEFAULT_TRANSITION_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn build_route<C>(
        &self,
        name: RouteName,
        page: Page<C>,
        direction: TransitionDirection,
    ) -> Route<C> {
        Route {
            name,
            page,
            transition: RouteTransition::Animated {
                kind: self.kind,
                duration: self.duration,
                direction,
            },
        }
    }
}

/// Route identity: one name per slide index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteName(String);

impl RouteName {
    pub fn for_index(index: usize) -> Self {
        Self(format!("/slide/{index}"))
    }
}

impl std::fmt::Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built slide content, already wrapped with its theme override.
#[derive(Debug, Clone)]
pub struct Page<C> {
    pub index: usize,
    pub content: C,
    pub theme: Option<Theme>,
    pub animate_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteTransition {
    Instant,
    Animated {
        kind: TransitionKind,
        duration: Duration,
        direction: TransitionDirection,
    },
}

impl RouteTransition {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Instant => Duration::ZERO,
            Self::Animated { duration, .. } => *duration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route<C> {
    pub name: RouteName,
    pub page: Page<C>,
    pub transition: RouteTransition,
}

/// Arguments that accompany a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteArgs {
    pub animate: bool,
}

impl RouteArgs {
    pub fn animated() -> Self {
        Self { animate: true }
    }

    pub fn instant() -> Self {
        Self { animate: false }
    }
}

impl Default for RouteArgs {
    fn default() -> Self {
        Self::animated()
    }
}

/// Produce the route that presents `slide` at `index`.
pub fn resolve<C>(
    index: usize,
    slide: &Slide<C>,
    ctx: &RenderContext,
    args: RouteArgs,
    direction: TransitionDirection,
) -> Route<C> {
    let name = RouteName::for_index(index);
    let page = Page {
        index,
        content: slide.build(ctx),
        theme: slide.theme_override().cloned(),
        animate_in: args.animate,
    };

    match slide.transition() {
        Some(transition) if args.animate => transition.build_route(name, page, direction),
        _ => Route {
            name,
            page,
            transition: RouteTransition::Instant,
        },
    }
}

/// Host-side playback of an animated route change.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub from: usize,
    pub to: usize,
    pub kind: TransitionKind,
    pub direction: TransitionDirection,
    pub duration: Duration,
    pub start: Instant,
}

impl ActiveTransition {
    /// Returns `None` for instant routes and for pages that do not animate
    /// in: there is nothing to play.
    pub fn for_route<C>(from: usize, route: &Route<C>, start: Instant) -> Option<Self> {
        if !route.page.animate_in || route.transition.duration().is_zero() {
            return None;
        }
        match route.transition {
            RouteTransition::Instant => None,
            RouteTransition::Animated {
                kind,
                duration,
                direction,
            } => Some(Self {
                from,
                to: route.page.index,
                kind,
                direction,
                duration,
                start,
            }),
        }
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        ease_in_out((elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0))
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
