//! The presentation controller: slide registry, navigation state machine,
//! transition resolution, look-ahead precaching, idle tracking for the
//! on-screen controls and the exit relay.
//!
//! Everything here runs on the host's event thread. The only work that can
//! leave that thread is a precache hook dispatched to the worker pool.

pub mod activity;
pub mod directive;
pub mod navigation;
pub mod precache;
pub mod route;
pub mod session;
pub mod slide;
pub mod surface;

use std::sync::Arc;

use thiserror::Error;

use crate::highlight::Highlighter;

pub use activity::{ActivityTracker, CONTROLS_HIDE_DELAY};
pub use directive::DeckDirective;
pub use navigation::{DeckListener, NavigationController, NavigationOptions, StepOutcome};
pub use precache::{PrecacheDispatch, PrecacheScheduler};
pub use route::{
    ActiveTransition, DEFAULT_TRANSITION_DURATION, Route, RouteArgs, SlideTransition,
    TransitionDirection, TransitionKind,
};
pub use session::{DeckInput, DeckSession};
pub use slide::{Slide, SlideRegistry};
pub use surface::{AspectRatio, Surface};

#[derive(Debug, Error, PartialEq)]
pub enum DeckError {
    #[error("deck has no slides")]
    EmptyDeck,

    #[error("invalid aspect ratio '{0}', expected W:H such as 16:9")]
    InvalidAspect(String),

    #[error("unknown transition '{0}', expected fade, slide, zoom or none")]
    UnknownTransition(String),

    #[error(
        "unknown deck action '{0}', expected none, exit-on-next, exit-on-previous, exit-on-next-or-previous or exit"
    )]
    UnknownDeckAction(String),
}

/// Everything a content factory or precache hook may look at.
///
/// Cheap to clone; handed by value to hooks running on the worker pool.
#[derive(Clone, Default)]
pub struct RenderContext {
    pub surface: Surface,
    pub highlighter: Option<Arc<Highlighter>>,
}

impl RenderContext {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            highlighter: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: Arc<Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("surface", &self.surface)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}
