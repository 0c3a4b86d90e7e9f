use std::sync::Arc;

use super::route::SlideTransition;
use super::{DeckError, RenderContext};
use crate::theme::Theme;

/// Builds a slide's content for the current render context.
pub type ContentFactory<C> = Arc<dyn Fn(&RenderContext) -> C + Send + Sync>;

/// Side-effecting warm-up for a slide that is about to become reachable.
pub type PrecacheHook = Arc<dyn Fn(&RenderContext) -> anyhow::Result<()> + Send + Sync>;

/// An immutable slide descriptor.
pub struct Slide<C> {
    content: ContentFactory<C>,
    name: Option<String>,
    transition: Option<SlideTransition>,
    theme_override: Option<Theme>,
    on_precache: Option<PrecacheHook>,
}

impl<C> Slide<C> {
    pub fn new(content: impl Fn(&RenderContext) -> C + Send + Sync + 'static) -> Self {
        Self {
            content: Arc::new(content),
            name: None,
            transition: None,
            theme_override: None,
            on_precache: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transition(mut self, transition: Option<SlideTransition>) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme_override = theme;
        self
    }

    pub fn on_precache(
        mut self,
        hook: impl Fn(&RenderContext) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_precache = Some(Arc::new(hook));
        self
    }

    pub fn build(&self, ctx: &RenderContext) -> C {
        (self.content)(ctx)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transition(&self) -> Option<&SlideTransition> {
        self.transition.as_ref()
    }

    pub fn theme_override(&self) -> Option<&Theme> {
        self.theme_override.as_ref()
    }

    pub fn precache_hook(&self) -> Option<&PrecacheHook> {
        self.on_precache.as_ref()
    }
}

impl<C> Clone for Slide<C> {
    fn clone(&self) -> Self {
        Self {
            content: Arc::clone(&self.content),
            name: self.name.clone(),
            transition: self.transition,
            theme_override: self.theme_override.clone(),
            on_precache: self.on_precache.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Slide<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slide")
            .field("name", &self.name)
            .field("transition", &self.transition)
            .field(
                "theme_override",
                &self.theme_override.as_ref().map(|t| t.name.as_str()),
            )
            .field("on_precache", &self.on_precache.is_some())
            .finish()
    }
}

/// The ordered, non-empty set of slides a deck presents.
#[derive(Debug, Clone)]
pub struct SlideRegistry<C> {
    slides: Vec<Slide<C>>,
}

impl<C> SlideRegistry<C> {
    pub fn new(slides: Vec<Slide<C>>) -> Result<Self, DeckError> {
        if slides.is_empty() {
            return Err(DeckError::EmptyDeck);
        }
        Ok(Self { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Highest valid index. The registry is never empty.
    pub fn last_index(&self) -> usize {
        self.slides.len() - 1
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Slide<C>> {
        self.slides.get(index)
    }

    /// Signed lookup; negative indices are simply out of range.
    pub fn get_signed(&self, index: isize) -> Option<&Slide<C>> {
        usize::try_from(index).ok().and_then(|i| self.slides.get(i))
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// The slide at `index`, or the last slide when `index` is past the end.
    pub fn get_clamped(&self, index: usize) -> &Slide<C> {
        &self.slides[self.clamp_index(index)]
    }

    /// Index of the first slide with this name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.name() == Some(name))
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Slide<C>> {
        self.slides.iter()
    }
}
