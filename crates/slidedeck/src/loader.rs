//! Turns a parsed markdown deck into the controller's slide registry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::deck::{
    AspectRatio, DeckDirective, Slide, SlideRegistry, SlideTransition, TransitionKind,
};
use crate::parser::{self, DeckMeta, ParsedDeck, ParsedSlide};
use crate::theme::Theme;

/// What each slide's content factory produces.
pub type SlideContent = Arc<ParsedSlide>;

#[derive(Debug)]
pub struct LoadedDeck {
    pub meta: DeckMeta,
    pub theme: Theme,
    pub aspect: Option<AspectRatio>,
    /// `deck_action` from the frontmatter.
    pub directive: DeckDirective,
    pub slides: SlideRegistry<SlideContent>,
}

pub fn load_file(path: &Path, config: &Config) -> Result<LoadedDeck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let deck = parser::parse(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    build(deck, config)
}

pub fn build(deck: ParsedDeck, config: &Config) -> Result<LoadedDeck> {
    let ParsedDeck { meta, slides } = deck;
    let code_theme = meta.code_theme.as_deref();

    let theme_name = meta
        .theme
        .as_deref()
        .or(config.default_theme())
        .unwrap_or("light");
    let theme = Theme::named(theme_name)
        .with_context(|| format!("Unknown theme: {theme_name}"))?
        .with_code_theme(code_theme);

    let deck_transition = match meta.transition.as_deref().or(config.default_transition()) {
        Some(name) => TransitionKind::parse_optional(name).context("Invalid deck transition")?,
        None => Some(TransitionKind::Fade),
    };
    let duration = config.transition_duration();

    let aspect = match meta.aspect.as_deref() {
        Some(aspect) => Some(aspect.parse::<AspectRatio>()?),
        None => config.default_aspect(),
    };

    let directive = match meta.deck_action.as_deref() {
        Some(action) => action.parse::<DeckDirective>()?,
        None => DeckDirective::None,
    };

    let built = slides
        .into_iter()
        .enumerate()
        .map(|(index, slide)| {
            build_slide(index, slide, deck_transition, duration, &theme, code_theme)
        })
        .collect();
    let slides = SlideRegistry::new(built)?;

    tracing::debug!(
        slides = slides.len(),
        theme = %theme.name,
        transition = deck_transition.map_or("none", |kind| kind.name()),
        directive = %directive,
        "deck loaded"
    );

    Ok(LoadedDeck {
        meta,
        theme,
        aspect,
        directive,
        slides,
    })
}

fn build_slide(
    index: usize,
    parsed: ParsedSlide,
    deck_transition: Option<TransitionKind>,
    duration: Duration,
    deck_theme: &Theme,
    code_theme: Option<&str>,
) -> Slide<SlideContent> {
    let transition = match parsed.directive("transition") {
        Some(name) => match TransitionKind::parse_optional(name) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!(slide = index + 1, "{e}, using the deck transition");
                deck_transition
            }
        },
        None => deck_transition,
    };

    let theme_override = parsed.directive("theme").and_then(|name| {
        let theme = Theme::named(name).map(|t| t.with_code_theme(code_theme));
        if theme.is_none() {
            tracing::warn!(slide = index + 1, "unknown theme '{name}', using the deck theme");
        }
        theme
    });

    let name = parsed.directive("name").map(str::to_string);
    let highlight_theme = theme_override
        .as_ref()
        .unwrap_or(deck_theme)
        .code_theme
        .clone();
    let code: Vec<(Option<String>, String)> = parsed
        .code_blocks()
        .map(|(lang, code)| (lang.map(str::to_string), code.to_string()))
        .collect();

    let content: SlideContent = Arc::new(parsed);
    let mut slide = Slide::new(move |_| Arc::clone(&content))
        .with_transition(
            transition.map(|kind| SlideTransition::new(kind).with_duration(duration)),
        )
        .with_theme(theme_override);

    if let Some(name) = name {
        slide = slide.named(name);
    }

    if !code.is_empty() {
        slide = slide.on_precache(move |ctx| {
            let Some(highlighter) = &ctx.highlighter else {
                return Ok(());
            };
            for (language, code) in &code {
                highlighter.highlight(code, language.as_deref(), &highlight_theme)?;
            }
            Ok(())
        });
    }

    slide
}
