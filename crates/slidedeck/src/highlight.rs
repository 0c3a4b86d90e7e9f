//! Syntax highlighting for code blocks.
//!
//! The syntax and theme sets are expensive to load, so a [`Highlighter`] is
//! created once at startup and shared through the render context. Highlighted
//! output is cached per `(theme, language, code)`; precache hooks fill the
//! cache ahead of navigation so the renderer only does lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// One line of highlighted code: colored spans in order.
pub type HighlightedLine = Vec<(Color32, String)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    theme: String,
    language: Option<String>,
    code: String,
}

pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    cache: Mutex<HashMap<CacheKey, Arc<Vec<HighlightedLine>>>>,
}

impl Highlighter {
    /// Load the bundled syntax definitions and themes.
    pub fn initialize() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let themes = ThemeSet::load_defaults();
        tracing::debug!(
            syntaxes = syntaxes.syntaxes().len(),
            themes = themes.themes.len(),
            "syntax highlighter initialized"
        );
        Self {
            syntaxes,
            themes,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_theme(&self, name: &str) -> bool {
        self.themes.themes.contains_key(name)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.themes.keys().map(String::as_str)
    }

    /// Cached lookup only; never highlights.
    pub fn cached(
        &self,
        code: &str,
        language: Option<&str>,
        theme: &str,
    ) -> Option<Arc<Vec<HighlightedLine>>> {
        let key = cache_key(code, language, theme);
        self.cache.lock().ok()?.get(&key).cloned()
    }

    /// Highlight `code`, reusing an earlier result when there is one.
    pub fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        theme: &str,
    ) -> Result<Arc<Vec<HighlightedLine>>> {
        if let Some(lines) = self.cached(code, language, theme) {
            return Ok(lines);
        }

        let lines = Arc::new(self.highlight_uncached(code, language, theme)?);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(cache_key(code, language, theme), Arc::clone(&lines));
        }
        Ok(lines)
    }

    fn highlight_uncached(
        &self,
        code: &str,
        language: Option<&str>,
        theme: &str,
    ) -> Result<Vec<HighlightedLine>> {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let theme = self
            .themes
            .themes
            .get(theme)
            .with_context(|| format!("Unknown code theme: {theme}"))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntaxes)
                .context("Failed to highlight code")?;
            let spans = ranges
                .into_iter()
                .map(|(style, text)| {
                    let c = style.foreground;
                    (
                        Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a),
                        text.trim_end_matches(['\n', '\r']).to_string(),
                    )
                })
                .filter(|(_, text)| !text.is_empty())
                .collect();
            lines.push(spans);
        }
        Ok(lines)
    }
}

fn cache_key(code: &str, language: Option<&str>, theme: &str) -> CacheKey {
    CacheKey {
        theme: theme.to_string(),
        language: language.map(str::to_string),
        code: code.to_string(),
    }
}
