pub mod blocks;
pub mod frontmatter;
pub mod splitter;

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([A-Za-z0-9_-]+):\s*(.*?)\s*$").expect("directive pattern is valid")
});

#[derive(Debug, Clone)]
pub struct ParsedDeck {
    pub meta: DeckMeta,
    pub slides: Vec<ParsedSlide>,
}

/// Deck-wide settings from the YAML frontmatter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub theme: Option<String>,
    pub transition: Option<String>,
    pub aspect: Option<String>,
    pub footer: Option<String>,
    pub code_theme: Option<String>,
    pub deck_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSlide {
    pub directives: Vec<Directive>,
    pub blocks: Vec<Block>,
    /// The original markdown for this slide.
    pub raw_source: String,
}

impl ParsedSlide {
    /// Value of the last `@name:` directive with this name.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::CodeBlock { language, code } => Some((language.as_deref(), code.as_str())),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    List {
        items: Vec<String>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
}

pub fn parse(content: &str) -> Result<ParsedDeck> {
    let (meta, body) = frontmatter::extract(content)?;
    let slides = splitter::split(&body)
        .into_iter()
        .map(|raw| {
            let (directives, blocks) = blocks::parse(&raw);
            ParsedSlide {
                directives,
                blocks,
                raw_source: raw,
            }
        })
        .collect();
    Ok(ParsedDeck { meta, slides })
}

pub(crate) fn parse_directive(line: &str) -> Option<Directive> {
    let caps = DIRECTIVE.captures(line.trim())?;
    Some(Directive {
        name: caps[1].to_string(),
        value: caps[2].to_string(),
    })
}

pub(crate) fn is_directive(line: &str) -> bool {
    DIRECTIVE.is_match(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = "---
title: Rust in Practice
theme: dark
transition: fade
---

# Rust in Practice

A short tour

---

@name: ownership
@transition: slide
# Ownership

- Each value has one owner
- Moves transfer it

@theme: light
# Code

```rust
fn main() {}
```
";

    #[test]
    fn test_parse_deck() {
        let deck = parse(DECK).unwrap();
        assert_eq!(deck.meta.title.as_deref(), Some("Rust in Practice"));
        assert_eq!(deck.meta.transition.as_deref(), Some("fade"));
        assert_eq!(deck.slides.len(), 3);

        let ownership = &deck.slides[1];
        assert_eq!(ownership.directive("name"), Some("ownership"));
        assert_eq!(ownership.directive("transition"), Some("slide"));
        assert!(matches!(
            &ownership.blocks[1],
            Block::List { items } if items.len() == 2
        ));

        let code = &deck.slides[2];
        assert_eq!(code.directive("theme"), Some("light"));
        let blocks: Vec<_> = code.code_blocks().collect();
        assert_eq!(blocks, vec![(Some("rust"), "fn main() {}")]);
    }

    #[test]
    fn test_directive_syntax() {
        assert_eq!(
            parse_directive("@transition:  zoom  "),
            Some(Directive {
                name: "transition".to_string(),
                value: "zoom".to_string()
            })
        );
        assert!(is_directive("@code-theme: x"));
        assert!(!is_directive("@ mention: no"));
        assert!(!is_directive("email@example.com: no"));
    }

    #[test]
    fn test_last_directive_wins() {
        let deck = parse("@name: a\n@name: b\nText").unwrap();
        assert_eq!(deck.slides[0].directive("name"), Some("b"));
    }

    #[test]
    fn test_empty_body_has_no_slides() {
        let deck = parse("---\ntitle: Empty\n---\n\n\n").unwrap();
        assert!(deck.slides.is_empty());
    }
}
