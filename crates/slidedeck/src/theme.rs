use eframe::egui::Color32;

/// Deck-level visual configuration. The controller only passes it around;
/// the renderer is the one that reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub code_background: Color32,
    pub code_foreground: Color32,
    /// syntect theme used for code blocks
    pub code_theme: String,
    pub h1_size: f32,
    pub h2_size: f32,
    pub h3_size: f32,
    pub body_size: f32,
    pub code_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            code_background: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            code_foreground: Color32::from_rgb(0xD4, 0xD4, 0xD4),
            code_theme: "base16-ocean.dark".to_string(),
            h1_size: 96.0,
            h2_size: 72.0,
            h3_size: 52.0,
            body_size: 44.0,
            code_size: 30.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            code_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            code_foreground: Color32::from_rgb(0x33, 0x33, 0x33),
            code_theme: "InspiredGitHub".to_string(),
            h1_size: 96.0,
            h2_size: 72.0,
            h3_size: 52.0,
            body_size: 44.0,
            code_size: 30.0,
        }
    }

    /// Look up a built-in theme.
    pub fn named(name: &str) -> Option<Self> {
        match name.trim() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn with_code_theme(mut self, code_theme: Option<&str>) -> Self {
        if let Some(code_theme) = code_theme {
            self.code_theme = code_theme.to_string();
        }
        self
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1 => self.h1_size,
            2 => self.h2_size,
            3 => self.h3_size,
            _ => self.body_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_themes() {
        assert_eq!(Theme::named("dark").map(|t| t.name), Some("dark".to_string()));
        assert_eq!(Theme::named(" light ").map(|t| t.name), Some("light".to_string()));
        assert!(Theme::named("solarized").is_none());
    }

    #[test]
    fn test_code_theme_override() {
        let theme = Theme::light().with_code_theme(Some("Solarized (dark)"));
        assert_eq!(theme.code_theme, "Solarized (dark)");
        assert_eq!(Theme::dark().with_code_theme(None).code_theme, "base16-ocean.dark");
    }

    #[test]
    fn test_heading_size_falls_back_to_body() {
        let theme = Theme::dark();
        assert_eq!(theme.heading_size(1), 96.0);
        assert_eq!(theme.heading_size(6), theme.body_size);
    }
}
