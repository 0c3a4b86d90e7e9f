use std::str::FromStr;

use super::DeckError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: f32,
    pub height: f32,
}

impl AspectRatio {
    pub const WIDESCREEN: Self = Self {
        width: 16.0,
        height: 9.0,
    };

    pub fn ratio(&self) -> f32 {
        self.width / self.height
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl FromStr for AspectRatio {
    type Err = DeckError;

    /// Parse `W:H`, e.g. `16:9` or `4:3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DeckError::InvalidAspect(s.to_string());
        let (w, h) = s.trim().split_once(':').ok_or_else(invalid)?;
        let width: f32 = w.trim().parse().map_err(|_| invalid())?;
        let height: f32 = h.trim().parse().map_err(|_| invalid())?;
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// The surface the deck is presented on: the measured screen size, optionally
/// overridden by an explicit aspect ratio. Only the ratio matters to the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
    pub aspect_override: Option<AspectRatio>,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            aspect_override: None,
        }
    }
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            aspect_override: None,
        }
    }

    pub fn with_aspect(mut self, aspect: Option<AspectRatio>) -> Self {
        self.aspect_override = aspect;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        if let Some(aspect) = self.aspect_override {
            return aspect.ratio();
        }
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            AspectRatio::WIDESCREEN.ratio()
        }
    }

    /// Largest `(width, height)` with this surface's aspect ratio that fits
    /// inside the given area.
    pub fn fit(&self, width: f32, height: f32) -> (f32, f32) {
        let ratio = self.aspect_ratio();
        if width / ratio <= height {
            (width, width / ratio)
        } else {
            (height * ratio, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aspect() {
        let aspect: AspectRatio = "4:3".parse().unwrap();
        assert_eq!(aspect.width, 4.0);
        assert_eq!(aspect.height, 3.0);
        assert_eq!(aspect.to_string(), "4:3");
    }

    #[test]
    fn test_parse_aspect_rejects_garbage() {
        for bad in ["", "16", "16:", ":9", "0:9", "a:b", "-4:3"] {
            assert_eq!(
                bad.parse::<AspectRatio>(),
                Err(DeckError::InvalidAspect(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_override_wins_over_measured_size() {
        let surface = Surface::new(1000.0, 1000.0).with_aspect(Some(AspectRatio::WIDESCREEN));
        assert!((surface.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_size_falls_back_to_widescreen() {
        let surface = Surface::new(800.0, 0.0);
        assert!((surface.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_letterboxes_and_pillarboxes() {
        let surface = Surface::default().with_aspect(Some(AspectRatio::WIDESCREEN));
        // Tall area: full width, reduced height
        let (w, h) = surface.fit(1600.0, 1600.0);
        assert_eq!(w, 1600.0);
        assert!((h - 900.0).abs() < 1e-3);
        // Wide area: full height, reduced width
        let (w, h) = surface.fit(4000.0, 900.0);
        assert!((w - 1600.0).abs() < 1e-3);
        assert_eq!(h, 900.0);
    }
}
