use eframe::egui::{self, Pos2, Rect};

use crate::theme::Theme;

const WIDTH: f32 = 260.0;
const HEIGHT: f32 = 56.0;
const MARGIN: f32 = 32.0;

/// Screen areas of the controls overlay: a pill at the bottom centre with a
/// previous half and a next half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsLayout {
    pub rect: Rect,
    pub previous: Rect,
    pub next: Rect,
}

impl ControlsLayout {
    pub fn new(screen: Rect, scale: f32) -> Self {
        let size = egui::vec2(WIDTH * scale, HEIGHT * scale);
        let center = Pos2::new(
            screen.center().x,
            screen.bottom() - MARGIN * scale - size.y / 2.0,
        );
        let rect = Rect::from_center_size(center, size);
        let (previous, next) = rect.split_left_right_at_fraction(0.5);
        Self {
            rect,
            previous,
            next,
        }
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }
}

pub fn draw_controls(
    ui: &egui::Ui,
    layout: &ControlsLayout,
    theme: &Theme,
    index: usize,
    count: usize,
    hover: Option<Pos2>,
    scale: f32,
) {
    let painter = ui.painter();
    let bg = Theme::with_opacity(theme.code_background, 0.85);
    let fg = Theme::with_opacity(theme.foreground, 0.9);
    let dim = Theme::with_opacity(theme.foreground, 0.3);
    let radius = layout.rect.height() / 2.0;

    painter.rect_filled(layout.rect, radius, bg);

    for (half, hovered) in [
        (layout.previous, hover.is_some_and(|p| layout.previous.contains(p))),
        (layout.next, hover.is_some_and(|p| layout.next.contains(p))),
    ] {
        if hovered {
            let highlight = Theme::with_opacity(theme.accent, 0.2);
            painter.rect_filled(half.shrink(4.0 * scale), radius, highlight);
        }
    }

    let arrow_font = egui::FontId::proportional(28.0 * scale);
    let at_start = index == 0;
    let at_end = index + 1 >= count;
    painter.text(
        Pos2::new(layout.rect.left() + 28.0 * scale, layout.rect.center().y),
        egui::Align2::CENTER_CENTER,
        "\u{2039}",
        arrow_font.clone(),
        if at_start { dim } else { fg },
    );
    painter.text(
        Pos2::new(layout.rect.right() - 28.0 * scale, layout.rect.center().y),
        egui::Align2::CENTER_CENTER,
        "\u{203a}",
        arrow_font,
        if at_end { dim } else { fg },
    );
    painter.text(
        layout.rect.center(),
        egui::Align2::CENTER_CENTER,
        format!("{} / {}", index + 1, count),
        egui::FontId::monospace(18.0 * scale),
        fg,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_halves() {
        let screen = Rect::from_min_size(Pos2::ZERO, egui::vec2(1920.0, 1080.0));
        let layout = ControlsLayout::new(screen, 1.0);
        assert_eq!(layout.rect.center().x, 960.0);
        assert!(layout.rect.bottom() <= 1080.0);
        assert_eq!(layout.previous.right(), layout.next.left());
        assert!(layout.previous.contains(Pos2::new(900.0, layout.rect.center().y)));
        assert!(layout.next.contains(Pos2::new(1020.0, layout.rect.center().y)));
        assert!(!layout.contains(Pos2::new(10.0, 10.0)));
    }
}
