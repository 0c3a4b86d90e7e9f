pub mod controls;
pub mod text;

use eframe::egui;

use crate::highlight::Highlighter;
use crate::parser::{Block, ParsedSlide};
use crate::theme::Theme;

/// Reference size that `scale` is relative to.
pub const REFERENCE_SIZE: egui::Vec2 = egui::vec2(1920.0, 1080.0);

pub fn compute_scale(rect: egui::Rect) -> f32 {
    (rect.width() / REFERENCE_SIZE.x).min(rect.height() / REFERENCE_SIZE.y)
}

/// Slides made only of headings and short paragraphs are centred; everything
/// else flows from the top.
fn is_title_slide(slide: &ParsedSlide) -> bool {
    slide.blocks.len() <= 3
        && matches!(slide.blocks.first(), Some(Block::Heading { .. }))
        && slide
            .blocks
            .iter()
            .all(|b| matches!(b, Block::Heading { .. } | Block::Paragraph { .. }))
}

/// Render one slide's content into `rect`.
pub fn render_slide(
    ui: &egui::Ui,
    slide: &ParsedSlide,
    theme: &Theme,
    highlighter: Option<&Highlighter>,
    rect: egui::Rect,
    opacity: f32,
    scale: f32,
) {
    ui.painter()
        .rect_filled(rect, 0.0, Theme::with_opacity(theme.background, opacity));

    let padding = 80.0 * scale;
    let width = rect.width() - padding * 2.0;
    let mut pos = egui::pos2(rect.left() + padding, rect.top() + padding);

    if is_title_slide(slide) {
        let height = estimate_height(ui, &slide.blocks, theme, width, scale);
        pos.y = rect.center().y - height / 2.0;
    }

    text::draw_blocks(
        ui,
        &slide.blocks,
        highlighter,
        theme,
        pos,
        width,
        opacity,
        scale,
    );
}

fn estimate_height(
    ui: &egui::Ui,
    blocks: &[Block],
    theme: &Theme,
    max_width: f32,
    scale: f32,
) -> f32 {
    let spacing = 20.0 * scale;
    let heights: Vec<f32> = blocks
        .iter()
        .map(|block| {
            let (text, size) = match block {
                Block::Heading { level, text } => (text, theme.heading_size(*level)),
                Block::Paragraph { text } => (text, theme.body_size),
                _ => return 0.0,
            };
            ui.painter()
                .layout(
                    text.clone(),
                    egui::FontId::proportional(size * scale),
                    theme.foreground,
                    max_width,
                )
                .rect
                .height()
        })
        .collect();
    heights.iter().sum::<f32>() + spacing * heights.len().saturating_sub(1) as f32
}

/// Footer text along the bottom edge.
pub fn draw_footer(ui: &egui::Ui, footer: &str, theme: &Theme, rect: egui::Rect, scale: f32) {
    let footer_color = Theme::with_opacity(theme.foreground, 0.4);
    let galley = ui.painter().layout_no_wrap(
        footer.to_string(),
        egui::FontId::proportional(14.0 * scale),
        footer_color,
    );
    let pos = egui::pos2(
        rect.center().x - galley.rect.width() / 2.0,
        rect.bottom() - 30.0 * scale,
    );
    ui.painter().galley(pos, galley, footer_color);
}
