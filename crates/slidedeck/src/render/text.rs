use crate::highlight::{HighlightedLine, Highlighter};
use crate::parser::Block;
use crate::theme::Theme;
use eframe::egui::{self, Color32, FontFamily, FontId, Pos2};

/// Layout and paint wrapped text, returning the height used.
pub fn draw_text(
    ui: &egui::Ui,
    text: &str,
    pos: Pos2,
    font: FontId,
    color: Color32,
    max_width: f32,
) -> f32 {
    let galley = ui
        .painter()
        .layout(text.to_string(), font, color, max_width);
    let height = galley.rect.height();
    ui.painter().galley(pos, galley, color);
    height
}

/// Draw a heading block. Returns height used.
#[allow(clippy::too_many_arguments)]
pub fn draw_heading(
    ui: &egui::Ui,
    text: &str,
    level: u8,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    let size = theme.heading_size(level) * scale;
    let color = Theme::with_opacity(theme.heading_color, opacity);
    draw_text(ui, text, pos, FontId::proportional(size), color, max_width)
}

/// Draw a paragraph. Returns height used.
pub fn draw_paragraph(
    ui: &egui::Ui,
    text: &str,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    let color = Theme::with_opacity(theme.foreground, opacity);
    let font = FontId::proportional(theme.body_size * scale);
    draw_text(ui, text, pos, font, color, max_width)
}

/// Draw a bullet list. Returns height used.
pub fn draw_list(
    ui: &egui::Ui,
    items: &[String],
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    let color = Theme::with_opacity(theme.foreground, opacity);
    let marker_width = 45.0 * scale;
    let item_spacing = 8.0 * scale;
    let font = FontId::proportional(theme.body_size * scale);
    let mut y_offset = 0.0;

    for item in items {
        let marker_pos = Pos2::new(pos.x, pos.y + y_offset);
        let marker_galley =
            ui.painter()
                .layout_no_wrap("\u{2022}".to_string(), font.clone(), color);
        ui.painter().galley(marker_pos, marker_galley, color);

        let text_pos = Pos2::new(pos.x + marker_width, pos.y + y_offset);
        let text_height = draw_text(
            ui,
            item,
            text_pos,
            font.clone(),
            color,
            max_width - marker_width,
        );
        y_offset += text_height + item_spacing;
    }

    y_offset
}

/// Build a layout job for a code block. Uses the highlighter's cache when
/// the slide was precached, otherwise highlights on the spot; falls back to
/// plain text when highlighting is unavailable.
pub fn code_job(
    code: &str,
    language: Option<&str>,
    highlighter: Option<&Highlighter>,
    theme: &Theme,
    font_size: f32,
    opacity: f32,
    max_width: f32,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    let font = FontId::new(font_size, FontFamily::Monospace);

    let lines = highlighter.and_then(|h| {
        h.cached(code, language, &theme.code_theme).or_else(|| {
            h.highlight(code, language, &theme.code_theme)
                .map_err(|e| tracing::debug!("highlighting skipped: {e:#}"))
                .ok()
        })
    });

    match lines {
        Some(lines) => append_highlighted(&mut job, &lines, &font, opacity),
        None => {
            let format = egui::text::TextFormat {
                font_id: font,
                color: Theme::with_opacity(theme.code_foreground, opacity),
                ..Default::default()
            };
            job.append(code, 0.0, format);
        }
    }
    job
}

fn append_highlighted(
    job: &mut egui::text::LayoutJob,
    lines: &[HighlightedLine],
    font: &FontId,
    opacity: f32,
) {
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            let newline = egui::text::TextFormat::simple(font.clone(), Color32::TRANSPARENT);
            job.append("\n", 0.0, newline);
        }
        for (color, text) in line {
            let color = Color32::from_rgba_unmultiplied(
                color.r(),
                color.g(),
                color.b(),
                (color.a() as f32 * opacity) as u8,
            );
            job.append(text, 0.0, egui::text::TextFormat::simple(font.clone(), color));
        }
    }
}

/// Draw a code block with syntax highlighting. Returns height used.
#[allow(clippy::too_many_arguments)]
pub fn draw_code_block(
    ui: &egui::Ui,
    code: &str,
    language: Option<&str>,
    highlighter: Option<&Highlighter>,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    let padding = 16.0 * scale;
    let bg_color = Theme::with_opacity(theme.code_background, opacity);

    let job = code_job(
        code,
        language,
        highlighter,
        theme,
        theme.code_size * scale,
        opacity,
        max_width - padding * 2.0,
    );
    let code_galley = ui.painter().layout_job(job);
    let total_height = code_galley.rect.height() + padding * 2.0;

    let bg_rect = egui::Rect::from_min_size(pos, egui::vec2(max_width, total_height));
    ui.painter().rect_filled(bg_rect, 8.0 * scale, bg_color);

    let code_pos = Pos2::new(pos.x + padding, pos.y + padding);
    let fallback = Theme::with_opacity(theme.code_foreground, opacity);
    ui.painter().galley(code_pos, code_galley, fallback);

    total_height
}

/// Draw a single block. Returns height used.
#[allow(clippy::too_many_arguments)]
pub fn draw_block(
    ui: &egui::Ui,
    block: &Block,
    highlighter: Option<&Highlighter>,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    match block {
        Block::Heading { level, text } => {
            draw_heading(ui, text, *level, theme, pos, max_width, opacity, scale)
        }
        Block::Paragraph { text } => {
            draw_paragraph(ui, text, theme, pos, max_width, opacity, scale)
        }
        Block::List { items } => draw_list(ui, items, theme, pos, max_width, opacity, scale),
        Block::CodeBlock { language, code } => draw_code_block(
            ui,
            code,
            language.as_deref(),
            highlighter,
            theme,
            pos,
            max_width,
            opacity,
            scale,
        ),
    }
}

/// Draw all blocks in a slide sequentially. Returns total height used.
#[allow(clippy::too_many_arguments)]
pub fn draw_blocks(
    ui: &egui::Ui,
    blocks: &[Block],
    highlighter: Option<&Highlighter>,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    opacity: f32,
    scale: f32,
) -> f32 {
    let block_spacing = 20.0 * scale;
    let mut y_offset = 0.0;

    for block in blocks {
        let block_pos = Pos2::new(pos.x, pos.y + y_offset);
        let height = draw_block(
            ui,
            block,
            highlighter,
            theme,
            block_pos,
            max_width,
            opacity,
            scale,
        );
        y_offset += height + block_spacing;
    }

    y_offset
}
