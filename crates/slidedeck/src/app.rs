use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::cli::{PresentOptions, SlideRef};
use crate::config::Config;
use crate::deck::{
    ActiveTransition, ActivityTracker, AspectRatio, DeckDirective, DeckInput, DeckListener,
    DeckSession, NavigationController, NavigationOptions, PrecacheDispatch, PrecacheScheduler,
    RenderContext, Route, RouteArgs, SlideRegistry, StepOutcome, Surface, TransitionDirection,
    TransitionKind,
};
use crate::highlight::Highlighter;
use crate::loader::{self, LoadedDeck, SlideContent};
use crate::parser::DeckMeta;
use crate::render;
use crate::render::controls::ControlsLayout;
use crate::theme::Theme;
use crate::watch::DeckWatcher;

/// Controller notifications, queued for the next pass of the frame loop.
enum HostEvent {
    Route(Route<SlideContent>),
    Exit,
}

/// Forwards controller callbacks to the app over a channel.
struct ChannelListener(Sender<HostEvent>);

impl DeckListener<SlideContent> for ChannelListener {
    fn on_index_changed(&mut self, index: usize) {
        tracing::trace!(index, "index changed");
    }

    fn on_route_replaced(&mut self, route: &Route<SlideContent>) {
        let _ = self.0.send(HostEvent::Route(route.clone()));
    }

    fn on_exit_requested(&mut self) {
        let _ = self.0.send(HostEvent::Exit);
    }
}

/// Inputs that are not plain one-slide steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostInput {
    Deck(DeckInput),
    First,
    Last,
}

/// Directive the host feeds the controller: the deck's own `deck_action`,
/// or `ExitOnNext` on the last slide when `--exit-at-end` is set.
fn host_directive(
    deck: DeckDirective,
    exit_at_end: bool,
    index: usize,
    count: usize,
) -> DeckDirective {
    if deck == DeckDirective::None && exit_at_end && index + 1 >= count {
        DeckDirective::ExitOnNext
    } else {
        deck
    }
}

/// Start index from `--slide`, falling back to the configured start slide.
/// An unknown slide name starts at the beginning.
fn start_index<C>(
    slide: Option<&SlideRef>,
    slides: &SlideRegistry<C>,
    config: &Config,
) -> usize {
    match slide {
        Some(SlideRef::Number(n)) => n.saturating_sub(1),
        Some(SlideRef::Name(name)) => slides.position_of(name).unwrap_or_else(|| {
            tracing::warn!("no slide named '{name}', starting at the first slide");
            0
        }),
        None => config.start_index().unwrap_or(0),
    }
}

/// `title - author` from the frontmatter, or the file name.
fn window_title(meta: &DeckMeta, file: &Path) -> String {
    match (&meta.title, &meta.author) {
        (Some(title), Some(author)) => format!("{title} - {author}"),
        (Some(title), None) => title.clone(),
        _ => format!(
            "slidedeck - {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        ),
    }
}

/// Largest rect with the surface's aspect ratio, centred in `screen`.
fn slide_rect(screen: egui::Rect, surface: &Surface) -> egui::Rect {
    let (w, h) = surface.fit(screen.width(), screen.height());
    egui::Rect::from_center_size(screen.center(), egui::vec2(w, h))
}

fn scale_rect(rect: egui::Rect, factor: f32) -> egui::Rect {
    egui::Rect::from_center_size(rect.center(), rect.size() * factor)
}

struct PresenterApp {
    options: PresentOptions,
    config: Config,
    session: DeckSession<SlideContent>,
    events: Receiver<HostEvent>,
    highlighter: Arc<Highlighter>,
    theme: Theme,
    footer: Option<String>,
    aspect: Option<AspectRatio>,
    deck_directive: DeckDirective,
    /// Route currently on screen, and the one it is animating away from.
    shown: Route<SlideContent>,
    leaving: Option<Route<SlideContent>>,
    transition: Option<ActiveTransition>,
    surface: Surface,
    watcher: Option<DeckWatcher>,
    over_controls: bool,
    first_frame_done: bool,
    closing: bool,
}

impl PresenterApp {
    fn new(
        options: PresentOptions,
        config: Config,
        deck: LoadedDeck,
        highlighter: Arc<Highlighter>,
        watcher: Option<DeckWatcher>,
    ) -> Self {
        let (tx, events) = mpsc::channel();
        let surface = Surface::default().with_aspect(deck.aspect);
        let ctx = RenderContext::new(surface).with_highlighter(Arc::clone(&highlighter));
        let dispatch = if config.background_precache() {
            PrecacheDispatch::Background
        } else {
            PrecacheDispatch::Inline
        };
        let start_index = start_index(options.slide.as_ref(), &deck.slides, &config);
        let directive = host_directive(
            deck.directive,
            options.exit_at_end,
            deck.slides.clamp_index(start_index),
            deck.slides.len(),
        );

        let navigation = NavigationController::new(
            deck.slides,
            ctx,
            NavigationOptions {
                start_index,
                directive,
                precache: PrecacheScheduler::new(dispatch),
            },
            Box::new(ChannelListener(tx)),
        );
        let shown = navigation.route().clone();
        let activity = ActivityTracker::new(config.controls_hide_delay());

        tracing::info!(
            slides = navigation.slide_count(),
            start = navigation.current_index() + 1,
            "presentation started"
        );

        Self {
            options,
            config,
            session: DeckSession::new(navigation, activity),
            events,
            highlighter,
            theme: deck.theme,
            footer: deck.meta.footer,
            aspect: deck.aspect,
            deck_directive: deck.directive,
            shown,
            leaving: None,
            transition: None,
            surface,
            watcher,
            over_controls: false,
            first_frame_done: false,
            closing: false,
        }
    }

    /// Push the host's directive for the slide now shown.
    fn sync_directive(&mut self) {
        let navigation = self.session.navigation();
        let directive = host_directive(
            self.deck_directive,
            self.options.exit_at_end,
            navigation.current_index(),
            navigation.slide_count(),
        );
        self.session.navigation_mut().set_directive(directive);
    }

    fn reload(&mut self) {
        match loader::load_file(&self.options.file, &self.config) {
            Ok(deck) => {
                tracing::info!(slides = deck.slides.len(), "deck reloaded");
                self.theme = deck.theme;
                self.footer = deck.meta.footer;
                self.deck_directive = deck.directive;
                if deck.aspect != self.aspect {
                    self.aspect = deck.aspect;
                    self.surface = self.surface.with_aspect(deck.aspect);
                    self.session.navigation_mut().set_surface(self.surface);
                }
                self.session.navigation_mut().replace_slides(deck.slides);
                self.sync_directive();
            }
            Err(e) => tracing::warn!("reload failed, keeping the current deck: {e:#}"),
        }
    }

    fn apply(&mut self, input: HostInput, now: Instant) {
        if self.closing {
            return;
        }
        let outcome = match input {
            HostInput::Deck(input) => self.session.handle(input, now),
            HostInput::First => {
                let distance = self.session.navigation().current_index() as isize;
                Some(
                    self.session
                        .navigation_mut()
                        .step_with(-distance, RouteArgs::instant()),
                )
            }
            HostInput::Last => {
                let navigation = self.session.navigation();
                let distance =
                    (navigation.slide_count() - 1 - navigation.current_index()) as isize;
                Some(
                    self.session
                        .navigation_mut()
                        .step_with(distance, RouteArgs::instant()),
                )
            }
        };
        if let Some(StepOutcome::Moved { .. }) = outcome {
            self.sync_directive();
        }
    }

    fn collect_inputs(
        &mut self,
        ctx: &egui::Context,
        controls: &ControlsLayout,
    ) -> Vec<HostInput> {
        let controls_visible = self.session.controls_visible();
        let mut inputs = Vec::new();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape) {
                inputs.push(HostInput::Deck(DeckInput::ExitRequested));
                return;
            }
            if i.key_pressed(egui::Key::ArrowRight)
                || i.key_pressed(egui::Key::N)
                || i.key_pressed(egui::Key::Space)
            {
                inputs.push(HostInput::Deck(DeckInput::Next));
            }
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::P) {
                inputs.push(HostInput::Deck(DeckInput::Previous));
            }
            if i.key_pressed(egui::Key::Home) {
                inputs.push(HostInput::First);
            }
            if i.key_pressed(egui::Key::End) {
                inputs.push(HostInput::Last);
            }

            let hover = i.pointer.hover_pos();
            if i.pointer.delta() != egui::Vec2::ZERO {
                inputs.push(HostInput::Deck(DeckInput::PointerMoved));
            }
            let over = hover.is_some_and(|p| controls.contains(p));
            if over != self.over_controls {
                self.over_controls = over;
                inputs.push(HostInput::Deck(if over {
                    DeckInput::PointerEnteredControls
                } else {
                    DeckInput::PointerExitedControls
                }));
            }

            if controls_visible && i.pointer.primary_clicked() {
                if let Some(pos) = i.pointer.interact_pos() {
                    if controls.previous.contains(pos) {
                        inputs.push(HostInput::Deck(DeckInput::Previous));
                    } else if controls.next.contains(pos) {
                        inputs.push(HostInput::Deck(DeckInput::Next));
                    }
                }
            }
        });

        inputs
    }

    /// Pull controller notifications. Returns whether exit was requested.
    fn drain_events(&mut self, now: Instant) -> bool {
        let mut exit = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                HostEvent::Route(route) => {
                    tracing::trace!(
                        route = %route.name,
                        animate_in = route.page.animate_in,
                        "route replaced"
                    );
                    self.transition =
                        ActiveTransition::for_route(self.shown.page.index, &route, now);
                    let previous = std::mem::replace(&mut self.shown, route);
                    self.leaving = self.transition.as_ref().map(|_| previous);
                }
                HostEvent::Exit => exit = true,
            }
        }
        exit
    }

    fn draw_route(
        &self,
        ui: &egui::Ui,
        route: &Route<SlideContent>,
        rect: egui::Rect,
        opacity: f32,
    ) {
        let theme = route.page.theme.as_ref().unwrap_or(&self.theme);
        let scale = render::compute_scale(rect);
        render::render_slide(
            ui,
            &route.page.content,
            theme,
            Some(&self.highlighter),
            rect,
            opacity,
            scale,
        );
    }

    fn draw_presentation(&self, ui: &egui::Ui, rect: egui::Rect, now: Instant) {
        let (Some(t), Some(leaving)) = (&self.transition, &self.leaving) else {
            self.draw_route(ui, &self.shown, rect, 1.0);
            return;
        };

        let progress = t.progress(now);
        match t.kind {
            TransitionKind::Fade => {
                self.draw_route(ui, leaving, rect, 1.0 - progress);
                self.draw_route(ui, &self.shown, rect, progress);
            }
            TransitionKind::SlideHorizontal => {
                let w = rect.width();
                let sign = match t.direction {
                    TransitionDirection::Forward => -1.0,
                    TransitionDirection::Backward => 1.0,
                };
                let from_offset = sign * progress * w;
                let to_offset = from_offset - sign * w;

                let from_rect = rect.translate(egui::vec2(from_offset, 0.0));
                let to_rect = rect.translate(egui::vec2(to_offset, 0.0));

                self.draw_route(ui, leaving, from_rect, 1.0);
                self.draw_route(ui, &self.shown, to_rect, 1.0);
            }
            TransitionKind::Zoom => {
                let (from_scale, to_scale) = match t.direction {
                    TransitionDirection::Forward => {
                        (1.0 + 0.15 * progress, 0.85 + 0.15 * progress)
                    }
                    TransitionDirection::Backward => {
                        (1.0 - 0.15 * progress, 1.15 - 0.15 * progress)
                    }
                };
                self.draw_route(ui, leaving, scale_rect(rect, from_scale), 1.0 - progress);
                self.draw_route(ui, &self.shown, scale_rect(rect, to_scale), progress);
            }
        }
    }

    fn draw_chrome(
        &self,
        ui: &egui::Ui,
        screen: egui::Rect,
        rect: egui::Rect,
        controls: &ControlsLayout,
    ) {
        let scale = render::compute_scale(rect);
        let theme = self.shown.page.theme.as_ref().unwrap_or(&self.theme);
        if let Some(footer) = &self.footer {
            render::draw_footer(ui, footer, theme, rect, scale);
        }
        if self.session.controls_visible() {
            let navigation = self.session.navigation();
            let hover = ui.ctx().input(|i| i.pointer.hover_pos());
            render::controls::draw_controls(
                ui,
                controls,
                theme,
                navigation.current_index(),
                navigation.slide_count(),
                hover,
                render::compute_scale(screen),
            );
        }
    }
}

impl eframe::App for PresenterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if self.watcher.as_ref().is_some_and(DeckWatcher::changed) {
            self.reload();
        }

        let screen = ctx.available_rect();
        let surface = Surface::new(screen.width(), screen.height()).with_aspect(self.aspect);
        if surface != self.surface {
            self.surface = surface;
            self.session.navigation_mut().set_surface(surface);
        }
        let controls = ControlsLayout::new(screen, render::compute_scale(screen));

        if !self.closing {
            for input in self.collect_inputs(ctx, &controls) {
                self.apply(input, now);
            }
        }
        if self.session.tick(now) {
            tracing::trace!(visible = self.session.controls_visible(), "controls toggled");
        }

        if self.drain_events(now) && !self.closing {
            tracing::info!("exit requested");
            self.closing = true;
            // Sent outside ctx.input(): sending inside it deadlocks.
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if let Some(t) = self.transition.as_ref().filter(|t| t.is_complete(now)) {
            tracing::trace!(from = t.from, to = t.to, "transition finished");
            self.transition = None;
            self.leaving = None;
        }

        let background = self.shown.page.theme.as_ref().unwrap_or(&self.theme).background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(background).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = slide_rect(screen, &self.surface);
                ui.set_clip_rect(rect);
                self.draw_presentation(ui, rect, now);
                ui.set_clip_rect(screen);
                self.draw_chrome(ui, screen, rect, &controls);
            });

        if !self.first_frame_done {
            self.first_frame_done = true;
            self.session.navigation_mut().after_first_frame();
        }

        if self.transition.is_some() {
            ctx.request_repaint();
        } else if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

pub fn run(options: PresentOptions) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let deck = loader::load_file(&options.file, &config)?;
    let highlighter = Arc::new(Highlighter::initialize());
    if !highlighter.has_theme(&deck.theme.code_theme) {
        let mut available: Vec<_> = highlighter.theme_names().collect();
        available.sort_unstable();
        tracing::warn!(
            "unknown code theme '{}', code blocks will be plain; available: {}",
            deck.theme.code_theme,
            available.join(", ")
        );
    }

    let title = window_title(&deck.meta, &options.file);

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let file: PathBuf = options.file.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            let watcher = if options.watch {
                let repaint = cc.egui_ctx.clone();
                match DeckWatcher::new(&file, move || repaint.request_repaint()) {
                    Ok(watcher) => Some(watcher),
                    Err(e) => {
                        tracing::warn!("not watching {}: {e:#}", file.display());
                        None
                    }
                }
            } else {
                None
            };
            Ok(Box::new(PresenterApp::new(
                options,
                config,
                deck,
                highlighter,
                watcher,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_at_end_only_on_last_slide() {
        let none = DeckDirective::None;
        assert_eq!(host_directive(none, true, 1, 3), DeckDirective::None);
        assert_eq!(host_directive(none, true, 2, 3), DeckDirective::ExitOnNext);
        assert_eq!(host_directive(none, false, 2, 3), DeckDirective::None);
    }

    #[test]
    fn test_deck_action_wins_over_exit_at_end() {
        let action = DeckDirective::ExitOnPrevious;
        assert_eq!(host_directive(action, true, 2, 3), action);
        assert_eq!(host_directive(action, false, 0, 3), action);
    }

    #[test]
    fn test_slide_rect_letterboxes() {
        let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1600.0, 900.0));
        let surface = Surface::new(1600.0, 900.0).with_aspect(Some(AspectRatio {
            width: 4.0,
            height: 3.0,
        }));
        let rect = slide_rect(screen, &surface);
        assert_eq!(rect.height(), 900.0);
        assert_eq!(rect.width(), 1200.0);
        assert_eq!(rect.center(), screen.center());
    }

    #[test]
    fn test_listener_forwards_routes_and_exit() {
        let (tx, rx) = mpsc::channel();
        let deck = loader::build(
            crate::parser::parse("# One\n\n# Two").unwrap(),
            &Config::default(),
        )
        .unwrap();
        let mut navigation = NavigationController::new(
            deck.slides,
            RenderContext::default(),
            NavigationOptions {
                precache: PrecacheScheduler::new(PrecacheDispatch::Inline),
                ..Default::default()
            },
            Box::new(ChannelListener(tx)),
        );

        navigation.step(1);
        navigation.request_exit();

        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(&events[0], HostEvent::Route(r) if r.page.index == 1));
        assert!(matches!(events[1], HostEvent::Exit));
    }

    fn presenter(source: &str, slide: Option<SlideRef>) -> PresenterApp {
        let config = Config::default();
        let deck = loader::build(crate::parser::parse(source).unwrap(), &config).unwrap();
        let options = PresentOptions {
            file: PathBuf::from("talk.md"),
            windowed: true,
            slide,
            exit_at_end: false,
            watch: false,
        };
        PresenterApp::new(options, config, deck, Arc::new(Highlighter::initialize()), None)
    }

    #[test]
    fn test_start_slide_by_number_or_name() {
        let source = "# One\n\n@name: demo\n# Two\n\n# Three";
        let app = presenter(source, Some(SlideRef::Number(3)));
        assert_eq!(app.session.navigation().current_index(), 2);

        let app = presenter(source, Some(SlideRef::Name("demo".to_string())));
        assert_eq!(app.session.navigation().current_index(), 1);
        assert_eq!(app.shown.page.index, 1);

        let app = presenter(source, Some(SlideRef::Name("missing".to_string())));
        assert_eq!(app.session.navigation().current_index(), 0);
    }

    #[test]
    fn test_inputs_ignored_while_closing() {
        let mut app = presenter("# One\n\n# Two\n\n# Three", None);
        let now = Instant::now();
        app.apply(HostInput::Deck(DeckInput::Next), now);
        assert_eq!(app.session.navigation().current_index(), 1);

        app.closing = true;
        app.apply(HostInput::Deck(DeckInput::Next), now);
        app.apply(HostInput::Last, now);
        app.apply(HostInput::First, now);
        assert_eq!(app.session.navigation().current_index(), 1);
    }

    #[test]
    fn test_window_title() {
        let file = Path::new("/talks/rust.md");
        let mut meta = DeckMeta::default();
        assert_eq!(window_title(&meta, file), "slidedeck - rust.md");
        meta.title = Some("Rust in Practice".to_string());
        assert_eq!(window_title(&meta, file), "Rust in Practice");
        meta.author = Some("Kim".to_string());
        assert_eq!(window_title(&meta, file), "Rust in Practice - Kim");
    }
}
