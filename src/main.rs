use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use eframe::egui;

use loan_story::layout::{LayoutConfig, LayoutStrategy, PackingConfig};
use loan_story::render::paint;
use loan_story::render::Theme;
use loan_story::scroll::offset_for_section;
use loan_story::story::loan::{loan_approval_story, section_copy};
use loan_story::{Story, StoryConfig, StoryDirector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutKind {
    /// One packed circle per group, approved vs. not
    Packed,
    /// Loose dot cloud per group
    Cluster,
}

/// Scroll-driven loan approval story viewer
#[derive(Parser, Debug)]
#[command(name = "loan-story", version, about)]
struct Cli {
    /// Story JSON file (defaults to the built-in loan approval story)
    #[arg(long)]
    story: Option<PathBuf>,

    /// Config JSON file overriding layout, animation and particle settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart layout, overriding the config file
    #[arg(long, value_enum)]
    layout: Option<LayoutKind>,

    /// Dark theme
    #[arg(long)]
    dark: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let (story, builtin) = match cli.story {
        Some(ref path) => match Story::load(path) {
            Ok(story) => (story, false),
            Err(e) => {
                log::warn!("Cannot load story {}: {}; using built-in story", path.display(), e);
                (loan_approval_story(), true)
            }
        },
        None => (loan_approval_story(), true),
    };

    let mut config = match cli.config {
        Some(ref path) => StoryConfig::load(path).unwrap_or_else(|e| {
            log::warn!("Cannot load config {}: {}; using defaults", path.display(), e);
            StoryConfig::default()
        }),
        None => StoryConfig::default(),
    };
    config.layout = match (cli.layout, config.layout) {
        (Some(LayoutKind::Packed), LayoutStrategy::Cluster(_)) => LayoutStrategy::Packed(PackingConfig::default()),
        (Some(LayoutKind::Cluster), LayoutStrategy::Packed(_)) => LayoutStrategy::Cluster(LayoutConfig::default()),
        (_, layout) => layout,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    let app = StoryApp::new(story, config, builtin, cli.dark);
    if let Err(e) = eframe::run_native("Who Gets Approved?", options, Box::new(|_cc| Ok(Box::new(app)))) {
        log::error!("Viewer failed: {}", e);
        std::process::exit(1);
    }
}

struct StoryApp {
    director: StoryDirector,
    /// Built-in story: use the long-form copy for each section
    builtin_copy: bool,
    dark_mode: bool,
    pending_jump: Option<usize>,
}

impl StoryApp {
    fn new(story: Story, config: StoryConfig, builtin_copy: bool, dark_mode: bool) -> Self {
        log::info!(
            "Starting viewer: {} sections, layout {}",
            story.len(),
            match config.layout {
                LayoutStrategy::Packed(_) => "packed",
                LayoutStrategy::Cluster(_) => "cluster",
            }
        );
        Self {
            director: StoryDirector::new(story, config),
            builtin_copy,
            dark_mode,
            pending_jump: None,
        }
    }

    fn copy_for(&self, index: usize) -> (String, String) {
        if self.builtin_copy {
            let (heading, body) = section_copy(index);
            return (heading.to_string(), body.to_string());
        }
        let title = self
            .director
            .story()
            .section(index)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        (title, String::new())
    }

    /// Scrolling column of full-height sections; returns the scroll offset.
    fn draw_sections(&mut self, ui: &mut egui::Ui, viewport: egui::Rect, theme: &Theme) -> f32 {
        let vh = viewport.height();
        let text_width = (viewport.width() * 0.4).max(200.0);

        let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
        if let Some(index) = self.pending_jump.take() {
            area = area.vertical_scroll_offset(offset_for_section(index, vh));
        }

        let output = area.show(ui, |ui| {
            let ctx = ui.ctx().clone();
            for i in 0..self.director.story().len() {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), vh), egui::Sense::hover());
                if !ui.is_rect_visible(rect) {
                    continue;
                }
                let (heading, body) = self.copy_for(i);
                let painter = ui.painter_at(rect);
                let origin = egui::pos2(rect.min.x + 48.0, rect.center().y - 60.0);
                let used = paint_text_wrapped(&painter, &ctx, origin, &heading, 32.0, theme.text_color, text_width);
                paint_text_wrapped(
                    &painter,
                    &ctx,
                    egui::pos2(origin.x, used.max.y + 16.0),
                    &body,
                    17.0,
                    theme.muted_text,
                    text_width,
                );
            }
        });

        output.state.offset.y
    }
}

fn paint_text_wrapped(
    painter: &egui::Painter,
    ctx: &egui::Context,
    pos: egui::Pos2,
    text: &str,
    font_size: f32,
    color: egui::Color32,
    max_width: f32,
) -> egui::Rect {
    if text.is_empty() {
        return egui::Rect::from_min_size(pos, egui::Vec2::ZERO);
    }
    let job = egui::text::LayoutJob::simple(text.to_string(), egui::FontId::proportional(font_size), color, max_width);
    let galley = ctx.fonts(|f| f.layout_job(job));
    let size = galley.rect.size();
    painter.galley(pos, galley, color);
    egui::Rect::from_min_size(pos, size)
}

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
        let theme = Theme::for_mode(self.dark_mode);

        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        self.director.tick(dt);

        let panel = egui::Frame::none().fill(theme.page_bg);
        egui::CentralPanel::default().frame(panel).show(ctx, |ui| {
            let viewport = ui.max_rect();
            let frame = self.director.frame();

            // Background
            paint::paint_particles(ui.painter(), viewport, &frame, &theme);

            let offset = self.draw_sections(ui, viewport, &theme);
            self.director.on_scroll(offset, viewport.height());

            // Chart, pinned to the right of the copy column
            let chart_rect = egui::Rect::from_min_max(
                egui::pos2(viewport.min.x + viewport.width() * 0.45, viewport.min.y + 24.0),
                egui::pos2(viewport.max.x - 48.0, viewport.max.y - 24.0),
            );
            let painter = ui.painter_at(viewport);
            paint::paint_chart(&painter, chart_rect, &frame, self.director.config(), &theme);
            paint::paint_progress(&painter, viewport, &frame, &theme);

            if let Some(index) = paint::section_indicator(ui, viewport, &frame, &theme) {
                log::debug!("Jump to section {}", index);
                self.pending_jump = Some(index);
            }

            if !self.director.transition_state().is_idle() || frame.animating || frame.shake_x != 0.0 {
                ctx.request_repaint();
            } else {
                // particles keep drifting
                ctx.request_repaint_after(Duration::from_millis(33));
            }
        });
    }
}
