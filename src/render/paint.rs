//! egui Painter-based chart rendering.
//!
//! Draws a [`Frame`] into a rect: dashed circles with approval/disapproval
//! dots (packed) or colored dot clouds (cluster), the two-line group labels,
//! background particles, the progress bar and the section indicator.
//! Layout coordinates are fitted into the target rect with a uniform scale.

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

use crate::config::StoryConfig;
use crate::director::Frame;
use crate::layout::{ChartLayout, DotClass, LayoutStrategy};
use crate::render::animator::{dot_opacity, dot_scale, AnimationConfig};

/// Dot radius for cluster dots, in layout units.
pub const CLUSTER_DOT_RADIUS: f32 = 4.0;
/// Padding around a cluster layout's bounding box, in layout units.
const CLUSTER_MARGIN: f32 = 40.0;

/// Theme colors for the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub page_bg: Color32,
    pub text_color: Color32,
    pub muted_text: Color32,
    pub approved: Color32,
    pub disapproved: Color32,
    pub circle_stroke: Color32,
    pub particle: Color32,
    pub track: Color32,
    pub accent: Color32,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            page_bg: Color32::from_rgb(250, 250, 252),
            text_color: Color32::from_rgb(38, 38, 46),
            muted_text: Color32::from_rgb(110, 110, 120),
            approved: Color32::from_rgb(0x22, 0xc5, 0x5e),
            disapproved: Color32::from_rgb(0xef, 0x44, 0x44),
            circle_stroke: Color32::from_rgb(160, 160, 170),
            particle: Color32::from_rgba_unmultiplied(0, 80, 180, 40),
            track: Color32::from_rgb(220, 220, 226),
            accent: Color32::from_rgb(0, 102, 217),
        }
    }

    pub fn dark() -> Self {
        Self {
            page_bg: Color32::from_rgb(24, 24, 30),
            text_color: Color32::from_rgb(220, 220, 230),
            muted_text: Color32::from_rgb(140, 140, 150),
            approved: Color32::from_rgb(0x22, 0xc5, 0x5e),
            disapproved: Color32::from_rgb(0xef, 0x44, 0x44),
            circle_stroke: Color32::from_rgb(90, 90, 100),
            particle: Color32::from_rgba_unmultiplied(120, 185, 255, 40),
            track: Color32::from_rgb(50, 50, 60),
            accent: Color32::from_rgb(80, 160, 255),
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn dot_color(&self, class: DotClass) -> Color32 {
        match class {
            DotClass::Approved => self.approved,
            DotClass::Disapproved => self.disapproved,
        }
    }
}

// ── Colors ──

const PALETTE: [Color32; 6] = [
    Color32::from_rgb(59, 130, 246),
    Color32::from_rgb(249, 115, 22),
    Color32::from_rgb(168, 85, 247),
    Color32::from_rgb(20, 184, 166),
    Color32::from_rgb(236, 72, 153),
    Color32::from_rgb(234, 179, 8),
];

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.strip_prefix('#')?;
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color32::from_rgb(
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
        )),
        6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

/// Resolve a group's color token; falls back to the palette by index.
pub fn group_color(group_index: usize, token: Option<&str>, theme: &Theme) -> Color32 {
    let named = token.and_then(|t| match t.trim().to_ascii_lowercase().as_str() {
        "green" | "approved" => Some(theme.approved),
        "red" | "disapproved" => Some(theme.disapproved),
        "accent" => Some(theme.accent),
        other => parse_hex(other),
    });
    named.unwrap_or(PALETTE[group_index % PALETTE.len()])
}

/// `c` with its alpha multiplied by `opacity`.
pub fn with_opacity(c: Color32, opacity: f32) -> Color32 {
    c.gamma_multiply(opacity.clamp(0.0, 1.0))
}

// ── Geometry ──

/// Layout-space rect that must be visible to show the whole chart.
pub fn chart_extent(layout: &ChartLayout) -> Rect {
    match layout {
        ChartLayout::Packed(l) => Rect::from_min_size(Pos2::ZERO, Vec2::new(l.canvas[0], l.canvas[1])),
        ChartLayout::Cluster(l) => {
            let pts = l
                .points
                .iter()
                .map(|p| Pos2::new(p.x, p.y))
                .chain(l.labels.iter().map(|lb| Pos2::new(lb.x, lb.y)))
                .chain(l.centroids.iter().map(|c| Pos2::new(c[0], c[1])));
            let bounds = Rect::from_points(&pts.collect::<Vec<_>>());
            if bounds.is_finite() {
                bounds.expand(CLUSTER_MARGIN)
            } else {
                Rect::from_min_size(Pos2::ZERO, Vec2::splat(1.0))
            }
        }
    }
}

/// Uniform fit of layout space into screen space, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub offset: Vec2,
}

impl Fit {
    pub fn new(extent: Rect, target: Rect) -> Self {
        let w = extent.width().max(1.0);
        let h = extent.height().max(1.0);
        let scale = (target.width() / w).min(target.height() / h).max(0.0);
        let used = Vec2::new(w, h) * scale;
        let offset = target.min.to_vec2() + (target.size() - used) * 0.5 - extent.min.to_vec2() * scale;
        Self { scale, offset }
    }

    pub fn apply(&self, x: f32, y: f32) -> Pos2 {
        Pos2::new(x * self.scale, y * self.scale) + self.offset
    }
}

/// Closed polyline approximating a circle.
pub fn circle_path(center: Pos2, radius: f32, segments: usize) -> Vec<Pos2> {
    let n = segments.max(3);
    (0..=n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            center + Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

/// Headline shown above a group name.
pub fn approval_headline(count: i32) -> String {
    format!("{}% Approval Rate", count)
}

// ── Drawing ──

fn dot_radius(config: &StoryConfig) -> f32 {
    match &config.layout {
        LayoutStrategy::Packed(p) if p.dot_radius.is_finite() => p.dot_radius.max(0.5),
        _ => CLUSTER_DOT_RADIUS,
    }
}

/// Paint the chart part of `frame` into `rect`.
pub fn paint_chart(painter: &egui::Painter, rect: Rect, frame: &Frame, config: &StoryConfig, theme: &Theme) {
    let Some(ref layout) = frame.layout else {
        return;
    };

    let fit = Fit::new(chart_extent(layout), rect);
    let shake = Vec2::new(frame.shake_x, 0.0);
    let radius = dot_radius(config) * fit.scale;
    let timing = &config.animation;

    match layout.as_ref() {
        ChartLayout::Packed(l) => {
            for grid in &l.grids {
                let center = fit.apply(grid.center[0], grid.center[1]) + shake;
                let path = circle_path(center, grid.circle_radius * fit.scale, 96);
                painter.extend(Shape::dashed_line(
                    &path,
                    Stroke::new(1.0, theme.circle_stroke),
                    4.0,
                    4.0,
                ));
                for (ordinal, dot) in grid.dots.iter().enumerate() {
                    let pos = fit.apply(dot.point.x, dot.point.y) + shake;
                    // the green/red split walks with the displayed count
                    let class = frame.dot_class(grid.group_index, ordinal).unwrap_or(dot.class);
                    let pulse = frame.dot_pulse(grid.group_index, ordinal, dot.class);
                    paint_dot(
                        painter,
                        pos,
                        radius * pulse,
                        theme.dot_color(class),
                        frame,
                        grid.group_index,
                        ordinal,
                        timing,
                    );
                }
            }
            paint_legend(painter, rect, theme);
        }
        ChartLayout::Cluster(l) => {
            let mut ordinal = 0;
            let mut last_group = None;
            for p in &l.points {
                if last_group != Some(p.group_index) {
                    last_group = Some(p.group_index);
                    ordinal = 0;
                }
                let token = frame
                    .groups
                    .get(p.group_index)
                    .and_then(|g| g.color_token.as_deref());
                let color = group_color(p.group_index, token, theme);
                let pos = fit.apply(p.x, p.y) + shake;
                paint_dot(painter, pos, radius, color, frame, p.group_index, ordinal, timing);
                ordinal += 1;
            }
        }
    }

    for (i, label) in layout.labels().iter().enumerate() {
        let pos = fit.apply(label.x, label.y) + shake;
        let count = frame.counts.get(i).copied().unwrap_or(label.count as i32);
        painter.text(
            pos - Vec2::new(0.0, 22.0),
            Align2::CENTER_BOTTOM,
            approval_headline(count),
            FontId::proportional(18.0),
            theme.text_color,
        );
        painter.text(
            pos,
            Align2::CENTER_BOTTOM,
            &label.text,
            FontId::proportional(14.0),
            theme.muted_text,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_dot(
    painter: &egui::Painter,
    pos: Pos2,
    radius: f32,
    color: Color32,
    frame: &Frame,
    group_index: usize,
    ordinal: usize,
    timing: &AnimationConfig,
) {
    let opacity = dot_opacity(frame.fade, group_index, ordinal, timing);
    if opacity <= 0.001 {
        return;
    }
    let r = radius * dot_scale(frame.fade, group_index, ordinal, timing);
    painter.circle_filled(pos, r, with_opacity(color, opacity));
}

/// Legend rows for the packed chart.
pub fn legend_entries(theme: &Theme) -> [(Color32, &'static str); 2] {
    [(theme.approved, "Approval"), (theme.disapproved, "Disapproval")]
}

fn paint_legend(painter: &egui::Painter, rect: Rect, theme: &Theme) {
    let mut pos = Pos2::new(rect.min.x + 8.0, rect.max.y - 40.0);
    for (color, text) in legend_entries(theme) {
        painter.circle_filled(pos, 5.0, color);
        painter.text(
            pos + Vec2::new(12.0, 0.0),
            Align2::LEFT_CENTER,
            text,
            FontId::proportional(13.0),
            theme.muted_text,
        );
        pos.y += 18.0;
    }
}

/// Paint background particles over the whole viewport `rect`.
pub fn paint_particles(painter: &egui::Painter, rect: Rect, frame: &Frame, theme: &Theme) {
    for p in &frame.particles {
        let pos = rect.min + Vec2::new(p[0] * rect.width(), p[1] * rect.height());
        painter.circle_filled(pos, 2.5, theme.particle);
    }
}

/// Thin progress bar across the top of `rect`.
pub fn paint_progress(painter: &egui::Painter, rect: Rect, frame: &Frame, theme: &Theme) {
    let bar = Rect::from_min_size(rect.min, Vec2::new(rect.width(), 3.0));
    painter.rect_filled(bar, Rounding::ZERO, theme.track);
    let filled = Rect::from_min_size(bar.min, Vec2::new(bar.width() * frame.progress.clamp(0.0, 1.0), 3.0));
    painter.rect_filled(filled, Rounding::ZERO, theme.accent);
}

/// Centers of the section indicator dots, stacked vertically in `rect`.
pub fn indicator_positions(rect: Rect, section_count: usize) -> Vec<Pos2> {
    const GAP: f32 = 14.0;
    let total = section_count.saturating_sub(1) as f32 * GAP;
    let top = rect.center().y - total * 0.5;
    (0..section_count)
        .map(|i| Pos2::new(rect.right() - 16.0, top + i as f32 * GAP))
        .collect()
}

/// Draw the section indicator; returns the section whose dot was clicked.
pub fn section_indicator(ui: &mut egui::Ui, rect: Rect, frame: &Frame, theme: &Theme) -> Option<usize> {
    let mut clicked = None;
    for (i, center) in indicator_positions(rect, frame.section_count).into_iter().enumerate() {
        let hit = Rect::from_center_size(center, Vec2::splat(12.0));
        let response = ui.interact(hit, egui::Id::new(("section_dot", i)), egui::Sense::click());
        let active = i == frame.section_index;
        let (r, color) = if active {
            (5.0, theme.accent)
        } else if response.hovered() {
            (4.0, theme.muted_text)
        } else {
            (3.0, theme.track)
        };
        ui.painter().circle_filled(center, r, color);
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        if response.clicked() {
            clicked = Some(i);
        }
    }
    clicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutConfig, PackingConfig};
    use crate::story::Group;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#22c55e"), Some(Color32::from_rgb(0x22, 0xc5, 0x5e)));
        assert_eq!(parse_hex("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_hex("22c55e"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_group_color_tokens() {
        let theme = Theme::light();
        assert_eq!(group_color(0, Some("green"), &theme), theme.approved);
        assert_eq!(group_color(0, Some("RED"), &theme), theme.disapproved);
        assert_eq!(group_color(3, Some("#000000"), &theme), Color32::BLACK);
        // unknown token falls back to the palette
        assert_eq!(group_color(1, Some("mauve"), &theme), PALETTE[1]);
        assert_eq!(group_color(7, None, &theme), PALETTE[1]);
    }

    #[test]
    fn test_group_color_from_story_token() {
        let theme = Theme::dark();
        let group = Group::new("Married", 71).with_color("#3b82f6");
        assert_eq!(
            group_color(4, group.color_token.as_deref(), &theme),
            Color32::from_rgb(0x3b, 0x82, 0xf6)
        );
        let plain = Group::new("Single", 61);
        assert_eq!(group_color(4, plain.color_token.as_deref(), &theme), PALETTE[4]);
    }

    #[test]
    fn test_legend_matches_dot_colors() {
        let theme = Theme::light();
        let [approved, disapproved] = legend_entries(&theme);
        assert_eq!(approved, (theme.dot_color(DotClass::Approved), "Approval"));
        assert_eq!(disapproved, (theme.dot_color(DotClass::Disapproved), "Disapproval"));
    }

    #[test]
    fn test_theme_dot_colors() {
        for theme in [Theme::light(), Theme::dark()] {
            assert_eq!(theme.dot_color(DotClass::Approved), Color32::from_rgb(0x22, 0xc5, 0x5e));
            assert_eq!(theme.dot_color(DotClass::Disapproved), Color32::from_rgb(0xef, 0x44, 0x44));
        }
    }

    #[test]
    fn test_fit_centers_and_preserves_aspect() {
        let extent = Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 100.0));
        let target = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(400.0, 400.0));
        let fit = Fit::new(extent, target);
        assert_eq!(fit.scale, 2.0);
        let tl = fit.apply(0.0, 0.0);
        let br = fit.apply(200.0, 100.0);
        assert_eq!(tl, Pos2::new(10.0, 110.0));
        assert_eq!(br, Pos2::new(410.0, 310.0));
    }

    #[test]
    fn test_packed_extent_is_canvas() {
        let groups = vec![Group::new("A", 40), Group::new("B", 60)];
        let layout = ChartLayout::Packed(crate::layout::compute_packed_layout(
            &groups,
            &PackingConfig::default(),
        ));
        let extent = chart_extent(&layout);
        assert_eq!(extent.min, Pos2::ZERO);
        assert_eq!(extent.width(), 600.0);
    }

    #[test]
    fn test_cluster_extent_covers_points() {
        let groups = vec![Group::new("A", 20), Group::new("B", 5)];
        let layout = ChartLayout::Cluster(compute_layout(&groups, &LayoutConfig::default()));
        let extent = chart_extent(&layout);
        if let ChartLayout::Cluster(ref l) = layout {
            for p in &l.points {
                assert!(extent.contains(Pos2::new(p.x, p.y)));
            }
        }
    }

    #[test]
    fn test_circle_path_closes() {
        let path = circle_path(Pos2::new(5.0, 5.0), 10.0, 32);
        assert_eq!(path.len(), 33);
        let first = path[0];
        let last = path[path.len() - 1];
        assert!((first - last).length() < 1e-3);
        for p in &path {
            assert!(((*p - Pos2::new(5.0, 5.0)).length() - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_indicator_positions() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 400.0));
        let pos = indicator_positions(rect, 15);
        assert_eq!(pos.len(), 15);
        assert!((pos[7].y - 200.0).abs() < 1e-4);
        assert!(pos.windows(2).all(|w| w[1].y > w[0].y));
        assert!(indicator_positions(rect, 0).is_empty());
    }

    #[test]
    fn test_headline_and_opacity() {
        assert_eq!(approval_headline(87), "87% Approval Rate");
        assert_eq!(with_opacity(Color32::WHITE, 0.0), Color32::TRANSPARENT);
        assert_eq!(with_opacity(Color32::WHITE, 2.0), Color32::WHITE);
    }
}
