use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::graph::NodeKind;

const USER_COLOR: Color32 = Color32::from_rgb(0x69, 0xb3, 0xa2);
const GROUP_COLOR: Color32 = Color32::from_rgb(0xff, 0x57, 0x33);

pub(super) const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(0x99, 0x99, 0x99, 0xaa);
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
pub(super) const RELATED_COLOR: Color32 = Color32::from_rgb(241, 146, 94);
pub(super) const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
pub(super) const LABEL_COLOR: Color32 = Color32::from_gray(238);

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::User => USER_COLOR,
        NodeKind::Group => GROUP_COLOR,
    }
}

fn mix_channel(base: u8, overlay: u8, amount: f32) -> u8 {
    (base as f32 + (overlay as f32 - base as f32) * amount) as u8
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        mix_channel(base.r(), overlay.r(), amount),
        mix_channel(base.g(), overlay.g(), amount),
        mix_channel(base.b(), overlay.b(), amount),
        mix_channel(base.a(), overlay.a(), amount),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.5 + factor * 0.5)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 20, 26));
}

pub(super) fn draw_grid(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 66, 78, 60));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

fn degree_fraction(degree: usize, max_degree: usize) -> f32 {
    if max_degree == 0 {
        return 0.35;
    }
    (degree as f32 / max_degree as f32).clamp(0.0, 1.0).sqrt()
}

/// World-space disc radius for the 2D view, spread by node degree.
pub(super) fn node_radius(degree: usize, max_degree: usize) -> f32 {
    7.0 + degree_fraction(degree, max_degree) * 9.0
}

/// World-space sphere radius for the 3D views, sized to the scene scale.
pub(super) fn node_radius_3d(degree: usize, max_degree: usize) -> f32 {
    2.5 + degree_fraction(degree, max_degree) * 3.5
}
