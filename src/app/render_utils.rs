use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

use crate::engine::{FlowDirection, Highlight, ViewTransform};
use crate::network::{Canvas, NodeRole};

pub(super) const ORG_COLOR: Color32 = Color32::from_rgb(250, 204, 21);
pub(super) const USER_COLOR: Color32 = Color32::from_rgb(74, 222, 128);
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(96, 165, 250);
pub(super) const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn edge_color(direction: FlowDirection) -> Color32 {
    match direction {
        FlowDirection::OrgToUser => Color32::from_rgb(245, 158, 11),
        FlowDirection::UserToOrg => Color32::from_rgb(16, 185, 129),
        FlowDirection::Other => Color32::from_rgb(34, 197, 94),
    }
}

pub(super) fn node_radius(role: NodeRole) -> f32 {
    match role {
        NodeRole::Organization => 36.0,
        NodeRole::User => 20.0,
    }
}

pub(super) fn node_color(role: NodeRole, highlight: Highlight, pulse: f32) -> Color32 {
    let base = match role {
        NodeRole::Organization => ORG_COLOR,
        NodeRole::User => USER_COLOR,
    };

    match highlight {
        Highlight::Selected => blend_color(base, SELECTED_COLOR, 0.55),
        Highlight::Hovered => blend_color(base, Color32::WHITE, 0.30),
        Highlight::Pulsing => blend_color(base, Color32::WHITE, 0.15 + pulse * 0.45),
        Highlight::Involved => blend_color(base, Color32::WHITE, 0.12),
        Highlight::SearchMatch => blend_color(base, SEARCH_COLOR, 0.60),
        Highlight::Dimmed => dim_color(base, 0.38),
        Highlight::Normal => base,
    }
}

/// Letterboxes the canvas into `rect` the way an SVG view box would.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct CanvasFit {
    pub origin: Pos2,
    pub scale: f32,
}

impl CanvasFit {
    pub fn new(rect: Rect, canvas: Canvas) -> Self {
        let scale = (rect.width() / canvas.width)
            .min(rect.height() / canvas.height)
            .max(f32::EPSILON);
        let origin = rect.center() - canvas.size() * scale * 0.5;
        Self { origin, scale }
    }

    pub fn screen_to_canvas_delta(self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }
}

pub(super) fn world_to_screen(fit: CanvasFit, transform: ViewTransform, world: Vec2) -> Pos2 {
    fit.origin + (transform.pan + world * transform.scale) * fit.scale
}

pub(super) fn draw_background(
    painter: &Painter,
    rect: Rect,
    fit: CanvasFit,
    transform: ViewTransform,
) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 23, 42));

    let step = (80.0 * transform.scale * fit.scale).max(16.0);
    let origin = fit.origin + transform.pan * fit.scale;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(51, 65, 85, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end).expand(padding).intersects(rect)
}

pub(super) fn lerp_point(start: Pos2, end: Pos2, t: f32) -> Pos2 {
    start + (end - start) * t.clamp(0.0, 1.0)
}

pub(super) fn arrow_head(tip: Pos2, direction: Vec2, size: f32) -> [Pos2; 3] {
    let forward = if direction.length_sq() > f32::EPSILON {
        direction.normalized()
    } else {
        vec2(1.0, 0.0)
    };
    let side = forward.rot90() * (size * 0.5);
    let base = tip - forward * size;
    [tip, base + side, base - side]
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn canvas_fit_letterboxes_wide_rect() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 300.0));
        let fit = CanvasFit::new(rect, Canvas::default());

        assert_eq!(fit.scale, 0.25);
        assert_eq!(fit.origin, pos2(250.0, 0.0));
        assert_eq!(
            world_to_screen(fit, ViewTransform::IDENTITY, vec2(2000.0, 1200.0)),
            pos2(750.0, 300.0)
        );
    }

    #[test]
    fn pan_is_applied_in_canvas_units() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 600.0));
        let fit = CanvasFit::new(rect, Canvas::default());
        let transform = ViewTransform {
            scale: 2.0,
            pan: vec2(100.0, -50.0),
        };

        assert_eq!(world_to_screen(fit, transform, vec2(10.0, 10.0)), pos2(60.0, -15.0));
        assert_eq!(fit.screen_to_canvas_delta(vec2(5.0, 5.0)), vec2(10.0, 10.0));
    }

    #[test]
    fn edge_culling_uses_bounding_box() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(200.0, 0.0), pos2(300.0, 100.0), 2.0));
    }

    #[test]
    fn edge_colors_follow_flow_direction() {
        assert_eq!(edge_color(FlowDirection::OrgToUser), Color32::from_rgb(245, 158, 11));
        assert_eq!(edge_color(FlowDirection::UserToOrg), Color32::from_rgb(16, 185, 129));
    }
}
