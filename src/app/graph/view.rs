use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2};

use crate::engine::{Action, Frame, Highlight};
use crate::network::NodeRole;

use super::super::ViewModel;
use super::super::render_utils::{
    CanvasFit, arrow_head, circle_visible, draw_background, edge_color, edge_visible, lerp_point,
    node_color, node_radius, world_to_screen,
};

const PULSE_HZ: f64 = 1.5;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, now: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let fit = CanvasFit::new(rect, self.engine.graph().canvas());

        self.handle_graph_zoom(ui, &response, now);
        self.handle_graph_pan(&response, fit, now);

        let frame = self.engine.frame(now);
        draw_background(&painter, rect, fit, frame.transform);

        let radius_scale = frame.transform.scale * fit.scale;
        let screen_positions = frame
            .nodes
            .iter()
            .map(|node| world_to_screen(fit, frame.transform, node.position))
            .collect::<Vec<_>>();
        let screen_radii = frame
            .nodes
            .iter()
            .map(|node| (node_radius(node.role) * radius_scale).max(3.0))
            .collect::<Vec<_>>();

        let hovered = Self::hovered_node(ui, rect, &frame.nodes, &screen_positions, &screen_radii);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        Self::draw_edges(&painter, rect, fit, &frame);

        let pulse = (((now * PULSE_HZ * std::f64::consts::TAU).sin() * 0.5) + 0.5) as f32;
        let font_scale = radius_scale.sqrt().clamp(0.6, 1.6);
        for (index, node) in frame.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius + 40.0) {
                continue;
            }

            let color = node_color(node.role, node.highlight, pulse);
            painter.circle_filled(position, radius, color);

            let ring = match node.highlight {
                Highlight::Selected => Some(Stroke::new(3.0, Color32::from_rgb(96, 165, 250))),
                Highlight::Pulsing => Some(Stroke::new(
                    1.5 + pulse * 2.0,
                    Color32::from_rgba_unmultiplied(254, 240, 138, (90.0 + pulse * 140.0) as u8),
                )),
                _ => None,
            };
            if let Some(stroke) = ring {
                painter.circle_stroke(position, radius + 4.0 + pulse * 3.0, stroke);
            }
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            let text_color = if node.highlight == Highlight::Dimmed {
                Color32::from_gray(120)
            } else {
                Color32::from_gray(238)
            };
            let label_font = match node.role {
                NodeRole::Organization => FontId::proportional(13.0 * font_scale),
                NodeRole::User => FontId::proportional(11.0 * font_scale),
            };
            painter.text(
                position + vec2(0.0, radius + 4.0),
                Align2::CENTER_TOP,
                node.label.as_str(),
                label_font,
                text_color,
            );
            painter.text(
                position + vec2(0.0, radius + 4.0 + 15.0 * font_scale),
                Align2::CENTER_TOP,
                node.sublabel.as_str(),
                FontId::proportional(10.0 * font_scale),
                Color32::from_gray(160),
            );
        }

        if let Some(key) = hovered
            && let Some(lines) = self.engine.tooltip(key)
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            Self::draw_tooltip(&painter, rect, pointer, &lines);
        }

        if frame.nodes.is_empty() {
            let message = if self.refresh.is_loading() {
                "Loading network..."
            } else {
                "No organizations or wallets yet."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
        }

        self.apply_graph_hover(hovered, now);
        if response.clicked_by(egui::PointerButton::Primary) {
            self.apply_graph_selection(hovered, now);
        }

        for tx_id in self.engine.finished_animations(now) {
            self.engine.apply(Action::AnimationCompleted(tx_id), now);
        }
    }

    fn draw_edges(painter: &egui::Painter, rect: Rect, fit: CanvasFit, frame: &Frame) {
        let zoom_sqrt = (frame.transform.scale * fit.scale).sqrt();
        for edge in &frame.edges {
            let start = world_to_screen(fit, frame.transform, edge.source);
            let end = world_to_screen(fit, frame.transform, edge.target);
            if !edge_visible(rect, start, end, 12.0) {
                continue;
            }

            let color = edge_color(edge.direction);
            let faded = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 40);
            painter.line_segment([start, end], Stroke::new(1.0, faded));

            let head = lerp_point(start, end, edge.phase);
            let width = (3.0 * zoom_sqrt).clamp(1.5, 5.0);
            painter.line_segment([start, head], Stroke::new(width, color));
            painter.add(Shape::convex_polygon(
                arrow_head(head, end - start, (12.0 * zoom_sqrt).clamp(6.0, 16.0)).to_vec(),
                color,
                Stroke::NONE,
            ));

            let alpha = (edge.phase * 255.0) as u8;
            painter.text(
                lerp_point(start, end, 0.5) + vec2(0.0, -10.0),
                Align2::CENTER_BOTTOM,
                edge.label(),
                FontId::proportional(12.0),
                Color32::from_rgba_unmultiplied(241, 245, 249, alpha),
            );
        }
    }

    fn draw_tooltip(painter: &egui::Painter, rect: Rect, pointer: Pos2, lines: &[String]) {
        let font = FontId::proportional(12.0);
        let galleys = lines
            .iter()
            .map(|line| painter.layout_no_wrap(line.clone(), font.clone(), Color32::from_gray(235)))
            .collect::<Vec<_>>();

        let width = galleys.iter().map(|galley| galley.size().x).fold(0.0, f32::max) + 16.0;
        let height = galleys.iter().map(|galley| galley.size().y).sum::<f32>() + 12.0;

        let mut min = pointer + vec2(14.0, 14.0);
        if min.x + width > rect.right() {
            min.x = pointer.x - width - 14.0;
        }
        if min.y + height > rect.bottom() {
            min.y = pointer.y - height - 14.0;
        }

        let frame = Rect::from_min_size(min, vec2(width, height));
        painter.rect_filled(frame, 6.0, Color32::from_rgba_unmultiplied(15, 23, 42, 235));

        let mut cursor = min + vec2(8.0, 6.0);
        for galley in galleys {
            let line_height = galley.size().y;
            painter.galley(cursor, galley, Color32::from_gray(235));
            cursor.y += line_height;
        }
    }
}
